//! Scenario file loading and validation.

use crate::error::ConfigError;
use crate::resolve::resolve_bridge;
use crate::types::{MasterKind, OpSpec, ScenarioConfig};
use std::path::Path;

/// Loads and validates a scenario.
///
/// `path` is either a scenario file or a directory containing `busway.toml`.
pub fn load_config(path: &Path) -> Result<ScenarioConfig, ConfigError> {
    let config_path = if path.is_dir() {
        path.join("busway.toml")
    } else {
        path.to_path_buf()
    };
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a scenario from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ScenarioConfig, ConfigError> {
    let config: ScenarioConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks the bridge parameters, the simulation settings, and that every
/// scripted op suits the topology's master.
fn validate_config(config: &ScenarioConfig) -> Result<(), ConfigError> {
    if config.ops.is_empty() {
        return Err(ConfigError::MissingField("ops".to_string()));
    }
    resolve_bridge(&config.bridge)?;

    let sim = &config.sim;
    if sim.max_cycles == 0 {
        return Err(ConfigError::ValidationError(
            "sim.max_cycles must be at least 1".to_string(),
        ));
    }
    if sim.max_deltas == 0 {
        return Err(ConfigError::ValidationError(
            "sim.max_deltas must be at least 1".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&sim.stall_probability) {
        return Err(ConfigError::ValidationError(format!(
            "sim.stall_probability {} is outside 0.0..=1.0",
            sim.stall_probability
        )));
    }

    let master = config.bridge.topology.master();
    for (index, op) in config.ops.iter().enumerate() {
        validate_op(index, op, master)?;
    }
    Ok(())
}

fn validate_op(index: usize, op: &OpSpec, master: MasterKind) -> Result<(), ConfigError> {
    if op.is_burst() && master != MasterKind::Axi {
        return Err(ConfigError::ValidationError(format!(
            "ops[{index}]: {} needs an AXI4-mastered topology",
            op.kind()
        )));
    }
    match op {
        OpSpec::BurstRead { len, expect, .. } => {
            if !expect.is_empty() && expect.len() != usize::from(*len) + 1 {
                return Err(ConfigError::ValidationError(format!(
                    "ops[{index}]: {} expected words for a {}-beat burst",
                    expect.len(),
                    usize::from(*len) + 1
                )));
            }
        }
        OpSpec::BurstWrite { data, strb, .. } => {
            if data.is_empty() || data.len() > 256 {
                return Err(ConfigError::ValidationError(format!(
                    "ops[{index}]: a write burst carries 1 to 256 beats, not {}",
                    data.len()
                )));
            }
            if let Some(strb) = strb {
                if strb.len() != data.len() {
                    return Err(ConfigError::ValidationError(format!(
                        "ops[{index}]: {} strobes for {} data beats",
                        strb.len(),
                        data.len()
                    )));
                }
            }
        }
        OpSpec::Read { .. } | OpSpec::Write { .. } => {}
    }
    Ok(())
}
