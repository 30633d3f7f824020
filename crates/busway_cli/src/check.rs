//! `busway check`: validate a scenario and show the ports it resolves to.

use busway_config::{ResolvedBridge, ScenarioConfig};
use serde_json::{json, Value};

use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Runs the `busway check` command.
///
/// Loading already validates every bridge parameter and op, so a scenario
/// that loads is runnable. Always returns exit code 0 on success.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = busway_config::load_config(&args.scenario)?;
    let resolved = busway_config::resolve_bridge(&config.bridge)?;

    match args.format {
        ReportFormat::Text => print!("{}", describe(&resolved, &config)),
        ReportFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&to_json(&resolved, &config))?
        ),
    }
    if !global.quiet {
        eprintln!("   Scenario OK");
    }
    Ok(0)
}

fn describe(resolved: &ResolvedBridge, config: &ScenarioConfig) -> String {
    let mut lines = vec![format!("topology   {}", resolved.topology)];
    if let Some(axi) = &resolved.axi {
        lines.push(format!(
            "axi        {} data, {}-bit address, {}-bit id",
            axi.data_width, axi.address_width, axi.id_width
        ));
    }
    lines.push(format!(
        "lite       {} data, {}-bit address",
        resolved.lite.data_width, resolved.lite.address_width
    ));
    if let Some(narrow) = &resolved.slave_lite {
        lines.push(format!("narrow     {} data", narrow.data_width));
    }
    if let Some(wb) = &resolved.wishbone {
        lines.push(format!(
            "wishbone   {} data, {}-bit word address, base {:#x}",
            wb.data_width, wb.address_width, resolved.base_address
        ));
    }
    if let Some(csr) = &resolved.csr {
        lines.push(format!(
            "csr        {} data, {} registers",
            csr.data_width, config.bridge.memory_words
        ));
    }
    if let Some(cycles) = resolved.timeout_cycles {
        lines.push(format!("timeout    {cycles} cycles"));
    }
    lines.push(format!("ops        {}", config.ops.len()));
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn to_json(resolved: &ResolvedBridge, config: &ScenarioConfig) -> Value {
    json!({
        "topology": resolved.topology,
        "axi": resolved.axi.map(|p| json!({
            "data_width": p.data_width.bits(),
            "address_width": p.address_width,
            "id_width": p.id_width,
        })),
        "lite": {
            "data_width": resolved.lite.data_width.bits(),
            "address_width": resolved.lite.address_width,
        },
        "slave_data_width": resolved.slave_lite.map(|p| p.data_width.bits()),
        "wishbone": resolved.wishbone.map(|p| json!({
            "data_width": p.data_width.bits(),
            "address_width": p.address_width,
        })),
        "base_address": resolved.base_address,
        "timeout_cycles": resolved.timeout_cycles,
        "ops": config.ops.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use busway_config::{load_config_from_str, resolve_bridge};

    fn load(toml: &str) -> (ResolvedBridge, ScenarioConfig) {
        let config = load_config_from_str(toml).unwrap();
        (resolve_bridge(&config.bridge).unwrap(), config)
    }

    const WB: &str = r#"
[bridge]
topology = "axi-to-wishbone"
data_width = 64
base_address = 0x8000

[[ops]]
kind = "read"
addr = 0x8000
"#;

    #[test]
    fn describe_lists_ports() {
        let (resolved, config) = load(WB);
        let text = describe(&resolved, &config);
        assert!(text.contains("topology   axi-to-wishbone"));
        assert!(text.contains("axi        64-bit data, 32-bit address, 4-bit id"));
        assert!(text.contains("29-bit word address, base 0x8000"));
        assert!(!text.contains("timeout"));
    }

    #[test]
    fn json_carries_widths() {
        let (resolved, config) = load(WB);
        let v = to_json(&resolved, &config);
        assert_eq!(v["topology"], "axi-to-wishbone");
        assert_eq!(v["axi"]["data_width"], 64);
        assert_eq!(v["wishbone"]["address_width"], 29);
        assert!(v["slave_data_width"].is_null());
        assert_eq!(v["ops"], 1);
    }

    #[test]
    fn check_accepts_valid_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("s.toml");
        std::fs::write(&path, WB).unwrap();
        let args = CheckArgs {
            scenario: path,
            format: ReportFormat::Text,
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
        };
        assert_eq!(run(&args, &global).unwrap(), 0);
    }
}
