//! Bridge resolution: turning a [`BridgeConfig`] into validated port
//! parameters.

use busway_axi::{
    Axi2AxiLite, Axi2Wishbone, AxiParams, BridgeError, CsrParams, Lite2Csr, Lite2Wishbone,
    LiteConverter, LiteParams, LiteSram, LiteTimeout, Wishbone2Lite, WishboneParams,
};

use crate::error::ConfigError;
use crate::types::{BridgeConfig, MasterKind, Topology};

/// Validated construction parameters for every port of a topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBridge {
    /// The arrangement being built.
    pub topology: Topology,
    /// The master-facing AXI4 port, for AXI-mastered topologies.
    pub axi: Option<AxiParams>,
    /// The AXI4-Lite side: the master port, or the internal/slave Lite bus.
    pub lite: LiteParams,
    /// The narrow side of the down-converter.
    pub slave_lite: Option<LiteParams>,
    /// The Wishbone port, where one exists.
    pub wishbone: Option<WishboneParams>,
    /// The CSR port of `axi-lite-to-csr`.
    pub csr: Option<CsrParams>,
    /// Byte address subtracted before reaching Wishbone.
    pub base_address: u64,
    /// Timeout guard length, if a guard is configured.
    pub timeout_cycles: Option<u32>,
}

/// Largest SRAM or CSR bank a scenario may request, in words.
pub const MAX_MEMORY_WORDS: u64 = 1 << 24;

fn invalid(e: BridgeError) -> ConfigError {
    ConfigError::ValidationError(e.to_string())
}

/// Word-address width left once the byte-offset bits of `lite` are removed.
fn word_address_width(lite: &LiteParams) -> Result<u32, ConfigError> {
    let shift = lite.data_width.addr_shift();
    match lite.address_width.checked_sub(shift) {
        Some(bits) if bits > 0 => Ok(bits),
        _ => Err(ConfigError::ValidationError(format!(
            "address width {} leaves no word-address bits at {}",
            lite.address_width, lite.data_width
        ))),
    }
}

/// Resolves and validates the ports of `config`.
///
/// Every bridge the topology needs is built once and discarded, so any
/// construction-time failure surfaces here rather than at run time.
pub fn resolve_bridge(config: &BridgeConfig) -> Result<ResolvedBridge, ConfigError> {
    let topology = config.topology;
    let lite = LiteParams::new(config.data_width, config.address_width).map_err(invalid)?;

    if let Some(cycles) = config.timeout_cycles {
        if topology.master() != MasterKind::Lite {
            return Err(ConfigError::ValidationError(format!(
                "timeout_cycles applies only to AXI4-Lite-mastered topologies, not {topology}"
            )));
        }
        LiteTimeout::new(lite, cycles).map_err(invalid)?;
    }
    if config.slave_data_width.is_some() && topology != Topology::AxiLiteDownConverter {
        return Err(ConfigError::ValidationError(format!(
            "slave_data_width applies only to axi-lite-down-converter, not {topology}"
        )));
    }

    if !config.silent_addresses.is_empty() && !topology.has_responder() {
        return Err(ConfigError::ValidationError(format!(
            "silent_addresses needs a scripted AXI4-Lite responder, which {topology} does not have"
        )));
    }
    if !config.error_addresses.is_empty()
        && matches!(topology, Topology::AxiLiteToSram | Topology::AxiLiteToCsr)
    {
        return Err(ConfigError::ValidationError(format!(
            "error_addresses is not supported by {topology}"
        )));
    }

    let mut resolved = ResolvedBridge {
        topology,
        axi: None,
        lite,
        slave_lite: None,
        wishbone: None,
        csr: None,
        base_address: config.base_address,
        timeout_cycles: config.timeout_cycles,
    };

    match topology {
        Topology::AxiToWishbone => {
            let axi = AxiParams::new(config.data_width, config.address_width, config.id_width)
                .map_err(invalid)?;
            let wb = WishboneParams::new(config.data_width, word_address_width(&lite)?)
                .map_err(invalid)?;
            Axi2Wishbone::new(axi, wb, config.base_address).map_err(invalid)?;
            resolved.axi = Some(axi);
            resolved.wishbone = Some(wb);
        }
        Topology::AxiToAxiLite => {
            let axi = AxiParams::new(config.data_width, config.address_width, config.id_width)
                .map_err(invalid)?;
            Axi2AxiLite::new(axi, lite).map_err(invalid)?;
            resolved.axi = Some(axi);
        }
        Topology::AxiLiteToWishbone => {
            let wb = WishboneParams::new(config.data_width, word_address_width(&lite)?)
                .map_err(invalid)?;
            Lite2Wishbone::new(lite, wb, config.base_address).map_err(invalid)?;
            resolved.wishbone = Some(wb);
        }
        Topology::WishboneToAxiLite => {
            let wb = WishboneParams::new(config.data_width, word_address_width(&lite)?)
                .map_err(invalid)?;
            Wishbone2Lite::new(wb, lite, config.base_address).map_err(invalid)?;
            resolved.wishbone = Some(wb);
        }
        Topology::AxiLiteToSram => {
            if config.memory_words > MAX_MEMORY_WORDS {
                return Err(ConfigError::ValidationError(format!(
                    "memory_words {} exceeds the limit of {MAX_MEMORY_WORDS}",
                    config.memory_words
                )));
            }
            let bytes = config
                .memory_words
                .saturating_mul(u64::from(lite.data_width.bytes()));
            LiteSram::new(lite, bytes, config.read_only).map_err(invalid)?;
        }
        Topology::AxiLiteToCsr => {
            if !(1..=MAX_MEMORY_WORDS).contains(&config.memory_words) {
                return Err(ConfigError::ValidationError(format!(
                    "memory_words must be between 1 and {MAX_MEMORY_WORDS}"
                )));
            }
            let csr = CsrParams::new(config.data_width, word_address_width(&lite)?)
                .map_err(invalid)?;
            Lite2Csr::new(lite, csr).map_err(invalid)?;
            resolved.csr = Some(csr);
        }
        Topology::AxiLiteDownConverter => {
            let narrow = config
                .slave_data_width
                .ok_or_else(|| ConfigError::MissingField("bridge.slave_data_width".to_string()))?;
            let slave = LiteParams::new(narrow, config.address_width).map_err(invalid)?;
            LiteConverter::new(lite, slave).map_err(invalid)?;
            resolved.slave_lite = Some(slave);
        }
        Topology::AxiLiteToResponder => {}
    }
    Ok(resolved)
}
