//! Scenario types deserialized from `busway.toml`.

use std::fmt;
use std::path::PathBuf;

use busway_common::{BurstMode, Strobe, Word};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A complete scenario: which bridge to build, how to run it, and what
/// traffic to send through it.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    /// Bridge topology and construction parameters.
    pub bridge: BridgeConfig,
    /// Simulation settings.
    #[serde(default)]
    pub sim: SimSettings,
    /// Transactions issued by the master, in order.
    #[serde(default)]
    pub ops: Vec<OpSpec>,
}

/// The bridge arrangements a scenario can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// AXI4 master, AXI4 to Wishbone composite, Wishbone memory.
    AxiToWishbone,
    /// AXI4 master, AXI4 to AXI4-Lite, scripted Lite responder.
    AxiToAxiLite,
    /// Lite master, Lite to Wishbone, Wishbone memory.
    AxiLiteToWishbone,
    /// Lite master, Lite block RAM.
    AxiLiteToSram,
    /// Lite master, Lite to CSR, register bank.
    AxiLiteToCsr,
    /// Lite master, width down-converter, narrow Lite responder.
    AxiLiteDownConverter,
    /// Lite master wired straight to a scripted Lite responder.
    AxiLiteToResponder,
    /// Wishbone master, Wishbone to Lite, Lite responder.
    WishboneToAxiLite,
}

/// The protocol spoken by a topology's traffic source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterKind {
    /// Full AXI4 bursts.
    Axi,
    /// Single-beat AXI4-Lite.
    Lite,
    /// Classic Wishbone cycles.
    Wishbone,
}

impl Topology {
    /// All topologies, in declaration order.
    pub const ALL: [Topology; 8] = [
        Topology::AxiToWishbone,
        Topology::AxiToAxiLite,
        Topology::AxiLiteToWishbone,
        Topology::AxiLiteToSram,
        Topology::AxiLiteToCsr,
        Topology::AxiLiteDownConverter,
        Topology::AxiLiteToResponder,
        Topology::WishboneToAxiLite,
    ];

    /// The name used in scenario files.
    pub fn name(self) -> &'static str {
        match self {
            Topology::AxiToWishbone => "axi-to-wishbone",
            Topology::AxiToAxiLite => "axi-to-axi-lite",
            Topology::AxiLiteToWishbone => "axi-lite-to-wishbone",
            Topology::AxiLiteToSram => "axi-lite-to-sram",
            Topology::AxiLiteToCsr => "axi-lite-to-csr",
            Topology::AxiLiteDownConverter => "axi-lite-down-converter",
            Topology::AxiLiteToResponder => "axi-lite-to-responder",
            Topology::WishboneToAxiLite => "wishbone-to-axi-lite",
        }
    }

    /// The kind of master that drives this topology.
    pub fn master(self) -> MasterKind {
        match self {
            Topology::AxiToWishbone | Topology::AxiToAxiLite => MasterKind::Axi,
            Topology::WishboneToAxiLite => MasterKind::Wishbone,
            _ => MasterKind::Lite,
        }
    }

    /// Returns `true` if the slave is a scripted AXI4-Lite responder.
    pub fn has_responder(self) -> bool {
        matches!(
            self,
            Topology::AxiToAxiLite
                | Topology::AxiLiteDownConverter
                | Topology::AxiLiteToResponder
                | Topology::WishboneToAxiLite
        )
    }

    /// Returns `true` if the slave is a Wishbone memory.
    pub fn has_wishbone_memory(self) -> bool {
        matches!(self, Topology::AxiToWishbone | Topology::AxiLiteToWishbone)
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bridge construction parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Which arrangement to build.
    pub topology: Topology,
    /// Master-side data width in bits.
    #[serde(default = "default_data_width")]
    pub data_width: u32,
    /// Byte-address width in bits.
    #[serde(default = "default_address_width")]
    pub address_width: u32,
    /// AXI4 id width in bits.
    #[serde(default = "default_id_width")]
    pub id_width: u32,
    /// Slave-side data width of the down-converter.
    pub slave_data_width: Option<u32>,
    /// Byte address subtracted before reaching Wishbone.
    #[serde(default)]
    pub base_address: u64,
    /// Slave-timeout guard in front of Lite-mastered bridges.
    pub timeout_cycles: Option<u32>,
    /// Depth of the SRAM or CSR bank, in words.
    #[serde(default = "default_memory_words")]
    pub memory_words: u64,
    /// Makes the SRAM ignore writes.
    #[serde(default)]
    pub read_only: bool,
    /// Extra slave wait states per transaction.
    #[serde(default)]
    pub latency: u32,
    /// Slave addresses answered with an error: word addresses on a
    /// Wishbone memory, byte addresses on a Lite responder.
    #[serde(default)]
    pub error_addresses: Vec<u64>,
    /// Responder addresses that are never accepted.
    #[serde(default)]
    pub silent_addresses: Vec<u64>,
}

fn default_data_width() -> u32 {
    32
}

fn default_address_width() -> u32 {
    32
}

fn default_id_width() -> u32 {
    4
}

fn default_memory_words() -> u64 {
    1024
}

/// Simulation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Cycle budget for the whole scenario.
    pub max_cycles: u64,
    /// Evaluation passes allowed per cycle.
    pub max_deltas: u32,
    /// VCD output path.
    pub waveform: Option<PathBuf>,
    /// Seed for random backpressure.
    pub seed: u64,
    /// Per-cycle probability that the master stalls its response channels.
    pub stall_probability: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            max_cycles: 100_000,
            max_deltas: 64,
            waveform: None,
            seed: 0,
            stall_probability: 0.0,
        }
    }
}

/// One scripted transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OpSpec {
    /// Single-word read.
    Read {
        /// Byte address (word address on a Wishbone master).
        addr: u64,
        /// Expected read data.
        #[serde(default)]
        expect: Option<WordValue>,
    },
    /// Single-word write.
    Write {
        /// Byte address (word address on a Wishbone master).
        addr: u64,
        /// Write data.
        data: WordValue,
        /// Byte strobes; all lanes when absent.
        #[serde(default)]
        strb: Option<Strobe>,
    },
    /// AXI4 read burst.
    BurstRead {
        /// Start byte address.
        addr: u64,
        /// Burst mode.
        #[serde(default)]
        burst: BurstMode,
        /// Beats minus one.
        len: u8,
        /// log2 bytes per beat; the full bus width when absent.
        #[serde(default)]
        size: Option<u8>,
        /// Transaction id.
        #[serde(default)]
        id: u32,
        /// Expected data per beat.
        #[serde(default)]
        expect: Vec<WordValue>,
    },
    /// AXI4 write burst; the beat count is the length of `data`.
    BurstWrite {
        /// Start byte address.
        addr: u64,
        /// Burst mode.
        #[serde(default)]
        burst: BurstMode,
        /// log2 bytes per beat; the full bus width when absent.
        #[serde(default)]
        size: Option<u8>,
        /// Transaction id.
        #[serde(default)]
        id: u32,
        /// Write data per beat.
        data: Vec<WordValue>,
        /// Byte strobes per beat; all lanes when absent.
        #[serde(default)]
        strb: Option<Vec<Strobe>>,
    },
}

impl OpSpec {
    /// The `kind` tag as written in scenario files.
    pub fn kind(&self) -> &'static str {
        match self {
            OpSpec::Read { .. } => "read",
            OpSpec::Write { .. } => "write",
            OpSpec::BurstRead { .. } => "burst-read",
            OpSpec::BurstWrite { .. } => "burst-write",
        }
    }

    /// Returns `true` for the burst kinds.
    pub fn is_burst(&self) -> bool {
        matches!(self, OpSpec::BurstRead { .. } | OpSpec::BurstWrite { .. })
    }
}

/// A data word written either as a TOML integer or as a string
/// (`"0x…"` hexadecimal or decimal), so values wider than 63 bits fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordValue(pub Word);

impl WordValue {
    /// Parses the string form.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().replace('_', "");
        let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => Word::from_str_radix(hex, 16).ok()?,
            None => text.parse().ok()?,
        };
        Some(Self(value))
    }
}

impl Serialize for WordValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", self.0))
    }
}

impl<'de> Deserialize<'de> for WordValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WordVisitor;

        impl Visitor<'_> for WordVisitor {
            type Value = WordValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a hex string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<WordValue, E> {
                u64::try_from(v)
                    .map(|v| WordValue(Word::from(v)))
                    .map_err(|_| E::custom(format!("negative data word {v}")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<WordValue, E> {
                Ok(WordValue(Word::from(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<WordValue, E> {
                WordValue::parse(v).ok_or_else(|| E::custom(format!("invalid data word '{v}'")))
            }
        }

        deserializer.deserialize_any(WordVisitor)
    }
}
