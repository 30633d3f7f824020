//! Bus parameter sets, channel payloads, and whole-bus wire bundles.
//!
//! Every bundle is a plain `Copy` struct of wires so bridges can snapshot and
//! re-evaluate them freely. Field widths are carried by the parameter sets;
//! payload fields use the widest carrier ([`Word`], [`Strobe`], `u64`
//! addresses) and bridges mask to the configured width where it matters.

use busway_common::{BurstMode, DataWidth, Resp, Strobe, Word};
use busway_sim::{Probe, Probes};

use crate::channel::Channel;
use crate::error::BridgeError;

/// Returns a mask covering the low `bits` bits of an address.
pub fn address_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

fn check_address_width(bits: u32) -> Result<u32, BridgeError> {
    if (1..=u64::BITS).contains(&bits) {
        Ok(bits)
    } else {
        Err(BridgeError::InvalidAddressWidth { bits })
    }
}

/// Parameters of a full AXI4 port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxiParams {
    /// Data bus width.
    pub data_width: DataWidth,
    /// Byte-address width in bits.
    pub address_width: u32,
    /// Transaction-id width in bits (0 disables ids).
    pub id_width: u32,
}

impl AxiParams {
    /// Validates and builds a parameter set.
    pub fn new(data_width: u32, address_width: u32, id_width: u32) -> Result<Self, BridgeError> {
        if id_width > 32 {
            return Err(BridgeError::InvalidIdWidth { bits: id_width });
        }
        Ok(Self {
            data_width: DataWidth::new(data_width)?,
            address_width: check_address_width(address_width)?,
            id_width,
        })
    }

    /// The AXI-Lite parameters of a port with the same data and address widths.
    pub fn lite(&self) -> LiteParams {
        LiteParams {
            data_width: self.data_width,
            address_width: self.address_width,
        }
    }
}

/// Parameters of an AXI4-Lite port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteParams {
    /// Data bus width.
    pub data_width: DataWidth,
    /// Byte-address width in bits.
    pub address_width: u32,
}

impl LiteParams {
    /// Validates and builds a parameter set.
    pub fn new(data_width: u32, address_width: u32) -> Result<Self, BridgeError> {
        Ok(Self {
            data_width: DataWidth::new(data_width)?,
            address_width: check_address_width(address_width)?,
        })
    }

    /// Mask covering the byte-address bits.
    pub fn address_mask(&self) -> u64 {
        address_mask(self.address_width)
    }
}

/// Parameters of a word-addressed Wishbone port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WishboneParams {
    /// Data bus width.
    pub data_width: DataWidth,
    /// Word-address width in bits.
    pub address_width: u32,
}

impl WishboneParams {
    /// Validates and builds a parameter set.
    pub fn new(data_width: u32, address_width: u32) -> Result<Self, BridgeError> {
        Ok(Self {
            data_width: DataWidth::new(data_width)?,
            address_width: check_address_width(address_width)?,
        })
    }

    /// Mask covering the word-address bits.
    pub fn address_mask(&self) -> u64 {
        address_mask(self.address_width)
    }
}

/// Parameters of a CSR bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrParams {
    /// Data bus width.
    pub data_width: DataWidth,
    /// Word-address width in bits.
    pub address_width: u32,
}

impl CsrParams {
    /// Validates and builds a parameter set.
    pub fn new(data_width: u32, address_width: u32) -> Result<Self, BridgeError> {
        Ok(Self {
            data_width: DataWidth::new(data_width)?,
            address_width: check_address_width(address_width)?,
        })
    }
}

// ---------------------------------------------------------------------------
// AXI4 payloads
// ---------------------------------------------------------------------------

/// Address-channel payload of a full AXI4 bus (both AW and AR).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxPayload {
    /// Start byte address.
    pub addr: u64,
    /// Burst mode.
    pub burst: BurstMode,
    /// Beats minus one.
    pub len: u8,
    /// log2 of bytes per beat.
    pub size: u8,
    /// Lock type; carried but not interpreted.
    pub lock: u8,
    /// Protection type; carried but not interpreted.
    pub prot: u8,
    /// Memory type; carried but not interpreted.
    pub cache: u8,
    /// Quality of service; carried but not interpreted.
    pub qos: u8,
    /// Transaction id.
    pub id: u32,
}

impl AxPayload {
    /// Number of beats in the burst.
    pub fn beats(&self) -> u32 {
        u32::from(self.len) + 1
    }

    /// Bytes per beat.
    pub fn beat_bytes(&self) -> u64 {
        1 << self.size
    }

    /// Checks the descriptor against the AXI burst rules for a bus of
    /// `data_width`.
    pub fn validate(&self, data_width: DataWidth) -> Result<(), BridgeError> {
        if self.beat_bytes() > u64::from(data_width.bytes()) {
            return Err(BridgeError::InvalidBurst {
                reason: format!(
                    "beat size {} bytes exceeds the {} data bus",
                    self.beat_bytes(),
                    data_width
                ),
            });
        }
        match self.burst {
            BurstMode::Reserved => Err(BridgeError::InvalidBurst {
                reason: "reserved burst encoding".into(),
            }),
            BurstMode::Wrap if !self.beats().is_power_of_two() || self.beats() < 2 => {
                Err(BridgeError::InvalidBurst {
                    reason: format!("WRAP length {} is not a power of two", self.beats()),
                })
            }
            BurstMode::Wrap if self.addr % self.beat_bytes() != 0 => {
                Err(BridgeError::InvalidBurst {
                    reason: format!("WRAP start {:#x} is not beat aligned", self.addr),
                })
            }
            _ => Ok(()),
        }
    }
}

impl Probe for AxPayload {
    fn probe(&self, p: &mut Probes) {
        p.value("addr", 64, u128::from(self.addr));
        p.value("burst", 2, u128::from(self.burst.bits()));
        p.value("len", 8, u128::from(self.len));
        p.value("size", 3, u128::from(self.size));
        p.value("id", 32, u128::from(self.id));
    }
}

/// Write-data payload of a full AXI4 bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WPayload {
    /// Write data.
    pub data: Word,
    /// Byte strobes.
    pub strb: Strobe,
    /// Transaction id.
    pub id: u32,
    /// Last beat of the burst.
    pub last: bool,
}

impl Probe for WPayload {
    fn probe(&self, p: &mut Probes) {
        p.value("data", 128, self.data);
        p.value("strb", 16, u128::from(self.strb));
        p.bit("last", self.last);
    }
}

/// Write-response payload of a full AXI4 bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BPayload {
    /// Response code.
    pub resp: Resp,
    /// Transaction id.
    pub id: u32,
}

impl Probe for BPayload {
    fn probe(&self, p: &mut Probes) {
        p.value("resp", 2, u128::from(self.resp.bits()));
        p.value("id", 32, u128::from(self.id));
    }
}

/// Read-data payload of a full AXI4 bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RPayload {
    /// Response code.
    pub resp: Resp,
    /// Read data.
    pub data: Word,
    /// Transaction id.
    pub id: u32,
    /// Last beat of the burst.
    pub last: bool,
}

impl Probe for RPayload {
    fn probe(&self, p: &mut Probes) {
        p.value("resp", 2, u128::from(self.resp.bits()));
        p.value("data", 128, self.data);
        p.value("id", 32, u128::from(self.id));
        p.bit("last", self.last);
    }
}

// ---------------------------------------------------------------------------
// AXI4-Lite payloads
// ---------------------------------------------------------------------------

/// Address-channel payload of an AXI4-Lite bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiteAx {
    /// Byte address.
    pub addr: u64,
}

impl Probe for LiteAx {
    fn probe(&self, p: &mut Probes) {
        p.value("addr", 64, u128::from(self.addr));
    }
}

/// Write-data payload of an AXI4-Lite bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiteW {
    /// Write data.
    pub data: Word,
    /// Byte strobes.
    pub strb: Strobe,
}

impl Probe for LiteW {
    fn probe(&self, p: &mut Probes) {
        p.value("data", 128, self.data);
        p.value("strb", 16, u128::from(self.strb));
    }
}

/// Write-response payload of an AXI4-Lite bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiteB {
    /// Response code.
    pub resp: Resp,
}

impl Probe for LiteB {
    fn probe(&self, p: &mut Probes) {
        p.value("resp", 2, u128::from(self.resp.bits()));
    }
}

/// Read-data payload of an AXI4-Lite bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiteR {
    /// Response code.
    pub resp: Resp,
    /// Read data.
    pub data: Word,
}

impl Probe for LiteR {
    fn probe(&self, p: &mut Probes) {
        p.value("resp", 2, u128::from(self.resp.bits()));
        p.value("data", 128, self.data);
    }
}

// ---------------------------------------------------------------------------
// Bundles
// ---------------------------------------------------------------------------

/// All five channels of a full AXI4 bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxiBus {
    /// Write address.
    pub aw: Channel<AxPayload>,
    /// Write data.
    pub w: Channel<WPayload>,
    /// Write response.
    pub b: Channel<BPayload>,
    /// Read address.
    pub ar: Channel<AxPayload>,
    /// Read data.
    pub r: Channel<RPayload>,
}

impl Probe for AxiBus {
    fn probe(&self, p: &mut Probes) {
        p.scope("aw", |p| self.aw.probe(p));
        p.scope("w", |p| self.w.probe(p));
        p.scope("b", |p| self.b.probe(p));
        p.scope("ar", |p| self.ar.probe(p));
        p.scope("r", |p| self.r.probe(p));
    }
}

/// All five channels of an AXI4-Lite bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxiLiteBus {
    /// Write address.
    pub aw: Channel<LiteAx>,
    /// Write data.
    pub w: Channel<LiteW>,
    /// Write response.
    pub b: Channel<LiteB>,
    /// Read address.
    pub ar: Channel<LiteAx>,
    /// Read data.
    pub r: Channel<LiteR>,
}

impl AxiLiteBus {
    /// Forwards every channel from `master` to `slave`.
    pub fn connect(master: &mut AxiLiteBus, slave: &mut AxiLiteBus) {
        Channel::connect(&mut master.aw, &mut slave.aw);
        Channel::connect(&mut master.w, &mut slave.w);
        Channel::connect(&mut slave.b, &mut master.b);
        Channel::connect(&mut master.ar, &mut slave.ar);
        Channel::connect(&mut slave.r, &mut master.r);
    }

    /// Returns `true` if a write (address or data) is waiting to be accepted.
    pub fn write_pending(&self) -> bool {
        self.aw.stalled() || self.w.stalled()
    }

    /// Returns `true` if a read address is waiting to be accepted.
    pub fn read_pending(&self) -> bool {
        self.ar.stalled()
    }
}

impl Probe for AxiLiteBus {
    fn probe(&self, p: &mut Probes) {
        p.scope("aw", |p| self.aw.probe(p));
        p.scope("w", |p| self.w.probe(p));
        p.scope("b", |p| self.b.probe(p));
        p.scope("ar", |p| self.ar.probe(p));
        p.scope("r", |p| self.r.probe(p));
    }
}

/// A classic-cycle Wishbone bus with word addressing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WishboneBus {
    /// Word address.
    pub adr: u64,
    /// Master-to-slave data.
    pub dat_w: Word,
    /// Slave-to-master data.
    pub dat_r: Word,
    /// Byte selects.
    pub sel: Strobe,
    /// Bus cycle in progress.
    pub cyc: bool,
    /// Strobe: a transfer is requested.
    pub stb: bool,
    /// Slave acknowledge.
    pub ack: bool,
    /// Write enable.
    pub we: bool,
    /// Slave error.
    pub err: bool,
}

impl WishboneBus {
    /// Returns `true` when the master is requesting a transfer.
    pub fn request(&self) -> bool {
        self.cyc && self.stb
    }
}

impl Probe for WishboneBus {
    fn probe(&self, p: &mut Probes) {
        p.value("adr", 64, u128::from(self.adr));
        p.value("dat_w", 128, self.dat_w);
        p.value("dat_r", 128, self.dat_r);
        p.value("sel", 16, u128::from(self.sel));
        p.bit("cyc", self.cyc);
        p.bit("stb", self.stb);
        p.bit("ack", self.ack);
        p.bit("we", self.we);
        p.bit("err", self.err);
    }
}

/// A CSR bus: one access per cycle, read data registered by one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsrBus {
    /// Word address.
    pub adr: u64,
    /// Write enable.
    pub we: bool,
    /// Write data.
    pub dat_w: Word,
    /// Read data.
    pub dat_r: Word,
}

impl Probe for CsrBus {
    fn probe(&self, p: &mut Probes) {
        p.value("adr", 64, u128::from(self.adr));
        p.bit("we", self.we);
        p.value("dat_w", 128, self.dat_w);
        p.value("dat_r", 128, self.dat_r);
    }
}

/// A simple memory-style port: address, write-enable mask, data in and out.
///
/// `we` is either a single bit or a per-byte mask depending on the
/// adapter's write-enable granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplePort {
    /// Word address.
    pub adr: u64,
    /// Write enable.
    pub we: Strobe,
    /// Write data.
    pub dat_w: Word,
    /// Read data, registered by the port owner.
    pub dat_r: Word,
}

impl Probe for SimplePort {
    fn probe(&self, p: &mut Probes) {
        p.value("adr", 64, u128::from(self.adr));
        p.value("we", 16, u128::from(self.we));
        p.value("dat_w", 128, self.dat_w);
        p.value("dat_r", 128, self.dat_r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dw(bits: u32) -> DataWidth {
        DataWidth::new(bits).unwrap()
    }

    #[test]
    fn params_validate_widths() {
        assert!(AxiParams::new(32, 32, 4).is_ok());
        assert!(matches!(
            AxiParams::new(24, 32, 4),
            Err(BridgeError::InvalidDataWidth(_))
        ));
        assert!(matches!(
            AxiParams::new(32, 0, 4),
            Err(BridgeError::InvalidAddressWidth { bits: 0 })
        ));
        assert!(matches!(
            AxiParams::new(32, 32, 33),
            Err(BridgeError::InvalidIdWidth { bits: 33 })
        ));
        assert!(matches!(
            LiteParams::new(32, 65),
            Err(BridgeError::InvalidAddressWidth { bits: 65 })
        ));
    }

    #[test]
    fn lite_view_of_full_params() {
        let axi = AxiParams::new(64, 40, 8).unwrap();
        let lite = axi.lite();
        assert_eq!(lite.data_width.bits(), 64);
        assert_eq!(lite.address_width, 40);
        assert_eq!(lite.address_mask(), (1 << 40) - 1);
    }

    #[test]
    fn address_mask_full_width() {
        assert_eq!(address_mask(64), u64::MAX);
        assert_eq!(address_mask(12), 0xFFF);
    }

    #[test]
    fn burst_validation() {
        let incr = AxPayload {
            addr: 0x1000,
            len: 3,
            size: 2,
            ..AxPayload::default()
        };
        assert!(incr.validate(dw(32)).is_ok());

        let too_wide = AxPayload { size: 3, ..incr };
        assert!(matches!(
            too_wide.validate(dw(32)),
            Err(BridgeError::InvalidBurst { .. })
        ));

        let reserved = AxPayload {
            burst: BurstMode::Reserved,
            ..incr
        };
        assert!(reserved.validate(dw(32)).is_err());

        let wrap3 = AxPayload {
            burst: BurstMode::Wrap,
            len: 2,
            ..incr
        };
        assert!(wrap3.validate(dw(32)).is_err());

        let wrap4 = AxPayload {
            burst: BurstMode::Wrap,
            addr: 0x1008,
            ..incr
        };
        assert!(wrap4.validate(dw(32)).is_ok());

        let wrap_unaligned = AxPayload { addr: 0x1009, ..wrap4 };
        assert!(wrap_unaligned.validate(dw(32)).is_err());
    }

    #[test]
    fn lite_connect_and_pending() {
        let mut master = AxiLiteBus::default();
        let mut slave = AxiLiteBus::default();
        master.aw.valid = true;
        master.aw.payload.addr = 0x40;
        slave.aw.ready = false;
        slave.r.valid = true;
        slave.r.payload.data = 9;
        AxiLiteBus::connect(&mut master, &mut slave);
        assert!(slave.aw.valid);
        assert_eq!(slave.aw.payload.addr, 0x40);
        assert!(master.r.valid);
        assert_eq!(master.r.payload.data, 9);
        assert!(master.write_pending());
        assert!(!master.read_pending());
    }

    #[test]
    fn bus_probe_names() {
        let probes = AxiLiteBus::default().sample();
        assert_eq!(probes.get("aw.valid"), Some(0));
        assert_eq!(probes.get("r.payload.data"), None);
        assert_eq!(probes.get("r.data"), Some(0));
        assert_eq!(probes.samples().len(), 3 + 4 + 3 + 3 + 4);
    }
}
