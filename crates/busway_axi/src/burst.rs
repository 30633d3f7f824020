//! Burst-to-beat segmentation.
//!
//! [`BurstSegmenter`] turns one AXI4 address-channel descriptor into a
//! sequence of per-beat addresses. It holds the descriptor (`burst.ready` is
//! low) until the last beat is consumed.
//!
//! Addressing per mode:
//!
//! | mode  | beat address                                              |
//! |-------|-----------------------------------------------------------|
//! | FIXED | `addr` for every beat                                     |
//! | INCR  | `addr + n * 2^size`                                       |
//! | WRAP  | incrementing inside the aligned `(len + 1) * 2^size` window |
//!
//! A mode outside the configured capability set, or the reserved encoding,
//! is segmented as FIXED.

use busway_common::BurstMode;

use crate::channel::Channel;
use crate::error::BridgeError;
use crate::interface::AxPayload;

/// One beat produced by the segmenter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Beat {
    /// Byte address of this beat.
    pub addr: u64,
    /// Id of the owning burst.
    pub id: u32,
    /// First beat of the burst.
    pub first: bool,
    /// Last beat of the burst.
    pub last: bool,
}

/// Burst segmenter state: beat counter and running address offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstSegmenter {
    incr: bool,
    wrap: bool,
    count: u8,
    offset: u64,
}

impl BurstSegmenter {
    /// Builds a segmenter supporting the listed modes.
    ///
    /// FIXED is mandatory; listing it alone yields a FIXED-only segmenter.
    pub fn new(capabilities: &[BurstMode]) -> Result<Self, BridgeError> {
        if !capabilities.contains(&BurstMode::Fixed) {
            return Err(BridgeError::MissingFixedBurst);
        }
        Ok(Self {
            incr: capabilities.contains(&BurstMode::Incr),
            wrap: capabilities.contains(&BurstMode::Wrap),
            count: 0,
            offset: 0,
        })
    }

    /// A segmenter supporting FIXED, INCR and WRAP.
    pub fn full() -> Self {
        Self {
            incr: true,
            wrap: true,
            count: 0,
            offset: 0,
        }
    }

    /// The mode `burst` is actually segmented as.
    fn effective_mode(&self, burst: BurstMode) -> BurstMode {
        match burst {
            BurstMode::Incr if self.incr => BurstMode::Incr,
            BurstMode::Wrap if self.wrap => BurstMode::Wrap,
            _ => BurstMode::Fixed,
        }
    }

    /// Size in bytes of the WRAP window.
    fn wrap_window(ax: &AxPayload) -> u64 {
        u64::from(ax.beats()) << ax.size
    }

    /// Address of the current beat of `ax`.
    pub fn beat_address(&self, ax: &AxPayload) -> u64 {
        match self.effective_mode(ax.burst) {
            BurstMode::Wrap => {
                let window = Self::wrap_window(ax);
                let base = ax.addr & !(window - 1);
                base | (ax.addr.wrapping_add(self.offset) & (window - 1))
            }
            _ => ax.addr.wrapping_add(self.offset),
        }
    }

    /// Drives the beat channel from the descriptor channel.
    ///
    /// Returns the beat (with `ready` left low) and the descriptor's ready
    /// given the consumer's `beat_ready`.
    pub fn drive(&self, burst: &Channel<AxPayload>, beat_ready: bool) -> (Channel<Beat>, bool) {
        let first = self.count == 0;
        let last = self.count == burst.payload.len;
        let beat = Channel {
            valid: burst.valid || !first,
            ready: false,
            payload: Beat {
                addr: self.beat_address(&burst.payload),
                id: burst.payload.id,
                first,
                last,
            },
        };
        (beat, beat_ready && last)
    }

    /// Advances past the current beat if it was consumed.
    pub fn tick(&mut self, burst: &Channel<AxPayload>, beat_fired: bool) {
        if !beat_fired {
            return;
        }
        let ax = &burst.payload;
        let mode = self.effective_mode(ax.burst);
        let current = self.offset;
        if self.count == ax.len {
            self.count = 0;
            self.offset = 0;
        } else {
            self.count += 1;
            if mode.advances() {
                self.offset += ax.beat_bytes();
            }
        }
        if mode == BurstMode::Wrap && current == u64::from(ax.len) << ax.size {
            self.offset = 0;
        }
    }

    /// Beats consumed so far in the current burst.
    pub fn count(&self) -> u8 {
        self.count
    }
}
