//! Waveform recording for simulation output.
//!
//! The [`WaveformRecorder`] trait abstracts waveform output. [`VcdRecorder`]
//! implements the IEEE 1364 Value Change Dump (VCD) format with one timestamp
//! per clock cycle, so handshakes can be inspected in GTKWave or Surfer.

use std::io::Write;

use crate::error::SimError;

/// Trait for recording simulation waveforms.
pub trait WaveformRecorder {
    /// Registers signal `index` under `name` with the given bit width.
    fn register_signal(&mut self, index: usize, name: &str, width: u32) -> Result<(), SimError>;

    /// Opens a new scope (hierarchy level) in the waveform.
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError>;

    /// Closes the current scope.
    fn end_scope(&mut self) -> Result<(), SimError>;

    /// Records a value change of signal `index` at `cycle`.
    fn record_change(&mut self, cycle: u64, index: usize, value: u128) -> Result<(), SimError>;

    /// Finalizes the waveform output (flush, write trailer, etc.).
    fn finalize(&mut self) -> Result<(), SimError>;
}

/// VCD (Value Change Dump) format recorder following IEEE 1364.
///
/// Signal identifiers use printable ASCII characters starting from `!` (0x21).
pub struct VcdRecorder<W: Write> {
    writer: W,
    signals: Vec<Option<(String, u32)>>, // indexed by signal index: (id_code, width)
    next_id: u32,
    header_written: bool,
    current_cycle: Option<u64>,
    timescale: String,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a new VCD recorder writing to the given output.
    ///
    /// One clock cycle is written as one `1ns` time unit.
    pub fn new(writer: W) -> Self {
        Self::with_timescale(writer, "1ns")
    }

    /// Creates a recorder with an explicit per-cycle timescale (e.g. `"10ns"`).
    pub fn with_timescale(writer: W, timescale: &str) -> Self {
        Self {
            writer,
            signals: Vec::new(),
            next_id: 0,
            header_written: false,
            current_cycle: None,
            timescale: timescale.to_string(),
        }
    }

    /// Consumes the recorder, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ensure_header(&mut self) -> Result<(), SimError> {
        if self.header_written {
            return Ok(());
        }
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  busway cycle simulator")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  {}", self.timescale)?;
        writeln!(self.writer, "$end")?;
        self.header_written = true;
        Ok(())
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Multi-character codes are generated for indices >= 94.
    fn make_id_code(index: u32) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            let c = (b'!' + (idx % 94) as u8) as char;
            result.push(c);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    fn format_value(value: u128, width: u32) -> String {
        if width == 1 {
            let bit = if value & 1 == 1 { "1" } else { "0" };
            bit.to_string()
        } else {
            let mut s = String::with_capacity(width as usize + 1);
            s.push('b');
            for i in (0..width).rev() {
                s.push(if (value >> i) & 1 == 1 { '1' } else { '0' });
            }
            s
        }
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn register_signal(&mut self, index: usize, name: &str, width: u32) -> Result<(), SimError> {
        self.ensure_header()?;
        let id_code = Self::make_id_code(self.next_id);
        self.next_id += 1;

        writeln!(self.writer, "$var wire {width} {id_code} {name} $end")?;

        if self.signals.len() <= index {
            self.signals.resize(index + 1, None);
        }
        self.signals[index] = Some((id_code, width));
        Ok(())
    }

    fn begin_scope(&mut self, name: &str) -> Result<(), SimError> {
        self.ensure_header()?;
        writeln!(self.writer, "$scope module {name} $end")?;
        Ok(())
    }

    fn end_scope(&mut self) -> Result<(), SimError> {
        writeln!(self.writer, "$upscope $end")?;
        Ok(())
    }

    fn record_change(&mut self, cycle: u64, index: usize, value: u128) -> Result<(), SimError> {
        self.ensure_header()?;

        if self.current_cycle != Some(cycle) {
            if self.current_cycle.is_none() {
                writeln!(self.writer, "$enddefinitions $end")?;
                writeln!(self.writer, "$dumpvars")?;
            }
            writeln!(self.writer, "#{cycle}")?;
            self.current_cycle = Some(cycle);
        }

        let (id_code, width) = self
            .signals
            .get(index)
            .and_then(|s| s.as_ref())
            .ok_or(SimError::UnregisteredSignal { index })?;

        let val_str = Self::format_value(value, *width);
        if *width == 1 {
            writeln!(self.writer, "{val_str}{id_code}")?;
        } else {
            writeln!(self.writer, "{val_str} {id_code}")?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SimError> {
        if self.current_cycle.is_none() {
            self.ensure_header()?;
            writeln!(self.writer, "$enddefinitions $end")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
