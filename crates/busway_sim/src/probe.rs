//! Observable wire enumeration for waveform dumps and debugging.
//!
//! A wire bundle implements [`Probe`] by reporting each of its signals to a
//! [`Probes`] collector under a dotted hierarchical name. The enumeration
//! order must be stable between calls: the kernel registers signals once and
//! afterwards matches samples to registrations by position.

/// One sampled signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSample {
    /// Dotted hierarchical name, e.g. `axi.aw.valid`.
    pub name: String,
    /// Width in bits.
    pub width: u32,
    /// Sampled value, truncated to `width` bits.
    pub value: u128,
}

/// Collector handed to [`Probe::probe`].
#[derive(Debug, Default)]
pub struct Probes {
    prefix: Vec<String>,
    samples: Vec<ProbeSample>,
}

impl Probes {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with `name` pushed onto the hierarchical prefix.
    pub fn scope(&mut self, name: &str, f: impl FnOnce(&mut Probes)) {
        self.prefix.push(name.to_string());
        f(self);
        self.prefix.pop();
    }

    /// Records a single-bit signal.
    pub fn bit(&mut self, name: &str, value: bool) {
        self.value(name, 1, u128::from(value));
    }

    /// Records a multi-bit signal, masking `value` to `width` bits.
    pub fn value(&mut self, name: &str, width: u32, value: u128) {
        let masked = if width >= u128::BITS {
            value
        } else {
            value & ((1u128 << width) - 1)
        };
        let mut full = self.prefix.join(".");
        if !full.is_empty() {
            full.push('.');
        }
        full.push_str(name);
        self.samples.push(ProbeSample {
            name: full,
            width,
            value: masked,
        });
    }

    /// Returns the collected samples in enumeration order.
    pub fn samples(&self) -> &[ProbeSample] {
        &self.samples
    }

    /// Consumes the collector, returning its samples.
    pub fn into_samples(self) -> Vec<ProbeSample> {
        self.samples
    }

    /// Looks up a sample by its full dotted name.
    pub fn get(&self, name: &str) -> Option<u128> {
        self.samples
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.value)
    }
}

/// A bundle of wires that can report its signals.
pub trait Probe {
    /// Reports every signal of `self` to `probes`, in a stable order.
    fn probe(&self, probes: &mut Probes);

    /// Convenience wrapper collecting all samples into a fresh collector.
    fn sample(&self) -> Probes {
        let mut probes = Probes::new();
        self.probe(&mut probes);
        probes
    }
}

impl Probe for () {
    fn probe(&self, _probes: &mut Probes) {}
}
