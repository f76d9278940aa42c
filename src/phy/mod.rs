// Bit-level primitives: conversions, CRC and line codes

pub mod bits;
pub mod crc;
pub mod line_coding;

pub use crc::Crc;

/// Output of one transform stage: the new bits plus how many anomalies the
/// stage ran into while producing them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutput {
    pub bits: Vec<bool>,
    pub errors: usize,
}

impl StageOutput {
    pub fn new(bits: Vec<bool>, errors: usize) -> Self {
        Self { bits, errors }
    }

    pub fn clean(bits: Vec<bool>) -> Self {
        Self { bits, errors: 0 }
    }

    /// No output, `errors` anomalies
    pub fn failed(errors: usize) -> Self {
        Self {
            bits: Vec::new(),
            errors,
        }
    }
}
