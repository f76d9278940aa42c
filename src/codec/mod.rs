//! Codec engine: runs a [`Chain`] over a bit sequence.
//!
//! Decoding walks the chain front to back, encoding back to front, so a chain
//! is written in "what to undo first" order. Stage parameters are copied into
//! the codec's working state right before a stage runs and stay there between
//! calls; a whitening parameter that does not parse leaves the previous
//! whitening configuration in place.
//!
//! Not reentrant: every run takes `&mut self`. Share a codec between threads
//! behind a `Mutex`.

pub mod chain;
pub mod external;
pub mod transforms;
pub mod whitening;

pub use chain::{Chain, Stage};
pub use external::ExternalPrograms;
pub use transforms::SubstitutionTable;
pub use whitening::{DataWhitening, Lfsr, WhiteningConfig, WhiteningFault};

use tracing::{debug, trace};

use crate::error::ChainError;
use crate::phy::StageOutput;
use crate::phy::line_coding;

pub struct Codec {
    chain: Chain,
    multiple: usize,
    carrier: Vec<bool>,
    substitution: SubstitutionTable,
    external: ExternalPrograms,
    whitening: DataWhitening,
    symbol_ratio: f64,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(Chain::default())
    }
}

impl Codec {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            multiple: 1,
            carrier: Vec::new(),
            substitution: SubstitutionTable::default(),
            external: ExternalPrograms::default(),
            whitening: DataWhitening::default(),
            symbol_ratio: 1.0,
        }
    }

    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ChainError> {
        Ok(Self::new(Chain::from_tokens(tokens)?))
    }

    /// Replace the chain wholesale. Working state is kept.
    pub fn set_chain(&mut self, chain: Chain) {
        self.chain = chain;
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn name(&self) -> &str {
        self.chain.name()
    }

    pub fn is_nrz(&self) -> bool {
        self.chain.is_nrz()
    }

    /// Output length / input length of the last non-empty run
    pub fn symbol_ratio(&self) -> f64 {
        self.symbol_ratio
    }

    /// [`symbol_ratio`](Self::symbol_ratio) truncated to whole bits
    pub fn symbol_len(&self) -> usize {
        self.symbol_ratio as usize
    }

    pub fn whitening(&self) -> &DataWhitening {
        &self.whitening
    }

    pub fn encode(&mut self, bits: &[bool]) -> Vec<bool> {
        self.process(false, bits).bits
    }

    pub fn decode(&mut self, bits: &[bool]) -> Vec<bool> {
        self.process(true, bits).bits
    }

    /// Error count of a decode run
    pub fn analyze(&mut self, bits: &[bool]) -> usize {
        self.process(true, bits).errors
    }

    /// Run the whole chain. `decoding` runs it forward, otherwise in reverse.
    pub fn process(&mut self, decoding: bool, bits: &[bool]) -> StageOutput {
        let chain = self.chain.clone();
        let mut current = bits.to_vec();
        let mut errors = 0;

        let order: Vec<&Stage> = if decoding {
            chain.stages().iter().collect()
        } else {
            chain.stages().iter().rev().collect()
        };

        for stage in order {
            self.load_params(stage);

            // An emptied buffer stays empty
            if current.is_empty() {
                continue;
            }

            let out = self.run_stage(stage, decoding, &current);
            trace!(
                "{} {}: {} -> {} bits, {} errors",
                stage.keyword(),
                if decoding { "decode" } else { "encode" },
                current.len(),
                out.bits.len(),
                out.errors
            );
            errors += out.errors;
            current = out.bits;
        }

        if !bits.is_empty() {
            self.symbol_ratio = current.len() as f64 / bits.len() as f64;
        }

        debug!(
            "Chain {:?} {} {} -> {} bits with {} errors",
            self.chain.name(),
            if decoding { "decoded" } else { "encoded" },
            bits.len(),
            current.len(),
            errors
        );

        StageOutput::new(current, errors)
    }

    fn load_params(&mut self, stage: &Stage) {
        match stage {
            Stage::Redundancy(multiple) => self.multiple = *multiple,
            Stage::Carrier(pattern) => self.carrier = pattern.clone(),
            Stage::Substitution(table) => self.substitution = table.clone(),
            Stage::External(programs) => self.external = programs.clone(),
            Stage::DataWhitening(param) => {
                self.whitening.apply_param(param);
            }
            Stage::Invert | Stage::Differential | Stage::BitOrder | Stage::Edge => {}
        }
    }

    fn run_stage(&mut self, stage: &Stage, decoding: bool, bits: &[bool]) -> StageOutput {
        match stage {
            Stage::Invert => transforms::invert(bits),
            Stage::Differential => line_coding::differential(decoding, bits),
            Stage::Redundancy(_) => transforms::redundancy(decoding, bits, self.multiple),
            Stage::DataWhitening(_) => self.whitening.apply(decoding, bits),
            Stage::Carrier(_) => transforms::carrier(decoding, bits, &self.carrier),
            Stage::BitOrder => transforms::bit_order(bits),
            Stage::Edge => line_coding::edge(decoding, bits),
            Stage::Substitution(_) => transforms::substitution(decoding, bits, &self.substitution),
            Stage::External(_) => external::external_program(decoding, bits, &self.external),
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::bits::{bits_to_string, parse_bits};
    use crate::utils::consts::*;

    fn bits(text: &str) -> Vec<bool> {
        parse_bits(text).unwrap()
    }

    #[test]
    fn test_nrz_passes_through() {
        let mut codec = Codec::default();
        let data = bits("1011001");
        assert_eq!(codec.decode(&data), data);
        assert_eq!(codec.encode(&data), data);
        assert_eq!(codec.symbol_len(), 1);
        assert!(codec.is_nrz());
    }

    #[test]
    fn test_encode_runs_chain_in_reverse() {
        // decode: edge first, then invert; encode: invert first, then edge
        let mut codec =
            Codec::from_tokens(&["Manchester inverted", DECODING_EDGE, DECODING_INVERT]).unwrap();
        let encoded = codec.encode(&bits("10"));
        // invert -> 01, edge -> 10 01
        assert_eq!(bits_to_string(&encoded), "1001");
        assert_eq!(codec.symbol_len(), 2);

        let decoded = codec.process(true, &encoded);
        assert_eq!(bits_to_string(&decoded.bits), "10");
        assert_eq!(decoded.errors, 0);
        assert!((codec.symbol_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_errors_accumulate_across_stages() {
        let mut codec = Codec::from_tokens(&[
            "n",
            DECODING_EDGE,
            DECODING_BITORDER,
        ])
        .unwrap();
        // leading "11" is one edge error, "10 01 10" gives 3 bits, 3 % 8 = 3 bit order errors
        let out = codec.process(true, &bits("1100110"));
        assert_eq!(bits_to_string(&out.bits), "010");
        assert_eq!(out.errors, 1 + 3);
    }

    #[test]
    fn test_empty_buffer_skips_remaining_stages() {
        let mut codec = Codec::from_tokens(&[
            "n",
            DECODING_CARRIER,
            "1",
            DECODING_REDUNDANCY,
            "1",
            DECODING_INVERT,
        ])
        .unwrap();
        let out = codec.process(true, &bits("1110"));
        assert!(out.bits.is_empty());
        assert_eq!(out.errors, 0);
        // empty output still records the ratio
        assert_eq!(codec.symbol_len(), 0);
    }

    #[test]
    fn test_empty_input_keeps_previous_symbol_len() {
        let mut codec = Codec::from_tokens(&["n", DECODING_REDUNDANCY, "3"]).unwrap();
        codec.encode(&bits("10"));
        assert_eq!(codec.symbol_len(), 3);
        assert!(codec.encode(&[]).is_empty());
        assert_eq!(codec.symbol_len(), 3);
    }

    #[test]
    fn test_working_state_persists_between_chains() {
        let mut codec = Codec::from_tokens(&[
            "n",
            DECODING_DATAWHITENING,
            "0x67686768;0x21;0x8",
        ])
        .unwrap();
        codec.decode(&bits("0101"));
        assert_eq!(codec.whitening().config.to_param(), "0x67686768;0x21;0x8");

        // an unusable whitening parameter keeps what the last chain set up
        codec.set_chain(Chain::from_tokens(&["n", DECODING_DATAWHITENING, "bogus"]).unwrap());
        codec.decode(&bits("0101"));
        assert_eq!(codec.whitening().config.to_param(), "0x67686768;0x21;0x8");
    }

    #[test]
    fn test_substitution_and_redundancy_chain() {
        let mut codec = Codec::from_tokens(&[
            "4b",
            DECODING_REDUNDANCY,
            "2",
            DECODING_SUBSTITUTION,
            "01:1;10:0;",
        ])
        .unwrap();
        let data = bits("1001");
        let encoded = codec.encode(&data);
        // substitution 1->01, 0->10, then every bit doubled
        assert_eq!(bits_to_string(&encoded), "0011110011000011");
        let decoded = codec.process(true, &encoded);
        assert_eq!(decoded.bits, data);
        assert_eq!(decoded.errors, 0);
    }

    #[test]
    fn test_oversized_multiplier_is_counted_not_fatal() {
        let mut codec =
            Codec::from_tokens(&["n", DECODING_REDUNDANCY, "18446744073709551615"]).unwrap();
        let out = codec.process(false, &bits("10"));
        assert!(out.bits.is_empty());
        assert_eq!(out.errors, 1);
    }

    #[test]
    fn test_missing_external_decoder_fails_chain() {
        let mut codec = Codec::from_tokens(&["ext", DECODING_EXTERNAL, ";./enc", DECODING_INVERT])
            .unwrap();
        let out = codec.process(true, &bits("1010"));
        assert!(out.bits.is_empty());
        assert_eq!(out.errors, 1);
    }

    #[test]
    fn test_whitening_fault_code_reaches_caller() {
        let mut codec = Codec::from_tokens(&["cc1101", DECODING_DATAWHITENING]).unwrap();
        let input = bits("0000111100001111");
        let out = codec.process(true, &input);
        assert_eq!(WhiteningFault::from_code(out.errors), Some(WhiteningFault::SyncNotFound));
        // duplicated last bit trimmed, otherwise untouched
        assert_eq!(out.bits, input[..input.len() - 1]);
    }
}
