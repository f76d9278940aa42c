//! Pure bit transforms used by the chain stages.
//!
//! Every transform takes the direction (`decoding`) and the current buffer
//! and returns the new buffer with its anomaly count. Parameters are passed
//! in explicitly; the [`Codec`](super::Codec) owns the working state.

use tracing::warn;

use crate::error::ChainError;
use crate::phy::StageOutput;
use crate::phy::bits::{bits_to_string, parse_bits};

/// Bitwise NOT. Self-inverse.
pub fn invert(bits: &[bool]) -> StageOutput {
    StageOutput::clean(bits.iter().map(|&b| !b).collect())
}

/// Redundancy coding with multiplier `multiple`.
///
/// Encoding repeats every bit `multiple` times. Decoding counts runs: each
/// time a run reaches `multiple` one bit is emitted and the counter restarts,
/// a value change with a partial run pending counts as one error.
/// A multiplier below 2 produces no output. An encoded length that does not
/// fit in memory yields no bits and one error.
pub fn redundancy(decoding: bool, bits: &[bool], multiple: usize) -> StageOutput {
    if bits.is_empty() || multiple <= 1 {
        return StageOutput::default();
    }

    if !decoding {
        let Some(len) = bits.len().checked_mul(multiple) else {
            warn!("Redundancy multiplier {} overflows {} bits", multiple, bits.len());
            return StageOutput::failed(1);
        };
        let mut out = Vec::with_capacity(len);
        for &bit in bits {
            out.extend(std::iter::repeat_n(bit, multiple));
        }
        return StageOutput::clean(out);
    }

    let mut out = Vec::with_capacity(bits.len() / multiple + 1);
    let mut errors = 0;
    let mut count = 0;
    let mut current: Option<bool> = None;

    for &bit in bits {
        if current != Some(bit) {
            if current.is_some() && count > 0 {
                errors += 1;
            }
            count = 0;
            current = Some(bit);
        }
        count += 1;
        if count >= multiple {
            out.push(bit);
            count = 0;
        }
    }

    StageOutput::new(out, errors)
}

/// Carrier removal/insertion.
///
/// Encoded layout: `C b0 C b1 ... C b(n-1) C`. Decoding keeps the bits at
/// `L, 2L+1, 3L+2, ...` for a carrier of length L. Empty carrier gives empty
/// output.
pub fn carrier(decoding: bool, bits: &[bool], pattern: &[bool]) -> StageOutput {
    if pattern.is_empty() {
        return StageOutput::default();
    }

    if decoding {
        let out = bits
            .iter()
            .skip(pattern.len())
            .step_by(pattern.len() + 1)
            .copied()
            .collect();
        StageOutput::clean(out)
    } else {
        let mut out = Vec::with_capacity((bits.len() + 1) * pattern.len() + bits.len());
        for &bit in bits {
            out.extend_from_slice(pattern);
            out.push(bit);
        }
        out.extend_from_slice(pattern);
        StageOutput::clean(out)
    }
}

/// Swap LSB-first and MSB-first inside every complete byte. Leftover bits
/// stay as they are and each one counts as an error.
pub fn bit_order(bits: &[bool]) -> StageOutput {
    let mut out = bits.to_vec();
    for byte in out.chunks_exact_mut(8) {
        byte.reverse();
    }
    StageOutput::new(out, bits.len() % 8)
}

/// Fixed-width substitution table: `src[i]` maps to `dst[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    pub src: Vec<Vec<bool>>,
    pub dst: Vec<Vec<bool>>,
}

impl SubstitutionTable {
    /// Parse `src1:dst1;src2:dst2;...`. Empty entries are skipped, so a
    /// trailing `;` is fine.
    pub fn parse(text: &str) -> Result<Self, ChainError> {
        let mut table = Self::default();
        for entry in text.split(';').filter(|e| !e.is_empty()) {
            let invalid = || ChainError::InvalidSubstitution(entry.to_string());
            let (src, dst) = entry.split_once(':').ok_or_else(invalid)?;
            if dst.contains(':') {
                return Err(invalid());
            }
            table.src.push(parse_bits(src).ok_or_else(invalid)?);
            table.dst.push(parse_bits(dst).ok_or_else(invalid)?);
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty() || self.dst.is_empty()
    }

    /// The matching window: length of the first source entry
    pub fn item_size(&self) -> usize {
        self.src.first().map_or(0, Vec::len)
    }
}

impl std::fmt::Display for SubstitutionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.src.len() != self.dst.len() {
            return Ok(());
        }
        for (src, dst) in self.src.iter().zip(&self.dst) {
            write!(f, "{}:{};", bits_to_string(src), bits_to_string(dst))?;
        }
        Ok(())
    }
}

/// Table lookup over non-overlapping windows of the table's item size.
/// Encoding uses the table backwards. A window with zero or several matching
/// entries counts one error and the scan moves on by a single bit.
pub fn substitution(decoding: bool, bits: &[bool], table: &SubstitutionTable) -> StageOutput {
    if table.is_empty() {
        return StageOutput::failed(1);
    }

    let (src, dst) = if decoding {
        (&table.src, &table.dst)
    } else {
        (&table.dst, &table.src)
    };
    let size = src[0].len();

    let mut out = Vec::new();
    let mut errors = 0;
    let mut i = 0;

    while i < bits.len() {
        let window = &bits[i..(i + size).min(bits.len())];
        let mut matches = src
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.as_slice() == window);

        match (matches.next(), matches.next()) {
            (Some((index, _)), None) => {
                if let Some(mapped) = dst.get(index) {
                    out.extend_from_slice(mapped);
                }
                // An empty item size would never advance
                i += size.max(1);
            }
            _ => {
                errors += 1;
                i += 1;
            }
        }
    }

    StageOutput::new(out, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(text: &str) -> Vec<bool> {
        parse_bits(text).unwrap()
    }

    #[test]
    fn test_invert_involution() {
        let data = bits("1100101000111");
        let once = invert(&data);
        assert_eq!(bits_to_string(&once.bits), "0011010111000");
        assert_eq!(invert(&once.bits).bits, data);
        assert_eq!(once.errors, 0);
    }

    #[test]
    fn test_redundancy_encode() {
        let encoded = redundancy(false, &bits("101"), 3);
        assert_eq!(bits_to_string(&encoded.bits), "111000111");
    }

    #[test]
    fn test_redundancy_decode_without_noise() {
        let decoded = redundancy(true, &bits("11001111"), 2);
        assert_eq!(bits_to_string(&decoded.bits), "1011");
        assert_eq!(decoded.errors, 0);
    }

    #[test]
    fn test_redundancy_decode_counts_broken_runs() {
        // "11" ok, "0" breaks off, "111" yields one bit with a leftover
        let decoded = redundancy(true, &bits("110111"), 2);
        assert_eq!(bits_to_string(&decoded.bits), "11");
        assert_eq!(decoded.errors, 1);

        // trailing partial run is not an error on its own
        let decoded = redundancy(true, &bits("1110"), 3);
        assert_eq!(bits_to_string(&decoded.bits), "1");
        assert_eq!(decoded.errors, 0);
    }

    #[test]
    fn test_redundancy_multiplier_one_yields_nothing() {
        assert!(redundancy(true, &bits("1010"), 1).bits.is_empty());
        assert!(redundancy(false, &bits("1010"), 0).bits.is_empty());
    }

    #[test]
    fn test_redundancy_huge_multiplier_fails_cleanly() {
        assert_eq!(redundancy(false, &bits("10"), usize::MAX), StageOutput::failed(1));
        // decoding never allocates by the multiplier
        let decoded = redundancy(true, &bits("1100"), usize::MAX);
        assert!(decoded.bits.is_empty());
    }

    #[test]
    fn test_carrier_encode_decode() {
        let carrier_bits = bits("1");
        let encoded = carrier(false, &bits("10"), &carrier_bits);
        assert_eq!(bits_to_string(&encoded.bits), "11101");
        let decoded = carrier(true, &encoded.bits, &carrier_bits);
        assert_eq!(bits_to_string(&decoded.bits), "10");
    }

    #[test]
    fn test_carrier_multi_bit_pattern() {
        let pattern = bits("01");
        let encoded = carrier(false, &bits("110"), &pattern);
        assert_eq!(bits_to_string(&encoded.bits), "01101101001");
        let decoded = carrier(true, &encoded.bits, &pattern);
        assert_eq!(bits_to_string(&decoded.bits), "110");
        assert!(carrier(true, &encoded.bits, &[]).bits.is_empty());
    }

    #[test]
    fn test_bit_order_swaps_whole_bytes() {
        let swapped = bit_order(&bits("10000000" /* byte */));
        assert_eq!(bits_to_string(&swapped.bits), "00000001");
        assert_eq!(swapped.errors, 0);

        let swapped = bit_order(&bits("1100000011"));
        assert_eq!(bits_to_string(&swapped.bits), "0000001111");
        assert_eq!(swapped.errors, 2);
    }

    #[test]
    fn test_substitution_table_parse() {
        let table = SubstitutionTable::parse("0:1;1:0;").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.item_size(), 1);
        assert_eq!(table.to_string(), "0:1;1:0;");

        let table = SubstitutionTable::parse("01:1;10:0").unwrap();
        assert_eq!(table.to_string(), "01:1;10:0;");

        assert!(SubstitutionTable::parse("01").is_err());
        assert!(SubstitutionTable::parse("01:1:0").is_err());
        assert!(SubstitutionTable::parse("0x:1").is_err());
        assert!(SubstitutionTable::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_substitution_decode_and_encode() {
        let table = SubstitutionTable::parse("01:1;10:0;").unwrap();
        let decoded = substitution(true, &bits("011001"), &table);
        assert_eq!(bits_to_string(&decoded.bits), "101");
        assert_eq!(decoded.errors, 0);

        let encoded = substitution(false, &decoded.bits, &table);
        assert_eq!(bits_to_string(&encoded.bits), "011001");
    }

    #[test]
    fn test_substitution_ambiguous_window_advances_one_bit() {
        // "00" is listed twice
        let table = SubstitutionTable::parse("01:1;10:0;00:1;00:0;").unwrap();
        let decoded = substitution(true, &bits("0100101"), &table);
        // 01 -> 1, 00 ambiguous, 01 -> 1, 01 -> 1
        assert_eq!(bits_to_string(&decoded.bits), "111");
        assert_eq!(decoded.errors, 1);
    }

    #[test]
    fn test_substitution_no_match_and_empty_table() {
        let table = SubstitutionTable::parse("01:1;10:0;").unwrap();
        let decoded = substitution(true, &bits("11011"), &table);
        // 11 miss, 10 -> 0, 11 miss, 1 miss
        assert_eq!(bits_to_string(&decoded.bits), "0");
        assert_eq!(decoded.errors, 3);

        let empty = SubstitutionTable::default();
        assert_eq!(substitution(true, &bits("01"), &empty), StageOutput::failed(1));
    }
}
