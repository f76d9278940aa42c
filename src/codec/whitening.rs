//! CRC guarded data whitening (CC1101 style).
//!
//! A frame on air looks like `[preamble][sync][whitened payload][whitened CRC][guard bit]`.
//! The keystream comes from an [`Lfsr`] restarted for every frame, the CRC
//! covers the payload and is XORed into the trailing block so that a correct
//! decode leaves that block all zero.
//!
//! Failures do not raise: the input comes back untouched with one of the
//! [`WhiteningFault`] codes as the error count.

use tracing::{debug, trace};

use crate::phy::bits::{bits_to_hex, hex_to_bits};
use crate::phy::{Crc, StageOutput};
use crate::utils::consts::{
    ERROR_DEGENERATE_CONFIG, ERROR_KEYSTREAM_UNDERFLOW, ERROR_SYNC_NOT_FOUND,
    LFSR_CLOCKS_PER_STEP, WHITENING_PREAMBLE_PAIRS,
};

/// Whitening outcomes that mean "not applied" rather than "some bits wrong"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteningFault {
    SyncNotFound,
    /// Empty input, polynomial or sync pattern
    Degenerate,
    KeystreamUnderflow,
}

impl WhiteningFault {
    pub fn code(self) -> usize {
        match self {
            WhiteningFault::SyncNotFound => ERROR_SYNC_NOT_FOUND,
            WhiteningFault::Degenerate => ERROR_DEGENERATE_CONFIG,
            WhiteningFault::KeystreamUnderflow => ERROR_KEYSTREAM_UNDERFLOW,
        }
    }

    pub fn from_code(code: usize) -> Option<Self> {
        match code {
            ERROR_SYNC_NOT_FOUND => Some(WhiteningFault::SyncNotFound),
            ERROR_DEGENERATE_CONFIG => Some(WhiteningFault::Degenerate),
            ERROR_KEYSTREAM_UNDERFLOW => Some(WhiteningFault::KeystreamUnderflow),
            _ => None,
        }
    }
}

/// Linear feedback shift register driving the keystream.
///
/// The register is one slot wider than the polynomial: slot 0 receives the
/// feedback and is never part of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lfsr {
    taps: Vec<bool>,
    state: Vec<bool>,
}

impl Lfsr {
    pub fn new(polynomial: &[bool]) -> Self {
        let mut taps = Vec::with_capacity(polynomial.len() + 1);
        taps.push(false);
        taps.extend_from_slice(polynomial);
        let state = vec![true; taps.len()];
        Self { taps, state }
    }

    /// Back to all ones
    pub fn reset(&mut self) {
        self.state.fill(true);
    }

    pub fn output(&self) -> Vec<bool> {
        self.state[1..].to_vec()
    }

    /// Advance `clock` cycles and return the output bits
    pub fn clock(&mut self, clock: usize) -> Vec<bool> {
        for _ in 0..clock {
            let taps_set = self.taps[1..]
                .iter()
                .zip(&self.state[1..])
                .filter(|&(&tap, &bit)| tap && bit)
                .count();
            let feedback = taps_set % 2 == 1;

            self.state.rotate_right(1);
            self.state[0] = feedback;
        }
        self.output()
    }
}

/// Parsed `sync_hex;poly_hex;flags_hex` text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhiteningParams {
    pub sync: Vec<bool>,
    pub polynomial: Vec<bool>,
    /// apply CRC, strip preamble, strip sync, strip CRC; absent when the
    /// flag value has fewer than 4 bits
    pub flags: Option<[bool; 4]>,
}

impl WhiteningParams {
    /// Requires exactly three non-empty `;`-separated parts. Hex that fails
    /// to parse turns into an empty pattern, which later shows up as a
    /// degenerate configuration.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split(';');
        let (sync, polynomial, flags) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || sync.is_empty() || polynomial.is_empty() || flags.is_empty() {
            return None;
        }

        let flag_bits = hex_to_bits(flags);
        let flags = match flag_bits.as_slice() {
            [a, b, c, d, ..] => Some([*a, *b, *c, *d]),
            _ => None,
        };

        Some(Self {
            sync: hex_to_bits(sync),
            polynomial: hex_to_bits(polynomial),
            flags,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhiteningConfig {
    pub sync: Vec<bool>,
    pub polynomial: Vec<bool>,
    pub preamble: Vec<bool>,
    pub apply_crc: bool,
    pub strip_preamble: bool,
    pub strip_sync: bool,
    pub strip_crc: bool,
}

impl Default for WhiteningConfig {
    fn default() -> Self {
        Self {
            // e9cae9ca
            sync: hex_to_bits("0xe9cae9ca"),
            // x^5 + x^0
            polynomial: hex_to_bits("0x21"),
            preamble: [true, false].repeat(WHITENING_PREAMBLE_PAIRS),
            apply_crc: true,
            strip_preamble: true,
            strip_sync: true,
            strip_crc: false,
        }
    }
}

impl WhiteningConfig {
    pub fn apply_params(&mut self, params: WhiteningParams) {
        self.sync = params.sync;
        self.polynomial = params.polynomial;
        if let Some([apply_crc, strip_preamble, strip_sync, strip_crc]) = params.flags {
            self.apply_crc = apply_crc;
            self.strip_preamble = strip_preamble;
            self.strip_sync = strip_sync;
            self.strip_crc = strip_crc;
        }
    }

    /// Render back into `sync_hex;poly_hex;flags_hex`
    pub fn to_param(&self) -> String {
        let flags = [self.apply_crc, self.strip_preamble, self.strip_sync, self.strip_crc];
        format!(
            "{};{};{}",
            bits_to_hex(&self.sync),
            bits_to_hex(&self.polynomial),
            bits_to_hex(&flags)
        )
    }
}

/// Whitening stage state: configuration, guard CRC and keystream register
#[derive(Debug, Clone)]
pub struct DataWhitening {
    pub config: WhiteningConfig,
    crc: Crc,
    lfsr: Lfsr,
}

impl Default for DataWhitening {
    fn default() -> Self {
        Self::new(WhiteningConfig::default())
    }
}

impl DataWhitening {
    pub fn new(config: WhiteningConfig) -> Self {
        let lfsr = Lfsr::new(&config.polynomial);
        Self {
            config,
            crc: Crc::standard16(),
            lfsr,
        }
    }

    pub fn crc(&self) -> &Crc {
        &self.crc
    }

    /// Update from a stage parameter. Returns false (and keeps the current
    /// configuration) when the text is not a valid parameter.
    pub fn apply_param(&mut self, text: &str) -> bool {
        match WhiteningParams::parse(text) {
            Some(params) => {
                self.config.apply_params(params);
                true
            }
            None => {
                debug!("Ignoring whitening parameter {:?}", text);
                false
            }
        }
    }

    /// Position right after the first sync match. The last possible window
    /// (sync flush with the end) is not considered.
    pub fn find_sync(&self, bits: &[bool]) -> Option<usize> {
        let sync = &self.config.sync;
        if sync.is_empty() {
            return None;
        }
        (0..bits.len().saturating_sub(sync.len()))
            .find(|&i| bits[i..i + sync.len()] == sync[..])
            .map(|i| i + sync.len())
    }

    fn keystream(&mut self, from: usize, to: usize) -> Vec<bool> {
        self.lfsr = Lfsr::new(&self.config.polynomial);
        let mut keystream = self.lfsr.output();
        for _ in (from..to).step_by(LFSR_CLOCKS_PER_STEP) {
            keystream.extend(self.lfsr.clock(LFSR_CLOCKS_PER_STEP));
        }
        keystream
    }

    pub fn apply(&mut self, decoding: bool, input: &[bool]) -> StageOutput {
        let mut bits = input.to_vec();
        let len_sync = self.config.sync.len();
        let crc_len = self.crc.width();

        // Drop the guard bit the encoder duplicated
        if decoding && bits.len() > 1 && bits[bits.len() - 1] == bits[bits.len() - 2] {
            bits.pop();
        }

        if bits.is_empty() || self.config.polynomial.is_empty() || len_sync == 0 {
            return StageOutput::new(bits, WhiteningFault::Degenerate.code());
        }

        let whitening_start = match self.find_sync(&bits) {
            Some(pos) => pos,
            None if decoding => {
                debug!("Sync pattern not found in {} bits", bits.len());
                return StageOutput::new(bits, WhiteningFault::SyncNotFound.code());
            }
            None => 0,
        };

        if !decoding && self.config.strip_crc {
            bits.extend(std::iter::repeat_n(false, crc_len));
        }

        let keystream = self.keystream(whitening_start, bits.len());
        let span = bits.len() - whitening_start;
        if keystream.len() < span {
            debug!("Keystream too short: {} < {}", keystream.len(), span);
            return StageOutput::new(bits, WhiteningFault::KeystreamUnderflow.code());
        }

        if decoding {
            xor_in_place(&mut bits[whitening_start..], &keystream);
        }

        if self.config.apply_crc {
            let end = bits.len();
            let crc_start = end.saturating_sub(crc_len);
            let covered = if !decoding && self.config.strip_crc {
                whitening_start..end
            } else {
                whitening_start..crc_start.max(whitening_start)
            };
            let crc = self.crc.compute(&bits[covered]);
            // XOR into the trailing block: zero after a correct decode
            for (i, &c) in crc.iter().enumerate() {
                if let Some(pos) = (end + i).checked_sub(crc_len) {
                    bits[pos] ^= c;
                }
            }
        }

        if !decoding {
            xor_in_place(&mut bits[whitening_start..], &keystream);
        }

        trace!(
            "Whitening {} from bit {} over {} bits",
            if decoding { "removed" } else { "applied" },
            whitening_start,
            span
        );

        if decoding {
            let mut from = 0;
            let mut to = bits.len();
            if self.config.strip_preamble {
                from += whitening_start - len_sync;
            }
            if self.config.strip_sync {
                from += len_sync;
            }
            if self.config.strip_crc {
                to = to.saturating_sub(crc_len);
            }
            let out = bits[from.min(to)..to].to_vec();
            StageOutput::clean(out)
        } else {
            let mut out = Vec::with_capacity(
                self.config.preamble.len() + len_sync + bits.len() + 1,
            );
            if self.config.strip_preamble {
                out.extend_from_slice(&self.config.preamble);
            }
            if self.config.strip_sync {
                out.extend_from_slice(&self.config.sync);
            }
            out.extend_from_slice(&bits);
            if let Some(&last) = out.last() {
                out.push(last);
            }
            StageOutput::clean(out)
        }
    }
}

fn xor_in_place(bits: &mut [bool], keystream: &[bool]) {
    for (bit, &key) in bits.iter_mut().zip(keystream) {
        *bit ^= key;
    }
}
