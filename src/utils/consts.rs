/// 日志级别（可被 RUST_LOG 覆盖）
pub const LOG_LEVEL: &str = "info";

// ============================================================================
// Chain keywords
// ============================================================================

pub const DECODING_INVERT: &str = "Invert";
pub const DECODING_DIFFERENTIAL: &str = "Differential Encoding";
pub const DECODING_REDUNDANCY: &str = "Remove Redundancy";
pub const DECODING_DATAWHITENING: &str = "Remove Data Whitening (CC1101)";
pub const DECODING_CARRIER: &str = "Remove Carrier";
pub const DECODING_BITORDER: &str = "Change Bitorder";
pub const DECODING_EDGE: &str = "Edge Trigger";
pub const DECODING_SUBSTITUTION: &str = "Substitution";
pub const DECODING_EXTERNAL: &str = "External Program";

// ============================================================================
// Defaults for parameterized stages
// ============================================================================

/// Multiplier used when `Remove Redundancy` has no parameter token
pub const DEFAULT_REDUNDANCY: &str = "2";

/// CC1101 sync word, x^5 + x^0 polynomial, flags 0b1110
pub const DEFAULT_WHITENING: &str = "0xe9cae9ca;0x21;0xe";

pub const DEFAULT_CARRIER: &str = "1";

pub const DEFAULT_SUBSTITUTION: &str = "0:1;1:0;";

pub const DEFAULT_EXTERNAL: &str = "./;./";

// ============================================================================
// Data whitening
// ============================================================================

/// Preamble pattern repetitions ("10" each)
pub const WHITENING_PREAMBLE_PAIRS: usize = 16;

/// Keystream bits produced per LFSR refill
pub const LFSR_CLOCKS_PER_STEP: usize = 8;

pub const ERROR_SYNC_NOT_FOUND: usize = 404;
pub const ERROR_DEGENERATE_CONFIG: usize = 31337;
pub const ERROR_KEYSTREAM_UNDERFLOW: usize = 31338;

/// Longest bit string also handed to external programs as an argument
pub const EXTERNAL_MAX_ARG_BITS: usize = 65_536;
