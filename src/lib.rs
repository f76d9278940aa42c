//! protocodec-rs: reversible bit-level codec chains for protocol reverse engineering
//!
//! Demodulated radio frames arrive as plain bit sequences. A [`Chain`] lists
//! the line codes and framing tricks to peel off (inversion, differential
//! and edge coding, redundancy, carriers, bit order, substitution tables,
//! CC1101 style whitening with CRC, external programs) and a [`Codec`] runs
//! it forward to decode or backward to re-encode.
//!
//! - `codec`: chain configuration, engine, transforms, whitening
//! - `phy`: bit conversions, CRC engine, line codes
//! - `utils`: constants, logging, codec profiles

pub mod codec;
pub mod error;
pub mod phy;
pub mod ui;
pub mod utils;

pub use codec::{Chain, Codec, Stage};
pub use error::{ChainError, CrcError, Error, Result};
pub use phy::{Crc, StageOutput};
