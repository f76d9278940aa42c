// Terminal presentation for the CLI

pub mod progress;

use crate::phy::StageOutput;
use crate::phy::bits::{bits_to_string, bits_to_string_grouped};

pub fn print_banner() {
    eprintln!("protocodec-rs");
}

/// One result line: bits, then the error count
pub fn format_result(output: &StageOutput, grouped: bool) -> String {
    let bits = if grouped {
        bits_to_string_grouped(&output.bits)
    } else {
        bits_to_string(&output.bits)
    };
    format!("{} errors={}", bits, output.errors)
}
