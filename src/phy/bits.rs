// Bit sequence <-> text conversions shared by chain parsing and the CLI

/// Render bits as a '0'/'1' string
pub fn bits_to_string(bits: &[bool]) -> String {
    bits.iter()
        .map(|&b| if b { '1' } else { '0' })
        .collect()
}

/// Render bits as '0'/'1' with a '.' between every group of 4
pub fn bits_to_string_grouped(bits: &[bool]) -> String {
    let mut out = String::with_capacity(bits.len() + bits.len() / 4);
    for (i, &bit) in bits.iter().enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push('.');
        }
        out.push(if bit { '1' } else { '0' });
    }
    out
}

/// Parse a strict '0'/'1' string. Returns None on any other character.
pub fn parse_bits(text: &str) -> Option<Vec<bool>> {
    text.chars()
        .map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}

/// Hex text to bits.
///
/// Accepts an optional `0x`/`0X` prefix. The result is the binary value
/// without leading zeros, left-padded to a multiple of 4 bits, so `0x21`
/// gives `00100001` and `0x0e` gives `1110`. Invalid text gives an empty
/// sequence.
pub fn hex_to_bits(text: &str) -> Vec<bool> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let mut nibbles = Vec::with_capacity(digits.len());
    for c in digits.chars() {
        match c.to_digit(16) {
            Some(n) => nibbles.push(n as u8),
            None => return Vec::new(),
        }
    }
    if nibbles.is_empty() {
        return Vec::new();
    }

    // Keep at least one nibble so zero still renders as 0000
    let first = nibbles
        .iter()
        .position(|&n| n != 0)
        .unwrap_or(nibbles.len() - 1);

    let mut bits = Vec::with_capacity((nibbles.len() - first) * 4);
    for &nibble in &nibbles[first..] {
        for shift in (0..4).rev() {
            bits.push((nibble >> shift) & 1 == 1);
        }
    }
    bits
}

/// Bits to `0x..` hex text, right-padding with zeros to a nibble boundary.
/// Leading zero nibbles are dropped; empty input gives an empty string.
pub fn bits_to_hex(bits: &[bool]) -> String {
    if bits.is_empty() {
        return String::new();
    }
    let nibbles: Vec<u8> = bits
        .chunks(4)
        .map(|chunk| {
            (0..4).fold(0u8, |acc, i| {
                (acc << 1) | u8::from(chunk.get(i).copied().unwrap_or(false))
            })
        })
        .collect();
    let first = nibbles
        .iter()
        .position(|&n| n != 0)
        .unwrap_or(nibbles.len() - 1);

    let mut out = String::from("0x");
    for &nibble in &nibbles[first..] {
        out.push(char::from_digit(nibble as u32, 16).unwrap_or('0'));
    }
    out
}

/// Convert byte to bits (MSB first)
pub fn byte_to_bits(byte: u8) -> [bool; 8] {
    let mut bits = [false; 8];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (byte >> (7 - i)) & 1 == 1;
    }
    bits
}

/// Convert bytes to a bit vector (MSB first)
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        bits.extend_from_slice(&byte_to_bits(byte));
    }
    bits
}

/// Pack bits into an integer, first bit most significant. Only the last
/// 64 bits survive for longer input.
pub fn bits_to_u64(bits: &[bool]) -> u64 {
    bits.iter()
        .fold(0u64, |acc, &b| (acc << 1) | u64::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_string_conversion() {
        let bits = parse_bits("1011001").unwrap();
        assert_eq!(bits, vec![true, false, true, true, false, false, true]);
        assert_eq!(bits_to_string(&bits), "1011001");
        assert_eq!(bits_to_string_grouped(&bits), "1011.001");
        assert!(parse_bits("10a1").is_none());
        assert_eq!(parse_bits(""), Some(Vec::new()));
    }

    #[test]
    fn test_hex_to_bits_drops_leading_zero_nibbles() {
        assert_eq!(bits_to_string(&hex_to_bits("0x21")), "00100001");
        assert_eq!(bits_to_string(&hex_to_bits("0xe")), "1110");
        assert_eq!(bits_to_string(&hex_to_bits("0x0e")), "1110");
        assert_eq!(bits_to_string(&hex_to_bits("0x0")), "0000");
        assert_eq!(hex_to_bits("0xe9cae9ca").len(), 32);
        assert!(hex_to_bits("0xzz").is_empty());
        assert!(hex_to_bits("").is_empty());
    }

    #[test]
    fn test_bits_to_hex() {
        assert_eq!(bits_to_hex(&hex_to_bits("0xe9cae9ca")), "0xe9cae9ca");
        // 101 -> 1010
        assert_eq!(bits_to_hex(&[true, false, true]), "0xa");
        assert_eq!(bits_to_hex(&[false, false, false, false, false, false, false, true]), "0x1");
        assert_eq!(bits_to_hex(&[]), "");
    }

    #[test]
    fn test_bytes_to_bits() {
        let bits = bytes_to_bits(&[0b1011_0011, 0x01]);
        assert_eq!(bits_to_string(&bits), "1011001100000001");
        assert_eq!(bits_to_u64(&bits), 0b1011_0011_0000_0001);
    }
}
