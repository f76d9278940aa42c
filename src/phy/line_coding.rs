// Line codes working directly on bits
// Edge trigger: 0 -> [1, 0], 1 -> [0, 1]
// Differential: a one marks a transition, a zero holds the level

use super::StageOutput;

/// Edge trigger coding (Manchester style)
pub fn edge(decoding: bool, bits: &[bool]) -> StageOutput {
    if decoding {
        edge_decode(bits)
    } else {
        StageOutput::clean(edge_encode(bits))
    }
}

pub fn edge_encode(bits: &[bool]) -> Vec<bool> {
    let mut out = Vec::with_capacity(bits.len() * 2);
    for &bit in bits {
        if bit {
            // 1 -> low then high
            out.extend_from_slice(&[false, true]);
        } else {
            // 0 -> high then low
            out.extend_from_slice(&[true, false]);
        }
    }
    out
}

/// Pairs are read from index 1 backwards. An equal pair has no edge: count
/// it and slide by one position to regain alignment.
pub fn edge_decode(bits: &[bool]) -> StageOutput {
    let mut out = Vec::with_capacity(bits.len() / 2);
    let mut errors = 0;
    let mut i = 1;

    while i < bits.len() {
        if bits[i] == bits[i - 1] {
            errors += 1;
            i += 1;
            continue;
        }
        out.push(bits[i]);
        i += 2;
    }

    StageOutput::new(out, errors)
}

/// Differential coding, seeded with the first bit
pub fn differential(decoding: bool, bits: &[bool]) -> StageOutput {
    let out = if decoding {
        differential_decode(bits)
    } else {
        differential_encode(bits)
    };
    StageOutput::clean(out)
}

pub fn differential_decode(bits: &[bool]) -> Vec<bool> {
    let Some(&first) = bits.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(bits.len());
    out.push(first);
    out.extend(
        bits.windows(2)
            .map(|pair| pair[0] != pair[1]),
    );
    out
}

pub fn differential_encode(bits: &[bool]) -> Vec<bool> {
    let Some(&first) = bits.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(bits.len());
    let mut level = first;
    out.push(level);
    for &bit in &bits[1..] {
        if bit {
            level = !level;
        }
        out.push(level);
    }
    out
}
