//! Sub-byte packing utilities used by [crate::bit_struct::BitStruct].
//!
//! A member value is first expanded into its individual bits, most significant bit
//! first. The bit streams of all members are concatenated and then packed eight bits
//! per byte according to the structure's [BitOrder].

/// Order in which bits are packed into each output byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitOrder {
    /// Bit 0 of the stream is the high bit of the first byte.
    MsbFirst,
    /// Bit 0 of the stream is the low bit of the first byte.
    LsbFirst,
}

impl Default for BitOrder {
    fn default() -> Self {
        BitOrder::MsbFirst
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::BitOrderDef> for BitOrder {
    fn from(value: crate::serde::BitOrderDef) -> Self {
        match value {
            crate::serde::BitOrderDef::MsbFirst => BitOrder::MsbFirst,
            crate::serde::BitOrderDef::LsbFirst => BitOrder::LsbFirst,
        }
    }
}

/// Keeps only the low `n` bits of `value`.
pub fn truncate(value: u64, n: usize) -> u64 {
    if n >= 64 { value } else { value & ((1u64 << n) - 1) }
}

/// Expands the low `n` bits of `value` into one `0`/`1` entry per bit, MSB first.
pub fn value_to_bits(value: u64, n: usize) -> Vec<u8> {
    (0..n).rev().map(|i| ((value >> i) & 1) as u8).collect()
}

/// Reverses the low `n` bits of `x` (LSB becomes MSB of the result).
pub fn reverse_bits_n(x: u64, n: usize) -> u64 {
    match n {
        0 => 0,
        n if n >= 64 => x.reverse_bits(),
        n => x.reverse_bits() >> (64 - n),
    }
}

/// Packs a stream of `0`/`1` entries eight to a byte. Unused trailing bits are zero.
pub fn bits_to_bytes(bits: &[u8], bit_order: BitOrder) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk.iter().enumerate().fold(0u8, |byte, (i, &bit)| {
                let shift = match bit_order {
                    BitOrder::MsbFirst => 7 - i,
                    BitOrder::LsbFirst => i,
                };
                byte | ((bit & 1) << shift)
            })
        })
        .collect()
}
