//! [BitStruct]: named sub-byte members packed into whole bytes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bytes::{BufMut, Bytes};
use indexmap::IndexMap;
use log::{debug, trace};

use crate::bits::{BitOrder, bits_to_bytes, reverse_bits_n, truncate, value_to_bits};
use crate::errors::{Error, Result};
use crate::name::validate_name;

#[derive(Debug, Clone, Copy)]
struct Bits {
    width: usize,
    value: u64,
}

#[derive(Debug)]
pub(crate) struct Members {
    name: String,
    order: BitOrder,
    members: IndexMap<String, Bits>,
}

impl Members {
    fn bit_size(&self) -> usize {
        self.members.values().map(|bits| bits.width).sum()
    }

    fn not_found(&self, name: &str) -> Error {
        Error::FieldNotFound {
            structure: self.name.clone(),
            name: name.to_string(),
        }
    }

    /// Concatenated member bits, in declaration order.
    fn stream(&self) -> Vec<u8> {
        let mut bits = Vec::with_capacity(self.bit_size());
        for &Bits { width, value } in self.members.values() {
            let value = match self.order {
                BitOrder::MsbFirst => value,
                BitOrder::LsbFirst => reverse_bits_n(value, width),
            };
            bits.extend(value_to_bits(value, width));
        }
        bits
    }
}

/// A group of 1- to 64-bit members serialized as a whole number of bytes.
///
/// With [BitOrder::MsbFirst] the first member lands in the most significant bits
/// of the first byte. With [BitOrder::LsbFirst] it lands in the least significant
/// bit and each member's own bits are reversed. Unused trailing bits are zero.
///
/// ```
/// use structcraft::{BitOrder, BitStruct};
///
/// let bits = BitStruct::new("flags", BitOrder::MsbFirst)
///     .with_flag("ready", true).unwrap()
///     .with_multi_bit("mode", 3, 0b101).unwrap();
/// assert_eq!(bits.to_bytes(), vec![0b1101_0000]);
/// ```
#[derive(Debug, Clone)]
pub struct BitStruct(Rc<RefCell<Members>>);

impl BitStruct {
    pub fn new(name: impl Into<String>, order: BitOrder) -> Self {
        Self(Rc::new(RefCell::new(Members {
            name: name.into(),
            order,
            members: IndexMap::new(),
        })))
    }

    pub fn msb(name: impl Into<String>) -> Self {
        Self::new(name, BitOrder::MsbFirst)
    }

    pub fn lsb(name: impl Into<String>) -> Self {
        Self::new(name, BitOrder::LsbFirst)
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn order(&self) -> BitOrder {
        self.0.borrow().order
    }

    /// Appends a single-bit member.
    pub fn flag(&self, name: &str, value: bool) -> Result<&Self> {
        self.multi_bit(name, 1, u64::from(value))
    }

    /// Appends a `size`-bit member. `value` is truncated to its low `size` bits.
    ///
    /// Fails with [Error::InvalidBitWidth] unless `size` is in `1..=64`, and with
    /// [Error::DuplicateField] or [Error::InvalidName] like [crate::Struct::field].
    pub fn multi_bit(&self, name: &str, size: usize, value: u64) -> Result<&Self> {
        {
            let inner = self.0.borrow();
            if inner.members.contains_key(name) {
                return Err(Error::DuplicateField {
                    structure: inner.name.clone(),
                    name: name.to_string(),
                });
            }
        }
        validate_name(name)?;
        if !(1..=64).contains(&size) {
            return Err(Error::InvalidBitWidth(size));
        }

        let mut inner = self.0.borrow_mut();
        debug!("adding {}-bit member {} to bit struct {}", size, name, inner.name);
        inner.members.insert(
            name.to_string(),
            Bits {
                width: size,
                value: truncate(value, size),
            },
        );
        Ok(self)
    }

    pub fn with_flag(self, name: &str, value: bool) -> Result<Self> {
        self.flag(name, value)?;
        Ok(self)
    }

    pub fn with_multi_bit(self, name: &str, size: usize, value: u64) -> Result<Self> {
        self.multi_bit(name, size, value)?;
        Ok(self)
    }

    /// Current value of a member.
    pub fn get(&self, name: &str) -> Result<u64> {
        let inner = self.0.borrow();
        match inner.members.get(name) {
            Some(bits) => Ok(bits.value),
            None => Err(inner.not_found(name)),
        }
    }

    /// Replaces a member's value, truncated to the member's width.
    pub fn set(&self, name: &str, value: u64) -> Result<&Self> {
        let mut inner = self.0.borrow_mut();
        if let Some(bits) = inner.members.get_mut(name) {
            bits.value = truncate(value, bits.width);
            return Ok(self);
        }
        Err(inner.not_found(name))
    }

    /// Offset of a member in **bits** from the start of the structure.
    pub fn get_offset(&self, name: &str) -> Result<usize> {
        let inner = self.0.borrow();
        let Some(index) = inner.members.get_index_of(name) else {
            return Err(inner.not_found(name));
        };
        Ok(inner.members.values().take(index).map(|bits| bits.width).sum())
    }

    /// Total width of all members in bits.
    pub fn bit_size(&self) -> usize {
        self.0.borrow().bit_size()
    }

    /// Size in bytes, rounding a partial last byte up.
    pub fn byte_size(&self) -> usize {
        self.bit_size().div_ceil(8)
    }

    pub fn write_to<B: BufMut + ?Sized>(&self, out: &mut B) {
        let inner = self.0.borrow();
        trace!("packing bit struct {} ({:?})", inner.name, inner.order);
        out.put_slice(&bits_to_bytes(&inner.stream(), inner.order));
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let inner = self.0.borrow();
        bits_to_bytes(&inner.stream(), inner.order)
    }

    pub fn to_buffer(&self) -> Bytes {
        Bytes::from(self.to_bytes())
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<Members>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn from_rc(rc: Rc<RefCell<Members>>) -> Self {
        Self(rc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(order: BitOrder, with_last: bool) -> BitStruct {
        let bits = BitStruct::new("bits", order)
            .with_flag("f1", true)
            .unwrap()
            .with_flag("f2", false)
            .unwrap()
            .with_multi_bit("f3", 4, 0b1101)
            .unwrap();
        if with_last {
            bits.multi_bit("f4", 2, 0b01).unwrap();
        }
        bits
    }

    #[test]
    fn test_msb_first_full_byte() {
        let bits = sample(BitOrder::MsbFirst, true);
        assert_eq!(bits.to_bytes(), vec![0b10110101]);
        assert_eq!(bits.byte_size(), 1);
    }

    #[test]
    fn test_lsb_first_full_byte() {
        let bits = sample(BitOrder::LsbFirst, true);
        assert_eq!(bits.to_bytes(), vec![0b01110101]);
    }

    #[test]
    fn test_partial_byte_is_zero_filled() {
        assert_eq!(sample(BitOrder::MsbFirst, false).to_bytes(), vec![0b10110100]);
        assert_eq!(sample(BitOrder::LsbFirst, false).to_bytes(), vec![0b110101]);
    }

    #[test]
    fn test_offsets_are_in_bits() {
        let bits = sample(BitOrder::MsbFirst, true);
        assert_eq!(bits.get_offset("f1").unwrap(), 0);
        assert_eq!(bits.get_offset("f3").unwrap(), 2);
        assert_eq!(bits.get_offset("f4").unwrap(), 6);
        assert_eq!(bits.bit_size(), 8);
        assert!(matches!(bits.get_offset("nope"), Err(Error::FieldNotFound { .. })));
    }

    #[test]
    fn test_spans_multiple_bytes() {
        let bits = BitStruct::msb("wide")
            .with_multi_bit("a", 12, 0xabc)
            .unwrap();
        assert_eq!(bits.byte_size(), 2);
        assert_eq!(bits.to_bytes(), vec![0xab, 0xc0]);
    }

    #[test]
    fn test_value_is_truncated() {
        let bits = BitStruct::msb("t").with_multi_bit("a", 3, 0b11111).unwrap();
        assert_eq!(bits.get("a").unwrap(), 0b111);
        assert_eq!(bits.to_bytes(), vec![0b1110_0000]);
    }

    #[test]
    fn test_full_width_member() {
        let bits = BitStruct::msb("t").with_multi_bit("a", 64, u64::MAX).unwrap();
        assert_eq!(bits.to_bytes(), vec![0xff; 8]);
    }

    #[test]
    fn test_invalid_width() {
        let bits = BitStruct::msb("t");
        assert_eq!(bits.multi_bit("a", 0, 0).unwrap_err(), Error::InvalidBitWidth(0));
        assert_eq!(bits.multi_bit("a", 65, 0).unwrap_err(), Error::InvalidBitWidth(65));
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let bits = BitStruct::lsb("t").with_flag("a", true).unwrap();
        assert!(matches!(bits.flag("a", false), Err(Error::DuplicateField { .. })));
        assert!(matches!(bits.flag("a b", false), Err(Error::InvalidName(_))));
    }

    #[test]
    fn test_set_updates_output() {
        let bits = sample(BitOrder::MsbFirst, true);
        bits.set("f2", 1).unwrap();
        assert_eq!(bits.to_bytes(), vec![0b11110101]);

        bits.set("f4", 0b111).unwrap();
        assert_eq!(bits.get("f4").unwrap(), 0b11);
        assert!(bits.set("nope", 1).is_err());
    }

    #[test]
    fn test_empty_bit_struct() {
        let bits = BitStruct::msb("empty");
        assert_eq!(bits.byte_size(), 0);
        assert!(bits.to_bytes().is_empty());
    }

    #[test]
    fn test_write_to_and_buffer_agree() {
        let bits = sample(BitOrder::LsbFirst, false);
        let mut out = Vec::new();
        bits.write_to(&mut out);
        assert_eq!(out, bits.to_bytes());
        assert_eq!(&bits.to_buffer()[..], &out[..]);
    }
}
