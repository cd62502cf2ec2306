//! Short constructors for every field kind.
//!
//! Numeric fields built here are little-endian; use `set_endian` or a struct-level
//! byte order to change that.
//!
//! ```
//! use structcraft::prelude::*;
//!
//! let s = structure("packet")
//!     .with_field("kind", u8(1)).unwrap()
//!     .with_field("name", null_terminated_string("ok")).unwrap();
//! assert_eq!(s.to_bytes().unwrap(), vec![1, b'o', b'k', 0]);
//! ```

use crate::bit_struct::BitStruct;
use crate::errors::Result;
use crate::field::AsField;
use crate::int::{ArrayField, IntKind, ScalarField, Width};
use crate::layout::Endian;
use crate::reference::{Pointer, SizeOf};
use crate::string::StrField;
use crate::structure::Struct;

macro_rules! scalars {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(pub fn $name(value: $ty) -> ScalarField {
            ScalarField::of(value, Endian::Little)
        })*
    };
}

macro_rules! arrays {
    ($($name:ident, $zeroed:ident: $ty:ty => $kind:ident),* $(,)?) => {
        $(pub fn $name(values: impl IntoIterator<Item = $ty>) -> ArrayField {
            ArrayField::of(values, Endian::Little)
        }

        pub fn $zeroed(len: usize) -> ArrayField {
            ArrayField::zeroed(IntKind::$kind, len, Endian::Little)
        })*
    };
}

scalars!(u8: u8, u16: u16, u32: u32, u64: u64, i8: i8, i16: i16, i32: i32, i64: i64);
arrays!(
    u8s, u8s_zeroed: u8 => U8,
    u16s, u16s_zeroed: u16 => U16,
    u32s, u32s_zeroed: u32 => U32,
    u64s, u64s_zeroed: u64 => U64,
    i8s, i8s_zeroed: i8 => I8,
    i16s, i16s_zeroed: i16 => I16,
    i32s, i32s_zeroed: i32 => I32,
    i64s, i64s_zeroed: i64 => I64,
);

/// Offset of `path` inside `target`, written as one byte.
pub fn pointer8(target: &Struct, path: &str) -> Result<Pointer> {
    Pointer::new(Width::W8, target, path, Endian::Little)
}

pub fn pointer16(target: &Struct, path: &str) -> Result<Pointer> {
    Pointer::new(Width::W16, target, path, Endian::Little)
}

pub fn pointer32(target: &Struct, path: &str) -> Result<Pointer> {
    Pointer::new(Width::W32, target, path, Endian::Little)
}

pub fn pointer64(target: &Struct, path: &str) -> Result<Pointer> {
    Pointer::new(Width::W64, target, path, Endian::Little)
}

/// Byte size of `target`, written as one byte.
///
/// Only a weak handle is kept, so `target` must outlive the size-of field.
pub fn size_of8(target: &impl AsField) -> SizeOf {
    SizeOf::new(Width::W8, target, Endian::Little)
}

pub fn size_of16(target: &impl AsField) -> SizeOf {
    SizeOf::new(Width::W16, target, Endian::Little)
}

pub fn size_of32(target: &impl AsField) -> SizeOf {
    SizeOf::new(Width::W32, target, Endian::Little)
}

pub fn size_of64(target: &impl AsField) -> SizeOf {
    SizeOf::new(Width::W64, target, Endian::Little)
}

pub fn raw_string(value: impl Into<String>) -> StrField {
    StrField::raw(value)
}

pub fn null_terminated_string(value: impl Into<String>) -> StrField {
    StrField::null_terminated(value)
}

/// An empty, packed struct.
pub fn structure(name: impl Into<String>) -> Struct {
    Struct::new(name)
}

pub fn bit_struct_lsb(name: impl Into<String>) -> BitStruct {
    BitStruct::lsb(name)
}

pub fn bit_struct_msb(name: impl Into<String>) -> BitStruct {
    BitStruct::msb(name)
}
