//! [Field]: any unit of binary data that can be attached to a [Struct].

use std::cell::RefCell;
use std::rc::Weak;

use bytes::BufMut;

use crate::bit_struct::{BitStruct, Members};
use crate::errors::Result;
use crate::int::{ArrayField, Numbers, ScalarField};
use crate::reference::{Pointer, PointerTarget, SizeOf, SizeTarget};
use crate::string::{StrField, Text};
use crate::structure::{Struct, WeakStruct};

/// A field of any kind.
///
/// Every variant is a cheap handle: cloning a `Field` shares the underlying data,
/// which is what lets a field be fetched back out of a struct and mutated.
#[derive(Debug, Clone)]
pub enum Field {
    Scalar(ScalarField),
    Array(ArrayField),
    Str(StrField),
    Pointer(Pointer),
    SizeOf(SizeOf),
    Struct(Struct),
    Bits(BitStruct),
}

impl Field {
    /// Short human-readable name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Field::Scalar(_) => "scalar",
            Field::Array(_) => "array",
            Field::Str(_) => "string",
            Field::Pointer(_) => "pointer",
            Field::SizeOf(_) => "size-of",
            Field::Struct(_) => "struct",
            Field::Bits(_) => "bit struct",
        }
    }

    /// Size in bytes this field serializes to, computed from its current state.
    pub fn byte_size(&self) -> usize {
        match self {
            Field::Scalar(f) => f.byte_size(),
            Field::Array(f) => f.byte_size(),
            Field::Str(f) => f.byte_size(),
            Field::Pointer(f) => f.byte_size(),
            Field::SizeOf(f) => f.byte_size(),
            Field::Struct(f) => f.byte_size(),
            Field::Bits(f) => f.byte_size(),
        }
    }

    /// Appends exactly [Field::byte_size] bytes to `out`.
    pub fn write_to<B: BufMut + ?Sized>(&self, out: &mut B) -> Result<()> {
        match self {
            Field::Scalar(f) => f.write_to(out),
            Field::Array(f) => f.write_to(out),
            Field::Str(f) => f.write_to(out),
            Field::Pointer(f) => f.write_to(out)?,
            Field::SizeOf(f) => f.write_to(out)?,
            Field::Struct(f) => f.write_to(out)?,
            Field::Bits(f) => f.write_to(out),
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.byte_size());
        self.write_to(&mut out)?;
        Ok(out)
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Field::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn downgrade(&self) -> WeakField {
        match self {
            Field::Scalar(f) => WeakField::Scalar(f.downgrade()),
            Field::Array(f) => WeakField::Array(f.downgrade()),
            Field::Str(f) => WeakField::Str(f.downgrade()),
            Field::Pointer(f) => WeakField::Pointer(f.downgrade()),
            Field::SizeOf(f) => WeakField::SizeOf(f.downgrade()),
            Field::Struct(f) => WeakField::Struct(f.downgrade()),
            Field::Bits(f) => WeakField::Bits(f.downgrade()),
        }
    }
}

/// Non-owning counterpart of [Field], held by referential fields.
#[derive(Debug, Clone)]
pub(crate) enum WeakField {
    Scalar(Weak<RefCell<Numbers>>),
    Array(Weak<RefCell<Numbers>>),
    Str(Weak<RefCell<Text>>),
    Pointer(Weak<RefCell<PointerTarget>>),
    SizeOf(Weak<RefCell<SizeTarget>>),
    Struct(WeakStruct),
    Bits(Weak<RefCell<Members>>),
}

impl WeakField {
    pub(crate) fn upgrade(&self) -> Option<Field> {
        Some(match self {
            WeakField::Scalar(w) => Field::Scalar(ScalarField::from_rc(w.upgrade()?)),
            WeakField::Array(w) => Field::Array(ArrayField::from_rc(w.upgrade()?)),
            WeakField::Str(w) => Field::Str(StrField::from_rc(w.upgrade()?)),
            WeakField::Pointer(w) => Field::Pointer(Pointer::from_rc(w.upgrade()?)),
            WeakField::SizeOf(w) => Field::SizeOf(SizeOf::from_rc(w.upgrade()?)),
            WeakField::Struct(w) => Field::Struct(w.upgrade()?),
            WeakField::Bits(w) => Field::Bits(BitStruct::from_rc(w.upgrade()?)),
        })
    }
}

/// Typed extraction of a [Field] variant, used by [Struct::get_as].
pub trait FromField: Sized {
    /// Same string [Field::kind_name] reports for this variant.
    const KIND: &'static str;

    fn from_field(field: Field) -> Option<Self>;
}

/// A live struct or field handle that a [SizeOf] can measure.
///
/// Implemented for the handle types and [Field], and taken by reference, so the
/// caller keeps the strong handle that the size-of field observes.
pub trait AsField {
    fn as_field(&self) -> Field;
}

impl AsField for Field {
    fn as_field(&self) -> Field {
        self.clone()
    }
}

macro_rules! field_variant {
    ($variant:ident, $ty:ty, $kind:literal) => {
        impl AsField for $ty {
            fn as_field(&self) -> Field {
                Field::$variant(self.clone())
            }
        }

        impl From<$ty> for Field {
            fn from(value: $ty) -> Self {
                Field::$variant(value)
            }
        }

        impl From<&$ty> for Field {
            fn from(value: &$ty) -> Self {
                Field::$variant(value.clone())
            }
        }

        impl FromField for $ty {
            const KIND: &'static str = $kind;

            fn from_field(field: Field) -> Option<Self> {
                match field {
                    Field::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

field_variant!(Scalar, ScalarField, "scalar");
field_variant!(Array, ArrayField, "array");
field_variant!(Str, StrField, "string");
field_variant!(Pointer, Pointer, "pointer");
field_variant!(SizeOf, SizeOf, "size-of");
field_variant!(Struct, Struct, "struct");
field_variant!(Bits, BitStruct, "bit struct");

impl From<&Field> for Field {
    fn from(value: &Field) -> Self {
        value.clone()
    }
}
