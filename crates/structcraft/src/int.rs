//! Fixed-width integer fields: single values ([ScalarField]) and homogeneous
//! sequences ([ArrayField]).
//!
//! Both are handles over the same range-checked value store. Values are held as
//! `i128` so that every width and signedness, up to `u64` and `i64`, is represented
//! exactly. Bytes are produced by shift/mask composition, so the output does not
//! depend on the host byte order.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bytes::BufMut;

use crate::errors::{Error, Result};
use crate::layout::Endian;

/// Byte width of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    pub fn bytes(self) -> usize {
        match self {
            Width::W8 => 1,
            Width::W16 => 2,
            Width::W32 => 4,
            Width::W64 => 8,
        }
    }

    pub fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }
}

/// Width plus signedness; determines the accepted value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntKind {
    pub width: Width,
    pub signed: bool,
}

impl IntKind {
    pub const U8: IntKind = IntKind::unsigned(Width::W8);
    pub const U16: IntKind = IntKind::unsigned(Width::W16);
    pub const U32: IntKind = IntKind::unsigned(Width::W32);
    pub const U64: IntKind = IntKind::unsigned(Width::W64);
    pub const I8: IntKind = IntKind::signed(Width::W8);
    pub const I16: IntKind = IntKind::signed(Width::W16);
    pub const I32: IntKind = IntKind::signed(Width::W32);
    pub const I64: IntKind = IntKind::signed(Width::W64);

    pub const fn unsigned(width: Width) -> Self {
        Self { width, signed: false }
    }

    pub const fn signed(width: Width) -> Self {
        Self { width, signed: true }
    }

    /// Smallest representable value.
    pub fn min(self) -> i128 {
        if self.signed {
            -(1i128 << (self.width.bits() - 1))
        } else {
            0
        }
    }

    /// Largest representable value.
    pub fn max(self) -> i128 {
        if self.signed {
            (1i128 << (self.width.bits() - 1)) - 1
        } else {
            (1i128 << self.width.bits()) - 1
        }
    }

    /// Fails with [Error::OutOfRange] unless `value` fits this kind.
    pub fn check(self, value: i128) -> Result<()> {
        let (min, max) = (self.min(), self.max());
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Error::OutOfRange { value, min, max })
        }
    }
}

/// Primitive integers whose range is exactly that of an [IntKind].
///
/// Values of these types never need a range check, which is what lets
/// [ScalarField::of] and [ArrayField::of] be infallible.
pub trait Native: Copy + Into<i128> {
    const KIND: IntKind;
}

macro_rules! native {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl Native for $ty {
            const KIND: IntKind = IntKind::$kind;
        })*
    };
}

native!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, i8 => I8, i16 => I16, i32 => I32, i64 => I64);

/// Writes the low `width` bytes of `value` in the requested byte order.
///
/// Negative values are written in two's complement.
pub fn put_int<B: BufMut + ?Sized>(out: &mut B, value: i128, width: Width, endian: Endian) {
    let raw = value as u64;
    let n = width.bytes();
    for i in 0..n {
        let shift = match endian {
            Endian::Little => 8 * i,
            Endian::Big => 8 * (n - 1 - i),
        };
        out.put_u8(((raw >> shift) & 0xff) as u8);
    }
}

#[derive(Debug)]
pub(crate) struct Numbers {
    kind: IntKind,
    values: Vec<i128>,
    endian: Endian,
}

impl Numbers {
    fn new(kind: IntKind, values: Vec<i128>, endian: Endian) -> Result<Self> {
        for &value in &values {
            kind.check(value)?;
        }
        Ok(Self {
            kind,
            values,
            endian,
        })
    }

    fn replace(&mut self, values: Vec<i128>) -> Result<()> {
        for &value in &values {
            self.kind.check(value)?;
        }
        self.values = values;
        Ok(())
    }

    fn byte_size(&self) -> usize {
        self.values.len() * self.kind.width.bytes()
    }

    fn write_to<B: BufMut + ?Sized>(&self, out: &mut B) {
        for &value in &self.values {
            put_int(out, value, self.kind.width, self.endian);
        }
    }
}

/// A single fixed-width integer.
///
/// Cloning yields another handle to the same value, so a field fetched back out of
/// a [crate::structure::Struct] can be mutated in place.
#[derive(Debug, Clone)]
pub struct ScalarField(Rc<RefCell<Numbers>>);

impl ScalarField {
    pub fn new(kind: IntKind, value: impl Into<i128>, endian: Endian) -> Result<Self> {
        let numbers = Numbers::new(kind, vec![value.into()], endian)?;
        Ok(Self(Rc::new(RefCell::new(numbers))))
    }

    /// Builds a field whose kind follows from the primitive type of `value`.
    pub fn of<T: Native>(value: T, endian: Endian) -> Self {
        Self(Rc::new(RefCell::new(Numbers {
            kind: T::KIND,
            values: vec![value.into()],
            endian,
        })))
    }

    pub fn kind(&self) -> IntKind {
        self.0.borrow().kind
    }

    pub fn endian(&self) -> Endian {
        self.0.borrow().endian
    }

    /// Changes the byte order used by subsequent serializations.
    pub fn set_endian(&self, endian: Endian) -> &Self {
        self.0.borrow_mut().endian = endian;
        self
    }

    pub fn get(&self) -> i128 {
        self.0.borrow().values[0]
    }

    /// Replaces the value after checking it against the field's range.
    pub fn set(&self, value: impl Into<i128>) -> Result<&Self> {
        self.0.borrow_mut().replace(vec![value.into()])?;
        Ok(self)
    }

    pub fn byte_size(&self) -> usize {
        self.kind().width.bytes()
    }

    pub fn write_to<B: BufMut + ?Sized>(&self, out: &mut B) {
        self.0.borrow().write_to(out);
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<Numbers>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn from_rc(rc: Rc<RefCell<Numbers>>) -> Self {
        Self(rc)
    }
}

/// A sequence of fixed-width integers sharing one kind and byte order.
///
/// The length is fixed between mutations but [ArrayField::set] may replace the
/// sequence with one of a different length, which changes the field's size.
#[derive(Debug, Clone)]
pub struct ArrayField(Rc<RefCell<Numbers>>);

impl ArrayField {
    pub fn new<I, T>(kind: IntKind, values: I, endian: Endian) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<i128>,
    {
        let values = values.into_iter().map(Into::into).collect();
        let numbers = Numbers::new(kind, values, endian)?;
        Ok(Self(Rc::new(RefCell::new(numbers))))
    }

    pub fn of<T: Native>(values: impl IntoIterator<Item = T>, endian: Endian) -> Self {
        Self(Rc::new(RefCell::new(Numbers {
            kind: T::KIND,
            values: values.into_iter().map(Into::into).collect(),
            endian,
        })))
    }

    /// `len` zeros of the given kind.
    pub fn zeroed(kind: IntKind, len: usize, endian: Endian) -> Self {
        Self(Rc::new(RefCell::new(Numbers {
            kind,
            values: vec![0; len],
            endian,
        })))
    }

    pub fn kind(&self) -> IntKind {
        self.0.borrow().kind
    }

    pub fn endian(&self) -> Endian {
        self.0.borrow().endian
    }

    /// Changes the byte order used by subsequent serializations.
    pub fn set_endian(&self, endian: Endian) -> &Self {
        self.0.borrow_mut().endian = endian;
        self
    }

    pub fn len(&self) -> usize {
        self.0.borrow().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the stored values.
    pub fn get(&self) -> Vec<i128> {
        self.0.borrow().values.clone()
    }

    /// Replaces every value. Nothing changes if any element is out of range.
    pub fn set<I, T>(&self, values: I) -> Result<&Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<i128>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.0.borrow_mut().replace(values)?;
        Ok(self)
    }

    pub fn byte_size(&self) -> usize {
        self.0.borrow().byte_size()
    }

    pub fn write_to<B: BufMut + ?Sized>(&self, out: &mut B) {
        self.0.borrow().write_to(out);
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<Numbers>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn from_rc(rc: Rc<RefCell<Numbers>>) -> Self {
        Self(rc)
    }
}
