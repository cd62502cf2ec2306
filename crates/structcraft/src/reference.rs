//! Referential fields: [Pointer] and [SizeOf].
//!
//! Neither stores a value. Each holds a weak handle to its target and derives the
//! number it writes at the moment it is read or serialized, so layout changes made
//! after construction (new siblings, longer strings, resized arrays) are always
//! reflected. Derived values that do not fit the declared width fail with
//! [Error::OutOfRange] instead of being truncated.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bytes::BufMut;
use log::{debug, trace};

use crate::errors::{Error, Result};
use crate::field::{AsField, Field, WeakField};
use crate::int::{IntKind, Width, put_int};
use crate::layout::Endian;
use crate::name::split_path;
use crate::structure::{Struct, WeakStruct};

fn checked(width: Width, value: usize) -> Result<u64> {
    let value = value as i128;
    IntKind::unsigned(width).check(value)?;
    Ok(value as u64)
}

#[derive(Debug)]
pub(crate) struct PointerTarget {
    target: WeakStruct,
    path: String,
    width: Width,
    endian: Endian,
}

/// Byte offset of a field inside a target struct, addressed by a dot path.
#[derive(Debug, Clone)]
pub struct Pointer(Rc<RefCell<PointerTarget>>);

impl Pointer {
    /// Fails with [Error::InvalidPath] if `path` is malformed. Whether the path
    /// actually resolves is only checked when the pointer is read.
    pub fn new(width: Width, target: &Struct, path: &str, endian: Endian) -> Result<Self> {
        split_path(path)?;
        Ok(Self(Rc::new(RefCell::new(PointerTarget {
            target: target.downgrade(),
            path: path.to_string(),
            width,
            endian,
        }))))
    }

    pub fn width(&self) -> Width {
        self.0.borrow().width
    }

    pub fn path(&self) -> String {
        self.0.borrow().path.clone()
    }

    pub fn endian(&self) -> Endian {
        self.0.borrow().endian
    }

    pub fn set_endian(&self, endian: Endian) -> &Self {
        self.0.borrow_mut().endian = endian;
        self
    }

    /// Aims the pointer at a new struct and path.
    ///
    /// Fails with [Error::InvalidReferenceTarget] if `target` is not a struct.
    pub fn set_target(&self, target: &Field, path: &str) -> Result<&Self> {
        let Field::Struct(target) = target else {
            return Err(Error::InvalidReferenceTarget(target.kind_name()));
        };
        split_path(path)?;

        debug!("retargeting pointer to {}.{}", target.name(), path);
        {
            let mut inner = self.0.borrow_mut();
            inner.target = target.downgrade();
            inner.path = path.to_string();
        }
        Ok(self)
    }

    /// Resolves the target's deep offset for the stored path.
    pub fn get(&self) -> Result<u64> {
        let (target, path, width) = {
            let inner = self.0.borrow();
            (inner.target.upgrade(), inner.path.clone(), inner.width)
        };
        let target = target.ok_or(Error::DanglingReference("struct"))?;
        let offset = target.get_deep_offset(&path)?;
        trace!("pointer {}.{} resolved to {}", target.name(), path, offset);
        checked(width, offset)
    }

    pub fn byte_size(&self) -> usize {
        self.width().bytes()
    }

    pub fn write_to<B: BufMut + ?Sized>(&self, out: &mut B) -> Result<()> {
        let value = self.get()?;
        let (width, endian) = {
            let inner = self.0.borrow();
            (inner.width, inner.endian)
        };
        put_int(out, value as i128, width, endian);
        Ok(())
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<PointerTarget>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn from_rc(rc: Rc<RefCell<PointerTarget>>) -> Self {
        Self(rc)
    }
}

#[derive(Debug)]
pub(crate) struct SizeTarget {
    target: WeakField,
    width: Width,
    endian: Endian,
}

/// Current byte size of a target struct or field.
#[derive(Debug, Clone)]
pub struct SizeOf(Rc<RefCell<SizeTarget>>);

impl SizeOf {
    /// Only a weak handle to `target` is kept. Once every strong handle is gone,
    /// reads fail with [Error::DanglingReference].
    pub fn new(width: Width, target: &impl AsField, endian: Endian) -> Self {
        let target = target.as_field();
        Self(Rc::new(RefCell::new(SizeTarget {
            target: target.downgrade(),
            width,
            endian,
        })))
    }

    pub fn width(&self) -> Width {
        self.0.borrow().width
    }

    pub fn endian(&self) -> Endian {
        self.0.borrow().endian
    }

    pub fn set_endian(&self, endian: Endian) -> &Self {
        self.0.borrow_mut().endian = endian;
        self
    }

    /// Measures a different struct or field from now on.
    pub fn set_target(&self, target: &impl AsField) -> &Self {
        let target = target.as_field();
        debug!("retargeting size-of to a {}", target.kind_name());
        self.0.borrow_mut().target = target.downgrade();
        self
    }

    /// Returns the target's byte size as it is right now.
    pub fn get(&self) -> Result<u64> {
        let (target, width) = {
            let inner = self.0.borrow();
            (inner.target.upgrade(), inner.width)
        };
        let target = target.ok_or(Error::DanglingReference("field"))?;
        let size = target.byte_size();
        trace!("size-of {} resolved to {}", target.kind_name(), size);
        checked(width, size)
    }

    pub fn byte_size(&self) -> usize {
        self.width().bytes()
    }

    pub fn write_to<B: BufMut + ?Sized>(&self, out: &mut B) -> Result<()> {
        let value = self.get()?;
        let (width, endian) = {
            let inner = self.0.borrow();
            (inner.width, inner.endian)
        };
        put_int(out, value as i128, width, endian);
        Ok(())
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<SizeTarget>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn from_rc(rc: Rc<RefCell<SizeTarget>>) -> Self {
        Self(rc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int::ScalarField;
    use crate::string::StrField;

    fn sample() -> Struct {
        Struct::new("test")
            .with_field("b1", ScalarField::new(IntKind::U8, 1, Endian::Little).unwrap())
            .unwrap()
            .with_field("b2", ScalarField::new(IntKind::U16, 0x0203, Endian::Big).unwrap())
            .unwrap()
            .with_field("b3", ScalarField::new(IntKind::U8, 4, Endian::Little).unwrap())
            .unwrap()
    }

    #[test]
    fn test_pointer_resolves_offset() {
        let s = sample();
        let pointer = Pointer::new(Width::W16, &s, "b3", Endian::Little).unwrap();
        assert_eq!(pointer.get().unwrap(), 3);

        let mut out = Vec::new();
        pointer.write_to(&mut out).unwrap();
        assert_eq!(out, vec![3, 0]);

        pointer.set_endian(Endian::Big);
        let mut out = Vec::new();
        pointer.write_to(&mut out).unwrap();
        assert_eq!(out, vec![0, 3]);
    }

    #[test]
    fn test_pointer_rejects_malformed_path() {
        let s = sample();
        assert!(matches!(
            Pointer::new(Width::W8, &s, "b1..b2", Endian::Little),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_pointer_missing_field_fails_on_read() {
        let s = sample();
        let pointer = Pointer::new(Width::W8, &s, "x", Endian::Little).unwrap();
        assert_eq!(
            pointer.get().unwrap_err(),
            Error::FieldNotFound {
                structure: "test".to_string(),
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn test_pointer_tracks_later_changes() {
        let s = Struct::new("s");
        s.field("name", StrField::raw("ab")).unwrap();
        s.field("x", ScalarField::new(IntKind::U8, 0, Endian::Little).unwrap())
            .unwrap();

        let pointer = Pointer::new(Width::W8, &s, "x", Endian::Little).unwrap();
        assert_eq!(pointer.get().unwrap(), 2);

        s.get_as::<StrField>("name").unwrap().set("abcdef");
        assert_eq!(pointer.get().unwrap(), 6);
    }

    #[test]
    fn test_pointer_overflow_is_an_error() {
        let s = Struct::new("s");
        s.field("pad", StrField::raw("x".repeat(300))).unwrap();
        s.field("x", ScalarField::new(IntKind::U8, 0, Endian::Little).unwrap())
            .unwrap();

        let pointer = Pointer::new(Width::W8, &s, "x", Endian::Little).unwrap();
        assert_eq!(
            pointer.get().unwrap_err(),
            Error::OutOfRange {
                value: 300,
                min: 0,
                max: 255
            }
        );
    }

    #[test]
    fn test_pointer_set_target_requires_struct() {
        let s = sample();
        let pointer = Pointer::new(Width::W8, &s, "b1", Endian::Little).unwrap();
        let not_a_struct = Field::from(StrField::raw("nope"));
        assert_eq!(
            pointer.set_target(&not_a_struct, "x").unwrap_err(),
            Error::InvalidReferenceTarget("string")
        );

        let other = Struct::new("other")
            .with_field("a", ScalarField::new(IntKind::U32, 0, Endian::Little).unwrap())
            .unwrap()
            .with_field("b", ScalarField::new(IntKind::U8, 0, Endian::Little).unwrap())
            .unwrap();
        pointer.set_target(&Field::from(&other), "b").unwrap();
        assert_eq!(pointer.get().unwrap(), 4);
        assert_eq!(pointer.path(), "b");
    }

    #[test]
    fn test_pointer_to_dropped_struct() {
        let pointer = {
            let s = sample();
            Pointer::new(Width::W8, &s, "b1", Endian::Little).unwrap()
        };
        assert_eq!(pointer.get().unwrap_err(), Error::DanglingReference("struct"));
    }

    #[test]
    fn test_size_of_struct_and_field() {
        let s = sample();
        let size = SizeOf::new(Width::W32, &s, Endian::Big);
        assert_eq!(size.get().unwrap(), 4);

        let mut out = Vec::new();
        size.write_to(&mut out).unwrap();
        assert_eq!(out, vec![0, 0, 0, 4]);

        let text = StrField::null_terminated("abc");
        size.set_target(&text);
        assert_eq!(size.get().unwrap(), 4);
        text.set("abcdefg");
        assert_eq!(size.get().unwrap(), 8);
    }

    #[test]
    fn test_size_of_overflow_is_an_error() {
        let text = StrField::raw("y".repeat(256));
        let size = SizeOf::new(Width::W8, &text, Endian::Little);
        assert!(matches!(size.get(), Err(Error::OutOfRange { value: 256, .. })));
    }

    #[test]
    fn test_size_of_live_leaf_and_dropped_leaf() {
        let size = {
            let values = crate::int::ArrayField::of([1u8, 2, 3], Endian::Little);
            let size = SizeOf::new(Width::W16, &values, Endian::Little);
            assert_eq!(size.get().unwrap(), 3);
            size
        };
        assert_eq!(size.get().unwrap_err(), Error::DanglingReference("field"));

        let field = Field::from(StrField::raw("hello"));
        size.set_target(&field);
        assert_eq!(size.get().unwrap(), 5);
    }
}
