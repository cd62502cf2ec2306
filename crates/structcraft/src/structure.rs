//! [Struct]: an ordered, named collection of fields that is itself a field.
//!
//! Nothing about the layout is stored. Sizes and offsets are summed from the
//! current state of every member each time they are asked for, which is what lets
//! pointers and size-of fields observe edits made after they were created.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use bytes::{BufMut, Bytes, BytesMut};
use indexmap::IndexMap;
use log::{debug, trace};

use crate::errors::{Error, Result};
use crate::field::{Field, FromField};
use crate::layout::{Endian, Padding, StructOptions};
use crate::name::{split_path, validate_name};

struct StructInner {
    name: String,
    options: StructOptions,
    fields: IndexMap<String, Field>,
}

/// Shared handle to a structure.
///
/// Clones refer to the same structure. Attaching a struct to a parent stores a
/// handle, so edits made through any other handle show up in the parent.
#[derive(Clone)]
pub struct Struct(Rc<RefCell<StructInner>>);

/// Non-owning handle, held by pointers and size-of fields.
#[derive(Debug, Clone)]
pub(crate) struct WeakStruct(Weak<RefCell<StructInner>>);

impl WeakStruct {
    pub(crate) fn upgrade(&self) -> Option<Struct> {
        self.0.upgrade().map(Struct)
    }
}

impl fmt::Debug for Struct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Struct")
            .field("name", &inner.name)
            .field("options", &inner.options)
            .field("fields", &inner.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Pushes a structure-level byte order onto a freshly attached field.
///
/// Numeric and referential fields take it unconditionally. A nested struct only
/// adopts it when it has no byte order of its own, and then hands it on to the
/// members it has at this moment.
fn apply_endian(field: &Field, endian: Endian) {
    match field {
        Field::Scalar(f) => {
            f.set_endian(endian);
        }
        Field::Array(f) => {
            f.set_endian(endian);
        }
        Field::Pointer(f) => {
            f.set_endian(endian);
        }
        Field::SizeOf(f) => {
            f.set_endian(endian);
        }
        Field::Struct(s) => s.inherit_endian(endian),
        Field::Str(_) | Field::Bits(_) => {}
    }
}

impl Struct {
    /// Creates an empty, packed structure.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, StructOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: StructOptions) -> Self {
        Self(Rc::new(RefCell::new(StructInner {
            name: name.into(),
            options,
            fields: IndexMap::new(),
        })))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn options(&self) -> StructOptions {
        self.0.borrow().options
    }

    /// Number of attached fields.
    pub fn len(&self) -> usize {
        self.0.borrow().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field names in attachment order.
    pub fn names(&self) -> Vec<String> {
        self.0.borrow().fields.keys().cloned().collect()
    }

    /// Appends a field.
    ///
    /// Fails with [Error::DuplicateField] if the name is taken and
    /// [Error::InvalidName] if it does not match `[A-Za-z0-9_-]+`. A struct that is
    /// this one, or already contains it, is rejected with [Error::CyclicStructure].
    pub fn field(&self, name: &str, value: impl Into<Field>) -> Result<&Self> {
        let value: Field = value.into();
        let endian = {
            let inner = self.0.borrow();
            if inner.fields.contains_key(name) {
                return Err(Error::DuplicateField {
                    structure: inner.name.clone(),
                    name: name.to_string(),
                });
            }
            inner.options.endian
        };
        validate_name(name)?;
        if let Field::Struct(child) = &value {
            if child.encloses(self) {
                return Err(Error::CyclicStructure {
                    structure: self.name(),
                    name: child.name(),
                });
            }
        }

        if let Some(endian) = endian {
            apply_endian(&value, endian);
        }

        let mut inner = self.0.borrow_mut();
        debug!("attaching {} {} to struct {}", value.kind_name(), name, inner.name);
        inner.fields.insert(name.to_string(), value);
        Ok(self)
    }

    /// Consuming form of [Struct::field], for building a struct in one expression.
    pub fn with_field(self, name: &str, value: impl Into<Field>) -> Result<Self> {
        self.field(name, value)?;
        Ok(self)
    }

    /// True if `other` is this struct or is nested anywhere below it.
    fn encloses(&self, other: &Struct) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
            || self
                .0
                .borrow()
                .fields
                .values()
                .any(|field| matches!(field, Field::Struct(s) if s.encloses(other)))
    }

    fn inherit_endian(&self, endian: Endian) {
        let children: Vec<Field> = {
            let mut inner = self.0.borrow_mut();
            if inner.options.endian.is_some() {
                return;
            }
            debug!("struct {} inherits {:?} byte order", inner.name, endian);
            inner.options.endian = Some(endian);
            inner.fields.values().cloned().collect()
        };
        for child in &children {
            apply_endian(child, endian);
        }
    }

    fn not_found(&self, name: &str) -> Error {
        Error::FieldNotFound {
            structure: self.name(),
            name: name.to_string(),
        }
    }

    /// Returns a handle to the named field.
    pub fn get(&self, name: &str) -> Result<Field> {
        let found = self.0.borrow().fields.get(name).cloned();
        found.ok_or_else(|| self.not_found(name))
    }

    /// Returns the named field as a concrete handle type.
    ///
    /// ```
    /// use structcraft::prelude::*;
    ///
    /// let s = structure("header").with_field("magic", u16(0xcafe)).unwrap();
    /// let magic = s.get_as::<ScalarField>("magic").unwrap();
    /// magic.set(0xbeef).unwrap();
    /// assert_eq!(s.to_bytes().unwrap(), vec![0xef, 0xbe]);
    /// ```
    pub fn get_as<T: FromField>(&self, name: &str) -> Result<T> {
        let field = self.get(name)?;
        let found = field.kind_name();
        T::from_field(field).ok_or_else(|| Error::UnexpectedFieldKind {
            name: name.to_string(),
            expected: T::KIND,
            found,
        })
    }

    /// Byte offset of the named field from the start of this struct.
    ///
    /// With an alignment other than packed, every preceding field counts for its
    /// padded size. The offset is the start of the field's slot.
    pub fn get_offset(&self, name: &str) -> Result<usize> {
        let inner = self.0.borrow();
        let Some(index) = inner.fields.get_index_of(name) else {
            return Err(self.not_found(name));
        };

        let alignment = inner.options.alignment;
        Ok(inner
            .fields
            .values()
            .take(index)
            .map(|field| alignment.pad(field.byte_size()))
            .sum())
    }

    /// Walks every segment but the last, returning the struct that holds the
    /// final segment and that struct's offset from the start of `self`.
    fn walk<'p>(&self, path: &'p str) -> Result<(Struct, &'p str, usize)> {
        let segments = split_path(path)?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(Error::InvalidPath {
                path: path.to_string(),
                reason: "path is empty".to_string(),
            });
        };

        let mut current = self.clone();
        let mut offset = 0;
        for segment in parents {
            let field = current.get(segment)?;
            offset += current.get_offset(segment)?;
            current = match field {
                Field::Struct(s) => s,
                _ => {
                    return Err(Error::InvalidPath {
                        path: path.to_string(),
                        reason: format!("Item in path \"{}\" is not a Struct", segment),
                    });
                }
            };
        }
        Ok((current, *last, offset))
    }

    /// Resolves a dot path, descending only through nested structs.
    pub fn get_deep(&self, path: &str) -> Result<Field> {
        let (holder, last, _) = self.walk(path)?;
        holder.get(last)
    }

    /// Byte offset of the field at `path`, measured from the start of this struct.
    pub fn get_deep_offset(&self, path: &str) -> Result<usize> {
        let (holder, last, offset) = self.walk(path)?;
        Ok(offset + holder.get_offset(last)?)
    }

    /// Serialized size, including alignment padding.
    pub fn byte_size(&self) -> usize {
        let inner = self.0.borrow();
        let alignment = inner.options.alignment;
        inner
            .fields
            .values()
            .map(|field| alignment.pad(field.byte_size()))
            .sum()
    }

    /// Appends the serialized struct to `out`.
    ///
    /// On error, `out` may already hold the bytes of the fields that came first.
    pub fn write_to<B: BufMut + ?Sized>(&self, out: &mut B) -> Result<()> {
        let inner = self.0.borrow();
        let StructOptions {
            alignment, padding, ..
        } = inner.options;
        trace!("serializing struct {}", inner.name);

        for field in inner.fields.values() {
            let size = field.byte_size();
            let fill = alignment.pad(size) - size;
            match padding {
                Padding::BeforeData => {
                    out.put_bytes(0, fill);
                    field.write_to(out)?;
                }
                Padding::AfterData => {
                    field.write_to(out)?;
                    out.put_bytes(0, fill);
                }
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.byte_size());
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Serializes into a shared, immutable buffer.
    pub fn to_buffer(&self) -> Result<Bytes> {
        let mut out = BytesMut::with_capacity(self.byte_size());
        self.write_to(&mut out)?;
        Ok(out.freeze())
    }

    pub(crate) fn downgrade(&self) -> WeakStruct {
        WeakStruct(Rc::downgrade(&self.0))
    }
}
