//! String fields.
//!
//! Content is written as its UTF-8 bytes, so the field size is the encoded byte
//! length of the string rather than its character count.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bytes::BufMut;

#[derive(Debug)]
pub(crate) struct Text {
    value: String,
    null_terminated: bool,
}

/// Raw or null-terminated string data.
#[derive(Debug, Clone)]
pub struct StrField(Rc<RefCell<Text>>);

impl StrField {
    /// String bytes with no terminator.
    pub fn raw(value: impl Into<String>) -> Self {
        Self::build(value.into(), false)
    }

    /// String bytes followed by a single `0x00`.
    pub fn null_terminated(value: impl Into<String>) -> Self {
        Self::build(value.into(), true)
    }

    fn build(value: String, null_terminated: bool) -> Self {
        Self(Rc::new(RefCell::new(Text {
            value,
            null_terminated,
        })))
    }

    pub fn is_null_terminated(&self) -> bool {
        self.0.borrow().null_terminated
    }

    /// Returns the content, without the terminator.
    pub fn get(&self) -> String {
        self.0.borrow().value.clone()
    }

    pub fn set(&self, value: impl Into<String>) -> &Self {
        self.0.borrow_mut().value = value.into();
        self
    }

    pub fn byte_size(&self) -> usize {
        let text = self.0.borrow();
        text.value.len() + usize::from(text.null_terminated)
    }

    pub fn write_to<B: BufMut + ?Sized>(&self, out: &mut B) {
        let text = self.0.borrow();
        out.put_slice(text.value.as_bytes());
        if text.null_terminated {
            out.put_u8(0);
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<Text>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn from_rc(rc: Rc<RefCell<Text>>) -> Self {
        Self(rc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of(field: &StrField) -> Vec<u8> {
        let mut out = Vec::new();
        field.write_to(&mut out);
        out
    }

    #[test]
    fn test_raw_string() {
        let field = StrField::raw("hello");
        assert_eq!(field.byte_size(), 5);
        assert_eq!(bytes_of(&field), b"hello".to_vec());
        assert_eq!(field.get(), "hello");
    }

    #[test]
    fn test_null_terminated_string() {
        let field = StrField::null_terminated("world!");
        assert_eq!(field.byte_size(), 7);
        assert_eq!(bytes_of(&field), b"world!\0".to_vec());
        assert_eq!(field.get(), "world!");
    }

    #[test]
    fn test_set_changes_size() {
        let field = StrField::raw("hello!");
        field.set("francis");
        assert_eq!(field.byte_size(), 7);
        assert_eq!(bytes_of(&field), b"francis".to_vec());
    }

    #[test]
    fn test_non_ascii_uses_utf8_length() {
        let field = StrField::null_terminated("é");
        assert_eq!(field.byte_size(), 3);
        assert_eq!(bytes_of(&field), vec![0xc3, 0xa9, 0]);
    }
}
