//! # structcraft
//!
//! Declarative construction of byte-exact binary structures.
//!
//! A [Struct] is an ordered list of named fields: fixed-width integers and integer
//! arrays, raw or null-terminated strings, nested structs, bit-packed
//! [BitStruct]s, and two computed kinds. A [Pointer] writes the offset of a field
//! reached through a dot path, and a [SizeOf] writes the current size of another
//! struct or field. Nothing is cached, so every size, offset and computed value
//! reflects the structure as it is at the moment it is serialized.
//!
//! ## Example
//!
//! ```
//! use structcraft::prelude::*;
//!
//! let body = structure("body")
//!     .with_field("id", u16(0x0102)).unwrap()
//!     .with_field("name", null_terminated_string("abc")).unwrap();
//!
//! let packet = structure("packet");
//! packet.field("len", size_of8(&body)).unwrap();
//! packet.field("name_at", pointer8(&packet, "body.name").unwrap()).unwrap();
//! packet.field("body", &body).unwrap();
//!
//! assert_eq!(
//!     packet.to_bytes().unwrap(),
//!     vec![6, 4, 0x02, 0x01, b'a', b'b', b'c', 0],
//! );
//! ```

pub mod bit_struct;
pub mod bits;
pub mod errors;
pub mod factory;
pub mod field;
pub mod int;
pub mod layout;
pub mod name;
pub mod prelude;
pub mod reference;
#[cfg(feature = "serde")]
pub mod serde;
pub mod string;
pub mod structure;

pub use bit_struct::BitStruct;
pub use bits::BitOrder;
pub use errors::{Error, Result};
pub use field::{AsField, Field};
pub use int::{ArrayField, IntKind, ScalarField, Width};
pub use layout::{Alignment, Endian, Padding, StructOptions};
pub use reference::{Pointer, SizeOf};
pub use string::StrField;
pub use structure::Struct;
