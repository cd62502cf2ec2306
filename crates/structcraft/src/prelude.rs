//! Everything needed to build and serialize structures, in one import.

pub use crate::bit_struct::BitStruct;
pub use crate::bits::BitOrder;
pub use crate::errors::Error;
pub use crate::factory::*;
pub use crate::field::{AsField, Field, FromField};
pub use crate::int::{ArrayField, IntKind, ScalarField, Width};
pub use crate::layout::{Alignment, Endian, Padding, StructOptions};
pub use crate::reference::{Pointer, SizeOf};
pub use crate::string::StrField;
pub use crate::structure::Struct;
