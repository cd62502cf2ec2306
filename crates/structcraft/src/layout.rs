//! Layout options: byte order, field alignment and padding direction.

/// Byte order used when a multi-byte value is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Default for Endian {
    fn default() -> Self {
        Endian::Little
    }
}

/// Boundary every field of a [crate::structure::Struct] is rounded up to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// No rounding, fields are laid out back to back.
    Packed,
    Align2Byte,
    Align4Byte,
    Align8Byte,
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::Packed
    }
}

impl Alignment {
    /// Boundary in bytes, or `None` for [Alignment::Packed].
    pub fn boundary(self) -> Option<usize> {
        match self {
            Alignment::Packed => None,
            Alignment::Align2Byte => Some(2),
            Alignment::Align4Byte => Some(4),
            Alignment::Align8Byte => Some(8),
        }
    }

    /// Rounds a field size up to this alignment.
    pub fn pad(self, size: usize) -> usize {
        match self.boundary() {
            Some(boundary) => align_to(size, boundary),
            None => size,
        }
    }
}

/// Where the zero bytes go when a field is shorter than its aligned size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Padding {
    /// Zeros are prepended and the data is right-justified.
    BeforeData,
    /// Zeros are appended after the data.
    AfterData,
}

impl Default for Padding {
    fn default() -> Self {
        Padding::AfterData
    }
}

/// Rounds `value` up to the next multiple of `boundary`, which must be a power of two.
pub fn align_to(value: usize, boundary: usize) -> usize {
    (value + (boundary - 1)) & !(boundary - 1)
}

/// Per-structure layout configuration.
///
/// `endian` is the structure-level byte order. When set, it is copied onto every
/// numeric field at the moment the field is attached; when `None`, attached fields
/// keep whatever byte order they were built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructOptions {
    pub alignment: Alignment,
    pub padding: Padding,
    pub endian: Option<Endian>,
}

#[cfg(feature = "serde")]
impl From<crate::serde::EndianDef> for Endian {
    fn from(value: crate::serde::EndianDef) -> Self {
        match value {
            crate::serde::EndianDef::Little => Endian::Little,
            crate::serde::EndianDef::Big => Endian::Big,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::AlignmentDef> for Alignment {
    fn from(value: crate::serde::AlignmentDef) -> Self {
        match value {
            crate::serde::AlignmentDef::Packed => Alignment::Packed,
            crate::serde::AlignmentDef::Align2Byte => Alignment::Align2Byte,
            crate::serde::AlignmentDef::Align4Byte => Alignment::Align4Byte,
            crate::serde::AlignmentDef::Align8Byte => Alignment::Align8Byte,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::PaddingDef> for Padding {
    fn from(value: crate::serde::PaddingDef) -> Self {
        match value {
            crate::serde::PaddingDef::BeforeData => Padding::BeforeData,
            crate::serde::PaddingDef::AfterData => Padding::AfterData,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::StructOptionsDef> for StructOptions {
    fn from(value: crate::serde::StructOptionsDef) -> Self {
        StructOptions {
            alignment: value.alignment.into(),
            padding: value.padding.into(),
            endian: value.endian.map(Into::into),
        }
    }
}

impl StructOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> &mut Self {
        self.alignment = alignment;
        self
    }

    pub fn set_padding(&mut self, padding: Padding) -> &mut Self {
        self.padding = padding;
        self
    }

    pub fn set_endian(&mut self, endian: Endian) -> &mut Self {
        self.endian = Some(endian);
        self
    }
}
