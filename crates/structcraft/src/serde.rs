//! Serializable layout configuration.
//!
//! These types mirror the option enums of the core crate so that struct layouts can
//! be described in a config file (JSON or anything else serde reads) and then
//! converted into core types with `From`.

use serde::{Deserialize, Serialize};

/// Byte order.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum EndianDef {
    #[default]
    Little,
    Big,
}

/// Field alignment boundary.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum AlignmentDef {
    #[default]
    Packed,
    Align2Byte,
    Align4Byte,
    Align8Byte,
}

/// Side of the data the alignment zeros go on.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum PaddingDef {
    BeforeData,
    #[default]
    AfterData,
}

/// Packing order for a bit structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum BitOrderDef {
    #[default]
    /// First member in the most significant bits.
    MsbFirst,
    /// First member in the least significant bits.
    LsbFirst,
}

/// Layout of a single structure. Every key is optional.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct StructOptionsDef {
    #[serde(default)]
    pub alignment: AlignmentDef,
    #[serde(default)]
    pub padding: PaddingDef,
    /// Structure-level byte order pushed onto attached fields.
    #[serde(default)]
    pub endian: Option<EndianDef>,
}
