//! Element-type tags and physical device descriptors.
//!
//! Both types appear as plain literals inside IR argument trees and must
//! render to a source-agnostic spelling in emitted code.

pub mod device;
pub mod error;


pub use device::{DeviceKind, DeviceSpec};
pub use error::{Error, Result};

/// Tensor element types.
///
/// The set is closed: an element type the runtime library does not know has
/// no literal form and cannot reach codegen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::VariantArray)]
#[cfg_attr(any(test, feature = "proptest"), derive(proptest_derive::Arbitrary))]
pub enum ScalarDType {
    Bool,

    Int8,
    UInt8,
    Int16,
    Int32,
    Int64,

    Float16,
    BFloat16,
    Float32,
    Float64,

    Complex64,
    Complex128,
}

impl ScalarDType {
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int8 => 1,
            Self::UInt8 => 1,
            Self::Int16 => 2,
            Self::Int32 => 4,
            Self::Int64 => 8,
            Self::Float16 => 2,
            Self::BFloat16 => 2,
            Self::Float32 => 4,
            Self::Float64 => 8,
            Self::Complex64 => 8,
            Self::Complex128 => 16,
        }
    }

    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub const fn is_int(&self) -> bool {
        self.is_signed() || matches!(self, Self::UInt8)
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::BFloat16 | Self::Float32 | Self::Float64)
    }

    /// Attribute name under the runtime's tensor module (`torch.<name>`).
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float16 => "float16",
            Self::BFloat16 => "bfloat16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
        }
    }
}

/// Renders the fully qualified spelling, e.g. `torch.float32`.
impl std::fmt::Display for ScalarDType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "torch.{}", self.short_name())
    }
}
