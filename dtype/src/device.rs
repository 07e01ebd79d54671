//! Physical device descriptors.

use crate::error::{InvalidDeviceSnafu, Result};

/// Device type as spelled by the runtime library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(any(test, feature = "proptest"), derive(proptest_derive::Arbitrary))]
pub enum DeviceKind {
    Cpu,
    Cuda,
    Mps,
    Meta,
}

/// A physical device: a type plus an optional ordinal.
///
/// Renders as `"type"` or `"type:index"`, which is the only form emitted code
/// may contain. Device index objects have no literal spelling of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "proptest"), derive(proptest_derive::Arbitrary))]
pub struct DeviceSpec {
    pub kind: DeviceKind,
    pub index: Option<usize>,
}

impl DeviceSpec {
    pub const fn new(kind: DeviceKind, index: Option<usize>) -> Self {
        Self { kind, index }
    }

    pub const fn cpu() -> Self {
        Self::new(DeviceKind::Cpu, None)
    }

    pub const fn cuda(index: usize) -> Self {
        Self::new(DeviceKind::Cuda, Some(index))
    }

    /// Parse a device string.
    ///
    /// Examples:
    /// - "cpu" -> DeviceSpec { Cpu, None }
    /// - "CUDA:1" -> DeviceSpec { Cuda, Some(1) }
    /// - "cuda" -> DeviceSpec { Cuda, None }
    pub fn parse(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        let (kind, index) = match lowered.split_once(':') {
            Some((kind, index)) => (kind, Some(index)),
            None => (lowered.as_str(), None),
        };

        let kind = match kind {
            "cpu" => DeviceKind::Cpu,
            "cuda" | "gpu" => DeviceKind::Cuda,
            "mps" => DeviceKind::Mps,
            "meta" => DeviceKind::Meta,
            _ => return InvalidDeviceSnafu { device: s }.fail(),
        };

        let index = match index {
            Some(index) => Some(index.parse().map_err(|_| InvalidDeviceSnafu { device: s }.build())?),
            None => None,
        };

        Ok(Self { kind, index })
    }
}

impl std::fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}:{index}", self.kind.as_ref()),
            None => f.write_str(self.kind.as_ref()),
        }
    }
}

impl std::str::FromStr for DeviceSpec {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
