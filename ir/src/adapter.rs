//! Communication adapters and their primitives.
//!
//! An adapter moves data between the device layouts chosen by the planner.
//! It either wraps a single differentiable custom call or an ordered list of
//! primitives, each running on its own device group.

use bon::bon;
use smallvec::SmallVec;

use crate::arg::Arg;
use crate::node::Kwargs;

/// Primitive kinds.
///
/// Collective primitives synchronize across their device group; the rest
/// only touch local or point-to-point data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::AsRefStr, strum::VariantArray)]
#[strum(serialize_all = "snake_case")]
pub enum PrimKind {
    // Local data movement
    Identity,
    Select,
    Merge,
    Chunk,
    Move,

    // Collectives
    AllReduce,
    AllGather,
    ReduceScatter,
    AllToAll,
    Broadcast,
    RdScatter,
    RvScatter,
    RdGather,
    RvGather,
}

impl PrimKind {
    pub const fn is_collective(&self) -> bool {
        !matches!(self, Self::Identity | Self::Select | Self::Merge | Self::Chunk | Self::Move)
    }

    /// Runtime entry point used when the planner does not name one.
    pub fn default_signature(&self) -> String {
        format!("weave.runtime.adapter.{}", self.as_ref())
    }
}

/// A single communication or data-movement step.
#[derive(Debug, Clone, PartialEq)]
pub struct Prim {
    pub kind: PrimKind,
    pub signature: String,
    pub inputs: Vec<Arg>,
    pub outputs: Vec<Arg>,
    pub kwargs: Kwargs,
    /// Device group the primitive runs on.
    pub device: SmallVec<[usize; 4]>,
}

#[bon]
impl Prim {
    #[builder]
    pub fn new(
        kind: PrimKind,
        #[builder(into)] signature: Option<String>,
        #[builder(default)] inputs: Vec<Arg>,
        #[builder(default)] outputs: Vec<Arg>,
        #[builder(default)] kwargs: Kwargs,
        #[builder(default, into)] device: SmallVec<[usize; 4]>,
    ) -> Self {
        let signature = signature.unwrap_or_else(|| kind.default_signature());
        Self { kind, signature, inputs, outputs, kwargs, device }
    }
}

impl Prim {
    pub fn is_collective(&self) -> bool {
        self.kind.is_collective()
    }
}

/// Payload of an adapter node.
#[derive(Debug, Clone, PartialEq)]
pub struct Adapter {
    /// Entry point of the custom call when the adapter is emitted as a whole.
    pub signature: String,
    pub prims: Vec<Prim>,
    pub differentiable: bool,
    pub custom: bool,
}

impl Adapter {
    pub fn from_prims(prims: Vec<Prim>) -> Self {
        Self { signature: String::new(), prims, differentiable: false, custom: false }
    }

    /// Differentiable custom adapter emitted as a single call.
    pub fn custom(signature: impl Into<String>, prims: Vec<Prim>) -> Self {
        Self { signature: signature.into(), prims, differentiable: true, custom: true }
    }

    /// Whether emission calls the adapter itself instead of its primitives.
    pub fn is_single_call(&self) -> bool {
        self.differentiable && self.custom
    }
}
