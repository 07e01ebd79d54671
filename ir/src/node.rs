//! Graph nodes.

use std::sync::Arc;

use bon::bon;
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::adapter::Adapter;
use crate::arg::Arg;

/// Insertion-ordered keyword arguments.
pub type Kwargs = IndexMap<String, Arg>;

/// Gradient reducer handle owned by the generated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeightReducer {
    pub id: usize,
}

/// Node payload, one variant per node kind.
#[derive(Debug, Clone, PartialEq, strum::AsRefStr)]
pub enum NodeKind {
    /// Forward operation; `signature` selects the emit rule.
    FwOp { signature: String },
    /// Backward operation derived from a forward operation through its mirror.
    BwOp,
    /// Pulls the next sample from the loader passed as the sole input.
    DataLoad,
    Adapter(Adapter),
    Reducer(WeightReducer),
}

impl NodeKind {
    pub fn fw_op(signature: impl Into<String>) -> Self {
        Self::FwOp { signature: signature.into() }
    }
}

/// A vertex of the scheduled graph.
///
/// Built once by the planner; codegen only reads it.
#[derive(Debug, Clone)]
pub struct Node {
    id: usize,
    name: String,
    kind: NodeKind,
    inputs: Vec<Arg>,
    outputs: Vec<Arg>,
    kwargs: Kwargs,
    comment: Option<String>,
    device: SmallVec<[usize; 4]>,
    is_forward: bool,
    /// Forward node this backward node was derived from.
    mirror: Option<Arc<Node>>,
}

#[bon]
impl Node {
    /// Create a node with builder pattern.
    ///
    /// `is_forward` defaults to `false` for [`NodeKind::BwOp`] and `true`
    /// otherwise; backward adapters set it explicitly.
    #[builder]
    pub fn new(
        id: usize,
        #[builder(into)] name: String,
        kind: NodeKind,
        #[builder(default)] inputs: Vec<Arg>,
        #[builder(default)] outputs: Vec<Arg>,
        #[builder(default)] kwargs: Kwargs,
        #[builder(into)] comment: Option<String>,
        #[builder(default, into)] device: SmallVec<[usize; 4]>,
        is_forward: Option<bool>,
        mirror: Option<Arc<Node>>,
    ) -> Self {
        let is_forward = is_forward.unwrap_or(!matches!(kind, NodeKind::BwOp));
        Self { id, name, kind, inputs, outputs, kwargs, comment, device, is_forward, mirror }
    }
}

impl Node {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `{name}{id}`, unique within a graph.
    pub fn display_name(&self) -> String {
        format!("{}{}", self.name, self.id)
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Signature of forward operations.
    pub fn signature(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::FwOp { signature } => Some(signature),
            NodeKind::Adapter(adapter) => Some(&adapter.signature),
            _ => None,
        }
    }

    pub fn inputs(&self) -> &[Arg] {
        &self.inputs
    }

    pub fn input(&self, index: usize) -> Option<&Arg> {
        self.inputs.get(index)
    }

    pub fn outputs(&self) -> &[Arg] {
        &self.outputs
    }

    pub fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn device(&self) -> &[usize] {
        &self.device
    }

    pub fn is_forward(&self) -> bool {
        self.is_forward
    }

    pub fn mirror(&self) -> Option<&Arc<Node>> {
        self.mirror.as_ref()
    }
}
