//! Managed values: tensors and tracked objects with a stable identity.
//!
//! A value is identified by its `(name, id)` pair. Names may collide (two
//! attributes `a.b` and `a_b` sanitize to the same identifier), ids never do.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use bon::bon;
use smallvec::SmallVec;
use weave_dtype::ScalarDType;

use crate::error::{GradAlreadySetSnafu, GradOnObjectSnafu, Result};

// Ordering::Relaxed is sufficient, ids only need to be unique.
static VALUE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Allocate a fresh value id.
///
/// Upstream builders and codegen share this counter, so a synthesized
/// temporary can never collide with a graph value created in the same process.
pub fn next_value_id() -> u64 {
    VALUE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Tensor metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorMeta {
    pub shape: SmallVec<[usize; 4]>,
    pub dtype: ScalarDType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Tensor-like value. Only tensors take part in gradient tracking.
    Tensor(TensorMeta),
    /// Tracked non-tensor value (runtime scalar, loader handle, ...).
    Object,
}

/// A managed value in the IR.
///
/// Equality is identity: two values are equal iff their ids are equal.
#[derive(derive_more::Debug)]
pub struct Value {
    id: u64,
    name: String,
    kind: ValueKind,
    is_attr: bool,
    /// Gradient of this value, set once by the upstream autograd pass.
    /// The link only points tensor → gradient.
    #[debug(skip)]
    grad: OnceLock<Arc<Value>>,
}

#[bon]
impl Value {
    /// Create a value with builder pattern.
    ///
    /// The id is taken from the global counter unless given explicitly.
    #[builder]
    pub fn new(
        #[builder(into)] name: String,
        kind: ValueKind,
        #[builder(default)] is_attr: bool,
        id: Option<u64>,
    ) -> Arc<Self> {
        Arc::new(Self { id: id.unwrap_or_else(next_value_id), name, kind, is_attr, grad: OnceLock::new() })
    }
}

impl Value {
    /// Transient tensor.
    pub fn tensor(name: impl Into<String>, shape: impl IntoIterator<Item = usize>, dtype: ScalarDType) -> Arc<Self> {
        let meta = TensorMeta { shape: shape.into_iter().collect(), dtype };
        Self::builder().name(name).kind(ValueKind::Tensor(meta)).build()
    }

    /// Tensor owned by persistent module state (a weight or buffer).
    pub fn parameter(name: impl Into<String>, shape: impl IntoIterator<Item = usize>, dtype: ScalarDType) -> Arc<Self> {
        let meta = TensorMeta { shape: shape.into_iter().collect(), dtype };
        Self::builder().name(name).kind(ValueKind::Tensor(meta)).is_attr(true).build()
    }

    /// Tracked non-tensor value.
    pub fn object(name: impl Into<String>) -> Arc<Self> {
        Self::builder().name(name).kind(ValueKind::Object).build()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn is_attr(&self) -> bool {
        self.is_attr
    }

    pub fn is_tensor(&self) -> bool {
        matches!(self.kind, ValueKind::Tensor(_))
    }

    pub fn meta(&self) -> Option<&TensorMeta> {
        match &self.kind {
            ValueKind::Tensor(meta) => Some(meta),
            ValueKind::Object => None,
        }
    }

    pub fn grad(&self) -> Option<&Arc<Value>> {
        self.grad.get()
    }

    /// Attach the gradient of this tensor.
    ///
    /// Fails if the value is not a tensor or already has a gradient.
    pub fn set_grad(&self, grad: Arc<Value>) -> Result<()> {
        if !self.is_tensor() {
            return GradOnObjectSnafu { value: self.id }.fail();
        }
        self.grad.set(grad).map_err(|_| GradAlreadySetSnafu { value: self.id }.build())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Value {}

/// Wrapper for `Arc<Value>` that hashes and compares by id.
///
/// `Value` carries a `OnceLock`, so it is not used as a map key directly.
#[derive(Clone)]
pub struct ValueKey(pub Arc<Value>);

impl std::fmt::Debug for ValueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValueKey(id={})", self.0.id)
    }
}

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ValueKey {}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}
