//! Intermediate representation consumed by the weave emitter.
//!
//! The planner builds this graph after partitioning and scheduling. Codegen
//! reads it and never mutates it.
//!
//! # Module Organization
//!
//! - [`value`] - Managed values (tensors, tracked objects) and their identity
//! - [`arg`] - Nested argument trees of values and literals
//! - [`node`] - Graph nodes and their kinds
//! - [`adapter`] - Communication adapters and primitives
//! - [`error`] - Error types and result handling

pub mod adapter;
pub mod arg;
pub mod error;
pub mod node;
pub mod prelude;
pub mod value;


pub use adapter::{Adapter, Prim, PrimKind};
pub use arg::{Arg, Literal, SliceArg};
pub use error::{Error, Result};
pub use node::{Kwargs, Node, NodeKind, WeightReducer};
pub use value::{TensorMeta, Value, ValueKey, ValueKind, next_value_id};

pub use weave_dtype::{DeviceKind, DeviceSpec, ScalarDType};
