//! Common imports for building and reading graphs.
//!
//! ```rust,ignore
//! use weave_ir::prelude::*;
//! ```

pub use crate::{Adapter, Prim, PrimKind};
pub use crate::{Arg, Literal};
pub use crate::{Kwargs, Node, NodeKind, WeightReducer};
pub use crate::{Value, ValueKey, ValueKind};

pub use weave_dtype::{DeviceSpec, ScalarDType};
