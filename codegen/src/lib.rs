//! Statement emission for partitioned tensor programs.
//!
//! Turns the nodes of a scheduled, partitioned graph into the statement
//! lines of a generated Python/PyTorch function body. Function signatures,
//! indentation and module assembly belong to the caller.
//!
//! # Architecture
//!
//! - **Naming**: resolves argument trees to identifiers and literals ([`naming`])
//! - **Composition**: argument lists, tuples and unpacking targets ([`compose`])
//! - **Rules**: per-signature renderers for forward operations ([`rules`])
//! - **Emitters**: one per node kind, behind [`FuncEmitter`] ([`emit`])
//! - **Backward**: operands of backward calls ([`backward`])
//!
//! # Usage
//!
//! ```ignore
//! use weave_codegen::{EmitConfig, EmitTarget, FuncEmitter, RuleRegistry};
//!
//! let mut rules = RuleRegistry::new();
//! rules.register_call("torch.nn.functional.linear");
//!
//! let emitter = FuncEmitter::new(EmitConfig::from_env(), rules);
//! let lines = emitter.emit_node(&node, &EmitTarget::new(0, 4, 4))?;
//! ```

pub mod backward;
pub mod compose;
pub mod config;
pub mod emit;
pub mod error;
pub mod naming;
pub mod rules;


pub use backward::{BackwardIo, backward_callsite_io};
pub use config::EmitConfig;
pub use emit::{EmitTarget, FuncEmitter};
pub use error::*;
pub use naming::{Repr, tensor_name, value_name};
pub use rules::{EmitRule, RuleArgs, RuleRegistry};
