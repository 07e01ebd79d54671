//! Statement emitters.
//!
//! Each emitter turns one node into the ordered statement lines of the
//! generated function body. Lines carry no indentation; the assembler
//! places them.

mod adapter;
mod forward;

use std::sync::Arc;

use tracing::debug;
use weave_ir::{Literal, Node, NodeKind, Value};

use crate::compose::return_name;
use crate::config::EmitConfig;
use crate::error::{InvalidNodeSnafu, Result, UnexpectedNodeSnafu};
use crate::naming::{Repr, tensor_name, value_name};
use crate::rules::RuleRegistry;

pub use adapter::{CallSite, Overlap, async_overlap_legal, check_overlap};
pub use forward::{OutputPath, PathStep, output_paths};

/// Where and how the emitted code runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitTarget<'a> {
    /// Physical device executing the generated code.
    pub runtime_devid: usize,
    /// Devices in the scale unit the plan was made for.
    pub plan_ndevs: usize,
    /// Devices at runtime, a multiple of `plan_ndevs`.
    pub runtime_ndevs: usize,
    /// Prefix for attribute names in the generated scope.
    pub prefix_attr: Option<&'a str>,
    /// Request overlapped communication for adapters.
    pub async_op: bool,
}

impl<'a> EmitTarget<'a> {
    pub fn new(runtime_devid: usize, plan_ndevs: usize, runtime_ndevs: usize) -> Self {
        Self { runtime_devid, plan_ndevs, runtime_ndevs, prefix_attr: None, async_op: false }
    }

    pub fn with_prefix_attr(mut self, prefix_attr: &'a str) -> Self {
        self.prefix_attr = Some(prefix_attr);
        self
    }

    pub fn with_async_op(mut self, async_op: bool) -> Self {
        self.async_op = async_op;
        self
    }
}

/// Emits statements for the nodes of one generated function.
///
/// Holds no state between calls besides its configuration and rules, so
/// separate nodes may be emitted from separate threads.
#[derive(Debug, Clone, Default)]
pub struct FuncEmitter {
    config: EmitConfig,
    rules: RuleRegistry,
}

impl FuncEmitter {
    pub fn new(config: EmitConfig, rules: RuleRegistry) -> Self {
        Self { config, rules }
    }

    pub fn config(&self) -> &EmitConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Emit any node, dispatching on its kind.
    ///
    /// Backward operations are rejected: their call sites are assembled by
    /// the caller from [`crate::backward_callsite_io`].
    pub fn emit_node(&self, node: &Node, target: &EmitTarget<'_>) -> Result<Vec<String>> {
        debug!(node = %node.display_name(), kind = node.kind().as_ref(), "emitting node");
        match node.kind() {
            NodeKind::FwOp { .. } => self.emit_fnode(
                node,
                target.runtime_devid,
                target.plan_ndevs,
                target.runtime_ndevs,
                target.prefix_attr,
            ),
            NodeKind::DataLoad => self.emit_dataloader(node),
            NodeKind::Adapter(_) => self.emit_adapter(node, target.prefix_attr, target.async_op),
            NodeKind::Reducer(_) => self.emit_reducer(node),
            NodeKind::BwOp => {
                UnexpectedNodeSnafu { node: node.display_name(), expected: "forward, data-load, adapter or reducer node" }
                    .fail()
            }
        }
    }

    /// `outputs = next(loader)`.
    pub fn emit_dataloader(&self, node: &Node) -> Result<Vec<String>> {
        if !matches!(node.kind(), NodeKind::DataLoad) {
            return UnexpectedNodeSnafu { node: node.display_name(), expected: "data-load node" }.fail();
        }
        let loader = node
            .input(0)
            .ok_or_else(|| InvalidNodeSnafu { node: node.display_name(), reason: "missing loader input" }.build())?;

        let outputs = return_name(node.outputs(), false, None)?;
        Ok(vec![format!("{outputs} = next({})", tensor_name(loader, None)?)])
    }

    /// `{prefix}{id}.sync_grads()`.
    pub fn emit_reducer(&self, node: &Node) -> Result<Vec<String>> {
        let NodeKind::Reducer(reducer) = node.kind() else {
            return UnexpectedNodeSnafu { node: node.display_name(), expected: "reducer node" }.fail();
        };

        let handle = format!("{}{}", self.config.reducer_prefix, reducer.id);
        let mut codes = Vec::with_capacity(2);
        if self.config.line_timer {
            codes.push(self.timer_probe(&handle));
        }
        codes.push(format!("{handle}.sync_grads()"));
        Ok(codes)
    }

    /// `del a_1, b_2` for values whose lifetime the runtime does not track.
    ///
    /// Returns `None` when there is nothing to release.
    pub fn emit_release<'v>(&self, values: impl IntoIterator<Item = &'v Arc<Value>>) -> Option<String> {
        let names: Vec<String> = values.into_iter().map(|v| value_name(v, None)).collect();
        if names.is_empty() { None } else { Some(format!("del {}", names.join(", "))) }
    }

    /// Timer probe statement carrying `label`.
    pub(crate) fn timer_probe(&self, label: &str) -> String {
        format!("{}({})", self.config.timer_fn, Repr::Literal(Literal::Str(label.to_string())))
    }
}
