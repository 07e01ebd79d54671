//! Forward-operation emission.

use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::trace;
use weave_ir::{Arg, Node, NodeKind, Value, ValueKey};

use super::FuncEmitter;
use crate::compose::kwargs_dict;
use crate::error::{Result, UnexpectedNodeSnafu};
use crate::naming::{tensor_name, value_name};
use crate::rules::RuleArgs;

/// One subscript step below the top-level output list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Index(usize),
    /// Rendered dict key.
    Key(String),
}

impl std::fmt::Display for PathStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "[{i}]"),
            Self::Key(key) => write!(f, "[{key}]"),
        }
    }
}

/// Position of a managed value inside a node's output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPath {
    /// Slot in the top-level output list.
    pub slot: usize,
    /// Steps below the slot; empty when the value is the slot itself.
    pub steps: SmallVec<[PathStep; 2]>,
}

impl OutputPath {
    /// Number of subscripts from the output list, counting the slot.
    pub fn depth(&self) -> usize {
        1 + self.steps.len()
    }
}

/// Record the path of every managed value in an output tree.
///
/// Only lists, tuples and dicts are descended into. A value reachable from
/// several positions keeps its first position in the order and its last path.
pub fn output_paths(outputs: &[Arg]) -> Result<IndexMap<ValueKey, (Arc<Value>, OutputPath)>> {
    fn walk(
        arg: &Arg,
        slot: usize,
        steps: &mut SmallVec<[PathStep; 2]>,
        paths: &mut IndexMap<ValueKey, (Arc<Value>, OutputPath)>,
    ) -> Result<()> {
        match arg {
            Arg::Value(v) => {
                paths.insert(ValueKey(v.clone()), (v.clone(), OutputPath { slot, steps: steps.clone() }));
            }
            Arg::List(items) | Arg::Tuple(items) => {
                for (i, item) in items.iter().enumerate() {
                    steps.push(PathStep::Index(i));
                    walk(item, slot, steps, paths)?;
                    steps.pop();
                }
            }
            Arg::Dict(items) => {
                for (key, item) in items {
                    steps.push(PathStep::Key(tensor_name(key, None)?));
                    walk(item, slot, steps, paths)?;
                    steps.pop();
                }
            }
            _ => {}
        }
        Ok(())
    }

    let mut paths = IndexMap::new();
    let mut steps = SmallVec::new();
    for (slot, output) in outputs.iter().enumerate() {
        walk(output, slot, &mut steps, &mut paths)?;
    }
    Ok(paths)
}

impl FuncEmitter {
    /// Emit a forward operation.
    ///
    /// ```text
    /// # comment, if any
    /// linear_7 = torch.nn.functional.linear(x_3, fc_weight_1, bias=None)
    /// ```
    ///
    /// Nested outputs are unpacked through temporaries:
    ///
    /// ```text
    /// a_4, im_output_9 = op(x_3)
    /// b_5 = im_output_9[0][1]
    /// del im_output_9
    /// ```
    #[tracing::instrument(skip_all, fields(node = %node.display_name()))]
    pub fn emit_fnode(
        &self,
        node: &Node,
        runtime_devid: usize,
        plan_ndevs: usize,
        runtime_ndevs: usize,
        prefix_attr: Option<&str>,
    ) -> Result<Vec<String>> {
        let NodeKind::FwOp { signature } = node.kind() else {
            return UnexpectedNodeSnafu { node: node.display_name(), expected: "forward operation" }.fail();
        };
        let rule = self.rules.get(signature)?;

        let comment = node.comment().filter(|comment| !comment.is_empty());
        let mut codes = Vec::new();
        if let Some(comment) = comment {
            codes.extend(comment.lines().map(|line| format!("# {line}")));
        }
        if self.config.line_timer {
            codes.push(self.timer_probe(comment.unwrap_or(signature)));
        }

        let inputs = node.inputs().iter().map(|t| tensor_name(t, prefix_attr)).collect::<Result<Vec<_>>>()?;
        let kwargs = kwargs_dict(node.kwargs(), prefix_attr)?;
        let body = rule(&RuleArgs { node, inputs: &inputs, kwargs: &kwargs, runtime_devid, plan_ndevs, runtime_ndevs })?;

        if node.outputs().is_empty() {
            codes.push(body);
            return Ok(codes);
        }

        // Flat: every top-level slot is a managed value.
        if let Some(values) = node.outputs().iter().map(Arg::as_value).collect::<Option<Vec<_>>>() {
            let names: Vec<String> = values.iter().map(|v| value_name(v, None)).collect();
            codes.push(format!("{} = {body}", names.join(", ")));
            return Ok(codes);
        }

        let paths = output_paths(node.outputs())?;
        let mut bindings = Vec::with_capacity(node.outputs().len());
        let mut intermediates = Vec::new();
        for output in node.outputs() {
            match output.as_value() {
                Some(v) => bindings.push(value_name(v, None)),
                None => {
                    let name = value_name(&Value::object("im_output"), None);
                    intermediates.push(name.clone());
                    bindings.push(name);
                }
            }
        }
        codes.push(format!("{} = {body}", bindings.join(", ")));

        for (value, path) in paths.values() {
            if path.steps.is_empty() {
                continue;
            }
            let mut extract = bindings[path.slot].clone();
            for step in &path.steps {
                extract.push_str(&step.to_string());
            }
            codes.push(format!("{} = {extract}", value_name(value, None)));
        }

        // Temporaries are invisible to the lifecycle manager.
        for im in &intermediates {
            codes.push(format!("del {im}"));
        }

        trace!(intermediates = intermediates.len(), lines = codes.len(), "unpacked nested outputs");
        Ok(codes)
    }
}
