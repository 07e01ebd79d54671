//! Backward call-site inputs and outputs.
//!
//! A backward node receives the gradients of its forward node's outputs and
//! produces the gradients of the forward inputs. The runtime backward call
//! also needs the forward tensors those gradients belong to, recovered here
//! through the mirror link.

use std::collections::HashMap;
use std::sync::Arc;

use snafu::OptionExt;
use tracing::trace;
use weave_ir::{Arg, Node, Value, ValueKey};

use crate::error::{MissingMirrorSnafu, Result, UnexpectedForwardSnafu};

/// Operands of one backward call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackwardIo {
    /// Forward inputs whose gradients the call produces.
    pub input_tensors: Vec<Arc<Value>>,
    /// Forward outputs whose gradients the call consumes.
    pub output_tensors: Vec<Arc<Value>>,
    /// Gradients consumed by the call.
    pub output_grads: Vec<Arc<Value>>,
    /// Gradients produced by the call.
    pub input_grads: Vec<Arc<Value>>,
}

impl BackwardIo {
    /// `(input_tensors, output_tensors, output_grads, input_grads)`.
    #[allow(clippy::type_complexity)]
    pub fn into_parts(self) -> (Vec<Arc<Value>>, Vec<Arc<Value>>, Vec<Arc<Value>>, Vec<Arc<Value>>) {
        (self.input_tensors, self.output_tensors, self.output_grads, self.input_grads)
    }
}

fn top_level_tensors(args: &[Arg]) -> Vec<Arc<Value>> {
    args.iter().filter_map(Arg::as_tensor).cloned().collect()
}

/// Resolve the operands of a backward call from a backward node.
///
/// Gradients without a matching forward tensor are left out of the tensor
/// lists but kept in the gradient lists.
#[tracing::instrument(skip_all, fields(node = %node.display_name()))]
pub fn backward_callsite_io(node: &Node) -> Result<BackwardIo> {
    if node.is_forward() {
        return UnexpectedForwardSnafu { node: node.display_name() }.fail();
    }
    let forward = node.mirror().context(MissingMirrorSnafu { node: node.display_name() })?;

    let mut grad2tensor: HashMap<ValueKey, Arc<Value>> = HashMap::new();
    for tensor in forward.inputs().iter().chain(forward.outputs()).filter_map(Arg::as_tensor) {
        if let Some(grad) = tensor.grad() {
            grad2tensor.insert(ValueKey(grad.clone()), tensor.clone());
        }
    }

    let lookup = |grads: &[Arc<Value>]| -> Vec<Arc<Value>> {
        grads
            .iter()
            .filter_map(|grad| {
                let tensor = grad2tensor.get(&ValueKey(grad.clone())).cloned();
                if tensor.is_none() {
                    trace!(grad = grad.id(), "gradient has no forward tensor, dropped");
                }
                tensor
            })
            .collect()
    };

    let input_grads = top_level_tensors(node.outputs());
    let output_grads = top_level_tensors(node.inputs());
    let input_tensors = lookup(&input_grads);
    let output_tensors = lookup(&output_grads);

    Ok(BackwardIo { input_tensors, output_tensors, output_grads, input_grads })
}
