//! Adapter emission and the async-overlap legality check.

use std::collections::BTreeSet;

use snafu::ensure;
use tracing::debug;
use weave_ir::{Arg, Kwargs, Literal, Node, NodeKind};

use super::FuncEmitter;
use crate::compose::{kwargs_name, return_name, tuple_name};
use crate::error::{AdapterNotDispatchedSnafu, Result, UnexpectedNodeSnafu};
use crate::naming::tensor_name;

/// One call emitted for an adapter: the adapter itself or one primitive.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub signature: &'a str,
    pub inputs: &'a [Arg],
    pub outputs: &'a [Arg],
    pub kwargs: &'a Kwargs,
    pub collective: bool,
    /// Device group of the call.
    pub device: &'a [usize],
}

impl CallSite<'_> {
    fn device_set(&self) -> BTreeSet<usize> {
        self.device.iter().copied().collect()
    }
}

/// Outcome of the overlap check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Overlap {
    Legal,
    /// A local call follows a collective and would wait on it.
    NonCollectiveAfterCollective,
    /// Collectives run on different device groups.
    MixedDeviceGroups,
}

/// Decide whether the collectives of a call sequence may run overlapped.
///
/// Non-collective calls must all precede the collectives, and every
/// collective must target the same device set.
pub fn check_overlap(sites: &[CallSite<'_>]) -> Overlap {
    let non_collectives = sites.iter().filter(|site| !site.collective).count();
    if let Some(last) = sites.iter().rposition(|site| !site.collective)
        && last + 1 != non_collectives
    {
        return Overlap::NonCollectiveAfterCollective;
    }

    let mut groups = sites.iter().filter(|site| site.collective).map(CallSite::device_set);
    if let Some(first) = groups.next()
        && groups.any(|group| group != first)
    {
        return Overlap::MixedDeviceGroups;
    }
    Overlap::Legal
}

/// Shorthand for `check_overlap(sites) == Overlap::Legal`.
pub fn async_overlap_legal(sites: &[CallSite<'_>]) -> bool {
    check_overlap(sites) == Overlap::Legal
}

impl FuncEmitter {
    /// Emit an adapter dispatched to a single device.
    ///
    /// With `async_op`, collectives are launched asynchronously when the
    /// call sequence allows it; otherwise the request is dropped.
    #[tracing::instrument(skip_all, fields(node = %node.display_name()))]
    pub fn emit_adapter(&self, node: &Node, prefix_attr: Option<&str>, async_op: bool) -> Result<Vec<String>> {
        let NodeKind::Adapter(adapter) = node.kind() else {
            return UnexpectedNodeSnafu { node: node.display_name(), expected: "adapter node" }.fail();
        };
        ensure!(
            node.device().len() == 1,
            AdapterNotDispatchedSnafu { node: node.display_name(), devices: node.device().to_vec() }
        );

        let sites: Vec<CallSite<'_>> = if adapter.is_single_call() {
            vec![CallSite {
                signature: &adapter.signature,
                inputs: node.inputs(),
                outputs: node.outputs(),
                kwargs: node.kwargs(),
                collective: false,
                device: node.device(),
            }]
        } else {
            adapter
                .prims
                .iter()
                .map(|prim| CallSite {
                    signature: &prim.signature,
                    inputs: &prim.inputs,
                    outputs: &prim.outputs,
                    kwargs: &prim.kwargs,
                    collective: prim.is_collective(),
                    device: &prim.device,
                })
                .collect()
        };

        let async_op = async_op && {
            let overlap = check_overlap(&sites);
            if overlap != Overlap::Legal {
                debug!(reason = overlap.as_ref(), "adapter falls back to synchronous communication");
            }
            overlap == Overlap::Legal
        };

        let mut codes = Vec::with_capacity(sites.len());
        for site in &sites {
            let inputs = match site.inputs {
                [input] => tensor_name(input, prefix_attr)?,
                inputs => tuple_name(inputs, false, prefix_attr)?,
            };
            let kwargs = if async_op && site.collective {
                let mut kwargs = site.kwargs.clone();
                kwargs.insert("async_op".to_string(), Arg::Literal(Literal::Bool(true)));
                kwargs_name(&kwargs)?
            } else {
                kwargs_name(site.kwargs)?
            };
            let outputs = return_name(site.outputs, false, None)?;

            if self.config.line_timer {
                codes.push(self.timer_probe(site.signature));
            }
            let args = if kwargs.is_empty() { inputs } else { format!("{inputs}, {kwargs}") };
            codes.push(format!("{outputs} = {}({args})", site.signature));
        }
        Ok(codes)
    }
}
