//! Error types for statement emission.
//!
//! Every variant is a violated contract between the planner, the rule
//! registry and the emitter. None of them is recoverable inside codegen.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during statement emission.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A value has no textual rendering.
    #[snafu(display("unsupported data type: {type_name}"))]
    UnsupportedValue { type_name: String },

    /// No emit rule is registered for an operation signature.
    #[snafu(display("no emit rule registered for signature '{signature}'"))]
    MissingRule { signature: String },

    /// Adapter reached emission without being pinned to exactly one device.
    #[snafu(display("expected adapter {node} to be dispatched to a single device, got {devices:?}"))]
    AdapterNotDispatched { node: String, devices: Vec<usize> },

    /// Backward node without a forward counterpart.
    #[snafu(display("backward node {node} has no mirrored forward node"))]
    MissingMirror { node: String },

    /// A forward node was passed where a backward node is required.
    #[snafu(display("expected a backward node, got forward node {node}"))]
    UnexpectedForward { node: String },

    /// Node kind does not match the emitter.
    #[snafu(display("node {node} is not a {expected}"))]
    UnexpectedNode { node: String, expected: &'static str },

    /// Node is structurally malformed.
    #[snafu(display("invalid node {node}: {reason}"))]
    InvalidNode { node: String, reason: String },

    /// Error raised by an emit rule.
    #[snafu(display("emit rule for '{signature}' failed: {reason}"))]
    RuleFailed { signature: String, reason: String },
}
