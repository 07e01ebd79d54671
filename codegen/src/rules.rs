//! Signature to emit-rule registry.
//!
//! A rule renders the right-hand side of a forward operation from its
//! resolved inputs and keyword arguments. Rules are registered once by the
//! caller; a signature without a rule is an error, there is no fallback.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use weave_ir::Node;

use crate::error::{MissingRuleSnafu, Result};

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleArgs<'a> {
    pub node: &'a Node,
    /// Resolved input names, in node input order.
    pub inputs: &'a [String],
    /// Keyword arguments with rendered values.
    pub kwargs: &'a IndexMap<String, String>,
    /// Physical device executing the generated code.
    pub runtime_devid: usize,
    /// Number of devices in the scale unit the plan was made for.
    pub plan_ndevs: usize,
    /// Number of devices at runtime, a multiple of `plan_ndevs`.
    pub runtime_ndevs: usize,
}

pub type EmitRule = Arc<dyn Fn(&RuleArgs<'_>) -> Result<String> + Send + Sync>;

/// Render `signature(in0, in1, k=v)`.
pub fn call_expr(signature: &str, inputs: &[String], kwargs: &IndexMap<String, String>) -> String {
    let args: Vec<String> =
        inputs.iter().cloned().chain(kwargs.iter().map(|(name, value)| format!("{name}={value}"))).collect();
    format!("{signature}({})", args.join(", "))
}

#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, EmitRule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, replacing any previous rule for the signature.
    pub fn register<F>(&mut self, signature: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&RuleArgs<'_>) -> Result<String> + Send + Sync + 'static,
    {
        self.rules.insert(signature.into(), Arc::new(rule));
        self
    }

    /// Register the plain call rendering (see [`call_expr`]) for a signature.
    pub fn register_call(&mut self, signature: impl Into<String>) -> &mut Self {
        let signature = signature.into();
        let callee = signature.clone();
        self.register(signature, move |args| Ok(call_expr(&callee, args.inputs, args.kwargs)))
    }

    pub fn get(&self, signature: &str) -> Result<&EmitRule> {
        self.rules.get(signature).ok_or_else(|| MissingRuleSnafu { signature }.build())
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.rules.contains_key(signature)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut signatures: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        signatures.sort_unstable();
        f.debug_struct("RuleRegistry").field("signatures", &signatures).finish()
    }
}
