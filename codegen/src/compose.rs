//! Container name composer.
//!
//! Joins resolved names into argument lists, tuple literals and unpacking
//! targets. Attribute values can be skipped when they are already bound as
//! persistent state and must not be re-declared as locals.

use indexmap::IndexMap;
use weave_ir::{Arg, Kwargs, Literal};

use crate::error::Result;
use crate::naming::tensor_name;

/// Placeholder target for results nobody observes.
pub const DISCARD: &str = "_";

fn collect_names(
    args: &[Arg],
    skip: impl Fn(&Arg) -> bool,
    prefix_attr: Option<&str>,
) -> Result<Vec<String>> {
    args.iter().filter(|arg| !skip(*arg)).map(|arg| tensor_name(arg, prefix_attr)).collect()
}

fn is_attr_tensor(arg: &Arg) -> bool {
    arg.as_tensor().is_some_and(|t| t.is_attr())
}

/// `(a_1, b_2, )`.
///
/// A trailing empty slot is always appended so one element still forms a
/// tuple: `(a_1, )`. An empty list renders `()`.
pub fn tuple_name(args: &[Arg], skip_attr: bool, prefix_attr: Option<&str>) -> Result<String> {
    let mut names = collect_names(args, |arg| skip_attr && is_attr_tensor(arg), prefix_attr)?;
    names.push(String::new());
    Ok(format!("({})", names.join(", ")))
}

/// `a_1, b_2`, or [`DISCARD`] when nothing is left to bind.
pub fn return_name(args: &[Arg], skip_attr: bool, prefix_attr: Option<&str>) -> Result<String> {
    let names = collect_names(args, |arg| skip_attr && is_attr_tensor(arg), prefix_attr)?;
    Ok(join_or_discard(names))
}

/// Like [`return_name`], but skips every managed attribute, tensor or not,
/// and renders nested containers in full.
pub fn return_name_complex(args: &[Arg], skip_attr: bool, prefix_attr: Option<&str>) -> Result<String> {
    let names = collect_names(args, |arg| skip_attr && arg.is_attr(), prefix_attr)?;
    Ok(join_or_discard(names))
}

fn join_or_discard(names: Vec<String>) -> String {
    if names.is_empty() { DISCARD.to_string() } else { names.join(", ") }
}

/// `k=v` pairs for a call site.
///
/// A top-level string literal is spliced unquoted: primitive kwargs carry
/// code fragments such as dtype spellings as strings. Anything else,
/// devices included, renders as a literal.
pub fn kwargs_name(kwargs: &Kwargs) -> Result<String> {
    let mut names = Vec::with_capacity(kwargs.len());
    for (name, value) in kwargs {
        match value {
            Arg::Literal(Literal::Str(raw)) => names.push(format!("{name}={raw}")),
            value => names.push(format!("{name}={}", tensor_name(value, None)?)),
        }
    }
    Ok(names.join(", "))
}

/// Keyword name to rendered literal, for rules that need structured access.
pub fn kwargs_dict(kwargs: &Kwargs, prefix_attr: Option<&str>) -> Result<IndexMap<String, String>> {
    kwargs
        .iter()
        .map(|(name, value)| -> Result<(String, String)> { Ok((name.clone(), tensor_name(value, prefix_attr)?)) })
        .collect()
}
