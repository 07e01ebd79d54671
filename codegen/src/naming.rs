//! Naming resolver.
//!
//! Turns argument trees into text that can be spliced directly into emitted
//! statements. Managed values become identifiers, literals keep their
//! literal syntax, containers are rebuilt element by element.

use std::fmt::{self, Display, Formatter, Write};

use weave_ir::{Arg, Literal, Value};

use crate::error::{Result, UnsupportedValueSnafu};

/// Resolved argument tree.
///
/// `Display` renders target-language literal syntax, except for
/// [`Repr::Name`] which is written verbatim and never quoted.
#[derive(Debug, Clone, PartialEq)]
pub enum Repr {
    Name(String),
    Literal(Literal),
    List(Vec<Repr>),
    Tuple(Vec<Repr>),
    Dict(Vec<(Repr, Repr)>),
    Slice { start: Option<Box<Repr>>, stop: Option<Box<Repr>>, step: Option<Box<Repr>> },
}

/// Identifier of a managed value: `{name}_{id}`, with every character that
/// cannot appear in an identifier replaced by `_`.
///
/// Attribute values get `prefix_attr` prepended when one is given.
pub fn value_name(value: &Value, prefix_attr: Option<&str>) -> String {
    let sanitized: String =
        value.name().chars().map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' }).collect();
    let name = format!("{sanitized}_{}", value.id());
    match prefix_attr {
        Some(prefix) if value.is_attr() => format!("{prefix}{name}"),
        _ => name,
    }
}

/// Resolve an argument tree.
///
/// Fails with `UnsupportedValue` on opaque leaves, wherever they are nested.
pub fn resolve(arg: &Arg, prefix_attr: Option<&str>) -> Result<Repr> {
    let resolve_all = |items: &[Arg]| items.iter().map(|item| resolve(item, prefix_attr)).collect::<Result<Vec<_>>>();
    let resolve_bound =
        |bound: &Option<Arg>| bound.as_ref().map(|b| resolve(b, prefix_attr).map(Box::new)).transpose();

    Ok(match arg {
        Arg::Value(v) => Repr::Name(value_name(v, prefix_attr)),
        Arg::Literal(literal) => Repr::Literal(literal.clone()),
        Arg::List(items) => Repr::List(resolve_all(items)?),
        Arg::Tuple(items) => Repr::Tuple(resolve_all(items)?),
        Arg::Dict(items) => Repr::Dict(
            items
                .iter()
                .map(|(k, v)| -> Result<(Repr, Repr)> { Ok((resolve(k, prefix_attr)?, resolve(v, prefix_attr)?)) })
                .collect::<Result<Vec<_>>>()?,
        ),
        Arg::Slice(slice) => Repr::Slice {
            start: resolve_bound(&slice.start)?,
            stop: resolve_bound(&slice.stop)?,
            step: resolve_bound(&slice.step)?,
        },
        // Devices only ever appear by their canonical string.
        Arg::Device(device) => Repr::Literal(Literal::Str(device.to_string())),
        Arg::Opaque { type_name } => return UnsupportedValueSnafu { type_name }.fail(),
    })
}

/// Rendered text of an argument tree.
pub fn tensor_name(arg: &Arg, prefix_attr: Option<&str>) -> Result<String> {
    Ok(resolve(arg, prefix_attr)?.to_string())
}

/// Rendered text of every tree in `args`, in order.
pub fn complex_name(args: &[Arg], prefix_attr: Option<&str>) -> Result<Vec<String>> {
    args.iter().map(|arg| tensor_name(arg, prefix_attr)).collect()
}

impl Display for Repr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Literal(literal) => write_literal(f, literal),
            Self::List(items) => {
                f.write_char('[')?;
                write_joined(f, items)?;
                f.write_char(']')
            }
            Self::Tuple(items) => {
                f.write_char('(')?;
                write_joined(f, items)?;
                if items.len() == 1 {
                    f.write_char(',')?;
                }
                f.write_char(')')
            }
            Self::Dict(items) => {
                f.write_char('{')?;
                for (i, (k, v)) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_char('}')
            }
            Self::Slice { start, stop, step } => {
                f.write_str("slice(")?;
                for (i, bound) in [start, stop, step].into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match bound {
                        Some(bound) => write!(f, "{bound}")?,
                        None => f.write_str("None")?,
                    }
                }
                f.write_char(')')
            }
        }
    }
}

fn write_joined(f: &mut Formatter<'_>, items: &[Repr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_literal(f: &mut Formatter<'_>, literal: &Literal) -> fmt::Result {
    match literal {
        Literal::None => f.write_str("None"),
        Literal::Bool(true) => f.write_str("True"),
        Literal::Bool(false) => f.write_str("False"),
        Literal::Int(i) => write!(f, "{i}"),
        Literal::Float(x) => write_float(f, *x),
        Literal::Str(s) => write_str_literal(f, s),
        Literal::Bytes(b) => write_bytes_literal(f, b),
        Literal::Ellipsis => f.write_str("Ellipsis"),
        Literal::DType(dtype) => write!(f, "{dtype}"),
    }
}

fn write_float(f: &mut Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        f.write_str("float('nan')")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "float('inf')" } else { "float('-inf')" })
    } else {
        // Debug keeps the shortest round-trip form and always a '.' or exponent.
        write!(f, "{x:?}")
    }
}

/// Single quotes unless the text contains `'` and no `"`.
fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double { '"' } else { '\'' }
}

fn write_str_literal(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    let quote = pick_quote(s.contains('\''), s.contains('"'));
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => write!(f, "\\{c}")?,
            c if c.is_control() => write!(f, "\\x{:02x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

fn write_bytes_literal(f: &mut Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    let quote = pick_quote(bytes.contains(&b'\''), bytes.contains(&b'"'));
    f.write_char('b')?;
    f.write_char(quote)?;
    for &b in bytes {
        match b {
            b'\\' => f.write_str("\\\\")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b'\t' => f.write_str("\\t")?,
            b if b as char == quote => write!(f, "\\{quote}")?,
            0x20..=0x7e => f.write_char(b as char)?,
            b => write!(f, "\\x{b:02x}")?,
        }
    }
    f.write_char(quote)
}
