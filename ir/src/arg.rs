//! Argument trees.
//!
//! Node inputs, outputs and keyword arguments are arbitrarily nested
//! containers of managed values and plain literals. [`Arg`] is the closed set
//! of shapes such a tree may take.

use std::sync::Arc;

use weave_dtype::{DeviceSpec, ScalarDType};

use crate::value::Value;

/// A plain literal, rendered by value rather than by identity.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
    DType(ScalarDType),
}

/// Slice with independently optional bounds. An absent bound stays absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SliceArg {
    pub start: Option<Arg>,
    pub stop: Option<Arg>,
    pub step: Option<Arg>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Arc<Value>),
    Literal(Literal),
    List(Vec<Arg>),
    Tuple(Vec<Arg>),
    /// Ordered mapping. Keys are argument trees as well.
    Dict(Vec<(Arg, Arg)>),
    Slice(Box<SliceArg>),
    Device(DeviceSpec),
    /// Foreign value the graph builder could not classify. It has no literal
    /// form; rendering it is an error.
    Opaque { type_name: String },
}

impl Arg {
    pub const NONE: Arg = Arg::Literal(Literal::None);

    pub fn list(items: impl IntoIterator<Item = impl Into<Arg>>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple(items: impl IntoIterator<Item = impl Into<Arg>>) -> Self {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub fn dict<K: Into<Arg>, V: Into<Arg>>(items: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Dict(items.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn slice(start: Option<Arg>, stop: Option<Arg>, step: Option<Arg>) -> Self {
        Self::Slice(Box::new(SliceArg { start, stop, step }))
    }

    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self::Opaque { type_name: type_name.into() }
    }

    pub fn as_value(&self) -> Option<&Arc<Value>> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The value at this position if it is tensor-like.
    pub fn as_tensor(&self) -> Option<&Arc<Value>> {
        self.as_value().filter(|v| v.is_tensor())
    }

    /// Whether this position holds a managed value flagged as attribute.
    pub fn is_attr(&self) -> bool {
        self.as_value().is_some_and(|v| v.is_attr())
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Value(_) => "value",
            Self::Literal(_) => "literal",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Dict(_) => "dict",
            Self::Slice(_) => "slice",
            Self::Device(_) => "device",
            Self::Opaque { type_name } => type_name,
        }
    }

    /// Visit every managed value in pre-order.
    pub fn visit_values<'a>(&'a self, f: &mut impl FnMut(&'a Arc<Value>)) {
        match self {
            Self::Value(v) => f(v),
            Self::List(items) | Self::Tuple(items) => items.iter().for_each(|item| item.visit_values(f)),
            Self::Dict(items) => {
                for (k, v) in items {
                    k.visit_values(f);
                    v.visit_values(f);
                }
            }
            Self::Slice(slice) => {
                for bound in [&slice.start, &slice.stop, &slice.step].into_iter().flatten() {
                    bound.visit_values(f);
                }
            }
            Self::Literal(_) | Self::Device(_) | Self::Opaque { .. } => {}
        }
    }

    /// Collect every managed value in pre-order.
    pub fn values(&self) -> Vec<Arc<Value>> {
        let mut values = Vec::new();
        self.visit_values(&mut |v| values.push(v.clone()));
        values
    }
}

impl From<Arc<Value>> for Arg {
    fn from(v: Arc<Value>) -> Self {
        Self::Value(v)
    }
}

impl From<&Arc<Value>> for Arg {
    fn from(v: &Arc<Value>) -> Self {
        Self::Value(v.clone())
    }
}

impl From<Literal> for Arg {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

impl From<DeviceSpec> for Arg {
    fn from(d: DeviceSpec) -> Self {
        Self::Device(d)
    }
}

impl From<ScalarDType> for Arg {
    fn from(d: ScalarDType) -> Self {
        Self::Literal(Literal::DType(d))
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Self::Literal(Literal::Bool(b))
    }
}

impl From<f64> for Arg {
    fn from(x: f64) -> Self {
        Self::Literal(Literal::Float(x))
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Self::Literal(Literal::Str(s.to_string()))
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Self::Literal(Literal::Str(s))
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(o: Option<T>) -> Self {
        o.map_or(Self::NONE, Into::into)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),* $(,)?) => {
        $(impl From<$ty> for Arg {
            fn from(x: $ty) -> Self {
                Self::Literal(Literal::Int(i64::from(x)))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);
