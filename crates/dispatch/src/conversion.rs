//! Ranking of argument-to-parameter conversions.
//!
//! Every applicable conversion falls into exactly one [`Conversion`] rank;
//! the derived `Ord` is the precedence used by overload resolution, best
//! first.

use crate::{ParamType, StaticType, TypeTable, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    /// The argument already has the parameter's type.
    Exact,
    /// Object upcast to a superclass or to a declared capability.
    Reference,
    /// Narrower numeric kind to a wider one.
    Numeric,
    /// Erasure to the fully generic `any` parameter.
    Boxing,
}

/// How `arg` converts to `param`, or `None` if it cannot.
///
/// Object arguments are ranked by their runtime class.
pub fn classify(arg: &Value, param: &ParamType, types: &TypeTable) -> Option<Conversion> {
    use Conversion::*;

    match (arg, param) {
        (_, ParamType::Any) => Some(Boxing),

        (Value::Int(_), ParamType::Int)
        | (Value::Long(_), ParamType::Long)
        | (Value::Double(_), ParamType::Double)
        | (Value::Text(_), ParamType::Text)
        | (Value::Bytes(_), ParamType::Bytes) => Some(Exact),

        (Value::Int(_), ParamType::Long | ParamType::Double) | (Value::Long(_), ParamType::Double) => {
            Some(Numeric)
        }

        (Value::Object(obj), ParamType::Class(target)) => {
            if obj.class() == target.as_str() {
                Some(Exact)
            } else if types.conforms(obj.class(), &StaticType::class(target)) {
                Some(Reference)
            } else {
                None
            }
        }
        (Value::Object(obj), ParamType::Capability(target)) => types
            .conforms(obj.class(), &StaticType::capability(target))
            .then_some(Reference),

        _ => None,
    }
}

/// Rank every argument against a parameter list; `None` if any argument
/// fails to convert or the arity differs.
pub fn rank(args: &[Value], params: &[ParamType], types: &TypeTable) -> Option<Vec<Conversion>> {
    if args.len() != params.len() {
        return None;
    }
    args.iter()
        .zip(params)
        .map(|(arg, param)| classify(arg, param, types))
        .collect()
}

/// Convert `arg` into the representation `param` expects.
///
/// Only numeric widening changes the value; everything else passes through.
pub(crate) fn coerce(arg: &Value, param: &ParamType) -> Value {
    match (arg, param) {
        (Value::Int(v), ParamType::Long) => Value::Long(i64::from(*v)),
        (Value::Int(v), ParamType::Double) => Value::Double(f64::from(*v)),
        (Value::Long(v), ParamType::Double) => Value::Double(*v as f64),
        _ => arg.clone(),
    }
}
