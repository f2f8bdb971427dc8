//! Overload selection
//!
//! Each argument is ranked against the declared parameter type. A candidate
//! is better than another when it ranks no worse at every position and
//! strictly better at one position at least; the call resolves to the single
//! candidate no other applicable candidate beats.

use tether_sdk::{HostValue, ValueType};

use super::member::Member;
use crate::error::{BridgeError, BridgeResult};

/// Conversion cost of passing an argument to a parameter, cheapest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    /// Same type
    Exact,
    /// Widening, subclass, or integer to float
    Convert,
    /// `Any` parameter, or null into a nullable type
    Loose,
}

/// Rank `value` against parameter type `ty`, `None` when inapplicable
pub fn rank(value: &HostValue, ty: ValueType) -> Option<Rank> {
    if ty == ValueType::Any {
        return Some(Rank::Loose);
    }
    if value.is_null() {
        return ty.is_nullable().then_some(Rank::Loose);
    }
    match (value, ty) {
        (HostValue::Bool(_), ValueType::Bool) => Some(Rank::Exact),
        (HostValue::Int(_), ValueType::Int) => Some(Rank::Exact),
        (HostValue::Float(_), ValueType::Float) => Some(Rank::Exact),
        (HostValue::Int(_), ValueType::Float) => Some(Rank::Convert),
        (HostValue::Int(_) | HostValue::Float(_), ValueType::Number) => Some(Rank::Convert),
        (HostValue::Str(_), ValueType::Str) => Some(Rank::Exact),
        (HostValue::Function(_), ValueType::Function) => Some(Rank::Exact),
        (HostValue::Object(_), ValueType::Object(None)) => Some(Rank::Convert),
        (HostValue::Object(object), ValueType::Object(Some(name))) => {
            let class = object.host_class();
            if class.name() == name {
                Some(Rank::Exact)
            } else if class.is_subclass_of(name) {
                Some(Rank::Convert)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Convert an accepted argument to the representation the parameter expects
pub fn coerce(value: &HostValue, ty: ValueType) -> HostValue {
    match (value, ty) {
        (HostValue::Int(i), ValueType::Float) => HostValue::Float(*i as f64),
        _ => value.clone(),
    }
}

fn ranks(params: &[ValueType], args: &[HostValue]) -> Option<Vec<Rank>> {
    if params.len() != args.len() {
        return None;
    }
    args.iter().zip(params).map(|(arg, ty)| rank(arg, *ty)).collect()
}

fn dominates(a: &[Rank], b: &[Rank]) -> bool {
    a.iter().zip(b).all(|(x, y)| x <= y) && a.iter().zip(b).any(|(x, y)| x < y)
}

/// Runtime types of `args`, comma separated
pub fn describe_args(args: &[HostValue]) -> String {
    args.iter().map(|a| a.type_name()).collect::<Vec<_>>().join(", ")
}

/// Pick the best function among `candidates` for `args`
pub fn select<'a>(class: &str, name: &str, candidates: &[&'a Member], args: &[HostValue]) -> BridgeResult<&'a Member> {
    let applicable: Vec<(&'a Member, Vec<Rank>)> = candidates
        .iter()
        .filter_map(|m| Some((*m, ranks(m.params()?, args)?)))
        .collect();

    if applicable.is_empty() {
        return Err(BridgeError::NoMatchingOverload {
            class: class.to_string(),
            name: name.to_string(),
            args: describe_args(args),
        });
    }

    let best: Vec<&(&'a Member, Vec<Rank>)> = applicable
        .iter()
        .filter(|(_, r)| !applicable.iter().any(|(_, other)| dominates(other, r)))
        .collect();

    match best.as_slice() {
        [(member, _)] => {
            tracing::trace!(target: "tether::resolver", class, signature = %member.signature(), "overload selected");
            Ok(*member)
        }
        _ => Err(BridgeError::AmbiguousOverload {
            class: class.to_string(),
            name: name.to_string(),
            candidates: best.iter().map(|(m, _)| m.signature()).collect(),
        }),
    }
}
