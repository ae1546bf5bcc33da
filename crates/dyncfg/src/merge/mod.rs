//! combining value trees
//!
//! [merge] is the union used to stack configuration fragments on top of each other. Nothing on the
//! left is ever removed, the right side only adds and replaces.
//!
//! [override_with] treats the right side as the complete new state and reports every difference
//! to an [OverrideVisitor].
use crate::error::{Error, Result};
use crate::mapping::Mapping;
use crate::value::{Payload, Value};

mod elements_by_key;
mod overrides;

pub use elements_by_key::{elements_by_key, elements_by_key_with_override};
pub use overrides::{override_with, OverrideFns, OverrideVisitor};

/// Union of `a` and `b` where `b` takes precedence
///
/// - nil on either side yields the other side unchanged
/// - maps are merged key by key
/// - sequences are concatenated
/// - for scalars `b` wins but remembers the locations of `a` after its own
///
/// ```
/// # use dyncfg::{merge::merge, Value};
/// let merged = merge(&Value::from(1), &Value::from(2)).unwrap();
/// assert_eq!(merged.as_int(), Some(2));
/// ```
pub fn merge(a: &Value, b: &Value) -> Result<Value> {
    match (a.payload(), b.payload()) {
        (Payload::Nil, _) => Ok(b.clone()),
        (_, Payload::Nil) => Ok(a.clone()),
        (Payload::Map(ma), Payload::Map(mb)) => merge_map(a, ma, b, mb),
        (Payload::Sequence(sa), Payload::Sequence(sb)) => {
            let mut out = Vec::with_capacity(sa.len() + sb.len());
            out.extend(sa.iter().cloned());
            out.extend(sb.iter().cloned());
            Ok(a.with_payload(out).append_locations_from(b))
        }
        (Payload::Map(_) | Payload::Sequence(_), _)
        | (_, Payload::Map(_) | Payload::Sequence(_)) => {
            Err(Error::MergeKindMismatch {
                left: a.kind(),
                right: b.kind(),
            })
        }
        _ => Ok(b.clone().append_locations_from(a)),
    }
}

fn merge_map(a: &Value, ma: &Mapping, b: &Value, mb: &Mapping) -> Result<Value> {
    let mut out = ma.clone();

    for pair in mb.pairs() {
        let key = pair.key.as_str().unwrap_or_default();
        let merged = match out.get(key) {
            Some(existing) => merge(existing, &pair.value)?,
            None => pair.value.clone(),
        };
        out.insert(pair.key.clone(), merged)?;
    }

    Ok(a.with_payload(out).append_locations_from(b))
}
