use super::{merge, override_with, OverrideFns};
use crate::error::Result;
use crate::path::{Path, PathComponent};
use crate::value::Value;
use crate::visit::set_by_path;

/// Map function that folds sequence elements sharing a key into one element
///
/// For every element the field `key` is passed to `key_fn` (nil when the field is missing). The
/// first element with a given key keeps its position, later ones are [merge]d into it in order.
/// The key field of every resulting element is set to the computed key.
///
/// Values that are not sequences are returned unchanged.
pub fn elements_by_key<K>(key: &str, key_fn: K) -> impl FnMut(&Path, Value) -> Result<Value>
where
    K: Fn(&Value) -> String,
{
    let key = key.to_string();
    move |_: &Path, v: Value| -> Result<Value> { fold_elements(&key, &key_fn, v, merge) }
}

/// Like [elements_by_key] but later elements replace earlier ones through [override_with]
///
/// Fields missing from a later element are removed.
pub fn elements_by_key_with_override<K>(
    key: &str,
    key_fn: K,
) -> impl FnMut(&Path, Value) -> Result<Value>
where
    K: Fn(&Value) -> String,
{
    let key = key.to_string();
    move |_: &Path, v: Value| -> Result<Value> {
        fold_elements(&key, &key_fn, v, |a: &Value, b: &Value| -> Result<Value> {
            let mut visitor = OverrideFns::new(
                |_: &Path, _: &Value| -> Result<()> { Ok(()) },
                |_: &Path, right: &Value| -> Result<Value> { Ok(right.clone()) },
                |_: &Path, _: &Value, right: &Value| -> Result<Value> { Ok(right.clone()) },
            );
            override_with(a, b, &mut visitor)
        })
    }
}

fn fold_elements<K, M>(key: &str, key_fn: &K, v: Value, combine: M) -> Result<Value>
where
    K: Fn(&Value) -> String,
    M: Fn(&Value, &Value) -> Result<Value>,
{
    let Some(elements) = v.as_sequence() else {
        return Ok(v);
    };

    let mut seen: indexmap::IndexMap<String, Value> =
        indexmap::IndexMap::with_capacity(elements.len());
    for element in elements {
        let k = key_fn(element.get(key).unwrap_or(&Value::NIL));
        match seen.get_mut(&k) {
            Some(existing) => *existing = combine(existing, element)?,
            None => {
                seen.insert(k, element.clone());
            }
        }
    }

    let key_path = Path::new(vec![PathComponent::key(key)]);
    let mut out = Vec::with_capacity(seen.len());
    for (k, element) in seen {
        out.push(set_by_path(&element, &key_path, Value::from(k))?);
    }

    Ok(v.with_payload(out))
}
