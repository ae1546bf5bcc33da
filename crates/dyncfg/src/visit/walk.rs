use crate::error::{Error, Result};
use crate::mapping::Mapping;
use crate::path::{Path, PathComponent};
use crate::value::{Payload, Value};

/// What [walk] does after calling the callback on a value
#[derive(Debug)]
pub enum Step {
    /// Use this value (possibly a replacement) and descend into it
    Continue(Value),
    /// Use this value but do not descend into it
    Skip(Value),
    /// Remove the value from its parent map or sequence
    Drop,
}

/// What [walk_read_only] does after calling the callback on a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOnlyStep {
    Continue,
    Skip,
}

/// Pre-order traversal of the whole tree that may replace or drop values
///
/// The callback sees a value before its children. Dropping the root is an error.
pub fn walk<F>(value: &Value, mut f: F) -> Result<Value>
where
    F: FnMut(&Path, Value) -> Result<Step>,
{
    walk_inner(value.clone(), &Path::empty(), &mut f)?.ok_or(Error::DropRoot)
}

fn walk_inner<F>(value: Value, path: &Path, f: &mut F) -> Result<Option<Value>>
where
    F: FnMut(&Path, Value) -> Result<Step>,
{
    let value = match f(path, value)? {
        Step::Continue(value) => value,
        Step::Skip(value) => return Ok(Some(value)),
        Step::Drop => return Ok(None),
    };

    let replaced: Option<Payload> = match value.payload() {
        Payload::Map(m) => {
            let mut out = Mapping::with_capacity(m.len());
            let mut changed = false;
            for pair in m.pairs() {
                let key = pair.key.as_str().unwrap_or_default();
                let child_path = path.append(PathComponent::key(key));
                match walk_inner(pair.value.clone(), &child_path, f)? {
                    Some(nv) => {
                        changed |= !nv.same(&pair.value);
                        out.insert(pair.key.clone(), nv)?;
                    }
                    None => changed = true,
                }
            }
            changed.then(|| out.into())
        }
        Payload::Sequence(s) => {
            let mut out = Vec::with_capacity(s.len());
            let mut changed = false;
            for (index, element) in s.iter().enumerate() {
                let child_path = path.append(PathComponent::index(index));
                match walk_inner(element.clone(), &child_path, f)? {
                    Some(nv) => {
                        changed |= !nv.same(element);
                        out.push(nv);
                    }
                    None => changed = true,
                }
            }
            changed.then(|| out.into())
        }
        _ => None,
    };

    Ok(Some(match replaced {
        Some(payload) => value.with_payload(payload),
        None => value,
    }))
}

/// Pre-order traversal of the whole tree without modification
pub fn walk_read_only<F>(value: &Value, mut f: F) -> Result<()>
where
    F: FnMut(&Path, &Value) -> Result<ReadOnlyStep>,
{
    walk_read_only_inner(value, &Path::empty(), &mut f)
}

fn walk_read_only_inner<F>(value: &Value, path: &Path, f: &mut F) -> Result<()>
where
    F: FnMut(&Path, &Value) -> Result<ReadOnlyStep>,
{
    if f(path, value)? == ReadOnlyStep::Skip {
        return Ok(());
    }

    match value.payload() {
        Payload::Map(m) => {
            for pair in m.pairs() {
                let key = pair.key.as_str().unwrap_or_default();
                walk_read_only_inner(&pair.value, &path.append(PathComponent::key(key)), f)?;
            }
        }
        Payload::Sequence(s) => {
            for (index, element) in s.iter().enumerate() {
                walk_read_only_inner(element, &path.append(PathComponent::index(index)), f)?;
            }
        }
        _ => {}
    }

    Ok(())
}
