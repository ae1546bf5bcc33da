use crate::error::{Error, Result};
use crate::mapping::Mapping;
use crate::path::{Path, PathComponent};
use crate::value::{Payload, Value};

/// Observer of every change [override_with] makes
///
/// Returning an error aborts the override. [Error::OverrideUndoDelete] from
/// [OverrideVisitor::visit_delete] is the exception, it keeps the deleted value in place.
pub trait OverrideVisitor {
    fn visit_delete(&mut self, path: &Path, left: &Value) -> Result<()>;
    fn visit_insert(&mut self, path: &Path, right: &Value) -> Result<Value>;
    fn visit_update(&mut self, path: &Path, left: &Value, right: &Value) -> Result<Value>;
}

/// [OverrideVisitor] made of three closures
pub struct OverrideFns<D, I, U> {
    delete: D,
    insert: I,
    update: U,
}

impl<D, I, U> OverrideFns<D, I, U>
where
    D: FnMut(&Path, &Value) -> Result<()>,
    I: FnMut(&Path, &Value) -> Result<Value>,
    U: FnMut(&Path, &Value, &Value) -> Result<Value>,
{
    pub fn new(delete: D, insert: I, update: U) -> Self {
        Self {
            delete,
            insert,
            update,
        }
    }
}

impl<D, I, U> OverrideVisitor for OverrideFns<D, I, U>
where
    D: FnMut(&Path, &Value) -> Result<()>,
    I: FnMut(&Path, &Value) -> Result<Value>,
    U: FnMut(&Path, &Value, &Value) -> Result<Value>,
{
    fn visit_delete(&mut self, path: &Path, left: &Value) -> Result<()> {
        (self.delete)(path, left)
    }

    fn visit_insert(&mut self, path: &Path, right: &Value) -> Result<Value> {
        (self.insert)(path, right)
    }

    fn visit_update(&mut self, path: &Path, left: &Value, right: &Value) -> Result<Value> {
        (self.update)(path, left, right)
    }
}

/// Replace `left` with `right`, reporting every difference to `visitor`
///
/// Values that did not change are taken from `left` so they keep pointing at where they were
/// originally defined. Keys that exist on both sides keep the location of the left key.
///
/// Sequences are compared by position. Inserting an element at the front therefore shows up as
/// an update of every following element plus an insert at the end.
pub fn override_with(
    left: &Value,
    right: &Value,
    visitor: &mut dyn OverrideVisitor,
) -> Result<Value> {
    override_value(&Path::empty(), left, right, visitor)
}

fn override_value(
    path: &Path,
    left: &Value,
    right: &Value,
    visitor: &mut dyn OverrideVisitor,
) -> Result<Value> {
    if left.kind() != right.kind() {
        tracing::trace!(%path, left = %left.kind(), right = %right.kind(), "update: kind changed");
        return visitor.visit_update(path, left, right);
    }

    match (left.payload(), right.payload()) {
        (Payload::Map(lm), Payload::Map(rm)) => {
            let out = override_mapping(path, lm, rm, visitor)?;
            Ok(left.with_payload(out))
        }
        (Payload::Sequence(ls), Payload::Sequence(rs)) => {
            let out = override_sequence(path, ls, rs, visitor)?;
            Ok(left.with_payload(out))
        }
        (Payload::Nil, Payload::Nil) => Ok(left.clone()),
        _ if left.payload_eq(right) => Ok(left.clone()),
        _ => {
            tracing::trace!(%path, "update");
            visitor.visit_update(path, left, right)
        }
    }
}

fn override_mapping(
    path: &Path,
    left: &Mapping,
    right: &Mapping,
    visitor: &mut dyn OverrideVisitor,
) -> Result<Mapping> {
    let mut out = Mapping::with_capacity(right.len());

    for pair in left.pairs() {
        let key = pair.key.as_str().unwrap_or_default();
        if right.contains_key(key) {
            continue;
        }

        let child = path.append(PathComponent::key(key));
        tracing::trace!(path = %child, "delete");
        match visitor.visit_delete(&child, &pair.value) {
            Ok(()) => {}
            Err(Error::OverrideUndoDelete) => out.insert(pair.key.clone(), pair.value.clone())?,
            Err(err) => return Err(err),
        }
    }

    for pair in right.pairs() {
        let key = pair.key.as_str().unwrap_or_default();
        let child = path.append(PathComponent::key(key));

        match left.get_pair(key) {
            Some(existing) => {
                let nv = override_value(&child, &existing.value, &pair.value, visitor)?;
                out.insert(existing.key.clone(), nv)?;
            }
            None => {
                tracing::trace!(path = %child, "insert");
                let nv = visitor.visit_insert(&child, &pair.value)?;
                out.insert(pair.key.clone(), nv)?;
            }
        }
    }

    Ok(out)
}

fn override_sequence(
    path: &Path,
    left: &[Value],
    right: &[Value],
    visitor: &mut dyn OverrideVisitor,
) -> Result<Vec<Value>> {
    let common = left.len().min(right.len());
    let mut out = Vec::with_capacity(right.len());

    for (index, (l, r)) in left.iter().zip(right).enumerate() {
        let child = path.append(PathComponent::index(index));
        out.push(override_value(&child, l, r, visitor)?);
    }

    for (index, r) in right.iter().enumerate().skip(common) {
        let child = path.append(PathComponent::index(index));
        tracing::trace!(path = %child, "insert");
        out.push(visitor.visit_insert(&child, r)?);
    }

    for (index, l) in left.iter().enumerate().skip(common) {
        let child = path.append(PathComponent::index(index));
        tracing::trace!(path = %child, "delete");
        match visitor.visit_delete(&child, l) {
            Ok(()) => {}
            Err(Error::OverrideUndoDelete) => out.push(l.clone()),
            Err(err) => return Err(err),
        }
    }

    Ok(out)
}
