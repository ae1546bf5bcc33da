use super::lookup::default_lookup;
use super::reference::Ref;
use crate::error::{Error, Result};
use crate::path::Path;
use crate::value::{Payload, Value};
use crate::visit::{walk, ReadOnlyStep, Step};
use std::collections::{BTreeMap, HashMap};

/// Replace every `${...}` reference in `value`
///
/// `lookup` produces the value behind a referenced path. It may return
/// [Error::SkipResolution] to leave that reference untouched. A reference to a missing key is an
/// error, as is a chain of references that leads back to itself.
pub fn resolve<F>(value: &Value, lookup: F) -> Result<Value>
where
    F: FnMut(&Path) -> Result<Value>,
{
    let mut resolver = Resolver {
        lookup,
        lookups: HashMap::new(),
    };

    let refs = collect(value)?;

    let mut resolved = HashMap::with_capacity(refs.len());
    for (key, r) in &refs {
        let nv = resolver.resolve_ref(r, &mut vec![key.clone()])?;
        resolved.insert(key.clone(), nv);
    }

    walk(value, |path: &Path, v: Value| -> Result<Step> {
        match resolved.get(&path.to_string()) {
            Some(nv) => Ok(Step::Continue(nv.clone())),
            None => Ok(Step::Continue(v)),
        }
    })
}

/// [resolve] against the value itself
pub fn interpolate(value: &Value) -> Result<Value> {
    resolve(value, default_lookup(value.clone()))
}

/// Every string with a reference, keyed by path and sorted so cycle errors are deterministic
fn collect(value: &Value) -> Result<BTreeMap<String, Ref>> {
    let mut refs = BTreeMap::new();
    crate::visit::walk_read_only(value, |path: &Path, v: &Value| -> Result<ReadOnlyStep> {
        if let Some(r) = Ref::new(v) {
            tracing::trace!(%path, reference = %r.text, "found variable reference");
            refs.insert(path.to_string(), r);
        }
        Ok(ReadOnlyStep::Continue)
    })?;
    Ok(refs)
}

struct Resolver<F> {
    lookup: F,
    /// `None` when the lookup asked to skip the key
    lookups: HashMap<String, Option<Value>>,
}

impl<F> Resolver<F>
where
    F: FnMut(&Path) -> Result<Value>,
{
    fn resolve_ref(&mut self, r: &Ref, seen: &mut Vec<String>) -> Result<Value> {
        let mut deps = Vec::with_capacity(r.matches.len());
        for dep in r.references() {
            if seen.iter().any(|s| s == dep) {
                seen.push(dep.to_string());
                return Err(Error::Cycle {
                    chain: seen.join(" -> "),
                });
            }

            seen.push(dep.to_string());
            let v = self.resolve_key(dep, seen);
            seen.pop();
            deps.push(v?);
        }

        if r.is_pure() {
            if let Some(Some(v)) = deps.first() {
                // the reference site is where the value is used
                return Ok(Value::new(v.payload().clone(), r.value.locations().to_vec()));
            }
        }

        let mut text = r.text.clone();
        for (m, dep) in r.matches.iter().zip(&deps) {
            let Some(dep) = dep else {
                tracing::debug!(reference = %m.text, "skipped variable reference");
                continue;
            };

            let s = match dep.payload() {
                Payload::String(s) => s.clone(),
                Payload::Bool(b) => b.to_string(),
                Payload::Int(i) => i.to_string(),
                Payload::Float(f) => f.to_string(),
                Payload::Time(t) => t.to_string(),
                Payload::Nil => "null".to_string(),
                Payload::Map(_) | Payload::Sequence(_) => {
                    return Err(Error::NonStringInterpolation {
                        reference: m.text.clone(),
                    })
                }
            };
            text = text.replacen(&m.text, &s, 1);
        }

        Ok(r.value.with_payload(text))
    }

    /// Value of the referenced key, `None` if resolution is skipped
    fn resolve_key(&mut self, key: &str, seen: &mut Vec<String>) -> Result<Option<Value>> {
        if let Some(cached) = self.lookups.get(key) {
            return Ok(cached.clone());
        }

        let path = Path::parse(key)?;
        let v = match (self.lookup)(&path) {
            Ok(v) => v,
            Err(Error::SkipResolution) => {
                self.lookups.insert(key.to_string(), None);
                return Ok(None);
            }
            Err(err) if err.is_no_such_key() => {
                return Err(Error::MissingReference {
                    reference: key.to_string(),
                })
            }
            Err(err) => return Err(err),
        };

        let v = match Ref::new(&v) {
            Some(r) => self.resolve_ref(&r, seen)?,
            None => v,
        };

        tracing::trace!(key, "resolved variable reference");
        self.lookups.insert(key.to_string(), Some(v.clone()));
        Ok(Some(v))
    }
}
