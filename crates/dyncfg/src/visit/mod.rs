//! visitor pattern helpers
//!
//! Every read and write by path or pattern goes through [visit]. It walks down the tree following
//! the pattern and calls a [MapFn] on each value the pattern addresses. The result is a new root
//! where only the containers on the way to a changed value are copied.
mod walk;
pub use walk::{walk, walk_read_only, ReadOnlyStep, Step};

use crate::error::{Error, Result};
use crate::mapping::Mapping;
use crate::path::{Path, PathComponent};
use crate::pattern::{Pattern, PatternComponent};
use crate::value::{Payload, Value};

/// Function that receives a located value and returns its replacement
pub trait MapFn {
    fn map(&mut self, path: &Path, value: Value) -> Result<Value>;
}

// blanket impl for FnMut
impl<F> MapFn for F
where
    F: FnMut(&Path, Value) -> Result<Value>,
{
    fn map(&mut self, path: &Path, value: Value) -> Result<Value> {
        self(path, value)
    }
}

pub(crate) fn visit(
    value: &Value,
    prefix: &Path,
    suffix: &[PatternComponent],
    f: &mut dyn MapFn,
) -> Result<Value> {
    let Some((component, rest)) = suffix.split_first() else {
        return f.map(prefix, value.clone());
    };

    match component {
        PatternComponent::Key(key) => {
            let path = prefix.append(PathComponent::key(key));
            let m = expect_map(value, &path)?;
            let Some(pair) = m.get_pair(key) else {
                return Err(Error::NoSuchKey { path });
            };

            let nv = visit(&pair.value, &path, rest, f)?;
            if nv.same(&pair.value) {
                return Ok(value.clone());
            }

            let mut m = m.clone();
            m.insert(pair.key.clone(), nv)?;
            Ok(value.with_payload(m))
        }
        PatternComponent::Index(index) => {
            let path = prefix.append(PathComponent::index(*index));
            let s = expect_sequence(value, &path)?;
            let Some(element) = s.get(*index) else {
                return Err(Error::IndexOutOfBounds { path });
            };

            let nv = visit(element, &path, rest, f)?;
            if nv.same(element) {
                return Ok(value.clone());
            }

            let mut s = s.to_vec();
            s[*index] = nv;
            Ok(value.with_payload(s))
        }
        PatternComponent::AnyKey => {
            let m = expect_map(value, prefix)?;
            let mut out = m.clone();
            let mut changed = false;

            for pair in m.pairs() {
                let key = pair.key.as_str().unwrap_or_default();
                let path = prefix.append(PathComponent::key(key));
                let nv = match visit(&pair.value, &path, rest, f) {
                    Ok(nv) => nv,
                    // the rest of the pattern does not apply to this child
                    Err(err) if err.is_no_such_key() || err.is_index_out_of_bounds() => continue,
                    Err(err) => return Err(err),
                };

                if !nv.same(&pair.value) {
                    out.insert(pair.key.clone(), nv)?;
                    changed = true;
                }
            }

            Ok(if changed {
                value.with_payload(out)
            } else {
                value.clone()
            })
        }
        PatternComponent::AnyIndex => {
            let s = expect_sequence(value, prefix)?;
            let mut out = s.to_vec();
            let mut changed = false;

            for (index, element) in s.iter().enumerate() {
                let path = prefix.append(PathComponent::index(index));
                let nv = match visit(element, &path, rest, f) {
                    Ok(nv) => nv,
                    Err(err) if err.is_no_such_key() || err.is_index_out_of_bounds() => continue,
                    Err(err) => return Err(err),
                };

                if !nv.same(element) {
                    out[index] = nv;
                    changed = true;
                }
            }

            Ok(if changed {
                value.with_payload(out)
            } else {
                value.clone()
            })
        }
    }
}

fn expect_map<'v>(value: &'v Value, path: &Path) -> Result<&'v Mapping> {
    match value.payload() {
        Payload::Map(m) => Ok(m),
        Payload::Nil => Err(Error::CannotTraverseNil { path: path.clone() }),
        _ => Err(Error::ExpectedMap {
            path: path.clone(),
            found: value.kind(),
        }),
    }
}

fn expect_sequence<'v>(value: &'v Value, path: &Path) -> Result<&'v [Value]> {
    match value.payload() {
        Payload::Sequence(s) => Ok(s),
        Payload::Nil => Err(Error::CannotTraverseNil { path: path.clone() }),
        _ => Err(Error::ExpectedSequence {
            path: path.clone(),
            found: value.kind(),
        }),
    }
}

/// Value at the path given in string form
pub fn get(value: &Value, path: &str) -> Result<Value> {
    get_by_path(value, &Path::parse(path)?)
}

/// Value at `path`
///
/// Missing keys, indices out of range and type mismatches are errors.
pub fn get_by_path(value: &Value, path: &Path) -> Result<Value> {
    let mut found = Value::NIL;
    visit(
        value,
        &Path::empty(),
        Pattern::from(path).components(),
        &mut |_: &Path, v: Value| -> Result<Value> {
            found = v.clone();
            Ok(v)
        },
    )?;
    Ok(found)
}

/// Replace the value at the path given in string form
pub fn set(value: &Value, path: &str, nv: Value) -> Result<Value> {
    set_by_path(value, &Path::parse(path)?, nv)
}

/// Replace the value at `path`, returning the new root
///
/// The parent of `path` must exist. A missing last key is added to its map, a last index must be
/// in range.
pub fn set_by_path(value: &Value, path: &Path, nv: Value) -> Result<Value> {
    let Some(parent) = path.parent() else {
        return Ok(nv);
    };
    let Some(last) = path.last().cloned() else {
        return Ok(nv);
    };

    let mut nv = Some(nv);
    visit(
        value,
        &Path::empty(),
        Pattern::from(parent).components(),
        &mut |prefix: &Path, v: Value| -> Result<Value> {
            let path = prefix.append(last.clone());
            let nv = nv.take().unwrap_or_default();
            match &last {
                PathComponent::Key(key) => {
                    let mut m = expect_map(&v, &path)?.clone();
                    m.insert(Value::from(key.as_str()), nv)?;
                    Ok(v.with_payload(m))
                }
                PathComponent::Index(index) => {
                    let mut s = expect_sequence(&v, &path)?.to_vec();
                    let Some(slot) = s.get_mut(*index) else {
                        return Err(Error::IndexOutOfBounds { path });
                    };
                    *slot = nv;
                    Ok(v.with_payload(s))
                }
            }
        },
    )
}

/// [map_by_path] with the path given in string form
pub fn map(value: &Value, path: &str, f: impl MapFn) -> Result<Value> {
    map_by_path(value, &Path::parse(path)?, f)
}

/// Apply `f` to the value at `path`
///
/// When the path does not exist the original value is returned unchanged.
pub fn map_by_path(value: &Value, path: &Path, f: impl MapFn) -> Result<Value> {
    map_by_pattern(value, &Pattern::from(path), f)
}

/// Apply `f` to every value matching `pattern`
///
/// Patterns are expected to match only some configurations. Missing keys, indices out of range and
/// nil containers on the way are not errors, the original value is returned unchanged.
pub fn map_by_pattern(value: &Value, pattern: &Pattern, mut f: impl MapFn) -> Result<Value> {
    match visit(value, &Path::empty(), pattern.components(), &mut f) {
        Ok(nv) => Ok(nv),
        Err(err) if err.is_missing_path() => {
            tracing::trace!(%pattern, %err, "pattern did not match");
            Ok(value.clone())
        }
        Err(err) => Err(err),
    }
}

/// Map function that applies `f` to every child of a map or sequence
pub fn foreach(mut f: impl MapFn) -> impl FnMut(&Path, Value) -> Result<Value> {
    move |path: &Path, value: Value| match value.payload() {
        Payload::Map(m) => {
            let mut out = Mapping::with_capacity(m.len());
            for pair in m.pairs() {
                let key = pair.key.as_str().unwrap_or_default();
                let nv = f.map(&path.append(PathComponent::key(key)), pair.value.clone())?;
                out.insert(pair.key.clone(), nv)?;
            }
            Ok(value.with_payload(out))
        }
        Payload::Sequence(s) => {
            let mut out = Vec::with_capacity(s.len());
            for (index, element) in s.iter().enumerate() {
                out.push(f.map(&path.append(PathComponent::index(index)), element.clone())?);
            }
            Ok(value.with_payload(out))
        }
        _ => Err(Error::ExpectedContainer {
            path: path.clone(),
            found: value.kind(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::{Kind, Location};
    use pretty_assertions::assert_eq;

    fn loc(line: usize) -> Location {
        Location::new("test.yml", line, 1)
    }

    fn map_of(pairs: Vec<(&str, Value)>) -> Value {
        Value::from(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<Mapping>(),
        )
    }

    fn fixture() -> Value {
        map_of(vec![
            (
                "jobs",
                map_of(vec![
                    (
                        "a",
                        map_of(vec![(
                            "tasks",
                            Value::from(vec![
                                map_of(vec![("key", "a0".into())]),
                                map_of(vec![("key", "a1".into())]),
                            ]),
                        )]),
                    ),
                    ("b", map_of(vec![("name", "bee".into())])),
                ]),
            ),
            ("empty", Value::NIL),
            ("name", Value::new("root", vec![loc(1)])),
        ])
    }

    #[test]
    fn get_existing() {
        let v = fixture();
        assert_eq!(get(&v, "jobs.a.tasks[1].key").unwrap().as_str(), Some("a1"));
        assert_eq!(get(&v, "name").unwrap().locations(), &[loc(1)]);
        assert_eq!(get(&v, "").unwrap(), v);
    }

    #[test]
    fn get_errors() {
        let v = fixture();

        let err = get(&v, "jobs.x").unwrap_err();
        assert!(err.is_no_such_key());
        assert_eq!(err.to_string(), "key not found at \"jobs.x\"");

        assert!(get(&v, "jobs.a.tasks[2]").unwrap_err().is_index_out_of_bounds());
        assert!(get(&v, "empty.x").unwrap_err().is_cannot_traverse_nil());

        let err = get(&v, "name.x").unwrap_err();
        assert!(matches!(
            err,
            Error::ExpectedMap {
                found: Kind::String,
                ..
            }
        ));
        assert!(matches!(
            get(&v, "jobs[0]").unwrap_err(),
            Error::ExpectedSequence { found: Kind::Map, .. }
        ));
    }

    #[test]
    fn set_copies_on_write() {
        let v = fixture();
        let nv = set(&v, "jobs.a.tasks[0].key", "changed".into()).unwrap();

        assert_eq!(
            get(&nv, "jobs.a.tasks[0].key").unwrap().as_str(),
            Some("changed")
        );
        assert_eq!(get(&v, "jobs.a.tasks[0].key").unwrap().as_str(), Some("a0"));

        // untouched siblings are shared, not copied
        let before = get(&v, "jobs.b").unwrap();
        let after = get(&nv, "jobs.b").unwrap();
        assert!(before.same(&after));
    }

    #[test]
    fn set_adds_missing_key() {
        let v = fixture();
        let nv = set(&v, "jobs.b.extra", 1.into()).unwrap();
        assert_eq!(get(&nv, "jobs.b.extra").unwrap().as_int(), Some(1));
        assert_eq!(
            get(&nv, "jobs.b")
                .unwrap()
                .as_map()
                .unwrap()
                .keys()
                .collect::<Vec<_>>(),
            vec!["name", "extra"]
        );
    }

    #[test]
    fn set_keeps_key_location() {
        let key_location = loc(7);
        let mut m = Mapping::new();
        m.insert(Value::new("k", vec![key_location.clone()]), 1.into())
            .unwrap();
        let v = Value::from(m);

        let nv = set(&v, "k", 2.into()).unwrap();
        let pair = nv.as_map().unwrap().get_pair("k").unwrap();
        assert_eq!(pair.key.locations(), &[key_location]);
        assert_eq!(pair.value.as_int(), Some(2));
    }

    #[test]
    fn set_errors() {
        let v = fixture();
        assert!(set(&v, "jobs.x.y", 1.into()).unwrap_err().is_no_such_key());
        assert!(set(&v, "jobs.a.tasks[5]", 1.into())
            .unwrap_err()
            .is_index_out_of_bounds());
        assert_eq!(set(&v, "", 1.into()).unwrap().as_int(), Some(1));
    }

    #[test]
    fn map_by_path_missing_is_noop() {
        let v = fixture();
        let nv = map(&v, "jobs.x.y", |_: &Path, _: Value| -> Result<Value> {
            Ok(Value::from(1))
        })
        .unwrap();
        assert_eq!(nv, v);
    }

    #[test]
    fn map_by_pattern_skips_partial_matches() {
        let v = fixture();
        let mut seen = vec![];
        let nv = map_by_pattern(
            &v,
            &Pattern::must_parse("jobs.*.tasks[*].key"),
            |p: &Path, v: Value| -> Result<Value> {
                seen.push(p.to_string());
                Ok(Value::from(format!("{}!", v.as_str().unwrap_or_default())))
            },
        )
        .unwrap();

        assert_eq!(seen, vec!["jobs.a.tasks[0].key", "jobs.a.tasks[1].key"]);
        assert_eq!(
            get(&nv, "jobs.a.tasks[1].key").unwrap().as_str(),
            Some("a1!")
        );
    }

    #[test]
    fn any_index_skips_elements_without_the_key() {
        let v = map_of(vec![(
            "items",
            Value::from(vec![
                map_of(vec![("key", "a".into())]),
                map_of(vec![("name", "no key".into())]),
                map_of(vec![("key", "c".into())]),
            ]),
        )]);

        let mut seen = vec![];
        let nv = map_by_pattern(
            &v,
            &Pattern::must_parse("items[*].key"),
            |p: &Path, v: Value| -> Result<Value> {
                seen.push(p.to_string());
                Ok(Value::from(v.as_str().unwrap_or_default().to_uppercase()))
            },
        )
        .unwrap();

        assert_eq!(seen, vec!["items[0].key", "items[2].key"]);
        assert_eq!(get(&nv, "items[0].key").unwrap().as_str(), Some("A"));
        assert_eq!(get(&nv, "items[2].key").unwrap().as_str(), Some("C"));

        let keyless = get(&nv, "items[1]").unwrap();
        assert!(keyless.same(&get(&v, "items[1]").unwrap()));
    }

    #[test]
    fn map_by_pattern_type_mismatch_is_an_error() {
        let v = fixture();
        let err = map_by_pattern(
            &v,
            &Pattern::must_parse("name[*]"),
            |_: &Path, v: Value| -> Result<Value> { Ok(v) },
        )
        .unwrap_err();
        assert!(matches!(err, Error::ExpectedSequence { .. }));
    }

    #[test]
    fn map_by_pattern_propagates_callback_errors() {
        let v = fixture();
        let err = map_by_pattern(
            &v,
            &Pattern::must_parse("jobs.*"),
            |p: &Path, _: Value| -> Result<Value> { Err(Error::custom(format!("rejected {p}"))) },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "rejected jobs.a");
    }

    #[test]
    fn foreach_children() {
        let v = fixture();
        let nv = map(
            &v,
            "jobs.a.tasks",
            foreach(|p: &Path, _: Value| -> Result<Value> {
                Ok(Value::from(p.to_string()))
            }),
        )
        .unwrap();

        assert_eq!(
            get(&nv, "jobs.a.tasks[1]").unwrap().as_str(),
            Some("jobs.a.tasks[1]")
        );

        let err = map(
            &v,
            "name",
            foreach(|_: &Path, v: Value| -> Result<Value> { Ok(v) }),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ExpectedContainer { .. }));
    }
}
