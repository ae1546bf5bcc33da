//! locations reported by external processes
//!
//! A process that generates or rewrites configuration can say where each part of its output was
//! defined, as newline-delimited JSON:
//!
//! ```json
//! {"path": "jobs.my_job", "file": "jobs.py", "line": 10, "column": 5}
//! ```
//!
//! [apply] moves these locations to the front of the matching values. A value without an entry
//! of its own gets the entry of its closest ancestor.
use crate::error::{Error, Result};
use crate::path::{Path, PathComponent};
use crate::value::{Location, Value};
use crate::visit::{walk, Step};
use serde::Deserialize;
use std::io::BufRead;

#[derive(Deserialize)]
struct Entry {
    path: String,
    file: String,
    line: usize,
    column: usize,
}

/// Recorded locations by map key
///
/// Indices are not supported, an entry below a sequence is recorded at the sequence.
#[derive(Debug, Default)]
pub struct LocationTree {
    keys: indexmap::IndexMap<String, LocationTree>,
    location: Option<Location>,
}

impl LocationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a newline-delimited JSON locations stream
    ///
    /// Relative file names are joined onto `base` when one is given.
    pub fn parse(reader: impl BufRead, base: Option<&std::path::Path>) -> Result<Self> {
        let mut tree = LocationTree::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let wrap = |err: Error| Error::Line {
                line: index + 1,
                source: Box::new(err),
            };
            let entry: Entry = serde_json::from_str(&line).map_err(|err| wrap(err.into()))?;
            let path = Path::parse(&entry.path).map_err(wrap)?;

            let file = match base {
                Some(base) if std::path::Path::new(&entry.file).is_relative() => {
                    base.join(&entry.file).to_string_lossy().into_owned()
                }
                _ => entry.file,
            };
            tree.insert(&path, Location::new(file, entry.line, entry.column));
        }

        Ok(tree)
    }

    pub fn insert(&mut self, path: &Path, location: Location) {
        let mut node = self;
        for component in path.components() {
            let PathComponent::Key(key) = component else {
                break;
            };
            node = node.keys.entry(key.clone()).or_default();
        }
        node.location = Some(location);
    }

    /// Location recorded for `path` or its closest ancestor
    pub fn find(&self, path: &Path) -> Option<&Location> {
        let mut node = self;
        let mut found = self.location.as_ref();

        for component in path.components() {
            let Some(child) = component.as_key().and_then(|key| node.keys.get(key)) else {
                break;
            };
            node = child;
            if let Some(location) = &node.location {
                found = Some(location);
            }
        }

        found
    }
}

/// Put recorded locations first on every value of `value` that has one
///
/// Locations in `virtual_file` (compared by file name) are dropped from those values, other
/// locations are kept behind the recorded one.
pub fn apply(value: &Value, tree: &LocationTree, virtual_file: Option<&str>) -> Result<Value> {
    let virtual_name = virtual_file.and_then(|f| std::path::Path::new(f).file_name());

    walk(value, |path: &Path, v: Value| -> Result<Step> {
        let Some(location) = tree.find(path) else {
            return Ok(Step::Continue(v));
        };

        tracing::trace!(%path, %location, "location from external process");
        let mut locations = vec![location.clone()];
        locations.extend(
            v.locations()
                .iter()
                .filter(|l| {
                    virtual_name.is_none()
                        || std::path::Path::new(&l.file).file_name() != virtual_name
                })
                .cloned(),
        );
        Ok(Step::Continue(v.with_locations(locations)))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::visit::get;
    use crate::yamlloader::load_yaml_str;
    use pretty_assertions::assert_eq;

    const STREAM: &str = r#"{"path": "jobs", "file": "jobs.py", "line": 1, "column": 1}
{"path": "jobs.a", "file": "jobs.py", "line": 5, "column": 3}

{"path": "jobs.a.tasks[0].key", "file": "tasks.py", "line": 9, "column": 2}
"#;

    #[test]
    fn closest_ancestor_wins() {
        let tree = LocationTree::parse(STREAM.as_bytes(), None).unwrap();
        let find = |p: &str| tree.find(&Path::must_parse(p)).map(|l| l.to_string());

        assert_eq!(find(""), None);
        assert_eq!(find("other"), None);
        assert_eq!(find("jobs").as_deref(), Some("jobs.py:1:1"));
        assert_eq!(find("jobs.b.name").as_deref(), Some("jobs.py:1:1"));
        assert_eq!(find("jobs.a.name").as_deref(), Some("jobs.py:5:3"));
        // indices are not recorded
        assert_eq!(find("jobs.a.tasks").as_deref(), Some("tasks.py:9:2"));
        assert_eq!(find("jobs.a.tasks[0]").as_deref(), Some("tasks.py:9:2"));
    }

    #[test]
    fn relative_files_are_joined() {
        let tree =
            LocationTree::parse(STREAM.as_bytes(), Some(std::path::Path::new("/root"))).unwrap();
        let location = tree.find(&Path::must_parse("jobs")).unwrap();
        assert_eq!(location.file, std::path::Path::new("/root").join("jobs.py").to_string_lossy());
    }

    #[test]
    fn parse_errors_name_the_line() {
        let input = "\n{\"path\": \"a..b\", \"file\": \"x\", \"line\": 1, \"column\": 1}";
        let err = LocationTree::parse(input.as_bytes(), None).unwrap_err();
        assert!(err.to_string().starts_with("line 2: invalid path"), "{err}");
    }

    #[test]
    fn apply_repoints_values() {
        let v = load_yaml_str(
            "generated.yml",
            "jobs:\n  a:\n    name: x\n  b:\n    name: y\nother: 1\n",
        )
        .unwrap();
        let v = crate::merge::merge(
            &v,
            &load_yaml_str("user.yml", "jobs:\n  b:\n    name: z\n").unwrap(),
        )
        .unwrap();

        let tree = LocationTree::parse(STREAM.as_bytes(), None).unwrap();
        let out = apply(&v, &tree, Some("/tmp/generated.yml")).unwrap();

        assert_eq!(
            get(&out, "jobs.a.name").unwrap().locations(),
            &[Location::new("jobs.py", 5, 3)]
        );
        assert_eq!(
            get(&out, "jobs.b.name").unwrap().locations(),
            &[Location::new("jobs.py", 1, 1), Location::new("user.yml", 3, 11)]
        );
        assert_eq!(
            get(&out, "other").unwrap().locations(),
            &[Location::new("generated.yml", 6, 8)]
        );

        let kept = apply(&v, &tree, None).unwrap();
        assert_eq!(
            get(&kept, "jobs.a.name").unwrap().locations(),
            &[Location::new("jobs.py", 5, 3), Location::new("generated.yml", 3, 11)]
        );
    }
}
