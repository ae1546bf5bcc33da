//! Cross-module behaviour: loading, merging, overriding and resolving together

use dyncfg::merge::{override_with, OverrideVisitor};
use dyncfg::trie::TrieNode;
use dyncfg::visit::{self, get};
use dyncfg::{dynvar, yamlloader, Error, Kind, Location, Path, Pattern, Result, Value};
use pretty_assertions::assert_eq;

#[test]
fn interpolate_loaded_yaml() {
    let value = yamlloader::load_yaml_str("a.yml", "a: 1\nb: \"${a}\"\n").unwrap();
    let out = dynvar::interpolate(&value).unwrap();

    assert_eq!(get(&out, "b").unwrap().kind(), Kind::Int);
    assert_eq!(get(&out, "b").unwrap().as_int(), Some(1));
    // the value is used where the reference was written
    assert_eq!(get(&out, "b").unwrap().location(), Some(&Location::new("a.yml", 2, 4)));
}

#[test]
fn alias_points_at_anchor_definition() {
    let value = yamlloader::load_yaml_str(
        "a.yml",
        "defaults: &defaults\n  retries: 3\njob:\n  settings: *defaults\n",
    )
    .unwrap();

    let anchor = get(&value, "defaults").unwrap();
    let alias = get(&value, "job.settings").unwrap();
    assert_eq!(alias.location(), anchor.location());
    assert_eq!(alias.location().map(|l| l.line), Some(2));
    assert_eq!(
        get(&value, "job.settings.retries").unwrap().location(),
        Some(&Location::new("a.yml", 2, 12))
    );
}

/// Treats a collection that became empty as unchanged
struct KeepEmptied {
    deleted: Vec<String>,
}

impl OverrideVisitor for KeepEmptied {
    fn visit_delete(&mut self, path: &Path, left: &Value) -> Result<()> {
        let emptied = left.as_map().map(|m| m.is_empty()).unwrap_or(false)
            || left.as_sequence().map(|s| s.is_empty()).unwrap_or(false);
        if emptied {
            return Err(Error::OverrideUndoDelete);
        }
        self.deleted.push(path.to_string());
        Ok(())
    }

    fn visit_insert(&mut self, _path: &Path, right: &Value) -> Result<Value> {
        Ok(right.clone())
    }

    fn visit_update(&mut self, path: &Path, _left: &Value, right: &Value) -> Result<Value> {
        if path.to_string() == "bundle.name" {
            return Err(Error::custom("bundle.name must not change"));
        }
        Ok(right.clone())
    }
}

#[test]
fn override_loaded_documents() {
    let before = yamlloader::load_yaml_str(
        "before.yml",
        "bundle:\n  name: demo\njobs:\n  a:\n    tags: {}\n    timeout: 10\n  b:\n    timeout: 5\n",
    )
    .unwrap();
    let after = yamlloader::load_yaml_str(
        "after.json",
        "bundle:\n  name: demo\njobs:\n  a:\n    timeout: 20\n",
    )
    .unwrap();

    let mut visitor = KeepEmptied { deleted: vec![] };
    let out = override_with(&before, &after, &mut visitor).unwrap();

    assert_eq!(visitor.deleted, vec!["jobs.b"]);
    assert_eq!(get(&out, "jobs.a.tags").unwrap().as_map().map(|m| m.len()), Some(0));
    assert_eq!(get(&out, "jobs.a.timeout").unwrap().as_int(), Some(20));
    assert_eq!(
        get(&out, "bundle.name").unwrap().location(),
        Some(&Location::new("before.yml", 2, 9))
    );

    let renamed = yamlloader::load_yaml_str("after.yml", "bundle:\n  name: other\n").unwrap();
    let err = override_with(&before, &renamed, &mut visitor).unwrap_err();
    assert_eq!(err.to_string(), "bundle.name must not change");
}

#[test]
fn trie_selects_values_to_transform() {
    let value = yamlloader::load_yaml_str(
        "a.yml",
        "jobs:\n  a:\n    path: ./x\n    name: a\n  b:\n    path: ./y\n",
    )
    .unwrap();

    let mut trie = TrieNode::new();
    trie.insert(&Pattern::must_parse("jobs.*.path")).unwrap();

    let out = visit::walk(&value, |path: &Path, v: Value| -> Result<visit::Step> {
        if v.as_str().is_some() && trie.search_path(path).is_some() {
            let relative = v.as_str().unwrap_or_default().trim_start_matches("./");
            let rewritten = format!("/root/{relative}");
            return Ok(visit::Step::Continue(Value::new(rewritten, v.locations().to_vec())));
        }
        Ok(visit::Step::Continue(v))
    })
    .unwrap();

    assert_eq!(get(&out, "jobs.a.path").unwrap().as_str(), Some("/root/x"));
    assert_eq!(get(&out, "jobs.b.path").unwrap().as_str(), Some("/root/y"));
    assert_eq!(get(&out, "jobs.a.name").unwrap().as_str(), Some("a"));
}

#[test]
fn map_by_pattern_tolerates_missing_parts() {
    let value = yamlloader::load_yaml_str(
        "a.yml",
        "jobs:\n  a:\n    tasks:\n      - key: x\n  b:\n    name: no tasks\n",
    )
    .unwrap();

    let pattern = Pattern::must_parse("jobs.*.tasks[*].key");
    let out = visit::map_by_pattern(&value, &pattern, |_: &Path, v: Value| -> Result<Value> {
        Ok(Value::new(format!("{}!", v.as_str().unwrap_or_default()), v.locations().to_vec()))
    })
    .unwrap();

    assert_eq!(get(&out, "jobs.a.tasks[0].key").unwrap().as_str(), Some("x!"));
    assert_eq!(get(&out, "jobs.b.name").unwrap().as_str(), Some("no tasks"));
}
