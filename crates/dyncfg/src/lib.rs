//! # dyncfg - dynamic configuration values
//!
//! For CLI usage run `dyncfg --help`.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `dyncfg` works internally.
//!
//! ### Values
//!
//! Configuration is loaded into a tree of [Value]s. A value is nil, a scalar (string, bool, int,
//! float, [Time]), a [Mapping] with string keys or a sequence. On top of its payload every value
//! remembers the [Location]s it was written at, so errors and diagnostics can point at a file,
//! line and column even after fragments were merged or rewritten.
//!
//! Values are immutable. Operations that "change" a tree return a new root and share every
//! untouched subtree with the input.
//!
//! ### Addressing
//!
//! A [Path] addresses one value:
//!
//! ```text
//! resources.jobs.my_job.tasks[0].task_key
//! ```
//!
//! A [Pattern] may also contain wildcards for one level of the tree, `*` for any key and `[*]`
//! for any index. [trie::TrieNode] holds many patterns and finds the one matching a path.
//!
//! [visit] provides get/set/map by path or pattern and the pre-order [visit::walk].
//!
//! ### Loading and saving
//!
//! | **format** | **load**                      | **save**                     |
//! |------------|-------------------------------|------------------------------|
//! | YAML       | [yamlloader::load_yaml]       | [yamlsaver::save]            |
//! | JSON       | [jsonloader::load_json]       | [jsonsaver::marshal]         |
//!
//! The YAML loader keeps exact positions, anchors and merge keys. JSON positions are synthetic.
//!
//! ### Combining
//!
//! [merge::merge] stacks fragments: maps are unioned, sequences concatenated, scalars replaced.
//! Nothing on the left is removed and replaced scalars remember both locations.
//!
//! [merge::override_with] replaces a tree with a new version and reports every insert, update
//! and delete to a visitor, which may veto or rewrite the change. Unchanged values keep their
//! original locations.
//!
//! ### Variables
//!
//! Strings may reference other values with `${path}`. [dynvar::resolve] replaces them, detects
//! cycles and lets the caller decide where referenced values come from.
//!
//! ### External processes
//!
//! [Value::as_any] projects a tree to plain JSON for other processes. What they report back is
//! read with [diag::parse_diagnostics] and [locations::LocationTree].
//!
pub mod diag;
pub mod dynvar;
mod error;
pub mod jsonloader;
pub mod jsonsaver;
pub mod locations;
pub mod mapping;
pub mod merge;
pub mod path;
pub mod pattern;
pub mod time;
pub mod trie;
pub mod value;
pub mod visit;
pub mod yamlloader;
pub mod yamlsaver;

pub use error::{Error, Result};
pub use mapping::{Mapping, Pair};
pub use path::{Path, PathComponent};
pub use pattern::{Pattern, PatternComponent};
pub use time::Time;
pub use value::{Kind, Location, Payload, Value};
