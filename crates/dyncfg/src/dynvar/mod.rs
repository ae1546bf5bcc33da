//! `${...}` variable references inside string values
//!
//! A string that contains `${some.path[0]}` refers to the value at `some.path[0]`. [resolve]
//! replaces every reference in a tree. When a string consists of exactly one reference it takes
//! over the referenced value including its kind, otherwise the referenced values are formatted
//! into the string.
//!
//! ```
//! # use dyncfg::{dynvar, jsonloader, Value};
//! let source = r#"{"a": 1, "b": "${a}", "c": "a=${a}"}"#;
//! let v = jsonloader::load_json_str("config.json", source).unwrap();
//! let out = dynvar::interpolate(&v).unwrap();
//! assert_eq!(out.get("b").and_then(Value::as_int), Some(1));
//! assert_eq!(out.get("c").and_then(Value::as_str), Some("a=1"));
//! ```
mod lookup;
mod reference;
mod resolve;

pub use lookup::default_lookup;
pub use reference::{
    contains_variable_reference, is_pure_variable_reference, pure_reference_to_path,
};
pub use resolve::{interpolate, resolve};
