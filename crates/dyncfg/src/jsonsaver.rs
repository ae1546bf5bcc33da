//! [Value] to JSON
//!
//! Maps are written in their original key order. Characters like `<` and `&` are written as they
//! are, and every document ends with a single newline.
use crate::error::Result;
use crate::value::Value;
use serde::Serialize;

/// Compact JSON
pub fn marshal(value: &Value) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec(value)?;
    out.push(b'\n');
    Ok(out)
}

/// Indented JSON, `indent` is repeated once per level
///
/// ```
/// # use dyncfg::{jsonloader::load_json_str, jsonsaver::marshal_indent};
/// let v = load_json_str("in.json", r#"{"b": "<x>", "a": [1]}"#).unwrap();
/// let out = String::from_utf8(marshal_indent(&v, "  ").unwrap()).unwrap();
/// assert_eq!(out, "{\n  \"b\": \"<x>\",\n  \"a\": [\n    1\n  ]\n}\n");
/// ```
pub fn marshal_indent(value: &Value, indent: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_json(&mut out, value, Some(indent))?;
    Ok(out)
}

/// Write `value` to `writer`, indented when `indent` is set
pub fn write_json(
    mut writer: impl std::io::Write,
    value: &Value,
    indent: Option<&str>,
) -> Result<()> {
    match indent {
        Some(indent) => {
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
            value.serialize(&mut ser)?;
        }
        None => serde_json::to_writer(&mut writer, value)?,
    }
    writer.write_all(b"\n")?;
    Ok(())
}
