//! JSON to [Value]
//!
//! JSON documents carry no positions once decoded, so locations are synthetic: the root is at
//! line 1, the n-th entry (counting from 0) of a container on line `L` is put on line `L + n + 1`.
//! Numbering follows document order and is stable between runs.
use crate::error::Result;
use crate::mapping::Mapping;
use crate::value::{Location, Value};

pub fn load_json(path: &str, reader: impl std::io::Read) -> Result<Value> {
    tracing::debug!(path, "loading json");
    let document: serde_json::Value = serde_json::from_reader(reader)?;
    Ok(convert(path, &document, 1))
}

/// ```
/// # use dyncfg::jsonloader::load_json_str;
/// let v = load_json_str("out.json", r#"{"a": {"b": [true]}}"#).unwrap();
/// assert_eq!(v.get("a").unwrap().location().unwrap().to_string(), "out.json:2:1");
/// ```
pub fn load_json_str(path: &str, source: &str) -> Result<Value> {
    load_json(path, source.as_bytes())
}

fn convert(path: &str, document: &serde_json::Value, line: usize) -> Value {
    let location = Location::new(path, line, 1);

    match document {
        serde_json::Value::Null => Value::new((), vec![location]),
        serde_json::Value::Bool(b) => Value::new(*b, vec![location]),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::new(i, vec![location]),
            None => Value::new(n.as_f64().unwrap_or(f64::NAN), vec![location]),
        },
        serde_json::Value::String(s) => Value::new(s.as_str(), vec![location]),
        serde_json::Value::Array(items) => {
            let items: Vec<Value> = items
                .iter()
                .enumerate()
                .map(|(i, item)| convert(path, item, line + i + 1))
                .collect();
            Value::new(items, vec![location])
        }
        serde_json::Value::Object(entries) => {
            let mut m = Mapping::with_capacity(entries.len());
            for (i, (k, v)) in entries.iter().enumerate() {
                let value = convert(path, v, line + i + 1);
                m.insert_str(k.clone(), value.locations().to_vec(), value);
            }
            Value::new(m, vec![location])
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::Kind;
    use crate::visit::get;
    use pretty_assertions::assert_eq;

    #[test]
    fn kinds() {
        let v = load_json_str(
            "x.json",
            r#"{"s": "2024-01-01", "i": -3, "f": 2.5, "big": 18446744073709551615, "b": false, "n": null, "a": [], "m": {}}"#,
        )
        .unwrap();

        let kinds = [
            ("s", Kind::String),
            ("i", Kind::Int),
            ("f", Kind::Float),
            ("big", Kind::Float),
            ("b", Kind::Bool),
            ("n", Kind::Nil),
            ("a", Kind::Sequence),
            ("m", Kind::Map),
        ];
        for (key, kind) in kinds {
            assert_eq!(get(&v, key).unwrap().kind(), kind, "{key}");
        }
    }

    #[test]
    fn keeps_document_order() {
        let v = load_json_str("x.json", r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        assert_eq!(v.as_map().unwrap().keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }

    #[test]
    fn synthetic_lines() {
        let v = load_json_str("x.json", r#"{"a": 1, "b": {"c": 2, "d": [3, 4]}}"#).unwrap();

        let line = |path: &str| get(&v, path).unwrap().location().unwrap().line;
        assert_eq!(line(""), 1);
        assert_eq!(line("a"), 2);
        assert_eq!(line("b"), 3);
        assert_eq!(line("b.c"), 4);
        assert_eq!(line("b.d"), 5);
        assert_eq!(line("b.d[1]"), 7);

        let key = v.as_map().unwrap().get_pair("b").unwrap().key.clone();
        assert_eq!(key.location(), Some(&Location::new("x.json", 3, 1)));
    }

    #[test]
    fn invalid_json() {
        assert!(load_json_str("x.json", "{").is_err());
    }
}
