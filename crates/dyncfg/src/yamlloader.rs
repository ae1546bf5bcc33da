//! YAML to [Value]
//!
//! Every node keeps the file, line and column it was written at. Anchored nodes are marked with
//! [Value::mark_anchor] and aliases evaluate to the anchored value, including its location.
//!
//! Plain scalars are typed the way YAML 1.2 core schema does it: `null`/`~`/empty is nil,
//! `true`/`false` are booleans, decimal, `0x` hex and `0o` octal numbers are ints, other numbers
//! are floats and `2006-01-02` style dates are [Time]s. Anything else, and every quoted scalar, is
//! a string.
use crate::error::{Error, Result};
use crate::mapping::Mapping;
use crate::time::Time;
use crate::value::{Location, Value};
use std::collections::HashMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

const CORE_SCHEMA: &str = "tag:yaml.org,2002:";

/// Load the first YAML document of `reader`
///
/// `path` is only used for locations. An empty document is nil.
pub fn load_yaml(path: &str, mut reader: impl std::io::Read) -> Result<Value> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    load_yaml_str(path, &source)
}

/// Like [load_yaml] for YAML text that is already in memory
///
/// ```
/// # use dyncfg::{yamlloader::load_yaml_str, Value};
/// let v = load_yaml_str("a.yml", "name: x\ncount: 3\n").unwrap();
/// assert_eq!(v.get("count").and_then(Value::as_int), Some(3));
/// assert_eq!(v.get("count").unwrap().location().unwrap().to_string(), "a.yml:2:8");
/// ```
pub fn load_yaml_str(path: &str, source: &str) -> Result<Value> {
    tracing::debug!(path, "loading yaml");

    let mut builder = Builder::new(path);
    let mut parser = Parser::new_from_str(source);
    parser.load(&mut builder, false).map_err(|err| Error::Yaml {
        location: builder.location(err.marker()),
        message: err.info().to_string(),
    })?;

    builder.finish()
}

/// Container under construction
enum Node {
    Sequence {
        location: Location,
        anchor: usize,
        items: Vec<Value>,
    },
    Mapping {
        location: Location,
        anchor: usize,
        pairs: Mapping,
        key: Option<Key>,
        merge: Option<(Location, Value)>,
    },
}

enum Key {
    Str(Value),
    /// `<<`
    Merge(Location),
}

struct Builder {
    file: String,
    stack: Vec<Node>,
    anchors: HashMap<usize, Value>,
    root: Option<Value>,
    error: Option<Error>,
}

impl Builder {
    fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            stack: vec![],
            anchors: HashMap::new(),
            root: None,
            error: None,
        }
    }

    fn location(&self, marker: &Marker) -> Location {
        Location::new(self.file.clone(), marker.line(), marker.col() + 1)
    }

    fn finish(self) -> Result<Value> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(self.root.unwrap_or_default())
    }

    fn expects_key(&self) -> bool {
        matches!(self.stack.last(), Some(Node::Mapping { key: None, .. }))
    }

    fn handle(&mut self, event: Event, marker: Marker) -> Result<()> {
        let location = self.location(&marker);

        match event {
            Event::Scalar(text, style, anchor, tag) => {
                if self.expects_key() {
                    let key = scalar_key(&text, style, tag.as_ref(), &location)?;
                    if let Some(Node::Mapping { key: slot, .. }) = self.stack.last_mut() {
                        *slot = Some(key);
                    }
                    return Ok(());
                }

                let value = scalar(text, style, tag.as_ref(), &location)?;
                self.complete(value, anchor)
            }
            Event::SequenceStart(anchor, tag) => {
                self.reject_key(&location)?;
                check_container_tag(tag.as_ref(), "seq", &location)?;
                self.stack.push(Node::Sequence {
                    location,
                    anchor,
                    items: vec![],
                });
                Ok(())
            }
            Event::MappingStart(anchor, tag) => {
                self.reject_key(&location)?;
                check_container_tag(tag.as_ref(), "map", &location)?;
                self.stack.push(Node::Mapping {
                    location,
                    anchor,
                    pairs: Mapping::new(),
                    key: None,
                    merge: None,
                });
                Ok(())
            }
            Event::SequenceEnd => match self.stack.pop() {
                Some(Node::Sequence {
                    location,
                    anchor,
                    items,
                }) => self.complete(Value::new(items, vec![location]), anchor),
                _ => Err(self.error_at(location, "unexpected end of sequence")),
            },
            Event::MappingEnd => match self.stack.pop() {
                Some(Node::Mapping {
                    location,
                    anchor,
                    pairs,
                    merge,
                    ..
                }) => {
                    let pairs = match merge {
                        Some((merge_location, source)) => {
                            apply_merge(pairs, source, merge_location)?
                        }
                        None => pairs,
                    };
                    self.complete(Value::new(pairs, vec![location]), anchor)
                }
                _ => Err(self.error_at(location, "unexpected end of mapping")),
            },
            Event::Alias(id) => {
                self.reject_key(&location)?;
                let Some(value) = self.anchors.get(&id).cloned() else {
                    return Err(self.error_at(location, "unknown anchor"));
                };
                tracing::trace!(%location, "alias");
                self.complete(value, 0)
            }
            // stream and document boundaries
            _ => Ok(()),
        }
    }

    fn reject_key(&self, location: &Location) -> Result<()> {
        if self.expects_key() {
            return Err(self.error_at(location.clone(), "key is not a scalar"));
        }
        Ok(())
    }

    fn error_at(&self, location: Location, message: &str) -> Error {
        Error::Yaml {
            location,
            message: message.to_string(),
        }
    }

    /// Attach a finished value to its parent
    fn complete(&mut self, value: Value, anchor: usize) -> Result<()> {
        let value = if anchor > 0 {
            let value = value.mark_anchor();
            tracing::trace!(anchor, location = ?value.location(), "anchor");
            self.anchors.insert(anchor, value.clone());
            value
        } else {
            value
        };

        match self.stack.last_mut() {
            None => {
                self.root = Some(value);
                Ok(())
            }
            Some(Node::Sequence { items, .. }) => {
                items.push(value);
                Ok(())
            }
            Some(Node::Mapping {
                pairs, key, merge, ..
            }) => match key.take() {
                Some(Key::Str(k)) => {
                    if let Some(existing) = pairs.get_pair(k.as_str().unwrap_or_default()) {
                        let line = existing.key.location().map(|l| l.line).unwrap_or_default();
                        return Err(Error::Yaml {
                            location: k.location().cloned().unwrap_or_default(),
                            message: format!(
                                "mapping key {:?} already defined at line {line}",
                                k.as_str().unwrap_or_default()
                            ),
                        });
                    }
                    pairs.insert(k, value)
                }
                Some(Key::Merge(location)) => {
                    if merge.is_some() {
                        return Err(Error::Yaml {
                            location,
                            message: "duplicate merge key".to_string(),
                        });
                    }
                    tracing::trace!(%location, "merge key");
                    *merge = Some((location, value));
                    Ok(())
                }
                // values of a mapping always follow a key
                None => Ok(()),
            },
        }
    }
}

impl MarkedEventReceiver for Builder {
    fn on_event(&mut self, event: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.handle(event, marker) {
            self.error = Some(err);
        }
    }
}

/// Merge `<<` sources in order, then the local pairs on top
fn apply_merge(local: Mapping, source: Value, location: Location) -> Result<Mapping> {
    let invalid = || Error::Yaml {
        location: location.clone(),
        message: "map merge requires map or sequence of maps as the value".to_string(),
    };

    let sources: Vec<&Mapping> = match (source.as_map(), source.as_sequence()) {
        (Some(m), _) => vec![m],
        (_, Some(items)) => items
            .iter()
            .map(|item| item.as_map().ok_or_else(invalid))
            .collect::<Result<_>>()?,
        _ => return Err(invalid()),
    };

    let mut out = Mapping::new();
    for m in sources {
        out.merge_from(m);
    }
    out.merge_from(&local);
    Ok(out)
}

/// Short form of a tag, `!!str` for core schema tags
fn tag_name(tag: &Tag) -> String {
    if tag.handle == CORE_SCHEMA || tag.handle == "!!" {
        format!("!!{}", tag.suffix)
    } else {
        format!("{}{}", tag.handle, tag.suffix)
    }
}

fn check_container_tag(tag: Option<&Tag>, expected: &str, location: &Location) -> Result<()> {
    match tag.map(tag_name) {
        None => Ok(()),
        Some(name) if name == format!("!!{expected}") => Ok(()),
        Some(name) => Err(Error::Yaml {
            location: location.clone(),
            message: format!("unknown tag: {name}"),
        }),
    }
}

/// Tag a plain scalar resolves to when it has none
fn implicit_tag(text: &str) -> &'static str {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return "!!null",
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => return "!!bool",
        _ => {}
    }

    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return "!!int";
    }
    if let Some(hex) = text.strip_prefix("0x") {
        if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return "!!int";
        }
    }
    if let Some(oct) = text.strip_prefix("0o") {
        if !oct.is_empty() && oct.bytes().all(|b| matches!(b, b'0'..=b'7')) {
            return "!!int";
        }
    }
    if parse_float(text).is_some() {
        return "!!float";
    }
    if looks_like_timestamp(text) && Time::parse(text).is_ok() {
        return "!!timestamp";
    }
    "!!str"
}

/// Quick check before handing the text to [Time::parse]
fn looks_like_timestamp(text: &str) -> bool {
    let b = text.as_bytes();
    b.len() > 4 && b[..4].iter().all(u8::is_ascii_digit) && b[4] == b'-'
}

/// Decimal, `0x` hex or `0o` octal int with an optional sign
fn parse_int(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = if let Some(hex) = unsigned.strip_prefix("0x") {
        (16, hex)
    } else if let Some(oct) = unsigned.strip_prefix("0o") {
        (8, oct)
    } else {
        (10, unsigned)
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    // parse with the sign attached so i64::MIN fits
    let signed = if negative {
        format!("-{digits}")
    } else {
        digits.to_string()
    };
    i64::from_str_radix(&signed, radix).ok()
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        _ => {}
    }

    // rust also accepts "inf", "nan" and "infinity"
    let numeric = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !numeric || !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn resolve_tag(text: &str, style: TScalarStyle, tag: Option<&Tag>) -> String {
    match tag {
        // a lone `!` forces a string
        Some(tag) if tag.handle == "!" && tag.suffix.is_empty() => "!!str".to_string(),
        Some(tag) => tag_name(tag),
        None if style == TScalarStyle::Plain => implicit_tag(text).to_string(),
        None => "!!str".to_string(),
    }
}

fn scalar(
    text: String,
    style: TScalarStyle,
    tag: Option<&Tag>,
    location: &Location,
) -> Result<Value> {
    let invalid = |what: &str, text: &str| Error::Yaml {
        location: location.clone(),
        message: format!("invalid {what} value: {text}"),
    };

    let locations = vec![location.clone()];
    let tag = resolve_tag(&text, style, tag);
    match tag.as_str() {
        "!!str" => Ok(Value::new(text, locations)),
        "!!bool" => match text.to_lowercase().as_str() {
            "true" => Ok(Value::new(true, locations)),
            "false" => Ok(Value::new(false, locations)),
            _ => Err(invalid("bool", &text)),
        },
        "!!int" => match parse_int(&text) {
            Some(i) => Ok(Value::new(i, locations)),
            None => Err(invalid("int", &text)),
        },
        "!!float" => match parse_float(&text) {
            Some(f) => Ok(Value::new(f, locations)),
            None => Err(invalid("float", &text)),
        },
        "!!null" => Ok(Value::new((), locations)),
        "!!timestamp" => match Time::parse(&text) {
            Ok(t) => Ok(Value::new(t, locations)),
            Err(_) => Err(invalid("timestamp", &text)),
        },
        _ => Err(Error::Yaml {
            location: location.clone(),
            message: format!("unknown tag: {tag}"),
        }),
    }
}

fn scalar_key(
    text: &str,
    style: TScalarStyle,
    tag: Option<&Tag>,
    location: &Location,
) -> Result<Key> {
    if tag.is_none() && style == TScalarStyle::Plain && text == "<<" {
        return Ok(Key::Merge(location.clone()));
    }

    match resolve_tag(text, style, tag).as_str() {
        // a literal null is a string key
        "!!str" | "!!null" => Ok(Key::Str(Value::new(text, vec![location.clone()]))),
        tag => Err(Error::Yaml {
            location: location.clone(),
            message: format!("invalid key tag: {tag}"),
        }),
    }
}
