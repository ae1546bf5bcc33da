//! value representation
//!
//! A [Value] is an immutable node of a configuration tree. It holds one of the following
//! - nil
//! - string (utf-8)
//! - boolean (true/false)
//! - integer (signed, i64)
//! - float (f64)
//! - time (a timestamp that remembers how it was written, see [Time])
//! - map (order-preserving, string keys, see [Mapping])
//! - sequence (list of values)
//!
//! Additionally every value carries the [Location]s it was defined at. The first location is the
//! one to report errors against, the others are kept from merges.
//!
//! Containers are reference counted. Cloning a value never copies a subtree, which is what makes
//! the copy-on-write transformations in [crate::visit] and [crate::merge] cheap.
use crate::mapping::Mapping;
use crate::time::Time;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};
use std::sync::Arc;

/// Where a value was written
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Discriminant of a [Value]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Nil,
    String,
    Bool,
    Int,
    Float,
    Time,
    Map,
    Sequence,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Nil => f.write_str("nil"),
            Kind::String => f.write_str("string"),
            Kind::Bool => f.write_str("bool"),
            Kind::Int => f.write_str("int"),
            Kind::Float => f.write_str("float"),
            Kind::Time => f.write_str("time"),
            Kind::Map => f.write_str("map"),
            Kind::Sequence => f.write_str("sequence"),
        }
    }
}

/// All possible payloads
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Nil,
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Time(Time),
    Map(Arc<Mapping>),
    Sequence(Arc<Vec<Value>>),
}

impl Payload {
    pub fn kind(&self) -> Kind {
        match self {
            Payload::Nil => Kind::Nil,
            Payload::String(_) => Kind::String,
            Payload::Bool(_) => Kind::Bool,
            Payload::Int(_) => Kind::Int,
            Payload::Float(_) => Kind::Float,
            Payload::Time(_) => Kind::Time,
            Payload::Map(_) => Kind::Map,
            Payload::Sequence(_) => Kind::Sequence,
        }
    }
}

/// A node in the configuration tree
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    payload: Payload,
    locations: Vec<Location>,
    anchor: bool,
}

impl Default for Value {
    fn default() -> Self {
        Value::NIL
    }
}

impl Value {
    /// Nil without any location
    pub const NIL: Value = Value {
        payload: Payload::Nil,
        locations: Vec::new(),
        anchor: false,
    };

    pub fn new(payload: impl Into<Payload>, locations: Vec<Location>) -> Self {
        Self {
            payload: payload.into(),
            locations,
            anchor: false,
        }
    }

    pub fn kind(&self) -> Kind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The authoritative location, if any
    pub fn location(&self) -> Option<&Location> {
        self.locations.first()
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    /// Keep this value but add the locations of `other` after its own
    pub fn append_locations_from(mut self, other: &Value) -> Self {
        self.locations.extend(other.locations.iter().cloned());
        self
    }

    /// Set when the value was defined with a YAML `&anchor`
    ///
    /// Anchored values may exist only to be referenced, consumers use the flag to stay quiet about
    /// fields they do not know.
    pub fn is_anchor(&self) -> bool {
        self.anchor
    }

    pub fn mark_anchor(mut self) -> Self {
        self.anchor = true;
        self
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.payload, Payload::Nil)
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match &self.payload {
            Payload::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match &self.payload {
            Payload::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.payload {
            Payload::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.payload {
            Payload::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&Time> {
        match &self.payload {
            Payload::Time(t) => Some(t),
            _ => None,
        }
    }

    /// Look up `key` if this value is a map
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Look up `index` if this value is a sequence
    pub fn index(&self, index: usize) -> Option<&Value> {
        self.as_sequence().and_then(|s| s.get(index))
    }

    /// Same payload, ignoring locations and the anchor flag
    ///
    /// Containers compare element-wise with the same relaxed rule. Times compare by instant.
    pub fn payload_eq(&self, other: &Value) -> bool {
        match (&self.payload, &other.payload) {
            (Payload::Nil, Payload::Nil) => true,
            (Payload::String(a), Payload::String(b)) => a == b,
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Float(a), Payload::Float(b)) => a == b,
            (Payload::Time(a), Payload::Time(b)) => a.instant() == b.instant(),
            (Payload::Map(a), Payload::Map(b)) => {
                a.len() == b.len()
                    && a.pairs().zip(b.pairs()).all(|(a, b)| {
                        a.key.as_str() == b.key.as_str() && a.value.payload_eq(&b.value)
                    })
            }
            (Payload::Sequence(a), Payload::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a.payload_eq(b))
            }
            _ => false,
        }
    }

    /// Same locations and anchor flag, different payload
    pub(crate) fn with_payload(&self, payload: impl Into<Payload>) -> Value {
        Value {
            payload: payload.into(),
            locations: self.locations.clone(),
            anchor: self.anchor,
        }
    }

    /// Cheap identity check used to skip copy-on-write when nothing changed
    pub(crate) fn same(&self, other: &Value) -> bool {
        if self.locations != other.locations || self.anchor != other.anchor {
            return false;
        }

        match (&self.payload, &other.payload) {
            (Payload::Map(a), Payload::Map(b)) => Arc::ptr_eq(a, b),
            (Payload::Sequence(a), Payload::Sequence(b)) => Arc::ptr_eq(a, b),
            (a, b) => a == b,
        }
    }

    /// Plain projection of the tree, used to hand configuration to other processes
    ///
    /// Times become their original text. Map order is preserved.
    pub fn as_any(&self) -> serde_json::Value {
        match &self.payload {
            Payload::Nil => serde_json::Value::Null,
            Payload::String(s) => serde_json::Value::String(s.clone()),
            Payload::Bool(b) => serde_json::Value::Bool(*b),
            Payload::Int(i) => serde_json::Value::from(*i),
            Payload::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Payload::Time(t) => serde_json::Value::String(t.to_string()),
            Payload::Map(m) => serde_json::Value::Object(
                m.pairs()
                    .map(|pair| {
                        let key = pair.key.as_str().unwrap_or_default().to_string();
                        (key, pair.value.as_any())
                    })
                    .collect(),
            ),
            Payload::Sequence(s) => {
                serde_json::Value::Array(s.iter().map(Value::as_any).collect())
            }
        }
    }
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Payload::Nil
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::String(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::String(value.to_string())
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Payload::Bool(value)
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Payload::Int(value)
    }
}

impl From<i32> for Payload {
    fn from(value: i32) -> Self {
        Payload::Int(value.into())
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Payload::Float(value)
    }
}

impl From<Time> for Payload {
    fn from(value: Time) -> Self {
        Payload::Time(value)
    }
}

impl From<Mapping> for Payload {
    fn from(value: Mapping) -> Self {
        Payload::Map(Arc::new(value))
    }
}

impl From<Vec<Value>> for Payload {
    fn from(value: Vec<Value>) -> Self {
        Payload::Sequence(Arc::new(value))
    }
}

// values built from plain data have no location
macro_rules! value_from {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::new(value, vec![])
                }
            }
        )+
    };
}

value_from!((), String, &str, bool, i64, i32, f64, Time, Mapping, Vec<Value>);

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.payload {
            Payload::Nil => serializer.serialize_unit(),
            Payload::String(value) => serializer.serialize_str(value),
            Payload::Bool(value) => serializer.serialize_bool(*value),
            Payload::Int(value) => serializer.serialize_i64(*value),
            Payload::Float(value) => serializer.serialize_f64(*value),
            Payload::Time(value) => serializer.serialize_str(value.as_str()),
            Payload::Sequence(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value.iter() {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Payload::Map(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for pair in value.pairs() {
                    ser.serialize_entry(pair.key.as_str().unwrap_or_default(), &pair.value)?;
                }
                ser.end()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_matches_payload() {
        assert_eq!(Value::NIL.kind(), Kind::Nil);
        assert_eq!(Value::from("a").kind(), Kind::String);
        assert_eq!(Value::from(true).kind(), Kind::Bool);
        assert_eq!(Value::from(1).kind(), Kind::Int);
        assert_eq!(Value::from(1.5).kind(), Kind::Float);
        assert_eq!(Value::from(Mapping::new()).kind(), Kind::Map);
        assert_eq!(Value::from(Vec::<Value>::new()).kind(), Kind::Sequence);
    }

    #[test]
    fn first_location_is_authoritative() {
        let l1 = Location::new("a.yml", 1, 2);
        let l2 = Location::new("b.yml", 3, 4);
        let v = Value::new("x", vec![l1.clone()])
            .append_locations_from(&Value::new(1, vec![l2.clone()]));

        assert_eq!(v.location(), Some(&l1));
        assert_eq!(v.locations(), &[l1, l2]);
        assert_eq!(v.location().unwrap().to_string(), "a.yml:1:2");
    }

    #[test]
    fn anchor_is_a_flag() {
        let v = Value::from("x").mark_anchor();
        assert!(v.is_anchor());
        assert_eq!(v.kind(), Kind::String);
        assert!(v.payload_eq(&Value::from("x")));
        assert_ne!(v, Value::from("x"));
    }

    #[test]
    fn as_any_keeps_order() {
        let mut m = Mapping::new();
        m.insert("b".into(), 1.into()).unwrap();
        m.insert("a".into(), Value::from(vec![Value::from("x"), Value::NIL])).unwrap();

        let any = Value::from(m).as_any();
        assert_eq!(serde_json::to_string(&any).unwrap(), r#"{"b":1,"a":["x",null]}"#);
    }
}
