//! wildcard addresses into a value tree
//!
//! A [Pattern] is a [Path] that may also contain `*` (any key) and `[*]` (any index). A wildcard
//! stands for exactly one level of the tree.
use crate::error::{Error, Result};
use crate::path::{Path, PathComponent};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternComponent {
    Key(String),
    Index(usize),
    AnyKey,
    AnyIndex,
}

impl PatternComponent {
    /// Does this component address `component`?
    pub fn matches(&self, component: &PathComponent) -> bool {
        match (self, component) {
            (PatternComponent::Key(a), PathComponent::Key(b)) => a == b,
            (PatternComponent::Index(a), PathComponent::Index(b)) => a == b,
            (PatternComponent::AnyKey, PathComponent::Key(_)) => true,
            (PatternComponent::AnyIndex, PathComponent::Index(_)) => true,
            _ => false,
        }
    }
}

impl From<PathComponent> for PatternComponent {
    fn from(value: PathComponent) -> Self {
        match value {
            PathComponent::Key(key) => PatternComponent::Key(key),
            PathComponent::Index(index) => PatternComponent::Index(index),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pattern(Vec<PatternComponent>);

impl Pattern {
    pub fn empty() -> Self {
        Pattern(Vec::new())
    }

    pub fn new(components: Vec<PatternComponent>) -> Self {
        Pattern(components)
    }

    /// Parse the string form of a pattern, e.g. `resources.jobs.*.tasks[*]`
    pub fn parse(input: &str) -> Result<Pattern> {
        parse_components(input, true)
            .map(Pattern)
            .map_err(|reason| Error::InvalidPattern {
                input: input.to_string(),
                reason,
            })
    }

    /// Like [Pattern::parse] but panics on invalid input
    pub fn must_parse(input: &str) -> Pattern {
        match Pattern::parse(input) {
            Ok(pattern) => pattern,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn components(&self) -> &[PatternComponent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// New pattern with `component` added at the end
    pub fn append(&self, component: PatternComponent) -> Pattern {
        let mut components = Vec::with_capacity(self.0.len() + 1);
        components.extend_from_slice(&self.0);
        components.push(component);
        Pattern(components)
    }

    /// Does this pattern address exactly `path`?
    pub fn matches(&self, path: &Path) -> bool {
        self.0.len() == path.len()
            && self
                .0
                .iter()
                .zip(path.components())
                .all(|(pattern, component)| pattern.matches(component))
    }
}

impl From<Path> for Pattern {
    fn from(value: Path) -> Self {
        Pattern(
            value
                .components()
                .iter()
                .cloned()
                .map(PatternComponent::from)
                .collect(),
        )
    }
}

impl From<&Path> for Pattern {
    fn from(value: &Path) -> Self {
        value.clone().into()
    }
}

impl std::str::FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pattern::parse(s)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            let dot = if i > 0 { "." } else { "" };
            match component {
                PatternComponent::Key(key) => write!(f, "{dot}{key}")?,
                PatternComponent::AnyKey => write!(f, "{dot}*")?,
                PatternComponent::Index(index) => write!(f, "[{index}]")?,
                PatternComponent::AnyIndex => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}

/// Grammar shared by paths and patterns
///
/// `key`, `key.key`, `key[0]`, `key[0][1]`, with an optional leading dot. With `wildcards` set a
/// bare `*` is [PatternComponent::AnyKey] and `[*]` is [PatternComponent::AnyIndex].
///
/// The error is a reason that quotes the offending part of the input.
pub(crate) fn parse_components(
    input: &str,
    wildcards: bool,
) -> std::result::Result<Vec<PatternComponent>, String> {
    let mut components = vec![];
    let mut rest = input.strip_prefix('.').unwrap_or(input);

    while !rest.is_empty() {
        // every component may have a leading dot
        let previous = rest;
        rest = rest.strip_prefix('.').unwrap_or(rest);
        if rest.is_empty() {
            return Err(format!("expected a component after {previous:?}"));
        }

        if let Some(bracketed) = rest.strip_prefix('[') {
            let Some(end) = bracketed.find(']') else {
                return Err(format!("unterminated bracket in {rest:?}"));
            };

            let inner = &bracketed[..end];
            if wildcards && inner == "*" {
                components.push(PatternComponent::AnyIndex);
            } else if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
                let index = inner
                    .parse()
                    .map_err(|_| format!("index {inner:?} is out of range"))?;
                components.push(PatternComponent::Index(index));
            } else {
                return Err(format!("invalid index {inner:?}"));
            }

            rest = &bracketed[end + 1..];
            if !rest.is_empty() && !rest.starts_with(['.', '[']) {
                return Err(format!("expected \".\" or \"[\" before {rest:?}"));
            }
        } else {
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            if end == 0 {
                return Err(format!("empty key before {rest:?}"));
            }

            let key = &rest[..end];
            if wildcards && key == "*" {
                components.push(PatternComponent::AnyKey);
            } else {
                components.push(PatternComponent::Key(key.to_string()));
            }
            rest = &rest[end..];
        }
    }

    Ok(components)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_wildcards() {
        assert_eq!(
            Pattern::must_parse("foo.*.bar[*][1]"),
            Pattern::new(vec![
                PatternComponent::Key("foo".into()),
                PatternComponent::AnyKey,
                PatternComponent::Key("bar".into()),
                PatternComponent::AnyIndex,
                PatternComponent::Index(1),
            ])
        );
    }

    #[test]
    fn display_round_trip() {
        for input in ["foo.*.bar", "*[*]", "a[1].*", "[*].x"] {
            assert_eq!(Pattern::must_parse(input).to_string(), input);
        }
    }

    #[test]
    fn parse_errors() {
        for input in ["foo[", "foo..*", "foo[x]", "foo[*]bar", "*."] {
            assert!(Pattern::parse(input).is_err(), "{input}");
        }
    }

    #[test]
    fn from_path_is_lossless() {
        let path = Path::must_parse("a.b[3]");
        let pattern = Pattern::from(&path);
        assert_eq!(pattern.to_string(), path.to_string());
        assert!(pattern.matches(&path));
    }

    #[test]
    fn matches_one_level_per_wildcard() {
        let pattern = Pattern::must_parse("jobs.*.tasks[*]");
        assert!(pattern.matches(&Path::must_parse("jobs.a.tasks[0]")));
        assert!(pattern.matches(&Path::must_parse("jobs.b.tasks[7]")));
        assert!(!pattern.matches(&Path::must_parse("jobs.a.b.tasks[0]")));
        assert!(!pattern.matches(&Path::must_parse("jobs.a.tasks.x")));
        assert!(!pattern.matches(&Path::must_parse("jobs.a.tasks")));
    }
}
