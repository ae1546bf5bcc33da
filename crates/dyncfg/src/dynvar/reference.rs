use crate::path::Path;
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$\{([a-zA-Z]+([-_]?[a-zA-Z0-9]+)*(\.[a-zA-Z]+([-_]?[a-zA-Z0-9]+)*(\[[0-9]+\])*)*(\[[0-9]+\])*)\}",
    )
    .expect("variable reference regex is valid")
});

/// One `${...}` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Match {
    /// the whole `${...}` text
    pub text: String,
    /// the path between the braces
    pub path: String,
}

/// A string value with at least one reference
#[derive(Debug, Clone)]
pub(crate) struct Ref {
    pub value: Value,
    pub text: String,
    pub matches: Vec<Match>,
}

impl Ref {
    pub fn new(value: &Value) -> Option<Ref> {
        let text = value.as_str()?;
        let matches: Vec<Match> = VARIABLE
            .captures_iter(text)
            .map(|c| Match {
                text: c[0].to_string(),
                path: c[1].to_string(),
            })
            .collect();

        if matches.is_empty() {
            return None;
        }

        Some(Ref {
            value: value.clone(),
            text: text.to_string(),
            matches,
        })
    }

    /// The whole string is a single reference
    pub fn is_pure(&self) -> bool {
        self.matches.len() == 1 && self.matches[0].text == self.text
    }

    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.path.as_str())
    }
}

pub fn is_pure_variable_reference(s: &str) -> bool {
    !s.is_empty() && VARIABLE.find(s).is_some_and(|m| m.as_str() == s)
}

pub fn contains_variable_reference(s: &str) -> bool {
    VARIABLE.is_match(s)
}

/// Path referenced by `s` if it is a pure reference
pub fn pure_reference_to_path(s: &str) -> Option<Path> {
    let r = Ref::new(&Value::from(s))?;
    if !r.is_pure() {
        return None;
    }
    Path::parse(&r.matches[0].path).ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn references(s: &str) -> Vec<String> {
        Ref::new(&Value::from(s))
            .map(|r| r.references().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn matches_valid_references() {
        let cases = [
            ("${hello_world.world_world}", vec!["hello_world.world_world"]),
            ("${hello-world.world-world}", vec!["hello-world.world-world"]),
            ("${a.b[0].c[1][2]}", vec!["a.b[0].c[1][2]"]),
            ("${a[0]}", vec!["a[0]"]),
            ("${foo} and ${bar.baz}", vec!["foo", "bar.baz"]),
            ("${foo2.bar3}", vec!["foo2.bar3"]),
        ];

        for (input, expected) in cases {
            assert_eq!(references(input), expected, "{input}");
        }
    }

    #[test]
    fn rejects_invalid_references() {
        for input in [
            "${hello__world}",
            "${hello--world}",
            "${hello_-world}",
            "${_hello}",
            "${hello_}",
            "${0hello}",
            "${foo.0bar}",
            "${}",
            "$foo",
            "{foo}",
            "${foo[a]}",
        ] {
            assert_eq!(references(input), Vec::<String>::new(), "{input}");
        }
    }

    #[test]
    fn purity() {
        assert!(is_pure_variable_reference("${foo.bar}"));
        assert!(!is_pure_variable_reference("${foo.bar} "));
        assert!(!is_pure_variable_reference("x${foo.bar}"));
        assert!(!is_pure_variable_reference("${a}${b}"));
        assert!(!is_pure_variable_reference(""));

        assert!(contains_variable_reference("x${foo.bar}"));
        assert!(!contains_variable_reference("x${foo..bar}"));
    }

    #[test]
    fn pure_reference_path() {
        assert_eq!(
            pure_reference_to_path("${a.b[2]}"),
            Some(Path::must_parse("a.b[2]"))
        );
        assert_eq!(pure_reference_to_path("${a} ${b}"), None);
        assert_eq!(pure_reference_to_path("plain"), None);
    }
}
