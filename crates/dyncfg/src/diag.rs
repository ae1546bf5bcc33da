//! diagnostics reported by external processes
//!
//! Processes that receive a configuration snapshot report problems back as newline-delimited JSON,
//! one object per line:
//!
//! ```json
//! {"severity": "error", "summary": "bad value", "path": "jobs.a.name", "location": {"file": "a.py", "line": 3, "column": 1}}
//! ```
use crate::error::{Error, Result};
use crate::path::Path;
use crate::value::Location;
use serde::Deserialize;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Recommendation,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
            Severity::Recommendation => f.write_str("recommendation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[new(default)]
    pub detail: Option<String>,
    #[new(default)]
    pub path: Option<Path>,
    #[new(default)]
    pub location: Option<Location>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.summary)?;
        if let Some(location) = &self.location {
            write!(f, "\n  in {location}")?;
        }
        if let Some(path) = &self.path {
            write!(f, "\n  at {path}")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, "\n\n{detail}")?;
        }
        Ok(())
    }
}

/// One line as it is written by the external process
#[derive(Deserialize)]
struct Line {
    severity: Severity,
    summary: String,
    #[serde(default)]
    detail: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    location: Option<Location>,
}

impl TryFrom<Line> for Diagnostic {
    type Error = Error;

    fn try_from(line: Line) -> Result<Self> {
        let path = match line.path.as_str() {
            "" => None,
            path => Some(Path::parse(path)?),
        };

        Ok(Diagnostic {
            severity: line.severity,
            summary: line.summary,
            detail: Some(line.detail).filter(|d| !d.is_empty()),
            path,
            location: line.location.filter(|l| !l.file.is_empty()),
        })
    }
}

/// Parse a newline-delimited JSON diagnostics stream
///
/// Blank lines are skipped. Errors name the 1-based line they occurred on.
pub fn parse_diagnostics(reader: impl BufRead) -> Result<Vec<Diagnostic>> {
    let mut out = vec![];

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed = serde_json::from_str::<Line>(&line)
            .map_err(Error::from)
            .and_then(Diagnostic::try_from)
            .map_err(|err| Error::Line {
                line: index + 1,
                source: Box::new(err),
            })?;
        out.push(parsed);
    }

    Ok(out)
}

/// Any diagnostic of [Severity::Error]
pub fn has_error(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_all_fields() {
        let input = r#"
{"severity": "error", "summary": "bad", "detail": "very bad", "path": "jobs.a.tasks[0]", "location": {"file": "a.py", "line": 3, "column": 7}}

{"severity": "warning", "summary": "meh"}
{"severity": "recommendation", "summary": "hint", "path": "", "location": {"file": "", "line": 0, "column": 0}}
"#;

        let diagnostics = parse_diagnostics(input.as_bytes()).unwrap();

        let mut expected_error = Diagnostic::new(Severity::Error, "bad".to_string());
        expected_error.detail = Some("very bad".to_string());
        expected_error.path = Some(Path::must_parse("jobs.a.tasks[0]"));
        expected_error.location = Some(Location::new("a.py", 3, 7));

        assert_eq!(
            diagnostics,
            vec![
                expected_error,
                Diagnostic::new(Severity::Warning, "meh".to_string()),
                Diagnostic::new(Severity::Recommendation, "hint".to_string()),
            ]
        );
        assert!(has_error(&diagnostics));
        assert!(!has_error(&diagnostics[1..]));
    }

    #[test]
    fn errors_name_the_line() {
        let input = r#"{"severity": "warning", "summary": "ok"}
{"severity": "fatal", "summary": "x"}
"#;
        let err = parse_diagnostics(input.as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("line 2: "), "{err}");

        let input = "{\"severity\": \"error\", \"summary\": \"x\", \"path\": \"a..b\"}";
        let err = parse_diagnostics(input.as_bytes()).unwrap_err();
        match &err {
            Error::Line { line, source } => {
                assert_eq!(*line, 1);
                assert!(matches!(**source, Error::InvalidPath { .. }), "{source}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn display() {
        let mut d = Diagnostic::new(Severity::Error, "bad".to_string());
        d.location = Some(Location::new("a.py", 3, 7));
        d.path = Some(Path::must_parse("a.b"));
        assert_eq!(d.to_string(), "error: bad\n  in a.py:3:7\n  at a.b");
    }
}
