//! timestamps that remember their spelling
//!
//! YAML accepts many ways to write the same instant. A [Time] keeps the text it was parsed from so
//! writing an untouched value reproduces it byte for byte.
use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc};

const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dt%H:%M:%S%.f%:z"];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dt%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

#[derive(Debug, Clone)]
pub struct Time {
    instant: DateTime<FixedOffset>,
    source: String,
}

impl Time {
    /// Parse a timestamp
    ///
    /// Accepted forms are RFC 3339, the same with single digit fields or a lowercase `t`, a
    /// space separated date and time without zone (UTC), and a plain date (midnight UTC).
    pub fn parse(input: &str) -> Result<Time> {
        let instant = parse_instant(input).ok_or_else(|| Error::InvalidTime {
            input: input.to_string(),
        })?;

        Ok(Time {
            instant,
            source: input.to_string(),
        })
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    /// The text this time was created from
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn parse_instant(input: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant);
    }

    // `%:z` does not take `Z`
    let zoned = match input.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => input.to_string(),
    };
    for format in ZONED_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(&zoned, format) {
            return Some(instant);
        }
    }

    let utc = Utc.fix();
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| utc.from_utc_datetime(&naive))
}

impl From<DateTime<FixedOffset>> for Time {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Time {
            source: instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            instant,
        }
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant && self.source == other.source
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_original_text() {
        for input in [
            "2001-12-14t21:59:43.10-05:00",
            "2001-12-14T21:59:43Z",
            "2001-12-14 21:59:43.10",
            "2002-12-14",
            "2002-1-4",
        ] {
            let time = Time::parse(input).unwrap();
            assert_eq!(time.to_string(), input);
        }
    }

    #[test]
    fn spellings_of_the_same_instant() {
        let a = Time::parse("2001-12-15T02:59:43.1Z").unwrap();
        let b = Time::parse("2001-12-14t21:59:43.10-05:00").unwrap();
        assert_eq!(a.instant(), b.instant());
        assert_ne!(a, b);
    }

    #[test]
    fn plain_date_is_midnight_utc() {
        let time = Time::parse("2024-02-29").unwrap();
        assert_eq!(
            time.instant(),
            DateTime::parse_from_rfc3339("2024-02-29T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Time::parse("yesterday"),
            Err(Error::InvalidTime { .. })
        ));
        assert!(Time::parse("2024-13-01").is_err());
    }
}
