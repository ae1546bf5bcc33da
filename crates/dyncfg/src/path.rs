//! exact addresses into a value tree
//!
//! A [Path] is a list of map keys and sequence indices. Its string form is the familiar
//! `resources.jobs.my_job.tasks[0].task_key`.
use crate::error::{Error, Result};
use crate::pattern::{parse_components, PatternComponent};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathComponent {
    Key(String),
    Index(usize),
}

impl PathComponent {
    pub fn key(key: impl Into<String>) -> Self {
        PathComponent::Key(key.into())
    }

    pub fn index(index: usize) -> Self {
        PathComponent::Index(index)
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathComponent::Key(key) => Some(key),
            PathComponent::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathComponent::Key(_) => None,
            PathComponent::Index(index) => Some(*index),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<PathComponent>);

impl Path {
    pub fn empty() -> Self {
        Path(Vec::new())
    }

    pub fn new(components: Vec<PathComponent>) -> Self {
        Path(components)
    }

    /// Parse the string form of a path
    ///
    /// ```
    /// # use dyncfg::path::{Path, PathComponent};
    /// let path = Path::parse("jobs.my_job.tasks[0]").unwrap();
    /// assert_eq!(path.components().last(), Some(&PathComponent::Index(0)));
    /// assert!(Path::parse("jobs..my_job").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Path> {
        let components = parse_components(input, false).map_err(|reason| Error::InvalidPath {
            input: input.to_string(),
            reason,
        })?;

        Ok(Path(
            components
                .into_iter()
                .filter_map(|c| match c {
                    PatternComponent::Key(key) => Some(PathComponent::Key(key)),
                    PatternComponent::Index(index) => Some(PathComponent::Index(index)),
                    // wildcards are not produced when they are disabled
                    PatternComponent::AnyKey | PatternComponent::AnyIndex => None,
                })
                .collect(),
        ))
    }

    /// Like [Path::parse] but panics on invalid input
    ///
    /// Only meant for string literals.
    pub fn must_parse(input: &str) -> Path {
        match Path::parse(input) {
            Ok(path) => path,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&PathComponent> {
        self.0.last()
    }

    /// New path with `component` added at the end
    ///
    /// Always allocates, two appends to the same path never share storage.
    pub fn append(&self, component: PathComponent) -> Path {
        let mut components = Vec::with_capacity(self.0.len() + 1);
        components.extend_from_slice(&self.0);
        components.push(component);
        Path(components)
    }

    /// New path with all components of `other` added at the end
    pub fn join(&self, other: &Path) -> Path {
        let mut components = Vec::with_capacity(self.0.len() + other.0.len());
        components.extend_from_slice(&self.0);
        components.extend_from_slice(&other.0);
        Path(components)
    }

    pub fn has_prefix(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn has_suffix(&self, suffix: &Path) -> bool {
        self.0.ends_with(&suffix.0)
    }

    /// Remainder after `prefix`, if this path starts with it
    pub fn cut_prefix(&self, prefix: &Path) -> Option<Path> {
        self.0
            .strip_prefix(prefix.0.as_slice())
            .map(|rest| Path(rest.to_vec()))
    }

    /// Remainder before `suffix`, if this path ends with it
    pub fn cut_suffix(&self, suffix: &Path) -> Option<Path> {
        self.0
            .strip_suffix(suffix.0.as_slice())
            .map(|rest| Path(rest.to_vec()))
    }

    /// Parent path, `None` for the empty path
    pub fn parent(&self) -> Option<Path> {
        self.0
            .split_last()
            .map(|(_, rest)| Path(rest.to_vec()))
    }
}

impl From<Vec<PathComponent>> for Path {
    fn from(value: Vec<PathComponent>) -> Self {
        Path(value)
    }
}

impl std::str::FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            match component {
                PathComponent::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathComponent::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
