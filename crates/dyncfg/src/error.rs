//! error types shared by all modules
use crate::path::Path;
use crate::value::{Kind, Location};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // addressing
    #[error("key not found at \"{path}\"")]
    NoSuchKey { path: Path },
    #[error("index out of bounds at \"{path}\"")]
    IndexOutOfBounds { path: Path },
    #[error("cannot traverse nil value at \"{path}\"")]
    CannotTraverseNil { path: Path },
    #[error("expected a map to index \"{path}\", found {found}")]
    ExpectedMap { path: Path, found: Kind },
    #[error("expected a sequence to index \"{path}\", found {found}")]
    ExpectedSequence { path: Path, found: Kind },
    #[error("expected a map or sequence at \"{path}\", found {found}")]
    ExpectedContainer { path: Path, found: Kind },

    // parsing
    #[error("invalid path {input:?}: {reason}")]
    InvalidPath { input: String, reason: String },
    #[error("invalid pattern {input:?}: {reason}")]
    InvalidPattern { input: String, reason: String },
    #[error("fixed index patterns are not supported: {pattern:?}")]
    FixedIndexPattern { pattern: String },
    #[error("{location}: {message}")]
    Yaml { location: Location, message: String },
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unable to write yaml")]
    YamlOutput(#[from] serde_yaml::Error),
    #[error("invalid time: {input:?}")]
    InvalidTime { input: String },
    #[error("mapping keys must be strings, found {found}")]
    InvalidKey { found: Kind },
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<Error>,
    },
    #[error("IO error")]
    Io(#[from] std::io::Error),

    // merging
    #[error("cannot merge {left} with {right}")]
    MergeKindMismatch { left: Kind, right: Kind },
    #[error("undo delete operation")]
    OverrideUndoDelete,
    #[error("{0}")]
    Custom(String),

    // walking
    #[error("cannot drop the root value")]
    DropRoot,

    // resolving
    #[error("skip resolution")]
    SkipResolution,
    #[error("reference does not exist: ${{{reference}}}")]
    MissingReference { reference: String },
    #[error("cycle detected in field resolution: {chain}")]
    Cycle { chain: String },
    #[error("cannot interpolate non-string value: {reference}")]
    NonStringInterpolation { reference: String },
}

impl Error {
    /// Build an error from a caller supplied message
    ///
    /// Meant for override visitors that reject a change.
    pub fn custom(message: impl std::fmt::Display) -> Self {
        Error::Custom(message.to_string())
    }

    pub fn is_no_such_key(&self) -> bool {
        matches!(self, Error::NoSuchKey { .. })
    }

    pub fn is_index_out_of_bounds(&self) -> bool {
        matches!(self, Error::IndexOutOfBounds { .. })
    }

    pub fn is_cannot_traverse_nil(&self) -> bool {
        matches!(self, Error::CannotTraverseNil { .. })
    }

    /// The path did not lead anywhere, but the tree shape was not contradicted either
    pub fn is_missing_path(&self) -> bool {
        self.is_no_such_key() || self.is_index_out_of_bounds() || self.is_cannot_traverse_nil()
    }
}
