//! Error types for text import.

use thiserror::Error;

/// Violations of the `ChapterPosition` range invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("invalid range: end {end} is before start {start}")]
    InvertedRange { start: usize, end: usize },

    #[error("range [{start}, {end}] overlaps or precedes the previous range ending at {previous_end}")]
    Overlap {
        start: usize,
        end: usize,
        previous_end: usize,
    },

    #[error("heading line {heading} lies outside range [{start}, {end}]")]
    HeadingOutsideRange {
        heading: usize,
        start: usize,
        end: usize,
    },

    #[error("position does not cover the analyzed span: {0}")]
    Coverage(String),
}

/// Errors that can occur while importing a text.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The line sequence handed to detection was empty.
    #[error("cannot detect chapters in an empty line sequence")]
    EmptyInput,

    #[error("part count mismatch: {lines} line sequences but {positions} chapter positions")]
    PartCountMismatch { lines: usize, positions: usize },

    /// A chapter range points outside the lines it should slice. This is a
    /// detector defect, never an input-quality problem.
    #[error(
        "internal consistency violation in part {part}, chapter {chapter}: \
         range [{start}, {end}] exceeds {line_count} lines"
    )]
    InternalConsistency {
        part: usize,
        chapter: usize,
        start: usize,
        end: usize,
        line_count: usize,
    },

    #[error("invalid chapter position: {0}")]
    InvalidPosition(#[from] PositionError),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;
