// Chapterize Core Library
//
// Turns plain-text e-books into parts and chapters.
// Main interface: `TextImporter` for whole texts, `ChapterDetector` and
// `BookBuilder` for the individual stages.

pub mod book;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod ids;
pub mod importer;
pub mod metadata;
pub mod numerals;
pub mod position;
pub mod rules;
pub mod text;
pub mod types;

// Re-export main types and functions for easy use
pub use book::{BookBuilder, OutputFormat};
pub use classifier::LineClassifier;
pub use config::ImportConfig;
pub use error::{ImportError, PositionError, Result};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use importer::{ImportStages, StepProfiler, TextImporter};
pub use position::ChapterPosition;
pub use rules::{ChapterDetector, ChapterRule, DebugConfig, DetectionOutcome};
pub use types::*;
