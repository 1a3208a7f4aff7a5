use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ChapterId = Uuid;
pub type PartId = Uuid;

/// The schema version stamped on every import output.
/// Bump this when the output shape changes.
pub const SCHEMA_VERSION: &str = "0.1.0";

// ===== LINE MODEL =====

/// Structural features derived from a single line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineFeatures {
    pub is_blank: bool,
    /// Non-blank, at least one letter, every letter uppercase
    pub is_all_caps: bool,
    /// Trimmed length below the configured threshold
    pub is_short: bool,
    /// "CHAPTER IV", "Chapter 4" or a bare numeral alone on the line
    pub is_numeric_heading: bool,
    /// Starts with a chapter/part keyword followed by a number
    pub matches_keyword: bool,
    /// Leading whitespace characters
    pub indentation: usize,
}

/// One classified input line. Immutable once classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// 0-based index, stable across the pipeline
    pub index: usize,
    pub raw: String,
    /// Trimmed text
    pub text: String,
    pub features: LineFeatures,
}

impl Line {
    pub fn is_blank(&self) -> bool {
        self.features.is_blank
    }
}

// ===== CHAPTER RANGES =====

/// One chapter range inside a `ChapterPosition`. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterRange {
    pub heading_line_index: Option<usize>,
    pub start_line_index: usize,
    pub end_line_index: usize,
    pub title: Option<String>,
}

impl ChapterRange {
    pub fn new(heading_line_index: Option<usize>, start_line_index: usize, end_line_index: usize) -> Self {
        Self {
            heading_line_index,
            start_line_index,
            end_line_index,
            title: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Number of lines covered by this range
    pub fn len(&self) -> usize {
        self.end_line_index.saturating_sub(self.start_line_index) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end_line_index < self.start_line_index
    }
}

/// A heading line proposed by a detection rule, before ranges are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingCandidate {
    pub line_index: usize,
    /// Title found by the rule itself (e.g. from a subtitle line).
    /// When `None` the builder extracts it from the heading line.
    pub title: Option<String>,
}

impl HeadingCandidate {
    pub fn at(line_index: usize) -> Self {
        Self {
            line_index,
            title: None,
        }
    }
}

// ===== DOCUMENT MODEL =====

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub release_date: Option<String>,
    pub publisher: Option<String>,
    pub edition: Option<String>,
    pub translator: Option<String>,
    pub illustrator: Option<String>,
    pub description: Option<String>,
}

impl DocumentMetadata {
    /// Merge extracted metadata on top of current values.
    /// Non-None fields from `extracted` overwrite; None fields preserve existing.
    pub fn merge_extracted(&mut self, extracted: DocumentMetadata) {
        if extracted.title.is_some() { self.title = extracted.title; }
        if extracted.author.is_some() { self.author = extracted.author; }
        if extracted.language.is_some() { self.language = extracted.language; }
        if extracted.release_date.is_some() { self.release_date = extracted.release_date; }
        if extracted.publisher.is_some() { self.publisher = extracted.publisher; }
        if extracted.edition.is_some() { self.edition = extracted.edition; }
        if extracted.translator.is_some() { self.translator = extracted.translator; }
        if extracted.illustrator.is_some() { self.illustrator = extracted.illustrator; }
        if extracted.description.is_some() { self.description = extracted.description; }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chapter {
    pub id: ChapterId,
    /// 1-based position within the part
    pub number: usize,
    pub title: Option<String>,
    pub heading_line_index: Option<usize>,
    pub start_line_index: usize,
    pub end_line_index: usize,
    /// Every line of the range, heading line included
    pub lines: Vec<Line>,
}

impl Chapter {
    /// Lines of the chapter without its heading line
    pub fn body(&self) -> impl Iterator<Item = &Line> {
        let heading = self.heading_line_index;
        self.lines.iter().filter(move |l| Some(l.index) != heading)
    }

    /// Blank-line separated blocks of body text, each joined with spaces
    pub fn paragraphs(&self) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in self.body() {
            if line.is_blank() {
                if !current.is_empty() {
                    paragraphs.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(&line.text);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join(" "));
        }

        paragraphs
    }

    /// Raw body text, lines joined with newlines
    pub fn text(&self) -> String {
        self.body()
            .map(|l| l.raw.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    pub fn word_count(&self) -> usize {
        self.body().map(|l| l.text.split_whitespace().count()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentPart {
    pub id: PartId,
    /// 1-based position within the document
    pub number: usize,
    pub title: Option<String>,
    pub chapters: Vec<Chapter>,
}

// ===== IMPORT OUTPUT =====

/// Which rule produced the accepted chapter structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionSummary {
    pub rule: String,
    pub confidence: f32,
    /// True when no rule passed validation and the full-text fallback was used
    pub fell_back: bool,
    pub rejected_rules: Vec<String>,
}

/// Word count statistics over the chapters of an import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChapterWordStats {
    pub min: usize,
    pub max: usize,
    pub mean: f32,
    pub median: f32,
}

/// Measurement of one import run. Travels with the import result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportProfile {
    pub created_at: DateTime<Utc>,
    pub detection: DetectionSummary,
    pub line_count: usize,
    pub metadata_line_count: usize,
    pub chapter_count: usize,
    pub total_words: usize,
    pub chapter_words: ChapterWordStats,
    /// SHA-256 of the analyzed text region
    pub content_hash: String,
    /// SHA-256 of the configuration used
    pub config_hash: String,
    /// Per-stage wall time, recorded only when profiling is on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub step_timings: Vec<StepTiming>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepTiming {
    pub step: String,
    pub millis: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub schema_version: String,
    pub parts: Vec<DocumentPart>,
    pub metadata: DocumentMetadata,
    pub profile: ImportProfile,
}

impl ImportResult {
    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.parts.iter().flat_map(|p| p.chapters.iter())
    }
}
