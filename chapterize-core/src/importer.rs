use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use crate::book::{BookBuilder, ChapterAnalytics};
use crate::classifier::LineClassifier;
use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::fingerprint::{config_hash, content_hash};
use crate::ids::{IdGenerator, RandomIds};
use crate::metadata::{title_from_text, MetadataAnalyzer};
use crate::position::ChapterPosition;
use crate::rules::{ChapterDetector, DebugConfig};
use crate::text::{TextFilter, TextSplitter};
use crate::types::*;

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct ImportStages {
    pub metadata_lines: Vec<String>,
    pub lines: Vec<Line>,
    pub detection: DetectionSummary,
    pub position: ChapterPosition,
    pub rejected: Vec<RejectedRule>,
    pub result: ImportResult,
}

/// A rule whose candidates failed validation, with the issues found
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRule {
    pub rule: String,
    pub issues: Vec<String>,
}

/// Times import stages when profiling is on. The recorded timings end up
/// in `ImportProfile::step_timings`.
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<StepTiming>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let millis = start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!("⏱️  {}: {:.1}ms", step, millis);

        self.timings.push(StepTiming {
            step: step.to_string(),
            millis,
        });
        result
    }

    pub fn timings(&self) -> &[StepTiming] {
        &self.timings
    }

    pub fn total_millis(&self) -> f64 {
        self.timings.iter().map(|t| t.millis).sum()
    }

    /// Log the stage breakdown and hand the timings over for the profile
    pub fn finish(self) -> Vec<StepTiming> {
        if !self.enabled || self.timings.is_empty() {
            return self.timings;
        }

        let total = self.total_millis();
        tracing::info!("📊 Import stages ({:.1}ms total):", total);
        for timing in &self.timings {
            let share = if total > 0.0 { timing.millis / total * 100.0 } else { 0.0 };
            tracing::info!("   {:.<20} {:>8.1}ms ({:.1}%)", timing.step, timing.millis, share);
        }
        self.timings
    }
}

/// Turns decoded e-book text into an `ImportResult`.
pub struct TextImporter {
    config: ImportConfig,
    classifier: LineClassifier,
    filter: TextFilter,
    splitter: TextSplitter,
    detector: ChapterDetector,
    metadata: MetadataAnalyzer,
    ids: Box<dyn IdGenerator>,
    profiling: bool,
}

impl TextImporter {
    /// Build the pipeline for `config`. Fails only on invalid regex patterns.
    pub fn new(config: ImportConfig) -> Result<Self> {
        let classifier = LineClassifier::new(&config.classifier);
        let detector = ChapterDetector::from_config(&config, &classifier);

        Ok(Self {
            filter: TextFilter::new(&config.filter)?,
            splitter: TextSplitter::new(&config.splitter)?,
            metadata: MetadataAnalyzer::new()?,
            classifier,
            detector,
            ids: Box::new(RandomIds),
            profiling: false,
            config,
        })
    }

    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn set_debug_config(&mut self, debug_config: DebugConfig) {
        self.detector.set_debug_config(debug_config);
    }

    pub fn set_profiling(&mut self, enabled: bool) {
        self.profiling = enabled;
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn detector(&self) -> &ChapterDetector {
        &self.detector
    }

    /// Import one text. `source_name` (usually the file stem) is the title
    /// when the text carries none.
    pub fn import(
        &self,
        text: &str,
        source_name: Option<&str>,
        detect_chapters: bool,
    ) -> Result<ImportResult> {
        Ok(self.run(text, source_name, detect_chapters)?.result)
    }

    /// Import and keep every intermediate stage
    pub fn capture_stages(
        &self,
        text: &str,
        source_name: Option<&str>,
        detect_chapters: bool,
    ) -> Result<ImportStages> {
        let stages = self.run(text, source_name, detect_chapters)?;
        tracing::info!("📋 Stage 1: {} metadata lines", stages.metadata_lines.len());
        tracing::info!("📋 Stage 2: {} classified lines", stages.lines.len());
        tracing::info!(
            "📋 Stage 3: {} chapters via {} ({} rules rejected)",
            stages.position.len(),
            stages.detection.rule,
            stages.rejected.len()
        );
        tracing::info!(
            "📋 Stage 4: {} parts, {} words",
            stages.result.parts.len(),
            stages.result.profile.total_words
        );
        Ok(stages)
    }

    fn run(
        &self,
        text: &str,
        source_name: Option<&str>,
        detect_chapters: bool,
    ) -> Result<ImportStages> {
        let mut profiler = StepProfiler::new(self.profiling);
        tracing::info!("📖 Importing {}", source_name.unwrap_or("<text>"));

        if text.lines().next().is_none() {
            return Err(ImportError::EmptyInput);
        }

        let filtered = profiler.time_step("Filter", || self.filter.filter_text(text));
        let mut split = profiler.time_step("Split", || self.splitter.split(filtered));
        if split.text_lines.is_empty() {
            // Nothing survived filtering; keep the input as one degenerate chapter
            tracing::warn!("⚠️  No text left after filtering, keeping the unfiltered lines");
            split.text_lines = text.lines().map(|l| l.trim_end().to_string()).collect();
        }
        let lines = profiler.time_step("Classify", || self.classifier.classify_all(&split.text_lines));
        tracing::info!(
            "📊 {} metadata lines, {} text lines",
            split.metadata_lines.len(),
            lines.len()
        );

        let outcome = profiler.time_step("Detect", || self.detector.detect(&lines, detect_chapters))?;

        let parts = profiler.time_step("Build", || {
            BookBuilder::new(&self.classifier, self.ids.as_ref()).build(
                std::slice::from_ref(&lines),
                std::slice::from_ref(&outcome.position),
            )
        })?;

        let metadata = profiler.time_step("Metadata", || {
            // Header fields win over the source name and the text's own title line
            let mut metadata = DocumentMetadata {
                title: source_name
                    .map(str::to_string)
                    .or_else(|| title_from_text(&lines)),
                ..DocumentMetadata::default()
            };
            metadata.merge_extracted(self.metadata.analyze(&split.metadata_lines));
            metadata
        });

        let step_timings = profiler.finish();
        let chapters = || parts.iter().flat_map(|p| p.chapters.iter());
        let profile = ImportProfile {
            created_at: Utc::now(),
            detection: outcome.summary(),
            line_count: lines.len(),
            metadata_line_count: split.metadata_lines.len(),
            chapter_count: chapters().count(),
            total_words: ChapterAnalytics::total_words(chapters()),
            chapter_words: ChapterAnalytics::word_stats(chapters()),
            content_hash: content_hash(&split.text_lines),
            config_hash: config_hash(&self.config)?,
            step_timings,
        };

        tracing::info!(
            "✅ {} chapters, {} words (rule: {}, confidence {:.2})",
            profile.chapter_count,
            profile.total_words,
            profile.detection.rule,
            profile.detection.confidence
        );

        let rejected = outcome
            .rejected
            .iter()
            .map(|(rule, report)| RejectedRule {
                rule: rule.clone(),
                issues: report.describe(),
            })
            .collect();

        Ok(ImportStages {
            metadata_lines: split.metadata_lines,
            detection: outcome.summary(),
            position: outcome.position,
            rejected,
            lines,
            result: ImportResult {
                schema_version: SCHEMA_VERSION.to_string(),
                parts,
                metadata,
                profile,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;
    use crate::ids::SequentialIds;

    fn importer() -> TextImporter {
        TextImporter::new(ImportConfig::default())
            .unwrap()
            .with_id_generator(Box::new(SequentialIds::new()))
    }

    #[test]
    fn test_empty_text_is_rejected() {
        assert!(matches!(importer().import("", None, true), Err(ImportError::EmptyInput)));
    }

    #[test]
    fn test_blank_only_text_is_one_chapter() {
        for detect in [true, false] {
            let result = importer().import("\n\n   \n", None, detect).unwrap();
            assert_eq!(result.profile.chapter_count, 1);
            assert_eq!(result.profile.line_count, 3);

            let chapter = result.chapters().next().unwrap();
            assert_eq!((chapter.start_line_index, chapter.end_line_index), (0, 2));
            assert_eq!(chapter.heading_line_index, None);
            assert_eq!(result.profile.detection.rule, "FullText");
            assert_eq!(result.profile.detection.fell_back, detect);
        }
    }

    #[test]
    fn test_header_title_beats_source_name() {
        let text = "Title: Salt and Stone\nAuthor: M. Ortiz\n*** START OF THE PROJECT GUTENBERG EBOOK ***\nA single line of prose.";
        let result = importer().import(text, Some("salt-and-stone"), true).unwrap();
        assert_eq!(result.metadata.title.as_deref(), Some("Salt and Stone"));
        assert_eq!(result.metadata.author.as_deref(), Some("M. Ortiz"));
    }

    #[test]
    fn test_title_falls_back_to_source_name() {
        let result = importer()
            .import("Just one line of prose.", Some("my-book"), true)
            .unwrap();
        assert_eq!(result.metadata.title.as_deref(), Some("my-book"));
        assert_eq!(result.profile.chapter_count, 1);
        assert!(result.profile.detection.fell_back);
    }

    #[test]
    fn test_invalid_pattern_fails_construction() {
        let mut config = ImportConfig::default();
        config.splitter.start_markers = vec!["(".to_string()];
        assert!(matches!(
            TextImporter::new(config),
            Err(ImportError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_profiler_records_steps() {
        let mut profiler = StepProfiler::new(true);
        let value = profiler.time_step("Step", || 41 + 1);
        assert_eq!(value, 42);
        assert_eq!(profiler.timings().len(), 1);
        assert_eq!(profiler.finish()[0].step, "Step");

        let mut disabled = StepProfiler::new(false);
        disabled.time_step("Step", || ());
        assert!(disabled.finish().is_empty());
    }

    #[test]
    fn test_profiling_fills_step_timings() {
        let text = "Just one line of prose.";
        let plain = importer().import(text, None, true).unwrap();
        assert!(plain.profile.step_timings.is_empty());

        let mut profiled = importer();
        profiled.set_profiling(true);
        let result = profiled.import(text, None, true).unwrap();
        let steps: Vec<_> = result.profile.step_timings.iter().map(|t| t.step.as_str()).collect();
        assert_eq!(steps, vec!["Filter", "Split", "Classify", "Detect", "Build", "Metadata"]);
    }
}
