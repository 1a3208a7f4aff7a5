use std::collections::HashSet;

use regex::Regex;

use crate::classifier::LineClassifier;
use crate::config::{ImportConfig, ValidationConfig};
use crate::error::{ImportError, Result};
use crate::position::ChapterPosition;
use crate::types::*;

use super::blank_line_block::BlankLineBlockRule;
use super::full_text::FullTextRule;
use super::keyword_heading::KeywordHeadingRule;
use super::numeric_sequence::NumericSequenceRule;
use super::validation::{CandidateValidator, ValidationReport};

/// A heuristic that proposes chapter ranges for a line sequence.
///
/// Rules are pure: the same lines always produce the same ranges, and empty
/// input produces no ranges. Output is unvalidated; the detector decides
/// whether to trust it.
pub trait ChapterRule: Send + Sync {
    fn name(&self) -> &str;
    fn confidence(&self) -> f32;
    fn scan(&self, lines: &[Line]) -> Vec<ChapterRange>;
}

// Debug configuration for candidate tracing
#[derive(Debug, Clone, Default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub filter_patterns: Vec<String>,
}

impl DebugConfig {
    pub fn new(enabled: bool, filter_patterns: Vec<String>) -> Self {
        Self {
            enabled,
            filter_patterns,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Log heading lines proposed by a rule whose text matches a debug filter
pub fn debug_candidate_lines(
    rule_name: &str,
    lines: &[Line],
    ranges: &[ChapterRange],
    debug_config: &DebugConfig,
) {
    if !debug_config.enabled || debug_config.filter_patterns.is_empty() {
        return;
    }

    let matchers: Vec<(Option<Regex>, &str)> = debug_config
        .filter_patterns
        .iter()
        .map(|p| (Regex::new(p).ok(), p.as_str()))
        .collect();

    let matching: Vec<(&ChapterRange, &Line)> = ranges
        .iter()
        .filter_map(|r| r.heading_line_index.and_then(|i| lines.get(i)).map(|l| (r, l)))
        .filter(|(_, line)| {
            matchers.iter().any(|(regex, pattern)| match regex {
                // Try regex first, fall back to simple string contains
                Some(regex) => regex.is_match(&line.text),
                None => line.text.contains(pattern),
            })
        })
        .collect();

    if matching.is_empty() {
        return;
    }

    tracing::info!("🔍 [{}] {} matching headings:", rule_name, matching.len());
    for (range, line) in matching {
        let preview: String = line.text.chars().take(50).collect();
        tracing::info!(
            "  Line {}: \"{}\" (range {}-{}, title: {:?})",
            line.index,
            preview,
            range.start_line_index,
            range.end_line_index,
            range.title
        );
    }
}

/// Turn heading candidates into contiguous ranges covering `[0, n-1]`.
///
/// Non-blank lines before the first heading become an untitled preamble
/// chapter; blank ones are absorbed into the first chapter. Headings with
/// nothing but blank lines after them are dropped.
pub fn ranges_from_headings(lines: &[Line], headings: &[HeadingCandidate]) -> Vec<ChapterRange> {
    let mut headings: Vec<&HeadingCandidate> = headings
        .iter()
        .filter(|h| h.line_index < lines.len())
        .collect();
    headings.sort_by_key(|h| h.line_index);
    headings.dedup_by_key(|h| h.line_index);

    let last_content = lines.iter().rposition(|l| !l.is_blank());
    headings.retain(|h| last_content.is_some_and(|last| last > h.line_index));

    let Some(first) = headings.first() else {
        return Vec::new();
    };

    let mut ranges = Vec::with_capacity(headings.len() + 1);
    let has_preamble = lines[..first.line_index].iter().any(|l| !l.is_blank());
    if has_preamble {
        ranges.push(ChapterRange::new(None, 0, first.line_index - 1));
    }

    for (i, heading) in headings.iter().enumerate() {
        let start = if i == 0 && !has_preamble {
            0
        } else {
            heading.line_index
        };
        let end = headings
            .get(i + 1)
            .map(|next| next.line_index - 1)
            .unwrap_or(lines.len() - 1);
        ranges.push(ChapterRange::new(Some(heading.line_index), start, end).with_title(heading.title.clone()));
    }

    ranges
}

/// Result of running the detection cascade over one line sequence.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub position: ChapterPosition,
    /// Name of the rule whose ranges were accepted
    pub rule: String,
    pub confidence: f32,
    pub fell_back: bool,
    /// Rules whose candidates failed validation, with the reason
    pub rejected: Vec<(String, ValidationReport)>,
}

impl DetectionOutcome {
    pub fn summary(&self) -> DetectionSummary {
        DetectionSummary {
            rule: self.rule.clone(),
            confidence: self.confidence,
            fell_back: self.fell_back,
            rejected_rules: self.rejected.iter().map(|(name, _)| name.clone()).collect(),
        }
    }
}

enum DetectionState {
    Start,
    RuleScan(usize),
    CandidateValidation(usize, Vec<ChapterRange>),
    Accepted(usize, ChapterPosition),
    Fallback { fell_back: bool },
    Done(DetectionOutcome),
}

/// Runs chapter rules in priority order and keeps the first result that
/// validates, falling back to a single full-text chapter.
pub struct ChapterDetector {
    rules: Vec<Box<dyn ChapterRule>>,
    fallback: FullTextRule,
    validator: CandidateValidator,
    debug_config: DebugConfig,
}

impl ChapterDetector {
    /// Build the rule cascade named by `config.pipeline`
    pub fn from_config(config: &ImportConfig, classifier: &LineClassifier) -> Self {
        let mut rules: Vec<Box<dyn ChapterRule>> = Vec::new();
        for rule_config in &config.pipeline.rules {
            if !rule_config.enabled {
                tracing::debug!("   ⏭️  Skipping disabled rule: {}", rule_config.name);
                continue;
            }
            match rule_by_name(&rule_config.name, config, classifier) {
                Some(rule) => rules.push(rule),
                None => tracing::warn!("⚠️  Unknown rule: {}. Skipping...", rule_config.name),
            }
        }
        Self::with_rules(rules, &config.validation)
    }

    /// Build a detector over an explicit rule list, in priority order
    pub fn with_rules(rules: Vec<Box<dyn ChapterRule>>, validation: &ValidationConfig) -> Self {
        Self {
            rules,
            fallback: FullTextRule,
            validator: CandidateValidator::new(validation),
            debug_config: DebugConfig::disabled(),
        }
    }

    pub fn set_debug_config(&mut self, debug_config: DebugConfig) {
        self.debug_config = debug_config;
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Detect chapter boundaries in `lines`.
    ///
    /// With `detect_chapters` off the whole input is one chapter. Fails only
    /// for empty input.
    pub fn detect(&self, lines: &[Line], detect_chapters: bool) -> Result<DetectionOutcome> {
        let mut rejected: Vec<(String, ValidationReport)> = Vec::new();
        let mut state = DetectionState::Start;

        loop {
            state = match state {
                DetectionState::Start => {
                    if lines.is_empty() {
                        return Err(ImportError::EmptyInput);
                    }
                    if detect_chapters {
                        DetectionState::RuleScan(0)
                    } else {
                        tracing::info!("⚡ Chapter detection disabled, using full text");
                        DetectionState::Fallback { fell_back: false }
                    }
                }
                DetectionState::RuleScan(i) => match self.rules.get(i) {
                    Some(rule) => {
                        let mut ranges = rule.scan(lines);
                        let mut seen = HashSet::new();
                        ranges.retain(|r| seen.insert(r.clone()));
                        tracing::debug!("🔧 {} proposed {} ranges", rule.name(), ranges.len());
                        debug_candidate_lines(rule.name(), lines, &ranges, &self.debug_config);
                        DetectionState::CandidateValidation(i, ranges)
                    }
                    None => DetectionState::Fallback { fell_back: true },
                },
                DetectionState::CandidateValidation(i, ranges) => {
                    let rule = &self.rules[i];
                    match self.validator.validate(lines, &ranges) {
                        Ok(position) => DetectionState::Accepted(i, position),
                        Err(report) => {
                            report.log(rule.name());
                            rejected.push((rule.name().to_string(), report));
                            DetectionState::RuleScan(i + 1)
                        }
                    }
                }
                DetectionState::Accepted(i, position) => {
                    let rule = &self.rules[i];
                    tracing::info!(
                        "✅ {} accepted: {} chapters (confidence {:.2})",
                        rule.name(),
                        position.len(),
                        rule.confidence()
                    );
                    DetectionState::Done(DetectionOutcome {
                        position,
                        rule: rule.name().to_string(),
                        confidence: rule.confidence(),
                        fell_back: false,
                        rejected: std::mem::take(&mut rejected),
                    })
                }
                DetectionState::Fallback { fell_back } => {
                    if fell_back {
                        tracing::info!(
                            "📄 No rule produced a valid structure, treating {} lines as one chapter",
                            lines.len()
                        );
                    }
                    let position = ChapterPosition::from_ranges(self.fallback.scan(lines))?;
                    DetectionState::Done(DetectionOutcome {
                        position,
                        rule: self.fallback.name().to_string(),
                        confidence: self.fallback.confidence(),
                        fell_back,
                        rejected: std::mem::take(&mut rejected),
                    })
                }
                DetectionState::Done(outcome) => return Ok(outcome),
            };
        }
    }
}

fn rule_by_name(
    name: &str,
    config: &ImportConfig,
    classifier: &LineClassifier,
) -> Option<Box<dyn ChapterRule>> {
    match name {
        "KeywordHeading" => Some(Box::new(KeywordHeadingRule::new(
            classifier.clone(),
            &config.keyword_heading,
            &config.validation,
        ))),
        "BlankLineBlock" => Some(Box::new(BlankLineBlockRule::new(&config.blank_line_block))),
        "NumericSequence" => Some(Box::new(NumericSequenceRule::new(&config.numeric_sequence))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;

    fn lines(raw: &[&str]) -> Vec<Line> {
        LineClassifier::default().classify_all(raw)
    }

    fn detector() -> ChapterDetector {
        ChapterDetector::from_config(&ImportConfig::default(), &LineClassifier::default())
    }

    /// Proposes the given ranges no matter the input
    struct FixedRule {
        name: &'static str,
        ranges: Vec<ChapterRange>,
    }

    impl ChapterRule for FixedRule {
        fn name(&self) -> &str {
            self.name
        }

        fn confidence(&self) -> f32 {
            1.0
        }

        fn scan(&self, _lines: &[Line]) -> Vec<ChapterRange> {
            self.ranges.clone()
        }
    }

    #[test]
    fn test_ranges_from_headings_with_preamble() {
        let lines = lines(&["Foreword text.", "", "CHAPTER I", "Body.", "CHAPTER II", "Body."]);
        let ranges = ranges_from_headings(&lines, &[HeadingCandidate::at(2), HeadingCandidate::at(4)]);
        assert_eq!(
            ranges,
            vec![
                ChapterRange::new(None, 0, 1),
                ChapterRange::new(Some(2), 2, 3),
                ChapterRange::new(Some(4), 4, 5),
            ]
        );
    }

    #[test]
    fn test_ranges_from_headings_absorbs_blank_preamble() {
        let lines = lines(&["", "", "CHAPTER I", "Body."]);
        let ranges = ranges_from_headings(&lines, &[HeadingCandidate::at(2)]);
        assert_eq!(ranges, vec![ChapterRange::new(Some(2), 0, 3)]);
    }

    #[test]
    fn test_ranges_from_headings_drops_trailing_heading() {
        let lines = lines(&["CHAPTER I", "Body.", "CHAPTER II", ""]);
        let ranges = ranges_from_headings(&lines, &[HeadingCandidate::at(0), HeadingCandidate::at(2)]);
        assert_eq!(ranges, vec![ChapterRange::new(Some(0), 0, 3)]);
        assert!(ranges_from_headings(&lines, &[]).is_empty());
        assert!(ranges_from_headings(&[], &[HeadingCandidate::at(0)]).is_empty());
    }

    #[test]
    fn test_detect_empty_input_fails() {
        assert!(matches!(detector().detect(&[], true), Err(ImportError::EmptyInput)));
        assert!(matches!(detector().detect(&[], false), Err(ImportError::EmptyInput)));
    }

    #[test]
    fn test_detect_disabled_returns_full_text() {
        let lines = lines(&["CHAPTER I", "Body.", "CHAPTER II", "Body."]);
        let outcome = detector().detect(&lines, false).unwrap();
        assert_eq!(outcome.position.entries(), &[ChapterRange::new(None, 0, 3)]);
        assert_eq!(outcome.rule, "FullText");
        assert!(!outcome.fell_back);
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn test_detect_prose_falls_back() {
        let lines = lines(&[
            "It was a quiet morning in the village and nobody expected anything.",
            "The baker opened his shop as he had done for thirty years.",
            "Children ran along the lane toward the old schoolhouse.",
            "By noon the sun had burned away the last of the fog.",
            "Nothing, it seemed, would ever change in that small place.",
        ]);
        let outcome = detector().detect(&lines, true).unwrap();
        assert_eq!(outcome.position.entries(), &[ChapterRange::new(None, 0, 4)]);
        assert!(outcome.fell_back);
        assert_eq!(outcome.rejected.len(), 3);
        assert_eq!(outcome.summary().rejected_rules.len(), 3);
    }

    #[test]
    fn test_overlapping_rule_is_rejected_and_next_rule_wins() {
        let lines = lines(&["CHAPTER I", "Body.", "CHAPTER II", "Body."]);
        let overlapping = FixedRule {
            name: "Overlapping",
            ranges: vec![
                ChapterRange::new(Some(0), 0, 2),
                ChapterRange::new(Some(2), 1, 3),
            ],
        };
        let valid = FixedRule {
            name: "Valid",
            ranges: vec![
                ChapterRange::new(Some(0), 0, 1),
                ChapterRange::new(Some(2), 2, 3),
            ],
        };
        let detector = ChapterDetector::with_rules(
            vec![Box::new(overlapping), Box::new(valid)],
            &ValidationConfig::default(),
        );

        let outcome = detector.detect(&lines, true).unwrap();
        assert_eq!(outcome.rule, "Valid");
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].0, "Overlapping");
        assert_eq!(outcome.position.len(), 2);
    }

    #[test]
    fn test_exact_duplicates_are_removed() {
        let lines = lines(&["CHAPTER I", "Body.", "CHAPTER II", "Body."]);
        let duplicated = FixedRule {
            name: "Duplicated",
            ranges: vec![
                ChapterRange::new(Some(0), 0, 1),
                ChapterRange::new(Some(0), 0, 1),
                ChapterRange::new(Some(2), 2, 3),
            ],
        };
        let detector =
            ChapterDetector::with_rules(vec![Box::new(duplicated)], &ValidationConfig::default());
        let outcome = detector.detect(&lines, true).unwrap();
        assert_eq!(outcome.rule, "Duplicated");
        assert_eq!(outcome.position.len(), 2);
    }

    #[test]
    fn test_unknown_and_disabled_rules_are_skipped() {
        let mut config = ImportConfig::default();
        config.pipeline.rules = vec![
            RuleConfig::enabled("NoSuchRule"),
            RuleConfig {
                name: "KeywordHeading".to_string(),
                enabled: false,
            },
            RuleConfig::enabled("NumericSequence"),
        ];
        let detector = ChapterDetector::from_config(&config, &LineClassifier::default());
        assert_eq!(detector.rule_names(), vec!["NumericSequence"]);
    }

    #[test]
    fn test_detection_is_repeatable() {
        let lines = lines(&["", "CHAPTER ONE", "", "Body one.", "", "CHAPTER TWO", "", "Body two."]);
        let detector = detector();
        let first = detector.detect(&lines, true).unwrap();
        let second = detector.detect(&lines, true).unwrap();
        assert_eq!(first.position, second.position);
        assert_eq!(first.rule, "KeywordHeading");
    }
}
