use crate::config::ValidationConfig;
use crate::error::PositionError;
use crate::position::ChapterPosition;
use crate::types::*;

/// Checks a rule's candidate ranges before the detector accepts them.
#[derive(Debug, Clone)]
pub struct CandidateValidator {
    min_chapters: usize,
    min_body_lines: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub total_chapters: usize,
    pub headed_chapters: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Fewer chapters with a heading than required
    TooFewChapters { found: usize, required: usize },
    /// A headed chapter without enough non-blank body lines
    ThinChapter {
        heading_line_index: usize,
        body_lines: usize,
        required: usize,
    },
    /// The ranges do not form a valid, fully covering position
    InvalidPosition(PositionError),
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// One-line description of each issue, used in rejection logs and stage dumps
    pub fn describe(&self) -> Vec<String> {
        self.issues
            .iter()
            .map(|issue| match issue {
                ValidationIssue::TooFewChapters { found, required } => {
                    format!("too few chapters: {found} headed, {required} required")
                }
                ValidationIssue::ThinChapter {
                    heading_line_index,
                    body_lines,
                    required,
                } => format!(
                    "chapter at line {heading_line_index} has {body_lines} body lines, {required} required"
                ),
                ValidationIssue::InvalidPosition(e) => format!("invalid position: {e}"),
            })
            .collect()
    }

    pub fn log(&self, rule_name: &str) {
        tracing::debug!(
            "   📊 {}: {} chapters, {} headed, {} issues",
            rule_name,
            self.total_chapters,
            self.headed_chapters,
            self.issues.len()
        );
        for line in self.describe() {
            tracing::debug!("      ⚠️  {}", line);
        }
    }
}

impl Default for CandidateValidator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl CandidateValidator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            min_chapters: config.min_chapters,
            min_body_lines: config.min_body_lines,
        }
    }

    /// Validate candidate ranges against `lines`.
    ///
    /// On success returns the position built from the ranges, otherwise a
    /// report listing every issue found.
    pub fn validate(
        &self,
        lines: &[Line],
        ranges: &[ChapterRange],
    ) -> Result<ChapterPosition, ValidationReport> {
        let mut issues = Vec::new();

        let headed: Vec<&ChapterRange> = ranges
            .iter()
            .filter(|r| r.heading_line_index.is_some())
            .collect();
        if headed.len() < self.min_chapters {
            issues.push(ValidationIssue::TooFewChapters {
                found: headed.len(),
                required: self.min_chapters,
            });
        }

        for range in &headed {
            let body_lines = body_line_count(lines, range);
            if body_lines < self.min_body_lines {
                issues.push(ValidationIssue::ThinChapter {
                    heading_line_index: range.heading_line_index.unwrap_or(range.start_line_index),
                    body_lines,
                    required: self.min_body_lines,
                });
            }
        }

        let position = ChapterPosition::from_ranges(ranges.iter().cloned())
            .and_then(|p| p.check_coverage(lines.len()).map(|_| p));
        match position {
            Ok(position) if issues.is_empty() => Ok(position),
            Ok(_) => Err(self.report(issues, ranges.len(), headed.len())),
            Err(e) => {
                issues.push(ValidationIssue::InvalidPosition(e));
                Err(self.report(issues, ranges.len(), headed.len()))
            }
        }
    }

    fn report(
        &self,
        issues: Vec<ValidationIssue>,
        total_chapters: usize,
        headed_chapters: usize,
    ) -> ValidationReport {
        ValidationReport {
            issues,
            total_chapters,
            headed_chapters,
        }
    }
}

/// Non-blank lines of a range other than its heading line.
/// Indices past the end of `lines` count as nothing.
pub fn body_line_count(lines: &[Line], range: &ChapterRange) -> usize {
    if range.end_line_index < range.start_line_index {
        return 0;
    }
    lines
        .iter()
        .skip(range.start_line_index)
        .take(range.len())
        .filter(|l| Some(l.index) != range.heading_line_index && !l.is_blank())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LineClassifier;

    fn lines(raw: &[&str]) -> Vec<Line> {
        LineClassifier::default().classify_all(raw)
    }

    #[test]
    fn test_accepts_valid_candidates() {
        let lines = lines(&["CHAPTER I", "Body one.", "CHAPTER II", "Body two."]);
        let ranges = vec![
            ChapterRange::new(Some(0), 0, 1),
            ChapterRange::new(Some(2), 2, 3),
        ];
        let position = CandidateValidator::default().validate(&lines, &ranges).unwrap();
        assert_eq!(position.len(), 2);
    }

    #[test]
    fn test_reports_every_issue() {
        let lines = lines(&["CHAPTER I", "", "CHAPTER II", "Body two."]);
        let ranges = vec![ChapterRange::new(Some(0), 0, 1), ChapterRange::new(None, 2, 3)];
        let report = CandidateValidator::default()
            .validate(&lines, &ranges)
            .unwrap_err();

        assert!(!report.is_valid());
        assert!(report.issues.contains(&ValidationIssue::TooFewChapters {
            found: 1,
            required: 2
        }));
        assert!(report.issues.contains(&ValidationIssue::ThinChapter {
            heading_line_index: 0,
            body_lines: 0,
            required: 1
        }));
        assert_eq!(report.describe().len(), 2);
    }

    #[test]
    fn test_overlapping_ranges_are_invalid() {
        let lines = lines(&["CHAPTER I", "Body.", "CHAPTER II", "Body."]);
        let ranges = vec![
            ChapterRange::new(Some(0), 0, 2),
            ChapterRange::new(Some(2), 2, 3),
        ];
        let report = CandidateValidator::default()
            .validate(&lines, &ranges)
            .unwrap_err();
        assert!(matches!(
            report.issues.as_slice(),
            [ValidationIssue::InvalidPosition(PositionError::Overlap { .. })]
        ));
    }

    #[test]
    fn test_incomplete_coverage_is_invalid() {
        let lines = lines(&["CHAPTER I", "Body.", "CHAPTER II", "Body.", "More."]);
        let ranges = vec![
            ChapterRange::new(Some(0), 0, 1),
            ChapterRange::new(Some(2), 2, 3),
        ];
        let report = CandidateValidator::default()
            .validate(&lines, &ranges)
            .unwrap_err();
        assert!(matches!(
            report.issues.as_slice(),
            [ValidationIssue::InvalidPosition(PositionError::Coverage(_))]
        ));
    }

    #[test]
    fn test_body_line_count_ignores_out_of_bounds() {
        let lines = lines(&["CHAPTER I", "Body."]);
        assert_eq!(body_line_count(&lines, &ChapterRange::new(Some(0), 0, 10)), 1);
        assert_eq!(body_line_count(&lines, &ChapterRange::new(None, 5, 10)), 0);
    }
}
