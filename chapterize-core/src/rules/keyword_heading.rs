use super::engine::{ranges_from_headings, ChapterRule};
use crate::classifier::{is_title_like, HeadingKind, LineClassifier};
use crate::config::{KeywordHeadingConfig, ValidationConfig};
use crate::types::*;

/// Full-line keyword headings: "CHAPTER IV", "Chapter 3: The Storm",
/// "BOOK THE FIRST", plus standalone front and back matter headings.
pub struct KeywordHeadingRule {
    classifier: LineClassifier,
    config: KeywordHeadingConfig,
    min_chapters: usize,
    min_body_lines: usize,
}

impl KeywordHeadingRule {
    pub fn new(
        classifier: LineClassifier,
        config: &KeywordHeadingConfig,
        validation: &ValidationConfig,
    ) -> Self {
        Self {
            classifier,
            config: config.clone(),
            min_chapters: validation.min_chapters,
            min_body_lines: validation.min_body_lines,
        }
    }

    fn is_blank_at(lines: &[Line], index: Option<usize>) -> bool {
        index.and_then(|i| lines.get(i)).map_or(true, |l| l.is_blank())
    }

    /// Collect headings by kind, in line order
    fn collect(&self, lines: &[Line]) -> Vec<(HeadingKind, HeadingCandidate)> {
        let mut found = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if line.is_blank() || !line.features.is_short {
                continue;
            }
            let Some(heading) = self.classifier.parse_keyword_heading(&line.text) else {
                continue;
            };

            let blank_before = i == 0 || Self::is_blank_at(lines, i.checked_sub(1));
            let blank_after = Self::is_blank_at(lines, Some(i + 1));

            let accepted = match heading.kind {
                HeadingKind::Special => {
                    self.config.include_special_headings && blank_before && blank_after
                }
                HeadingKind::Chapter | HeadingKind::Part => {
                    heading.title.is_none()
                        || heading.separated
                        || line.features.is_all_caps
                        || blank_after
                }
            };
            if !accepted {
                continue;
            }

            let title = match heading.kind {
                HeadingKind::Special => None,
                _ if heading.title.is_none() && self.config.detect_subtitles => {
                    self.subtitle_after(lines, i)
                }
                _ => None,
            };
            found.push((heading.kind, HeadingCandidate { line_index: i, title }));
        }

        found
    }

    /// Title on the next non-blank line: short, title-shaped, not a heading
    /// itself and followed by a blank line. A line that is just the first of
    /// several short title-shaped lines is body text, not a title.
    fn subtitle_after(&self, lines: &[Line], heading_index: usize) -> Option<String> {
        let (offset, line) = next_non_blank(lines, heading_index + 1)?;

        let followed_by_blank = lines.get(offset + 1).is_some_and(|l| l.is_blank());
        if !followed_by_blank || !self.is_subtitle_shaped(line) {
            return None;
        }
        if next_non_blank(lines, offset + 1).is_some_and(|(_, next)| self.is_subtitle_shaped(next)) {
            return None;
        }
        Some(line.text.clone())
    }

    fn is_subtitle_shaped(&self, line: &Line) -> bool {
        line.text.chars().count() <= self.config.max_subtitle_length
            && is_title_like(&line.text)
            && self.classifier.parse_keyword_heading(&line.text).is_none()
            && !line.features.is_numeric_heading
    }

    /// Drop runs of headings with no body text between them, as found in a
    /// table of contents. The last heading of a run is kept when body text
    /// follows it.
    fn suppress_table_of_contents(
        &self,
        lines: &[Line],
        headings: Vec<(HeadingKind, HeadingCandidate)>,
    ) -> Vec<(HeadingKind, HeadingCandidate)> {
        if headings.len() < 2 {
            return headings;
        }
        let threshold = self.min_body_lines.max(1);

        let tight: Vec<bool> = headings
            .windows(2)
            .map(|pair| {
                let body = lines[pair[0].1.line_index + 1..pair[1].1.line_index]
                    .iter()
                    .filter(|l| !l.is_blank())
                    .count();
                body < threshold
            })
            .collect();

        let before = headings.len();
        let kept: Vec<_> = headings
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !tight.get(*i).copied().unwrap_or(false))
            .map(|(_, h)| h)
            .collect();

        if kept.len() < before {
            tracing::debug!(
                "   📑 Suppressed {} table of contents headings",
                before - kept.len()
            );
        }
        kept
    }

    fn prepare(
        &self,
        lines: &[Line],
        all: &[(HeadingKind, HeadingCandidate)],
        primary: HeadingKind,
    ) -> Vec<(HeadingKind, HeadingCandidate)> {
        let selected: Vec<_> = all
            .iter()
            .filter(|(kind, _)| *kind == primary || *kind == HeadingKind::Special)
            .cloned()
            .collect();
        if self.config.suppress_table_of_contents {
            self.suppress_table_of_contents(lines, selected)
        } else {
            selected
        }
    }
}

fn next_non_blank(lines: &[Line], from: usize) -> Option<(usize, &Line)> {
    lines.iter().enumerate().skip(from).find(|(_, l)| !l.is_blank())
}

fn count_kind(headings: &[(HeadingKind, HeadingCandidate)], kind: HeadingKind) -> usize {
    headings.iter().filter(|(k, _)| *k == kind).count()
}

impl ChapterRule for KeywordHeadingRule {
    fn name(&self) -> &str {
        "KeywordHeading"
    }

    fn confidence(&self) -> f32 {
        0.9
    }

    fn scan(&self, lines: &[Line]) -> Vec<ChapterRange> {
        let all = self.collect(lines);
        if all.is_empty() {
            return Vec::new();
        }

        // Chapter keywords win unless only part keywords are numerous enough
        let chapters = self.prepare(lines, &all, HeadingKind::Chapter);
        let selected = if count_kind(&chapters, HeadingKind::Chapter) >= self.min_chapters {
            chapters
        } else {
            let parts = self.prepare(lines, &all, HeadingKind::Part);
            if count_kind(&parts, HeadingKind::Part) >= self.min_chapters {
                parts
            } else {
                chapters
            }
        };

        let candidates: Vec<HeadingCandidate> = selected.into_iter().map(|(_, h)| h).collect();
        ranges_from_headings(lines, &candidates)
    }
}
