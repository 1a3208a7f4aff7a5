use super::engine::{ranges_from_headings, ChapterRule};
use crate::classifier::parse_bare_numeral;
use crate::config::NumericSequenceConfig;
use crate::numerals::parse_arabic;
use crate::types::*;

/// Bare numeral lines ("1", "II.") between blank lines, kept only when they
/// count up one by one.
pub struct NumericSequenceRule {
    allow_roman: bool,
    require_start_at_one: bool,
}

impl NumericSequenceRule {
    pub fn new(config: &NumericSequenceConfig) -> Self {
        Self {
            allow_roman: config.allow_roman,
            require_start_at_one: config.require_start_at_one,
        }
    }

    fn numeral(&self, text: &str) -> Option<u32> {
        if self.allow_roman {
            parse_bare_numeral(text)
        } else {
            parse_arabic(text)
        }
    }

    /// Numeral lines with a blank line (or the start of input) above and a
    /// blank line below
    fn candidates(&self, lines: &[Line]) -> Vec<(usize, u32)> {
        lines
            .iter()
            .enumerate()
            .filter(|(i, _)| *i == 0 || lines[i - 1].is_blank())
            .filter(|(i, _)| lines.get(i + 1).is_some_and(|l| l.is_blank()))
            .filter_map(|(i, line)| self.numeral(&line.text).map(|n| (i, n)))
            .collect()
    }

    /// Longest chain n, n+1, n+2, ... in line order. Earliest chain wins ties.
    fn longest_chain(&self, candidates: &[(usize, u32)]) -> Vec<usize> {
        let mut best: Vec<usize> = Vec::new();

        for (start, &(index, value)) in candidates.iter().enumerate() {
            if self.require_start_at_one && value != 1 {
                continue;
            }
            let mut chain = vec![index];
            let mut expected = value + 1;
            for &(next_index, next_value) in &candidates[start + 1..] {
                if next_value == expected {
                    chain.push(next_index);
                    expected += 1;
                }
            }
            if chain.len() > best.len() {
                best = chain;
            }
        }

        best
    }
}

impl ChapterRule for NumericSequenceRule {
    fn name(&self) -> &str {
        "NumericSequence"
    }

    fn confidence(&self) -> f32 {
        0.5
    }

    fn scan(&self, lines: &[Line]) -> Vec<ChapterRange> {
        let candidates = self.candidates(lines);
        let headings: Vec<HeadingCandidate> = self
            .longest_chain(&candidates)
            .into_iter()
            .map(HeadingCandidate::at)
            .collect();
        ranges_from_headings(lines, &headings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LineClassifier;

    fn lines(raw: &[&str]) -> Vec<Line> {
        LineClassifier::default().classify_all(raw)
    }

    fn headings(rule: &NumericSequenceRule, lines: &[Line]) -> Vec<Option<usize>> {
        rule.scan(lines).iter().map(|r| r.heading_line_index).collect()
    }

    #[test]
    fn test_sequential_numerals() {
        let lines = lines(&["1", "", "Text one.", "", "2", "", "Text two.", "", "3", "", "Text three."]);
        let rule = NumericSequenceRule::new(&NumericSequenceConfig::default());
        assert_eq!(headings(&rule, &lines), vec![Some(0), Some(4), Some(8)]);
    }

    #[test]
    fn test_stray_numbers_are_ignored() {
        let lines = lines(&[
            "I", "", "Text.", "", "1984", "", "More text.", "", "II", "", "Text.", "", "III", "",
            "Text.",
        ]);
        let rule = NumericSequenceRule::new(&NumericSequenceConfig::default());
        assert_eq!(headings(&rule, &lines), vec![Some(0), Some(8), Some(12)]);
    }

    #[test]
    fn test_roman_can_be_disabled() {
        let lines = lines(&["I", "", "Text.", "", "II", "", "Text."]);
        let rule = NumericSequenceRule::new(&NumericSequenceConfig {
            allow_roman: false,
            ..NumericSequenceConfig::default()
        });
        assert!(rule.scan(&lines).is_empty());
    }

    #[test]
    fn test_start_at_one() {
        let lines = lines(&["Intro.", "", "5", "", "Text.", "", "6", "", "Text."]);
        let strict = NumericSequenceRule::new(&NumericSequenceConfig::default());
        assert!(strict.scan(&lines).is_empty());

        let relaxed = NumericSequenceRule::new(&NumericSequenceConfig {
            require_start_at_one: false,
            ..NumericSequenceConfig::default()
        });
        assert_eq!(headings(&relaxed, &lines), vec![None, Some(2), Some(6)]);
    }

    #[test]
    fn test_numeral_inside_paragraph_is_not_a_heading() {
        let lines = lines(&["Text before", "1", "", "Text.", "", "2", "Text."]);
        let rule = NumericSequenceRule::new(&NumericSequenceConfig::default());
        assert!(rule.scan(&lines).is_empty());
        assert!(rule.scan(&[]).is_empty());
    }
}
