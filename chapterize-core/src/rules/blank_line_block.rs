use super::engine::{ranges_from_headings, ChapterRule};
use crate::config::BlankLineBlockConfig;
use crate::types::*;

/// Short all-caps lines set off by blank lines ("THE STORM").
pub struct BlankLineBlockRule {
    min_blank_lines_before: usize,
    min_blank_lines_after: usize,
}

impl BlankLineBlockRule {
    pub fn new(config: &BlankLineBlockConfig) -> Self {
        Self {
            min_blank_lines_before: config.min_blank_lines_before,
            min_blank_lines_after: config.min_blank_lines_after,
        }
    }

    fn is_heading(&self, lines: &[Line], i: usize) -> bool {
        let line = &lines[i];
        if line.is_blank() || !line.features.is_short || !line.features.is_all_caps {
            return false;
        }

        let blanks_before = lines[..i].iter().rev().take_while(|l| l.is_blank()).count();
        let at_start = blanks_before == i;
        let blanks_after = lines[i + 1..].iter().take_while(|l| l.is_blank()).count();
        let at_end = i + 1 + blanks_after == lines.len();

        (at_start || blanks_before >= self.min_blank_lines_before)
            && !at_end
            && blanks_after >= self.min_blank_lines_after
    }
}

impl ChapterRule for BlankLineBlockRule {
    fn name(&self) -> &str {
        "BlankLineBlock"
    }

    fn confidence(&self) -> f32 {
        0.6
    }

    fn scan(&self, lines: &[Line]) -> Vec<ChapterRange> {
        let headings: Vec<HeadingCandidate> = (0..lines.len())
            .filter(|&i| self.is_heading(lines, i))
            .map(HeadingCandidate::at)
            .collect();
        ranges_from_headings(lines, &headings)
    }
}
