use super::engine::ChapterRule;
use crate::types::*;

/// Fallback: the whole input as one untitled chapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullTextRule;

impl ChapterRule for FullTextRule {
    fn name(&self) -> &str {
        "FullText"
    }

    fn confidence(&self) -> f32 {
        0.0
    }

    fn scan(&self, lines: &[Line]) -> Vec<ChapterRange> {
        match lines.len() {
            0 => Vec::new(),
            n => vec![ChapterRange::new(None, 0, n - 1)],
        }
    }
}
