use serde::{Deserialize, Serialize};

use crate::error::PositionError;
use crate::types::ChapterRange;

/// Validated, ordered set of chapter ranges.
///
/// Entries are sorted by start index and never overlap. The only way to grow
/// a position is [`ChapterPosition::with_chapter`], which returns a new value
/// and rejects any entry that would break those invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterPosition {
    entries: Vec<ChapterRange>,
}

impl ChapterPosition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single untitled chapter spanning `[0, line_count - 1]`.
    /// Empty when there are no lines.
    pub fn full_text(line_count: usize) -> Self {
        match line_count {
            0 => Self::new(),
            n => Self {
                entries: vec![ChapterRange::new(None, 0, n - 1)],
            },
        }
    }

    /// Append a chapter, returning a new position.
    ///
    /// The range must be well formed, start after the current last entry, and
    /// its heading (if any) must lie in the range or on the line right before it.
    pub fn with_chapter(&self, range: ChapterRange) -> Result<Self, PositionError> {
        let (start, end) = (range.start_line_index, range.end_line_index);
        if end < start {
            return Err(PositionError::InvertedRange { start, end });
        }
        if let Some(previous) = self.entries.last() {
            if start <= previous.end_line_index {
                return Err(PositionError::Overlap {
                    start,
                    end,
                    previous_end: previous.end_line_index,
                });
            }
        }
        if let Some(heading) = range.heading_line_index {
            if heading > end || heading + 1 < start {
                return Err(PositionError::HeadingOutsideRange {
                    heading,
                    start,
                    end,
                });
            }
        }

        let mut entries = self.entries.clone();
        entries.push(range);
        Ok(Self { entries })
    }

    /// Build a position from ranges in order, validating each step.
    pub fn from_ranges<I>(ranges: I) -> Result<Self, PositionError>
    where
        I: IntoIterator<Item = ChapterRange>,
    {
        ranges
            .into_iter()
            .try_fold(Self::new(), |position, range| position.with_chapter(range))
    }

    /// Check that the entries cover `[0, line_count - 1]` exactly once,
    /// each entry starting right after the previous one ends.
    pub fn check_coverage(&self, line_count: usize) -> Result<(), PositionError> {
        let (first, last) = match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(PositionError::Coverage(format!(
                    "no chapters for {line_count} lines"
                )))
            }
        };

        if first.start_line_index != 0 {
            return Err(PositionError::Coverage(format!(
                "first chapter starts at line {} instead of 0",
                first.start_line_index
            )));
        }
        for pair in self.entries.windows(2) {
            if pair[1].start_line_index != pair[0].end_line_index + 1 {
                return Err(PositionError::Coverage(format!(
                    "gap between line {} and line {}",
                    pair[0].end_line_index, pair[1].start_line_index
                )));
            }
        }
        if last.end_line_index + 1 != line_count {
            return Err(PositionError::Coverage(format!(
                "last chapter ends at line {} but there are {} lines",
                last.end_line_index, line_count
            )));
        }
        Ok(())
    }

    pub fn entries(&self) -> &[ChapterRange] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChapterRange> {
        self.entries.iter()
    }

    /// Number of chapters that start with a detected heading
    pub fn headed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.heading_line_index.is_some())
            .count()
    }
}

impl<'a> IntoIterator for &'a ChapterPosition {
    type Item = &'a ChapterRange;
    type IntoIter = std::slice::Iter<'a, ChapterRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
