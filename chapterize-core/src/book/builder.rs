use crate::classifier::LineClassifier;
use crate::error::{ImportError, Result};
use crate::ids::IdGenerator;
use crate::position::ChapterPosition;
use crate::types::*;

/// Slices classified lines into parts and chapters along validated positions.
pub struct BookBuilder<'a> {
    classifier: &'a LineClassifier,
    ids: &'a dyn IdGenerator,
}

impl<'a> BookBuilder<'a> {
    pub fn new(classifier: &'a LineClassifier, ids: &'a dyn IdGenerator) -> Self {
        Self { classifier, ids }
    }

    /// Build one part per line sequence, using the position at the same index.
    pub fn build(
        &self,
        part_lines: &[Vec<Line>],
        part_positions: &[ChapterPosition],
    ) -> Result<Vec<DocumentPart>> {
        if part_lines.len() != part_positions.len() {
            return Err(ImportError::PartCountMismatch {
                lines: part_lines.len(),
                positions: part_positions.len(),
            });
        }

        tracing::debug!("🏗️  Building {} parts", part_lines.len());

        part_lines
            .iter()
            .zip(part_positions)
            .enumerate()
            .map(|(part_index, (lines, position))| self.build_part(part_index, lines, position))
            .collect()
    }

    fn build_part(
        &self,
        part_index: usize,
        lines: &[Line],
        position: &ChapterPosition,
    ) -> Result<DocumentPart> {
        let chapters = position
            .iter()
            .enumerate()
            .map(|(chapter_index, range)| -> Result<Chapter> {
                let slice = lines
                    .get(range.start_line_index..=range.end_line_index)
                    .filter(|_| range.start_line_index <= range.end_line_index)
                    .ok_or(ImportError::InternalConsistency {
                        part: part_index + 1,
                        chapter: chapter_index + 1,
                        start: range.start_line_index,
                        end: range.end_line_index,
                        line_count: lines.len(),
                    })?;

                Ok(Chapter {
                    id: self.ids.next_id(),
                    number: chapter_index + 1,
                    title: self.chapter_title(lines, range),
                    heading_line_index: range.heading_line_index,
                    start_line_index: range.start_line_index,
                    end_line_index: range.end_line_index,
                    lines: slice.to_vec(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DocumentPart {
            id: self.ids.next_id(),
            number: part_index + 1,
            title: None,
            chapters,
        })
    }

    fn chapter_title(&self, lines: &[Line], range: &ChapterRange) -> Option<String> {
        if range.title.is_some() {
            return range.title.clone();
        }
        let heading = lines.get(range.heading_line_index?)?;
        self.classifier.heading_title(&heading.text)
    }
}
