use crate::types::*;

/// Statistics over the chapters of a built book
pub struct ChapterAnalytics;

impl ChapterAnalytics {
    /// Word count distribution across chapters. All zero when there are none.
    pub fn word_stats<'a, I>(chapters: I) -> ChapterWordStats
    where
        I: IntoIterator<Item = &'a Chapter>,
    {
        let mut counts: Vec<usize> = chapters.into_iter().map(|c| c.word_count()).collect();
        if counts.is_empty() {
            return ChapterWordStats::default();
        }
        counts.sort_unstable();

        let total: usize = counts.iter().sum();
        let mid = counts.len() / 2;
        let median = if counts.len() % 2 == 0 {
            (counts[mid - 1] + counts[mid]) as f32 / 2.0
        } else {
            counts[mid] as f32
        };

        ChapterWordStats {
            min: counts[0],
            max: counts[counts.len() - 1],
            mean: total as f32 / counts.len() as f32,
            median,
        }
    }

    pub fn total_words<'a, I>(chapters: I) -> usize
    where
        I: IntoIterator<Item = &'a Chapter>,
    {
        chapters.into_iter().map(|c| c.word_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LineClassifier;
    use uuid::Uuid;

    fn chapter(text: &str) -> Chapter {
        Chapter {
            id: Uuid::nil(),
            number: 1,
            title: None,
            heading_line_index: None,
            start_line_index: 0,
            end_line_index: 0,
            lines: LineClassifier::default().classify_all(&[text]),
        }
    }

    #[test]
    fn test_word_stats() {
        let chapters = vec![chapter("one two"), chapter("one two three four"), chapter("one")];
        let stats = ChapterAnalytics::word_stats(&chapters);
        assert_eq!(stats.min, 1);
        assert_eq!(stats.max, 4);
        assert!((stats.mean - 7.0 / 3.0).abs() < 1e-6);
        assert_eq!(stats.median, 2.0);
        assert_eq!(ChapterAnalytics::total_words(&chapters), 7);
    }

    #[test]
    fn test_even_median_and_empty() {
        let chapters = vec![chapter("a b"), chapter("a b c d")];
        assert_eq!(ChapterAnalytics::word_stats(&chapters).median, 3.0);
        assert_eq!(
            ChapterAnalytics::word_stats(Vec::<Chapter>::new().iter()),
            ChapterWordStats::default()
        );
    }
}
