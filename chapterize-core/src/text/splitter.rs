use regex::Regex;

use crate::config::SplitterConfig;
use crate::error::Result;

/// Filtered lines divided into the metadata header and the text proper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitText {
    pub metadata_lines: Vec<String>,
    pub text_lines: Vec<String>,
}

/// Finds the text region between start and end markers
/// ("*** START OF THE PROJECT GUTENBERG EBOOK ..." and its END counterpart).
pub struct TextSplitter {
    start_markers: Vec<Regex>,
    end_markers: Vec<Regex>,
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>> {
    let regexes = patterns
        .iter()
        .map(|p| Regex::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(regexes)
}

impl TextSplitter {
    pub fn new(config: &SplitterConfig) -> Result<Self> {
        Ok(Self {
            start_markers: compile(&config.start_markers)?,
            end_markers: compile(&config.end_markers)?,
        })
    }

    /// Without a start marker everything is text; without an end marker the
    /// text runs to the last line. Marker lines belong to neither region.
    pub fn split(&self, lines: Vec<String>) -> SplitText {
        let start = lines
            .iter()
            .position(|l| Self::matches(&self.start_markers, l));
        let text_begin = start.map_or(0, |i| i + 1);
        let end = lines[text_begin..]
            .iter()
            .position(|l| Self::matches(&self.end_markers, l))
            .map(|i| text_begin + i);

        tracing::debug!(
            "✂️  Split markers: start={:?}, end={:?} over {} lines",
            start,
            end,
            lines.len()
        );

        let mut lines = lines;
        if let Some(end) = end {
            lines.truncate(end);
        }
        let text_lines = lines.split_off(text_begin);
        let metadata_lines = match start {
            Some(start) => {
                lines.truncate(start);
                lines
            }
            None => Vec::new(),
        };

        SplitText {
            metadata_lines,
            text_lines: trim_blank_edges(text_lines),
        }
    }

    fn matches(markers: &[Regex], line: &str) -> bool {
        let line = line.trim();
        markers.iter().any(|m| m.is_match(line))
    }
}

fn trim_blank_edges(mut lines: Vec<String>) -> Vec<String> {
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    match last {
        Some(last) => lines.truncate(last + 1),
        None => return Vec::new(),
    }
    let first = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(0);
    lines.drain(..first);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    fn splitter() -> TextSplitter {
        TextSplitter::new(&SplitterConfig::default()).unwrap()
    }

    #[test]
    fn test_gutenberg_markers() {
        let split = splitter().split(strings(&[
            "Title: The Storm",
            "Author: Jane Doe",
            "",
            "*** START OF THE PROJECT GUTENBERG EBOOK THE STORM ***",
            "",
            "CHAPTER I",
            "Text.",
            "",
            "*** END OF THE PROJECT GUTENBERG EBOOK THE STORM ***",
            "License text.",
        ]));
        assert_eq!(
            split.metadata_lines,
            strings(&["Title: The Storm", "Author: Jane Doe", ""])
        );
        assert_eq!(split.text_lines, strings(&["CHAPTER I", "Text."]));
    }

    #[test]
    fn test_no_markers_means_all_text() {
        let split = splitter().split(strings(&["", "Just text.", "More.", ""]));
        assert!(split.metadata_lines.is_empty());
        assert_eq!(split.text_lines, strings(&["Just text.", "More."]));
    }

    #[test]
    fn test_end_marker_without_start() {
        let split = splitter().split(strings(&["Text.", "End of the Project Gutenberg EBook", "Legal."]));
        assert_eq!(split.text_lines, strings(&["Text."]));
        assert!(split.metadata_lines.is_empty());
    }

    #[test]
    fn test_blank_only_text() {
        let split = splitter().split(strings(&["", "  ", ""]));
        assert!(split.text_lines.is_empty());
        assert_eq!(splitter().split(Vec::new()), SplitText::default());
    }
}
