use regex::Regex;

use crate::config::FilterConfig;
use crate::error::Result;

const BOM: char = '\u{feff}';

/// Removes e-book noise from raw lines before they are classified.
pub struct TextFilter {
    annotations: Vec<Regex>,
    remove_annotations: bool,
    max_consecutive_blank_lines: usize,
}

impl TextFilter {
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let annotations = config
            .annotation_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            annotations,
            remove_annotations: config.remove_annotations,
            max_consecutive_blank_lines: config.max_consecutive_blank_lines,
        })
    }

    /// Split decoded text into filtered lines
    pub fn filter_text(&self, text: &str) -> Vec<String> {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        self.filter_lines(text.lines())
    }

    pub fn filter_lines<'a, I>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out: Vec<String> = Vec::new();
        let mut blank_run = 0usize;
        let mut removed = 0usize;

        for line in lines {
            let line = line.trim_end();
            if self.is_annotation(line) {
                removed += 1;
                continue;
            }

            if line.is_empty() {
                blank_run += 1;
                if blank_run > self.max_consecutive_blank_lines {
                    removed += 1;
                    continue;
                }
            } else {
                blank_run = 0;
            }
            out.push(line.to_string());
        }

        if removed > 0 {
            tracing::debug!("🧹 Filter removed {} lines", removed);
        }
        out
    }

    fn is_annotation(&self, line: &str) -> bool {
        let text = line.trim();
        self.remove_annotations
            && !text.is_empty()
            && self.annotations.iter().any(|r| r.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> TextFilter {
        TextFilter::new(&FilterConfig::default()).unwrap()
    }

    #[test]
    fn test_bom_and_trailing_whitespace() {
        let lines = filter().filter_text("\u{feff}Title  \r\n    indented\t\r\n");
        assert_eq!(lines, vec!["Title".to_string(), "    indented".to_string()]);
    }

    #[test]
    fn test_annotations_removed() {
        let lines = filter().filter_text("Before\n[Illustration: A ship]\n  [Footnote 1: Note]\nAfter\n[Not an annotation] text");
        assert_eq!(lines, vec!["Before", "After", "[Not an annotation] text"]);

        let keep = TextFilter::new(&FilterConfig {
            remove_annotations: false,
            ..FilterConfig::default()
        })
        .unwrap();
        assert_eq!(keep.filter_text("[Illustration]").len(), 1);
    }

    #[test]
    fn test_blank_runs_collapsed() {
        let lines = filter().filter_text("a\n\n\n\n\n\n\nb");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines.first().map(String::as_str), Some("a"));
        assert_eq!(lines.last().map(String::as_str), Some("b"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let result = TextFilter::new(&FilterConfig {
            annotation_patterns: vec!["[unclosed".to_string()],
            ..FilterConfig::default()
        });
        assert!(result.is_err());
    }
}
