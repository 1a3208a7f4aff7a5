use crate::config::ClassifierConfig;
use crate::numerals::{parse_arabic, parse_number_word, parse_roman};
use crate::types::*;

/// Punctuation that separates a heading number from its title
const SEPARATORS: &[char] = &['.', ':', ';', ',', '-', '\u{2013}', '\u{2014}', ')', '_'];

/// What kind of structural keyword opened a heading line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    /// "Chapter 4", "CHAPTER IV."
    Chapter,
    /// "Part Two", "BOOK THE FIRST", "Volume 3"
    Part,
    /// Standalone front/back matter: "PROLOGUE", "Epilogue."
    Special,
}

/// A heading line broken into keyword, number and title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHeading {
    pub kind: HeadingKind,
    pub keyword: String,
    pub number: Option<u32>,
    pub number_token: Option<String>,
    pub title: Option<String>,
    /// Title text was set off from the number by punctuation
    pub separated: bool,
}

/// Tags raw lines with the structural features used by the detection rules.
///
/// Classification is pure: the same text always yields the same features.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    short_line_threshold: usize,
    chapter_keywords: Vec<String>,
    part_keywords: Vec<String>,
    special_headings: Vec<String>,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl LineClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let lower = |words: &[String]| -> Vec<String> { words.iter().map(|w| w.to_lowercase()).collect() };
        Self {
            short_line_threshold: config.short_line_threshold,
            chapter_keywords: lower(&config.chapter_keywords),
            part_keywords: lower(&config.part_keywords),
            special_headings: lower(&config.special_headings),
        }
    }

    pub fn classify(&self, index: usize, raw: &str) -> Line {
        let text = raw.trim();
        let features = if is_blank(text) {
            LineFeatures {
                is_blank: true,
                indentation: indentation(raw),
                ..LineFeatures::default()
            }
        } else {
            let keyword = self.parse_keyword_heading(text);
            LineFeatures {
                is_blank: false,
                is_all_caps: is_all_caps(text),
                is_short: self.is_short(text),
                is_numeric_heading: is_numeric(keyword.as_ref()) || parse_bare_numeral(text).is_some(),
                matches_keyword: keyword
                    .as_ref()
                    .is_some_and(|h| h.kind != HeadingKind::Special),
                indentation: indentation(raw),
            }
        };

        Line {
            index,
            raw: raw.to_string(),
            text: text.to_string(),
            features,
        }
    }

    /// Classify a whole line sequence, assigning 0-based indices
    pub fn classify_all<S: AsRef<str>>(&self, raw_lines: &[S]) -> Vec<Line> {
        raw_lines
            .iter()
            .enumerate()
            .map(|(index, raw)| self.classify(index, raw.as_ref()))
            .collect()
    }

    /// Non-blank and shorter than the configured threshold
    pub fn is_short(&self, text: &str) -> bool {
        let text = text.trim();
        !text.is_empty() && text.chars().count() < self.short_line_threshold
    }

    pub fn is_numeric_heading(&self, text: &str) -> bool {
        is_numeric(self.parse_keyword_heading(text).as_ref()) || parse_bare_numeral(text).is_some()
    }

    pub fn matches_keyword(&self, text: &str) -> bool {
        self.parse_keyword_heading(text)
            .is_some_and(|h| h.kind != HeadingKind::Special)
    }

    /// Parse "<keyword> <number>[<sep> <title>]" or a standalone special heading.
    pub fn parse_keyword_heading(&self, text: &str) -> Option<KeywordHeading> {
        let text = text.trim();
        let (first, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        let keyword = first.trim_end_matches(SEPARATORS);
        let lowered = keyword.to_lowercase();

        let kind = if self.chapter_keywords.contains(&lowered) {
            HeadingKind::Chapter
        } else if self.part_keywords.contains(&lowered) {
            HeadingKind::Part
        } else if self.special_headings.contains(&lowered) {
            HeadingKind::Special
        } else {
            return None;
        };

        if kind == HeadingKind::Special {
            // "PROLOGUE", "Epilogue: After the War", but never "Introduction to ..."
            let rest = if first.len() > keyword.len() {
                &text[keyword.len()..]
            } else {
                rest
            };
            let (title, separated) = split_title(rest);
            if title.is_some() && !separated {
                return None;
            }
            return Some(KeywordHeading {
                kind,
                keyword: keyword.to_string(),
                number: None,
                number_token: None,
                title,
                separated,
            });
        }

        let (token, number, remainder) = split_leading_numeral(rest)?;
        let (title, separated) = split_title(remainder);
        Some(KeywordHeading {
            kind,
            keyword: keyword.to_string(),
            number: Some(number),
            number_token: Some(token.to_string()),
            title,
            separated,
        })
    }

    /// Title text of a heading line with keyword and numbering stripped.
    ///
    /// "CHAPTER ONE" → "ONE", "Chapter 3: The Storm" → "The Storm",
    /// "XII." → "XII", "THE STORM" → "THE STORM".
    pub fn heading_title(&self, text: &str) -> Option<String> {
        if let Some(heading) = self.parse_keyword_heading(text) {
            return heading
                .title
                .or(heading.number_token)
                .or(Some(heading.keyword));
        }

        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some((token, _, remainder)) = split_leading_numeral(text) {
            let (title, separated) = split_title(remainder);
            match title {
                None => return Some(token.to_string()),
                Some(title) if separated => return Some(title),
                Some(_) => {}
            }
        }
        Some(text.to_string())
    }
}

fn is_numeric(heading: Option<&KeywordHeading>) -> bool {
    heading.is_some_and(|h| h.kind == HeadingKind::Chapter && h.title.is_none())
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Non-blank, contains at least one letter and no lowercase letter
pub fn is_all_caps(text: &str) -> bool {
    text.chars().any(|c| c.is_uppercase()) && !text.chars().any(|c| c.is_lowercase())
}

/// Minor words left lowercase inside a title-case line
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "from", "in", "into", "nor", "of", "on",
    "or", "the", "to", "upon", "with",
];

/// Shaped like a title rather than a sentence: all caps or title case, and
/// not ending in sentence punctuation.
///
/// "The Storm", "A Night in the Harbour" and "THE RETURN" qualify;
/// "The wind rose." does not.
pub fn is_title_like(text: &str) -> bool {
    let text = text.trim();
    if !text.chars().any(char::is_alphabetic) {
        return false;
    }
    if text.ends_with(['.', '!', '?', ',', ';', ':']) {
        return false;
    }
    if is_all_caps(text) {
        return true;
    }

    text.split_whitespace()
        .filter_map(|word| {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            word.chars().next().filter(|c| c.is_alphabetic()).map(|c| (word, c))
        })
        .enumerate()
        .all(|(i, (word, first))| {
            first.is_uppercase() || (i > 0 && MINOR_WORDS.contains(&word.to_lowercase().as_str()))
        })
}

pub fn indentation(raw: &str) -> usize {
    raw.chars().take_while(|c| c.is_whitespace()).count()
}

/// A line holding nothing but an arabic or roman numeral ("7", "VII.")
pub fn parse_bare_numeral(text: &str) -> Option<u32> {
    let text = text.trim();
    parse_arabic(text).or_else(|| parse_roman(text))
}

/// Peel a leading numeral off `text`: digits, a roman numeral, or up to
/// three number words ("the twenty first"). Returns the token as written,
/// its value and the unconsumed remainder.
fn split_leading_numeral(text: &str) -> Option<(&str, u32, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }

    let end = text
        .find(|c: char| !c.is_alphanumeric())
        .unwrap_or(text.len());
    let token = &text[..end];
    if let Some(value) = parse_arabic(token).or_else(|| parse_roman(token)) {
        return Some((token, value, &text[end..]));
    }

    // Word ends, longest phrase first
    let mut word_ends = Vec::new();
    let mut in_word = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if in_word {
                word_ends.push(i);
                in_word = false;
            }
        } else {
            in_word = true;
        }
    }
    if in_word {
        word_ends.push(text.len());
    }

    for &end in word_ends.iter().take(3).rev() {
        let phrase = text[..end].trim_end_matches(SEPARATORS);
        if let Some(value) = parse_number_word(phrase) {
            return Some((phrase, value, &text[phrase.len()..]));
        }
    }
    None
}

/// Split the remainder after a heading number into an optional title and
/// whether punctuation set it off.
fn split_title(remainder: &str) -> (Option<String>, bool) {
    let rest = remainder.trim_start();
    let separated = rest.starts_with(SEPARATORS);
    let title = rest
        .trim_start_matches(|c: char| SEPARATORS.contains(&c) || c.is_whitespace())
        .trim();
    if title.is_empty() {
        (None, separated)
    } else {
        (Some(title.to_string()), separated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_features() {
        let classifier = LineClassifier::default();
        let line = classifier.classify(4, "   ");
        assert_eq!(line.index, 4);
        assert!(line.features.is_blank);
        assert!(!line.features.is_short);
        assert!(!line.features.is_all_caps);
        assert_eq!(line.features.indentation, 3);
        assert_eq!(line.text, "");

        assert!(classifier.classify(0, "").is_blank());
    }

    #[test]
    fn test_all_caps() {
        assert!(is_all_caps("THE STORM"));
        assert!(is_all_caps("CHAPTER 12."));
        assert!(!is_all_caps("The Storm"));
        assert!(!is_all_caps("1234"));
        assert!(!is_all_caps("* * *"));
        assert!(!is_all_caps(""));
    }

    #[test]
    fn test_title_like() {
        assert!(is_title_like("The Storm"));
        assert!(is_title_like("A Night in the Harbour"));
        assert!(is_title_like("THE RETURN"));
        assert!(is_title_like("\"Home Again\""));
        assert!(!is_title_like("The wind rose."));
        assert!(!is_title_like("A dog barked"));
        assert!(!is_title_like("Who Goes There?"));
        assert!(!is_title_like("of the Sea"));
        assert!(!is_title_like("1884"));
    }

    #[test]
    fn test_short_threshold() {
        let classifier = LineClassifier::new(&ClassifierConfig {
            short_line_threshold: 10,
            ..ClassifierConfig::default()
        });
        assert!(classifier.is_short("  Nine char  "));
        assert!(!classifier.is_short("Ten chars!"));
        assert!(!classifier.is_short(""));
    }

    #[test]
    fn test_numeric_heading_forms() {
        let classifier = LineClassifier::default();
        assert!(classifier.is_numeric_heading("CHAPTER IV"));
        assert!(classifier.is_numeric_heading("Chapter 4"));
        assert!(classifier.is_numeric_heading("Chapter the First"));
        assert!(classifier.is_numeric_heading("12"));
        assert!(classifier.is_numeric_heading("XII."));
        assert!(!classifier.is_numeric_heading("Chapter 4: The Storm"));
        assert!(!classifier.is_numeric_heading("12 Angry Men"));
        assert!(!classifier.is_numeric_heading("The chapter ends"));
    }

    #[test]
    fn test_keyword_matching() {
        let classifier = LineClassifier::default();
        assert!(classifier.matches_keyword("CHAPTER ONE"));
        assert!(classifier.matches_keyword("Part II. The Return"));
        assert!(classifier.matches_keyword("BOOK THE FIRST"));
        assert!(classifier.matches_keyword("Volume 3"));
        assert!(!classifier.matches_keyword("Part of the problem was the rain."));
        assert!(!classifier.matches_keyword("PROLOGUE"));
        assert!(!classifier.matches_keyword("Chapter"));
    }

    #[test]
    fn test_parse_keyword_heading_parts() {
        let classifier = LineClassifier::default();

        let heading = classifier.parse_keyword_heading("Chapter 3: The Storm").unwrap();
        assert_eq!(heading.kind, HeadingKind::Chapter);
        assert_eq!(heading.number, Some(3));
        assert_eq!(heading.number_token.as_deref(), Some("3"));
        assert_eq!(heading.title.as_deref(), Some("The Storm"));
        assert!(heading.separated);

        let heading = classifier.parse_keyword_heading("CHAPTER TWENTY-ONE").unwrap();
        assert_eq!(heading.number, Some(21));
        assert_eq!(heading.title, None);

        let heading = classifier.parse_keyword_heading("Part Two the Return").unwrap();
        assert_eq!(heading.kind, HeadingKind::Part);
        assert_eq!(heading.number, Some(2));
        assert_eq!(heading.title.as_deref(), Some("the Return"));
        assert!(!heading.separated);
    }

    #[test]
    fn test_special_headings() {
        let classifier = LineClassifier::default();
        let heading = classifier.parse_keyword_heading("PROLOGUE").unwrap();
        assert_eq!(heading.kind, HeadingKind::Special);
        assert_eq!(heading.title, None);

        let heading = classifier.parse_keyword_heading("Epilogue: Ten Years Later").unwrap();
        assert_eq!(heading.title.as_deref(), Some("Ten Years Later"));

        assert!(classifier
            .parse_keyword_heading("Introduction to the theory of heat")
            .is_none());
    }

    #[test]
    fn test_heading_title_extraction() {
        let classifier = LineClassifier::default();
        assert_eq!(classifier.heading_title("CHAPTER ONE").as_deref(), Some("ONE"));
        assert_eq!(
            classifier.heading_title("Chapter 3: The Storm").as_deref(),
            Some("The Storm")
        );
        assert_eq!(classifier.heading_title("CHAPTER XII.").as_deref(), Some("XII"));
        assert_eq!(classifier.heading_title("XII.").as_deref(), Some("XII"));
        assert_eq!(classifier.heading_title("1. The Storm").as_deref(), Some("The Storm"));
        assert_eq!(classifier.heading_title("THE STORM").as_deref(), Some("THE STORM"));
        assert_eq!(classifier.heading_title("I went home").as_deref(), Some("I went home"));
        assert_eq!(classifier.heading_title("PROLOGUE").as_deref(), Some("PROLOGUE"));
        assert_eq!(classifier.heading_title("   "), None);
    }

    #[test]
    fn test_classify_all_assigns_indices() {
        let classifier = LineClassifier::default();
        let lines = classifier.classify_all(&["CHAPTER I", "", "It began."]);
        let indices: Vec<_> = lines.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(lines[0].features.matches_keyword);
        assert!(lines[0].features.is_numeric_heading);
        assert!(lines[0].features.is_all_caps);
        assert!(lines[0].features.is_short);
        assert!(lines[1].features.is_blank);
        assert!(!lines[2].features.is_all_caps);
    }
}
