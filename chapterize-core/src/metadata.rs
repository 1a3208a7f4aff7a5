use regex::Regex;

use crate::error::Result;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Author,
    Language,
    ReleaseDate,
    Publisher,
    Edition,
    Translator,
    Illustrator,
    Description,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        let field = match key.as_str() {
            "title" => Self::Title,
            "author" | "authors" | "by" => Self::Author,
            "language" => Self::Language,
            "release date" | "release_date" | "posting date" | "date" => Self::ReleaseDate,
            "publisher" | "published by" => Self::Publisher,
            "edition" => Self::Edition,
            "translator" | "translated by" => Self::Translator,
            "illustrator" | "illustrated by" => Self::Illustrator,
            "description" | "summary" => Self::Description,
            _ => return None,
        };
        Some(field)
    }

    fn slot<'m>(&self, metadata: &'m mut DocumentMetadata) -> &'m mut Option<String> {
        match self {
            Self::Title => &mut metadata.title,
            Self::Author => &mut metadata.author,
            Self::Language => &mut metadata.language,
            Self::ReleaseDate => &mut metadata.release_date,
            Self::Publisher => &mut metadata.publisher,
            Self::Edition => &mut metadata.edition,
            Self::Translator => &mut metadata.translator,
            Self::Illustrator => &mut metadata.illustrator,
            Self::Description => &mut metadata.description,
        }
    }
}

/// Extracts `Key: value` metadata from the lines before the text starts.
pub struct MetadataAnalyzer {
    key_value: Regex,
    trailing_annotation: Regex,
}

impl MetadataAnalyzer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            key_value: Regex::new(r"^([A-Za-z][A-Za-z _]{0,30}?)\s*:\s*(.*)$")?,
            trailing_annotation: Regex::new(r"\s*\[[^\]]*\]\s*$")?,
        })
    }

    /// Analyze the metadata region. Unknown keys are ignored; the first
    /// occurrence of a key wins. Indented lines continue the previous value.
    pub fn analyze<S: AsRef<str>>(&self, lines: &[S]) -> DocumentMetadata {
        let mut metadata = DocumentMetadata::default();
        let mut current: Option<Field> = None;

        for raw in lines {
            let raw = raw.as_ref();
            let text = raw.trim();
            if text.is_empty() {
                current = None;
                continue;
            }

            let indented = raw.starts_with(char::is_whitespace);
            if indented {
                if let Some(field) = current {
                    if let Some(value) = field.slot(&mut metadata) {
                        value.push(' ');
                        value.push_str(&self.clean(text));
                    }
                    continue;
                }
            }

            current = None;
            let Some(caps) = self.key_value.captures(text) else {
                continue;
            };
            let Some(field) = Field::from_key(&caps[1]) else {
                continue;
            };
            let value = self.clean(&caps[2]);
            let slot = field.slot(&mut metadata);
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value);
                current = Some(field);
            }
        }

        tracing::debug!(
            "📚 Metadata: title={:?}, author={:?}",
            metadata.title,
            metadata.author
        );
        metadata
    }

    fn clean(&self, value: &str) -> String {
        self.trailing_annotation.replace(value.trim(), "").trim().to_string()
    }
}

/// A short all-caps line opening the text, if it is not itself a chapter
/// heading. Used as a title of last resort.
pub fn title_from_text(lines: &[Line]) -> Option<String> {
    let first = lines.iter().find(|l| !l.is_blank())?;
    let features = first.features;
    (features.is_all_caps
        && features.is_short
        && !features.matches_keyword
        && !features.is_numeric_heading)
        .then(|| first.text.clone())
}
