use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Shape of the JSON written for an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The whole `ImportResult`
    #[default]
    Book,
    /// Ordered chapter records with title and text
    Chapters,
    /// Plain array of chapter texts
    Flat,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "book" => Ok(Self::Book),
            "chapters" => Ok(Self::Chapters),
            "flat" => Ok(Self::Flat),
            other => bail!("unknown output format '{other}' (expected book, chapters or flat)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub part: usize,
    pub number: usize,
    pub title: Option<String>,
    pub start_line_index: usize,
    pub end_line_index: usize,
    pub word_count: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaptersDocument {
    pub format: String,
    pub schema_version: String,
    pub metadata: DocumentMetadata,
    pub chapters: Vec<ChapterRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatDocument {
    pub format: String,
    pub chunks: Vec<String>,
}

impl ImportResult {
    pub fn to_chapters_format(&self) -> ChaptersDocument {
        let chapters = self
            .parts
            .iter()
            .flat_map(|part| {
                part.chapters.iter().map(move |chapter| ChapterRecord {
                    part: part.number,
                    number: chapter.number,
                    title: chapter.title.clone(),
                    start_line_index: chapter.start_line_index,
                    end_line_index: chapter.end_line_index,
                    word_count: chapter.word_count(),
                    text: chapter.text(),
                })
            })
            .collect();

        ChaptersDocument {
            format: "chapters".to_string(),
            schema_version: self.schema_version.clone(),
            metadata: self.metadata.clone(),
            chapters,
        }
    }

    pub fn to_flat_format(&self) -> FlatDocument {
        FlatDocument {
            format: "flat".to_string(),
            chunks: self.chapters().map(|c| c.text()).collect(),
        }
    }

    pub fn to_json(&self, format: OutputFormat) -> Result<String> {
        let json = match format {
            OutputFormat::Book => serde_json::to_string_pretty(self)?,
            OutputFormat::Chapters => serde_json::to_string_pretty(&self.to_chapters_format())?,
            OutputFormat::Flat => serde_json::to_string_pretty(&self.to_flat_format())?,
        };
        Ok(json)
    }

    pub fn save_with_format(&self, path: &str, format: OutputFormat) -> Result<()> {
        std::fs::write(path, self.to_json(format)?)?;
        Ok(())
    }
}
