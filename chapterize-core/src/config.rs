use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub splitter: SplitterConfig,
    /// Pipeline configuration - defines which rules to run and in what order
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub keyword_heading: KeywordHeadingConfig,
    #[serde(default)]
    pub blank_line_block: BlankLineBlockConfig,
    #[serde(default)]
    pub numeric_sequence: NumericSequenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Detection rules in priority order (most confident first)
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the rule
    pub name: String,
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl RuleConfig {
    pub fn enabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                RuleConfig::enabled("KeywordHeading"),
                RuleConfig::enabled("BlankLineBlock"),
                RuleConfig::enabled("NumericSequence"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Lines with fewer trimmed characters than this are "short"
    pub short_line_threshold: usize,
    /// Keywords introducing a chapter heading ("Chapter 4")
    pub chapter_keywords: Vec<String>,
    /// Keywords introducing a larger division ("Part II", "Book the First")
    pub part_keywords: Vec<String>,
    /// Front and back matter headings that stand on their own
    pub special_headings: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            short_line_threshold: 60,
            chapter_keywords: vec!["chapter".to_string()],
            part_keywords: vec![
                "part".to_string(),
                "book".to_string(),
                "volume".to_string(),
            ],
            special_headings: vec![
                "prologue".to_string(),
                "epilogue".to_string(),
                "preface".to_string(),
                "introduction".to_string(),
                "afterword".to_string(),
                "appendix".to_string(),
                "conclusion".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Drop single-line bracketed annotations such as "[Illustration]"
    pub remove_annotations: bool,
    /// Regex patterns matched against the trimmed line
    pub annotation_patterns: Vec<String>,
    /// Longer runs of blank lines are collapsed to this many
    pub max_consecutive_blank_lines: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            remove_annotations: true,
            annotation_patterns: vec![
                r"^\[(?i:illustration)[^\]]*\]$".to_string(),
                r"^\[(?i:footnote)[^\]]*\]$".to_string(),
            ],
            max_consecutive_blank_lines: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// A line matching any of these ends the metadata region
    pub start_markers: Vec<String>,
    /// A line matching any of these ends the text region
    pub end_markers: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            start_markers: vec![r"^\*{3}\s*START OF (THIS|THE) PROJECT GUTENBERG".to_string()],
            end_markers: vec![
                r"^\*{3}\s*END OF (THIS|THE) PROJECT GUTENBERG".to_string(),
                r"^End of (the )?Project Gutenberg".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum number of chapters carrying a heading for a positive detection
    pub min_chapters: usize,
    /// Minimum non-blank body lines each headed chapter must contain
    pub min_body_lines: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_chapters: 2,
            min_body_lines: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordHeadingConfig {
    /// Accept standalone front/back matter headings (PROLOGUE, EPILOGUE, ...)
    pub include_special_headings: bool,
    /// Discard runs of headings without body text between them
    pub suppress_table_of_contents: bool,
    /// Take the title from the following line when the heading has none
    pub detect_subtitles: bool,
    /// Longest line (in characters) accepted as a subtitle
    pub max_subtitle_length: usize,
}

impl Default for KeywordHeadingConfig {
    fn default() -> Self {
        Self {
            include_special_headings: true,
            suppress_table_of_contents: true,
            detect_subtitles: true,
            max_subtitle_length: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlankLineBlockConfig {
    /// Blank lines required above a heading (start of input counts)
    pub min_blank_lines_before: usize,
    /// Blank lines required below a heading
    pub min_blank_lines_after: usize,
}

impl Default for BlankLineBlockConfig {
    fn default() -> Self {
        Self {
            min_blank_lines_before: 1,
            min_blank_lines_after: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericSequenceConfig {
    /// Accept roman numerals as well as arabic digits
    pub allow_roman: bool,
    /// Require the sequence to start at 1 (or I)
    pub require_start_at_one: bool,
}

impl Default for NumericSequenceConfig {
    fn default() -> Self {
        Self {
            allow_roman: true,
            require_start_at_one: true,
        }
    }
}

impl ImportConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ImportConfig =
            serde_yaml::from_str(content).context("Failed to parse import config")?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!("⚠️  Failed to load config from {}, using defaults: {:#}", p, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize import config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = ImportConfig::from_yaml(
            r#"
validation:
  min_chapters: 3
pipeline:
  rules:
    - name: NumericSequence
    - name: KeywordHeading
      enabled: false
"#,
        )
        .unwrap();

        assert_eq!(config.validation.min_chapters, 3);
        assert_eq!(config.validation.min_body_lines, 1);
        assert_eq!(config.pipeline.rules.len(), 2);
        assert!(config.pipeline.rules[0].enabled);
        assert!(!config.pipeline.rules[1].enabled);
        assert_eq!(config.classifier.short_line_threshold, 60);
    }

    #[test]
    fn test_yaml_roundtrip_preserves_rule_order() {
        let config = ImportConfig::default();
        let yaml = config.to_yaml().unwrap();
        let back = ImportConfig::from_yaml(&yaml).unwrap();
        let names: Vec<_> = back.pipeline.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["KeywordHeading", "BlankLineBlock", "NumericSequence"]);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = ImportConfig::load_with_fallback(Some("/nonexistent/chapterize.yaml"));
        assert_eq!(config.validation.min_chapters, 2);
    }
}
