pub mod analytics;
pub mod builder;
pub mod serialization;

// Re-export for easy access
pub use analytics::ChapterAnalytics;
pub use builder::BookBuilder;
pub use serialization::{ChapterRecord, ChaptersDocument, FlatDocument, OutputFormat};
