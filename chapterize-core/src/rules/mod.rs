// Chapter detection rules. The cascade lives in engine.rs; each heuristic
// has its own file:
// - keyword_heading.rs: "CHAPTER IV", "Part Two", PROLOGUE ...
// - blank_line_block.rs: all-caps lines between blank lines
// - numeric_sequence.rs: bare numerals counting up from 1
// - full_text.rs: single chapter fallback
// - validation.rs: candidate checks applied before a rule is accepted

pub mod blank_line_block;
pub mod engine;
pub mod full_text;
pub mod keyword_heading;
pub mod numeric_sequence;
pub mod validation;

pub use engine::*;
pub use validation::{CandidateValidator, ValidationIssue, ValidationReport};
