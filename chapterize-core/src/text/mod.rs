// Text preparation before classification: noise filtering and the split
// between the metadata header and the text itself.

pub mod filter;
pub mod splitter;

pub use filter::TextFilter;
pub use splitter::{SplitText, TextSplitter};
