// Keyword extraction over a categorized vocabulary plus regex patterns.
// Used by resume parsing, job analysis, ranking and ATS optimization alike.

pub mod extractor;
pub mod vocabulary;

pub use extractor::{KeywordExtractor, KeywordHit};
pub use vocabulary::Vocabulary;
