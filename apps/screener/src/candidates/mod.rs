// Candidate intake: file loading, regex parsing and the session batch.

pub mod batch;
pub mod loader;
pub mod parser;

pub use batch::CandidateBatchStore;
pub use parser::ResumeParser;
