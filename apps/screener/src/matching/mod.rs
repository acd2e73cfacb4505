pub mod explanation;
pub mod fusion;
pub mod job;
pub mod prompts;
pub mod ranker;
pub mod service;
pub mod similarity;
