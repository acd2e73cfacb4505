pub mod ats;
pub mod prompts;
pub mod service;
