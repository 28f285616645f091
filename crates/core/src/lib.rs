//! Core library: subject taxonomy, language/subject classification, prompt
//! assembly and the note generation pipeline.

pub mod classifier;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod taxonomy;
