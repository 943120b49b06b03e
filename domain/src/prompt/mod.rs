//! Prompt templates for judge and continuation calls.

pub mod template;

pub use template::PromptTemplate;
