//! Text generation provider adapters

pub mod openai_compat;

pub use openai_compat::OpenAiCompatibleProvider;
