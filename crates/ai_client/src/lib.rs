//! Remote company classifier.
//!
//! Blocking reqwest client (no Tokio runtime required). One request per
//! file, no retries. Any failure reads as "no match" so the classifier
//! chain moves on to the next strategy.

mod client;
mod prompt;

pub use client::{AiClientConfig, AiError, OpenAiClassifier};
pub use prompt::{build_prompt, parse_answer, representative_keywords, MAX_PROMPT_KEYWORDS};
