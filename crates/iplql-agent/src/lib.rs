//! Natural language to DuckDB SQL for the IPL dataset
//!
//! [`QueryAgent`] wraps a structured request/response contract around a
//! language model call. [`Analyst`] composes schema description, translation
//! and execution into a single `ask` per question.

mod analyst;
mod error;
mod model;
mod prompt;
mod translate;

pub use analyst::{Analyst, Answer, AskError};
pub use error::{ModelError, TranslationError};
pub use model::{CompletionRequest, LanguageModel, OpenAiModel, ResponseSchema, TEMPERATURE};
pub use prompt::{ContextBlock, SystemPromptGenerator};
pub use translate::{OutputMode, QueryAgent, TranslationRequest, TranslationResult};
