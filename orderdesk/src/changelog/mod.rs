//! AI changelog pipeline.
//!
//! One-shot batch process: enumerate tracked files, assemble a truncated
//! prompt context, call the configured text-generation backend once, append
//! the result to the changelog file, optionally commit and push it.
//!
//! Failure taxonomy:
//! - precondition failures (no tracked files, missing credential) and
//!   backend failures terminate the run before any changelog write;
//! - an extraction miss is recovered with a fixed placeholder;
//! - publish failures never undo the already-completed write, and the
//!   "nothing to commit" case is recognized as a benign no-op.

pub mod context;
pub mod discover;
pub mod pipeline;
pub mod publish;

use thiserror::Error;

use crate::llm::LlmError;

/// Error type for pipeline runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no tracked files matched the extension filter")]
    NoTrackedFiles,
    #[error("file discovery failed: {0}")]
    Discover(String),
    #[error("publish failed: {0}")]
    Publish(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Io(e.to_string())
    }
}

pub use context::{build_context, compose_prompt, file_section, snippet, SNIPPET_LIMIT};
pub use discover::tracked_files;
pub use pipeline::{ChangelogConfig, ChangelogOutcome, ChangelogPipeline, PLACEHOLDER};
pub use publish::{CommitOptions, PublishOutcome};
