//! Pipeline orchestration: discover, assemble, invoke, extract, persist,
//! optionally publish. Strictly sequential, one-shot, no retries.

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::changelog::publish::{publish, CommitOptions, PublishOutcome};
use crate::changelog::{build_context, compose_prompt, discover, PipelineError};
use crate::llm::TextGenerator;

/// Body substituted when the backend responded but no text was extracted.
pub const PLACEHOLDER: &str = "No summary generated.";

/// Pipeline configuration. `commit: None` skips the publish step.
#[derive(Debug, Clone)]
pub struct ChangelogConfig {
    pub root: PathBuf,
    pub extension: String,
    pub output: PathBuf,
    pub commit: Option<CommitOptions>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            extension: "rs".to_string(),
            output: PathBuf::from("CHANGELOG_AI.md"),
            commit: None,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct ChangelogOutcome {
    pub timestamp: String,
    pub body: String,
    pub files: usize,
    pub published: Option<PublishOutcome>,
}

pub struct ChangelogPipeline {
    config: ChangelogConfig,
    generator: Box<dyn TextGenerator>,
}

impl ChangelogPipeline {
    pub fn new(config: ChangelogConfig, generator: Box<dyn TextGenerator>) -> Self {
        Self { config, generator }
    }

    /// Run the full pipeline, starting from file discovery.
    pub async fn run(&self) -> Result<ChangelogOutcome, PipelineError> {
        let files = discover::tracked_files(&self.config.root, &self.config.extension).await?;
        self.run_with_files(files).await
    }

    /// Run the pipeline over an already-discovered file list.
    pub async fn run_with_files(
        &self,
        files: Vec<PathBuf>,
    ) -> Result<ChangelogOutcome, PipelineError> {
        if files.is_empty() {
            return Err(PipelineError::NoTrackedFiles);
        }

        let context = build_context(&self.config.root, &files).await?;
        let prompt = compose_prompt(&context);

        let backend = self.generator.info();
        info!("calling {} backend (model {})", backend.name, backend.model);
        let generated = self.generator.generate(&prompt).await?;

        let body = generated
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| PLACEHOLDER.to_string());

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let output_path = self.config.root.join(&self.config.output);
        append_entry(&output_path, &timestamp, &body).await?;
        info!("summary written to {}", output_path.display());

        // The write above fixed the run's outcome; publish problems are
        // logged and swallowed.
        let published = match &self.config.commit {
            Some(options) => {
                match publish(&self.config.root, &self.config.output, options).await {
                    Ok(outcome) => Some(outcome),
                    Err(e) => {
                        warn!("changelog publish failed: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        Ok(ChangelogOutcome {
            timestamp,
            body,
            files: files.len(),
            published,
        })
    }
}

/// Append one entry, creating the file when absent.
async fn append_entry(
    path: &std::path::Path,
    timestamp: &str,
    body: &str,
) -> Result<(), PipelineError> {
    let entry = format!("\n### Commit {}\n{}\n", timestamp, body);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(entry.as_bytes()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmConfig, ProviderKind, StubProvider};
    use pretty_assertions::assert_eq;

    fn stub(response: Option<&str>) -> Box<dyn TextGenerator> {
        Box::new(StubProvider::with_response(
            LlmConfig::new(ProviderKind::Stub, "stub-model"),
            response.map(|s| s.to_string()),
        ))
    }

    fn config_in(dir: &std::path::Path) -> ChangelogConfig {
        ChangelogConfig {
            root: dir.to_path_buf(),
            ..ChangelogConfig::default()
        }
    }

    #[tokio::test]
    async fn empty_file_set_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ChangelogPipeline::new(config_in(dir.path()), stub(Some("text")));

        let result = pipeline.run_with_files(vec![]).await;
        assert!(matches!(result, Err(PipelineError::NoTrackedFiles)));
        assert!(!dir.path().join("CHANGELOG_AI.md").exists());
    }

    #[tokio::test]
    async fn successful_run_appends_timestamped_entry() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.rs"), "fn a() {}").await.unwrap();

        let pipeline = ChangelogPipeline::new(config_in(dir.path()), stub(Some("The summary.")));
        let outcome = pipeline
            .run_with_files(vec![PathBuf::from("a.rs")])
            .await
            .unwrap();

        assert_eq!(outcome.body, "The summary.");
        assert_eq!(outcome.files, 1);
        assert!(outcome.published.is_none());

        let written = tokio::fs::read_to_string(dir.path().join("CHANGELOG_AI.md"))
            .await
            .unwrap();
        assert_eq!(
            written,
            format!("\n### Commit {}\nThe summary.\n", outcome.timestamp)
        );
    }

    #[tokio::test]
    async fn extraction_miss_substitutes_the_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.rs"), "fn a() {}").await.unwrap();

        let pipeline = ChangelogPipeline::new(config_in(dir.path()), stub(None));
        let outcome = pipeline
            .run_with_files(vec![PathBuf::from("a.rs")])
            .await
            .unwrap();
        assert_eq!(outcome.body, PLACEHOLDER);

        let written = tokio::fs::read_to_string(dir.path().join("CHANGELOG_AI.md"))
            .await
            .unwrap();
        assert!(written.contains(PLACEHOLDER));
    }

    #[tokio::test]
    async fn blank_generated_text_also_substitutes_the_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.rs"), "fn a() {}").await.unwrap();

        let pipeline = ChangelogPipeline::new(config_in(dir.path()), stub(Some("  \n  ")));
        let outcome = pipeline
            .run_with_files(vec![PathBuf::from("a.rs")])
            .await
            .unwrap();
        assert_eq!(outcome.body, PLACEHOLDER);
    }

    #[tokio::test]
    async fn entries_accumulate_append_only() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.rs"), "fn a() {}").await.unwrap();

        let pipeline = ChangelogPipeline::new(config_in(dir.path()), stub(Some("first")));
        pipeline.run_with_files(vec![PathBuf::from("a.rs")]).await.unwrap();

        let pipeline = ChangelogPipeline::new(config_in(dir.path()), stub(Some("second")));
        pipeline.run_with_files(vec![PathBuf::from("a.rs")]).await.unwrap();

        let written = tokio::fs::read_to_string(dir.path().join("CHANGELOG_AI.md"))
            .await
            .unwrap();
        let first = written.find("first").unwrap();
        let second = written.find("second").unwrap();
        assert!(first < second);
        assert_eq!(written.matches("### Commit ").count(), 2);
    }

    #[tokio::test]
    async fn backend_failure_leaves_no_changelog_behind() {
        struct FailingBackend;

        #[async_trait::async_trait]
        impl TextGenerator for FailingBackend {
            async fn generate(&self, _prompt: &str) -> Result<Option<String>, crate::llm::LlmError> {
                Err(crate::llm::LlmError::Api {
                    status: 503,
                    body: "overloaded".to_string(),
                })
            }

            fn info(&self) -> crate::llm::ProviderInfo {
                crate::llm::ProviderInfo { name: "Failing", model: "none".to_string() }
            }
        }

        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.rs"), "fn a() {}").await.unwrap();

        let pipeline = ChangelogPipeline::new(config_in(dir.path()), Box::new(FailingBackend));
        let result = pipeline.run_with_files(vec![PathBuf::from("a.rs")]).await;
        assert!(matches!(result, Err(PipelineError::Llm(_))));
        assert!(!dir.path().join("CHANGELOG_AI.md").exists());
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_the_run() {
        // tempdir is not a git repository, so the publish step errors; the
        // write must still count as success.
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.rs"), "fn a() {}").await.unwrap();

        let config = ChangelogConfig {
            root: dir.path().to_path_buf(),
            commit: Some(CommitOptions::default()),
            ..ChangelogConfig::default()
        };
        let pipeline = ChangelogPipeline::new(config, stub(Some("text")));
        let outcome = pipeline
            .run_with_files(vec![PathBuf::from("a.rs")])
            .await
            .unwrap();
        assert!(outcome.published.is_none());
        assert!(dir.path().join("CHANGELOG_AI.md").exists());
    }
}
