use std::path::PathBuf;

use clap::Parser;

use orderdesk::changelog::{ChangelogConfig, ChangelogPipeline, CommitOptions, PublishOutcome};
use orderdesk::llm::{LlmConfig, ProviderFactory, ProviderKind};

#[derive(Parser)]
#[command(name = "orderdesk-changelog")]
#[command(version)]
#[command(about = "Append an AI-generated summary of tracked sources to the changelog")]
struct Cli {
    /// Backend to call: hf-inference, hf-seq2seq, plain-text, openai, gemini or stub.
    #[arg(long, default_value = "hf-inference")]
    provider: String,

    #[arg(long, default_value = "mistralai/Mistral-7B-Instruct-v0.2")]
    model: String,

    /// Override the provider's default endpoint.
    #[arg(long)]
    base_url: Option<String>,

    /// Environment variable holding the API key; defaults per provider
    /// (HF_TOKEN, OPENAI_API_KEY, GEMINI_API_KEY).
    #[arg(long)]
    api_key_env: Option<String>,

    /// Repository root to discover tracked files in.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Extension filter for tracked files, without the leading dot.
    #[arg(long, default_value = "rs")]
    ext: String,

    /// Changelog file, relative to the root.
    #[arg(long, default_value = "CHANGELOG_AI.md")]
    output: PathBuf,

    #[arg(long)]
    max_new_tokens: Option<u32>,

    #[arg(long, default_value = "30")]
    timeout_seconds: u64,

    /// Commit the changelog after a successful write.
    #[arg(long)]
    commit: bool,

    /// Push after committing.
    #[arg(long)]
    push: bool,

    #[arg(long, default_value = "orderdesk-bot")]
    commit_author: String,

    #[arg(long, default_value = "orderdesk-bot@users.noreply.github.com")]
    commit_email: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let provider: ProviderKind = cli.provider.parse().map_err(|e| format!("{}", e))?;

    let api_key = match cli
        .api_key_env
        .as_deref()
        .or_else(|| provider.default_api_key_env())
    {
        Some(env_name) => match std::env::var(env_name) {
            Ok(value) => Some(value),
            Err(_) => {
                return Err(format!(
                    "{} is not set. Please add it to your environment or CI secrets.",
                    env_name
                ))
            }
        },
        None => None,
    };

    let llm_config = LlmConfig {
        provider,
        model: cli.model,
        api_key,
        base_url: cli.base_url,
        max_new_tokens: cli.max_new_tokens,
        timeout_seconds: Some(cli.timeout_seconds),
    };
    let generator = ProviderFactory::create(llm_config).map_err(|e| format!("{}", e))?;

    let commit = cli.commit.then(|| CommitOptions {
        author: cli.commit_author,
        email: cli.commit_email,
        push: cli.push,
        ..CommitOptions::default()
    });

    let config = ChangelogConfig {
        root: cli.root,
        extension: cli.ext,
        output: cli.output.clone(),
        commit,
    };

    let pipeline = ChangelogPipeline::new(config, generator);
    let outcome = pipeline.run().await.map_err(|e| format!("{}", e))?;

    println!(
        "Summarized {} files into {}",
        outcome.files,
        cli.output.display()
    );
    if let Some(PublishOutcome::NothingToCommit) = outcome.published {
        println!("Changelog unchanged, nothing to commit.");
    }
    println!("\n--- AI summary ---\n{}", outcome.body);
    Ok(())
}
