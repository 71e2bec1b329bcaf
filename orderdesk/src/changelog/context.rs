//! Prompt-context assembly.
//!
//! Each discovered file contributes a Markdown header and at most the
//! first [`SNIPPET_LIMIT`] characters of its content. The cutoff is a hard
//! character limit, not line- or token-aware, so a snippet may end
//! mid-statement.

use std::path::{Path, PathBuf};

use crate::changelog::PipelineError;

/// Hard per-file cutoff, in characters.
pub const SNIPPET_LIMIT: usize = 1200;

/// Fixed instructional template wrapped around the assembled context. The
/// same template is used regardless of which backend is configured.
const PROMPT_TEMPLATE: &str = r#"
You are an expert technical writer documenting a Rust service workspace.
Your task is to generate clear and concise documentation for each code file provided below.

For each file:
1. Identify if it defines a **Router/Handler**, **Service**, **Provider**, **Pipeline**, or other component.
2. If it's a Router/Handler:
   - List each exposed **route** (method + path).
   - Describe what the route does in one short sentence.
3. If it's a Service, Provider, or Pipeline:
   - Summarize its **purpose** and **main functions**.
   - Describe what each function does briefly.
4. For all components:
   - Mention any **important dependencies or injected state**.
   - Note any **side effects** (file writes, event publishing, subprocess calls, etc.) if identifiable.
5. Format the output as Markdown with clear headers and bullet points.

Be concise and use developer-oriented language.
If the purpose cannot be determined, say "Purpose unclear from code snippet."

Now generate documentation for the following files:

"#;

/// First [`SNIPPET_LIMIT`] characters of `content`, cut on a character
/// boundary.
pub fn snippet(content: &str) -> &str {
    match content.char_indices().nth(SNIPPET_LIMIT) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// One per-file context section: header, truncated content, blank line.
pub fn file_section(path: &Path, content: &str) -> String {
    format!("### {}\n{}\n\n", path.display(), snippet(content))
}

/// Read every file under `root` and concatenate the sections in the given
/// (discovery) order.
pub async fn build_context(root: &Path, files: &[PathBuf]) -> Result<String, PipelineError> {
    let mut context = String::new();
    for file in files {
        let content = tokio::fs::read_to_string(root.join(file)).await?;
        context.push_str(&file_section(file, &content));
    }
    Ok(context)
}

/// Wrap the assembled context in the instructional template.
pub fn compose_prompt(context: &str) -> String {
    format!("{}{}", PROMPT_TEMPLATE, context)
}
