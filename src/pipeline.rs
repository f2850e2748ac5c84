//! The four tool pipelines.
//!
//! Each run goes input -> prompt -> model call -> extraction -> artifact,
//! journaling every step. Any failure is journaled and ends the run without
//! an artifact; the caller only sees `None`.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::artifact::{read_source, Workspace};
use crate::error::{ToolError, ToolResult};
use crate::extract::extract;
use crate::journal::Journal;
use crate::llm::TextGenerator;
use crate::prompt::{self, Role};
use crate::scan;

pub const GENERATE_LOG: &str = "codegen_log.txt";
pub const OPTIMIZE_LOG: &str = "optimizer_log.txt";
pub const REVIEW_LOG: &str = "review_log.txt";
pub const DOCUMENT_LOG: &str = "documentation_log.txt";

/// Extension used when a generated block carries no language tag.
const UNTAGGED_EXTENSION: &str = "txt";

/// Everything a single tool run needs.
pub struct Session<'a> {
    pub generator: &'a dyn TextGenerator,
    pub workspace: &'a Workspace,
    pub journal: Journal,
}

impl<'a> Session<'a> {
    pub fn new(generator: &'a dyn TextGenerator, workspace: &'a Workspace, journal: Journal) -> Self {
        Self {
            generator,
            workspace,
            journal,
        }
    }

    /// Send one prompt, rejecting blank completions.
    async fn ask(&mut self, role: Role, prompt: &str) -> ToolResult<String> {
        self.journal.record(format!(
            "Sending request to {} ({})...",
            self.generator.name(),
            self.generator.model()
        ));
        debug!(?role, prompt_chars = prompt.len(), "Calling model");

        let raw = self
            .generator
            .generate(role.system_prompt(), prompt)
            .await
            .map_err(|source| ToolError::Endpoint {
                backend: self.generator.name().to_string(),
                source,
            })?;

        if raw.trim().is_empty() {
            return Err(ToolError::EmptyResponse);
        }
        self.journal.record("Response received successfully.");
        Ok(raw)
    }

    fn read_input(&mut self, path: &Path) -> ToolResult<String> {
        let code = read_source(path)?;
        self.journal
            .record(format!("Successfully read code from: {}", path.display()));
        Ok(code)
    }
}

/// Generate code for a free-text task and save it under `name`.
pub async fn run_generate(
    session: &mut Session<'_>,
    task: &str,
    name: Option<&str>,
) -> Option<PathBuf> {
    session.journal.record("Starting code generation job");
    let outcome = generate(session, task, name).await;
    finish(session, outcome, "Code generation failed", "Job completed.")
}

async fn generate(session: &mut Session<'_>, task: &str, name: Option<&str>) -> ToolResult<PathBuf> {
    session
        .journal
        .record(format!("Generating code with prompt: {}", task));
    if !prompt::is_code_request(task) {
        return Err(ToolError::Refused);
    }

    let raw = session
        .ask(Role::Generator, &prompt::generation_prompt(task))
        .await?;
    let extracted = extract(&raw);
    if extracted.is_empty() {
        return Err(ToolError::EmptyResponse);
    }
    session
        .journal
        .record(format!("Generated Code:\n{}", extracted.body));

    let hint = extracted.language.as_deref().unwrap_or(UNTAGGED_EXTENSION);
    session.journal.record(format!("Detected file type: {}", hint));
    session.journal.record("Saving file...");

    let path = session
        .workspace
        .save_generated(&extracted.body, hint, name)?;
    session
        .journal
        .record(format!("File saved successfully at: {}", path.display()));
    Ok(path)
}

/// Harden the code in `file` and save it to the optimized folder.
pub async fn run_optimize(session: &mut Session<'_>, file: &Path) -> Option<PathBuf> {
    session.journal.record("Starting code optimization job.");
    let outcome = optimize(session, file).await;
    finish(
        session,
        outcome,
        "Code optimization failed",
        "Code optimization job completed.",
    )
}

async fn optimize(session: &mut Session<'_>, file: &Path) -> ToolResult<PathBuf> {
    let code = session.read_input(file)?;
    let raw = session
        .ask(Role::Optimizer, &prompt::optimization_prompt(&code))
        .await?;

    let extracted = extract(&raw);
    if extracted.is_empty() {
        return Err(ToolError::EmptyResponse);
    }

    let path = session.workspace.save_optimized(&extracted.body, file)?;
    session
        .journal
        .record(format!("Optimized code saved at: {}", path.display()));
    Ok(path)
}

/// Review the code in `file` and save the report to the reviews folder.
pub async fn run_review(session: &mut Session<'_>, file: &Path) -> Option<PathBuf> {
    session.journal.record("Starting code review job.");
    let outcome = review(session, file).await;
    finish(
        session,
        outcome,
        "Code review failed",
        "Code review job completed.",
    )
}

async fn review(session: &mut Session<'_>, file: &Path) -> ToolResult<PathBuf> {
    let code = session.read_input(file)?;
    let raw = session
        .ask(Role::Reviewer, &prompt::review_prompt(&code))
        .await?;

    let now = session.journal.now();
    let path = session.workspace.save_review(raw.trim(), file, now)?;
    session
        .journal
        .record(format!("Review saved at: {}", path.display()));
    Ok(path)
}

/// Document every source file under `dir` into `output`.
pub async fn run_document(
    session: &mut Session<'_>,
    dir: &Path,
    output: &Path,
    max_file_chars: usize,
) -> Option<PathBuf> {
    session.journal.record("Starting documentation job.");
    let outcome = document(session, dir, output, max_file_chars).await;
    finish(
        session,
        outcome,
        "Documentation failed",
        "Documentation job completed.",
    )
}

async fn document(
    session: &mut Session<'_>,
    dir: &Path,
    output: &Path,
    max_file_chars: usize,
) -> ToolResult<PathBuf> {
    session
        .journal
        .record(format!("Scanning project directory: {}", dir.display()));

    // The tools' own journals and the previous output are not project sources.
    let exclude = [
        session.workspace.logs_dir().to_path_buf(),
        session.workspace.resolve(output),
    ];
    let files = scan::read_sources(dir, &exclude)?;
    if files.is_empty() {
        return Err(ToolError::NoSources(dir.to_path_buf()));
    }
    session
        .journal
        .record(format!("Collected {} files for documentation.", files.len()));

    let raw = session
        .ask(
            Role::Documenter,
            &prompt::documentation_prompt(&files, max_file_chars),
        )
        .await?;

    let path = session.workspace.save_document(raw.trim(), output)?;
    session
        .journal
        .record(format!("Documentation written to: {}", path.display()));
    Ok(path)
}

fn finish(
    session: &mut Session<'_>,
    outcome: ToolResult<PathBuf>,
    failure: &str,
    done: &str,
) -> Option<PathBuf> {
    let artifact = match outcome {
        Ok(path) => Some(path),
        Err(e) => {
            session.journal.record(format!("{}: {}", failure, e));
            None
        }
    };
    session.journal.record(done);
    artifact
}
