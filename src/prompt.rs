//! System instructions and user prompts for each tool.

use std::collections::BTreeMap;
use std::path::Path;

/// Words a task must mention before the generator will take it on.
const CODE_KEYWORDS: [&str; 5] = ["code", "script", "function", "class", "program"];

/// Which tool is speaking to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Generator,
    Optimizer,
    Reviewer,
    Documenter,
}

impl Role {
    /// The fixed system instruction for this role.
    pub fn system_prompt(self) -> &'static str {
        match self {
            Role::Generator => {
                "You are an expert code generator who generates well-commented and documented code. \
                 You are a part of a CI/CD pipeline and your outputs are sent to a code reviewer. \
                 Reply with exactly one fenced code block whose opening fence carries the language \
                 tag, for example ```python. Put only the code with comments inside the block. \
                 Be concise and factual. If the user query is not related to code generation then \
                 state that you are a code generator only."
            }
            Role::Optimizer => {
                "You are a code optimization agent. Your task is to improve the given code by adding \
                 missing checks, exception handling, try-catch blocks, validating inputs, handling \
                 edge cases and value errors, and make it more robust against runtime errors. \
                 You must not remove essential logic. Return only the updated and optimized code \
                 in a single fenced code block."
            }
            Role::Reviewer => {
                "You are an expert code reviewer who reviews the code and checks for any linting \
                 errors and boundary conditions that may cause runtime errors, and states where \
                 try-catch-except blocks are needed to handle errors. Output a code report with a \
                 review of the code and verbose feedback on quality and robustness against boundary \
                 cases or wrong inputs, with explanation. If you find problems then quote that part \
                 of the code and give the reason why it is a problem. Start the review with \
                 'Code Review Report by supergit_reviewer:' and end with 'End of Review Report'."
            }
            Role::Documenter => {
                "You are an expert software architect and technical writer. Given a codebase, you \
                 write complete and detailed developer documentation in Markdown."
            }
        }
    }
}

/// Whether a free-text task asks for code at all.
pub fn is_code_request(task: &str) -> bool {
    let lowered = task.to_lowercase();
    CODE_KEYWORDS.iter().any(|k| lowered.contains(k))
}

pub fn generation_prompt(task: &str) -> String {
    task.trim().to_string()
}

pub fn optimization_prompt(code: &str) -> String {
    format!(
        "Please optimize the following code with all the necessary safety and error handling \
         improvements:\n\n```\n{}\n```",
        code
    )
}

pub fn review_prompt(code: &str) -> String {
    format!(
        "Please review the following code and give a review report:\n\n```\n{}\n```",
        code
    )
}

/// Build the documentation prompt over a set of files.
///
/// Each file's content is cut to `max_chars` characters so one large file
/// cannot crowd out the rest of the codebase.
pub fn documentation_prompt(files: &BTreeMap<String, String>, max_chars: usize) -> String {
    let mut prompt = String::from(
        "Given the following codebase, generate complete and detailed documentation in Markdown \
         format. Be exhaustive and helpful for developers.\n\n\
         Include the following sections:\n\
         - Project Overview\n\
         - Setup & Installation Instructions\n\
         - Explanation of Key Modules, Classes, and Functions\n\
         - Folder & File Structure with Descriptions\n\
         - How to Use (with CLI or API examples if present)\n\
         - Contribution Guidelines (if applicable)\n\
         - Testing & Debugging Instructions (if test files exist)\n\n\
         ### Codebase Contents:\n",
    );

    for (name, content) in files {
        let tag = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        prompt.push_str(&format!(
            "\n#### FILE: {}\n```{}\n{}\n```\n",
            name,
            tag,
            truncate_chars(content, max_chars)
        ));
    }

    prompt
}

/// Cut `text` to at most `max_chars` characters without splitting one.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
