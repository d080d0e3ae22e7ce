//! Prompt rendering for the two completion round trips.
//!
//! Both builders are pure functions of a [`RepositoryInput`]. Absent or empty
//! fields are replaced by a fixed placeholder; content samples are cut to a
//! fixed number of characters with no regard for word boundaries.

use std::fmt::Write as _;

use crate::models::{RepositoryInput, StageType};

/// Characters of repository content embedded in the pipeline prompt.
pub const PIPELINE_SAMPLE_CHARS: usize = 500;
/// Characters of repository content embedded in the analysis prompt.
pub const ANALYSIS_SAMPLE_CHARS: usize = 1000;

const NOT_PROVIDED: &str = "Not provided";
const AUTO_DETECT: &str = "Auto-detect";

pub const PIPELINE_SYSTEM_PROMPT: &str = "You are an expert DevOps engineer specializing in CI/CD pipeline design and comprehensive testing strategies. Always respond with valid JSON only.";
pub const ANALYSIS_SYSTEM_PROMPT: &str =
    "You are a code analysis expert. Respond with valid JSON only.";

const PIPELINE_SCHEMA_EXAMPLE: &str = r#"{
    "stages": [
        {
            "name": "Stage Name",
            "type": "stage_type",
            "description": "Description",
            "commands": ["command1", "command2"],
            "tools": ["tool1", "tool2"],
            "estimatedDuration": "duration"
        }
    ],
    "summary": "Pipeline summary",
    "recommendations": ["recommendation1", "recommendation2"]
}"#;

const ANALYSIS_SCHEMA_EXAMPLE: &str = r#"{
    "language": "detected language",
    "framework": "detected framework",
    "projectType": "project type",
    "recommendedTools": ["tool1", "tool2"]
}"#;

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(placeholder)
}

fn content_sample(input: &RepositoryInput, max_chars: usize) -> &str {
    match input.repository_content.as_deref() {
        Some(content) if !content.is_empty() => truncate_chars(content, max_chars),
        _ => NOT_PROVIDED,
    }
}

pub fn build_pipeline_prompt(input: &RepositoryInput) -> String {
    let mut s = String::new();

    s.push_str("You are an expert DevOps and Testing engineer. Analyze the following repository information and generate a comprehensive CI/CD test pipeline that covers all testing aspects.\n\n");

    s.push_str("Repository Information:\n");
    let _ = writeln!(s, "- URL: {}", or_placeholder(input.repository_url.as_deref(), NOT_PROVIDED));
    let _ = writeln!(s, "- Language: {}", or_placeholder(input.language.as_deref(), AUTO_DETECT));
    let _ = writeln!(s, "- Framework: {}", or_placeholder(input.framework.as_deref(), AUTO_DETECT));
    let _ = writeln!(s, "- Content Sample: {}", content_sample(input, PIPELINE_SAMPLE_CHARS));

    s.push_str("\nGenerate a detailed pipeline with the following test stages:\n");
    for (idx, stage) in StageType::ALL.iter().enumerate() {
        let (title, description) = stage.describe();
        let _ = writeln!(s, "{}. **{title}**: {description}", idx + 1);
    }

    let tags: Vec<&str> = StageType::ALL.iter().map(|t| t.tag()).collect();
    s.push_str("\nFor each stage, provide:\n");
    s.push_str("- Stage name\n");
    let _ = writeln!(s, "- Type ({})", tags.join(", "));
    s.push_str("- Description\n");
    s.push_str("- Specific commands to run\n");
    s.push_str("- Tools/frameworks to use\n");
    s.push_str("- Estimated duration\n");

    s.push_str("\nAlso provide:\n");
    s.push_str("- A summary of the pipeline\n");
    s.push_str("- Recommendations for improving test coverage\n");

    s.push_str("\nReturn ONLY a valid JSON object with this exact structure (no markdown, no code blocks):\n");
    s.push_str(PIPELINE_SCHEMA_EXAMPLE);
    s.push('\n');

    s
}

/// Language and framework are deliberately left out of this prompt.
pub fn build_analysis_prompt(input: &RepositoryInput) -> String {
    let mut s = String::new();

    s.push_str("Analyze this code repository and provide:\n");
    s.push_str("1. Primary programming language\n");
    s.push_str("2. Framework/technology stack\n");
    s.push_str("3. Project type (web app, API, library, etc.)\n");
    s.push_str("4. Recommended testing tools\n\n");

    let _ = writeln!(
        s,
        "Repository URL: {}",
        or_placeholder(input.repository_url.as_deref(), NOT_PROVIDED)
    );
    let _ = writeln!(s, "Code Sample: {}", content_sample(input, ANALYSIS_SAMPLE_CHARS));

    s.push_str("\nReturn ONLY valid JSON:\n");
    s.push_str(ANALYSIS_SCHEMA_EXAMPLE);
    s.push('\n');

    s
}
