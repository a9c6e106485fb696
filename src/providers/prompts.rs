//! Prompt templates shared by all adapters.
//!
//! Every analysis prompt asks for a fenced JSON block so the UI can render
//! structured findings; the orchestrator itself never parses the reply.

use serde_json::Value;

use crate::types::{AnalysisType, Language};

/// System instruction sent alongside every prompt.
pub const SYSTEM_PROMPT: &str = "You are an expert software engineer and code reviewer. \
Give precise, actionable feedback and never invent code that was not provided.";

fn focus(analysis_type: AnalysisType) -> &'static str {
    match analysis_type {
        AnalysisType::General => {
            "overall code quality, readability, correctness and adherence to best practices"
        }
        AnalysisType::Security => {
            "security vulnerabilities, unsafe input handling, injection risks and secret exposure"
        }
        AnalysisType::Performance => {
            "algorithmic complexity, unnecessary allocations, blocking calls and hot paths"
        }
        AnalysisType::Maintainability => {
            "structure, naming, duplication, testability and long-term maintainability"
        }
    }
}

/// Prompt for `analyze_code`.
pub fn analysis(code: &str, language: Language, analysis_type: AnalysisType) -> String {
    format!(
        "Analyze the following {language} code, focusing on {focus}.\n\n\
         ```{language}\n{code}\n```\n\n\
         Respond with a short markdown discussion followed by a JSON block of the form:\n\
         ```json\n\
         {{\"quality_score\": <0-10>, \"issues\": [{{\"type\": \"...\", \"severity\": \"low|medium|high\", \
         \"line\": <number or null>, \"description\": \"...\", \"suggestion\": \"...\"}}], \
         \"summary\": \"...\", \"recommendations\": [\"...\"]}}\n\
         ```",
        focus = focus(analysis_type),
    )
}

/// Prompt for `explain_code`.
pub fn explanation(code: &str, language: Language) -> String {
    format!(
        "Explain what the following {language} code does, step by step, for a developer \
         who has not seen it before. Cover its purpose, the main control flow, \
         inputs and outputs, and any non-obvious behaviour.\n\n\
         ```{language}\n{code}\n```"
    )
}

/// Prompt for `suggest_improvements`.
pub fn improvements(code: &str, language: Language, context: Option<&str>) -> String {
    let mut prompt = format!(
        "Suggest concrete improvements for the following {language} code. \
         For each suggestion show the original snippet, the improved version and a one-line reason.\n\n\
         ```{language}\n{code}\n```"
    );
    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str("\n\nAdditional context from the author:\n");
        prompt.push_str(context);
    }
    prompt
}

/// Prompt for `generate_report`.
pub fn report(results: &[Value], project_info: &Value) -> String {
    let results_json =
        serde_json::to_string_pretty(results).unwrap_or_else(|_| String::from("[]"));
    let project_json =
        serde_json::to_string_pretty(project_info).unwrap_or_else(|_| String::from("{}"));
    format!(
        "Write a code review report for a project based on the analysis results below.\n\n\
         Project information:\n```json\n{project_json}\n```\n\n\
         Analysis results ({count} files):\n```json\n{results_json}\n```\n\n\
         Structure the report as: executive summary, overall quality assessment, \
         critical issues, recurring patterns, and a prioritized action plan. Use markdown.",
        count = results.len(),
    )
}
