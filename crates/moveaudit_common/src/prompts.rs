//! Prompt templates for audit and generation requests
//!
//! Pure string construction: the caller's content is embedded verbatim,
//! never validated, truncated or escaped.

/// Which pipeline a prompt is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Audit,
    Generate,
}

/// Defect categories the audit prompt asks the model to focus on
pub const AUDIT_CHECKLIST: &[&str] = &[
    "Access control: privileged functions callable without a signer or capability check",
    "Resource lifecycle: resources created but never stored, moved or destroyed",
    "Arithmetic safety: unchecked overflow, underflow or division by zero",
    "Reentrancy-like patterns: state updated after calls into other modules",
    "Ownership and transfer correctness: objects or coins sent to the wrong owner or duplicated",
    "Disallowed idioms: deprecated or unsafe Move patterns",
    "Style and convention compliance: naming, error constants, module layout",
    "Verification annotations: missing spec blocks or aborts_if conditions",
    "Event emission completeness: state changes that emit no event",
    "Efficiency: redundant storage reads, unbounded loops, gas waste",
];

/// Example output object shown to the model
const AUDIT_OUTPUT_SHAPE: &str = r#"{
    "summary": "Brief overview of findings",
    "issues": [
        {
            "title": "Issue name",
            "severity": "Critical|High|Medium|Low",
            "description": "Detailed explanation",
            "codeSnippet": "Affected code",
            "suggestedFix": "Code example showing how to fix"
        }
    ]
}"#;

/// Build the prompt for `task` around `content`
pub fn build(task: Task, content: &str) -> String {
    match task {
        Task::Audit => build_audit_prompt(content),
        Task::Generate => build_generate_prompt(content),
    }
}

fn build_audit_prompt(code: &str) -> String {
    let checklist = AUDIT_CHECKLIST
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Analyze the following Move smart contract for security vulnerabilities:

{}

Provide a detailed security analysis in JSON format with the following structure:
{}

Focus on:
{}

Response:"#,
        code, AUDIT_OUTPUT_SHAPE, checklist
    )
}

fn build_generate_prompt(description: &str) -> String {
    format!(
        "Generate a Move smart contract based on the following description:\n\n{}\n\nProvide only the Move code as output, with no explanation.",
        description
    )
}
