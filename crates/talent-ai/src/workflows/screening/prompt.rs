use std::fmt::Write as _;

use super::domain::{CandidateCv, PreScreeningAnswer, Verdict};

/// Inputs for one screening prompt. The caller is expected to have resolved
/// the job, CV, and org instructions before assembly; absence here is a
/// programming error surfaced as [`PromptError`].
#[derive(Debug, Clone)]
pub struct PromptInputs<'a> {
    pub job_title: &'a str,
    pub job_description: &'a str,
    pub candidate_name: &'a str,
    pub cv: &'a CandidateCv,
    pub pre_screening_answers: &'a [PreScreeningAnswer],
    /// Org-wide screening-evaluation instructions (opaque configuration text).
    pub instructions: &'a str,
    /// Optional per-job secret evaluation instructions, never shown to the candidate.
    pub secret_instructions: Option<&'a str>,
}

/// Raised when a prompt input the caller must validate upstream is absent.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("job title and description are required to build a screening prompt")]
    MissingJobDetails,
    #[error("candidate CV has no sections to screen")]
    MissingCv,
    #[error("org screening instructions are not configured")]
    MissingInstructions,
}

/// Assemble the classification prompt in fixed order: role framing, job
/// details, candidate name, CV sections, optional pre-screening block, org
/// instructions, optional secret instructions, and the strict JSON output
/// directive.
pub fn build_screening_prompt(inputs: &PromptInputs<'_>) -> Result<String, PromptError> {
    if inputs.job_title.trim().is_empty() || inputs.job_description.trim().is_empty() {
        return Err(PromptError::MissingJobDetails);
    }
    if inputs.cv.sections.is_empty() {
        return Err(PromptError::MissingCv);
    }
    if inputs.instructions.trim().is_empty() {
        return Err(PromptError::MissingInstructions);
    }

    let mut prompt = String::new();
    prompt.push_str("You are a helpful AI assistant.\n");
    prompt.push_str("You are given a candidate's CV and a job description.\n");
    prompt.push_str(
        "You need to screen the candidate's CV and determine if they are a good fit for the job.\n\n",
    );

    let _ = writeln!(prompt, "Job Details:");
    let _ = writeln!(prompt, "Job Title:\n{}", inputs.job_title);
    let _ = writeln!(prompt, "Job Description:\n{}\n", inputs.job_description);

    let _ = writeln!(prompt, "Applicant CV Information:");
    let _ = writeln!(prompt, "Applicant Name: {}\n", inputs.candidate_name);

    prompt.push_str("Applicant CV:\n");
    for section in &inputs.cv.sections {
        let _ = writeln!(prompt, "{}\n{}", section.name, section.content);
    }
    prompt.push('\n');

    // Omitted entirely when the applicant answered nothing.
    if !inputs.pre_screening_answers.is_empty() {
        prompt.push_str("Pre-screening Answers Provided by Applicant:\n");
        for (index, answer) in inputs.pre_screening_answers.iter().enumerate() {
            let _ = writeln!(
                prompt,
                "{}. {}: {}",
                index + 1,
                answer.question,
                answer.answer.render()
            );
        }
        prompt.push('\n');
    }

    let _ = writeln!(prompt, "Processing Steps:\n{}", inputs.instructions.trim());
    if let Some(secret) = inputs.secret_instructions {
        if !secret.trim().is_empty() {
            let _ = writeln!(prompt, "{}", secret.trim());
        }
    }
    prompt.push('\n');

    prompt.push_str("- Format your response as JSON:\n");
    prompt.push_str("{\n");
    let _ = writeln!(
        prompt,
        "  \"result\": <Result ({})>,",
        Verdict::ALL
            .iter()
            .map(|verdict| verdict.label())
            .collect::<Vec<_>>()
            .join(" / ")
    );
    prompt.push_str("  \"reason\": <Reason>,\n");
    prompt.push_str("  \"confidence\": <AI Assessment Confidence (0-100)>,\n");
    prompt.push_str("  \"jobFitScore\": <Overall Score (0-100)>\n");
    prompt.push_str("}\n");
    prompt.push_str("- Return only the code JSON, nothing else.\n");
    prompt.push_str("- Carefully analyze the applicant's CV and job description.\n");
    prompt.push_str("- Be as accurate as possible.\n");
    prompt.push_str("- Give a detailed reason for the result; be clear, concise, and specific.\n");
    prompt
        .push_str("- Set result to \"Ineligible CV\" if the applicant's CV is not in the correct format.\n");
    prompt.push_str(
        "- Set result to \"Insufficient Data\" if the applicant's CV is missing important information.\n",
    );
    prompt.push_str("- Do not include any other text or comments.\n");
    prompt.push_str("- DO NOT include ```json or ``` around the response.\n");

    Ok(prompt)
}
