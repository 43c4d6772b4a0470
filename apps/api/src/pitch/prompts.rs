// Prompt templates for pitch writing.

/// Pitch instruction template.
/// Replace: {untrusted_instruction}, {extra_context_rule}, {fields}
pub const PITCH_PROMPT_TEMPLATE: &str = r#"You are a career coach crafting a pitch for a job seeker applying to a position.

{untrusted_instruction}

Write a concise, compelling pitch (150-200 words) that:
1) Highlights the job seeker's enthusiasm for the role and company,
2) Aligns their skills or experience with the job requirements,
3) Reflects an understanding of the company's culture and values (infer these from the job description if not explicit),
4) Uses a professional yet engaging tone{extra_context_rule}.

Focus on making the pitch persuasive and unique to this opportunity.

{fields}"#;

/// Appended to rule 4 only when extra context was supplied.
pub const EXTRA_CONTEXT_RULE: &str =
    ",\n5) Sweetens the pitch with the extra context provided in the extra_context field";
