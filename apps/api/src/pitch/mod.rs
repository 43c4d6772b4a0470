// Pitch writing: turns job-seeker, job and company fields into a tailored pitch.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod prompts;
pub mod writer;
