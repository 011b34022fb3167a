//! Prompts for LLM-backed importance scoring and summarization.

/// System prompt for importance scoring.
pub const SCORE_SYSTEM_PROMPT: &str = r#"You rate how important a piece of information is to remember long term.

Use a scale from 0 to 100:
- 0-20: small talk, greetings, transient chatter
- 21-50: mildly useful context that can be forgotten soon
- 51-69: useful details worth keeping for a while
- 70-89: durable facts, preferences, decisions, commitments
- 90-100: critical facts that must never be lost

Respond with JSON only, in the form {"score": <number>}. Do not add any other text."#;

/// System prompt for summarization ahead of archival.
pub const SUMMARIZE_SYSTEM_PROMPT: &str = r#"You condense information for long-term storage.

Rewrite the user's text as one short, self-contained sentence that keeps every
name, number and decision. Respond with the sentence only, no preamble."#;

/// Build the user message for scoring.
pub fn score_prompt(text: &str) -> String {
    format!("Rate the importance of the following information:\n\n{}", text)
}

/// Build the user message for summarization.
pub fn summarize_prompt(text: &str) -> String {
    format!("Condense the following information:\n\n{}", text)
}
