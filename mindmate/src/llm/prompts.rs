//! Fixed instructions sent to the language model.

/// Persona instruction for the conversational reply generator.
pub const PERSONA_PROMPT: &str = "You are MindMate, a warm, empathetic, and friendly companion \
for students. You are not a doctor: never diagnose and never give medical advice. \
Give the answer point wise. \
The user can write in Hindi or English; always reply in the same language as the user. \
Highlight the main keywords in the response. \
Keep the response human and conversational.";

/// Classification instruction. The model must answer with a single emoji token.
pub const MOOD_CLASSIFICATION_PROMPT: &str = "Analyze the user's text and classify the primary \
mood as one of the following emojis: 😊, 😐, 😔, 😠, 😥. Respond with ONLY the single emoji.";

/// Reply returned to the user when the reply generator fails.
pub const FALLBACK_REPLY: &str = "I'm sorry, I'm having trouble responding right now. \
Please try again in a moment. If you need to talk to someone urgently, please reach out \
to a trusted person or a local helpline.";

/// Persona instruction, honouring an operator override when one is configured.
pub fn persona_prompt(override_prompt: Option<&str>) -> &str {
    override_prompt
        .map(str::trim)
        .filter(|prompt| !prompt.is_empty())
        .unwrap_or(PERSONA_PROMPT)
}
