//! Prompt templates for the text and image collaborators.

use museum_sdk::OnboardingResponse;

/// Marker opening the user section of theme analysis prompts.
pub const USER_RESPONSES_MARKER: &str = "[User responses]";

#[must_use]
pub fn follow_up_question(content: &str) -> String {
    format!(
        "# Role\n\
         You are the memory curator of an online memorial museum. From the user's answer \
         you are about to visualize a treasured object that will be placed in their room.\n\n\
         # Task\n\
         Read the question and answer below and write exactly one follow-up question that \
         helps pin down what the object looks like.\n\n\
         # Guidelines\n\
         1. If color, material, shape or brand are missing, ask about them.\n\
         2. If the visual details are already clear, ask about the feeling the object carries.\n\
         3. Be warm and empathetic, but keep the question short and clear.\n\n\
         # Input\n\
         {content}\n\n\
         # Output\n\
         Follow-up question:"
    )
}

#[must_use]
pub fn object_metadata(content: &str) -> String {
    format!(
        "# Role\n\
         You design data that turns memories into objects for a memorial room.\n\n\
         # Task\n\
         Analyze the conversation below and produce the object's data in the JSON format shown.\n\n\
         # Constraints\n\
         1. name: a modifier plus the object's name, e.g. \"Mom's red scarf full of love\".\n\
         2. color: the object's main color as one hex code, e.g. #FF5733.\n\
         3. description: what the object means to the user, heartfelt, under 100 characters.\n\
         4. onType: exactly one of \"Wall\" (frames, clocks, things that hang) or \"Floor\" \
            (furniture, plants, things that stand).\n\
         5. visual_prompt: an English description of the object for an image model: shape, \
            color and material only, no background.\n\n\
         # Input\n\
         {content}\n\n\
         # Output Format (JSON only)\n\
         {{\n  \"name\": \"\",\n  \"color\": \"\",\n  \"description\": \"\",\n  \"onType\": \"\",\n  \"visual_prompt\": \"\"\n}}"
    )
}

#[must_use]
pub fn image(visual_prompt: &str) -> String {
    format!(
        "# Style\n\
         Isometric 3D game asset. Soft pastel colors, cute minimal design, smooth vector-like \
         rendering, soft lighting without harsh shadows, in the spirit of cozy interior \
         decoration games.\n\n\
         # Object\n\
         {visual_prompt}\n\n\
         # View\n\
         Isometric view facing left, isolated on a pure white background, no text in the \
         image, high quality detailed texture."
    )
}

pub const THEME_ANALYSIS_SYSTEM: &str = "# Role\n\
You are a space psychologist who recommends the memorial room that best fits a person's \
values and temperament.\n\n\
# Task\n\
Read the five user responses and choose the single theme below that fits them best.\n\n\
# Themes\n\
1. Childlike - innocence, family, warmth. Answers about childhood, family bonds, a pure warm heart.\n\
2. Romantic - sensibility, art, love. Emotional or artistic answers that value love and romance.\n\
3. Urban - independence, passion, sophistication. Driven, modern, achievement-oriented answers.\n\
4. Nature - nature, simplicity, serenity. Answers that seek simplicity, peace and nature.\n\
5. Memory - memories, longing, connection. Answers about past relationships, longing and connection.\n\n\
# Output (JSON only)\n\
{\"choice\": <theme number>, \"reason\": \"For someone <short warm summary of the user>, this theme feels just right.\"}";

#[must_use]
pub fn theme_analysis_user(responses: &[OnboardingResponse]) -> String {
    let body = responses
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Q{n}: {q}\nA{n}: {a}", n = i + 1, q = r.question, a = r.answer))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{USER_RESPONSES_MARKER}\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_prompt_wraps_visual_description() {
        let prompt = image("a knitted red scarf");
        assert!(prompt.contains("# Object\na knitted red scarf"));
        assert!(prompt.contains("Isometric"));
    }

    #[test]
    fn metadata_prompt_embeds_content_and_format() {
        let prompt = object_metadata("Q: favorite thing? A: grandma's clock");
        assert!(prompt.contains("grandma's clock"));
        assert!(prompt.contains("\"visual_prompt\": \"\""));
    }

    #[test]
    fn analysis_prompt_numbers_responses() {
        let prompt = theme_analysis_user(&[
            OnboardingResponse {
                question: "q1".to_owned(),
                answer: "a1".to_owned(),
            },
            OnboardingResponse {
                question: "q2".to_owned(),
                answer: "a2".to_owned(),
            },
        ]);
        assert!(prompt.starts_with(USER_RESPONSES_MARKER));
        assert!(prompt.contains("Q2: q2\nA2: a2"));
    }
}
