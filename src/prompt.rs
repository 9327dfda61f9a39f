//! Instruction text sent to the model with each photo.
//!
//! The headers and bullet format named here are the contract the
//! [`parse`](crate::feedback::parse) function depends on.

use crate::language::Language;

/// Builds the analysis prompt for the given response language.
pub fn analysis_prompt(language: Language) -> String {
    format!(
        "You are a professional photography critic. Analyze the attached photo and give \
         constructive feedback on composition, lighting, focus, color and subject.\n\
         \n\
         Respond in {name} (language code \"{code}\"), using exactly this format and nothing else:\n\
         \n\
         Positives:\n\
         - <one positive observation>\n\
         - <another positive observation>\n\
         \n\
         Suggestions:\n\
         - <one concrete improvement>\n\
         - <another concrete improvement>\n\
         \n\
         Rules:\n\
         - Keep the two headers exactly as \"Positives:\" and \"Suggestions:\" in English, \
         even when the feedback itself is in another language.\n\
         - Start every item with \"- \" on its own line.\n\
         - Give 3 to 5 items in each section.\n\
         - Separate the two sections with one blank line.\n\
         - Do not add an introduction, a conclusion or any other text.",
        name = language.name(),
        code = language.code(),
    )
}
