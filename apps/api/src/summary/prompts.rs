// Prompt constants and rendering for the summary endpoint.

use serde_json::Value;

use crate::llm_client::ChatMessage;
use crate::summary::request::{SummaryInput, Voice};

/// System prompt. Replace: {form_instruction}, {voice_instruction}, {emoji_instruction}
pub const SUMMARY_SYSTEM_TEMPLATE: &str = "You are an expert resume summarizer. \
    {form_instruction} \
    {voice_instruction} \
    Personalize the summary for the requested role. \
    Keep it specific and evidence-based, with measurable achievements where available. \
    Avoid buzzwords. Keep it honest; do not invent facts. \
    {emoji_instruction}";

const PARAGRAPH_FORM: &str =
    "Write a crisp 4-6 sentence summary about the candidate based on the provided resume.";

/// Replace: {max_bullets}
const BULLET_FORM_TEMPLATE: &str =
    "Write at most {max_bullets} concise bullet points about the candidate based on the provided resume. \
    Start each bullet with \"- \".";

const THIRD_PERSON: &str = "Write in the third person.";
const FIRST_PERSON: &str = "Write in the first person, as the candidate.";

const NO_EMOJI: &str = "Do not use emoji.";
const SPARING_EMOJI: &str = "You may use a few relevant emoji, sparingly.";

/// User prompt. Replace: {role}, {focus}, {skill_line}, {resume}
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Role: {role}
Focus: {focus}
{skill_line}Resume:
{resume}

Return only the summary text."#;

pub fn render_system_prompt(input: &SummaryInput) -> String {
    let form = match input.max_bullets {
        Some(n) => BULLET_FORM_TEMPLATE.replace("{max_bullets}", &n.to_string()),
        None => PARAGRAPH_FORM.to_string(),
    };
    let voice = match input.voice {
        Voice::First => FIRST_PERSON,
        Voice::Third => THIRD_PERSON,
    };
    let emoji = if input.emoji { SPARING_EMOJI } else { NO_EMOJI };

    SUMMARY_SYSTEM_TEMPLATE
        .replace("{form_instruction}", &form)
        .replace("{voice_instruction}", voice)
        .replace("{emoji_instruction}", emoji)
}

pub fn render_user_prompt(input: &SummaryInput) -> String {
    let skill_line = input
        .skill
        .as_deref()
        .map(|s| format!("Skill: {s}\n"))
        .unwrap_or_default();

    SUMMARY_PROMPT_TEMPLATE
        .replace("{role}", &input.role)
        .replace("{focus}", input.focus.as_deref().unwrap_or("(none)"))
        .replace("{skill_line}", &skill_line)
        .replace("{resume}", &render_resume(&input.resume))
}

/// Plain-text resumes pass through; structured ones are pretty-printed JSON.
fn render_resume(resume: &Value) -> String {
    match resume {
        Value::String(text) => text.trim().to_string(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Builds the `[system, user]` message pair sent to the completion API.
pub fn build_messages(input: &SummaryInput) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(render_system_prompt(input)),
        ChatMessage::user(render_user_prompt(input)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> SummaryInput {
        SummaryInput {
            role: "Recruiter".to_string(),
            resume: json!({ "name": "Ada", "skills": ["Rust", "Postgres"] }),
            focus: None,
            skill: None,
            emoji: false,
            voice: Voice::Third,
            max_bullets: None,
        }
    }

    #[test]
    fn test_default_system_prompt_is_paragraph_third_person() {
        let system = render_system_prompt(&input());
        assert!(system.contains("4-6 sentence"));
        assert!(system.contains("third person"));
        assert!(system.contains("Do not use emoji"));
        assert!(!system.contains('{'), "all placeholders replaced: {system}");
    }

    #[test]
    fn test_bullets_first_person_emoji() {
        let mut i = input();
        i.max_bullets = Some(3);
        i.voice = Voice::First;
        i.emoji = true;

        let system = render_system_prompt(&i);
        assert!(system.contains("at most 3 concise bullet points"));
        assert!(system.contains("first person"));
        assert!(system.contains("emoji, sparingly"));
        assert!(!system.contains("4-6 sentence"));
    }

    #[test]
    fn test_user_prompt_defaults_focus_and_omits_skill() {
        let user = render_user_prompt(&input());
        assert!(user.starts_with("Role: Recruiter\nFocus: (none)\nResume:\n"));
        assert!(!user.contains("Skill:"));
        assert!(user.contains("\"name\": \"Ada\""));
        assert!(user.ends_with("Return only the summary text."));
    }

    #[test]
    fn test_user_prompt_includes_focus_and_skill() {
        let mut i = input();
        i.focus = Some("Architecture".to_string());
        i.skill = Some("Distributed systems".to_string());

        let user = render_user_prompt(&i);
        assert!(user.contains("Focus: Architecture\nSkill: Distributed systems\nResume:"));
    }

    #[test]
    fn test_text_resume_passed_through_unquoted() {
        let mut i = input();
        i.resume = json!("  Staff engineer, 12 years.  ");
        let user = render_user_prompt(&i);
        assert!(user.contains("Resume:\nStaff engineer, 12 years.\n"));
    }

    #[test]
    fn test_build_messages_order() {
        let messages = build_messages(&input());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
    }
}
