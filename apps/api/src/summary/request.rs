//! Canonical request schema for the summary endpoint.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;

pub const MAX_BULLETS_LIMIT: u8 = 10;

/// Narrative voice of the generated summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    First,
    #[default]
    Third,
}

/// Raw POST body. `role` also accepts the legacy `persona` key.
#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default, alias = "persona")]
    pub role: Option<String>,
    #[serde(default)]
    pub resume: Option<Value>,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub emoji: bool,
    #[serde(default)]
    pub voice: Voice,
    #[serde(default)]
    pub max_bullets: Option<u32>,
}

/// A request that passed validation and is ready for prompt rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryInput {
    pub role: String,
    pub resume: Value,
    pub focus: Option<String>,
    pub skill: Option<String>,
    pub emoji: bool,
    pub voice: Voice,
    pub max_bullets: Option<u8>,
}

impl SummaryRequest {
    pub fn validate(self) -> Result<SummaryInput, AppError> {
        let role = non_blank(self.role)
            .ok_or_else(|| AppError::Validation("Missing required field: role".to_string()))?;

        let resume = self
            .resume
            .filter(|r| !is_empty_resume(r))
            .ok_or_else(|| AppError::Validation("Missing required field: resume".to_string()))?;

        let max_bullets = self
            .max_bullets
            .map(|n| n.clamp(1, MAX_BULLETS_LIMIT as u32) as u8);

        Ok(SummaryInput {
            role,
            resume,
            focus: non_blank(self.focus),
            skill: non_blank(self.skill),
            emoji: self.emoji,
            voice: self.voice,
            max_bullets,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_empty_resume(resume: &Value) -> bool {
    match resume {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<SummaryInput, AppError> {
        serde_json::from_value::<SummaryRequest>(value)
            .unwrap()
            .validate()
    }

    #[test]
    fn test_minimal_request_gets_defaults() {
        let input = parse(json!({ "role": "Recruiter", "resume": { "name": "Ada" } })).unwrap();
        assert_eq!(input.role, "Recruiter");
        assert_eq!(input.voice, Voice::Third);
        assert!(!input.emoji);
        assert!(input.focus.is_none());
        assert!(input.max_bullets.is_none());
    }

    #[test]
    fn test_persona_alias_accepted() {
        let input = parse(json!({ "persona": "Founder", "resume": "10 years of Rust" })).unwrap();
        assert_eq!(input.role, "Founder");
    }

    #[test]
    fn test_missing_role_rejected() {
        let err = parse(json!({ "resume": { "name": "Ada" } })).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("role")));
    }

    #[test]
    fn test_blank_role_rejected() {
        assert!(parse(json!({ "role": "   ", "resume": { "name": "Ada" } })).is_err());
    }

    #[test]
    fn test_empty_resume_shapes_rejected() {
        for resume in [json!(null), json!(""), json!({}), json!([])] {
            let err = parse(json!({ "role": "Recruiter", "resume": resume.clone() })).unwrap_err();
            assert!(
                matches!(err, AppError::Validation(ref m) if m.contains("resume")),
                "resume {resume} should be rejected"
            );
        }
        assert!(parse(json!({ "role": "Recruiter" })).is_err());
    }

    #[test]
    fn test_max_bullets_clamped() {
        let input = parse(json!({ "role": "r", "resume": "x", "max_bullets": 50 })).unwrap();
        assert_eq!(input.max_bullets, Some(MAX_BULLETS_LIMIT));

        let input = parse(json!({ "role": "r", "resume": "x", "max_bullets": 0 })).unwrap();
        assert_eq!(input.max_bullets, Some(1));
    }

    #[test]
    fn test_voice_and_optional_fields() {
        let input = parse(json!({
            "role": "Engineering Manager",
            "resume": "x",
            "voice": "first",
            "emoji": true,
            "focus": " Performance ",
            "skill": ""
        }))
        .unwrap();
        assert_eq!(input.voice, Voice::First);
        assert!(input.emoji);
        assert_eq!(input.focus.as_deref(), Some("Performance"));
        assert!(input.skill.is_none());
    }

    #[test]
    fn test_unknown_voice_fails_deserialization() {
        let result = serde_json::from_value::<SummaryRequest>(json!({
            "role": "r", "resume": "x", "voice": "second"
        }));
        assert!(result.is_err());
    }
}
