//! Output shapes and their validation
//!
//! The shapes are small and fixed, so validation is explicit per shape:
//! required fields present, types matching, enumerations constrained,
//! length bounds enforced. No reflection, no schema language.

use crate::error::{ChorusError, ChorusResult};
use crate::service::sanitize::{MAX_ITEM_CHARS, MAX_LIST_ITEMS, MAX_PROSE_CHARS};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_NAME_CHARS: usize = 100;
const MAX_SUGGESTION_CHARS: usize = 200;

/// Accepted persona tones
pub const PERSONA_TONES: &[&str] = &[
    "friendly",
    "professional",
    "casual",
    "humorous",
    "authoritative",
];

/// A generated persona profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Display name
    pub name: String,
    /// Short biography
    pub bio: String,
    /// One of [`PERSONA_TONES`]
    pub tone: String,
    /// Interest tags
    pub interests: Vec<String>,
    /// Optional writing-style notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writing_style: Option<String>,
}

/// Sentiment of analyzed content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Best-effort content analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    /// Overall sentiment
    pub sentiment: Sentiment,
    /// Free-form tone description
    pub tone: String,
    /// Detected topics
    pub topics: Vec<String>,
    /// Improvement suggestions
    pub suggestions: Vec<String>,
}

impl ContentAnalysis {
    /// The safe value returned when the model output cannot be used.
    pub fn fallback() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            tone: "unknown".to_string(),
            topics: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

/// Validate a parsed persona object.
///
/// Strict: a persona with missing fields, a tone outside the enumeration,
/// or over-long values is rejected rather than partially accepted.
pub fn validate_persona(value: &Value) -> ChorusResult<PersonaProfile> {
    let object = value
        .as_object()
        .ok_or_else(|| persona_error("output is not a JSON object"))?;

    let name = required_str(object, "name")?;
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(persona_error("name exceeds 100 characters"));
    }

    let bio = required_str(object, "bio")?;
    if bio.chars().count() > MAX_PROSE_CHARS {
        return Err(persona_error("bio exceeds 500 characters"));
    }

    let tone = required_str(object, "tone")?.to_lowercase();
    if !PERSONA_TONES.contains(&tone.as_str()) {
        return Err(persona_error(format!(
            "tone '{tone}' is not one of {PERSONA_TONES:?}"
        )));
    }

    let interests = object
        .get("interests")
        .and_then(Value::as_array)
        .ok_or_else(|| persona_error("missing required field 'interests'"))?;
    if interests.len() > MAX_LIST_ITEMS {
        return Err(persona_error("more than 10 interests"));
    }
    let interests: Vec<String> = interests
        .iter()
        .map(|item| {
            let interest = item
                .as_str()
                .ok_or_else(|| persona_error("interests must be strings"))?;
            if interest.chars().count() > MAX_ITEM_CHARS {
                return Err(persona_error("interest exceeds 100 characters"));
            }
            Ok(interest.to_string())
        })
        .collect::<ChorusResult<_>>()?;

    let writing_style = match object.get("writing_style") {
        None | Some(Value::Null) => None,
        Some(Value::String(style)) => {
            if style.chars().count() > MAX_PROSE_CHARS {
                return Err(persona_error("writing_style exceeds 500 characters"));
            }
            Some(style.clone())
        }
        Some(_) => return Err(persona_error("writing_style must be a string")),
    };

    Ok(PersonaProfile {
        name: name.to_string(),
        bio: bio.to_string(),
        tone,
        interests,
        writing_style,
    })
}

/// Validate a parsed analysis object.
///
/// Lenient where it can be: lists are clamped to their bounds and the tone
/// defaults to "unknown", but an unparsable sentiment fails validation so
/// the caller can degrade to the neutral fallback.
pub fn validate_analysis(value: &Value) -> ChorusResult<ContentAnalysis> {
    let object = value
        .as_object()
        .ok_or_else(|| ChorusError::extraction_failed("analysis", "output is not a JSON object"))?;

    let sentiment = object
        .get("sentiment")
        .and_then(Value::as_str)
        .and_then(|raw| match raw.to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        })
        .ok_or_else(|| {
            ChorusError::extraction_failed("analysis", "missing or invalid sentiment")
        })?;

    let tone = object
        .get("tone")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    Ok(ContentAnalysis {
        sentiment,
        tone,
        topics: clamped_string_list(object.get("topics"), MAX_ITEM_CHARS),
        suggestions: clamped_string_list(object.get("suggestions"), MAX_SUGGESTION_CHARS),
    })
}

/// Validate a variations array: strings only, clamped to the requested count.
pub fn validate_variations(value: &Value, count: usize) -> ChorusResult<Vec<String>> {
    let items = value.as_array().ok_or_else(|| {
        ChorusError::extraction_failed("variations", "output is not a JSON array")
    })?;

    let variations: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .filter(|item| !item.trim().is_empty())
        .map(str::to_string)
        .take(count)
        .collect();

    if variations.is_empty() {
        return Err(ChorusError::extraction_failed(
            "variations",
            "array contains no usable strings",
        ));
    }
    Ok(variations)
}

fn required_str<'a>(
    object: &'a serde_json::Map<String, Value>,
    field: &str,
) -> ChorusResult<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| persona_error(format!("missing required field '{field}'")))
}

fn persona_error(message: impl Into<String>) -> ChorusError {
    ChorusError::extraction_failed("persona", message)
}

fn clamped_string_list(value: Option<&Value>, max_chars: usize) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|item| !item.trim().is_empty())
                .take(MAX_LIST_ITEMS)
                .map(|item| item.chars().take(max_chars).collect())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn persona_value() -> Value {
        json!({
            "name": "Ada",
            "bio": "Engineer and writer.",
            "tone": "professional",
            "interests": ["mathematics", "mechanical computing"],
            "writing_style": "precise and dry"
        })
    }

    #[test]
    fn valid_persona_passes() {
        let persona = validate_persona(&persona_value()).unwrap();
        assert_eq!(persona.name, "Ada");
        assert_eq!(persona.tone, "professional");
        assert_eq!(persona.interests.len(), 2);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut value = persona_value();
        value.as_object_mut().unwrap().remove("bio");
        let err = validate_persona(&value).unwrap_err();
        assert!(err.to_string().contains("failed to generate valid persona"));
    }

    #[test]
    fn tone_outside_the_enumeration_is_rejected() {
        let mut value = persona_value();
        value["tone"] = json!("sarcastic");
        assert!(validate_persona(&value).is_err());
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let mut value = persona_value();
        value["bio"] = json!("x".repeat(600));
        assert!(validate_persona(&value).is_err());
    }

    #[test]
    fn analysis_clamps_lists_and_defaults_tone() {
        let topics: Vec<String> = (0..30).map(|i| format!("topic-{i}")).collect();
        let value = json!({"sentiment": "positive", "topics": topics});
        let analysis = validate_analysis(&value).unwrap();
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.tone, "unknown");
        assert_eq!(analysis.topics.len(), 10);
        assert!(analysis.suggestions.is_empty());
    }

    #[test]
    fn analysis_without_sentiment_fails_validation() {
        assert!(validate_analysis(&json!({"tone": "calm"})).is_err());
        assert!(validate_analysis(&json!({"sentiment": "ecstatic"})).is_err());
    }

    #[test]
    fn variations_are_clamped_to_the_requested_count() {
        let value = json!(["one", "two", "three", "four"]);
        let variations = validate_variations(&value, 2).unwrap();
        assert_eq!(variations, vec!["one", "two"]);
    }

    #[test]
    fn empty_variation_arrays_are_rejected() {
        assert!(validate_variations(&json!([]), 3).is_err());
        assert!(validate_variations(&json!(["", "  "]), 3).is_err());
    }
}
