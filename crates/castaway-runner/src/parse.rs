//! Tool-call parsing into typed action calls.
//!
//! Backends hand back tool calls as a name plus an arguments string that is
//! ideally a JSON object. This module repairs the common ways models break
//! that JSON, then deserializes the arguments into the matching
//! [`ActionCall`] variant. A name the engine does not know becomes
//! [`DecidedCall::Unknown`] so the engine can log it; a known name with
//! unusable arguments is dropped here.

use castaway_types::{ActionCall, DecidedCall};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::LlmError;
use crate::schema;

/// One tool call as returned by a backend, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToolCall {
    /// Tool name as given by the model.
    pub name: String,
    /// Arguments, ideally a JSON object.
    pub arguments: String,
}

/// Parse every usable call, in order.
pub fn parse_calls(raw: &[RawToolCall]) -> Vec<DecidedCall> {
    raw.iter().filter_map(parse_call).collect()
}

/// Parse one call. Returns `None` if the name is known but the arguments
/// cannot be turned into that action.
pub fn parse_call(raw: &RawToolCall) -> Option<DecidedCall> {
    let name = normalize_name(&raw.name);
    if !schema::is_known_action(&name) {
        return Some(DecidedCall::Unknown {
            name: raw.name.trim().to_owned(),
        });
    }
    match build_call(&name, &raw.arguments) {
        Ok(call) => Some(DecidedCall::Known(call)),
        Err(e) => {
            warn!(
                tool = %name,
                error = %e,
                arguments = %raw.arguments,
                "dropping tool call with unusable arguments"
            );
            None
        }
    }
}

/// Lowercase and snake-case a tool name (`Harvest-Crop` -> `harvest_crop`).
fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Tag the arguments with the action name and deserialize.
fn build_call(name: &str, arguments: &str) -> Result<ActionCall, LlmError> {
    let mut object = parse_arguments(arguments)?;
    object.insert(String::from("action"), Value::String(name.to_owned()));
    Ok(serde_json::from_value(Value::Object(object))?)
}

/// Parse an arguments string into a JSON object, trying in order:
///
/// 1. Direct parse
/// 2. Extract from a markdown code block
/// 3. Strip trailing commas
/// 4. Code block, then strip trailing commas
///
/// An empty string is an empty object.
fn parse_arguments(raw: &str) -> Result<Map<String, Value>, LlmError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Map::new());
    }

    let fenced = extract_json_from_codeblock(trimmed);
    let mut candidates: Vec<String> = vec![trimmed.to_owned()];
    if let Some(inner) = fenced {
        candidates.push(inner.to_owned());
    }
    candidates.push(strip_trailing_commas(trimmed));
    if let Some(inner) = fenced {
        candidates.push(strip_trailing_commas(inner));
    }

    for candidate in &candidates {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            return Ok(map);
        }
    }
    Err(LlmError::Response(format!("arguments are not a JSON object: {trimmed}")))
}

/// Extract the body of the first markdown code block, with or without a
/// `json` tag.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = text.get(open.checked_add(3)?..)?;
    // Skip the info string (`json`, `JSON`, ...) up to the end of the line.
    let body = match after_fence.find('\n') {
        Some(nl) if after_fence.get(..nl).is_some_and(|tag| tag.trim().chars().all(char::is_alphanumeric)) => {
            after_fence.get(nl.checked_add(1)?..)?
        }
        _ => after_fence,
    };
    let close = body.find("```")?;
    body.get(..close).map(str::trim)
}

/// Strip trailing commas before closing braces and brackets, leaving
/// string contents untouched.
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars.iter().skip(i.saturating_add(1)).find(|n| !n.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_types::{AgentId, IdMint, Position, Recipe, Resource};

    use super::*;

    fn call(name: &str, arguments: &str) -> RawToolCall {
        RawToolCall {
            name: name.to_owned(),
            arguments: arguments.to_owned(),
        }
    }

    #[test]
    fn parse_valid_move() {
        let parsed = parse_call(&call("move", r#"{"to": {"x": 3, "y": 4}}"#));
        assert_eq!(
            parsed,
            Some(DecidedCall::Known(ActionCall::Move {
                to: Position::new(3, 4)
            }))
        );
    }

    #[test]
    fn parse_give_with_agent_id() {
        let mut mint = IdMint::new(3);
        let friend: AgentId = mint.mint();
        let args = format!(r#"{{"recipient": "{friend}", "resource": "food", "quantity": 2}}"#);
        let parsed = parse_call(&call("give_resource", &args));
        assert_eq!(
            parsed,
            Some(DecidedCall::Known(ActionCall::GiveResource {
                recipient: friend,
                resource: Resource::Food,
                quantity: 2
            }))
        );
    }

    #[test]
    fn names_are_normalized() {
        let parsed = parse_call(&call(" Craft ", r#"{"recipe": "rope"}"#));
        assert_eq!(
            parsed,
            Some(DecidedCall::Known(ActionCall::Craft {
                recipe: Recipe::Rope
            }))
        );
        let parsed = parse_call(&call("Harvest-Crop", r#"{"at": {"x": 0, "y": 0}}"#));
        assert!(matches!(parsed, Some(DecidedCall::Known(ActionCall::HarvestCrop { .. }))));
    }

    #[test]
    fn unknown_name_is_kept_for_logging() {
        let parsed = parse_call(&call("fly", "{}"));
        assert_eq!(
            parsed,
            Some(DecidedCall::Unknown {
                name: String::from("fly")
            })
        );
    }

    #[test]
    fn arguments_in_code_fence_are_repaired() {
        let raw = "```json\n{\"at\": {\"x\": 1, \"y\": 2}}\n```";
        let parsed = parse_call(&call("create_crop_field", raw));
        assert_eq!(
            parsed,
            Some(DecidedCall::Known(ActionCall::CreateCropField {
                at: Position::new(1, 2)
            }))
        );
    }

    #[test]
    fn trailing_commas_are_repaired() {
        let raw = r#"{"resource": "wood", "at": {"x": 5, "y": 6,},}"#;
        let parsed = parse_call(&call("gather", raw));
        assert_eq!(
            parsed,
            Some(DecidedCall::Known(ActionCall::Gather {
                resource: Resource::Wood,
                at: Position::new(5, 6)
            }))
        );
    }

    #[test]
    fn fenced_and_trailing_comma_together() {
        let raw = "```\n{\"recipients\": [], \"message\": \"hi, there,\",}\n```";
        let parsed = parse_call(&call("communicate", raw));
        assert_eq!(
            parsed,
            Some(DecidedCall::Known(ActionCall::Communicate {
                recipients: Vec::new(),
                message: String::from("hi, there,")
            }))
        );
    }

    #[test]
    fn unusable_arguments_are_dropped() {
        assert_eq!(parse_call(&call("move", "go north please")), None);
        assert_eq!(parse_call(&call("move", r#"{"to": "north"}"#)), None);
        assert_eq!(parse_call(&call("move", "")), None);
    }

    #[test]
    fn parse_calls_keeps_order_and_skips_bad_ones() {
        let raw = vec![
            call("move", "nonsense"),
            call("craft", r#"{"recipe": "plank"}"#),
            call("dance", "{}"),
        ];
        let parsed = parse_calls(&raw);
        assert_eq!(parsed.len(), 2);
        assert!(matches!(parsed.first(), Some(DecidedCall::Known(ActionCall::Craft { .. }))));
        assert!(matches!(parsed.get(1), Some(DecidedCall::Unknown { .. })));
    }

    #[test]
    fn strip_trailing_commas_leaves_strings_alone() {
        assert_eq!(strip_trailing_commas(r#"{"a": 1, "b": 2,}"#), r#"{"a": 1, "b": 2}"#);
        assert_eq!(strip_trailing_commas("[1, 2, 3,]"), "[1, 2, 3]");
        assert_eq!(strip_trailing_commas(r#"{"m": ",}"}"#), r#"{"m": ",}"}"#);
    }

    #[test]
    fn extract_json_from_markdown() {
        assert_eq!(extract_json_from_codeblock("```json\n{\"k\": 1}\n```"), Some("{\"k\": 1}"));
        assert_eq!(extract_json_from_codeblock("```\n{\"k\": 1}\n```"), Some("{\"k\": 1}"));
        assert_eq!(extract_json_from_codeblock("no fence"), None);
    }
}
