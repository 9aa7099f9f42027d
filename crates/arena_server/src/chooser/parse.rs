//! Parser for model move responses.
//!
//! A response must be a single JSON object with integer `row` and `col`
//! and an optional `reasoning` string, optionally wrapped in a markdown
//! code fence.

use arena_board::Move;
use derive_more::{Display, Error};
use serde_json::Value;
use tracing::{debug, instrument};

/// Rationale used when the model gives none.
pub const NO_REASONING: &str = "No reasoning provided";

/// A move decoded from a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMove {
    /// The proposed coordinates (not yet checked against the board).
    pub mv: Move,
    /// The model's rationale.
    pub reasoning: String,
}

/// Why a response could not be decoded into a move.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MalformedResponse {
    /// Nothing left after trimming and fence stripping.
    #[display("empty response")]
    Empty,
    /// Payload is not valid JSON.
    #[display("response is not valid JSON: {reason}")]
    InvalidJson {
        /// Decoder message.
        reason: String,
    },
    /// Payload is JSON but not an object.
    #[display("response is not a JSON object")]
    NotAnObject,
    /// A coordinate is absent or not an integer.
    #[display("missing or non-integer field `{field}`")]
    MissingField {
        /// Field name.
        field: &'static str,
    },
}

/// Returns the content of the first fenced block, or the whole text.
fn strip_fence(text: &str) -> &str {
    let text = text.trim();
    if let Some((_, rest)) = text.split_once("```json") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some((_, rest)) = text.split_once("```") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    text
}

/// Reads an integral JSON number as a coordinate.
fn coordinate(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<i32, MalformedResponse> {
    let value = object.get(field).ok_or(MalformedResponse::MissingField { field })?;
    let as_int = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX))
            .map(|f| f as i64)
    });
    as_int
        .and_then(|n| i32::try_from(n).ok())
        .ok_or(MalformedResponse::MissingField { field })
}

/// Decodes a model response into a move and rationale.
///
/// # Errors
///
/// Returns [`MalformedResponse`] when the payload is empty, is not a JSON
/// object, or lacks integer `row`/`col` fields.
#[instrument(skip(response), fields(length = response.len()))]
pub fn parse_move_response(response: &str) -> Result<ParsedMove, MalformedResponse> {
    let payload = strip_fence(response);
    if payload.is_empty() {
        return Err(MalformedResponse::Empty);
    }

    let value: Value = serde_json::from_str(payload).map_err(|e| MalformedResponse::InvalidJson {
        reason: e.to_string(),
    })?;
    let object = value.as_object().ok_or(MalformedResponse::NotAnObject)?;

    let row = coordinate(object, "row")?;
    let col = coordinate(object, "col")?;
    let reasoning = match object.get("reasoning") {
        None | Some(Value::Null) => NO_REASONING.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };

    debug!(row, col, "Parsed model move");
    Ok(ParsedMove {
        mv: Move::new(row, col),
        reasoning,
    })
}
