//! Interaction behavior of a placed object and its payload.
//!
//! On the wire the behavior travels as `itemFunction` and the payload as
//! `additionalData`. Internally the pair is a single tagged union, so a stored
//! object can never carry a payload that does not belong to its behavior.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Wire path of the payload, used as the prefix of validation error fields.
pub const PAYLOAD_FIELD: &str = "additionalData";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    Gallery,
    Link,
    Board,
}

impl InteractionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gallery => "Gallery",
            Self::Link => "Link",
            Self::Board => "Board",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = InteractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Gallery" => Ok(Self::Gallery),
            "Link" => Ok(Self::Link),
            "Board" => Ok(Self::Board),
            other => Err(InteractionError::new(
                "itemFunction",
                format!("unknown item function '{other}', expected Gallery, Link, Board or null"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPayload {
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardItem {
    pub writer: String,
    pub text: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardData {
    pub title: String,
    pub description: String,
    pub items: Vec<BoardItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPayload {
    pub data: BoardData,
}

/// Behavior plus the payload that belongs to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    /// No interactivity; the payload is always empty.
    #[default]
    None,
    /// Frontend-defined gallery settings.
    Gallery(Map<String, Value>),
    Link(LinkPayload),
    Board(BoardPayload),
}

/// Payload does not match its behavior. `field` is the wire path of the
/// offending value, e.g. `additionalData.data.items[1].writer`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct InteractionError {
    pub field: String,
    pub message: String,
}

impl InteractionError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Interaction {
    /// Builds the union from its wire parts, rejecting payloads whose shape
    /// does not fit the behavior. A JSON `null` payload counts as absent.
    ///
    /// # Errors
    /// Returns [`InteractionError`] naming the first offending field.
    pub fn from_parts(
        kind: Option<InteractionKind>,
        payload: Option<&Value>,
    ) -> Result<Self, InteractionError> {
        let payload = payload.filter(|v| !v.is_null());

        match kind {
            None => match payload {
                None => Ok(Self::None),
                Some(Value::Object(map)) if map.is_empty() => Ok(Self::None),
                Some(_) => Err(InteractionError::new(
                    PAYLOAD_FIELD,
                    "must be empty when itemFunction is null",
                )),
            },
            Some(InteractionKind::Gallery) => match payload {
                None => Ok(Self::Gallery(Map::new())),
                Some(Value::Object(map)) => Ok(Self::Gallery(map.clone())),
                Some(_) => Err(InteractionError::new(
                    PAYLOAD_FIELD,
                    "must be an object for Gallery",
                )),
            },
            Some(InteractionKind::Link) => {
                let map = require_object(payload, "must contain a non-empty link for Link")?;
                let link = string_field(map, "link", &format!("{PAYLOAD_FIELD}.link"), false)?;
                Ok(Self::Link(LinkPayload { link }))
            }
            Some(InteractionKind::Board) => {
                let map = require_object(payload, "must contain board data for Board")?;
                parse_board(map).map(Self::Board)
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<InteractionKind> {
        match self {
            Self::None => None,
            Self::Gallery(_) => Some(InteractionKind::Gallery),
            Self::Link(_) => Some(InteractionKind::Link),
            Self::Board(_) => Some(InteractionKind::Board),
        }
    }

    /// Payload in its wire form; `{}` when there is none.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::None => Value::Object(Map::new()),
            Self::Gallery(map) => Value::Object(map.clone()),
            Self::Link(link) => json!({ "link": link.link }),
            Self::Board(board) => {
                let items: Vec<Value> = board
                    .data
                    .items
                    .iter()
                    .map(|item| {
                        json!({
                            "writer": item.writer,
                            "text": item.text,
                            "color": item.color,
                        })
                    })
                    .collect();
                json!({
                    "data": {
                        "title": board.data.title,
                        "description": board.data.description,
                        "items": items,
                    }
                })
            }
        }
    }
}

fn require_object<'a>(
    payload: Option<&'a Value>,
    message: &str,
) -> Result<&'a Map<String, Value>, InteractionError> {
    payload
        .and_then(Value::as_object)
        .ok_or_else(|| InteractionError::new(PAYLOAD_FIELD, message))
}

fn string_field(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
    allow_empty: bool,
) -> Result<String, InteractionError> {
    match map.get(key).and_then(Value::as_str) {
        Some(s) if allow_empty || !s.trim().is_empty() => Ok(s.to_owned()),
        Some(_) => Err(InteractionError::new(path, "must not be empty")),
        None => Err(InteractionError::new(path, "must be a string")),
    }
}

fn parse_board(map: &Map<String, Value>) -> Result<BoardPayload, InteractionError> {
    let data_path = format!("{PAYLOAD_FIELD}.data");
    let data = map
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| InteractionError::new(&data_path, "must be an object"))?;

    let title = string_field(data, "title", &format!("{data_path}.title"), true)?;
    let description = string_field(data, "description", &format!("{data_path}.description"), true)?;

    let items_path = format!("{data_path}.items");
    let raw_items = data
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| InteractionError::new(&items_path, "must be an array"))?;

    let mut items = Vec::with_capacity(raw_items.len());
    for (index, raw) in raw_items.iter().enumerate() {
        let item_path = format!("{items_path}[{index}]");
        let item = raw
            .as_object()
            .ok_or_else(|| InteractionError::new(&item_path, "must be an object"))?;
        items.push(BoardItem {
            writer: string_field(item, "writer", &format!("{item_path}.writer"), false)?,
            text: string_field(item, "text", &format!("{item_path}.text"), false)?,
            color: string_field(item, "color", &format!("{item_path}.color"), false)?,
        });
    }

    Ok(BoardPayload {
        data: BoardData {
            title,
            description,
            items,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_behavior_accepts_absent_null_and_empty_object() {
        assert_eq!(Interaction::from_parts(None, None).unwrap(), Interaction::None);
        assert_eq!(
            Interaction::from_parts(None, Some(&Value::Null)).unwrap(),
            Interaction::None
        );
        assert_eq!(
            Interaction::from_parts(None, Some(&json!({}))).unwrap(),
            Interaction::None
        );
    }

    #[test]
    fn null_behavior_rejects_any_payload() {
        let err = Interaction::from_parts(None, Some(&json!({ "x": 1 }))).unwrap_err();
        assert_eq!(err.field, "additionalData");
    }

    #[test]
    fn link_requires_non_empty_link() {
        let ok = Interaction::from_parts(
            Some(InteractionKind::Link),
            Some(&json!({ "link": "https://example.com" })),
        )
        .unwrap();
        assert_eq!(ok.payload(), json!({ "link": "https://example.com" }));

        let empty = Interaction::from_parts(Some(InteractionKind::Link), Some(&json!({ "link": "  " })))
            .unwrap_err();
        assert_eq!(empty.field, "additionalData.link");

        let wrong_shape =
            Interaction::from_parts(Some(InteractionKind::Link), Some(&json!({ "url": "x" })))
                .unwrap_err();
        assert_eq!(wrong_shape.field, "additionalData.link");

        let missing = Interaction::from_parts(Some(InteractionKind::Link), None).unwrap_err();
        assert_eq!(missing.field, "additionalData");
    }

    #[test]
    fn board_rejects_whole_write_on_single_bad_item() {
        let payload = json!({
            "data": {
                "title": "Guestbook",
                "description": "",
                "items": [
                    { "writer": "Mina", "text": "Miss you", "color": "#ffeeaa" },
                    { "writer": "", "text": "Hello", "color": "#ffffff" }
                ]
            }
        });
        let err = Interaction::from_parts(Some(InteractionKind::Board), Some(&payload)).unwrap_err();
        assert_eq!(err.field, "additionalData.data.items[1].writer");
    }

    #[test]
    fn board_payload_round_trips_through_wire_form() {
        let payload = json!({
            "data": {
                "title": "Guestbook",
                "description": "Notes from friends",
                "items": [{ "writer": "Mina", "text": "Miss you", "color": "#ffeeaa" }]
            }
        });
        let board = Interaction::from_parts(Some(InteractionKind::Board), Some(&payload)).unwrap();
        assert_eq!(board.kind(), Some(InteractionKind::Board));
        assert_eq!(board.payload(), payload);
    }

    #[test]
    fn gallery_requires_object_payload() {
        let gallery = Interaction::from_parts(Some(InteractionKind::Gallery), None).unwrap();
        assert_eq!(gallery.payload(), json!({}));
        assert!(
            Interaction::from_parts(Some(InteractionKind::Gallery), Some(&json!([1, 2]))).is_err()
        );
    }

    #[test]
    fn unknown_item_function_names_the_field() {
        let err = "Video".parse::<InteractionKind>().unwrap_err();
        assert_eq!(err.field, "itemFunction");
    }
}
