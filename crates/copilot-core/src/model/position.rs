use serde::{Deserialize, Serialize};

/// A node's 2D canvas position.
///
/// The Engine's wire format accepts either a `[x, y]` tuple or an
/// `{x, y}` object (spec §4.3); both deserialize into this struct, and
/// `Position` always serializes back out as the tuple form the Engine
/// expects on write.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 2]")]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        [position.x, position.y]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPosition {
    Tuple([f64; 2]),
    Object { x: f64, y: f64 },
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match RawPosition::deserialize(deserializer)? {
            RawPosition::Tuple([x, y]) => Ok(Position { x, y }),
            RawPosition::Object { x, y } => Ok(Position { x, y }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tuple_form() {
        let position: Position = serde_json::from_str("[10.0, 20.0]").unwrap();
        assert_eq!(position, Position::new(10.0, 20.0));
    }

    #[test]
    fn deserializes_object_form() {
        let position: Position = serde_json::from_str(r#"{"x": 10.0, "y": 20.0}"#).unwrap();
        assert_eq!(position, Position::new(10.0, 20.0));
    }

    #[test]
    fn serializes_as_tuple() {
        let value = serde_json::to_value(Position::new(1.0, 2.0)).unwrap();
        assert_eq!(value, serde_json::json!([1.0, 2.0]));
    }
}
