//! Vertex and edge tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Vertex sharpness annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexTag {
    /// Smoothed like any interior vertex.
    #[default]
    Smooth,
    /// Pinned in place.
    Corner,
    /// Lies on a crease curve.
    Crease,
    /// Crease endpoint inside a smooth region.
    Dart,
}

impl VertexTag {
    /// Parse free text; anything unrecognized is [`VertexTag::Smooth`].
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "corner" => VertexTag::Corner,
            "crease" => VertexTag::Crease,
            "dart" => VertexTag::Dart,
            _ => VertexTag::Smooth,
        }
    }

    /// True for tags that keep a vertex fixed during smoothing.
    pub fn is_pinned(self) -> bool {
        matches!(self, VertexTag::Corner | VertexTag::Dart)
    }
}

impl From<&str> for VertexTag {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for VertexTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VertexTag::Smooth => "smooth",
            VertexTag::Corner => "corner",
            VertexTag::Crease => "crease",
            VertexTag::Dart => "dart",
        })
    }
}

/// Edge sharpness annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeTag {
    /// Smooth edge.
    #[default]
    Smooth,
    /// Sharp edge, kept sharp by refinement.
    Crease,
}

impl EdgeTag {
    /// Parse free text; anything unrecognized is [`EdgeTag::Smooth`].
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "crease" | "sharp" => EdgeTag::Crease,
            _ => EdgeTag::Smooth,
        }
    }
}

impl From<&str> for EdgeTag {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for EdgeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeTag::Smooth => "smooth",
            EdgeTag::Crease => "crease",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!(VertexTag::parse(" Corner "), VertexTag::Corner);
        assert_eq!(VertexTag::parse("DART"), VertexTag::Dart);
        assert_eq!(VertexTag::parse("bogus"), VertexTag::Smooth);
        assert_eq!(EdgeTag::from("crease"), EdgeTag::Crease);
        assert_eq!(EdgeTag::from(""), EdgeTag::Smooth);
        assert_eq!(VertexTag::Crease.to_string(), "crease");
    }
}
