use core::fmt;
use serde::{Deserialize, Serialize};

/// Opaque player identifier assigned by the dealer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Seat of an opponent relative to us in the current play direction. With
/// four seats, `Across` is two steps away in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativePosition {
    Next,
    Across,
    Previous,
}

impl RelativePosition {
    pub const ALL: [RelativePosition; 3] = [
        RelativePosition::Next,
        RelativePosition::Across,
        RelativePosition::Previous,
    ];

    /// The position this seat moves to when play direction reverses.
    pub const fn flipped(self) -> Self {
        match self {
            RelativePosition::Next => RelativePosition::Previous,
            RelativePosition::Across => RelativePosition::Across,
            RelativePosition::Previous => RelativePosition::Next,
        }
    }
}

impl fmt::Display for RelativePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RelativePosition::Next => "next",
            RelativePosition::Across => "across",
            RelativePosition::Previous => "previous",
        };
        f.write_str(label)
    }
}
