use crate::model::color::Color;
use crate::model::kind::{ActionKind, WildKind};
use crate::model::rank::Rank;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A single card. Wild-category cards carry no color of their own; the
/// declared color lives on [`TopCard`] once one is on the discard pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "WireCard", into = "WireCard")]
pub enum Card {
    Numeral { color: Color, rank: Rank },
    Action { color: Color, kind: ActionKind },
    Wild(WildKind),
}

impl Card {
    pub const fn numeral(color: Color, rank: Rank) -> Self {
        Card::Numeral { color, rank }
    }

    pub const fn action(color: Color, kind: ActionKind) -> Self {
        Card::Action { color, kind }
    }

    /// The printed color, `None` for wild-category cards.
    pub const fn color(self) -> Option<Color> {
        match self {
            Card::Numeral { color, .. } | Card::Action { color, .. } => Some(color),
            Card::Wild(_) => None,
        }
    }

    pub const fn rank(self) -> Option<Rank> {
        match self {
            Card::Numeral { rank, .. } => Some(rank),
            _ => None,
        }
    }

    pub const fn is_wild_category(self) -> bool {
        matches!(self, Card::Wild(_))
    }

    pub const fn is_draw_four(self) -> bool {
        matches!(self, Card::Wild(WildKind::WildDrawFour))
    }

    /// Legality against the current discard top. Wild-category cards always
    /// match; colored cards match on color, and numerals additionally on
    /// rank, actions additionally on kind.
    pub fn matches(self, top: &TopCard) -> bool {
        match self {
            Card::Wild(_) => true,
            Card::Numeral { color, rank } => {
                if top.color == Some(color) {
                    return true;
                }
                matches!(top.card, Card::Numeral { rank: top_rank, .. } if top_rank == rank)
            }
            Card::Action { color, kind } => {
                if top.color == Some(color) {
                    return true;
                }
                matches!(top.card, Card::Action { kind: top_kind, .. } if top_kind == kind)
            }
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Card::Numeral { color, rank } => write!(f, "{color} {rank}"),
            Card::Action { color, kind } => write!(f, "{color} {kind}"),
            Card::Wild(kind) => write!(f, "{kind}"),
        }
    }
}

/// The discard top together with its effective color. The color is `None`
/// only while a white wild sits on top, since that card never declares one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopCard {
    pub card: Card,
    pub color: Option<Color>,
}

impl TopCard {
    pub const fn new(card: Card, color: Option<Color>) -> Self {
        Self { card, color }
    }

    /// A colored card dictates its own color.
    pub const fn colored(card: Card) -> Self {
        Self {
            color: card.color(),
            card,
        }
    }
}

/// Wire shape used by the dealer: colored cards carry `number` or `special`,
/// wild-category cards appear as `black` or `white` with a `special` label.
#[derive(Debug, Serialize, Deserialize)]
struct WireCard {
    color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    special: Option<String>,
}

impl From<Card> for WireCard {
    fn from(card: Card) -> Self {
        match card {
            Card::Numeral { color, rank } => WireCard {
                color: color.as_str().to_string(),
                number: Some(rank.value()),
                special: None,
            },
            Card::Action { color, kind } => WireCard {
                color: color.as_str().to_string(),
                number: None,
                special: Some(kind.as_wire().to_string()),
            },
            Card::Wild(kind) => WireCard {
                color: if matches!(kind, WildKind::WhiteWild) {
                    "white".to_string()
                } else {
                    "black".to_string()
                },
                number: None,
                special: Some(kind.as_wire().to_string()),
            },
        }
    }
}

impl TryFrom<WireCard> for Card {
    type Error = String;

    fn try_from(wire: WireCard) -> Result<Self, Self::Error> {
        if let Some(color) = Color::from_wire(&wire.color) {
            if let Some(number) = wire.number {
                let rank = Rank::from_value(number)
                    .ok_or_else(|| format!("number out of range: {number}"))?;
                return Ok(Card::Numeral { color, rank });
            }
            if let Some(special) = wire.special.as_deref() {
                let kind = ActionKind::from_wire(special)
                    .ok_or_else(|| format!("unknown colored special: {special}"))?;
                return Ok(Card::Action { color, kind });
            }
            return Err(format!("colored card without number or special: {}", wire.color));
        }
        if wire.color == "black" || wire.color == "white" {
            let special = wire
                .special
                .as_deref()
                .ok_or_else(|| format!("{} card without special", wire.color))?;
            let kind = WildKind::from_wire(special)
                .ok_or_else(|| format!("unknown wild special: {special}"))?;
            return Ok(Card::Wild(kind));
        }
        Err(format!("unknown color: {}", wire.color))
    }
}
