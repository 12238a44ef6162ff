//! Card and seat primitives shared by the whole crate.

mod card;
mod color;
mod hand;
mod kind;
mod player;
mod rank;

pub use card::{Card, TopCard};
pub use color::Color;
pub use hand::Hand;
pub use kind::{ActionKind, WildKind};
pub use player::{PlayerId, RelativePosition};
pub use rank::Rank;
