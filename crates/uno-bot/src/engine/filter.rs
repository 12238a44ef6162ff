use uno_core::model::{Card, Hand, TopCard, WildKind};

/// Legal plays against `top`, in commitment order: color/rank/kind matches
/// first, then the always-legal generic wilds, then wild draw four dead
/// last since playing it carries a challenge risk.
pub fn legal_plays(hand: &Hand, top: &TopCard) -> Vec<Card> {
    let mut matched = Vec::new();
    let mut wilds = Vec::new();
    let mut draw_fours = Vec::new();

    for card in hand.legal_plays(top) {
        match card {
            Card::Wild(WildKind::WildDrawFour) => draw_fours.push(card),
            Card::Wild(_) => wilds.push(card),
            _ => matched.push(card),
        }
    }

    matched.extend(wilds);
    matched.extend(draw_fours);
    matched
}
