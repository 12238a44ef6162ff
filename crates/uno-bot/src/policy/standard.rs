use crate::engine::{PlayMode, choose_color};
use crate::policy::{PolicyContext, RankPolicy, RankingFault};
use std::cmp::Reverse;
use uno_core::model::{ActionKind, Card, Color, PlayerId, RelativePosition, WildKind};

/// Default ranking policy.
///
/// Attacking, it spends tempo cards first and bleeds the dominant color
/// while hoarding one wild to go out on. Defending, it leads wilds to
/// reset the color and dumps high numerals. With an opponent at uno the
/// order flips entirely to whatever hurts that seat the most, keyed on
/// where they sit relative to us.
pub struct StandardPolicy;

/// Non-numeral plays, named for ordering tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Special {
    Shuffle,
    DrawTwo,
    Wild,
    White,
    Reverse,
    Skip,
    DrawFour,
}

fn special_of(card: Card) -> Option<Special> {
    match card {
        Card::Numeral { .. } => None,
        Card::Action { kind, .. } => Some(match kind {
            ActionKind::DrawTwo => Special::DrawTwo,
            ActionKind::Skip => Special::Skip,
            ActionKind::Reverse => Special::Reverse,
        }),
        Card::Wild(kind) => Some(match kind {
            WildKind::Wild => Special::Wild,
            WildKind::WildDrawFour => Special::DrawFour,
            WildKind::WildShuffle => Special::Shuffle,
            WildKind::WhiteWild => Special::White,
        }),
    }
}

/// Appends every legal card matching each key, in key order, keeping the
/// incoming order within a key.
fn push_specials(out: &mut Vec<Card>, legal: &[Card], keys: &[Special]) {
    for &key in keys {
        out.extend(
            legal
                .iter()
                .copied()
                .filter(|&card| special_of(card) == Some(key)),
        );
    }
}

fn numerals(legal: &[Card]) -> Vec<Card> {
    legal
        .iter()
        .copied()
        .filter(|card| matches!(card, Card::Numeral { .. }))
        .collect()
}

/// Colors ranked by how many legal cards carry them, most first. Ties
/// keep the canonical color order.
fn color_priority(legal: &[Card]) -> [usize; 4] {
    let mut counts = [0usize; 4];
    for card in legal {
        if let Some(color) = card.color() {
            counts[color.index()] += 1;
        }
    }
    let mut order = Color::ALL;
    order.sort_by_key(|color| Reverse(counts[color.index()]));
    let mut priority = [0usize; 4];
    for (slot, color) in order.into_iter().enumerate() {
        priority[color.index()] = slot;
    }
    priority
}

impl StandardPolicy {
    fn offensive(&self, ctx: &PolicyContext<'_>, legal: &[Card]) -> Vec<Card> {
        let hand_size = ctx.state.hand().len();
        let mut out = Vec::with_capacity(legal.len());

        // Tempo first: skip and reverse together, then draw two.
        out.extend(legal.iter().copied().filter(|&card| {
            matches!(special_of(card), Some(Special::Skip | Special::Reverse))
        }));
        push_specials(&mut out, legal, &[Special::DrawTwo]);

        // Bleed the color we hold the most of, high ranks first, so the
        // other three colors stay playable longer.
        let priority = color_priority(legal);
        let mut nums = numerals(legal);
        nums.sort_by_key(|&card| match card {
            Card::Numeral { color, rank } => (priority[color.index()], Reverse(rank.value())),
            _ => (usize::MAX, Reverse(0)),
        });
        out.extend(nums);

        // Wilds last; the shuffle is only ever the winning card.
        let mut tail = Vec::new();
        push_specials(
            &mut tail,
            legal,
            &[Special::Wild, Special::White, Special::DrawFour],
        );
        if hand_size == 1 {
            push_specials(&mut tail, legal, &[Special::Shuffle]);
        }
        let wild_like = tail.len();
        out.extend(tail);

        // A lone wild as the only legal play waits for a better turn
        // unless it would win the round.
        if wild_like == 1 && legal.len() == 1 && hand_size != 1 {
            return Vec::new();
        }

        // Once a challenge against us has landed, leading the draw four
        // again invites another one; the shuffle resets the table instead.
        if ctx.state.challenged_successfully()
            && legal.contains(&Card::Wild(WildKind::WildDrawFour))
            && legal.contains(&Card::Wild(WildKind::WildShuffle))
        {
            return vec![Card::Wild(WildKind::WildShuffle)];
        }

        out
    }

    fn defensive(&self, ctx: &PolicyContext<'_>, legal: &[Card]) -> Vec<Card> {
        let challenged = ctx.state.challenged_successfully();
        let mut out = Vec::with_capacity(legal.len());

        push_specials(&mut out, legal, &[Special::Wild, Special::White]);
        if !challenged {
            push_specials(&mut out, legal, &[Special::DrawFour]);
        }
        push_specials(&mut out, legal, &[Special::DrawTwo]);
        out.extend(legal.iter().copied().filter(|&card| {
            matches!(special_of(card), Some(Special::Skip | Special::Reverse))
        }));

        // High numerals go first to cut the round's loss, steered toward
        // the color the shortest hand provably could not match.
        let target = choose_color(ctx, PlayMode::Defensive);
        let mut nums = numerals(legal);
        nums.sort_by_key(|&card| match card {
            Card::Numeral { color, rank } => {
                (Reverse(rank.value()), color != target, color.index())
            }
            _ => (Reverse(0), true, usize::MAX),
        });
        out.extend(nums);

        if challenged {
            push_specials(&mut out, legal, &[Special::DrawFour]);
        }

        // The shuffle never appears: handing a losing hand to an opponent
        // is fine, handing ours away mid-defense is not.
        out
    }

    fn uno(
        &self,
        ctx: &PolicyContext<'_>,
        flagged: usize,
        legal: &[Card],
    ) -> Result<Vec<Card>, RankingFault> {
        let tracker = ctx
            .state
            .tracker()
            .ok_or(RankingFault::MissingSeatContext)?;
        let seats = tracker.uno_players();
        let Some(&(_, position)) = seats.first() else {
            // Flags cleared since classification; the defensive order is
            // the safe one.
            return Ok(self.defensive(ctx, legal));
        };
        Ok(match flagged {
            1 => self.uno_single(ctx, position, legal),
            2 => self.uno_pair(ctx, &seats, legal),
            _ => self.defensive(ctx, legal),
        })
    }

    fn uno_single(
        &self,
        ctx: &PolicyContext<'_>,
        position: RelativePosition,
        legal: &[Card],
    ) -> Vec<Card> {
        let mut out = Vec::with_capacity(legal.len());
        let mut nums = numerals(legal);
        match position {
            // The threat acts right after us: deny them the turn outright,
            // then play into the colors the table has already bled dry.
            RelativePosition::Next => {
                push_specials(
                    &mut out,
                    legal,
                    &[
                        Special::Shuffle,
                        Special::DrawTwo,
                        Special::Wild,
                        Special::White,
                        Special::Reverse,
                        Special::Skip,
                        Special::DrawFour,
                    ],
                );
                let ledger = ctx.state.ledger();
                nums.sort_by_key(|&card| match card {
                    Card::Numeral { color, rank } => (
                        ledger.color_count(color),
                        color.index() as u32,
                        ledger.count_of(card),
                        u32::from(rank.value()),
                    ),
                    _ => (u32::MAX, u32::MAX, u32::MAX, u32::MAX),
                });
                out.extend(nums);
            }
            // Two seats between us and the threat: shed weight, points
            // first.
            RelativePosition::Across => {
                push_specials(
                    &mut out,
                    legal,
                    &[
                        Special::Shuffle,
                        Special::White,
                        Special::Wild,
                        Special::DrawFour,
                        Special::DrawTwo,
                        Special::Reverse,
                        Special::Skip,
                    ],
                );
                nums.sort_by_key(|&card| match card {
                    Card::Numeral { color, rank } => (Reverse(rank.value()), color.index()),
                    _ => (Reverse(0), usize::MAX),
                });
                out.extend(nums);
            }
            // The threat just acted; a reverse would hand the turn
            // straight back to them, so it goes dead last.
            RelativePosition::Previous => {
                push_specials(
                    &mut out,
                    legal,
                    &[
                        Special::Shuffle,
                        Special::Wild,
                        Special::DrawFour,
                        Special::DrawTwo,
                        Special::White,
                        Special::Skip,
                    ],
                );
                nums.sort_by_key(|&card| match card {
                    Card::Numeral { color, rank } => (Reverse(rank.value()), color.index()),
                    _ => (Reverse(0), usize::MAX),
                });
                out.extend(nums);
                push_specials(&mut out, legal, &[Special::Reverse]);
            }
        }
        out
    }

    /// Two opponents at uno: deny the next seat like the single case, but
    /// pick numeral colors that are safe against both threats. A color is
    /// a hedge only when every flagged seat provably failed to match it;
    /// otherwise fall back to unseen-pool scarcity.
    fn uno_pair(
        &self,
        ctx: &PolicyContext<'_>,
        flagged: &[(&PlayerId, RelativePosition)],
        legal: &[Card],
    ) -> Vec<Card> {
        let mut out = Vec::with_capacity(legal.len());
        push_specials(
            &mut out,
            legal,
            &[
                Special::Shuffle,
                Special::DrawTwo,
                Special::Wild,
                Special::White,
                Special::Reverse,
                Special::Skip,
                Special::DrawFour,
            ],
        );

        let history = ctx.state.history();
        let hedge = flagged
            .first()
            .and_then(|(player, _)| history.last_unmatched_color(player))
            .filter(|&color| {
                flagged
                    .iter()
                    .all(|(player, _)| history.last_unmatched_color(player) == Some(color))
            });

        let ledger = ctx.state.ledger();
        let mut nums = numerals(legal);
        nums.sort_by_key(|&card| match card {
            Card::Numeral { color, rank } => (
                Some(color) != hedge,
                ledger.color_count(color),
                color.index(),
                Reverse(rank.value()),
            ),
            _ => (true, u32::MAX, usize::MAX, Reverse(0)),
        });
        out.extend(nums);
        out
    }
}

impl RankPolicy for StandardPolicy {
    fn rank_legal_plays(
        &self,
        ctx: &PolicyContext<'_>,
        mode: PlayMode,
        legal: &[Card],
    ) -> Result<Vec<Card>, RankingFault> {
        Ok(match mode {
            PlayMode::Uno(flagged) => self.uno(ctx, flagged, legal)?,
            PlayMode::Defensive => self.defensive(ctx, legal),
            PlayMode::Offensive | PlayMode::Fallback => self.offensive(ctx, legal),
        })
    }
}
