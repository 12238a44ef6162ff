use core::fmt;

/// Colored action cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ActionKind {
    DrawTwo = 0,
    Skip = 1,
    Reverse = 2,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::DrawTwo, ActionKind::Skip, ActionKind::Reverse];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_wire(self) -> &'static str {
        match self {
            ActionKind::DrawTwo => "draw_2",
            ActionKind::Skip => "skip",
            ActionKind::Reverse => "reverse",
        }
    }

    pub fn from_wire(label: &str) -> Option<Self> {
        match label {
            "draw_2" => Some(ActionKind::DrawTwo),
            "skip" => Some(ActionKind::Skip),
            "reverse" => Some(ActionKind::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Wild-category cards, playable regardless of the discard top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WildKind {
    Wild = 0,
    WildDrawFour = 1,
    WildShuffle = 2,
    WhiteWild = 3,
}

impl WildKind {
    pub const ALL: [WildKind; 4] = [
        WildKind::Wild,
        WildKind::WildDrawFour,
        WildKind::WildShuffle,
        WildKind::WhiteWild,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Copies of this kind in the full deck.
    pub const fn copies(self) -> u8 {
        match self {
            WildKind::Wild => 4,
            WildKind::WildDrawFour => 4,
            WildKind::WildShuffle => 1,
            WildKind::WhiteWild => 3,
        }
    }

    /// Whether the player must declare a color after playing this card.
    pub const fn declares_color(self) -> bool {
        matches!(self, WildKind::Wild | WildKind::WildDrawFour)
    }

    pub const fn as_wire(self) -> &'static str {
        match self {
            WildKind::Wild => "wild",
            WildKind::WildDrawFour => "wild_draw_4",
            WildKind::WildShuffle => "wild_shuffle",
            WildKind::WhiteWild => "white_wild",
        }
    }

    pub fn from_wire(label: &str) -> Option<Self> {
        match label {
            "wild" => Some(WildKind::Wild),
            "wild_draw_4" => Some(WildKind::WildDrawFour),
            "wild_shuffle" => Some(WildKind::WildShuffle),
            "white_wild" => Some(WildKind::WhiteWild),
            _ => None,
        }
    }
}

impl fmt::Display for WildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}
