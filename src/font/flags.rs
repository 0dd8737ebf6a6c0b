//! Style flags carried by every cached font.
//!
//! The bit values are part of the packed [`FontKey`](crate::font::key::FontKey)
//! layout and index the per-font variant table, so they must stay below
//! `1 << FLAG_BITS`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Visual style bits of a font request.
    ///
    /// Every combination is legal; the font engine decides whether the
    /// resulting face actually differs.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct StyleFlags: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const STRIKE_OUT = 1 << 3;
        const SEMIBOLD = 1 << 4;
        const MONOSPACE = 1 << 5;
    }
}

impl StyleFlags {
    /// Slot of this flag set in a variant table.
    #[inline]
    pub const fn slot(self) -> usize {
        self.bits() as usize
    }

    /// Weight (CSS-ish 100..900) the flags ask the engine for.
    pub fn weight(self) -> u16 {
        if self.contains(Self::BOLD) {
            700
        } else if self.contains(Self::SEMIBOLD) {
            600
        } else {
            400
        }
    }

    /// Copy of `self` with `flag` set or cleared.
    #[inline]
    pub fn toggled(self, flag: StyleFlags, set: bool) -> Self {
        if set { self | flag } else { self - flag }
    }
}
