//! Tier ranks and their fixed-point weights.
//!
//! [`Tier`] is the only value used for ordering. [`TierWeight`] carries the
//! finer position inside a tier in hundredths (`450` is "4.5"); today only
//! the heritage tier decays through it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer recommendation rank, `0..=6`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tier(u8);

impl Tier {
    /// Legal but unremarkable.
    pub const FALLBACK: Tier = Tier(0);
    pub const CLASS_THEME: Tier = Tier(1);
    pub const HIGHEST_ATTRIBUTE: Tier = Tier(2);
    pub const SYNERGY: Tier = Tier(3);
    /// Heritage and chain continuation.
    pub const CONTINUATION: Tier = Tier(4);
    /// Wishlist prerequisite or strong cross-option synergy.
    pub const WISHLIST: Tier = Tier(5);
    pub const GOAL: Tier = Tier(6);

    pub const MAX: u8 = 6;

    /// Clamps out-of-range values to [`Self::GOAL`].
    pub const fn new(value: u8) -> Self {
        if value > Self::MAX {
            Tier(Self::MAX)
        } else {
            Tier(value)
        }
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Starting confidence before bonuses.
    pub const fn base_confidence(self) -> f32 {
        match self.0 {
            0 => 0.30,
            1 => 0.40,
            2 => 0.50,
            3 => 0.60,
            4 => 0.70,
            5 => 0.85,
            _ => 0.95,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-point tier weight in hundredths of a tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierWeight(u16);

impl TierWeight {
    pub const SCALE: u16 = 100;
    /// Extra weight a heritage option carries at level 1 (`4.5` vs `4.0`).
    pub const HERITAGE_PEAK_BONUS: u16 = 50;

    pub const fn from_hundredths(value: u16) -> Self {
        TierWeight(value)
    }

    /// The plain weight of an integer tier.
    pub const fn of(tier: Tier) -> Self {
        TierWeight(tier.value() as u16 * Self::SCALE)
    }

    /// Heritage weight at `level`: `4.0 + 0.5 × 0.5^((level - 1) / half_life)`,
    /// rounded to hundredths.
    pub fn heritage(level: u32, half_life_levels: u32) -> Self {
        let half_life = f64::from(half_life_levels.max(1));
        let elapsed = f64::from(level.saturating_sub(1));
        let decay = 0.5_f64.powf(elapsed / half_life);
        let bonus = (f64::from(Self::HERITAGE_PEAK_BONUS) * decay).round() as u16;
        Self::of(Tier::CONTINUATION).plus(bonus)
    }

    const fn plus(self, hundredths: u16) -> Self {
        TierWeight(self.0 + hundredths)
    }

    #[inline]
    pub const fn hundredths(self) -> u16 {
        self.0
    }

    /// Integer tier this weight falls in.
    pub const fn tier(self) -> Tier {
        Tier::new((self.0 / Self::SCALE) as u8)
    }

    /// Factor applied to the tier's base confidence: the weight relative to
    /// its integer tier (`4.5` on tier 4 gives `1.125`).
    pub fn confidence_multiplier(self) -> f32 {
        let floor = TierWeight::of(self.tier()).0;
        if floor == 0 {
            1.0
        } else {
            f32::from(self.0) / f32::from(floor)
        }
    }
}

impl fmt::Display for TierWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / Self::SCALE, self.0 % Self::SCALE)
    }
}
