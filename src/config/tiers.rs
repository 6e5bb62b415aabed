use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Simulated base reward: 0.1% of the staked amount per day, before the tier multiplier.
pub const DAILY_REWARD_RATE: f64 = 0.001;

/// Bond rating, ordered by lock length
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    B,
    BB,
    BBB,
    A,
    AA,
    AAA,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::B => "B",
            Rating::BB => "BB",
            Rating::BBB => "BBB",
            Rating::A => "A",
            Rating::AA => "AA",
            Rating::AAA => "AAA",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "B" => Ok(Rating::B),
            "BB" => Ok(Rating::BB),
            "BBB" => Ok(Rating::BBB),
            "A" => Ok(Rating::A),
            "AA" => Ok(Rating::AA),
            "AAA" => Ok(Rating::AAA),
            other => Err(format!("Unknown rating: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingTier {
    pub rating: Rating,
    pub days: u32,
    pub multiplier: f64,
    pub description: &'static str,
}

impl RatingTier {
    /// Annualized yield hint shown next to the tier (0.547 == 54.7%)
    pub fn estimated_apy(&self) -> f64 {
        DAILY_REWARD_RATE * 365.0 * self.multiplier
    }
}

static RATING_TIERS: [RatingTier; 6] = [
    RatingTier { rating: Rating::B, days: 7, multiplier: 1.0, description: "Base yield" },
    RatingTier { rating: Rating::BB, days: 14, multiplier: 1.2, description: "Base+" },
    RatingTier { rating: Rating::BBB, days: 30, multiplier: 1.5, description: "Moderate yield" },
    RatingTier { rating: Rating::A, days: 60, multiplier: 2.0, description: "Good yield" },
    RatingTier { rating: Rating::AA, days: 90, multiplier: 2.5, description: "High yield" },
    RatingTier { rating: Rating::AAA, days: 180, multiplier: 3.0, description: "Maximum yield" },
];

/// All tiers, shortest lock first
pub fn all_tiers() -> &'static [RatingTier] {
    &RATING_TIERS
}

/// Tier whose lock length is exactly `days`
pub fn tier_for_days(days: u32) -> Option<&'static RatingTier> {
    RATING_TIERS.iter().find(|tier| tier.days == days)
}

pub fn tier_for_rating(rating: Rating) -> &'static RatingTier {
    // Table holds exactly one entry per variant, in declaration order
    &RATING_TIERS[rating as usize]
}
