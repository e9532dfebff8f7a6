use crate::types::{
    modification_level,
    EquipmentSet,
};
use std::{
    cmp::Ordering,
    fmt::Display,
};

/// Points for one M3 item
const M3_SCORE: u64 = 1000;

/// Points per level for anything below M3
const LEVEL_SCORE: u64 = 10;

/// The winner of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player1,
    Player2,
    Tie,
}

impl Winner {
    /// The winner as a lowercase string
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player1 => "player1",
            Self::Player2 => "player2",
            Self::Tie => "tie",
        }
    }

    /// The winner if the players were swapped
    pub fn swapped(self) -> Self {
        match self {
            Self::Player1 => Self::Player2,
            Self::Player2 => Self::Player1,
            Self::Tie => Self::Tie,
        }
    }
}

impl Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

/// The result of comparing two players' equipment
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Comparison {
    pub winner: Winner,

    /// Why the winner won
    pub reason: String,
}

/// A summary of the turrets and hulls in one [`EquipmentSet`]
#[derive(Debug, Default)]
struct Quality {
    m3_count: usize,
    highest: u8,
    score: u64,
}

impl Quality {
    fn new(equipment: &EquipmentSet) -> Self {
        equipment
            .weapons()
            .map(modification_level)
            .fold(Self::default(), |mut quality, level| {
                if level == 3 {
                    quality.m3_count += 1;
                    quality.score += M3_SCORE;
                } else {
                    quality.score += u64::from(level) * LEVEL_SCORE;
                }
                quality.highest = quality.highest.max(level);
                quality
            })
    }
}

/// Compare the equipment quality of two players.
///
/// Only turrets and hulls count.
/// The player with more M3 items wins, then the one with the highest level, then the higher score.
pub fn compare_equipment_quality(player1: &EquipmentSet, player2: &EquipmentSet) -> Comparison {
    let p1 = Quality::new(player1);
    let p2 = Quality::new(player2);

    let (winner, reason) = match p1.m3_count.cmp(&p2.m3_count) {
        Ordering::Greater => (
            Winner::Player1,
            format!("{} M3 equipment vs {} M3 equipment", p1.m3_count, p2.m3_count),
        ),
        Ordering::Less => (
            Winner::Player2,
            format!("{} M3 equipment vs {} M3 equipment", p2.m3_count, p1.m3_count),
        ),
        Ordering::Equal => match p1.highest.cmp(&p2.highest) {
            Ordering::Greater => (
                Winner::Player1,
                format!("Highest equipment: M{} vs M{}", p1.highest, p2.highest),
            ),
            Ordering::Less => (
                Winner::Player2,
                format!("Highest equipment: M{} vs M{}", p2.highest, p1.highest),
            ),
            Ordering::Equal => match p1.score.cmp(&p2.score) {
                Ordering::Greater => (
                    Winner::Player1,
                    String::from("Better overall equipment quality"),
                ),
                Ordering::Less => (
                    Winner::Player2,
                    String::from("Better overall equipment quality"),
                ),
                Ordering::Equal => (
                    Winner::Tie,
                    format!("Equal equipment quality ({} M3s each)", p1.m3_count),
                ),
            },
        },
    };

    Comparison { winner, reason }
}
