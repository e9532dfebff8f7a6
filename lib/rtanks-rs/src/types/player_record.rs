use crate::types::{
    EquipmentSet,
    Rank,
};

/// The group label used when none was found.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Where a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Parsed from the player's profile page
    Profile,

    /// Guessed from a row of the rankings table.
    ///
    /// Most fields are defaults or assumptions.
    Listing,
}

/// Field values pulled out of a page, before acceptance.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRecord {
    pub username: String,
    pub clan: Option<String>,

    /// `None` until resolved
    pub rank: Option<Rank>,

    /// The rank as written on the page, if any.
    ///
    /// This is only informational, `rank` always wins.
    pub rank_text: Option<String>,

    pub experience: u64,
    pub max_experience: Option<u64>,
    pub kills: u64,
    pub deaths: u64,

    /// An explicit ratio from the page, if there was one
    pub kd_ratio: Option<String>,

    pub gold_boxes: u64,
    pub premium: bool,
    pub group: String,
    pub is_online: bool,
    pub equipment: EquipmentSet,
    pub source: RecordSource,
}

impl PartialRecord {
    /// Make an empty record for a username.
    pub fn new(username: impl Into<String>, source: RecordSource) -> Self {
        Self {
            username: username.into(),
            clan: None,
            rank: None,
            rank_text: None,
            experience: 0,
            max_experience: None,
            kills: 0,
            deaths: 0,
            kd_ratio: None,
            gold_boxes: 0,
            premium: false,
            group: UNKNOWN_GROUP.to_string(),
            is_online: false,
            equipment: EquipmentSet::new(),
            source,
        }
    }

    /// Returns `true` if enough was found to believe the player exists.
    pub fn is_acceptable(&self) -> bool {
        self.experience > 0 || self.kills > 0 || self.rank.is_some()
    }

    /// Turn this into a [`PlayerRecord`].
    ///
    /// Returns `None` if there is too little data to trust.
    pub fn assemble(self) -> Option<PlayerRecord> {
        if !self.is_acceptable() {
            return None;
        }

        let rank = self
            .rank
            .unwrap_or_else(|| Rank::from_experience(self.experience));
        let max_experience = self.max_experience.or(Some(rank.max_experience()));
        let kd_ratio = match self.kd_ratio {
            Some(ratio) if !is_zero_ratio(&ratio) => ratio,
            _ => kd_ratio(self.kills, self.deaths),
        };

        Some(PlayerRecord {
            username: self.username,
            clan: self.clan,
            rank,
            experience: self.experience,
            max_experience,
            kills: self.kills,
            deaths: self.deaths,
            kd_ratio,
            gold_boxes: self.gold_boxes,
            premium: self.premium,
            group: self.group,
            is_online: self.is_online,
            equipment: self.equipment,
            source: self.source,
        })
    }
}

/// A player, as shown on the ratings site.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlayerRecord {
    /// The name as the site displays it
    pub username: String,

    /// The clan tag, without brackets
    pub clan: Option<String>,

    /// The rank
    pub rank: Rank,

    /// Total experience
    pub experience: u64,

    /// The experience ceiling for the current rank
    pub max_experience: Option<u64>,

    /// Tanks destroyed
    pub kills: u64,

    /// Times destroyed
    pub deaths: u64,

    /// Kills per death, always 2 decimals unless deaths is 0
    pub kd_ratio: String,

    /// Gold boxes caught
    pub gold_boxes: u64,

    /// Whether the player has premium
    pub premium: bool,

    /// The site group, like `Player` or `Moderator`
    pub group: String,

    /// Whether the player is in game right now
    pub is_online: bool,

    /// Owned and installed equipment
    pub equipment: EquipmentSet,

    /// Where this record came from
    pub source: RecordSource,
}

impl PlayerRecord {
    /// Returns `true` if this was guessed from the rankings table instead of a profile.
    pub fn is_degraded(&self) -> bool {
        self.source == RecordSource::Listing
    }

    /// The kd ratio as a number, for comparisons.
    pub fn kd_ratio_value(&self) -> f64 {
        self.kd_ratio.parse().unwrap_or(0.0)
    }
}

/// Compute a kd ratio string.
///
/// This is `kills / deaths` with 2 decimals.
/// With no deaths it is the kill count, or `"0.00"` if there are no kills either.
pub fn kd_ratio(kills: u64, deaths: u64) -> String {
    if deaths == 0 {
        if kills > 0 {
            return kills.to_string();
        }

        return String::from("0.00");
    }

    let ratio = kills as f64 / deaths as f64;
    format!("{ratio:.2}")
}

fn is_zero_ratio(ratio: &str) -> bool {
    ratio.parse::<f64>().map_or(true, |value| value == 0.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::FixedRank;

    #[test]
    fn kd_ratio_rules() {
        assert_eq!(kd_ratio(0, 0), "0.00");
        assert_eq!(kd_ratio(15, 0), "15");
        assert_eq!(kd_ratio(10, 4), "2.50");
        assert_eq!(kd_ratio(1, 3), "0.33");
        assert_eq!(kd_ratio(2, 3), "0.67");
    }

    #[test]
    fn empty_record_is_rejected() {
        let mut record = PartialRecord::new("ghost", RecordSource::Profile);
        record.premium = true;
        record.gold_boxes = 12;
        record.clan = Some("Clan".into());
        assert!(record.assemble().is_none());
    }

    #[test]
    fn any_signal_is_accepted() {
        let mut record = PartialRecord::new("a", RecordSource::Profile);
        record.kills = 1;
        assert!(record.assemble().is_some());

        let mut record = PartialRecord::new("b", RecordSource::Profile);
        record.rank = Some(Rank::Fixed(FixedRank::Recruit));
        assert!(record.assemble().is_some());

        let mut record = PartialRecord::new("c", RecordSource::Profile);
        record.experience = 1;
        assert!(record.assemble().is_some());
    }

    #[test]
    fn assemble_fills_derived_fields() {
        let mut record = PartialRecord::new("tanker", RecordSource::Profile);
        record.experience = 105_613;
        record.kills = 300;
        record.deaths = 120;
        record.kd_ratio = Some("0.00".into());

        let record = record.assemble().expect("record rejected");
        assert_eq!(record.rank, Rank::Fixed(FixedRank::WarrantOfficer3));
        assert_eq!(record.max_experience, Some(125_000));
        assert_eq!(record.kd_ratio, "2.50");
        assert_eq!(record.group, UNKNOWN_GROUP);
        assert!(!record.is_degraded());
    }

    #[test]
    fn explicit_kd_ratio_is_kept() {
        let mut record = PartialRecord::new("tanker", RecordSource::Profile);
        record.kills = 10;
        record.deaths = 10;
        record.kd_ratio = Some("1.37".into());
        let record = record.assemble().expect("record rejected");
        assert_eq!(record.kd_ratio, "1.37");
        assert_eq!(record.kd_ratio_value(), 1.37);
    }
}
