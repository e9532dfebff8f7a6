use std::fmt::{
    Display,
    Formatter,
};

/// Experience needed for `Legend 1`.
pub const LEGEND_THRESHOLD: u64 = 1_600_000;

/// Experience between two legend levels.
pub const LEGEND_STEP: u64 = 200_000;

/// The ceiling shown for the listing placeholder rank.
const LEGEND_PREMIUM_MAX_EXPERIENCE: u64 = 1_800_000;

/// A rank on the fixed ladder.
///
/// Variants are declared in ascending order, so the derived `Ord` follows the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FixedRank {
    Recruit,
    Private,
    Gefreiter,
    Corporal,
    MasterCorporal,
    Sergeant,
    StaffSergeant,
    MasterSergeant,
    FirstSergeant,
    SergeantMajor,
    WarrantOfficer1,
    WarrantOfficer2,
    WarrantOfficer3,
    WarrantOfficer4,
    WarrantOfficer5,
    ThirdLieutenant,
    SecondLieutenant,
    FirstLieutenant,
    Captain,
    Major,
    LieutenantColonel,
    Colonel,
    Brigadier,
    MajorGeneral,
    LieutenantGeneral,
    General,
    Marshal,
    FieldMarshal,
    Commander,
    Generalissimo,
}

impl FixedRank {
    /// The whole ladder, lowest first.
    pub const LADDER: [FixedRank; 30] = [
        Self::Recruit,
        Self::Private,
        Self::Gefreiter,
        Self::Corporal,
        Self::MasterCorporal,
        Self::Sergeant,
        Self::StaffSergeant,
        Self::MasterSergeant,
        Self::FirstSergeant,
        Self::SergeantMajor,
        Self::WarrantOfficer1,
        Self::WarrantOfficer2,
        Self::WarrantOfficer3,
        Self::WarrantOfficer4,
        Self::WarrantOfficer5,
        Self::ThirdLieutenant,
        Self::SecondLieutenant,
        Self::FirstLieutenant,
        Self::Captain,
        Self::Major,
        Self::LieutenantColonel,
        Self::Colonel,
        Self::Brigadier,
        Self::MajorGeneral,
        Self::LieutenantGeneral,
        Self::General,
        Self::Marshal,
        Self::FieldMarshal,
        Self::Commander,
        Self::Generalissimo,
    ];

    /// The english display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Recruit => "Recruit",
            Self::Private => "Private",
            Self::Gefreiter => "Gefreiter",
            Self::Corporal => "Corporal",
            Self::MasterCorporal => "Master Corporal",
            Self::Sergeant => "Sergeant",
            Self::StaffSergeant => "Staff Sergeant",
            Self::MasterSergeant => "Master Sergeant",
            Self::FirstSergeant => "First Sergeant",
            Self::SergeantMajor => "Sergeant Major",
            Self::WarrantOfficer1 => "Warrant Officer 1",
            Self::WarrantOfficer2 => "Warrant Officer 2",
            Self::WarrantOfficer3 => "Warrant Officer 3",
            Self::WarrantOfficer4 => "Warrant Officer 4",
            Self::WarrantOfficer5 => "Warrant Officer 5",
            Self::ThirdLieutenant => "Third Lieutenant",
            Self::SecondLieutenant => "Second Lieutenant",
            Self::FirstLieutenant => "First Lieutenant",
            Self::Captain => "Captain",
            Self::Major => "Major",
            Self::LieutenantColonel => "Lieutenant Colonel",
            Self::Colonel => "Colonel",
            Self::Brigadier => "Brigadier",
            Self::MajorGeneral => "Major General",
            Self::LieutenantGeneral => "Lieutenant General",
            Self::General => "General",
            Self::Marshal => "Marshal",
            Self::FieldMarshal => "Field Marshal",
            Self::Commander => "Commander",
            Self::Generalissimo => "Generalissimo",
        }
    }

    /// The least experience needed to hold this rank.
    pub fn min_experience(self) -> u64 {
        match self {
            Self::Recruit => 0,
            Self::Private => 100,
            Self::Gefreiter => 500,
            Self::Corporal => 1_500,
            Self::MasterCorporal => 3_700,
            Self::Sergeant => 7_100,
            Self::StaffSergeant => 12_300,
            Self::MasterSergeant => 20_000,
            Self::FirstSergeant => 29_000,
            Self::SergeantMajor => 41_000,
            Self::WarrantOfficer1 => 57_000,
            Self::WarrantOfficer2 => 76_000,
            Self::WarrantOfficer3 => 98_000,
            Self::WarrantOfficer4 => 125_000,
            Self::WarrantOfficer5 => 156_000,
            Self::ThirdLieutenant => 192_000,
            Self::SecondLieutenant => 233_000,
            Self::FirstLieutenant => 280_000,
            Self::Captain => 332_000,
            Self::Major => 390_000,
            Self::LieutenantColonel => 455_000,
            Self::Colonel => 527_000,
            Self::Brigadier => 606_000,
            Self::MajorGeneral => 692_000,
            Self::LieutenantGeneral => 787_000,
            Self::General => 889_000,
            Self::Marshal => 1_000_000,
            Self::FieldMarshal => 1_122_000,
            Self::Commander => 1_255_000,
            Self::Generalissimo => 1_400_000,
        }
    }

    /// The experience ceiling the site shows for this rank's progress bar.
    ///
    /// The low tiers do not line up with the next rank's threshold; these are the site's numbers.
    pub fn max_experience(self) -> u64 {
        match self {
            Self::Recruit => 400,
            Self::Private => 1_000,
            Self::Gefreiter => 2_200,
            Self::Corporal => 4_400,
            Self::MasterCorporal => 7_700,
            Self::Sergeant => 12_300,
            Self::StaffSergeant => 20_000,
            Self::MasterSergeant => 29_000,
            Self::FirstSergeant => 41_000,
            Self::SergeantMajor => 57_000,
            Self::WarrantOfficer1 => 76_000,
            Self::WarrantOfficer2 => 98_000,
            Self::WarrantOfficer3 => 125_000,
            Self::WarrantOfficer4 => 156_000,
            Self::WarrantOfficer5 => 192_000,
            Self::ThirdLieutenant => 233_000,
            Self::SecondLieutenant => 280_000,
            Self::FirstLieutenant => 332_000,
            Self::Captain => 390_000,
            Self::Major => 455_000,
            Self::LieutenantColonel => 527_000,
            Self::Colonel => 606_000,
            Self::Brigadier => 695_000,
            Self::MajorGeneral => 787_000,
            Self::LieutenantGeneral => 889_000,
            Self::General => 1_000_000,
            Self::Marshal => 1_122_000,
            Self::FieldMarshal => 1_255_000,
            Self::Commander => 1_400_000,
            Self::Generalissimo => LEGEND_THRESHOLD,
        }
    }

    /// Look up a rank by its english name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::LADDER
            .iter()
            .copied()
            .find(|rank| rank.name().eq_ignore_ascii_case(name))
    }
}

/// A player rank.
///
/// Legend levels are open-ended, so they are kept as a number instead of a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    /// A rank on the fixed ladder
    Fixed(FixedRank),

    /// `Legend {n}`, n >= 1
    Legend(u32),

    /// Placeholder for players only seen in the rankings table, which shows no rank.
    LegendPremium,
}

impl Rank {
    /// Get the rank for an amount of experience.
    ///
    /// Experience is the ground truth for rank; text found on a page never overrides this.
    pub fn from_experience(experience: u64) -> Self {
        if experience >= LEGEND_THRESHOLD {
            let level = 1 + (experience - LEGEND_THRESHOLD) / LEGEND_STEP;
            return Self::Legend(u32::try_from(level).unwrap_or(u32::MAX));
        }

        let rank = FixedRank::LADDER
            .iter()
            .copied()
            .rev()
            .find(|rank| rank.min_experience() <= experience)
            .unwrap_or(FixedRank::Recruit);

        Self::Fixed(rank)
    }

    /// The experience ceiling for this rank.
    pub fn max_experience(self) -> u64 {
        match self {
            Self::Fixed(rank) => rank.max_experience(),
            Self::Legend(level) => LEGEND_THRESHOLD + u64::from(level) * LEGEND_STEP,
            Self::LegendPremium => LEGEND_PREMIUM_MAX_EXPERIENCE,
        }
    }

    /// The 1-based insignia number, 1 for Recruit through 31 for every legend rank.
    pub fn insignia(self) -> usize {
        match self {
            Self::Fixed(rank) => rank as usize + 1,
            Self::Legend(_) | Self::LegendPremium => FixedRank::LADDER.len() + 1,
        }
    }

    /// Returns `true` for any legend rank, including the placeholder.
    pub fn is_legend(self) -> bool {
        matches!(self, Self::Legend(_) | Self::LegendPremium)
    }
}

impl From<FixedRank> for Rank {
    fn from(rank: FixedRank) -> Self {
        Self::Fixed(rank)
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(rank) => f.write_str(rank.name()),
            Self::Legend(level) => write!(f, "Legend {level}"),
            Self::LegendPremium => f.write_str("Legend Premium"),
        }
    }
}

impl serde::Serialize for Rank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ladder_boundaries() {
        for (i, rank) in FixedRank::LADDER.iter().copied().enumerate() {
            let min = rank.min_experience();
            assert_eq!(Rank::from_experience(min), Rank::Fixed(rank));

            if i > 0 {
                assert_eq!(
                    Rank::from_experience(min - 1),
                    Rank::Fixed(FixedRank::LADDER[i - 1])
                );
            }
        }
    }

    #[test]
    fn ladder_is_ascending() {
        for pair in FixedRank::LADDER.windows(2) {
            assert!(pair[0].min_experience() < pair[1].min_experience());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn known_tiers() {
        assert_eq!(Rank::from_experience(0).to_string(), "Recruit");
        assert_eq!(Rank::from_experience(99).to_string(), "Recruit");
        assert_eq!(Rank::from_experience(1_499).to_string(), "Gefreiter");
        assert_eq!(Rank::from_experience(1_500).to_string(), "Corporal");
        assert_eq!(
            Rank::from_experience(105_613).to_string(),
            "Warrant Officer 3"
        );
        assert_eq!(
            Rank::from_experience(1_599_999).to_string(),
            "Generalissimo"
        );
    }

    #[test]
    fn legend_levels() {
        assert_eq!(Rank::from_experience(1_600_000), Rank::Legend(1));
        assert_eq!(Rank::from_experience(1_799_999), Rank::Legend(1));
        assert_eq!(Rank::from_experience(1_800_000), Rank::Legend(2));
        assert_eq!(Rank::from_experience(3_000_000), Rank::Legend(8));
        assert_eq!(Rank::from_experience(3_000_000).to_string(), "Legend 8");
    }

    #[test]
    fn rank_never_decreases() {
        let mut last = Rank::from_experience(0);
        for experience in (0..4_000_000).step_by(997) {
            let rank = Rank::from_experience(experience);
            assert!(rank >= last, "{rank} < {last} at {experience}");
            last = rank;
        }
    }

    #[test]
    fn max_experience() {
        assert_eq!(Rank::Fixed(FixedRank::WarrantOfficer3).max_experience(), 125_000);
        assert_eq!(Rank::Legend(1).max_experience(), 1_800_000);
        assert_eq!(Rank::Legend(3).max_experience(), 2_200_000);
        assert_eq!(Rank::LegendPremium.max_experience(), 1_800_000);
    }

    #[test]
    fn insignia() {
        assert_eq!(Rank::Fixed(FixedRank::Recruit).insignia(), 1);
        assert_eq!(Rank::Fixed(FixedRank::Generalissimo).insignia(), 30);
        assert_eq!(Rank::Legend(12).insignia(), 31);
    }

    #[test]
    fn from_name() {
        assert_eq!(
            FixedRank::from_name("warrant officer 4"),
            Some(FixedRank::WarrantOfficer4)
        );
        assert_eq!(FixedRank::from_name("Admiral"), None);
    }
}
