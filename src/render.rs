mod table;

pub use self::table::AsciiTable;
use crate::config::Config;
use rtanks::{
    types::EquipmentKind,
    Comparison,
    PlayerRecord,
    Rank,
    Winner,
};
use std::{
    cmp::Ordering,
    fmt::Display,
};
use url::Url;

/// The most protections shown in the basic view
const BASIC_PROTECTION_COUNT: usize = 3;

/// How ranks are shown.
///
/// This is picked once from the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankStyle {
    /// Just the rank name
    Names,

    /// An icon before the rank name, indexed by insignia
    Icons {
        standard: Vec<String>,
        premium: Vec<String>,
    },
}

impl RankStyle {
    /// Pick a style from the config.
    ///
    /// Icons are used if a standard icon table was given.
    pub fn from_config(config: &Config) -> Self {
        match config.rank_icons() {
            Some(icons) if !icons.standard().is_empty() => Self::Icons {
                standard: icons.standard().to_vec(),
                premium: icons.premium().to_vec(),
            },
            _ => Self::Names,
        }
    }

    /// Get the icon for a rank.
    ///
    /// Premium players use the premium table if there is one.
    pub fn icon(&self, rank: Rank, premium: bool) -> Option<&str> {
        match self {
            Self::Names => None,
            Self::Icons {
                standard,
                premium: premium_icons,
            } => {
                let table = if premium && !premium_icons.is_empty() {
                    premium_icons
                } else {
                    standard
                };
                table.get(rank.insignia() - 1).map(String::as_str)
            }
        }
    }

    /// Get the rank as it should be shown
    pub fn label(&self, rank: Rank, premium: bool) -> String {
        match self.icon(rank, premium) {
            Some(icon) => format!("{icon} {rank}"),
            None => rank.to_string(),
        }
    }
}

/// Format a number with a K, M, or B suffix
pub fn format_number(number: u64) -> String {
    const SUFFIXES: [(u64, &str); 3] = [
        (1_000_000_000, "B"),
        (1_000_000, "M"),
        (1_000, "K"),
    ];

    for (scale, suffix) in SUFFIXES {
        if number >= scale {
            let scaled = number as f64 / scale as f64;
            return format!("{scaled:.1}{suffix}");
        }
    }

    itoa::Buffer::new().format(number).to_string()
}

/// Format a number with comma separators
pub fn format_exact_number(number: u64) -> String {
    let mut buffer = itoa::Buffer::new();
    let digits = buffer.format(number);

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// A player summary
#[derive(Debug)]
pub struct PlayerView<'a> {
    pub record: &'a PlayerRecord,
    pub profile_url: Option<&'a Url>,
    pub style: &'a RankStyle,
    pub expanded: bool,
}

impl Display for PlayerView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let record = self.record;

        write!(f, "{}", record.username)?;
        if let Some(clan) = record.clan.as_deref() {
            write!(f, " [{clan}]")?;
        }
        writeln!(f)?;

        if let Some(url) = self.profile_url {
            writeln!(f, "{url}")?;
        }

        let activity = if record.is_online { "Online" } else { "Offline" };
        writeln!(f, "Activity: {activity}")?;
        writeln!(f, "Rank: {}", self.style.label(record.rank, record.premium))?;

        write!(f, "Experience: {}", format_exact_number(record.experience))?;
        if let Some(max_experience) = record.max_experience {
            write!(f, "/{}", format_exact_number(max_experience))?;
        }
        writeln!(f)?;

        writeln!(f, "Premium: {}", yes_no(record.premium))?;
        writeln!(f, "Kills: {}", format_exact_number(record.kills))?;
        writeln!(f, "Deaths: {}", format_exact_number(record.deaths))?;
        writeln!(f, "K/D: {}", record.kd_ratio)?;
        writeln!(f, "Gold Boxes: {}", format_exact_number(record.gold_boxes))?;
        writeln!(f, "Group: {}", record.group)?;

        let equipment = &record.equipment;
        if !equipment.is_empty() {
            writeln!(f, "Equipment:")?;
            if self.expanded {
                for (label, kind) in [
                    ("Turrets", EquipmentKind::Turret),
                    ("Hulls", EquipmentKind::Hull),
                    ("Protections", EquipmentKind::Protection),
                ] {
                    let items = equipment.owned(kind);
                    if !items.is_empty() {
                        writeln!(f, "  {label}: {}", join(items.iter()))?;
                    }
                }
            } else {
                if let Some(turret) = equipment.equipped(EquipmentKind::Turret).first() {
                    writeln!(f, "  Turret: {turret}")?;
                }
                if let Some(hull) = equipment.equipped(EquipmentKind::Hull).first() {
                    writeln!(f, "  Hull: {hull}")?;
                }
                let protections = equipment.equipped(EquipmentKind::Protection);
                if !protections.is_empty() {
                    let shown = protections.iter().take(BASIC_PROTECTION_COUNT);
                    writeln!(f, "  Protections: {}", join(shown))?;
                }
            }
        }

        if record.is_degraded() {
            writeln!(
                f,
                "Note: the profile could not be read, these values are guessed from the rankings table"
            )?;
        }

        Ok(())
    }
}

/// Two players side by side
#[derive(Debug)]
pub struct ComparisonView<'a> {
    pub player1: &'a PlayerRecord,
    pub player2: &'a PlayerRecord,
    pub equipment: &'a Comparison,
    pub style: &'a RankStyle,
}

impl ComparisonView<'_> {
    fn winner_name(&self, ordering: Option<Ordering>) -> &str {
        match ordering {
            Some(Ordering::Greater) => &self.player1.username,
            Some(Ordering::Less) => &self.player2.username,
            _ => "Tie",
        }
    }

    /// The winner of a count, with their lead in compact form
    fn winner_by_lead(&self, value1: u64, value2: u64) -> String {
        match value1.cmp(&value2) {
            Ordering::Greater => format!(
                "{} (+{})",
                self.player1.username,
                format_number(value1 - value2)
            ),
            Ordering::Less => format!(
                "{} (+{})",
                self.player2.username,
                format_number(value2 - value1)
            ),
            Ordering::Equal => String::from("Tie"),
        }
    }
}

impl Display for ComparisonView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p1 = self.player1;
        let p2 = self.player2;

        writeln!(f, "{} vs {}", p1.username, p2.username)?;

        let mut table = AsciiTable::new(4, 7);
        table.set_row(0, ["", p1.username.as_str(), p2.username.as_str(), "Winner"]);
        table.set_row(
            1,
            [
                "Experience".to_string(),
                format_exact_number(p1.experience),
                format_exact_number(p2.experience),
                self.winner_by_lead(p1.experience, p2.experience),
            ],
        );
        table.set_row(
            2,
            [
                "K/D",
                p1.kd_ratio.as_str(),
                p2.kd_ratio.as_str(),
                self.winner_name(p1.kd_ratio_value().partial_cmp(&p2.kd_ratio_value())),
            ],
        );
        table.set_row(
            3,
            [
                "Gold Boxes".to_string(),
                format_exact_number(p1.gold_boxes),
                format_exact_number(p2.gold_boxes),
                self.winner_by_lead(p1.gold_boxes, p2.gold_boxes),
            ],
        );
        table.set_row(
            4,
            [
                "Rank".to_string(),
                self.style.label(p1.rank, p1.premium),
                self.style.label(p2.rank, p2.premium),
                String::new(),
            ],
        );
        table.set_row(
            5,
            [
                "Kills".to_string(),
                format_exact_number(p1.kills),
                format_exact_number(p2.kills),
                String::new(),
            ],
        );
        table.set_row(
            6,
            [
                "Deaths".to_string(),
                format_exact_number(p1.deaths),
                format_exact_number(p2.deaths),
                String::new(),
            ],
        );
        write!(f, "{table}")?;

        let verdict = match self.equipment.winner {
            Winner::Player1 => p1.username.as_str(),
            Winner::Player2 => p2.username.as_str(),
            Winner::Tie => "Tie",
        };
        writeln!(f, "Equipment: {verdict} ({})", self.equipment.reason)?;

        for record in [p1, p2] {
            if record.is_degraded() {
                writeln!(
                    f,
                    "Note: {} could not be read fully, their values are guessed from the rankings table",
                    record.username
                )?;
            }
        }

        Ok(())
    }
}

/// A comparison, as json
#[derive(Debug, serde::Serialize)]
pub struct ComparisonReport<'a> {
    pub player1: &'a PlayerRecord,
    pub player2: &'a PlayerRecord,
    pub equipment: &'a Comparison,
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}
