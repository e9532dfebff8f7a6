mod rules;

pub(crate) use self::rules::collapse_whitespace;
use self::rules::{
    Document,
    Rule,
};
use crate::{
    equipment::extract_equipment_from_html,
    types::{
        PartialRecord,
        Rank,
        RecordSource,
    },
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{
    Html,
    Selector,
};
use tracing::debug;
use url::Url;

/// A number, grouped like `1 234` or `1,234`, or plain like `1234`.
///
/// A grouped run must end at a digit boundary, so a plain number is never cut into groups.
const NUMBER: &str = r"(\d{1,3}(?:[\s,]\d{3})+\b|\d+)";

static ONLINE_STATUS_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span#online_status").expect("invalid ONLINE_STATUS_SELECTOR")
});

static RANKINGS_MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("Rankings|Рейтинг").expect("invalid RANKINGS_MARKER_REGEX"));

static CLAN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]").expect("invalid CLAN_REGEX"));

static USER_PATH_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://localhost/user/").expect("invalid USER_PATH_BASE"));

static USERNAME_RULES: Lazy<[Rule; 3]> = Lazy::new(|| {
    [
        Rule::markup(r"(?i)<h1[^>]*>(?:[^—<]*—\s*)?([^<\[]+)"),
        Rule::markup(r"(?i)<title[^>]*>(?:[^—<]*—\s*)?([^<\[]+)"),
        Rule::markup(r"(?i)profile[^>]*>(?:[^—<]*—\s*)?([^<\[]+)"),
    ]
});

static EXPERIENCE_PAIR_RULES: Lazy<[Rule; 1]> =
    Lazy::new(|| [Rule::markup(&format!(r"{NUMBER}\s*/\s*{NUMBER}"))]);

static EXPERIENCE_RULES: Lazy<[Rule; 3]> = Lazy::new(|| {
    [
        Rule::markup(&format!("(?i)Experience[^0-9]*{NUMBER}")),
        Rule::markup(&format!("(?i)Опыт[^0-9]*{NUMBER}")),
        Rule::markup(&format!(r#"(?i)"experience"[^0-9]*{NUMBER}"#)),
    ]
});

static KILLS_RULES: Lazy<[Rule; 3]> = Lazy::new(|| {
    [
        Rule::markup(&format!("(?i)Уничтожил[^0-9]*{NUMBER}")),
        Rule::markup(&format!("(?i)Destroyed[^0-9]*{NUMBER}")),
        Rule::markup(&format!(r#"(?i)"destroyed"[^0-9]*{NUMBER}"#)),
    ]
});

static DEATHS_RULES: Lazy<[Rule; 5]> = Lazy::new(|| {
    [
        Rule::markup(&format!(r"(?i)\bHit\s*{NUMBER}")),
        Rule::text(&format!(r"(?i)\bHit\s*{NUMBER}")),
        Rule::markup(&format!("(?i)Подбит[^0-9]*{NUMBER}")),
        Rule::markup(&format!("(?i)Падение[^0-9]*{NUMBER}")),
        Rule::markup(&format!(r#"(?i)"deaths"[^0-9]*{NUMBER}"#)),
    ]
});

static KD_RULES: Lazy<[Rule; 4]> = Lazy::new(|| {
    [
        Rule::markup(r"(?i)У/П[^0-9]*(\d+\.?\d*)"),
        Rule::markup(r"(?i)U/P[^0-9]*(\d+\.?\d*)"),
        Rule::markup(r#"(?i)"efficiency"[^0-9]*(\d+\.?\d*)"#),
        Rule::markup(r"(?i)По эффективности[^0-9]*#\d+[^0-9]*(\d+\.?\d*)"),
    ]
});

static PREMIUM_RULES: Lazy<[Rule; 4]> = Lazy::new(|| {
    [
        Rule::markup(r"(?i)Premium[^A-Za-z]*Yes"),
        Rule::markup(r"(?i)Премиум[^А-Яа-я]*Да"),
        Rule::text(r"(?i)Premium[^A-Za-z]*Yes"),
        Rule::text(r"(?i)Премиум[^А-Яа-я]*Да"),
    ]
});

static GROUP_RULES: Lazy<[Rule; 4]> = Lazy::new(|| {
    [
        Rule::text(r"(?i)\bGroup[^A-Za-z]*(\w+)"),
        Rule::text(r"(?i)Группа[^А-Яа-я]*([А-Яа-я\w]+)"),
        Rule::markup(r"(?i)\bGroup[^A-Za-z]*(\w+)"),
        Rule::markup(r"(?i)Группа[^А-Яа-я]*([А-Яа-я\w]+)"),
    ]
});

static GOLD_BOX_RULES: Lazy<[Rule; 4]> = Lazy::new(|| {
    [
        Rule::markup(&format!("(?i)Поймано золотых ящиков[^0-9]*{NUMBER}")),
        Rule::markup(&format!("(?i)Caught gold boxes[^0-9]*{NUMBER}")),
        Rule::markup(&format!("(?i)gold boxes[^0-9]*{NUMBER}")),
        Rule::markup(&format!("(?i)золотых ящиков[^0-9]*{NUMBER}")),
    ]
});

/// Localized rank names, longest first so that the most specific name wins.
static RANK_TEXT_REGEX: Lazy<Regex> = Lazy::new(|| {
    let mut names: Vec<&str> = RANK_NAMES
        .iter()
        .flat_map(|(russian, english)| [*russian, *english])
        .collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));
    names.dedup();

    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(r"(?i)\b({alternation})(?:\s+(\d+))?\b")).expect("invalid RANK_TEXT_REGEX")
});

/// Russian rank names and their English equivalents, as the site words them
const RANK_NAMES: &[(&str, &str)] = &[
    ("Легенда", "Legend"),
    ("Генералиссимус", "Generalissimo"),
    ("Командир бригады", "Brigadier Commander"),
    ("Командир полковник", "Colonel Commander"),
    ("Командир подполковник", "Lieutenant Colonel Commander"),
    ("Командир майор", "Major Commander"),
    ("Командир капитан", "Captain Commander"),
    ("Командир лейтенант", "Lieutenant Commander"),
    ("Командир", "Commander"),
    ("Фельдмаршал", "Field Marshal"),
    ("Маршал", "Marshal"),
    ("Генерал", "General"),
    ("Генерал-лейтенант", "Lieutenant General"),
    ("Генерал-майор", "Major General"),
    ("Бригадир", "Brigadier"),
    ("Полковник", "Colonel"),
    ("Подполковник", "Lieutenant Colonel"),
    ("Майор", "Major"),
    ("Капитан", "Captain"),
    ("Старший лейтенант", "First Lieutenant"),
    ("Лейтенант", "Second Lieutenant"),
    ("Старший прапорщик", "Master Warrant Officer"),
    ("Прапорщик", "Warrant Officer"),
    ("Старшина", "Sergeant Major"),
    ("Старший сержант", "First Sergeant"),
    ("Сержант", "Master Sergeant"),
    ("Младший сержант", "Staff Sergeant"),
    ("Ефрейтор", "Sergeant"),
    ("Старший ефрейтор", "Master Corporal"),
    ("Капрал", "Corporal"),
    ("Гефрейтор", "Gefreiter"),
    ("Рядовой", "Private"),
    ("Новобранец", "Recruit"),
];

/// Russian group names and their English equivalents
const GROUP_NAMES: &[(&str, &str)] = &[
    ("Помощник", "Helper"),
    ("Игрок", "Player"),
    ("Модератор", "Moderator"),
    ("Администратор", "Administrator"),
];

/// Bracketed tokens that are status badges, not clans
const NOT_CLANS: &[&str] = &["online", "offline", "premium"];

/// The localized word for "profile", which marks a page heading instead of a name
const PROFILE_WORD: &str = "профиль";

/// An error that may occur while extracting fields from a profile page
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The site served the rankings page instead of a profile.
    ///
    /// This is how it reports an unknown username.
    #[error("redirected to the rankings page")]
    RedirectedToRankings,
}

/// Extract every field from a profile page.
///
/// Fields that cannot be found are left at their defaults.
/// The returned record may still be unacceptable, see [`PartialRecord::assemble`].
pub fn extract_fields(markup: &str, username: &str) -> Result<PartialRecord, ExtractError> {
    if is_rankings_redirect(markup, username) {
        debug!("page for `{username}` is the rankings page");
        return Err(ExtractError::RedirectedToRankings);
    }

    let html = Html::parse_document(markup);
    let document = Document::new(markup, &html);
    let mut record = PartialRecord::new(username, RecordSource::Profile);

    if let Some(found) = extract_username(&document) {
        debug!(username = %found, "found username");
        record.username = found;
    }

    record.clan = extract_clan(&document.text);
    record.is_online = extract_online_status(&html);

    match document.first(&*EXPERIENCE_PAIR_RULES, |captures| {
        let current = rules::parse_grouped_number(captures.get(1)?.as_str())?;
        let max = rules::parse_grouped_number(captures.get(2)?.as_str())?;
        Some((current, max))
    }) {
        Some((current, max)) => {
            debug!(current, max, "found experience pair");
            record.experience = current;
            record.max_experience = Some(max);
        }
        None => {
            if let Some(experience) = document.first_number(&*EXPERIENCE_RULES) {
                debug!(experience, "found experience");
                record.experience = experience;
            }
        }
    }

    let rank = Rank::from_experience(record.experience);
    record.rank = Some(rank);
    record.rank_text = extract_rank_text(&document.text);
    if let Some(rank_text) = record.rank_text.as_deref() {
        let resolved = rank.to_string();
        if !rank_text.eq_ignore_ascii_case(&resolved) {
            debug!(%rank_text, %resolved, "page rank disagrees with experience");
        }
    }

    record.kills = document.first_number(&*KILLS_RULES).unwrap_or(0);
    record.deaths = document.first_number(&*DEATHS_RULES).unwrap_or(0);
    record.kd_ratio = document.first(&*KD_RULES, |captures| {
        let ratio: f64 = captures.get(1)?.as_str().parse().ok()?;
        Some(format!("{ratio:.2}"))
    });
    record.gold_boxes = document.first_number(&*GOLD_BOX_RULES).unwrap_or(0);
    record.premium = document.any_match(&*PREMIUM_RULES);

    if let Some(group) = document.first(&*GROUP_RULES, |captures| {
        Some(translate(GROUP_NAMES, captures.get(1)?.as_str()))
    }) {
        record.group = group;
    }

    debug!(
        kills = record.kills,
        deaths = record.deaths,
        gold_boxes = record.gold_boxes,
        premium = record.premium,
        group = %record.group,
        "found stats"
    );

    record.equipment = extract_equipment_from_html(&html, markup);

    Ok(record)
}

/// Returns `true` if the page is the rankings page and not a profile of `username`.
fn is_rankings_redirect(markup: &str, username: &str) -> bool {
    if !RANKINGS_MARKER_REGEX.is_match(markup) {
        return false;
    }

    let markup = markup.to_lowercase();
    let raw = format!("/user/{username}").to_lowercase();
    if markup.contains(&raw) {
        return false;
    }

    match user_path(username) {
        Some(encoded) => !markup.contains(&encoded.to_lowercase()),
        None => true,
    }
}

/// The percent-encoded `/user/{username}` path
fn user_path(username: &str) -> Option<String> {
    let mut url = USER_PATH_BASE.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(username);
    Some(url.path().to_string())
}

fn extract_username(document: &Document<'_>) -> Option<String> {
    document.first(&*USERNAME_RULES, |captures| {
        let candidate = captures.get(1)?.as_str().trim();
        let acceptable = candidate.chars().count() > 2
            && !candidate.to_lowercase().contains(PROFILE_WORD);
        acceptable.then(|| candidate.to_string())
    })
}

fn extract_clan(text: &str) -> Option<String> {
    CLAN_REGEX.captures_iter(text).find_map(|captures| {
        let candidate = captures.get(1)?.as_str().trim();
        let is_badge = NOT_CLANS
            .iter()
            .any(|badge| candidate.eq_ignore_ascii_case(badge));
        (!candidate.is_empty() && !is_badge).then(|| candidate.to_string())
    })
}

fn extract_online_status(html: &Html) -> bool {
    let status = match html.select(&ONLINE_STATUS_SELECTOR).next() {
        Some(element) => element.text().collect::<String>(),
        None => {
            debug!("missing online status marker");
            return false;
        }
    };

    let status = status.trim().to_lowercase();
    status == "yes" || status == "да"
}

fn extract_rank_text(text: &str) -> Option<String> {
    let captures = RANK_TEXT_REGEX.captures(text)?;
    let name = translate(RANK_NAMES, captures.get(1)?.as_str());
    match captures.get(2) {
        Some(level) => Some(format!("{name} {}", level.as_str())),
        None => Some(name),
    }
}

/// Translate a Russian name, passing unknown names through.
fn translate(table: &[(&str, &str)], name: &str) -> String {
    let lower = name.to_lowercase();
    table
        .iter()
        .find(|(russian, english)| {
            russian.to_lowercase() == lower || english.to_lowercase() == lower
        })
        .map_or_else(|| name.to_string(), |(_, english)| english.to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{
        EquipmentKind,
        FixedRank,
    };

    const PROFILE: &str = include_str!("../test_data/profile.html");
    const RANKINGS: &str = include_str!("../test_data/listing.html");

    fn wrap(body: &str) -> String {
        format!("<html><head><title>Test</title></head><body>{body}</body></html>")
    }

    #[test]
    fn parse_profile() {
        let record = extract_fields(PROFILE, "rekt").expect("failed to extract");
        dbg!(&record);

        assert_eq!(record.username, "Rekt");
        assert_eq!(record.clan.as_deref(), Some("Phoenix"));
        assert!(record.is_online);
        assert_eq!(record.experience, 105_613);
        assert_eq!(record.max_experience, Some(125_000));
        assert_eq!(record.rank, Some(Rank::Fixed(FixedRank::WarrantOfficer3)));
        assert_eq!(record.rank_text.as_deref(), Some("Warrant Officer 3"));
        assert_eq!(record.kills, 4512);
        assert_eq!(record.deaths, 1806);
        assert_eq!(record.kd_ratio.as_deref(), Some("2.50"));
        assert_eq!(record.gold_boxes, 37);
        assert!(record.premium);
        assert_eq!(record.group, "Helper");

        let equipment = &record.equipment;
        assert_eq!(
            equipment.owned(EquipmentKind::Turret).iter().collect::<Vec<_>>(),
            ["Rail M3", "Smoky M2"]
        );
        assert_eq!(
            equipment.owned(EquipmentKind::Hull).iter().collect::<Vec<_>>(),
            ["Hunter M3", "Mammoth M1"]
        );
        assert_eq!(
            equipment.owned(EquipmentKind::Protection).iter().collect::<Vec<_>>(),
            ["Badger M3", "Fox M1"]
        );
        assert_eq!(
            equipment.equipped(EquipmentKind::Turret).iter().collect::<Vec<_>>(),
            ["Rail M3"]
        );
        assert_eq!(
            equipment.equipped(EquipmentKind::Hull).iter().collect::<Vec<_>>(),
            ["Hunter M3"]
        );
        assert_eq!(
            equipment.equipped(EquipmentKind::Protection).iter().collect::<Vec<_>>(),
            ["Badger M3"]
        );

        let record = record.assemble().expect("record rejected");
        assert_eq!(record.kd_ratio, "2.50");
        assert!(!record.is_degraded());
    }

    #[test]
    fn rankings_page_is_a_redirect() {
        let error = extract_fields(RANKINGS, "nobody_here").expect_err("redirect not detected");
        assert_eq!(error, ExtractError::RedirectedToRankings);
    }

    #[test]
    fn redirect_check_accepts_encoded_names() {
        let markup = r#"<a href="/user/%D0%A2%D0%B0%D0%BD%D0%BA">Рейтинг</a>"#;
        assert!(!is_rankings_redirect(markup, "Танк"));
        assert!(is_rankings_redirect(markup, "Other"));

        let markup = r#"<a href="/user/REKT">Rankings</a>"#;
        assert!(!is_rankings_redirect(markup, "rekt"));
        assert!(!is_rankings_redirect("no marker here", "rekt"));
    }

    #[test]
    fn experience_pair() {
        let markup = wrap("<p>Experience</p><p>105613/125000</p>");
        let record = extract_fields(&markup, "tanker").expect("failed to extract");
        assert_eq!(record.experience, 105_613);
        assert_eq!(record.max_experience, Some(125_000));
        assert_eq!(record.rank, Some(Rank::Fixed(FixedRank::WarrantOfficer3)));

        let markup = wrap("<p>1,234,567 / 1,255,000</p>");
        let record = extract_fields(&markup, "tanker").expect("failed to extract");
        assert_eq!(record.experience, 1_234_567);
        assert_eq!(record.max_experience, Some(1_255_000));
    }

    #[test]
    fn single_experience() {
        let markup = wrap("<p>Опыт: 1,600,000</p>");
        let record = extract_fields(&markup, "tanker").expect("failed to extract");
        assert_eq!(record.experience, 1_600_000);
        assert_eq!(record.max_experience, None);
        assert_eq!(record.rank, Some(Rank::Legend(1)));
    }

    #[test]
    fn ungrouped_numbers_are_whole() {
        let markup = wrap("<p>Destroyed: 4512</p><p>Hit 1806</p><p>Caught gold boxes: 1234</p>");
        let record = extract_fields(&markup, "tanker").expect("failed to extract");
        assert_eq!(record.kills, 4512);
        assert_eq!(record.deaths, 1806);
        assert_eq!(record.gold_boxes, 1234);

        let markup = wrap("<p>Experience: 1600000</p>");
        let record = extract_fields(&markup, "tanker").expect("failed to extract");
        assert_eq!(record.experience, 1_600_000);
        assert_eq!(record.rank, Some(Rank::Legend(1)));

        let markup = wrap("<p>1700000/1800000</p>");
        let record = extract_fields(&markup, "tanker").expect("failed to extract");
        assert_eq!(record.experience, 1_700_000);
        assert_eq!(record.max_experience, Some(1_800_000));

        let markup = wrap("<p>Уничтожил</p><p>12 300</p>");
        let record = extract_fields(&markup, "tanker").expect("failed to extract");
        assert_eq!(record.kills, 12_300);
    }

    #[test]
    fn empty_page_has_defaults() {
        let markup = wrap("<p>nothing to see</p>");
        let record = extract_fields(&markup, "tanker").expect("failed to extract");
        assert_eq!(record.username, "tanker");
        assert_eq!(record.experience, 0);
        assert_eq!(record.kills, 0);
        assert_eq!(record.kd_ratio, None);
        assert_eq!(record.group, crate::types::UNKNOWN_GROUP);
        assert!(!record.premium);
        assert!(!record.is_online);
        assert!(record.equipment.is_empty());
    }

    #[test]
    fn username_rules_skip_bad_candidates() {
        let markup = "<html><head><title>Профиль — TankAce</title></head>\
                      <body><h1>Профиль</h1></body></html>";
        let record = extract_fields(markup, "tankace").expect("failed to extract");
        assert_eq!(record.username, "TankAce");

        let markup = "<html><body><h1>ab</h1></body></html>";
        let record = extract_fields(markup, "abc").expect("failed to extract");
        assert_eq!(record.username, "abc");
    }

    #[test]
    fn clan_skips_badges() {
        assert_eq!(extract_clan("Rekt [online] [Wolves]").as_deref(), Some("Wolves"));
        assert_eq!(extract_clan("Rekt [Premium]"), None);
        assert_eq!(extract_clan("Rekt"), None);
    }

    #[test]
    fn english_labels() {
        let markup = wrap(
            "<span id=\"online_status\">yes</span>\
             <p>Destroyed: 1,204</p><p>Hit 301</p><p>U/P: 0</p>\
             <p>Premium: No</p><p>Group: Moderator</p><p>Caught gold boxes: 3</p>",
        );
        let record = extract_fields(&markup, "tanker").expect("failed to extract");
        assert!(record.is_online);
        assert_eq!(record.kills, 1204);
        assert_eq!(record.deaths, 301);
        assert_eq!(record.kd_ratio.as_deref(), Some("0.00"));
        assert!(!record.premium);
        assert_eq!(record.group, "Moderator");
        assert_eq!(record.gold_boxes, 3);

        let record = record.assemble().expect("record rejected");
        assert_eq!(record.kd_ratio, "4.00");
    }

    #[test]
    fn unmapped_group_passes_through() {
        let markup = wrap("<p>Группа: Тестер</p>");
        let record = extract_fields(&markup, "tanker").expect("failed to extract");
        assert_eq!(record.group, "Тестер");
    }

    #[test]
    fn rank_text_translation() {
        assert_eq!(
            extract_rank_text("Звание Генерал-майор").as_deref(),
            Some("Major General")
        );
        assert_eq!(extract_rank_text("Rank: Legend 4").as_deref(), Some("Legend 4"));
        assert_eq!(
            extract_rank_text("Звание Старший прапорщик").as_deref(),
            Some("Master Warrant Officer")
        );
        assert_eq!(extract_rank_text("Звание Прапорщик 2").as_deref(), Some("Warrant Officer 2"));
        assert_eq!(extract_rank_text("Звание Гефрейтор").as_deref(), Some("Gefreiter"));
        assert_eq!(extract_rank_text("nothing"), None);
    }

    #[test]
    fn encoded_user_path() {
        assert_eq!(user_path("Rekt").as_deref(), Some("/user/Rekt"));
        assert_eq!(user_path("a b").as_deref(), Some("/user/a%20b"));
    }
}
