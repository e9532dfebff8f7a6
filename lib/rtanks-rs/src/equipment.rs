use crate::types::{
    EquipmentKind,
    EquipmentSet,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{
    Html,
    Selector,
};
use std::collections::HashMap;
use tracing::debug;

/// Turrets, as `(russian, english)`
const TURRETS: &[(&str, &str)] = &[
    ("Смоки", "Smoky"),
    ("Рельса", "Rail"),
    ("Рикошет", "Ricochet"),
    ("Изида", "Isida"),
    ("Фриз", "Freeze"),
    ("Огнемет", "Flamethrower"),
    ("Гром", "Thunder"),
    ("Молот", "Hammer"),
    ("Вулкан", "Vulcan"),
    ("Твинс", "Twins"),
    ("Шафт", "Shaft"),
    ("Страйкер", "Striker"),
];

/// Hulls, as `(russian, english)`
const HULLS: &[(&str, &str)] = &[
    ("Хантер", "Hunter"),
    ("Мамонт", "Mammoth"),
    ("Титан", "Titan"),
    ("Васп", "Wasp"),
    ("Викинг", "Viking"),
    ("Хорнет", "Hornet"),
    ("Диктатор", "Dictator"),
];

/// Protections, as `(image path name, display name)`
const PROTECTIONS: &[(&str, &str)] = &[
    ("badger", "Badger"),
    ("spider", "Spider"),
    ("falcon", "Falcon"),
    ("bear", "Bear"),
    ("wolf", "Wolf"),
    ("fox", "Fox"),
    ("eagle", "Eagle"),
    ("tiger", "Tiger"),
    ("shark", "Shark"),
    ("lion", "Lion"),
    ("snake", "Snake"),
    ("hawk", "Hawk"),
    ("panther", "Panther"),
    ("dolphin", "Dolphin"),
    ("ocelot", "Ocelot"),
    ("leopard", "Leopard"),
    ("rhino", "Rhino"),
    ("gorilla", "Gorilla"),
    ("grizzly", "Grizzly"),
    ("orca", "Orca"),
    ("cheetah", "Cheetah"),
    ("spectr_b", "Spectr B"),
    ("spectr_d", "Spectr D"),
    ("spectr_l", "Spectr L"),
    ("spectr_e", "Spectr E"),
];

static EQUIPMENT_CARD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.equipment-card").expect("invalid EQUIPMENT_CARD_SELECTOR")
});

/// The first modification token, with either a latin or a cyrillic `M`
static LEVEL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[MМ]([0-3])").expect("invalid LEVEL_REGEX"));

/// An `Installed: Yes` marker, in either language, possibly split across table cells
static INSTALLED_YES_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Установленный|Installed)(?:\s|[:|]|<[^>]*>|&nbsp;)*(?:Да|Yes)")
        .expect("invalid INSTALLED_YES_REGEX")
});

static NAME_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    let alternation = TURRETS
        .iter()
        .chain(HULLS)
        .flat_map(|(russian, english)| [*russian, *english])
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(r"(?i)\b({alternation})\s*[MМ]([0-3])")).expect("invalid NAME_TOKEN_REGEX")
});

static IMAGE_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)resistances/([a-z_]+)/m([0-3])/preview").expect("invalid IMAGE_TOKEN_REGEX")
});

/// Lowercased turret and hull names, russian and english, to their family and display name
static NAME_LOOKUP: Lazy<HashMap<String, (EquipmentKind, &'static str)>> = Lazy::new(|| {
    let turrets = TURRETS
        .iter()
        .map(|entry| (EquipmentKind::Turret, entry));
    let hulls = HULLS.iter().map(|entry| (EquipmentKind::Hull, entry));

    turrets
        .chain(hulls)
        .flat_map(|(kind, (russian, english))| {
            [
                (russian.to_lowercase(), (kind, *english)),
                (english.to_lowercase(), (kind, *english)),
            ]
        })
        .collect()
});

/// An item found by one of the markup passes
#[derive(Debug)]
struct Token {
    kind: EquipmentKind,
    item: String,
    start: usize,
    end: usize,
}

/// Extract owned and installed equipment from a profile page.
pub fn extract_equipment(markup: &str) -> EquipmentSet {
    let html = Html::parse_document(markup);
    extract_equipment_from_html(&html, markup)
}

/// Extract equipment from an already parsed page.
pub(crate) fn extract_equipment_from_html(html: &Html, markup: &str) -> EquipmentSet {
    let mut equipment = EquipmentSet::new();

    scan_cards(html, &mut equipment);
    scan_tokens(markup, &mut equipment);

    equipment.sort_protections();

    debug!(
        turrets = equipment.turrets.len(),
        hulls = equipment.hulls.len(),
        protections = equipment.protections.len(),
        "found equipment"
    );

    equipment
}

/// Look through equipment cards.
fn scan_cards(html: &Html, equipment: &mut EquipmentSet) {
    for card in html.select(&EQUIPMENT_CARD_SELECTOR) {
        let text = card.text().collect::<Vec<_>>().join(" ");
        let (kind, name) = match identify_card(&text) {
            Some(found) => found,
            None => continue,
        };
        let level = match LEVEL_REGEX.captures(&text).and_then(|captures| captures.get(1)) {
            Some(level) => level.as_str(),
            None => continue,
        };

        let item = format!("{name} M{level}");
        if INSTALLED_YES_REGEX.is_match(&text) {
            equipment.insert_equipped(kind, item);
        } else {
            equipment.insert_owned(kind, item);
        }
    }
}

/// Find which item a card describes, checking turrets, then hulls, then protections.
fn identify_card(text: &str) -> Option<(EquipmentKind, &'static str)> {
    let by_name = |table: &'static [(&'static str, &'static str)]| {
        table
            .iter()
            .find(|(russian, english)| text.contains(russian) || text.contains(english))
            .map(|(_, english)| *english)
    };

    if let Some(name) = by_name(TURRETS) {
        return Some((EquipmentKind::Turret, name));
    }

    if let Some(name) = by_name(HULLS) {
        return Some((EquipmentKind::Hull, name));
    }

    let lower = text.to_lowercase();
    PROTECTIONS
        .iter()
        .find(|(path_name, display)| lower.contains(path_name) || text.contains(display))
        .map(|(_, display)| (EquipmentKind::Protection, *display))
}

/// Look for name tokens and protection images in the raw markup.
///
/// An item is installed if an installed marker sits between it and the next token.
fn scan_tokens(markup: &str, equipment: &mut EquipmentSet) {
    let names = NAME_TOKEN_REGEX.captures_iter(markup).filter_map(|captures| {
        let whole = captures.get(0)?;
        let (kind, name) = NAME_LOOKUP.get(&captures.get(1)?.as_str().to_lowercase())?;
        Some(Token {
            kind: *kind,
            item: format!("{name} M{}", captures.get(2)?.as_str()),
            start: whole.start(),
            end: whole.end(),
        })
    });
    let images = IMAGE_TOKEN_REGEX.captures_iter(markup).filter_map(|captures| {
        let whole = captures.get(0)?;
        let path_name = captures.get(1)?.as_str().to_lowercase();
        let (_, display) = PROTECTIONS.iter().find(|(name, _)| *name == path_name)?;
        Some(Token {
            kind: EquipmentKind::Protection,
            item: format!("{display} M{}", captures.get(2)?.as_str()),
            start: whole.start(),
            end: whole.end(),
        })
    });

    let mut tokens: Vec<Token> = names.chain(images).collect();
    tokens.sort_by_key(|token| token.start);

    for (i, token) in tokens.iter().enumerate() {
        let region_end = tokens
            .get(i + 1)
            .map_or(markup.len(), |next| next.start.max(token.end));
        let region = &markup[token.end..region_end];

        if INSTALLED_YES_REGEX.is_match(region) {
            equipment.insert_equipped(token.kind, token.item.clone());
        } else {
            equipment.insert_owned(token.kind, token.item.clone());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn duplicate_images_are_one_item() {
        let markup = r#"<img src="/img/resistances/badger/m3/preview.png">
                        <img src="/img/resistances/badger/m3/preview.png">"#;
        let equipment = extract_equipment(markup);
        assert_eq!(equipment.protections.iter().collect::<Vec<_>>(), ["Badger M3"]);
        assert!(equipment.equipped_protections.is_empty());
    }

    #[test]
    fn unknown_animals_are_ignored() {
        let markup = r#"<img src="/img/resistances/unicorn/m2/preview.png">"#;
        assert!(extract_equipment(markup).is_empty());
    }

    #[test]
    fn installed_marker_in_region() {
        let markup = "<p>Смоки M1</p><table><tr><td>Установленный</td><td>Нет</td></tr></table>\
                      <p>Twins M3</p><table><tr><td>Installed:</td><td>Yes</td></tr></table>\
                      <p>Викинг М2</p><table><tr><td>Установленный | Да</td></tr></table>";
        let equipment = extract_equipment(markup);

        assert_eq!(equipment.turrets.iter().collect::<Vec<_>>(), ["Smoky M1", "Twins M3"]);
        assert_eq!(equipment.equipped_turrets.iter().collect::<Vec<_>>(), ["Twins M3"]);
        assert_eq!(equipment.hulls.iter().collect::<Vec<_>>(), ["Viking M2"]);
        assert_eq!(equipment.equipped_hulls.iter().collect::<Vec<_>>(), ["Viking M2"]);
    }

    #[test]
    fn cards_mark_installed_items() {
        let markup = r#"<div class="equipment-card"><span>Hornet</span> <span>M3</span>
                        <span>Installed</span> <span>Yes</span></div>
                        <div class="equipment-card"><span>Spectr B M1</span></div>"#;
        let equipment = extract_equipment(markup);

        assert_eq!(equipment.equipped_hulls.iter().collect::<Vec<_>>(), ["Hornet M3"]);
        assert_eq!(equipment.hulls.iter().collect::<Vec<_>>(), ["Hornet M3"]);
        assert_eq!(equipment.protections.iter().collect::<Vec<_>>(), ["Spectr B M1"]);
        assert!(equipment.equipped_protections.is_empty());
    }

    #[test]
    fn protections_are_sorted() {
        let markup = r#"<img src="resistances/wolf/m1/preview.png">
                        <img src="resistances/badger/m0/preview.png">
                        <img src="resistances/orca/m2/preview.png">"#;
        let equipment = extract_equipment(markup);
        assert_eq!(
            equipment.protections.iter().collect::<Vec<_>>(),
            ["Badger M0", "Orca M2", "Wolf M1"]
        );
    }

    #[test]
    fn same_markup_same_result() {
        let markup = include_str!("../test_data/profile.html");
        assert_eq!(extract_equipment(markup), extract_equipment(markup));

        let doubled = format!("{markup}{markup}");
        assert_eq!(extract_equipment(&doubled).turrets, extract_equipment(markup).turrets);
    }
}
