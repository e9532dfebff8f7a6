use crate::{
    extract::collapse_whitespace,
    types::{
        PartialRecord,
        Rank,
        RecordSource,
    },
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{
    ElementRef,
    Html,
    Selector,
};
use tracing::{
    debug,
    warn,
};

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table tr").expect("invalid ROW_SELECTOR"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("invalid CELL_SELECTOR"));
static DIV_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div").expect("invalid DIV_SELECTOR"));

/// A whole number, optionally grouped with commas
static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\d{1,3}(?:,\d{3})+|\d+)\b").expect("invalid NUMBER_REGEX")
});

static ONLINE_PLAYERS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Online players:\s*(\d+)").expect("invalid ONLINE_PLAYERS_REGEX")
});

const ONLINE_PLAYERS_PREFIX: &str = "Online players:";

/// Search the rankings table for a player.
///
/// The first row mentioning `username` with at least two cells is used.
/// Its largest number is taken as the experience.
/// Everything else is a guess, so the record is marked as [`RecordSource::Listing`].
pub fn search_listing(markup: &str, username: &str) -> Option<PartialRecord> {
    let html = Html::parse_document(markup);
    let needle = username.to_lowercase();

    let row = html.select(&ROW_SELECTOR).find(|row| {
        row.text()
            .collect::<String>()
            .to_lowercase()
            .contains(&needle)
    })?;

    let experience = largest_number(row)?;
    debug!(experience, "found `{username}` in the rankings table");

    let mut record = PartialRecord::new(username, RecordSource::Listing);
    record.rank = Some(Rank::LegendPremium);
    record.experience = experience;
    record.premium = true;

    Some(record)
}

/// Get the largest number in a row, if it has enough cells and a non-zero number.
fn largest_number(row: ElementRef<'_>) -> Option<u64> {
    let cells: Vec<_> = row.select(&CELL_SELECTOR).collect();
    if cells.len() < 2 {
        return None;
    }

    let largest = cells
        .iter()
        .flat_map(|cell| {
            let text = cell.text().collect::<String>();
            NUMBER_REGEX
                .find_iter(&text)
                .filter_map(|number| number.as_str().replace(',', "").parse::<u64>().ok())
                .collect::<Vec<_>>()
        })
        .max()?;

    (largest > 0).then_some(largest)
}

/// Read the online player count from the main page.
///
/// Returns `None` if the counter is missing.
pub fn online_players_count(markup: &str) -> Option<u32> {
    let html = Html::parse_document(markup);

    let div = html.select(&DIV_SELECTOR).find(|div| {
        div.text()
            .collect::<String>()
            .trim()
            .starts_with(ONLINE_PLAYERS_PREFIX)
    });
    let div = match div {
        Some(div) => div,
        None => {
            warn!("missing online players counter");
            return None;
        }
    };

    let text = collapse_whitespace(div.text());
    let count = ONLINE_PLAYERS_REGEX
        .captures(&text)
        .and_then(|captures| captures.get(1)?.as_str().parse().ok());
    if count.is_none() {
        warn!("online players counter has no number");
    }

    count
}

#[cfg(test)]
mod test {
    use super::*;

    const LISTING: &str = include_str!("../test_data/listing.html");

    #[test]
    fn largest_number_is_experience() {
        let record = search_listing(LISTING, "tankace").expect("player not found");
        assert_eq!(record.username, "tankace");
        assert_eq!(record.experience, 1500);
        assert_eq!(record.rank, Some(Rank::LegendPremium));
        assert!(record.premium);
        assert!(!record.is_online);
        assert!(record.equipment.is_empty());
        assert_eq!(record.source, RecordSource::Listing);

        let record = record.assemble().expect("record rejected");
        assert!(record.is_degraded());
        assert_eq!(record.rank.to_string(), "Legend Premium");
    }

    #[test]
    fn grouped_numbers() {
        let record = search_listing(LISTING, "Rekt").expect("player not found");
        assert_eq!(record.experience, 2_345_678);
    }

    #[test]
    fn missing_player() {
        assert!(search_listing(LISTING, "nobody_here").is_none());
    }

    #[test]
    fn rows_need_two_cells_and_a_number() {
        let markup = "<table><tr><td>lonely 5000</td></tr>\
                      <tr><td>zeroes</td><td>0</td></tr></table>";
        assert!(search_listing(markup, "lonely").is_none());
        assert!(search_listing(markup, "zeroes").is_none());
    }

    #[test]
    fn online_count() {
        assert_eq!(online_players_count(LISTING), Some(128));
        assert_eq!(online_players_count("<div>Online players: ?</div>"), None);
        assert_eq!(online_players_count("<p>Online players: 3</p>"), None);
    }
}
