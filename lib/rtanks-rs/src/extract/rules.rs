use regex::{
    Captures,
    Regex,
};
use scraper::Html;

/// What a [`Rule`] is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    /// The raw html
    Markup,

    /// The visible text, tags removed and whitespace collapsed
    Text,
}

/// A pattern for one field.
///
/// Rules are kept in priority order, and the first one that yields a value wins.
#[derive(Debug)]
pub(crate) struct Rule {
    pub(crate) source: Source,
    pub(crate) regex: Regex,
}

impl Rule {
    /// Make a rule that runs on the raw html.
    ///
    /// # Panics
    /// Panics if the pattern is invalid.
    pub(crate) fn markup(pattern: &str) -> Self {
        Self {
            source: Source::Markup,
            regex: Regex::new(pattern).expect("invalid markup rule"),
        }
    }

    /// Make a rule that runs on the visible text.
    ///
    /// # Panics
    /// Panics if the pattern is invalid.
    pub(crate) fn text(pattern: &str) -> Self {
        Self {
            source: Source::Text,
            regex: Regex::new(pattern).expect("invalid text rule"),
        }
    }
}

/// A page, in both forms the rules need.
#[derive(Debug)]
pub(crate) struct Document<'a> {
    pub(crate) markup: &'a str,
    pub(crate) text: String,
}

impl<'a> Document<'a> {
    pub(crate) fn new(markup: &'a str, html: &Html) -> Self {
        let text = collapse_whitespace(html.root_element().text());
        Self { markup, text }
    }

    fn get(&self, source: Source) -> &str {
        match source {
            Source::Markup => self.markup,
            Source::Text => &self.text,
        }
    }

    /// Run rules in order, returning the first value `parse` accepts.
    ///
    /// A rule that matches but fails to parse is skipped.
    pub(crate) fn first<T, F>(&self, rules: &[Rule], mut parse: F) -> Option<T>
    where
        F: FnMut(&Captures<'_>) -> Option<T>,
    {
        rules.iter().find_map(|rule| {
            let captures = rule.regex.captures(self.get(rule.source))?;
            parse(&captures)
        })
    }

    /// Run rules in order, returning the first capture group 1 that parses as a grouped number.
    pub(crate) fn first_number(&self, rules: &[Rule]) -> Option<u64> {
        self.first(rules, |captures| parse_grouped_number(captures.get(1)?.as_str()))
    }

    /// Returns `true` if any rule matches.
    pub(crate) fn any_match(&self, rules: &[Rule]) -> bool {
        rules
            .iter()
            .any(|rule| rule.regex.is_match(self.get(rule.source)))
    }
}

/// Parse a number like `1 234 567` or `1,234,567`.
///
/// Returns `None` for anything that is not digits once grouping is removed.
pub(crate) fn parse_grouped_number(value: &str) -> Option<u64> {
    let digits: String = value
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

/// Join text nodes, collapsing runs of whitespace into one space.
pub(crate) fn collapse_whitespace<'a>(text: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for word in text.flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn grouped_numbers() {
        assert_eq!(parse_grouped_number("105613"), Some(105_613));
        assert_eq!(parse_grouped_number("105 613"), Some(105_613));
        assert_eq!(parse_grouped_number("1,234,567"), Some(1_234_567));
        assert_eq!(parse_grouped_number("12\u{a0}300"), Some(12_300));
        assert_eq!(parse_grouped_number(""), None);
        assert_eq!(parse_grouped_number("١٢٣"), None);
        assert_eq!(parse_grouped_number("99999999999999999999999"), None);
    }

    #[test]
    fn collapse() {
        let text = collapse_whitespace(["  Kills:\n", " 12 ", "", "\tDeaths "].into_iter());
        assert_eq!(text, "Kills: 12 Deaths");
    }

    #[test]
    fn first_rule_that_parses_wins() {
        let html = Html::parse_document("<p>Kills: 1x</p><p>Destroyed 77</p>");
        let document = Document::new("Kills: 1x <b>Destroyed 77</b>", &html);
        let rules = [
            Rule::markup(r"Kills:\s*(\S+)"),
            Rule::text(r"Destroyed\s*(\d+)"),
        ];
        assert_eq!(document.first_number(&rules), Some(77));
    }
}
