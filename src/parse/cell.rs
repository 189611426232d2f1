use crate::menu::{MenuItem, Won};
use crate::static_regex;

use super::markup::{
    clean_line, decode_entities, plain_text, remove_all, split_lines, strip_parentheticals,
    strip_spans, strip_tags,
};
use super::remove_excess_whitespace;

/// Note attached to a cell that was found but yielded no menu.
pub const NO_MENU_NOTE: &str = "메뉴 정보 없음";

static_regex!(LEADING_HOURS <- r"^(\d{2}:\d{2}~\d{2}:\d{2})");
static_regex!(HOURS <- r"\d{2}:\d{2}~\d{2}:\d{2}(?:\s*/\s*\d{2}:\d{2}~\d{2}:\d{2})?");
static_regex!(SET_PRICE <- r"￦\s*([\d,]+)");
static_regex!(LINE_PRICE <- r"([\d,]+)원");
static_regex!(PRICE_ONLY <- r"^([\d,]+)원$");
static_regex!(NAME_PRICE_PAIR <- r"(.*?)([\d,]+원)");
static_regex!(PARENTHESIZED_HOURS <- r"\(\d{2}:\d{2}~\d{2}:\d{2}\)");
static_regex!(NEW_MARKER <- r"(?i)\[NEW\]");

const LIMITED_SALE: &str = "(한정판매)";
const ITEMIZED_NOISE: &[&str] = &["-더진국-"];

/// What a single cell says about one meal period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellOutcome {
    Open(Vec<MenuItem>),
    Closed { notes: Option<String> },
    Unavailable { notes: Option<String> },
}

impl CellOutcome {
    fn from_items(items: Vec<MenuItem>) -> Self {
        if items.is_empty() {
            Self::Unavailable {
                notes: Some(NO_MENU_NOTE.to_string()),
            }
        } else {
            Self::Open(items)
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(items) if !items.is_empty())
    }

    pub fn items(&self) -> &[MenuItem] {
        match self {
            Self::Open(items) => items,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum CellGrammar {
    /// One dish per line.
    LineScan {
        noise: &'static [&'static str],
        rewrites: &'static [(&'static str, &'static str)],
    },
    /// A set meal with one price, or a list of individually priced dishes.
    SetOrItemized(SetMenuRules),
}

#[derive(Debug, Clone, Copy)]
pub struct SetMenuRules {
    /// A cell containing this word is a day off; an empty cell is closed too.
    pub closure_keyword: Option<&'static str>,
    /// Removed from every line of a set-menu cell.
    pub set_noise: &'static [&'static str],
    /// Split set-meal components on `&` as well as `*`.
    pub split_ampersand: bool,
}

impl CellGrammar {
    pub fn parse(&self, cell_html: &str) -> CellOutcome {
        match self {
            Self::LineScan { noise, rewrites } => {
                CellOutcome::from_items(scan_lines(cell_html, noise, rewrites))
            }
            Self::SetOrItemized(rules) => parse_set_or_itemized(cell_html, rules),
        }
    }
}

fn price_of(digits: &str) -> Option<Won> {
    Won::parse(digits).ok()
}

/// Walks the lines with a cursor. A line that is only a price belongs to the name before
/// it and is consumed together with that name.
fn scan_lines(
    cell_html: &str,
    noise: &[&str],
    rewrites: &[(&str, &str)],
) -> Vec<MenuItem> {
    let lines: Vec<String> = split_lines(cell_html)
        .into_iter()
        .map(|line| {
            let line = remove_all(&clean_line(line), noise);
            rewrites
                .iter()
                .fold(line, |acc, (from, to)| acc.replace(from, to))
                .trim()
                .to_string()
        })
        .collect();

    let mut items = Vec::new();
    let mut hours: Option<String> = None;
    let mut cursor = 0;
    while cursor < lines.len() {
        let line = &lines[cursor];
        cursor += 1;
        if line.is_empty() {
            continue;
        }
        if let Some(captures) = LEADING_HOURS.captures(line) {
            hours = Some(captures[1].to_string());
            continue;
        }

        let (name, price) = if let Some(captures) = LINE_PRICE.captures(line) {
            let name = line.replacen(&captures[0], "", 1).trim().to_string();
            (name, price_of(&captures[1]))
        } else if let Some(price) = lines
            .get(cursor)
            .and_then(|next| PRICE_ONLY.captures(next))
            .map(|captures| price_of(&captures[1]))
        {
            cursor += 1;
            (line.clone(), price)
        } else {
            (line.clone(), None)
        };

        if let Some(item) = MenuItem::single(name) {
            items.push(item.with_price(price).with_hours(hours.clone()));
        }
    }
    items
}

fn parse_set_or_itemized(cell_html: &str, rules: &SetMenuRules) -> CellOutcome {
    if let Some(keyword) = rules.closure_keyword {
        let text = plain_text(cell_html);
        if text.contains(keyword) {
            return CellOutcome::Closed { notes: Some(text) };
        }
        if text.is_empty() {
            return CellOutcome::Closed { notes: None };
        }
    }

    let hours = HOURS.find(cell_html).map(|m| m.as_str().to_string());
    let set_price = SET_PRICE
        .captures(cell_html)
        .and_then(|captures| price_of(&captures[1]))
        .filter(|price| price.amount() > 0);
    let lines = split_lines(cell_html);

    let items = match set_price {
        Some(price) => set_menu(&lines, rules)
            .map(|item| item.with_price(Some(price)).with_hours(hours))
            .into_iter()
            .collect(),
        None => {
            let (items, matched) = itemized(&lines, hours.as_deref());
            if matched {
                items
            } else {
                // no `name 6,500원` pair anywhere in the cell
                price_line_fallback(&lines, hours.as_deref())
            }
        }
    };
    CellOutcome::from_items(items)
}

/// All lines of the cell become the components of a single item.
fn set_menu(lines: &[&str], rules: &SetMenuRules) -> Option<MenuItem> {
    let mut components = Vec::new();
    for line in lines {
        let line = decode_entities(&strip_tags(&strip_spans(line)));
        let line = strip_parentheticals(&line);
        let line = HOURS.replace(&line, "");
        let line = SET_PRICE.replace(&line, "");
        let line = remove_all(&line, rules.set_noise);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let separator = if line.contains('*') {
            Some('*')
        } else if rules.split_ampersand && line.contains('&') {
            Some('&')
        } else {
            None
        };
        match separator {
            Some(separator) => components.extend(
                line.split(separator)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            ),
            None => components.push(line.to_string()),
        }
    }
    MenuItem::new(components)
}

/// Scans the whole cell as one line for `name price원` pairs. The flag reports whether any
/// pair matched, even one whose name turned out empty.
fn itemized(lines: &[&str], hours: Option<&str>) -> (Vec<MenuItem>, bool) {
    let joined = lines.join(" ");
    let joined = strip_tags(&strip_spans(&joined)).into_owned();
    let joined = remove_all(&HOURS.replace(&joined, ""), ITEMIZED_NOISE);
    let joined = decode_entities(&joined);
    let joined = remove_excess_whitespace(&joined);
    let joined = joined.trim();

    let mut items = Vec::new();
    let mut matched = false;
    for captures in NAME_PRICE_PAIR.captures_iter(joined) {
        matched = true;
        let name = PARENTHESIZED_HOURS.replace_all(&captures[1], "");
        let name = NEW_MARKER.replace_all(&name.replace(LIMITED_SALE, ""), "").trim().to_string();
        if name.is_empty() {
            continue;
        }
        let digits: String = captures[2].chars().filter(char::is_ascii_digit).collect();
        let price = price_of(&digits);

        for sub_name in name.split('/') {
            let sub_name = NEW_MARKER.replace_all(sub_name, "");
            if let Some(item) = MenuItem::single(sub_name.trim()) {
                items.push(item.with_price(price).with_hours(hours.map(str::to_string)));
            }
        }
    }
    (items, matched)
}

/// Only a name directly followed by a price-only line yields an item here.
fn price_line_fallback(lines: &[&str], hours: Option<&str>) -> Vec<MenuItem> {
    let mut items = Vec::new();
    let mut cursor = 0;
    while cursor < lines.len() {
        let name = plain_text(&HOURS.replace(&strip_tags(lines[cursor]), ""));
        let name = remove_all(&name, ITEMIZED_NOISE);
        let name = name.trim();
        cursor += 1;
        if name.is_empty() {
            continue;
        }
        let Some(price) = lines
            .get(cursor)
            .and_then(|next| PRICE_ONLY.captures(&plain_text(next)).map(|c| price_of(&c[1])))
        else {
            continue;
        };
        cursor += 1;
        let name = NEW_MARKER.replace_all(&strip_parentheticals(name), "").trim().to_string();
        if let Some(item) = MenuItem::single(name) {
            items.push(item.with_price(price).with_hours(hours.map(str::to_string)));
        }
    }
    items
}
