use chrono::{DateTime, Utc};
use scraper::{CaseSensitivity, ElementRef, Html};

use super::cell::CellOutcome;
use super::floor::CLOSURE_KEYWORD;
use super::markup::{decode_entities, split_lines, strip_parentheticals, strip_tags};
use super::remove_excess_whitespace::remove_all_whitespace;
use super::table::rows;
use super::text_from_selection::{child_elements, element_from_selection, text_of};
use super::Result;
use crate::menu::{DayOfWeek, Meal, MealType, MenuItem, Restaurant, Won};
use crate::{static_regex, static_selector};

static_selector!(WEEKLY_TABLE <- "#sdetail > table:nth-child(2)");
static_selector!(CONTENT_SPAN <- r#"span[style*="color:#303030"]"#);

static_regex!(MONDAY_HEADING <- r"월\s*<br\s*/?>");
static_regex!(SET_PRICE <- r"￦\s*([\d,]+)");
static_regex!(LINE_PRICE <- r"([\d,]+)원");
static_regex!(PRICE_ONLY <- r"^([\d,]+)원$");
static_regex!(NEW_MARKER <- r"\[NEW\]");

const SECTION_CLASS: &str = "menu_st";
const DATE_ROW_LABEL: &str = "코너";
const DINNER_LABEL: &str = "석식";

/// Columns the day headings may sit in: Sunday through Saturday.
const DAY_COLUMNS: std::ops::RangeInclusive<usize> = 2..=8;

const CORNERS: &[(&str, &str, Restaurant)] = &[
    ("상록원3층식당", "집밥", Restaurant::Floor3HomeMeal),
    ("상록원3층식당", "한그릇(한정판매)", Restaurant::Floor3OneBowl),
    ("상록원2층식당", "일품코너", Restaurant::Floor2Special),
    ("상록원2층식당", "양식코너", Restaurant::Floor2Western),
    ("상록원2층식당", "뚝배기코너", Restaurant::Floor2Ttukbaegi),
];

/// Section whose menus do not change during the week.
const CONSTANT_SECTION: &str = "솥앤누들";
const CONSTANT_CORNER: &str = "메뉴";
/// A constant-menu row is recognised by what its Monday cell lists.
const CONSTANT_MENUS: &[(&str, Restaurant)] = &[
    ("****분식당****", Restaurant::Snackbar),
    ("삼겹살김치철판", Restaurant::SotAndNoodle),
];
const CONSTANT_FIRST_COLUMN: usize = 3;

/// The weekly menu table: the second child of `#sdetail`.
pub fn locate_weekly_table(document: &Html) -> Result<ElementRef<'_>> {
    element_from_selection(&WEEKLY_TABLE, document.root_element(), "weekly menu table")
}

fn day_of_initial(initial: char) -> Option<DayOfWeek> {
    match initial {
        '일' => Some(DayOfWeek::Sun),
        '월' => Some(DayOfWeek::Mon),
        '화' => Some(DayOfWeek::Tue),
        '수' => Some(DayOfWeek::Wed),
        '목' => Some(DayOfWeek::Thu),
        '금' => Some(DayOfWeek::Fri),
        '토' => Some(DayOfWeek::Sat),
        _ => None,
    }
}

fn meal_type_of(label: &str) -> Option<MealType> {
    match label {
        "중식" => Some(MealType::Lunch),
        DINNER_LABEL => Some(MealType::Dinner),
        _ => None,
    }
}

fn restaurant_for(section: &str, corner: &str) -> Option<Restaurant> {
    CORNERS
        .iter()
        .find(|(s, c, _)| *s == section && *c == corner)
        .map(|(_, _, restaurant)| *restaurant)
}

/// Column index and day of every heading in the row whose fourth cell reads `월<br>…`.
fn day_columns(rows: &[Vec<ElementRef<'_>>]) -> Vec<(usize, DayOfWeek)> {
    let Some(header) = rows.iter().find(|cells| {
        cells
            .get(3)
            .is_some_and(|cell| MONDAY_HEADING.is_match(&cell.inner_html()))
    }) else {
        log::warn!("weekly page: no day heading row");
        return Vec::new();
    };
    DAY_COLUMNS
        .filter_map(|column| {
            let initial = text_of(*header.get(column)?).trim().chars().next()?;
            Some((column, day_of_initial(initial)?))
        })
        .collect()
}

fn price_of(digits: &str) -> Option<Won> {
    Won::parse(digits).ok().filter(|price| price.amount() > 0)
}

/// What one day's cell of the weekly table holds. Only the text in the dark content span
/// counts as menu; a price may sit anywhere in the cell.
fn parse_weekly_cell(cell: ElementRef<'_>) -> CellOutcome {
    let Some(content) = cell
        .select(&CONTENT_SPAN)
        .next()
        .filter(|span| !text_of(*span).trim().is_empty())
    else {
        return CellOutcome::Closed { notes: None };
    };
    let raw = content.inner_html();
    if raw.contains(CLOSURE_KEYWORD) {
        return CellOutcome::Closed { notes: None };
    }

    let cell_text = text_of(cell);
    let set_price = SET_PRICE
        .captures(&cell_text)
        .or_else(|| LINE_PRICE.captures(&cell_text))
        .and_then(|captures| price_of(&captures[1]));
    let lines: Vec<String> = split_lines(&raw)
        .into_iter()
        .map(|line| {
            strip_tags(&strip_parentheticals(&decode_entities(line)))
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty() && !line.starts_with("**") && !line.contains("한정판매"))
        .collect();

    if let Some(price) = set_price {
        if !lines.iter().any(|line| LINE_PRICE.is_match(line)) {
            if let Some(item) = MenuItem::new(lines.clone()) {
                return CellOutcome::Open(vec![item.with_price(Some(price))]);
            }
        }
    }

    let items = priced_lines(&raw);
    if !items.is_empty() {
        return CellOutcome::Open(items);
    }
    match (set_price, lines.as_slice()) {
        (Some(price), [only]) => MenuItem::single(only.as_str())
            .map_or(CellOutcome::Unavailable { notes: None }, |item| {
                CellOutcome::Open(vec![item.with_price(Some(price))])
            }),
        _ => CellOutcome::Unavailable { notes: None },
    }
}

/// One item per line. A line that is only a price belongs to the line before it.
fn priced_lines(raw: &str) -> Vec<MenuItem> {
    let lines: Vec<String> = split_lines(raw)
        .into_iter()
        .map(|line| decode_entities(line).trim().to_string())
        .filter(|line| !line.is_empty() && !line.starts_with("****") && !line.contains('~'))
        .collect();

    let mut items = Vec::new();
    let mut cursor = 0;
    while cursor < lines.len() {
        let mut line = lines[cursor].clone();
        cursor += 1;
        let price_line = lines.get(cursor).and_then(|next| PRICE_ONLY.captures(next));
        let price = if let Some(captures) = price_line {
            cursor += 1;
            price_of(&captures[1])
        } else if let Some(captures) = LINE_PRICE.captures(&line) {
            let price = price_of(&captures[1]);
            line = line.replacen(&captures[0], "", 1);
            price
        } else {
            None
        };
        let name = NEW_MARKER.replace_all(&line, "");
        let name = strip_tags(&strip_parentheticals(&name)).trim().to_string();
        if let Some(item) = MenuItem::single(name) {
            items.push(item.with_price(price));
        }
    }
    items
}

/// Expands the first filled cell of the row over every weekday lunch and dinner.
fn constant_menu(
    cells: &[ElementRef<'_>],
    restaurant: Restaurant,
    updated_at: DateTime<Utc>,
    meals: &mut Vec<Meal>,
) {
    let Some(cell) = cells
        .iter()
        .skip(CONSTANT_FIRST_COLUMN)
        .find(|cell| !text_of(**cell).trim().is_empty())
    else {
        return;
    };
    let outcome = parse_weekly_cell(*cell);
    for day in &DayOfWeek::ALL[..5] {
        for meal_type in [MealType::Lunch, MealType::Dinner] {
            meals.push(Meal::new(restaurant, *day, meal_type, outcome.clone(), updated_at));
        }
    }
}

/// Every `Meal` of the week the table holds, all stamped with `updated_at`.
///
/// Restaurant sections open with a `menu_st` cell; a corner label spans its lunch and
/// dinner rows, so only the first of them carries it.
pub fn parse_weekly_table(table: ElementRef<'_>, updated_at: DateTime<Utc>) -> Vec<Meal> {
    let rows: Vec<Vec<ElementRef>> = rows(table)
        .map(|row| child_elements(row, &["td", "th"]).collect())
        .collect();
    let days = day_columns(&rows);

    let mut section = String::new();
    let mut corner = String::new();
    let mut meals = Vec::new();
    for cells in &rows {
        let Some(first) = cells.first() else {
            continue;
        };
        let first_text = text_of(*first);
        if first.value().has_class(SECTION_CLASS, CaseSensitivity::CaseSensitive) {
            section = remove_all_whitespace(&first_text);
            corner.clear();
            continue;
        }
        if first.value().attr("colspan") == Some("2") && first_text.contains(DATE_ROW_LABEL) {
            continue;
        }
        let starts_corner = first.value().attr("rowspan").is_some();
        if starts_corner {
            let label = remove_all_whitespace(&first_text);
            if label != DINNER_LABEL {
                corner = label;
            }
        }

        if section.contains(CONSTANT_SECTION) {
            if corner == CONSTANT_CORNER {
                let monday = cells.get(CONSTANT_FIRST_COLUMN).map(|cell| text_of(*cell));
                let restaurant = monday.and_then(|text| {
                    CONSTANT_MENUS
                        .iter()
                        .find(|(marker, _)| text.contains(marker))
                        .map(|(_, restaurant)| *restaurant)
                });
                if let Some(restaurant) = restaurant {
                    constant_menu(cells, restaurant, updated_at, &mut meals);
                }
            }
            continue;
        }

        // rows after the first of a corner lack its label cell
        let (meal_type_cell, shift) = if starts_corner {
            (cells.get(1), 0)
        } else {
            (cells.first(), 1)
        };
        let Some(meal_type) = meal_type_cell.and_then(|cell| meal_type_of(text_of(*cell).trim()))
        else {
            continue;
        };
        let Some(restaurant) = restaurant_for(&section, &corner) else {
            log::trace!("weekly page: skipping corner {section}-{corner}");
            continue;
        };
        for (column, day) in &days {
            let Some(cell) = cells.get(column - shift) else {
                continue;
            };
            meals.push(Meal::new(
                restaurant,
                *day,
                meal_type,
                parse_weekly_cell(*cell),
                updated_at,
            ));
        }
    }
    meals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Status;
    use chrono::TimeZone;
    use std::fs;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 2, 22, 0, 0).unwrap()
    }

    fn parse_fixture() -> Vec<Meal> {
        let html = fs::read_to_string("./src/parse/html_examples/weekly_page.html").unwrap();
        let document = Html::parse_document(&html);
        let table = locate_weekly_table(&document).unwrap();
        parse_weekly_table(table, stamp())
    }

    fn find(meals: &[Meal], restaurant: Restaurant, day: DayOfWeek, meal_type: MealType) -> &Meal {
        meals
            .iter()
            .find(|meal| {
                meal.restaurant() == restaurant && meal.day() == day && meal.meal_type() == meal_type
            })
            .unwrap()
    }

    fn item_names(meal: &Meal) -> Vec<Vec<String>> {
        meal.items()
            .unwrap_or_default()
            .iter()
            .map(|item| item.name().to_vec())
            .collect()
    }

    fn cell(html: &str) -> CellOutcome {
        static_selector!(TD <- "td");
        let table = Html::parse_fragment(&format!("<table><tr><td>{html}</td></tr></table>"));
        parse_weekly_cell(table.select(&TD).next().unwrap())
    }

    #[test]
    fn test_weekly_fixture() {
        let meals = parse_fixture();
        // six corner rows of seven days, two constant menus over five weekdays and two periods
        assert_eq!(meals.len(), 6 * 7 + 2 * 5 * 2);
        assert!(meals.iter().all(|meal| meal.updated_at() == stamp()));
        for meal in &meals {
            assert_eq!(meal.status() == Status::Open, meal.items().is_some());
        }
    }

    #[test]
    fn test_weekly_day_columns() {
        let meals = parse_fixture();
        let days: Vec<DayOfWeek> = meals
            .iter()
            .filter(|meal| {
                meal.restaurant() == Restaurant::Floor3HomeMeal && meal.meal_type() == MealType::Lunch
            })
            .map(Meal::day)
            .collect();
        assert_eq!(
            days,
            vec![
                DayOfWeek::Sun,
                DayOfWeek::Mon,
                DayOfWeek::Tue,
                DayOfWeek::Wed,
                DayOfWeek::Thu,
                DayOfWeek::Fri,
                DayOfWeek::Sat
            ]
        );
    }

    #[test]
    fn test_weekly_home_meal() {
        let meals = parse_fixture();
        let lunch = |day| find(&meals, Restaurant::Floor3HomeMeal, day, MealType::Lunch);

        let monday = lunch(DayOfWeek::Mon);
        assert_eq!(item_names(monday), vec![vec!["제육볶음", "쌈채소&쌈장", "미역국"]]);
        assert_eq!(monday.items().unwrap()[0].price(), Some(Won::new(5000)));

        assert_eq!(lunch(DayOfWeek::Sun).status(), Status::Closed);
        assert_eq!(lunch(DayOfWeek::Tue).status(), Status::Closed);
        assert_eq!(lunch(DayOfWeek::Wed).status(), Status::Closed);
        assert_eq!(item_names(lunch(DayOfWeek::Thu)), vec![vec!["돈까스"], vec!["우동"]]);
        assert_eq!(lunch(DayOfWeek::Fri).status(), Status::Unavailable);

        let dinner = find(&meals, Restaurant::Floor3HomeMeal, DayOfWeek::Mon, MealType::Dinner);
        assert_eq!(item_names(dinner), vec![vec!["김치찌개", "계란말이"]]);
        assert_eq!(dinner.items().unwrap()[0].price(), Some(Won::new(5000)));
    }

    #[test]
    fn test_weekly_itemized_and_set() {
        let meals = parse_fixture();
        let bowl = find(&meals, Restaurant::Floor3OneBowl, DayOfWeek::Mon, MealType::Lunch);
        let items = bowl.items().unwrap();
        assert_eq!(item_names(bowl), vec![vec!["마라탕"], vec!["꿔바로우"]]);
        assert_eq!(items[0].price(), Some(Won::new(6000)));
        assert_eq!(items[1].price(), Some(Won::new(5500)));

        let special = find(&meals, Restaurant::Floor2Special, DayOfWeek::Mon, MealType::Lunch);
        assert_eq!(item_names(special), vec![vec!["돈까스김치나베*요구르트"]]);
        assert_eq!(special.items().unwrap()[0].price(), Some(Won::new(5500)));
    }

    #[test]
    fn test_weekly_constant_menus() {
        let meals = parse_fixture();
        let sot: Vec<&Meal> = meals
            .iter()
            .filter(|meal| meal.restaurant() == Restaurant::SotAndNoodle)
            .collect();
        assert_eq!(sot.len(), 10);
        assert!(sot.iter().all(|meal| meal.day() != DayOfWeek::Sat && meal.day() != DayOfWeek::Sun));
        assert_eq!(
            item_names(sot[0]),
            vec![vec!["삼겹살김치철판"], vec!["데리야끼치킨솥밥"]]
        );
        assert_eq!(sot[0].items().unwrap()[0].price(), Some(Won::new(6000)));

        let snack = find(&meals, Restaurant::Snackbar, DayOfWeek::Fri, MealType::Dinner);
        let items = snack.items().unwrap();
        assert_eq!(item_names(snack), vec![vec!["라면"], vec!["김밥"]]);
        assert_eq!(items[0].price(), Some(Won::new(3500)));
        // the price line carries a remark, so it is not read as 김밥's price
        assert_eq!(items[1].price(), None);
    }

    #[test]
    fn test_weekly_cell_rules() {
        assert_eq!(cell(""), CellOutcome::Closed { notes: None });
        assert_eq!(cell("￦ 5,000"), CellOutcome::Closed { notes: None });
        assert_eq!(
            cell(r#"<span style="color:#303030">추석 휴무</span>"#),
            CellOutcome::Closed { notes: None }
        );
        assert_eq!(
            cell(r#"<span style="color:#303030">****준비중****</span>"#),
            CellOutcome::Unavailable { notes: None }
        );
        let single = cell(r#"<span style="color:#303030">비빔밥 6,000원</span>"#);
        assert_eq!(single.items().len(), 1);
        assert_eq!(single.items()[0].name(), ["비빔밥"]);
        assert_eq!(single.items()[0].price(), Some(Won::new(6000)));
    }

    #[test]
    fn test_weekly_table_without_day_heading() {
        let html = r#"<table><tbody>
            <tr><td colspan="9" class="menu_st">상록원2층식당</td></tr>
            <tr><td rowspan="2">일품코너</td><td>중식</td><td></td><td><span style="color:#303030">덮밥</span></td></tr>
        </tbody></table>"#;
        static_selector!(TABLE <- "table");
        let fragment = Html::parse_fragment(html);
        let table = fragment.select(&TABLE).next().unwrap();
        assert!(parse_weekly_table(table, stamp()).is_empty());
    }

    #[test]
    fn test_locate_weekly_table() {
        let document = Html::parse_document("<div id=\"sdetail\"><table></table></div>");
        assert!(locate_weekly_table(&document).is_err());
    }
}
