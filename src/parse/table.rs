use chrono::{DateTime, NaiveDate, Utc};
use scraper::{ElementRef, Html};

use super::cell::CellOutcome;
use super::floor::{ClosedPolicy, ColumnLayout, FloorLayout, HEADER_LABEL};
use super::service_period::ServicePeriods;
use super::text_from_selection::{child_elements, element_from_selection, text_of};
use super::Result;
use crate::menu::{DayOfWeek, Meal, MealType, Restaurant};
use crate::static_selector;

static_selector!(MENU_TABLE <- "li > table");

/// The menu table of a floor page: the first `<table>` directly inside an `<li>`.
pub fn locate_menu_table(document: &Html) -> Result<ElementRef<'_>> {
    element_from_selection(&MENU_TABLE, document.root_element(), "menu table")
}

/// Rows of the table body, in page order. Rows of tables nested in cells are not included.
pub(super) fn rows(table: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    child_elements(table, &["thead", "tbody", "tfoot"])
        .flat_map(|section| child_elements(section, &["tr"]))
        .chain(child_elements(table, &["tr"]))
}

struct RowContext<'a> {
    layout: &'a FloorLayout,
    restaurant: Restaurant,
    day: DayOfWeek,
    updated_at: DateTime<Utc>,
}

impl RowContext<'_> {
    fn meal(&self, meal_type: MealType, outcome: CellOutcome) -> Meal {
        Meal::new(self.restaurant, self.day, meal_type, outcome, self.updated_at)
    }

    /// A cell that already names its meal period.
    fn period_cell(&self, meal_type: MealType, cell: ElementRef<'_>, meals: &mut Vec<Meal>) {
        let html = cell.inner_html();
        if self.layout.closed_policy == ClosedPolicy::Skip && html.trim().is_empty() {
            return;
        }
        let outcome = self.layout.grammar.parse(&html);
        if outcome.is_open() || self.layout.closed_policy == ClosedPolicy::Emit {
            meals.push(self.meal(meal_type, outcome));
        }
    }

    /// A cell holding both periods; items go to whichever periods their hours cover.
    fn combined_cell(&self, cell: ElementRef<'_>, meals: &mut Vec<Meal>) {
        let html = cell.inner_html();
        if html.trim().is_empty() {
            return;
        }
        let outcome = self.layout.grammar.parse(&html);
        for meal_type in [MealType::Lunch, MealType::Dinner] {
            if !outcome.is_open() {
                if self.layout.closed_policy == ClosedPolicy::Emit {
                    meals.push(self.meal(meal_type, outcome.clone()));
                }
                continue;
            }
            let items: Vec<_> = outcome
                .items()
                .iter()
                .filter(|item| ServicePeriods::from_hours(item.open_and_close_time()).serves(meal_type))
                .cloned()
                .collect();
            if !items.is_empty() {
                meals.push(self.meal(meal_type, CellOutcome::Open(items)));
            }
        }
    }
}

/// Every `Meal` the table holds for `date`, all stamped with `updated_at`.
///
/// Rows whose corner label is not one of the floor's corners are skipped without error,
/// as are the header row and rows with too few cells.
pub fn parse_table(
    table: ElementRef<'_>,
    layout: &FloorLayout,
    date: NaiveDate,
    updated_at: DateTime<Utc>,
) -> Vec<Meal> {
    let day = DayOfWeek::of(date);
    let mut meals = Vec::new();
    for row in rows(table) {
        let cells: Vec<ElementRef> = child_elements(row, &["td", "th"]).collect();
        let Some(label) = cells.first().map(|cell| text_of(*cell)) else {
            continue;
        };
        if label.trim() == HEADER_LABEL {
            continue;
        }
        let Some(restaurant) = layout.restaurant_for(&label) else {
            log::trace!("{}: skipping corner {:?}", layout.floor, label.trim());
            continue;
        };
        let context = RowContext {
            layout,
            restaurant,
            day,
            updated_at,
        };
        match (layout.columns, &cells[1..]) {
            (ColumnLayout::Combined, [menu, ..]) => context.combined_cell(*menu, &mut meals),
            (ColumnLayout::Split, [lunch, dinner, ..]) => {
                context.period_cell(MealType::Lunch, *lunch, &mut meals);
                context.period_cell(MealType::Dinner, *dinner, &mut meals);
            }
            _ => log::warn!("{}: row for {restaurant} is missing cells", layout.floor),
        }
    }
    meals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{Status, Won};
    use crate::parse::Floor;
    use chrono::TimeZone;
    use std::fs;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 2, 22, 0, 0).unwrap()
    }

    static_selector!(TABLE <- "table");

    fn parse_table_html(table_html: &str, floor: Floor, date: NaiveDate) -> Result<Vec<Meal>> {
        let fragment = Html::parse_fragment(table_html);
        let table = fragment
            .select(&TABLE)
            .next()
            .ok_or_else(|| crate::parse::Error::html_parse_error("no <table> in the fragment"))?;
        Ok(parse_table(table, floor.layout(), date, stamp()))
    }

    fn parse_fixture(name: &str, floor: Floor) -> Vec<Meal> {
        let html = fs::read_to_string(format!("./src/parse/html_examples/{name}")).unwrap();
        let fragment = Html::parse_fragment(&html);
        let table = fragment.select(&TABLE).next().unwrap();
        parse_table(table, floor.layout(), monday(), stamp())
    }

    fn item_names(meal: &Meal) -> Vec<Vec<String>> {
        meal.items()
            .unwrap_or_default()
            .iter()
            .map(|item| item.name().to_vec())
            .collect()
    }

    #[test]
    fn test_floor_1_splits_by_hours() {
        let meals = parse_fixture("floor1_table.html", Floor::One);
        let keys: Vec<_> = meals
            .iter()
            .map(|meal| (meal.restaurant(), meal.meal_type()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Restaurant::SotAndNoodle, MealType::Lunch),
                (Restaurant::SotAndNoodle, MealType::Dinner),
                (Restaurant::Snackbar, MealType::Lunch),
            ]
        );
        // 11:00~19:00 spans the cutoff, so both periods get the same dishes
        assert_eq!(item_names(&meals[0]), item_names(&meals[1]));
        assert_eq!(
            item_names(&meals[0]),
            vec![vec!["삼겹살김치철판"], vec!["데리야끼치킨솥밥"]]
        );
        assert_eq!(item_names(&meals[2]), vec![vec!["라면"], vec!["김밥"]]);
        assert!(meals.iter().all(|meal| meal.status() == Status::Open));
        assert!(meals.iter().all(|meal| meal.day() == DayOfWeek::Mon));
    }

    #[test]
    fn test_floor_2_skips_closed_and_unmapped() {
        let meals = parse_fixture("floor2_table.html", Floor::Two);
        let keys: Vec<_> = meals
            .iter()
            .map(|meal| (meal.restaurant(), meal.meal_type()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Restaurant::Floor2Special, MealType::Lunch),
                (Restaurant::Floor2Western, MealType::Lunch),
                (Restaurant::Floor2Western, MealType::Dinner),
                (Restaurant::Floor2Ttukbaegi, MealType::Lunch),
            ]
        );
        let set = &meals[0].items().unwrap()[0];
        assert_eq!(set.name(), ["낙삼덮밥", "요구르트"]);
        assert_eq!(set.price(), Some(Won::new(4500)));
        assert_eq!(
            item_names(&meals[1]),
            vec![vec!["토마토파스타"], vec!["치즈돈까스"]]
        );
        assert_eq!(
            item_names(&meals[3]),
            vec![vec!["순두부찌개"], vec!["된장찌개"]]
        );
    }

    #[test]
    fn test_floor_3_emits_closed_and_unavailable() {
        let meals = parse_fixture("floor3_table.html", Floor::Three);
        let summary: Vec<_> = meals
            .iter()
            .map(|meal| (meal.restaurant(), meal.meal_type(), meal.status()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Restaurant::Floor3HomeMeal, MealType::Lunch, Status::Open),
                (Restaurant::Floor3HomeMeal, MealType::Dinner, Status::Closed),
                (Restaurant::Floor3OneBowl, MealType::Lunch, Status::Unavailable),
                (Restaurant::Floor3OneBowl, MealType::Dinner, Status::Closed),
            ]
        );
        assert_eq!(
            item_names(&meals[0]),
            vec![vec!["제육볶음", "쌈채소", "미역국"]]
        );
        assert_eq!(meals[1].notes(), Some("휴무"));
        assert_eq!(meals[2].notes(), Some(crate::parse::cell::NO_MENU_NOTE));
        assert_eq!(meals[3].notes(), None);
        for meal in &meals {
            assert_eq!(meal.status() == Status::Open, meal.items().is_some());
        }
    }

    #[test]
    fn test_updated_at_is_shared() {
        let meals = parse_fixture("floor3_table.html", Floor::Three);
        assert!(meals.iter().all(|meal| meal.updated_at() == stamp()));
    }

    #[test]
    fn test_unmapped_corner_contributes_nothing() {
        let html = "<table><tbody><tr><td>백반</td><td>백반정식 5,000원</td><td></td></tr></tbody></table>";
        let meals = parse_table_html(html, Floor::Two, monday()).unwrap();
        assert!(meals.is_empty());
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let html = "<table><tbody><tr><th>구분</th><th>중식</th><th>석식</th></tr></tbody></table>";
        assert!(parse_table_html(html, Floor::Three, monday()).unwrap().is_empty());
    }

    #[test]
    fn test_locate_menu_table() {
        let html = fs::read_to_string("./src/parse/html_examples/mobile_page.html").unwrap();
        let document = Html::parse_document(&html);
        let table = locate_menu_table(&document).unwrap();
        let meals = parse_table(table, Floor::Two.layout(), monday(), stamp());
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].restaurant(), Restaurant::Floor2Special);

        let document = Html::parse_document("<html><body><table></table></body></html>");
        assert!(locate_menu_table(&document).is_err());
    }
}
