use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use scraper::Html;

use url::Url;

use crate::{
    dump::{DebugDump, Page},
    error::Error,
    fetch::Fetcher,
    menu::{date_of_sday, sday_of, Meal},
    parse::{
        self, locate_menu_table, locate_weekly_table, parse_table, parse_weekly_table, Floor,
    },
};

/// Locates the menu table in a full floor page and parses it. Also returns the table's
/// outer HTML.
pub fn parse_floor_page(
    page: &str,
    floor: Floor,
    date: NaiveDate,
    updated_at: DateTime<Utc>,
) -> parse::Result<(String, Vec<Meal>)> {
    let document = Html::parse_document(page);
    let table = locate_menu_table(&document)?;
    let meals = parse_table(table, floor.layout(), date, updated_at);
    Ok((table.html(), meals))
}

async fn try_scrape_floor(
    fetcher: &Fetcher,
    dump: &DebugDump,
    floor: Floor,
    sday: i64,
) -> crate::Result<Vec<Meal>> {
    let date = date_of_sday(sday)
        .ok_or_else(|| Error::Config(format!("sday {sday} is not a representable date")))?;
    let page = fetcher.fetch_floor_page(floor, sday).await?;
    let (table_html, meals) = parse_floor_page(&page, floor, date, Utc::now())?;
    dump.record(Page::Floor(floor), &table_html, &meals).await;
    Ok(meals)
}

/// Meals of one floor for the day identified by `sday`; empty if anything went wrong.
pub async fn scrape_floor(fetcher: &Fetcher, dump: &DebugDump, floor: Floor, sday: i64) -> Vec<Meal> {
    match try_scrape_floor(fetcher, dump, floor, sday).await {
        Ok(meals) => {
            log::info!("{floor}: parsed {} meals", meals.len());
            meals
        }
        Err(e) => {
            log::error!("{floor}: failed to fetch or parse menu: {e}");
            Vec::new()
        }
    }
}

/// All floors fetched concurrently; meals come back in floor order.
pub async fn scrape_all(fetcher: &Fetcher, dump: &DebugDump, date: NaiveDate) -> Vec<Meal> {
    let sday = sday_of(date);
    join_all(
        Floor::ALL
            .iter()
            .map(|floor| scrape_floor(fetcher, dump, *floor, sday)),
    )
    .await
    .into_iter()
    .flatten()
    .collect()
}

/// Locates the weekly table in the all-restaurant page and parses it. Also returns the
/// table's outer HTML.
pub fn parse_weekly_page(
    page: &str,
    updated_at: DateTime<Utc>,
) -> parse::Result<(String, Vec<Meal>)> {
    let document = Html::parse_document(page);
    let table = locate_weekly_table(&document)?;
    let meals = parse_weekly_table(table, updated_at);
    Ok((table.html(), meals))
}

async fn try_scrape_weekly(
    fetcher: &Fetcher,
    dump: &DebugDump,
    url: &Url,
) -> crate::Result<Vec<Meal>> {
    let page = fetcher.fetch_weekly_page(url).await?;
    let (table_html, meals) = parse_weekly_page(&page, Utc::now())?;
    dump.record(Page::Weekly, &table_html, &meals).await;
    Ok(meals)
}

/// Meals of the whole week from the all-restaurant page; empty if anything went wrong.
pub async fn scrape_weekly(fetcher: &Fetcher, dump: &DebugDump, url: &Url) -> Vec<Meal> {
    match try_scrape_weekly(fetcher, dump, url).await {
        Ok(meals) => {
            log::info!("weekly page: parsed {} meals", meals.len());
            meals
        }
        Err(e) => {
            log::error!("weekly page: failed to fetch or parse menu: {e}");
            Vec::new()
        }
    }
}
