#![deny(unused_crate_dependencies)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod config;
mod dump;
mod error;
mod fetch;
mod menu;
mod ocr;
mod parse;
mod scrape;
mod store;

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tokio::time::{interval, MissedTickBehavior};
use url::Url;

use crate::{
    config::Config,
    dump::DebugDump,
    fetch::Fetcher,
    menu::korean_date,
    ocr::OcrClient,
    scrape::{scrape_all, scrape_weekly},
    store::{MenuSnapshot, Store},
};

pub use error::Result;

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Debug)]
struct App {
    config: Config,
    fetcher: Fetcher,
    dump: DebugDump,
    store: Store,
}

impl App {
    fn target_date(&self) -> NaiveDate {
        self.config
            .target_date
            .unwrap_or_else(|| korean_date(Utc::now()))
    }

    async fn run_pass(&self) {
        let date = self.target_date();
        let start = Instant::now();
        let meals = scrape_all(&self.fetcher, &self.dump, date).await;
        let week = match &self.config.weekly_url {
            Some(url) => scrape_weekly(&self.fetcher, &self.dump, url).await,
            None => Vec::new(),
        };
        let snapshot = MenuSnapshot::new(date, meals, Utc::now()).with_week(week);
        for (restaurant, count) in snapshot.summary() {
            log::info!("{restaurant}: {count} meals");
        }
        log::info!(
            "Scraped {} meals for {date} and {} for the week in {:?}",
            snapshot.meals().len(),
            snapshot.week().len(),
            start.elapsed()
        );
        if let Err(e) = self.store.save(&snapshot).await {
            log::error!("Error while saving snapshot: {e}");
        }
    }

    /// Whether the stored snapshot can stand in for the first pass.
    async fn stored_snapshot_is_fresh(&self) -> bool {
        let previous = match self.store.load().await {
            Ok(Some(previous)) => previous,
            Ok(None) => return false,
            Err(e) => {
                log::warn!("Could not load the previous snapshot: {e}");
                return false;
            }
        };
        let fresh = previous.date() == self.target_date()
            && !previous.needs_refresh(self.config.refresh_interval);
        if fresh {
            log::info!(
                "Last refresh {} min ago, next in {} min",
                previous.time_since_refresh().num_minutes(),
                previous
                    .time_until_refresh(self.config.refresh_interval)
                    .num_minutes()
            );
        }
        fresh
    }
}

async fn run_ocr(config: &Config, fetcher: &Fetcher, image_url: &Url) -> Result<()> {
    let ocr = OcrClient::from_config(fetcher.client().clone(), config)?;
    let meals = ocr.extract_meals(image_url).await?;
    println!("{}", serde_json::to_string_pretty(&meals)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let config = Config::from_env()?;
    let fetcher = Fetcher::new(&config)?;

    if let Some(image_url) = &config.ocr_image_url {
        run_ocr(&config, &fetcher, image_url).await?;
        return Ok(());
    }

    let store = Store::new(config.output.as_ref());
    if let Store::File(f) = &store {
        log::info!("Writing snapshots to {}", f.path().display());
    }
    let app = App {
        dump: DebugDump::new(config.debug_dir.as_ref()),
        fetcher,
        store,
        config,
    };
    log::debug!("{app:?}");

    if app.config.run_once {
        app.run_pass().await;
        return Ok(());
    }

    let mut ticker = interval(app.config.refresh_interval.to_std()?);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    if app.stored_snapshot_is_fresh().await {
        // the first tick completes immediately
        ticker.tick().await;
    }
    loop {
        tokio::select! {
            _ = ticker.tick() => app.run_pass().await,
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutting down");
                break;
            }
        }
    }
    Ok(())
}
