mod charset;

use std::{num::NonZeroU32, time::Duration};

use governor::{
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Jitter, Quota, RateLimiter,
};
use reqwest::{header::CONTENT_TYPE, Client, Error as RequestError};
use tracing::{instrument, Level};
use url::Url;

use crate::config::Config;
use crate::parse::Floor;

use charset::decode_page;

const RATE_LIMIT: u32 = 4;
const DELAY_JITTER: Duration = Duration::from_millis(500);

type Limiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

pub fn make_client(timeout: Duration) -> Result<Client, RequestError> {
    Client::builder()
        .gzip(true)
        .timeout(timeout)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
}

/// Shared HTTP access to the cooperative site; built once at startup.
pub struct Fetcher {
    client: Client,
    rate_limiter: Limiter,
    base_url: Url,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    pub fn new(config: &Config) -> crate::Result<Self> {
        let client = make_client(config.fetch_timeout)?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(RATE_LIMIT).unwrap_or(NonZeroU32::MIN));
        Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
            base_url,
        }
    }

    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// `<base>?code=<floor code>&sday=<unix seconds>`
    pub fn floor_url(&self, floor: Floor, sday: i64) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("code", &floor.code().to_string())
            .append_pair("sday", &sday.to_string());
        url
    }

    /// Body of the page at `url`, decoded to UTF-8. Non-2xx statuses are errors.
    async fn fetch_page(&self, url: Url) -> Result<String, RequestError> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::new(Duration::ZERO, DELAY_JITTER))
            .await;
        let res = self.client.get(url).send().await?.error_for_status()?;
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = res.bytes().await?;
        Ok(decode_page(content_type.as_deref(), &bytes))
    }

    #[instrument(skip(self), level = Level::TRACE)]
    pub async fn fetch_floor_page(&self, floor: Floor, sday: i64) -> Result<String, RequestError> {
        let start = std::time::Instant::now();
        let text = self.fetch_page(self.floor_url(floor, sday)).await?;
        log::trace!("Got text of {floor} page in \t {:?}", start.elapsed());
        Ok(text)
    }

    /// The desktop page with the whole week for every restaurant.
    #[instrument(skip(self, url), fields(url = %url), level = Level::TRACE)]
    pub async fn fetch_weekly_page(&self, url: &Url) -> Result<String, RequestError> {
        let start = std::time::Instant::now();
        let text = self.fetch_page(url.clone()).await?;
        log::trace!("Got text of weekly page in \t {:?}", start.elapsed());
        Ok(text)
    }
}
