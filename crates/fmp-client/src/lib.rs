pub mod error;
pub mod snapshot;
pub mod types;

pub use error::FmpError;
pub use types::*;

use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const BASE_URL: &str = "https://financialmodelingprep.com/stable";
const SLOT_SLACK: Duration = Duration::from_millis(50);

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    /// Record a request at `now` if the window has room, else return how
    /// long until the earliest recorded request expires.
    fn try_reserve(&self, sent: &mut VecDeque<Instant>, now: Instant) -> Result<(), Duration> {
        while sent.front().is_some_and(|t| now.duration_since(*t) >= self.window) {
            sent.pop_front();
        }
        if sent.len() < self.max_requests {
            sent.push_back(now);
            return Ok(());
        }
        let expires = sent.front().map_or(Duration::ZERO, |t| (*t + self.window).saturating_duration_since(now));
        Err(expires + SLOT_SLACK)
    }

    async fn acquire(&self) {
        loop {
            let wait = {
                let mut sent = self.timestamps.lock().await;
                match self.try_reserve(&mut sent, Instant::now()) {
                    Ok(()) => return,
                    Err(wait) => wait,
                }
            };
            tracing::debug!(wait_secs = wait.as_secs_f64(), "FMP request budget exhausted");
            tokio::time::sleep(wait).await;
        }
    }
}

/// Financial Modeling Prep client.
///
/// Failed requests are not retried; the error propagates to the caller.
#[derive(Clone)]
pub struct FmpClient {
    api_key: String,
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
}

impl FmpClient {
    /// `requests_per_minute` should match the FMP plan (free tier is far lower
    /// than the paid tiers).
    pub fn new(api_key: String, requests_per_minute: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            base_url: BASE_URL.to_string(),
            client,
            rate_limiter: RateLimiter::new(requests_per_minute, Duration::from_secs(60)),
        }
    }

    /// Point the client at a different host (proxies, mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T, FmpError> {
        self.rate_limiter.acquire().await;

        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("FMP rate limit hit on {}", endpoint);
            return Err(FmpError::RateLimitExceeded);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(FmpError::Api(format!("HTTP {} on {}: {}", status, endpoint, text)));
        }

        let text = response.text().await?;
        if text.contains("\"Error Message\"") {
            return Err(FmpError::Api(text));
        }

        serde_json::from_str(&text).map_err(|source| FmpError::Json {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    pub async fn get_profile(&self, symbol: &str) -> Result<FmpProfile, FmpError> {
        let profiles: Vec<FmpProfile> = self
            .get("profile", &[("symbol", symbol.to_uppercase())])
            .await?;
        profiles
            .into_iter()
            .next()
            .ok_or_else(|| FmpError::SymbolNotFound(symbol.to_string()))
    }

    pub async fn get_income_statements(
        &self,
        symbol: &str,
        period: Period,
        limit: u32,
    ) -> Result<Vec<FmpIncomeStatement>, FmpError> {
        self.get(
            "income-statement",
            &[
                ("symbol", symbol.to_uppercase()),
                ("period", period.as_str().to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    pub async fn get_balance_sheets(
        &self,
        symbol: &str,
        period: Period,
        limit: u32,
    ) -> Result<Vec<FmpBalanceSheet>, FmpError> {
        self.get(
            "balance-sheet-statement",
            &[
                ("symbol", symbol.to_uppercase()),
                ("period", period.as_str().to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    pub async fn get_cash_flow_statements(
        &self,
        symbol: &str,
        period: Period,
        limit: u32,
    ) -> Result<Vec<FmpCashFlowStatement>, FmpError> {
        self.get(
            "cash-flow-statement",
            &[
                ("symbol", symbol.to_uppercase()),
                ("period", period.as_str().to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    pub async fn get_ratios_ttm(&self, symbol: &str) -> Result<FmpRatiosTtm, FmpError> {
        let ratios: Vec<FmpRatiosTtm> = self
            .get("ratios-ttm", &[("symbol", symbol.to_uppercase())])
            .await?;
        Ok(ratios.into_iter().next().unwrap_or_default())
    }

    /// Daily closes from `from` until today, most-recent-first.
    pub async fn get_price_history(&self, symbol: &str, from: NaiveDate) -> Result<Vec<FmpPricePoint>, FmpError> {
        self.get(
            "historical-price-eod/light",
            &[
                ("symbol", symbol.to_uppercase()),
                ("from", from.format("%Y-%m-%d").to_string()),
            ],
        )
        .await
    }

    /// Latest 10-year treasury yield as a fraction (0.042 for 4.2%).
    pub async fn get_ten_year_treasury(&self) -> Result<Option<f64>, FmpError> {
        let rates: Vec<FmpTreasuryRate> = self.get("treasury-rates", &[]).await?;
        Ok(rates
            .into_iter()
            .find_map(|r| r.year10)
            .map(|pct| pct / 100.0))
    }

    /// Units of `to` per unit of `from`, e.g. `fx_rate("DKK", "USD")`.
    pub async fn fx_rate(&self, from: &str, to: &str) -> Result<f64, FmpError> {
        let pair = format!("{}{}", from.to_uppercase(), to.to_uppercase());
        let quotes: Vec<FmpQuote> = self.get("quote", &[("symbol", pair.clone())]).await?;
        quotes
            .into_iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(&pair))
            .and_then(|q| q.price)
            .filter(|p| *p > 0.0)
            .ok_or(FmpError::SymbolNotFound(pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_admits_within_budget() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.timestamps.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn test_full_window_reports_wait_until_earliest_expires() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let mut sent = VecDeque::new();
        let t0 = Instant::now();
        assert!(limiter.try_reserve(&mut sent, t0).is_ok());
        assert!(limiter.try_reserve(&mut sent, t0 + Duration::from_secs(10)).is_ok());

        let wait = limiter.try_reserve(&mut sent, t0 + Duration::from_secs(20)).unwrap_err();
        assert_eq!(wait, Duration::from_secs(40) + SLOT_SLACK);

        // the first request has aged out
        assert!(limiter.try_reserve(&mut sent, t0 + Duration::from_secs(60)).is_ok());
        assert_eq!(sent.len(), 2);
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let client = FmpClient::new("key".to_string(), 10).with_base_url("http://localhost:9000/");
        assert_eq!(client.base_url, "http://localhost:9000");
    }
}
