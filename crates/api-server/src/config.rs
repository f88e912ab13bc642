use anyhow::{bail, Context};
use std::net::SocketAddr;
use std::str::FromStr;
use valuation_engine::{ValuationConfig, WaccConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_FMP_RATE_LIMIT: usize = 300;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub fmp_api_key: String,
    pub fmp_base_url: Option<String>,
    pub bind_addr: SocketAddr,
    /// Upstream requests per minute.
    pub fmp_rate_limit: usize,
    pub cache_ttl_secs: i64,
    pub batch_concurrency: usize,
    pub valuation: ValuationConfig,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

fn finite_rate(key: &str, value: f64) -> anyhow::Result<f64> {
    if !value.is_finite() {
        bail!("{} must be a finite number, got {}", key, value);
    }
    Ok(value)
}

impl ServerConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let fmp_api_key = lookup("FMP_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .context("FMP_API_KEY must be set")?;

        let defaults = ValuationConfig::default();
        let rate = |key: &str, default: f64| -> anyhow::Result<f64> {
            finite_rate(key, parse_or(&lookup, key, default)?)
        };
        let wacc = WaccConfig {
            risk_free_rate: rate("RISK_FREE_RATE", defaults.wacc.risk_free_rate)?,
            market_risk_premium: rate("MARKET_RISK_PREMIUM", defaults.wacc.market_risk_premium)?,
            min_wacc: rate("WACC_MIN", defaults.wacc.min_wacc)?,
            max_wacc: rate("WACC_MAX", defaults.wacc.max_wacc)?,
            include_leases: parse_or(&lookup, "WACC_INCLUDE_LEASES", defaults.wacc.include_leases)?,
        };
        if wacc.min_wacc > wacc.max_wacc {
            bail!("WACC_MIN ({}) must not exceed WACC_MAX ({})", wacc.min_wacc, wacc.max_wacc);
        }

        let valuation = ValuationConfig {
            wacc,
            terminal_rate: rate("TERMINAL_RATE", defaults.terminal_rate)?,
            ..defaults
        };

        let cache_ttl_secs = parse_or(&lookup, "CACHE_TTL_SECS", analysis_orchestrator::DEFAULT_CACHE_TTL_SECS)?;
        if !(0..=analysis_orchestrator::MAX_CACHE_TTL_SECS).contains(&cache_ttl_secs) {
            bail!(
                "CACHE_TTL_SECS must be between 0 and {}, got {}",
                analysis_orchestrator::MAX_CACHE_TTL_SECS,
                cache_ttl_secs
            );
        }

        let default_addr = SocketAddr::from_str(DEFAULT_BIND_ADDR).context("default bind address")?;
        Ok(Self {
            fmp_api_key,
            fmp_base_url: lookup("FMP_BASE_URL").filter(|u| !u.trim().is_empty()),
            bind_addr: parse_or(&lookup, "BIND_ADDR", default_addr)?,
            fmp_rate_limit: parse_or(&lookup, "FMP_RATE_LIMIT", DEFAULT_FMP_RATE_LIMIT)?.max(1),
            cache_ttl_secs,
            batch_concurrency: parse_or(
                &lookup,
                "BATCH_CONCURRENCY",
                analysis_orchestrator::DEFAULT_BATCH_CONCURRENCY,
            )?,
            valuation,
        })
    }
}
