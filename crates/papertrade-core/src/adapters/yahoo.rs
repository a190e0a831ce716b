use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;

use crate::http_client::{
    HttpAuth, HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};
use crate::quote_source::{ProviderId, QuoteError, QuoteSource};
use crate::{decimal_from_f64, Quote, Symbol, UtcDateTime, NOT_AVAILABLE};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const REFERER: &str = "https://finance.yahoo.com/";
const QUOTE_FIELDS: &str = "longName,shortName,regularMarketPrice,regularMarketChangePercent,\
regularMarketVolume,regularMarketTime,marketCap,forwardPE,trailingPE,currency";

/// Environment variable holding a browser cookie that replaces the handshake cookie.
pub const YAHOO_COOKIE_ENV: &str = "YAHOO_COOKIE";

// ============================================================================
// Crumb cache
// ============================================================================

#[derive(Debug, Clone)]
struct Crumb {
    value: String,
    fetched_at: Instant,
}

/// Caches the crumb token Yahoo requires on quote requests.
///
/// The handshake visits `fc.yahoo.com` for a session cookie (kept by the
/// client's cookie jar) and then reads the crumb from `getcrumb`.
#[derive(Debug)]
struct YahooAuthManager {
    crumb: Mutex<Option<Crumb>>,
    ttl: Duration,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self {
            crumb: Mutex::new(None),
            ttl: Duration::from_secs(3600),
        }
    }
}

impl YahooAuthManager {
    fn cached(&self) -> Option<String> {
        lock(&self.crumb)
            .as_ref()
            .filter(|crumb| crumb.fetched_at.elapsed() < self.ttl)
            .map(|crumb| crumb.value.clone())
    }

    fn invalidate(&self) {
        *lock(&self.crumb) = None;
    }

    async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        auth: &HttpAuth,
        timeout_ms: u64,
    ) -> Result<String, QuoteError> {
        if let Some(crumb) = self.cached() {
            return Ok(crumb);
        }

        let cookie_request = HttpRequest::get(COOKIE_URL)
            .with_header("referer", REFERER)
            .with_auth(auth)
            .with_timeout_ms(timeout_ms);
        // fc.yahoo.com answers 404 while still setting the session cookie
        http_client.execute(cookie_request).await.map_err(|e| {
            QuoteError::unavailable(format!("failed to fetch yahoo cookie: {}", e.message()))
        })?;

        for endpoint in CRUMB_URLS {
            let crumb_request = HttpRequest::get(endpoint)
                .with_header("referer", REFERER)
                .with_auth(auth)
                .with_timeout_ms(timeout_ms);

            let response = match http_client.execute(crumb_request).await {
                Ok(response) if response.is_success() => response,
                Ok(response) => {
                    tracing::debug!(status = response.status, endpoint, "crumb endpoint refused");
                    continue;
                }
                Err(error) => {
                    tracing::debug!(error = %error, endpoint, "crumb endpoint unreachable");
                    continue;
                }
            };

            let body = response.body.trim();
            if body.to_ascii_lowercase().contains("too many requests") {
                return Err(QuoteError::unavailable(
                    "yahoo rate limited while fetching crumb",
                ));
            }
            if body.is_empty() || body.len() >= 100 || body.contains(' ') || body.contains('<') {
                continue;
            }

            *lock(&self.crumb) = Some(Crumb {
                value: body.to_owned(),
                fetched_at: Instant::now(),
            });
            return Ok(body.to_owned());
        }

        Err(QuoteError::unavailable(
            "failed to fetch yahoo crumb from all endpoints",
        ))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Yahoo quote source
// ============================================================================

/// Quote source backed by the Yahoo Finance quote endpoint.
#[derive(Clone)]
pub struct YahooQuoteSource {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    auth_manager: Arc<YahooAuthManager>,
    timeout_ms: u64,
}

impl Default for YahooQuoteSource {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), auth_from_env())
    }
}

impl YahooQuoteSource {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, auth: HttpAuth) -> Self {
        Self {
            http_client,
            auth,
            auth_manager: Arc::new(YahooAuthManager::default()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, QuoteError> {
        let response = self.request_quote(symbol).await?;

        let response = if response.status == 401 || response.status == 429 {
            tracing::warn!(
                status = response.status,
                symbol = %symbol,
                "yahoo rejected crumb; refreshing and retrying once"
            );
            self.auth_manager.invalidate();
            self.request_quote(symbol).await?
        } else {
            response
        };

        if !response.is_success() {
            return Err(QuoteError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        parse_quote_response(symbol, &response.body)
    }

    async fn request_quote(&self, symbol: &Symbol) -> Result<HttpResponse, QuoteError> {
        let crumb = self
            .auth_manager
            .crumb(self.http_client.as_ref(), &self.auth, self.timeout_ms)
            .await?;

        let endpoint = format!(
            "{QUOTE_URL}?symbols={}&fields={}&crumb={}",
            urlencoding::encode(symbol.as_str()),
            QUOTE_FIELDS,
            urlencoding::encode(&crumb)
        );
        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        tracing::debug!(symbol = %symbol, "requesting yahoo quote");
        self.http_client.execute(request).await.map_err(|e| {
            QuoteError::unavailable(format!("yahoo transport error: {}", e.message()))
        })
    }
}

impl QuoteSource for YahooQuoteSource {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, QuoteError>> + Send + 'a>> {
        Box::pin(self.fetch_quote(symbol))
    }
}

/// Cookie override taken from [`YAHOO_COOKIE_ENV`], if set.
pub fn auth_from_env() -> HttpAuth {
    match std::env::var(YAHOO_COOKIE_ENV) {
        Ok(cookie) if !cookie.trim().is_empty() => HttpAuth::Cookie(cookie),
        _ => HttpAuth::None,
    }
}

fn parse_quote_response(symbol: &Symbol, body: &str) -> Result<Quote, QuoteError> {
    let payload: YahooQuoteResponse = serde_json::from_str(body)
        .map_err(|e| QuoteError::malformed(format!("failed to parse yahoo response: {e}")))?;

    if let Some(error) = payload.quote_response.error.filter(|value| !value.is_null()) {
        return Err(QuoteError::unavailable(format!("yahoo API error: {error}")));
    }

    let data = payload
        .quote_response
        .result
        .into_iter()
        .find(|item| item.symbol.eq_ignore_ascii_case(symbol.as_str()))
        .ok_or_else(|| QuoteError::not_found(symbol))?;

    let raw_price = data
        .regular_market_price
        .ok_or_else(|| QuoteError::not_found(symbol))?;
    let price = decimal_from_f64("price", raw_price)?;

    let name = data
        .long_name
        .or(data.short_name)
        .unwrap_or_else(|| String::from(NOT_AVAILABLE));
    let as_of = data
        .regular_market_time
        .and_then(|seconds| UtcDateTime::from_unix_timestamp(seconds).ok())
        .unwrap_or_else(UtcDateTime::now);
    let currency = data.currency.unwrap_or_else(|| String::from("USD"));

    let quote = Quote::new(symbol.clone(), name, price, currency, as_of)?
        .with_change_percent(data.regular_market_change_percent)?
        .with_volume(data.regular_market_volume.and_then(|v| u64::try_from(v).ok()))
        .with_market_cap(data.market_cap)?
        .with_pe_ratio(data.forward_pe.or(data.trailing_pe))?;

    Ok(quote)
}

// Yahoo Finance API response structures
#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponseData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteResponseData {
    #[serde(default)]
    result: Vec<YahooQuoteData>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteData {
    symbol: String,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_volume: Option<i64>,
    regular_market_time: Option<i64>,
    market_cap: Option<f64>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    currency: Option<String>,
}
