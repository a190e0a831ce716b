//! Behavior-driven tests for quote lookup
//!
//! These tests drive the Yahoo source through a scripted transport and check
//! what a user sees through the trader: the quote fields, the fallbacks, and
//! how every lookup failure collapses into "quote unavailable".

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use papertrade_core::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, Ledger, LedgerStore,
    MockQuoteSource, ProviderId, Quantity, QuoteErrorKind, QuoteSource, StoreError, Symbol,
    TradeError, Trader, YahooQuoteSource,
};
use rust_decimal_macros::dec;

/// Answers the cookie and crumb handshake, then pops quote responses in order.
#[derive(Default)]
struct ScriptedTransport {
    quotes: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn new(quotes: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            quotes: Mutex::new(quotes.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().expect("not poisoned").clone()
    }
}

impl HttpClient for ScriptedTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let url = request.url.clone();
        self.seen.lock().expect("not poisoned").push(request);

        let response = if url.starts_with("https://fc.yahoo.com") {
            Ok(HttpResponse::with_status(404, ""))
        } else if url.contains("getcrumb") {
            Ok(HttpResponse::ok_json("abc123"))
        } else {
            self.quotes
                .lock()
                .expect("not poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::new("script exhausted")))
        };
        Box::pin(async move { response })
    }
}

/// Store that accepts every save without touching disk.
struct NullStore;

impl LedgerStore for NullStore {
    fn load(&self) -> Result<Option<Ledger>, StoreError> {
        Ok(None)
    }

    fn save(&self, _ledger: &Ledger) -> Result<(), StoreError> {
        Ok(())
    }
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn yahoo(transport: Arc<ScriptedTransport>) -> Arc<YahooQuoteSource> {
    Arc::new(YahooQuoteSource::with_http_client(transport, HttpAuth::None))
}

fn body(result: &str) -> HttpResponse {
    HttpResponse::ok_json(format!(
        r#"{{"quoteResponse":{{"result":[{result}],"error":null}}}}"#
    ))
}

// =============================================================================
// Successful lookups
// =============================================================================

#[tokio::test]
async fn stock_info_returns_price_and_description() {
    // Given: Yahoo knows MSFT
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(body(
        r#"{"symbol":"MSFT","longName":"Microsoft Corporation","shortName":"Microsoft","regularMarketPrice":402.1,"regularMarketChangePercent":1.25,"regularMarketVolume":21000000,"marketCap":2990000000000,"trailingPE":36.2,"currency":"USD"}"#,
    ))]));
    let trader = Trader::new(Ledger::default(), yahoo(transport), Box::new(NullStore));

    // When: The user asks for the quote
    let quote = trader
        .stock_info(&symbol("msft"))
        .await
        .expect("quote should be available");

    // Then: The long name wins and the trailing P/E fills the gap
    assert_eq!(quote.symbol.as_str(), "MSFT");
    assert_eq!(quote.name, "Microsoft Corporation");
    assert_eq!(quote.price, dec!(402.1));
    assert_eq!(quote.change_percent, Some(1.25));
    assert_eq!(quote.pe_ratio, Some(36.2));
    assert_eq!(quote.currency, "USD");
}

#[tokio::test]
async fn missing_names_fall_back_to_not_available() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(body(
        r#"{"symbol":"ZZZ","regularMarketPrice":1.5}"#,
    ))]));
    let source = yahoo(transport);

    let quote = source.quote(&symbol("ZZZ")).await.expect("quote");

    assert_eq!(quote.name, "N/A");
    assert_eq!(quote.market_cap, None);
    assert_eq!(quote.pe_ratio, None);
}

#[tokio::test]
async fn buy_uses_the_yahoo_price() {
    // Given: A 100 dollar quote
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(body(
        r#"{"symbol":"SPY","regularMarketPrice":100.0}"#,
    ))]));
    let mut trader = Trader::new(
        Ledger::new(dec!(1000)),
        yahoo(transport.clone()),
        Box::new(NullStore),
    );

    // When: Three shares are bought
    let receipt = trader
        .buy(&symbol("SPY"), Quantity::new(3).expect("qty"))
        .await
        .expect("buy");

    // Then: 300 is debited and the request carried the crumb
    assert_eq!(receipt.fill.amount, dec!(300));
    assert_eq!(trader.balance(), dec!(700));
    let last = transport.seen().pop().expect("quote request");
    assert!(last.url.contains("symbols=SPY"));
    assert!(last.url.contains("crumb=abc123"));
}

// =============================================================================
// Failed lookups
// =============================================================================

#[tokio::test]
async fn unknown_symbol_is_not_found_at_the_source() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(body(""))]));
    let source = yahoo(transport);

    let err = source
        .quote(&symbol("NOPE"))
        .await
        .expect_err("empty result");

    assert_eq!(err.kind(), QuoteErrorKind::NotFound);
    assert_eq!(err.code(), "quote.not_found");
}

#[tokio::test]
async fn every_failure_kind_reaches_the_user_as_unavailable() {
    // Given: An empty result, a garbage body, a server error, and a dead socket
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(body("")),
        Ok(HttpResponse::ok_json("<html>oops</html>")),
        Ok(HttpResponse::with_status(503, "down")),
        Err(HttpError::new("connection reset")),
    ]));
    let trader = Trader::new(Ledger::default(), yahoo(transport), Box::new(NullStore));
    let x = symbol("X");

    for _ in 0..4 {
        // When: The quote is requested
        let err = trader.stock_info(&x).await.expect_err("must fail");

        // Then: The user sees the single quote-unavailable outcome
        assert!(matches!(err, TradeError::QuoteUnavailable { .. }));
        assert_eq!(err.to_string(), "Unable to get stock price for X");
    }
}

#[tokio::test]
async fn rate_limited_quote_is_retried_once_with_a_fresh_crumb() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Ok(HttpResponse::with_status(429, "Too Many Requests")),
        Ok(body(r#"{"symbol":"AAPL","regularMarketPrice":189.84}"#)),
    ]));
    let source = yahoo(transport.clone());

    let quote = source.quote(&symbol("AAPL")).await.expect("retry succeeds");

    assert_eq!(quote.price, dec!(189.84));
    let crumb_fetches = transport
        .seen()
        .iter()
        .filter(|request| request.url.contains("getcrumb"))
        .count();
    assert_eq!(crumb_fetches, 2);
}

#[tokio::test]
async fn cookie_override_is_sent_on_every_request() {
    let transport = Arc::new(ScriptedTransport::new(vec![Ok(body(
        r#"{"symbol":"AAPL","regularMarketPrice":1.0}"#,
    ))]));
    let source = YahooQuoteSource::with_http_client(
        transport.clone(),
        HttpAuth::Cookie(String::from("A3=session")),
    );

    source.quote(&symbol("AAPL")).await.expect("quote");

    for request in transport.seen() {
        assert_eq!(
            request.headers.get("cookie").map(String::as_str),
            Some("A3=session")
        );
    }
}

// =============================================================================
// Offline source
// =============================================================================

#[tokio::test]
async fn mock_source_is_deterministic_per_symbol() {
    let source = MockQuoteSource::new();
    let aapl = symbol("AAPL");

    let first = source.quote(&aapl).await.expect("quote");
    let second = source.quote(&aapl).await.expect("quote");

    assert_eq!(source.id(), ProviderId::Mock);
    assert_eq!(first.price, second.price);
    assert_eq!(first.name, "Apple Inc.");
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn restored_symbol_is_priced_again() {
    let x = symbol("X");
    let source = MockQuoteSource::with_prices([(x.clone(), dec!(7))]);

    source.fail_symbol(&x);
    assert_eq!(
        source.quote(&x).await.expect_err("failing").kind(),
        QuoteErrorKind::Unavailable
    );

    source.restore_symbol(&x);
    assert_eq!(source.quote(&x).await.expect("restored").price, dec!(7));
}
