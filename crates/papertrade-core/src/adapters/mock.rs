use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;

use crate::quote_source::{ProviderId, QuoteError, QuoteSource};
use crate::{Quote, Symbol, UtcDateTime, NOT_AVAILABLE};

/// Deterministic offline quote source.
///
/// Prices are derived from the symbol text unless overridden with
/// [`MockQuoteSource::set_price`]; symbols marked with
/// [`MockQuoteSource::fail_symbol`] always fail as unavailable.
#[derive(Debug, Default)]
pub struct MockQuoteSource {
    prices: Mutex<HashMap<Symbol, Decimal>>,
    failing: Mutex<HashSet<Symbol>>,
    calls: AtomicUsize,
}

impl MockQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source preloaded with price overrides.
    pub fn with_prices<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, Decimal)>,
    {
        let source = Self::default();
        lock(&source.prices).extend(prices);
        source
    }

    pub fn set_price(&self, symbol: &Symbol, price: Decimal) {
        lock(&self.prices).insert(symbol.clone(), price);
    }

    pub fn fail_symbol(&self, symbol: &Symbol) {
        lock(&self.failing).insert(symbol.clone());
    }

    pub fn restore_symbol(&self, symbol: &Symbol) {
        lock(&self.failing).remove(symbol);
    }

    /// Number of quote calls served, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, symbol: &Symbol) -> Result<Quote, QuoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if lock(&self.failing).contains(symbol) {
            return Err(QuoteError::unavailable(format!(
                "mock source refuses '{symbol}'"
            )));
        }

        let seed = symbol_seed(symbol);
        let price = lock(&self.prices)
            .get(symbol)
            .copied()
            .unwrap_or_else(|| Decimal::new(920 + (seed % 500) as i64, 1));

        let quote = Quote::new(
            symbol.clone(),
            catalog_name(symbol),
            price,
            "USD",
            UtcDateTime::now(),
        )?
        .with_change_percent(Some(((seed % 400) as f64 - 200.0) / 100.0))?
        .with_volume(Some(50_000 + seed % 10_000))
        .with_market_cap(Some(500_000_000_000.0 + (seed % 300_000) as f64 * 1_000_000.0))?
        .with_pe_ratio(Some(14.0 + (seed % 200) as f64 / 10.0))?;

        Ok(quote)
    }
}

impl QuoteSource for MockQuoteSource {
    fn id(&self) -> ProviderId {
        ProviderId::Mock
    }

    fn quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, QuoteError>> + Send + 'a>> {
        let result = self.lookup(symbol);
        Box::pin(async move { result })
    }
}

fn catalog_name(symbol: &Symbol) -> &'static str {
    match symbol.as_str() {
        "AAPL" => "Apple Inc.",
        "MSFT" => "Microsoft Corporation",
        "GOOGL" => "Alphabet Inc.",
        "SPY" => "SPDR S&P 500 ETF Trust",
        "QQQ" => "Invesco QQQ Trust",
        _ => NOT_AVAILABLE,
    }
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
