mod portfolio;
mod quote;
mod trade;
mod watch;

use std::sync::Arc;
use std::time::Duration;

use papertrade_core::{MockQuoteSource, QuoteSource, Side, Trader, TraderConfig, YahooQuoteSource};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output;

/// What a command produced: the JSON payload, its table rendering, and
/// anything worth flagging on stderr.
pub struct CommandResult {
    pub data: Value,
    pub lines: Vec<String>,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value, lines: Vec<String>) -> Self {
        Self {
            data,
            lines,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = build_config(cli);
    let mut trader = Trader::open(&config, quote_source(cli, &config))?;
    tracing::debug!(ledger = %config.ledger_path.display(), mock = cli.mock, "session opened");

    let result = match &cli.command {
        Command::Quote(args) => quote::run(args, &trader).await?,
        Command::Buy(args) => trade::run(args, Side::Buy, &mut trader).await?,
        Command::Sell(args) => trade::run(args, Side::Sell, &mut trader).await?,
        Command::Portfolio => portfolio::run(&trader).await?,
        Command::Watch(_) => {
            return watch::run(&mut trader, config.refresh_interval, cli.format, cli.pretty).await;
        }
    };

    output::render(&result, cli.format, cli.pretty)
}

fn build_config(cli: &Cli) -> TraderConfig {
    let mut config = TraderConfig::default().with_timeout_ms(cli.timeout_ms);
    if let Some(path) = &cli.ledger {
        config = config.with_ledger_path(path.clone());
    }
    if let Some(balance) = cli.starting_balance {
        config = config.with_starting_balance(balance);
    }
    if let Command::Watch(args) = &cli.command {
        config = config.with_refresh_interval(Duration::from_secs(args.interval_secs));
    }
    config
}

fn quote_source(cli: &Cli, config: &TraderConfig) -> Arc<dyn QuoteSource> {
    if cli.mock {
        Arc::new(MockQuoteSource::new())
    } else {
        Arc::new(YahooQuoteSource::default().with_timeout_ms(config.timeout_ms))
    }
}
