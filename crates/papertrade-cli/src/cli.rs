//! CLI argument definitions for papertrade.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quote` | Show the current quote for a symbol |
//! | `buy` | Buy shares at the current price |
//! | `sell` | Sell held shares at the current price |
//! | `portfolio` | Show balance, holdings and total value |
//! | `watch` | Redraw the portfolio on a fixed interval |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--ledger` | `$PAPERTRADE_HOME/portfolio.json` | Ledger file |
//! | `--starting-balance` | `100000` | Balance for a new ledger |
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `10000` | Request timeout in ms |
//! | `--mock` | `false` | Offline deterministic quotes |
//!
//! # Examples
//!
//! ```bash
//! papertrade quote AAPL
//! papertrade buy AAPL 10
//! papertrade sell AAPL 4 --format json --pretty
//! papertrade watch --interval-secs 30
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use papertrade_core::http_client::DEFAULT_TIMEOUT_MS;
use rust_decimal::Decimal;

/// Paper trading against a simulated cash balance with live quotes.
#[derive(Debug, Parser)]
#[command(
    name = "papertrade",
    author,
    version,
    about = "Paper stock trading simulator",
    long_about = "papertrade keeps a fake cash balance and a set of share holdings in a \
local JSON file. Buys and sells execute instantly at the current Yahoo Finance price.\n\
\n\
Use 'papertrade <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Ledger file to read and rewrite.
    ///
    /// Defaults to portfolio.json inside $PAPERTRADE_HOME (or ~/.papertrade).
    #[arg(long, global = true, value_name = "PATH")]
    pub ledger: Option<PathBuf>,

    /// Cash balance used when the ledger file does not exist yet.
    #[arg(long, global = true, value_name = "AMOUNT", value_parser = parse_balance)]
    pub starting_balance: Option<Decimal>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Use the deterministic offline quote source instead of Yahoo Finance.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show name, price, change, volume, market cap and P/E for a symbol.
    ///
    /// # Examples
    ///
    ///   papertrade quote AAPL
    ///   papertrade quote msft --format json
    Quote(QuoteArgs),

    /// Buy shares at the current market price.
    ///
    /// Fails when no price is available or the cost exceeds the balance.
    ///
    /// # Examples
    ///
    ///   papertrade buy AAPL 10
    Buy(TradeArgs),

    /// Sell held shares at the current market price.
    ///
    /// Fails when fewer shares are held than requested or no price is available.
    ///
    /// # Examples
    ///
    ///   papertrade sell AAPL 5
    Sell(TradeArgs),

    /// Show cash balance, holdings and total portfolio value.
    Portfolio,

    /// Redraw the portfolio every interval until interrupted with Ctrl-C.
    ///
    /// The ledger file is re-read on every refresh, so trades made from
    /// another terminal show up on the next redraw.
    ///
    /// # Examples
    ///
    ///   papertrade watch
    ///   papertrade watch --interval-secs 15
    Watch(WatchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    /// Ticker symbol, e.g. AAPL.
    pub symbol: String,
}

#[derive(Debug, Clone, Args)]
pub struct TradeArgs {
    /// Ticker symbol, e.g. AAPL.
    pub symbol: String,

    /// Whole number of shares.
    ///
    /// Kept as text so malformed input is reported as a validation error.
    #[arg(allow_hyphen_values = true)]
    pub quantity: String,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    /// Seconds between refreshes.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,
}

fn parse_balance(input: &str) -> Result<Decimal, String> {
    let value = Decimal::from_str(input.trim())
        .map_err(|_| format!("'{input}' is not a decimal amount"))?;
    if value.is_sign_negative() {
        return Err(format!("starting balance must not be negative: {value}"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_apply_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "papertrade",
            "buy",
            "AAPL",
            "10",
            "--mock",
            "--format",
            "json",
            "--ledger",
            "/tmp/ledger.json",
        ])
        .expect("arguments should parse");

        assert!(cli.mock);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.ledger, Some(PathBuf::from("/tmp/ledger.json")));
        match cli.command {
            Command::Buy(args) => {
                assert_eq!(args.symbol, "AAPL");
                assert_eq!(args.quantity, "10");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["papertrade", "watch"]).expect("arguments should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.timeout_ms, 10_000);
        assert!(cli.starting_balance.is_none());
        match cli.command {
            Command::Watch(args) => assert_eq!(args.interval_secs, 60),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn negative_quantity_reaches_validation() {
        let cli = Cli::try_parse_from(["papertrade", "sell", "AAPL", "-3"])
            .expect("hyphen values are accepted");
        match cli.command {
            Command::Sell(args) => assert_eq!(args.quantity, "-3"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn starting_balance_must_be_a_non_negative_decimal() {
        let cli = Cli::try_parse_from(["papertrade", "portfolio", "--starting-balance", "2500.50"])
            .expect("arguments should parse");
        assert_eq!(cli.starting_balance, Some(Decimal::new(250_050, 2)));

        assert!(Cli::try_parse_from(["papertrade", "portfolio", "--starting-balance", "lots"]).is_err());
        assert!(Cli::try_parse_from(["papertrade", "portfolio", "--starting-balance=-1"]).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["papertrade", "watch", "--interval-secs", "0"]).is_err());
    }
}
