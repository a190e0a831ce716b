use std::future::Future;
use std::time::Duration;

use papertrade_core::Trader;
use tokio::time::MissedTickBehavior;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

use super::portfolio;

/// Redraw the portfolio every `interval` until Ctrl-C. Never trades.
pub async fn run(
    trader: &mut Trader,
    interval: Duration,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    run_until(trader, interval, format, pretty, tokio::signal::ctrl_c()).await?;
    Ok(())
}

/// Refresh loop behind [`run`]. Each tick re-reads the ledger file so trades
/// made by other invocations show up. Returns the number of redraws.
async fn run_until<F>(
    trader: &mut Trader,
    interval: Duration,
    format: OutputFormat,
    pretty: bool,
    shutdown: F,
) -> Result<u64, CliError>
where
    F: Future<Output = std::io::Result<()>>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    tracing::info!(interval_secs = interval.as_secs(), "watching portfolio");
    let mut redraws = 0_u64;
    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal?;
                tracing::info!(redraws, "watch interrupted");
                return Ok(redraws);
            }
            _ = ticker.tick() => {
                if redraws > 0 && format == OutputFormat::Table {
                    println!();
                }
                redraws += 1;

                trader.reload()?;
                let result = portfolio::run(trader).await?;
                output::render(&result, format, pretty)?;
            }
        }
    }
}
