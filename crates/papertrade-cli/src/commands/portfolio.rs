use papertrade_core::{PortfolioReport, Trader};

use crate::error::CliError;
use crate::output;

use super::CommandResult;

pub async fn run(trader: &Trader) -> Result<CommandResult, CliError> {
    let report = trader.portfolio_report().await;
    let warnings = report
        .unpriced
        .iter()
        .map(|symbol| format!("could not value {symbol}; left out of the portfolio value"))
        .collect();

    let data = serde_json::to_value(&report)?;
    Ok(CommandResult::ok(data, lines(&report)).with_warnings(warnings))
}

fn lines(report: &PortfolioReport) -> Vec<String> {
    let mut lines = vec![
        format!("Cash balance    : {}", output::money(report.balance)),
        format!("Holdings value  : {}", output::money(report.holdings_value)),
        format!("Portfolio value : {}", output::money(report.total_value)),
        format!("As of           : {}", report.as_of.format_rfc3339()),
        String::new(),
    ];

    if report.positions.is_empty() {
        lines.push(String::from("No holdings."));
        return lines;
    }

    let rows: Vec<Vec<String>> = report
        .positions
        .iter()
        .map(|position| {
            vec![
                position.symbol.to_string(),
                position.shares.to_string(),
                output::money(position.price),
                output::money(position.value),
                position.gain_loss.clone(),
            ]
        })
        .collect();
    lines.extend(output::table(
        &["Symbol", "Shares", "Price", "Value", "Gain/Loss"],
        &rows,
    ));
    lines
}
