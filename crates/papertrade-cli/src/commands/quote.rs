use papertrade_core::{Quote, Symbol, Trader};

use crate::cli::QuoteArgs;
use crate::error::CliError;
use crate::output;

use super::CommandResult;

pub async fn run(args: &QuoteArgs, trader: &Trader) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let quote = trader.stock_info(&symbol).await?;

    let data = serde_json::to_value(&quote)?;
    Ok(CommandResult::ok(data, lines(&quote)))
}

fn lines(quote: &Quote) -> Vec<String> {
    vec![
        format!("{}  {}", quote.symbol, quote.name),
        format!("Price      : {} {}", output::money(quote.price), quote.currency),
        format!("Change     : {}", output::percent(quote.change_percent)),
        format!("Volume     : {}", output::count(quote.volume)),
        format!("Market cap : {}", output::abbreviated(quote.market_cap)),
        format!("P/E ratio  : {}", output::ratio(quote.pe_ratio)),
        format!("As of      : {}", quote.as_of.format_rfc3339()),
    ]
}
