use papertrade_core::{Quantity, Side, Symbol, TradeReceipt, Trader};

use crate::cli::TradeArgs;
use crate::error::CliError;
use crate::output;

use super::CommandResult;

pub async fn run(
    args: &TradeArgs,
    side: Side,
    trader: &mut Trader,
) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let quantity = Quantity::parse(&args.quantity)?;

    let receipt = match side {
        Side::Buy => trader.buy(&symbol, quantity).await?,
        Side::Sell => trader.sell(&symbol, quantity).await?,
    };

    let data = serde_json::to_value(&receipt)?;
    Ok(CommandResult::ok(data, lines(&receipt)))
}

fn lines(receipt: &TradeReceipt) -> Vec<String> {
    let fill = &receipt.fill;
    vec![
        receipt.message.clone(),
        format!("Price        : {}", output::money(fill.price)),
        format!("Amount       : {}", output::money(fill.amount)),
        format!("Shares held  : {}", fill.shares_after),
        format!("Cash balance : {}", output::money(fill.balance_after)),
    ]
}
