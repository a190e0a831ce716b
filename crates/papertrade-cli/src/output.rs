use papertrade_core::NOT_AVAILABLE;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&result.data)?
            } else {
                serde_json::to_string(&result.data)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => {
            for line in &result.lines {
                println!("{line}");
            }
        }
    }

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    Ok(())
}

/// Two decimal places, the way cash is shown.
pub fn money(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

pub fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| String::from(NOT_AVAILABLE), |v| format!("{v:+.2}%"))
}

pub fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| String::from(NOT_AVAILABLE), |v| format!("{v:.2}"))
}

pub fn count(value: Option<u64>) -> String {
    value.map_or_else(|| String::from(NOT_AVAILABLE), |v| v.to_string())
}

/// Large amounts with a T/B/M suffix.
pub fn abbreviated(value: Option<f64>) -> String {
    let Some(value) = value else {
        return String::from(NOT_AVAILABLE);
    };

    let magnitude = value.abs();
    if magnitude >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if magnitude >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else {
        format!("{value:.0}")
    }
}

/// Left-aligned first column, right-aligned numeric columns.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.len());
            }
        }
    }

    let format_row = |cells: Vec<&str>| {
        cells
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let width = widths.get(index).copied().unwrap_or(0);
                if index == 0 {
                    format!("{cell:<width$}")
                } else {
                    format!("{cell:>width$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines
}
