//! Profit calculator command.

use crate::cli::Output;
use crate::tools::{calculate_profit, ProfitInputs};
use anyhow::Result;

/// Run the profit command.
pub fn run_profit(inputs: &ProfitInputs) -> Result<()> {
    match calculate_profit(inputs) {
        Ok(profit) => {
            Output::header("Profit Summary");
            Output::kv(
                "Total costs",
                &format!(
                    "{:.2}",
                    inputs.feed_cost + inputs.medicine_cost + inputs.labor_cost
                ),
            );
            Output::kv(
                "Total revenue",
                &format!("{:.2}", inputs.egg_sales + inputs.meat_sales),
            );
            println!();

            if profit >= 0.0 {
                Output::success(&format!("Farm profit: {:.2}", profit));
            } else {
                Output::warning(&format!("Farm loss: {:.2}", -profit));
            }
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
