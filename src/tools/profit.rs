//! Farm profit calculator.

use crate::error::{Result, RoostError};

/// Inputs to the profit calculation, all in the same currency.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfitInputs {
    pub feed_cost: f64,
    pub medicine_cost: f64,
    pub labor_cost: f64,
    pub egg_sales: f64,
    pub meat_sales: f64,
}

impl ProfitInputs {
    /// Reject negative amounts.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("feed cost", self.feed_cost),
            ("medicine cost", self.medicine_cost),
            ("labor cost", self.labor_cost),
            ("egg sales", self.egg_sales),
            ("meat sales", self.meat_sales),
        ];

        for (name, value) in fields {
            if value < 0.0 {
                return Err(RoostError::InvalidInput(format!(
                    "{} must not be negative (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Profit = (egg sales + meat sales) - (feed + medicine + labor).
pub fn calculate_profit(inputs: &ProfitInputs) -> Result<f64> {
    inputs.validate()?;

    let total_cost = inputs.feed_cost + inputs.medicine_cost + inputs.labor_cost;
    let total_revenue = inputs.egg_sales + inputs.meat_sales;
    Ok(total_revenue - total_cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_calculation() {
        let inputs = ProfitInputs {
            feed_cost: 100.0,
            medicine_cost: 50.0,
            labor_cost: 30.0,
            egg_sales: 300.0,
            meat_sales: 0.0,
        };

        assert!((calculate_profit(&inputs).unwrap() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_loss_is_negative() {
        let inputs = ProfitInputs {
            feed_cost: 500.0,
            egg_sales: 300.0,
            ..Default::default()
        };

        assert!((calculate_profit(&inputs).unwrap() + 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_input_rejected() {
        let inputs = ProfitInputs {
            feed_cost: -1.0,
            ..Default::default()
        };

        assert!(matches!(
            calculate_profit(&inputs),
            Err(RoostError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_all_zero_inputs() {
        assert!((calculate_profit(&ProfitInputs::default()).unwrap()).abs() < 1e-9);
    }
}
