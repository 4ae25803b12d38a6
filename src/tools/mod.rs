//! Single-shot husbandry tools.
//!
//! Independent utilities outside the answering pipeline: lab-report
//! analysis, disease image diagnosis, and the profit calculator.

mod diagnosis;
mod lab;
mod profit;

pub use diagnosis::DiseaseDiagnoser;
pub use lab::LabAnalyzer;
pub use profit::{calculate_profit, ProfitInputs};
