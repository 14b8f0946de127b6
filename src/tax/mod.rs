pub mod brackets;
pub mod withholding;

pub use brackets::{annual_tax, MONTHLY_DEDUCTION};
pub use withholding::{compute_withholding, Withholding};
