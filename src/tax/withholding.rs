use crate::date::MonthKey;
use crate::settings::EffectiveSettings;
use crate::tax::brackets::{annual_tax, MONTHLY_DEDUCTION};
use rust_decimal::Decimal;

/// Year-to-date withholding figures for one target month.
#[derive(Debug, Clone, PartialEq)]
pub struct Withholding {
    pub month: MonthKey,
    /// Tax to withhold for the target month.
    pub month_tax: Decimal,
    /// Taxable-base income accumulated January through the target month.
    pub cumulative_income: Decimal,
    /// Cumulative taxable income after insurance and monthly deductions.
    pub cumulative_taxable: Decimal,
    /// Annual tax on the cumulative taxable income through the target month.
    pub cumulative_tax: Decimal,
}

/// Cumulative withholding: resolve every month from January through the
/// target, accumulate taxable income (floored at zero per month after the
/// standard deduction), and withhold the difference between the cumulative
/// liability and what prior months already covered.
///
/// Always recomputes from January so a retroactive anchor edit changes the
/// withholding of every later month in the year. An unresolved month
/// contributes the zero record.
pub fn compute_withholding(resolver: &impl EffectiveSettings, month: MonthKey) -> Withholding {
    let mut cumulative_income = Decimal::ZERO;
    let mut cumulative_taxable = Decimal::ZERO;
    let mut prior_taxable = Decimal::ZERO;

    for m in month.year_to_date() {
        let settings = resolver.effective_settings(m);
        let monthly_taxable =
            (settings.monthly_taxable_income() - MONTHLY_DEDUCTION).max(Decimal::ZERO);
        cumulative_income += settings.taxable_base();
        cumulative_taxable += monthly_taxable;
        if m < month {
            prior_taxable += monthly_taxable;
        }
    }

    let cumulative_tax = annual_tax(cumulative_taxable);
    let previous_cumulative_tax = annual_tax(prior_taxable);
    let month_tax = (cumulative_tax - previous_cumulative_tax)
        .max(Decimal::ZERO)
        .round_dp(2);
    log::debug!(
        "{month}: cumulative taxable {cumulative_taxable}, cumulative tax {cumulative_tax}, month tax {month_tax}"
    );

    Withholding {
        month,
        month_tax,
        cumulative_income,
        cumulative_taxable,
        cumulative_tax,
    }
}
