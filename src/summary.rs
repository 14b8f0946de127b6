use crate::date::MonthKey;
use crate::ledger::Ledgers;
use crate::settings::EffectiveSettings;
use crate::tax::compute_withholding;
use rust_decimal::Decimal;
use serde::Serialize;

/// Financial snapshot for one month: resolved settings, withholding tax and
/// the month's ad-hoc ledgers, plus the year-to-date figures the tax engine
/// computes on the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub gross_salary: Decimal,
    pub social_insurance: Decimal,
    pub housing_fund: Decimal,
    pub tax: Decimal,
    pub net_income: Decimal,
    pub expenses: Decimal,
    pub other_income: Decimal,
    pub cumulative_income: Decimal,
    pub cumulative_tax: Decimal,
}

/// Stateless per call: recomputed in full from the current timeline and
/// ledgers on every invocation.
pub fn compute_summary(
    resolver: &impl EffectiveSettings,
    ledgers: &Ledgers,
    month: MonthKey,
) -> MonthlySummary {
    let settings = resolver.effective_settings(month);
    let withholding = compute_withholding(resolver, month);

    let gross_salary = settings.gross_salary();
    let social_insurance = settings.social_insurance().round_dp(2);
    let housing_fund = settings.housing_fund().round_dp(2);
    let tax = withholding.month_tax;
    let net_income = gross_salary - social_insurance - housing_fund - tax;

    MonthlySummary {
        month,
        gross_salary,
        social_insurance,
        housing_fund,
        tax,
        net_income,
        expenses: ledgers.total_expenses(month),
        other_income: ledgers.total_income(month),
        cumulative_income: withholding.cumulative_income,
        cumulative_tax: withholding.cumulative_tax,
    }
}
