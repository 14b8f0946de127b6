use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Standard monthly deduction threshold applied before taxable income
/// accumulates.
pub const MONTHLY_DEDUCTION: Decimal = dec!(5000);

/// Annual individual income tax on cumulative taxable income, using the
/// 7-bracket progressive schedule with quick deductions. Each bracket's
/// `x * rate - quick_deduction` agrees with its neighbour at the shared
/// boundary.
pub fn annual_tax(taxable: Decimal) -> Decimal {
    if taxable <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let (rate, quick_deduction) = if taxable <= dec!(36000) {
        (dec!(0.03), dec!(0))
    } else if taxable <= dec!(144000) {
        (dec!(0.10), dec!(2520))
    } else if taxable <= dec!(300000) {
        (dec!(0.20), dec!(16920))
    } else if taxable <= dec!(420000) {
        (dec!(0.25), dec!(31920))
    } else if taxable <= dec!(660000) {
        (dec!(0.30), dec!(52920))
    } else if taxable <= dec!(960000) {
        (dec!(0.35), dec!(85920))
    } else {
        (dec!(0.45), dec!(181920))
    };
    (taxable * rate - quick_deduction).round_dp(2)
}
