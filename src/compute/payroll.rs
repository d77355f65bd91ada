//! Net salary formula.

use rust_decimal::Decimal;
use serde::Serialize;

/// House rent allowance: 20% of basic.
pub const HRA_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
/// Other allowances: 10% of basic.
pub const ALLOWANCE_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
/// Deductions: 5% of basic.
pub const DEDUCTION_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Currency columns keep two fraction digits.
const SCALE: u32 = 2;

/// Derived payroll columns for one basic salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayrollBreakdown {
    pub basic: Decimal,
    pub hra: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    pub net: Decimal,
}

impl PayrollBreakdown {
    /// Every component is rounded half-to-even to cents. `net` is derived from
    /// the unrounded components and rounded once, so it always equals
    /// `1.25 * basic` at cent precision.
    pub fn from_basic(basic: Decimal) -> Self {
        let hra = basic * HRA_RATE;
        let allowances = basic * ALLOWANCE_RATE;
        let deductions = basic * DEDUCTION_RATE;
        let net = basic + hra + allowances - deductions;

        Self {
            basic: basic.round_dp(SCALE),
            hra: hra.round_dp(SCALE),
            allowances: allowances.round_dp(SCALE),
            deductions: deductions.round_dp(SCALE),
            net: net.round_dp(SCALE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn fifty_thousand() {
        let b = PayrollBreakdown::from_basic(d("50000.00"));
        assert_eq!(b.hra, d("10000.00"));
        assert_eq!(b.allowances, d("5000.00"));
        assert_eq!(b.deductions, d("2500.00"));
        assert_eq!(b.net, d("62500.00"));
        assert_eq!(b.net.to_string(), "62500.00");
    }

    #[test]
    fn zero_basic() {
        let b = PayrollBreakdown::from_basic(Decimal::ZERO);
        assert_eq!(b.net, Decimal::ZERO);
        assert_eq!(b.hra, Decimal::ZERO);
    }

    #[test]
    fn net_is_one_and_a_quarter_basic_for_every_cent_amount() {
        let quarter_and_one = d("1.25");
        // Walk a spread of cent values, including odd cents that exercise rounding.
        let mut cents: i64 = 0;
        while cents <= 10_000_000 {
            let basic = Decimal::new(cents, 2);
            let b = PayrollBreakdown::from_basic(basic);
            assert_eq!(b.net, (basic * quarter_and_one).round_dp(2), "basic = {basic}");
            assert_eq!(b.basic, basic);
            cents = cents * 3 + 7;
        }
        for cents in 0..2_000 {
            let basic = Decimal::new(cents, 2);
            let b = PayrollBreakdown::from_basic(basic);
            assert_eq!(b.net, (basic * quarter_and_one).round_dp(2), "basic = {basic}");
        }
    }

    #[test]
    fn rounds_half_to_even() {
        // 0.10 * 0.05 = 0.005 -> 0.00 ; 0.30 * 0.05 = 0.015 -> 0.02
        assert_eq!(PayrollBreakdown::from_basic(d("0.10")).deductions, d("0.00"));
        assert_eq!(PayrollBreakdown::from_basic(d("0.30")).deductions, d("0.02"));
        // 0.02 * 1.25 = 0.025 -> 0.02
        assert_eq!(PayrollBreakdown::from_basic(d("0.02")).net, d("0.02"));
    }

    #[test]
    fn exact_decimal_not_float() {
        // 0.1 + 0.2 style drift would show up here with f64.
        let b = PayrollBreakdown::from_basic(d("33333.33"));
        assert_eq!(b.hra, d("6666.67"));
        assert_eq!(b.allowances, d("3333.33"));
        assert_eq!(b.deductions, d("1666.67"));
        assert_eq!(b.net, d("41666.66"));
    }
}
