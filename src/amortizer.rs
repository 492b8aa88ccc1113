//! Repayment policies.
//!
//! Each policy turns the running [`AmortizationState`] into the interest and
//! principal share of one period. All figures are percentages of the original
//! principal and stay unrounded; rounding happens when a
//! [`PaymentRecord`](crate::loan::PaymentRecord) is built.

use log::{trace, warn};

/// Largest `(1+i)^n` an annuity may reach; past it the recurrence loses the
/// early principal shares to floating point error.
pub const MAX_ANNUITY_GROWTH: f64 = 1e9;

/// State threaded from one period to the next.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct AmortizationState {
    /// capitalized base percentage, fixed at period zero
    pub base_pct: f64,
    /// percentage still owed before the next payment
    pub remaining_pct: f64,
}

impl AmortizationState {
    pub fn new(base_pct: f64) -> Self {
        Self {
            base_pct,
            remaining_pct: base_pct,
        }
    }
}

/// Interest and principal percentages of a single period.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PeriodShare {
    pub interest_pct: f64,
    pub principal_pct: f64,
}

impl PeriodShare {
    pub fn total_pct(&self) -> f64 {
        self.interest_pct + self.principal_pct
    }
}

/// Produces the share of period `period` (zero based) and the state the
/// following period starts from.
pub trait Amortize {
    fn next_share(&self, period: u32, state: AmortizationState) -> (PeriodShare, AmortizationState);
}

/// Constant principal portion per payment.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LinearAmortizer {
    rate: f64,
    periods: u32,
}

impl LinearAmortizer {
    pub fn new(rate: f64, periods: u32) -> Self {
        Self { rate, periods }
    }
}

impl Amortize for LinearAmortizer {
    fn next_share(&self, period: u32, state: AmortizationState) -> (PeriodShare, AmortizationState) {
        let a_k = state.base_pct / f64::from(self.periods);
        let r_k = (state.base_pct - f64::from(period) * a_k) * self.rate;
        trace!("linear period {}, A_k {}, R_k {}", period, a_k, r_k);

        let share = PeriodShare {
            interest_pct: r_k,
            principal_pct: a_k,
        };
        let next = AmortizationState {
            remaining_pct: state.remaining_pct - a_k,
            ..state
        };
        (share, next)
    }
}

/// Constant total payment per period.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct AnnuityAmortizer {
    rate: f64,
    periods: u32,
    // i(1+i)^n / ((1+i)^n - 1); None when the denominator vanishes, in
    // which case the loan is repaid in equal interest-free shares
    factor: Option<f64>,
}

impl AnnuityAmortizer {
    pub fn new(rate: f64, periods: u32) -> Self {
        let factor = annuity_factor(rate, periods);
        if factor.is_none() {
            warn!(
                "annuity at rate {} over {} periods has no interest growth, using equal principal payments",
                rate, periods
            );
        }
        Self {
            rate,
            periods,
            factor,
        }
    }

    /// Constant periodic payment percentage for the capitalized base `base_pct`.
    pub fn payment_pct(&self, base_pct: f64) -> f64 {
        match self.factor {
            Some(factor) => factor * base_pct,
            None => base_pct / f64::from(self.periods),
        }
    }
}

/// Compound growth `(1+i)^n` of the annuity formula.
pub fn annuity_growth(rate: f64, periods: u32) -> f64 {
    (1. + rate).powf(f64::from(periods))
}

fn annuity_factor(rate: f64, periods: u32) -> Option<f64> {
    let growth = annuity_growth(rate, periods);
    let denominator = growth - 1.;
    if denominator == 0. {
        None
    } else if !growth.is_finite() {
        // limit of the factor as (1+i)^n grows without bound
        Some(rate)
    } else {
        Some(rate * growth / denominator)
    }
}

impl Amortize for AnnuityAmortizer {
    fn next_share(&self, period: u32, state: AmortizationState) -> (PeriodShare, AmortizationState) {
        let j = self.payment_pct(state.base_pct);
        let r_k = match self.factor {
            Some(_) => self.rate * state.remaining_pct,
            None => 0.,
        };
        let a_k = j - r_k;
        trace!(
            "annuity period {}, J {}, R_k {}, A_k {}, T_prev {}",
            period,
            j,
            r_k,
            a_k,
            state.remaining_pct
        );

        let share = PeriodShare {
            interest_pct: r_k,
            principal_pct: a_k,
        };
        let next = AmortizationState {
            remaining_pct: state.remaining_pct - a_k,
            ..state
        };
        (share, next)
    }
}

#[cfg(test)]
mod tests {
    use super::{annuity_growth, Amortize, AmortizationState, AnnuityAmortizer, LinearAmortizer, PeriodShare};
    use approx::assert_relative_eq;
    use test_log::test;

    fn run(amortizer: &dyn Amortize, periods: u32, base_pct: f64) -> (Vec<PeriodShare>, AmortizationState) {
        let mut state = AmortizationState::new(base_pct);
        let mut shares = Vec::new();
        for k in 0..periods {
            let (share, next) = amortizer.next_share(k, state);
            shares.push(share);
            state = next;
        }
        (shares, state)
    }

    #[test]
    fn test_linear_principal_is_constant() {
        let (shares, state) = run(&LinearAmortizer::new(0.1, 6), 6, 100.);

        for share in &shares {
            assert_relative_eq!(share.principal_pct, 100. / 6.);
        }
        assert_relative_eq!(shares[0].interest_pct, 10.);
        assert_relative_eq!(shares[3].interest_pct, 5., epsilon = 1e-12);
        assert_relative_eq!(shares[5].interest_pct, 10. / 6., epsilon = 1e-12);
        assert_relative_eq!(state.remaining_pct, 0., epsilon = 1e-9);
        assert_eq!(state.base_pct, 100.);
    }

    #[test]
    fn test_annuity_payment_is_constant() {
        let amortizer = AnnuityAmortizer::new(0.1, 6);
        let (shares, state) = run(&amortizer, 6, 100.);

        let j = amortizer.payment_pct(100.);
        assert_relative_eq!(j, 22.960_738, epsilon = 1e-6);
        for share in &shares {
            assert_relative_eq!(share.total_pct(), j, epsilon = 1e-9);
        }
        // interest shrinks while the principal share grows
        assert!(shares.windows(2).all(|w| w[1].interest_pct < w[0].interest_pct));
        assert!(shares.windows(2).all(|w| w[1].principal_pct > w[0].principal_pct));
        assert_relative_eq!(state.remaining_pct, 0., epsilon = 1e-9);
    }

    #[test]
    fn test_annuity_payment_scales_with_capitalized_base() {
        let amortizer = AnnuityAmortizer::new(0.1, 6);
        assert_relative_eq!(
            amortizer.payment_pct(121.),
            amortizer.payment_pct(100.) * 1.21,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_zero_rate_annuity_falls_back_to_equal_principal() {
        let amortizer = AnnuityAmortizer::new(0., 4);
        let (shares, state) = run(&amortizer, 4, 100.);

        for share in &shares {
            assert_eq!(share.interest_pct, 0.);
            assert_eq!(share.principal_pct, 25.);
        }
        assert_eq!(state.remaining_pct, 0.);
    }

    #[test]
    fn test_negligible_rate_annuity_charges_no_interest() {
        // 1 + 1e-18 == 1, so the annuity formula has no growth to work with
        let amortizer = AnnuityAmortizer::new(1e-18, 5);
        let (shares, state) = run(&amortizer, 5, 100.);

        for share in &shares {
            assert_eq!(share.interest_pct, 0.);
            assert_eq!(share.principal_pct, 20.);
        }
        assert_relative_eq!(state.remaining_pct, 0., epsilon = 1e-12);
    }

    #[test]
    fn test_unbounded_growth_never_goes_negative() {
        // 11^301 overflows f64
        let amortizer = AnnuityAmortizer::new(10., 301);
        assert_eq!(amortizer.payment_pct(100.), 1000.);

        let (shares, state) = run(&amortizer, 301, 100.);
        assert!(shares.iter().all(|s| s.principal_pct >= 0.));
        assert!(shares.iter().all(|s| s.interest_pct == 1000.));
        assert_eq!(state.remaining_pct, 100.);
    }

    #[test]
    fn test_annuity_growth() {
        assert_eq!(annuity_growth(1., 10), 1024.);
        assert_eq!(annuity_growth(0., 360), 1.);
        assert!(annuity_growth(10., 301).is_infinite());
    }
}
