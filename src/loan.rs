use chrono::{Months, NaiveDate};
use log::{debug, info, trace};
use std::{fmt, str::FromStr};

use crate::amortizer::{
    annuity_growth, Amortize, AmortizationState, AnnuityAmortizer, LinearAmortizer, PeriodShare,
    MAX_ANNUITY_GROWTH,
};
use crate::error::{LoanError, LoanResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 100 years of monthly payments plus period zero.
pub const MAX_PERIOD_COUNT: u32 = 1201;

/// Repayment policy of a loan.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LoanType {
    /// constant principal portion per payment
    Linear,
    /// constant total payment per period
    #[default]
    Annuity,
}

impl LoanType {
    /// Policy that produces the payments of this loan type.
    pub fn amortizer(&self, rate: f64, periods: u32) -> Box<dyn Amortize> {
        match self {
            LoanType::Linear => Box::new(LinearAmortizer::new(rate, periods)),
            LoanType::Annuity => Box::new(AnnuityAmortizer::new(rate, periods)),
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanType::Linear => write!(f, "linear"),
            LoanType::Annuity => write!(f, "annuity"),
        }
    }
}

impl FromStr for LoanType {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(LoanType::Linear),
            "annuity" => Ok(LoanType::Annuity),
            _ => Err(LoanError::UnsupportedLoanType(s.to_string())),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoanParameters {
    pub loan_type: LoanType,
    pub principal: f64,
    pub payment_interval_months: u32,
    pub loan_term_months: u32,
    pub grace_period_months: u32,
    /// annual rate as a percentage (i.e., 2.5, 10.0), applied once per payment period
    pub annual_interest_rate_percent: f64,
    /// due date of the first payment; later payments follow every interval
    #[cfg_attr(feature = "serde", serde(default))]
    pub first_payment_date: Option<NaiveDate>,
}

impl Default for LoanParameters {
    fn default() -> Self {
        Self {
            loan_type: LoanType::Annuity,
            principal: 100000.,
            payment_interval_months: 12,
            loan_term_months: 60,
            grace_period_months: 24,
            annual_interest_rate_percent: 10.,
            first_payment_date: None,
        }
    }
}

impl LoanParameters {
    pub fn new(
        loan_type: LoanType,
        principal: f64,
        payment_interval_months: u32,
        loan_term_months: u32,
        grace_period_months: u32,
        annual_interest_rate_percent: f64,
    ) -> Self {
        Self {
            loan_type,
            principal,
            payment_interval_months,
            loan_term_months,
            grace_period_months,
            annual_interest_rate_percent,
            first_payment_date: None,
        }
    }

    pub fn with_first_payment_date(mut self, date: NaiveDate) -> Self {
        self.first_payment_date = Some(date);
        self
    }

    pub fn periodic_rate(&self) -> f64 {
        self.annual_interest_rate_percent / 100.
    }

    /// Checks every parameter and returns the number of payments.
    pub fn validate(&self) -> LoanResult<u32> {
        if !self.principal.is_finite() || self.principal <= 0. {
            return Err(LoanError::invalid(
                "principal",
                format!("must be a positive amount, got {}", self.principal),
            ));
        }
        if !self.annual_interest_rate_percent.is_finite() || self.annual_interest_rate_percent < 0. {
            return Err(LoanError::invalid(
                "annual_interest_rate_percent",
                format!("must be zero or positive, got {}", self.annual_interest_rate_percent),
            ));
        }
        let periods = compute_period_count(self.payment_interval_months, self.loan_term_months)?;

        if self.loan_type == LoanType::Annuity {
            let growth = annuity_growth(self.periodic_rate(), periods);
            if growth > MAX_ANNUITY_GROWTH {
                return Err(LoanError::invalid(
                    "annual_interest_rate_percent",
                    format!(
                        "{}% over {} periods compounds to {:e}, above the annuity limit of {:e}",
                        self.annual_interest_rate_percent, periods, growth, MAX_ANNUITY_GROWTH
                    ),
                ));
            }
        }

        if let Some(first) = self.first_payment_date {
            // the last payment falls one full term after the first
            if first
                .checked_add_months(Months::new(self.loan_term_months))
                .is_none()
            {
                return Err(LoanError::invalid(
                    "first_payment_date",
                    format!("{} plus {} months is out of range", first, self.loan_term_months),
                ));
            }
        }
        Ok(periods)
    }
}

/// Number of payments for a term; the extra payment covers period zero.
pub fn compute_period_count(payment_interval_months: u32, loan_term_months: u32) -> LoanResult<u32> {
    if payment_interval_months == 0 {
        return Err(LoanError::invalid("payment_interval_months", "must be positive"));
    }
    if loan_term_months == 0 {
        return Err(LoanError::invalid("loan_term_months", "must be positive"));
    }
    if loan_term_months % payment_interval_months != 0 {
        return Err(LoanError::invalid(
            "loan_term_months",
            format!(
                "{} is not a multiple of the {} month payment interval",
                loan_term_months, payment_interval_months
            ),
        ));
    }
    match (loan_term_months / payment_interval_months).checked_add(1) {
        Some(periods) if periods <= MAX_PERIOD_COUNT => Ok(periods),
        _ => Err(LoanError::invalid(
            "loan_term_months",
            format!(
                "{} months at a {} month interval exceeds {} payments",
                loan_term_months, payment_interval_months, MAX_PERIOD_COUNT
            ),
        )),
    }
}

/// Base percentage after interest compounded annually over the grace period.
pub fn capitalize(base_pct: f64, periodic_rate: f64, grace_period_months: u32) -> f64 {
    if grace_period_months == 0 {
        return base_pct;
    }
    let payment_free_years = f64::from(grace_period_months) / 12.;
    base_pct * (1. + periodic_rate).powf(payment_free_years)
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PaymentRecord {
    pub period_index: u32,
    pub due_date: Option<NaiveDate>,
    pub interest_amount: f64,
    pub principal_amount: f64,
    /// rounded sum of the unrounded amounts, not the sum of the rounded ones
    pub total_payment: f64,
    pub interest_percentage: f64,
    pub principal_percentage: f64,
    pub total_percentage: f64,
}

impl PaymentRecord {
    fn new(period_index: u32, due_date: Option<NaiveDate>, principal: f64, share: &PeriodShare) -> Self {
        let interest_amount = principal * share.interest_pct / 100.;
        let principal_amount = principal * share.principal_pct / 100.;
        Self {
            period_index,
            due_date,
            interest_amount: round(interest_amount),
            principal_amount: round(principal_amount),
            total_payment: round(interest_amount + principal_amount),
            interest_percentage: round(share.interest_pct),
            principal_percentage: round(share.principal_pct),
            total_percentage: round(share.total_pct()),
        }
    }
}

impl fmt::Display for PaymentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "period {}", self.period_index)?;
        if let Some(date) = self.due_date {
            write!(f, ", date {}", date)?;
        }
        write!(
            f,
            ", payment {} ({}%), interest {} ({}%), principal {} ({}%)",
            self.total_payment,
            self.total_percentage,
            self.interest_amount,
            self.interest_percentage,
            self.principal_amount,
            self.principal_percentage
        )
    }
}

/// Payments of one loan in payment order.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AmortizationSchedule {
    records: Vec<PaymentRecord>,
}

impl AmortizationSchedule {
    pub fn records(&self) -> &[PaymentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaymentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record of a 1-based period index.
    pub fn get(&self, period_index: u32) -> Option<&PaymentRecord> {
        let idx = usize::try_from(period_index).ok()?.checked_sub(1)?;
        self.records.get(idx)
    }

    pub fn total_interest(&self) -> f64 {
        self.records.iter().map(|r| r.interest_amount).sum()
    }

    pub fn total_principal(&self) -> f64 {
        self.records.iter().map(|r| r.principal_amount).sum()
    }

    pub fn total_paid(&self) -> f64 {
        self.records.iter().map(|r| r.total_payment).sum()
    }
}

impl<'a> IntoIterator for &'a AmortizationSchedule {
    type Item = &'a PaymentRecord;
    type IntoIter = std::slice::Iter<'a, PaymentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Display for AmortizationSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}

// adding 0. turns a rounded -0 into 0
fn round(amt: f64) -> f64 {
    amt.round() + 0.
}

/// Computes the full payment schedule of a loan.
pub fn generate_schedule(params: &LoanParameters) -> LoanResult<AmortizationSchedule> {
    let periods = params.validate()?;
    let rate = params.periodic_rate();
    let base_pct = capitalize(100., rate, params.grace_period_months);
    debug!(
        "{} loan of {} over {} periods, capitalized base {}%",
        params.loan_type, params.principal, periods, base_pct
    );

    let amortizer = params.loan_type.amortizer(rate, periods);
    let mut state = AmortizationState::new(base_pct);
    let mut records = Vec::with_capacity(periods as usize);

    for k in 0..periods {
        let (share, next) = amortizer.next_share(k, state);
        state = next;

        // validate() has already checked the last date
        let due_date = params
            .first_payment_date
            .and_then(|first| first.checked_add_months(Months::new(k * params.payment_interval_months)));
        let record = PaymentRecord::new(k + 1, due_date, params.principal, &share);
        trace!("{}", record);
        records.push(record);
    }
    info!(
        "generated {} {} payments, {}% of the base left outstanding",
        records.len(),
        params.loan_type,
        state.remaining_pct
    );

    Ok(AmortizationSchedule { records })
}
