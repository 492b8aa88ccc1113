pub mod amortizer;
pub mod chart;
pub mod error;
pub mod loan;

pub use error::{LoanError, LoanResult};
pub use loan::{generate_schedule, AmortizationSchedule, LoanParameters, LoanType, PaymentRecord};
