use amortize::chart;
use amortize::loan::*;
use chrono::NaiveDate;
use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::error::Error;

/// Prints the amortization schedule of a linear or annuity loan
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Repayment policy: linear or annuity
    #[arg(short = 't', long, default_value = "annuity")]
    loan_type: LoanType,

    /// Amount borrowed
    #[arg(short, long, default_value_t = 100000.)]
    principal: f64,

    /// Months between payments
    #[arg(short, long, default_value_t = 12)]
    interval: u32,

    /// Loan term in months, a multiple of the interval
    #[arg(long, default_value_t = 60)]
    term: u32,

    /// Payment-free months during which interest capitalizes
    #[arg(short, long, default_value_t = 24)]
    grace: u32,

    /// Annual interest rate in percent
    #[arg(short, long, default_value_t = 10.)]
    rate: f64,

    /// Due date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    first_payment: Option<NaiveDate>,

    /// Print chart rows instead of the payment table
    #[arg(long)]
    chart: bool,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    SimpleLogger::new().with_level(args.log_level).init()?;

    let mut params = LoanParameters::new(
        args.loan_type,
        args.principal,
        args.interval,
        args.term,
        args.grace,
        args.rate,
    );
    if let Some(date) = args.first_payment {
        params = params.with_first_payment_date(date);
    }

    let schedule = generate_schedule(&params)?;

    if args.chart {
        let labels: Vec<&str> = chart::columns().iter().map(|c| c.label).collect();
        println!("{}", labels.join(", "));
        for row in chart::rows(&schedule) {
            println!("{}, {}, {}", row.period_index, row.repayment, row.principal_share);
        }
    } else {
        print!("{}", schedule);
    }
    info!(
        "total paid {}, interest {}, principal {}",
        schedule.total_paid(),
        schedule.total_interest(),
        schedule.total_principal()
    );
    Ok(())
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<PaymentRecord>();
    is_normal::<AmortizationSchedule>();
    is_normal::<LoanParameters>();
}
