//! Chart projection of a schedule. No arithmetic beyond summing the two
//! rounded amounts of each record.

use crate::loan::AmortizationSchedule;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ChartColumn {
    pub label: &'static str,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: &'static str,
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChartRow {
    pub period_index: u32,
    pub repayment: f64,
    pub principal_share: f64,
}

pub fn columns() -> [ChartColumn; 3] {
    [
        ChartColumn {
            label: "Repayment",
            kind: "number",
        },
        ChartColumn {
            label: "Interest",
            kind: "number",
        },
        ChartColumn {
            label: "Principal Share",
            kind: "number",
        },
    ]
}

pub fn rows(schedule: &AmortizationSchedule) -> Vec<ChartRow> {
    schedule
        .iter()
        .map(|record| ChartRow {
            period_index: record.period_index,
            repayment: record.interest_amount + record.principal_amount,
            principal_share: record.principal_amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{columns, rows, ChartRow};
    use crate::loan::{generate_schedule, LoanParameters, LoanType};
    use test_log::test;

    #[test]
    fn test_columns() {
        let labels: Vec<&str> = columns().iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Repayment", "Interest", "Principal Share"]);
        assert!(columns().iter().all(|c| c.kind == "number"));
    }

    #[test]
    fn test_rows() {
        let params = LoanParameters::new(LoanType::Linear, 100000., 12, 60, 0, 10.);
        let schedule = generate_schedule(&params).unwrap();
        let rows = rows(&schedule);

        assert_eq!(rows.len(), schedule.len());
        assert_eq!(
            rows[0],
            ChartRow {
                period_index: 1,
                repayment: 26667.,
                principal_share: 16667.,
            }
        );
        // rounded amounts summed, not the rounded total
        assert_eq!(rows[2].repayment, 6667. + 16667.);
        assert_eq!(schedule.get(3).unwrap().total_payment, 23333.);
    }
}
