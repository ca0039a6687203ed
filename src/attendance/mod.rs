//! Attendance recap pipeline.
//!
//! raw punches -> [`pairing::pair`] -> [`classify::classify`] -> [`recap::aggregate`]
//!
//! Every stage is a pure function over borrowed input; nothing here touches
//! storage or the network.

pub mod classify;
pub mod pairing;
pub mod recap;
pub mod spreadsheet;
pub mod time;

use crate::model::attendance::{DayRecord, EmployeeRecap, RawPunch};
use classify::{Policy, classify};
use recap::RecapGrouping;

/// Day-level report, sorted by employee name then date.
pub fn build_report(rows: &[RawPunch], policy: &Policy) -> Vec<DayRecord> {
    let mut report: Vec<DayRecord> = pairing::pair(rows)
        .iter()
        .map(|day| classify(day, policy))
        .collect();

    report.sort_by(|a, b| {
        a.employee_name
            .cmp(&b.employee_name)
            .then_with(|| a.date.cmp(&b.date))
    });
    report
}

pub fn build_recap(rows: &[RawPunch], policy: &Policy, grouping: RecapGrouping) -> Vec<EmployeeRecap> {
    grouping.aggregate(&build_report(rows, policy))
}
