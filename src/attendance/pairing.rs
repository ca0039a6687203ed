use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::model::attendance::{PunchType, RawPunch};

/// Employee-day with its check-in/check-out punches reconciled, before
/// lateness and overtime are worked out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairedDay {
    pub employee_id: String,
    pub employee_name: String,
    pub position: String,
    pub date: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

/// Grouping identity. The name is part of the key, so the same id spelled
/// with two different names forms two groups.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct EmployeeKey<'a> {
    id: &'a str,
    name: &'a str,
}

#[derive(Debug)]
struct DaySlots<'a> {
    position: &'a str,
    check_in: Option<&'a str>,
    check_out: Option<&'a str>,
}

impl DaySlots<'_> {
    fn is_empty(&self) -> bool {
        self.check_in.is_none() && self.check_out.is_none()
    }
}

/// Collapses raw punches into one entry per (employee id, date).
///
/// The first check-in and first check-out seen for a day win; later
/// duplicates are dropped. Rows whose label is neither are ignored, and a
/// day left without any slot is not emitted. Output follows the order in
/// which each employee-day first appears.
pub fn pair(rows: &[RawPunch]) -> Vec<PairedDay> {
    let mut grouped: BTreeMap<EmployeeKey<'_>, BTreeMap<&str, DaySlots<'_>>> = BTreeMap::new();

    for row in rows {
        let key = EmployeeKey {
            id: &row.employee_id,
            name: &row.employee_name,
        };
        let day = grouped
            .entry(key)
            .or_default()
            .entry(row.date.as_str())
            .or_insert_with(|| DaySlots {
                position: &row.position,
                check_in: None,
                check_out: None,
            });

        match row.punch_type() {
            Some(PunchType::CheckIn) => {
                day.check_in.get_or_insert(row.time.as_str());
            }
            Some(PunchType::CheckOut) => {
                day.check_out.get_or_insert(row.time.as_str());
            }
            None => {}
        }
    }

    // (employee id, date) pairs already emitted
    let mut emitted: BTreeSet<(&str, &str)> = BTreeSet::new();
    let mut days = Vec::new();

    for row in rows {
        let key = EmployeeKey {
            id: &row.employee_id,
            name: &row.employee_name,
        };
        let Some(slots) = grouped.get(&key).and_then(|dates| dates.get(row.date.as_str())) else {
            continue;
        };
        if slots.is_empty() || !emitted.insert((key.id, row.date.as_str())) {
            continue;
        }

        days.push(PairedDay {
            employee_id: row.employee_id.clone(),
            employee_name: row.employee_name.clone(),
            position: slots.position.to_string(),
            date: row.date.clone(),
            check_in: slots.check_in.map(str::to_string),
            check_out: slots.check_out.map(str::to_string),
        });
    }

    debug!(rows = rows.len(), days = days.len(), "paired attendance punches");
    days
}
