use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::model::attendance::{DayRecord, EmployeeRecap};

/// Decides which day records roll up into the same recap row.
pub trait RecapKey {
    fn key<'a>(&self, day: &'a DayRecord) -> &'a str;
}

/// Default grouping. Two employees sharing a display name end up in one row.
#[derive(Debug, Copy, Clone, Default)]
pub struct ByEmployeeName;

impl RecapKey for ByEmployeeName {
    fn key<'a>(&self, day: &'a DayRecord) -> &'a str {
        &day.employee_name
    }
}

/// Groups by employee id; the row is labelled with the first name seen for the id.
#[derive(Debug, Copy, Clone, Default)]
pub struct ByEmployeeId;

impl RecapKey for ByEmployeeId {
    fn key<'a>(&self, day: &'a DayRecord) -> &'a str {
        &day.employee_id
    }
}

/// Grouping selected by API callers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecapGrouping {
    #[default]
    Name,
    Id,
}

impl RecapGrouping {
    pub fn aggregate(self, days: &[DayRecord]) -> Vec<EmployeeRecap> {
        match self {
            RecapGrouping::Name => aggregate(days),
            RecapGrouping::Id => aggregate_by(days, &ByEmployeeId),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RecapQuery {
    /// Group recap rows by employee `name` (default) or `id`
    #[schema(example = "name")]
    pub group_by: Option<RecapGrouping>,
}

#[derive(Debug)]
struct Tally<'a> {
    name: &'a str,
    dates: BTreeSet<&'a str>,
    late_events: u32,
    late_total: u64,
    overtime_events: u32,
    overtime_total: u64,
}

impl<'a> Tally<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            name,
            dates: BTreeSet::new(),
            late_events: 0,
            late_total: 0,
            overtime_events: 0,
            overtime_total: 0,
        }
    }

    fn add(&mut self, day: &'a DayRecord) {
        self.dates.insert(&day.date);
        if day.late_minutes > 0 {
            self.late_events += 1;
            self.late_total += u64::from(day.late_minutes);
        }
        if day.overtime_minutes > 0 {
            self.overtime_events += 1;
            self.overtime_total += u64::from(day.overtime_minutes);
        }
    }

    fn into_recap(self) -> EmployeeRecap {
        EmployeeRecap {
            employee_name: self.name.to_string(),
            present_day_count: self.dates.len() as u32,
            late_event_count: self.late_events,
            total_late_minutes: self.late_total,
            average_late_minutes: rounded_average(self.late_total, u64::from(self.late_events)),
            overtime_event_count: self.overtime_events,
            total_overtime_minutes: self.overtime_total,
            average_overtime_minutes: rounded_average(
                self.overtime_total,
                u64::from(self.overtime_events),
            ),
        }
    }
}

/// Integer mean rounded half up; zero when there is nothing to average.
pub fn rounded_average(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (total + count / 2) / count
}

/// Recap grouped by employee name.
pub fn aggregate(days: &[DayRecord]) -> Vec<EmployeeRecap> {
    aggregate_by(days, &ByEmployeeName)
}

pub fn aggregate_by<K: RecapKey + ?Sized>(days: &[DayRecord], grouping: &K) -> Vec<EmployeeRecap> {
    let mut tallies: BTreeMap<&str, Tally<'_>> = BTreeMap::new();

    for day in days {
        tallies
            .entry(grouping.key(day))
            .or_insert_with(|| Tally::new(&day.employee_name))
            .add(day);
    }

    let mut recap: Vec<EmployeeRecap> = tallies.into_values().map(Tally::into_recap).collect();
    recap.sort_by(|a, b| a.employee_name.cmp(&b.employee_name));

    debug!(days = days.len(), employees = recap.len(), "aggregated attendance recap");
    recap
}

/// Figures shown above the recap table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecapTotals {
    pub employees: u64,
    pub present_days: u64,
    pub late_events: u64,
    pub overtime_events: u64,
    /// Mean of the per-employee average lateness
    pub average_late_minutes: u64,
    /// Mean of the per-employee average overtime
    pub average_overtime_minutes: u64,
}

impl RecapTotals {
    pub fn from_recap(recap: &[EmployeeRecap]) -> Self {
        let employees = recap.len() as u64;
        let sum = |f: fn(&EmployeeRecap) -> u64| recap.iter().map(f).sum::<u64>();

        Self {
            employees,
            present_days: sum(|r| u64::from(r.present_day_count)),
            late_events: sum(|r| u64::from(r.late_event_count)),
            overtime_events: sum(|r| u64::from(r.overtime_event_count)),
            average_late_minutes: rounded_average(sum(|r| r.average_late_minutes), employees),
            average_overtime_minutes: rounded_average(
                sum(|r| r.average_overtime_minutes),
                employees,
            ),
        }
    }
}
