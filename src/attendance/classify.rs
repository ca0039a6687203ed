use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::pairing::PairedDay;
use super::time::parse_time_to_minutes;
use crate::model::attendance::{CheckInLabel, CheckOutLabel, DayRecord};

pub const DEFAULT_CHECK_IN_TARGET: u32 = 8 * 60;
pub const DEFAULT_CHECK_OUT_TARGET: u32 = 17 * 60;

/// Working-hours policy, in minutes since midnight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Policy {
    #[schema(example = 480)]
    pub check_in_target: u32,
    #[schema(example = 1020)]
    pub check_out_target: u32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            check_in_target: DEFAULT_CHECK_IN_TARGET,
            check_out_target: DEFAULT_CHECK_OUT_TARGET,
        }
    }
}

pub fn classify(day: &PairedDay, policy: &Policy) -> DayRecord {
    // No check-in leaves the label blank.
    let (check_in_actual_time, late_minutes, check_in_label) = match &day.check_in {
        Some(actual) => {
            let late = parse_time_to_minutes(actual).saturating_sub(policy.check_in_target);
            let label = if late > 0 {
                CheckInLabel::Late
            } else {
                CheckInLabel::OnTime
            };
            (actual.clone(), late, Some(label))
        }
        None => (String::new(), 0, None),
    };

    // No check-out still counts as on time, unlike the check-in side.
    // Kept as-is until the attendance owners decide which default is right.
    let (check_out_actual_time, overtime_minutes, check_out_label) = match &day.check_out {
        Some(actual) => {
            let overtime = parse_time_to_minutes(actual).saturating_sub(policy.check_out_target);
            let label = if overtime > 0 {
                CheckOutLabel::Overtime
            } else {
                CheckOutLabel::OnTime
            };
            (actual.clone(), overtime, label)
        }
        None => (String::new(), 0, CheckOutLabel::OnTime),
    };

    DayRecord {
        employee_id: day.employee_id.clone(),
        employee_name: day.employee_name.clone(),
        position: day.position.clone(),
        date: day.date.clone(),
        check_in_target_minutes: policy.check_in_target,
        check_in_actual_time,
        late_minutes,
        check_in_label,
        check_out_target_minutes: policy.check_out_target,
        check_out_actual_time,
        overtime_minutes,
        check_out_label,
    }
}
