use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// One physical clock event as exported by the fingerprint terminal.
///
/// Every field is kept as text; `time` in particular can arrive in several
/// encodings and is only interpreted by the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "cloud_id": "C2630450C3071B24",
    "id": "E1",
    "name": "Alice",
    "date": "2024-01-10",
    "time": "08:15",
    "verification": "Sidik Jari",
    "type": "Absensi Masuk",
    "position": "Staff",
    "location": "Kantor Pusat"
}))]
pub struct RawPunch {
    #[serde(default, alias = "Cloud ID")]
    pub cloud_id: String,

    #[serde(default, rename = "id", alias = "ID")]
    pub employee_id: String,

    #[serde(default, rename = "name", alias = "nama", alias = "Nama")]
    pub employee_name: String,

    #[serde(default, alias = "tanggal_absensi", alias = "Tanggal Absensi")]
    #[sqlx(rename = "punch_date")]
    pub date: String,

    #[serde(default, alias = "jam_absensi", alias = "Jam Absensi")]
    #[sqlx(rename = "punch_time")]
    pub time: String,

    #[serde(default, alias = "verifikasi", alias = "Verifikasi")]
    pub verification: String,

    #[serde(
        default,
        rename = "type",
        alias = "punchTypeLabel",
        alias = "punch_type_label",
        alias = "tipe_absensi",
        alias = "Tipe Absensi"
    )]
    pub punch_type_label: String,

    #[serde(default, alias = "jabatan", alias = "Jabatan")]
    pub position: String,

    #[serde(default, alias = "kantor", alias = "Kantor")]
    pub location: String,
}

impl RawPunch {
    /// `None` for any label that is neither a check-in nor a check-out.
    pub fn punch_type(&self) -> Option<PunchType> {
        self.punch_type_label.trim().parse().ok()
    }

    /// A row without an employee id or a date cannot be paired with anything.
    pub fn is_identified(&self) -> bool {
        !self.employee_id.trim().is_empty() && !self.date.trim().is_empty()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumString, Display)]
pub enum PunchType {
    #[strum(to_string = "Absensi Masuk", serialize = "Check In")]
    CheckIn,
    #[strum(to_string = "Absensi Pulang", serialize = "Check Out")]
    CheckOut,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckInLabel {
    #[strum(serialize = "Tepat Waktu")]
    OnTime,
    #[strum(serialize = "Terlambat")]
    Late,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutLabel {
    #[strum(serialize = "Tepat Waktu")]
    OnTime,
    #[strum(serialize = "Overtime")]
    Overtime,
}

/// One row per employee per calendar date, after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DayRecord {
    #[schema(example = "E1")]
    pub employee_id: String,
    #[schema(example = "Alice")]
    pub employee_name: String,
    #[schema(example = "Staff")]
    pub position: String,
    #[schema(example = "2024-01-10")]
    pub date: String,

    #[schema(example = 480)]
    pub check_in_target_minutes: u32,
    /// Empty when the employee never checked in that day
    #[schema(example = "08:15")]
    pub check_in_actual_time: String,
    #[schema(example = 15)]
    pub late_minutes: u32,
    /// Blank when there is no check-in punch
    pub check_in_label: Option<CheckInLabel>,

    #[schema(example = 1020)]
    pub check_out_target_minutes: u32,
    #[schema(example = "17:30")]
    pub check_out_actual_time: String,
    #[schema(example = 30)]
    pub overtime_minutes: u32,
    pub check_out_label: CheckOutLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_name": "Alice",
    "present_day_count": 1,
    "late_event_count": 1,
    "total_late_minutes": 15,
    "average_late_minutes": 15,
    "overtime_event_count": 1,
    "total_overtime_minutes": 30,
    "average_overtime_minutes": 30
}))]
pub struct EmployeeRecap {
    pub employee_name: String,
    pub present_day_count: u32,
    pub late_event_count: u32,
    pub total_late_minutes: u64,
    pub average_late_minutes: u64,
    pub overtime_event_count: u32,
    pub total_overtime_minutes: u64,
    pub average_overtime_minutes: u64,
}
