//! CSV import of terminal exports and CSV export of the report and recap.
//! Column headers match the spreadsheets HR already works with.

use derive_more::{Display, From};
use serde::Serialize;

use super::time::format_minutes;
use crate::model::attendance::{DayRecord, EmployeeRecap, RawPunch};

pub const REPORT_HEADERS: [&str; 12] = [
    "ID",
    "Nama",
    "Jabatan",
    "Tanggal Absensi",
    "Jam Masuk (Target)",
    "Jam Masuk (Actual)",
    "Keterlambatan (menit)",
    "Keterangan Masuk",
    "Jam Pulang (Target)",
    "Jam Pulang (Actual)",
    "Overtime (menit)",
    "Keterangan Pulang",
];

pub const RECAP_HEADERS: [&str; 8] = [
    "Nama Karyawan",
    "Jumlah Hadir",
    "Jumlah Keterlambatan",
    "Total Keterlambatan (Menit)",
    "Rata-rata Keterlambatan",
    "Jumlah Overtime",
    "Total Overtime (Menit)",
    "Rata-rata Overtime",
];

#[derive(Debug, Display, From)]
pub enum CsvError {
    #[display(fmt = "malformed attendance CSV: {}", _0)]
    Csv(csv::Error),
    #[display(fmt = "failed to flush CSV output: {}", _0)]
    Io(std::io::Error),
    #[from(ignore)]
    #[display(fmt = "no attendance rows found")]
    Empty,
}

impl std::error::Error for CsvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CsvError::Csv(e) => Some(e),
            CsvError::Io(e) => Some(e),
            CsvError::Empty => None,
        }
    }
}

/// Reads a terminal/spreadsheet export. Headers are matched by name, so
/// column order does not matter and absent columns become empty strings.
pub fn read_punches(input: &[u8]) -> Result<Vec<RawPunch>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let punches = reader
        .deserialize::<RawPunch>()
        .collect::<Result<Vec<_>, _>>()?;

    if punches.is_empty() {
        return Err(CsvError::Empty);
    }
    Ok(punches)
}

#[derive(Serialize)]
struct ReportRow<'a> {
    id: &'a str,
    name: &'a str,
    position: &'a str,
    date: &'a str,
    check_in_target: String,
    check_in_actual: &'a str,
    late_minutes: u32,
    check_in_label: String,
    check_out_target: String,
    check_out_actual: &'a str,
    overtime_minutes: u32,
    check_out_label: String,
}

impl<'a> From<&'a DayRecord> for ReportRow<'a> {
    fn from(r: &'a DayRecord) -> Self {
        Self {
            id: &r.employee_id,
            name: &r.employee_name,
            position: &r.position,
            date: &r.date,
            check_in_target: format_minutes(r.check_in_target_minutes),
            check_in_actual: &r.check_in_actual_time,
            late_minutes: r.late_minutes,
            check_in_label: r
                .check_in_label
                .map(|label| label.to_string())
                .unwrap_or_default(),
            check_out_target: format_minutes(r.check_out_target_minutes),
            check_out_actual: &r.check_out_actual_time,
            overtime_minutes: r.overtime_minutes,
            check_out_label: r.check_out_label.to_string(),
        }
    }
}

pub fn write_report(records: &[DayRecord]) -> Result<Vec<u8>, CsvError> {
    write_rows(&REPORT_HEADERS, records.iter().map(ReportRow::from))
}

pub fn write_recap(recap: &[EmployeeRecap]) -> Result<Vec<u8>, CsvError> {
    write_rows(&RECAP_HEADERS, recap.iter())
}

fn write_rows<T: Serialize>(
    headers: &[&str],
    rows: impl Iterator<Item = T>,
) -> Result<Vec<u8>, CsvError> {
    // Headers are written by hand so an empty export still has them.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer.into_inner().map_err(|e| CsvError::Io(e.into_error()))
}

/// `attendance_report_2024-01-31.csv` style download name.
pub fn export_file_name(kind: &str, today: chrono::NaiveDate) -> String {
    format!("attendance_{}_{}.csv", kind, today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{CheckInLabel, CheckOutLabel, PunchType};

    const TERMINAL_EXPORT: &str = "\
Cloud ID,ID,Nama,Tanggal Absensi,Jam Absensi,Verifikasi,Tipe Absensi,Jabatan,Kantor
C2630450C3071B24,1001,Alice,2024-01-10,08:15,Sidik Jari,Absensi Masuk,Staff,Kantor Pusat
C2630450C3071B24,1001,Alice,2024-01-10,0.7291666667,Sidik Jari,Absensi Pulang,Staff,Kantor Pusat
";

    fn day_record() -> DayRecord {
        DayRecord {
            employee_id: "1001".to_string(),
            employee_name: "Alice".to_string(),
            position: "Staff".to_string(),
            date: "2024-01-10".to_string(),
            check_in_target_minutes: 480,
            check_in_actual_time: "08:15".to_string(),
            late_minutes: 15,
            check_in_label: Some(CheckInLabel::Late),
            check_out_target_minutes: 1020,
            check_out_actual_time: String::new(),
            overtime_minutes: 0,
            check_out_label: CheckOutLabel::OnTime,
        }
    }

    #[test]
    fn test_read_terminal_export() {
        let punches = read_punches(TERMINAL_EXPORT.as_bytes()).unwrap();

        assert_eq!(punches.len(), 2);
        assert_eq!(punches[0].employee_id, "1001");
        assert_eq!(punches[0].employee_name, "Alice");
        assert_eq!(punches[0].location, "Kantor Pusat");
        assert_eq!(punches[0].punch_type(), Some(PunchType::CheckIn));
        assert_eq!(punches[1].time, "0.7291666667");
        assert_eq!(punches[1].punch_type(), Some(PunchType::CheckOut));
    }

    #[test]
    fn test_read_tolerates_missing_columns_and_reordering() {
        let input = "Tipe Absensi,Nama,ID,Tanggal Absensi,Jam Absensi\n\
                     Absensi Masuk,Bob,1002,2024-01-10,07:59\n";

        let punches = read_punches(input.as_bytes()).unwrap();

        assert_eq!(punches[0].employee_name, "Bob");
        assert_eq!(punches[0].time, "07:59");
        assert_eq!(punches[0].cloud_id, "");
        assert_eq!(punches[0].position, "");
    }

    #[test]
    fn test_read_header_only_is_empty() {
        let err = read_punches(b"ID,Nama,Tanggal Absensi\n").unwrap_err();
        assert!(matches!(err, CsvError::Empty));
        assert_eq!(err.to_string(), "no attendance rows found");
    }

    #[test]
    fn test_write_report() {
        let bytes = write_report(&[day_record()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), REPORT_HEADERS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "1001,Alice,Staff,2024-01-10,08:00,08:15,15,Terlambat,17:00,,0,Tepat Waktu"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_report_blank_check_in_label() {
        let mut record = day_record();
        record.check_in_actual_time = String::new();
        record.late_minutes = 0;
        record.check_in_label = None;

        let text = String::from_utf8(write_report(&[record]).unwrap()).unwrap();

        assert!(text.lines().nth(1).unwrap().contains(",08:00,,0,,17:00,"));
    }

    #[test]
    fn test_write_recap() {
        let recap = EmployeeRecap {
            employee_name: "Alice".to_string(),
            present_day_count: 3,
            late_event_count: 1,
            total_late_minutes: 15,
            average_late_minutes: 15,
            overtime_event_count: 2,
            total_overtime_minutes: 45,
            average_overtime_minutes: 23,
        };

        let text = String::from_utf8(write_recap(&[recap]).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], RECAP_HEADERS.join(","));
        assert_eq!(lines[1], "Alice,3,1,15,15,2,45,23");
    }

    #[test]
    fn test_empty_export_keeps_headers() {
        let text = String::from_utf8(write_recap(&[]).unwrap()).unwrap();
        assert_eq!(text.trim_end(), RECAP_HEADERS.join(","));
    }

    #[test]
    fn test_export_file_name() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(export_file_name("recap", day), "attendance_recap_2024-01-31.csv");
    }
}
