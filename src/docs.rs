use crate::api::attendance::RecapResponse;
use crate::attendance::classify::Policy;
use crate::attendance::recap::{RecapGrouping, RecapQuery, RecapTotals};
use crate::model::attendance::{CheckInLabel, CheckOutLabel, DayRecord, EmployeeRecap, RawPunch};
use crate::config::DEFAULT_API_PREFIX;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Attendance API",
        version = "0.1.0",
        description = r#"
## Attendance recap

Imports raw clock-in/clock-out punches from the fingerprint terminal and turns
them into the HR attendance report.

### 🔹 Pipeline
- **Pairing**: one row per employee per day; the first check-in and the first
  check-out of the day are used
- **Classification**: lateness against the check-in target (08:00 by default)
  and overtime against the check-out target (17:00 by default)
- **Recap**: days present, late/overtime counts, totals and rounded averages per
  employee

### ⏱️ Punch times
`"17:00"`, `"17.00"` and spreadsheet serial fractions such as `"0.7083333333"`
are all read as 17:00. Values that cannot be read count as 00:00.

### 📦 Exports
Report and recap are available as CSV downloads with the spreadsheet headers
HR already uses.
"#,
    ),
    paths(
        crate::api::attendance::list_punches,
        crate::api::attendance::import_punches,
        crate::api::attendance::import_csv,
        crate::api::attendance::report,
        crate::api::attendance::export_report,
        crate::api::attendance::recap,
        crate::api::attendance::export_recap
    ),
    components(
        schemas(
            RawPunch,
            DayRecord,
            CheckInLabel,
            CheckOutLabel,
            EmployeeRecap,
            RecapGrouping,
            RecapQuery,
            RecapTotals,
            RecapResponse,
            Policy
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance import, report and recap APIs"),
    )
)]
pub struct ApiDoc;

/// `ApiDoc` with its paths moved under the configured API prefix.
pub fn openapi(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if api_prefix == DEFAULT_API_PREFIX {
        return doc;
    }

    doc.paths.paths = std::mem::take(&mut doc.paths.paths)
        .into_iter()
        .map(|(path, item)| match path.strip_prefix(DEFAULT_API_PREFIX) {
            Some(rest) => (format!("{api_prefix}{rest}"), item),
            None => (path, item),
        })
        .collect();
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prefix_keeps_annotated_paths() {
        let doc = openapi("/api");
        assert!(doc.paths.paths.contains_key("/api/attendance/report"));
        assert_eq!(doc.paths.paths.len(), 7);
    }

    #[test]
    fn custom_prefix_rewrites_every_path() {
        let doc = openapi("/hr/v2");

        assert!(doc.paths.paths.contains_key("/hr/v2/attendance"));
        assert!(doc.paths.paths.contains_key("/hr/v2/attendance/import/csv"));
        assert!(doc.paths.paths.contains_key("/hr/v2/attendance/recap/export"));
        assert!(doc.paths.paths.keys().all(|path| path.starts_with("/hr/v2/")));
    }
}
