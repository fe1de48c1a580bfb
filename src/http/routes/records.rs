//! Case data endpoints - full history and latest-per-country snapshot

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{CaseRecord, CountrySnapshot, RecordRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Response envelope shared by both data endpoints. An empty result
/// serializes as `"DataList": []`, never `null`.
#[derive(Serialize)]
pub struct RecordSet<T> {
    #[serde(rename = "DataList")]
    pub data_list: Vec<T>,
}

/// Full history record as it appears on the wire.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CaseRecordResponse {
    #[serde(rename = "ID")]
    pub id: Uuid,
    pub country: String,
    pub cases: i64,
    pub cases_today: i64,
    pub deaths: i64,
    pub deaths_today: i64,
    pub recovered: i64,
    pub active: i64,
    pub critical: i64,
    pub cases_per_one_million: f64,
    pub deaths_per_one_million: f64,
    pub updated: String,
    pub time_ran: String,
}

impl From<CaseRecord> for CaseRecordResponse {
    fn from(r: CaseRecord) -> Self {
        Self {
            id: r.id,
            country: r.country,
            cases: r.cases,
            cases_today: r.cases_today,
            deaths: r.deaths,
            deaths_today: r.deaths_today,
            recovered: r.recovered,
            active: r.active,
            critical: r.critical,
            cases_per_one_million: r.cases_per_one_million,
            deaths_per_one_million: r.deaths_per_one_million,
            updated: r.updated.to_rfc3339(),
            time_ran: r.time_ran.to_rfc3339(),
        }
    }
}

/// Snapshot record as it appears on the wire. The snapshot query does not
/// select `id` or `time_ran`, so neither key appears here.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CountrySnapshotResponse {
    pub country: String,
    pub cases: i64,
    pub cases_today: i64,
    pub deaths: i64,
    pub deaths_today: i64,
    pub recovered: i64,
    pub active: i64,
    pub critical: i64,
    pub cases_per_one_million: f64,
    pub deaths_per_one_million: f64,
    pub updated: String,
}

impl From<CountrySnapshot> for CountrySnapshotResponse {
    fn from(r: CountrySnapshot) -> Self {
        Self {
            country: r.country,
            cases: r.cases,
            cases_today: r.cases_today,
            deaths: r.deaths,
            deaths_today: r.deaths_today,
            recovered: r.recovered,
            active: r.active,
            critical: r.critical,
            cases_per_one_million: r.cases_per_one_million,
            deaths_per_one_million: r.deaths_per_one_million,
            updated: r.updated.to_rfc3339(),
        }
    }
}

/// GET /corona - every record, ordered by ascending case count
async fn list_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecordSet<CaseRecordResponse>>, ApiError> {
    let rows = RecordRepo::new(&state.pool, state.query_timeout)
        .fetch_all()
        .await?;
    tracing::debug!(rows = rows.len(), "endpoint hit: full history");

    Ok(Json(RecordSet {
        data_list: rows.into_iter().map(CaseRecordResponse::from).collect(),
    }))
}

/// GET /new - the most recent record for each country
async fn list_latest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecordSet<CountrySnapshotResponse>>, ApiError> {
    let rows = RecordRepo::new(&state.pool, state.query_timeout)
        .fetch_latest_per_country()
        .await?;
    tracing::debug!(rows = rows.len(), "endpoint hit: latest per country");

    Ok(Json(RecordSet {
        data_list: rows
            .into_iter()
            .map(CountrySnapshotResponse::from)
            .collect(),
    }))
}

/// Record routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/corona", get(list_all))
        .route("/new", get(list_latest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_record() -> CaseRecord {
        CaseRecord {
            id: Uuid::nil(),
            country: "Iceland".to_string(),
            cases: 1801,
            cases_today: 5,
            deaths: 10,
            deaths_today: 0,
            recovered: 1773,
            active: 18,
            critical: 1,
            cases_per_one_million: 5276.25,
            deaths_per_one_million: 29.3,
            updated: Utc.with_ymd_and_hms(2020, 5, 1, 12, 0, 0).unwrap(),
            time_ran: Utc.with_ymd_and_hms(2020, 5, 1, 12, 5, 0).unwrap(),
        }
    }

    #[test]
    fn full_record_uses_wire_field_names() {
        let response = CaseRecordResponse::from(sample_record());
        let value = serde_json::to_value(&response).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();

        for expected in [
            "ID",
            "Country",
            "Cases",
            "CasesToday",
            "Deaths",
            "DeathsToday",
            "Recovered",
            "Active",
            "Critical",
            "CasesPerOneMillion",
            "DeathsPerOneMillion",
            "Updated",
            "TimeRan",
        ] {
            assert!(keys.contains(&expected), "missing key {expected}");
        }
        assert_eq!(keys.len(), 13);
    }

    #[test]
    fn snapshot_omits_id_and_time_ran() {
        let full = sample_record();
        let snapshot = CountrySnapshot {
            country: full.country,
            cases: full.cases,
            cases_today: full.cases_today,
            deaths: full.deaths,
            deaths_today: full.deaths_today,
            recovered: full.recovered,
            active: full.active,
            critical: full.critical,
            cases_per_one_million: full.cases_per_one_million,
            deaths_per_one_million: full.deaths_per_one_million,
            updated: full.updated,
        };

        let value = serde_json::to_value(CountrySnapshotResponse::from(snapshot)).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("ID"));
        assert!(!object.contains_key("TimeRan"));
        assert_eq!(object.len(), 11);
    }

    #[test]
    fn empty_record_set_serializes_as_empty_array() {
        let empty: RecordSet<CaseRecordResponse> = RecordSet { data_list: vec![] };
        let json = serde_json::to_string(&empty).unwrap();
        assert_eq!(json, r#"{"DataList":[]}"#);
    }

    #[test]
    fn float_fields_round_trip_through_json() {
        let response = CaseRecordResponse::from(sample_record());
        let json = serde_json::to_string(&response).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["CasesPerOneMillion"].as_f64(), Some(5276.25));
        assert_eq!(value["DeathsPerOneMillion"].as_f64(), Some(29.3));
        assert_eq!(value["Updated"].as_str(), Some("2020-05-01T12:00:00+00:00"));
    }
}
