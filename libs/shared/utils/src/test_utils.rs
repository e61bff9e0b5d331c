use chrono::{NaiveDate, NaiveTime, Duration};
use serde_json::{json, Value};

use shared_config::AppConfig;

pub struct TestConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub default_duration_minutes: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            api_token: Some("test-access-token".to_string()),
            default_duration_minutes: 30,
        }
    }
}

impl TestConfig {
    /// Points the config at a mock server, e.g. `wiremock::MockServer::uri()`.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn anonymous(mut self) -> Self {
        self.api_token = None;
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.api_base_url.clone(),
            api_token: self.api_token.clone(),
            request_timeout_secs: 5,
            default_duration_minutes: self.default_duration_minutes,
        }
    }
}

/// Doctor as serialized by `GET /doctors/`.
pub fn doctor_json(id: i64, first_name: &str, last_name: &str, specialization: &str) -> Value {
    json!({
        "id": id,
        "user": {
            "id": id + 100,
            "username": format!("{}.{}", first_name, last_name).to_lowercase(),
            "first_name": first_name,
            "last_name": last_name,
            "role": "DOCTOR"
        },
        "specialization": specialization,
        "department": 1,
        "contact_info": "ext. 2040",
        "schedule": {}
    })
}

/// One availability slot starting at `hh:mm` on `date`, lasting `duration_minutes`.
pub fn slot_json(date: NaiveDate, hh: u32, mm: u32, duration_minutes: i64) -> Value {
    let start = date.and_time(NaiveTime::from_hms_opt(hh, mm, 0).unwrap_or_default());
    let end = start + Duration::minutes(duration_minutes);
    json!({
        "start_time": start.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        "end_time": end.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        "formatted_time": start.format("%Y-%m-%d %I:%M %p").to_string()
    })
}

/// Availability response body with 30 minute slots at the given times.
pub fn availability_json(date: NaiveDate, times: &[(u32, u32)]) -> Value {
    let slots: Vec<Value> = times
        .iter()
        .map(|(hh, mm)| slot_json(date, *hh, *mm, 30))
        .collect();
    json!({ "slots": slots })
}

/// Body returned by `POST /appointments/` on success.
pub fn created_appointment_json(id: i64, doctor: i64, appointment_time: &str, reason: &str) -> Value {
    json!({
        "id": id,
        "doctor": doctor,
        "appointment_time": appointment_time,
        "reason": reason,
        "duration": 30
    })
}
