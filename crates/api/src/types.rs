//! API request and response types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Time format of `since` / `until`
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Success envelope: `{"error": null, "result": ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub error: Option<&'static str>,
    pub result: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            error: None,
            result,
        }
    }
}

/// Parameters shared by both query endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowParams {
    pub sim_no: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
}

/// Validated device window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub device_id: String,
    pub since: i64,
    pub until: i64,
}

impl WindowParams {
    pub fn resolve(&self) -> Result<Window> {
        let device_id = required(&self.sim_no, "simNo")?.to_string();
        let since = parse_time(required(&self.since, "since")?, "since")?;
        let until = parse_time(required(&self.until, "until")?, "until")?;
        if since > until {
            return Err(ApiError::InvalidTimeRange(format!(
                "since {} is after until {}",
                self.since.as_deref().unwrap_or_default(),
                self.until.as_deref().unwrap_or_default()
            )));
        }
        Ok(Window {
            device_id,
            since,
            until,
        })
    }
}

/// `GET /api/query` parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParams {
    #[serde(flatten)]
    pub window: WindowParams,
    pub msg_ids: Option<String>,
    pub msg_xfer: Option<String>,
}

/// `GET /api/query/body` parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyParams {
    #[serde(flatten)]
    pub window: WindowParams,
    pub msg_id: Option<String>,
    pub ds: Option<String>,
    pub ext_ids: Option<String>,
}

impl BodyParams {
    pub fn message_id(&self) -> Result<u16> {
        let value = required(&self.msg_id, "msgId")?;
        value
            .trim()
            .parse()
            .map_err(|_| ApiError::invalid("msgId", format!("'{value}' is not a message id")))
    }

    /// Empty means every data source
    pub fn data_source(&self) -> Result<Option<u8>> {
        match self.ds.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ApiError::invalid("ds", format!("'{value}' is not in 0-255"))),
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingParameter(name)),
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS` as UTC epoch seconds
pub fn parse_time(value: &str, name: &'static str) -> Result<i64> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .map(|t| t.and_utc().timestamp())
        .map_err(|e| ApiError::invalid(name, format!("'{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(sim: &str, since: &str, until: &str) -> WindowParams {
        WindowParams {
            sim_no: Some(sim.into()),
            since: Some(since.into()),
            until: Some(until.into()),
        }
    }

    #[test]
    fn test_resolve_window() {
        let w = window("40261394651", "2022-09-30 23:39:28", "2022-09-30 23:40:00")
            .resolve()
            .unwrap();
        assert_eq!(w.device_id, "40261394651");
        assert_eq!(w.since, 1_664_581_168);
        assert_eq!(w.until, 1_664_581_200);
    }

    #[test]
    fn test_resolve_errors() {
        let err = WindowParams::default().resolve().unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter("simNo")));

        let err = window("1", "yesterday", "2022-09-30 23:40:00")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter { name: "since", .. }));

        let err = window("1", "2022-09-30 23:40:00", "2022-09-30 23:39:00")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTimeRange(_)));
    }

    #[test]
    fn test_body_params() {
        let params = BodyParams {
            msg_id: Some("512".into()),
            ds: Some("".into()),
            ..Default::default()
        };
        assert_eq!(params.message_id().unwrap(), 0x0200);
        assert_eq!(params.data_source().unwrap(), None);

        let params = BodyParams {
            ds: Some("300".into()),
            ..Default::default()
        };
        assert!(matches!(
            params.message_id(),
            Err(ApiError::MissingParameter("msgId"))
        ));
        assert!(params.data_source().is_err());
    }
}
