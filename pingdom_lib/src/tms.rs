//! Transaction (TMS) checks (`/tms/check`).
//!
//! A TMS check replays a scripted browser session step by step. Unlike the
//! other resources, single-check responses are not wrapped in an envelope.

use crate::error::Error;
use crate::request::{MultiParams, PingdomResponse, Requester};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One step of a transaction script, e.g. `go_to` with `{"url": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmsStep {
    #[serde(rename = "fn")]
    pub function: String,
    #[serde(default)]
    pub args: BTreeMap<String, String>,
}

impl TmsStep {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmsMetadata {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub disable_websecurity: bool,
}

/// Payload for creating or updating a TMS check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmsCheck {
    pub name: String,
    pub steps: Vec<TmsStep>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integration_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_message: String,
    /// Minutes between runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TmsMetadata>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_notification_when_down: Option<u32>,
    /// `high` or `low`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub severity_level: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl TmsCheck {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::validation("name", "must contain non-empty string"));
        }
        if self.steps.is_empty() {
            return Err(Error::validation("steps", "at least one step is required"));
        }
        if let Some(step) = self.steps.iter().find(|s| s.function.is_empty()) {
            return Err(Error::validation(
                "steps",
                format!("step with args {:?} has no function", step.args),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmsCheckResponse {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "type")]
    pub check_type: String,
    #[serde(default)]
    pub interval: u32,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub modified_at: i64,
    #[serde(default)]
    pub last_downtime_start: i64,
    #[serde(default)]
    pub last_downtime_end: i64,
    #[serde(default)]
    pub custom_message: String,
    #[serde(default)]
    pub send_notification_when_down: u32,
    #[serde(default)]
    pub severity_level: String,
    #[serde(default)]
    pub steps: Vec<TmsStep>,
    #[serde(default)]
    pub contact_ids: Vec<i64>,
    #[serde(default)]
    pub team_ids: Vec<i64>,
    #[serde(default)]
    pub integration_ids: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<TmsMetadata>,
}

/// Filters for [`TmsCheckService::list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListTmsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub extended_tags: bool,
    /// `script` or `recording`.
    pub check_type: Option<String>,
    /// Sent as one `tags` entry per tag.
    pub tags: Vec<String>,
}

impl ListTmsQuery {
    pub fn params(&self) -> MultiParams {
        let mut m = MultiParams::new();
        if let Some(n) = self.limit {
            m.insert("limit".into(), vec![n.to_string()]);
        }
        if let Some(n) = self.offset {
            m.insert("offset".into(), vec![n.to_string()]);
        }
        if self.extended_tags {
            m.insert("extended_tags".into(), vec!["true".to_string()]);
        }
        if let Some(t) = &self.check_type {
            m.insert("type".into(), vec![t.clone()]);
        }
        if !self.tags.is_empty() {
            m.insert("tags".into(), self.tags.clone());
        }
        m
    }
}

#[derive(Deserialize)]
struct ListTmsJson {
    #[serde(default)]
    checks: Vec<TmsCheckResponse>,
}

/// Operations on `/tms/check`.
pub struct TmsCheckService<'a, R: ?Sized> {
    api: &'a R,
}

impl<'a, R: Requester + ?Sized> TmsCheckService<'a, R> {
    pub fn new(api: &'a R) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &ListTmsQuery) -> Result<Vec<TmsCheckResponse>, Error> {
        let params = query.params();
        let req =
            self.api
                .new_request_multi_param_value(Method::GET, "/tms/check", Some(&params))?;
        let body: ListTmsJson = self.api.send(req).await?.json()?;
        Ok(body.checks)
    }

    pub async fn read(&self, id: i64) -> Result<TmsCheckResponse, Error> {
        let req = self
            .api
            .new_request(Method::GET, &format!("/tms/check/{}", id), None)?;
        self.api.send(req).await?.json()
    }

    pub async fn create(&self, check: &TmsCheck) -> Result<TmsCheckResponse, Error> {
        check.validate()?;
        let body = serde_json::to_string(check)?;
        let req = self.api.new_json_request(Method::POST, "/tms/check", body)?;
        self.api.send(req).await?.json()
    }

    pub async fn update(&self, id: i64, check: &TmsCheck) -> Result<TmsCheckResponse, Error> {
        check.validate()?;
        let body = serde_json::to_string(check)?;
        let req = self
            .api
            .new_json_request(Method::PUT, &format!("/tms/check/{}", id), body)?;
        self.api.send(req).await?.json()
    }

    pub async fn delete(&self, id: i64) -> Result<PingdomResponse, Error> {
        let req = self
            .api
            .new_request(Method::DELETE, &format!("/tms/check/{}", id), None)?;
        self.api.send(req).await?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRequester;

    fn check() -> TmsCheck {
        TmsCheck {
            name: "Login flow".into(),
            steps: vec![
                TmsStep::new("go_to").arg("url", "https://example.com/login"),
                TmsStep::new("fill")
                    .arg("input", "#user")
                    .arg("value", "demo"),
            ],
            active: true,
            interval: Some(10),
            region: "us-east".into(),
            ..TmsCheck::default()
        }
    }

    #[test]
    fn list_params_repeat_tags() {
        let q = ListTmsQuery {
            limit: Some(50),
            tags: vec!["web".into(), "login".into()],
            ..ListTmsQuery::default()
        };
        let p = q.params();
        assert_eq!(p["limit"], vec!["50"]);
        assert_eq!(p["tags"], vec!["web", "login"]);
        assert!(!p.contains_key("offset"));
    }

    #[test]
    fn validation_rules() {
        assert!(check().validate().is_ok());
        let mut c = check();
        c.steps.clear();
        assert!(matches!(
            c.validate(),
            Err(Error::Validation { field: "steps", .. })
        ));
        let mut c = check();
        c.steps.push(TmsStep::default());
        assert!(c.validate().is_err());
    }

    #[tokio::test]
    async fn list_sends_repeated_tags() {
        let api = MockRequester::new().respond(
            200,
            r#"{"checks":[{"id":7,"name":"Login flow","active":true,"status":"successful","type":"script","tags":["web"]}],"limit":50,"offset":0}"#,
        );
        let q = ListTmsQuery {
            tags: vec!["web".into(), "login".into()],
            ..ListTmsQuery::default()
        };
        let checks = TmsCheckService::new(&api).list(&q).await.unwrap();
        assert_eq!(checks[0].check_type, "script");
        assert_eq!(api.last().query.as_deref(), Some("tags=web&tags=login"));
    }

    #[tokio::test]
    async fn create_serializes_steps() {
        let api = MockRequester::new().respond(
            200,
            r#"{"id":7,"name":"Login flow","active":true,"steps":[{"fn":"go_to","args":{"url":"https://example.com/login"}}]}"#,
        );
        let created = TmsCheckService::new(&api).create(&check()).await.unwrap();
        assert_eq!(created.id, 7);
        assert_eq!(created.steps[0].function, "go_to");

        let body = api.last().json();
        assert_eq!(body["steps"][0]["fn"], "go_to");
        assert_eq!(body["steps"][1]["args"]["input"], "#user");
        assert_eq!(body["interval"], 10);
        assert!(body.get("tags").is_none());
        assert!(body.get("metadata").is_none());
    }

    #[tokio::test]
    async fn read_is_unwrapped() {
        let api = MockRequester::new().respond(
            200,
            r#"{"id":7,"name":"Login flow","interval":10,"metadata":{"width":1024,"height":768,"disable_websecurity":false}}"#,
        );
        let read = TmsCheckService::new(&api).read(7).await.unwrap();
        assert_eq!(read.interval, 10);
        assert_eq!(read.metadata.map(|m| m.width), Some(1024));
        assert_eq!(api.last().path, "/tms/check/7");
    }
}
