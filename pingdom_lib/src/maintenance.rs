//! Maintenance windows (`/maintenance`).

use crate::error::Error;
use crate::helpers::join_list;
use crate::request::{Params, PingdomResponse, Requester};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// How a maintenance window repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    #[default]
    None,
    Day,
    Week,
    Month,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::None => "none",
            RecurrenceType::Day => "day",
            RecurrenceType::Week => "week",
            RecurrenceType::Month => "month",
        }
    }
}

/// Payload for creating or updating a maintenance window.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceWindow {
    pub description: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub recurrence_type: Option<RecurrenceType>,
    pub repeat_every: Option<u32>,
    /// Last date a recurring window applies.
    pub effective_to: Option<DateTime<Utc>>,
    pub tms_ids: Vec<i64>,
    pub uptime_ids: Vec<i64>,
}

impl MaintenanceWindow {
    pub fn new(description: impl Into<String>, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            description: description.into(),
            from,
            to,
            recurrence_type: None,
            repeat_every: None,
            effective_to: None,
            tms_ids: Vec::new(),
            uptime_ids: Vec::new(),
        }
    }

    pub fn params(&self) -> Params {
        let mut m = Params::new();
        m.insert("description".into(), self.description.clone());
        m.insert("from".into(), self.from.timestamp().to_string());
        m.insert("to".into(), self.to.timestamp().to_string());
        if let Some(r) = self.recurrence_type {
            m.insert("recurrencetype".into(), r.as_str().to_string());
        }
        if let Some(n) = self.repeat_every {
            m.insert("repeatevery".into(), n.to_string());
        }
        if let Some(t) = self.effective_to {
            m.insert("effectiveto".into(), t.timestamp().to_string());
        }
        if !self.tms_ids.is_empty() {
            m.insert("tmsids".into(), join_list(&self.tms_ids));
        }
        if !self.uptime_ids.is_empty() {
            m.insert("uptimeids".into(), join_list(&self.uptime_ids));
        }
        m
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.description.is_empty() {
            return Err(Error::validation(
                "description",
                "must contain non-empty string",
            ));
        }
        if self.from.timestamp() <= 0 {
            return Err(Error::validation("from", "must be a positive unix time"));
        }
        if self.to <= self.from {
            return Err(Error::validation("to", "must be after `from`"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceCheckIds {
    #[serde(default)]
    pub uptime: Vec<i64>,
    #[serde(default)]
    pub tms: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceResponse {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recurrencetype: Option<RecurrenceType>,
    #[serde(default)]
    pub repeatevery: u32,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub effectiveto: Option<DateTime<Utc>>,
    #[serde(default)]
    pub checks: MaintenanceCheckIds,
}

#[derive(Deserialize)]
struct ListMaintenanceJson {
    #[serde(default)]
    maintenance: Vec<MaintenanceResponse>,
}

#[derive(Deserialize)]
struct MaintenanceDetailsJson {
    maintenance: MaintenanceResponse,
}

/// Operations on `/maintenance`.
pub struct MaintenanceService<'a, R: ?Sized> {
    api: &'a R,
}

impl<'a, R: Requester + ?Sized> MaintenanceService<'a, R> {
    pub fn new(api: &'a R) -> Self {
        Self { api }
    }

    /// List windows. `params` are passed through (`limit`, `offset`,
    /// `orderby`, `order`).
    pub async fn list(&self, params: Option<&Params>) -> Result<Vec<MaintenanceResponse>, Error> {
        let req = self.api.new_request(Method::GET, "/maintenance", params)?;
        let body: ListMaintenanceJson = self.api.send(req).await?.json()?;
        Ok(body.maintenance)
    }

    pub async fn read(&self, id: i64) -> Result<MaintenanceResponse, Error> {
        let req = self
            .api
            .new_request(Method::GET, &format!("/maintenance/{}", id), None)?;
        let body: MaintenanceDetailsJson = self.api.send(req).await?.json()?;
        Ok(body.maintenance)
    }

    /// Create a window; the result carries only the new `id`.
    pub async fn create(&self, window: &MaintenanceWindow) -> Result<MaintenanceResponse, Error> {
        window.validate()?;
        let params = window.params();
        let req = self
            .api
            .new_request(Method::POST, "/maintenance", Some(&params))?;
        let body: MaintenanceDetailsJson = self.api.send(req).await?.json()?;
        Ok(body.maintenance)
    }

    pub async fn update(
        &self,
        id: i64,
        window: &MaintenanceWindow,
    ) -> Result<PingdomResponse, Error> {
        window.validate()?;
        let params = window.params();
        let req = self.api.new_request(
            Method::PUT,
            &format!("/maintenance/{}", id),
            Some(&params),
        )?;
        self.api.send(req).await?.json()
    }

    pub async fn delete(&self, id: i64) -> Result<PingdomResponse, Error> {
        let req = self
            .api
            .new_request(Method::DELETE, &format!("/maintenance/{}", id), None)?;
        self.api.send(req).await?.json()
    }

    /// Delete several windows in one call.
    pub async fn multi_delete(&self, ids: &[i64]) -> Result<PingdomResponse, Error> {
        if ids.is_empty() {
            return Err(Error::validation("maintenanceids", "at least one id is required"));
        }
        let params = Params::from([("maintenanceids".to_string(), join_list(ids))]);
        let req = self
            .api
            .new_request(Method::DELETE, "/maintenance", Some(&params))?;
        self.api.send(req).await?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRequester;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn window() -> MaintenanceWindow {
        let mut w = MaintenanceWindow::new("Upgrade", ts(1_600_000_000), ts(1_600_003_600));
        w.recurrence_type = Some(RecurrenceType::Week);
        w.repeat_every = Some(2);
        w.uptime_ids = vec![10, 11];
        w
    }

    #[test]
    fn params_use_unix_seconds() {
        let p = window().params();
        assert_eq!(p["description"], "Upgrade");
        assert_eq!(p["from"], "1600000000");
        assert_eq!(p["to"], "1600003600");
        assert_eq!(p["recurrencetype"], "week");
        assert_eq!(p["repeatevery"], "2");
        assert_eq!(p["uptimeids"], "10,11");
        assert!(!p.contains_key("tmsids"));
        assert!(!p.contains_key("effectiveto"));
    }

    #[test]
    fn validation_rules() {
        assert!(window().validate().is_ok());

        let mut w = window();
        w.description.clear();
        assert!(w.validate().is_err());

        let mut w = window();
        w.to = w.from;
        assert!(matches!(
            w.validate(),
            Err(Error::Validation { field: "to", .. })
        ));
    }

    #[tokio::test]
    async fn list_decodes_timestamps() {
        let api = MockRequester::new().respond(
            200,
            r#"{"maintenance":[{"id":1,"description":"Nightly","from":1600000000,"to":1600003600,
                "recurrencetype":"day","repeatevery":1,"effectiveto":1700000000,
                "checks":{"uptime":[5],"tms":[]}}]}"#,
        );
        let list = MaintenanceService::new(&api).list(None).await.unwrap();
        assert_eq!(list[0].from, Some(ts(1_600_000_000)));
        assert_eq!(list[0].recurrencetype, Some(RecurrenceType::Day));
        assert_eq!(list[0].checks.uptime, vec![5]);
    }

    #[tokio::test]
    async fn create_then_read() {
        let api = MockRequester::new()
            .respond(200, r#"{"maintenance":{"id":42}}"#)
            .respond(200, r#"{"maintenance":{"id":42,"description":"Upgrade","from":1600000000,"to":1600003600}}"#);
        let svc = MaintenanceService::new(&api);
        let created = svc.create(&window()).await.unwrap();
        assert_eq!(created.id, 42);
        assert!(created.from.is_none());

        let sent = api.last();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.param("from").as_deref(), Some("1600000000"));

        let read = svc.read(42).await.unwrap();
        assert_eq!(read.description, "Upgrade");
        assert_eq!(api.last().path, "/maintenance/42");
    }

    #[tokio::test]
    async fn multi_delete_joins_ids() {
        let api = MockRequester::new().respond(200, r#"{"message":"2 maintenance windows deleted"}"#);
        let svc = MaintenanceService::new(&api);
        svc.multi_delete(&[1, 2]).await.unwrap();
        let sent = api.last();
        assert_eq!(sent.method, Method::DELETE);
        assert_eq!(sent.path, "/maintenance");
        assert_eq!(sent.param("maintenanceids").as_deref(), Some("1,2"));

        assert!(svc.multi_delete(&[]).await.is_err());
    }
}
