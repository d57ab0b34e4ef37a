//! Maintenance occurrences (`/maintenance.occurrences`).
//!
//! An occurrence is a single scheduled instance of a maintenance window.

use crate::error::Error;
use crate::request::{MultiParams, Params, PingdomResponse, Requester};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: i64,
    #[serde(default)]
    pub maintenanceid: i64,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub from: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub to: DateTime<Utc>,
}

/// Filters for [`OccurrenceService::list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOccurrenceQuery {
    pub maintenance_id: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ListOccurrenceQuery {
    pub fn params(&self) -> Params {
        let mut m = Params::new();
        if let Some(id) = self.maintenance_id {
            m.insert("maintenanceid".into(), id.to_string());
        }
        if let Some(t) = self.from {
            m.insert("from".into(), t.timestamp().to_string());
        }
        if let Some(t) = self.to {
            m.insert("to".into(), t.timestamp().to_string());
        }
        m
    }
}

#[derive(Deserialize)]
struct ListOccurrencesJson {
    #[serde(default)]
    occurrences: Vec<Occurrence>,
}

#[derive(Deserialize)]
struct OccurrenceDetailsJson {
    occurrence: Occurrence,
}

/// Operations on `/maintenance.occurrences`.
pub struct OccurrenceService<'a, R: ?Sized> {
    api: &'a R,
}

impl<'a, R: Requester + ?Sized> OccurrenceService<'a, R> {
    pub fn new(api: &'a R) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &ListOccurrenceQuery) -> Result<Vec<Occurrence>, Error> {
        let params = query.params();
        let req = self
            .api
            .new_request(Method::GET, "/maintenance.occurrences", Some(&params))?;
        let body: ListOccurrencesJson = self.api.send(req).await?.json()?;
        Ok(body.occurrences)
    }

    pub async fn read(&self, id: i64) -> Result<Occurrence, Error> {
        let req = self.api.new_request(
            Method::GET,
            &format!("/maintenance.occurrences/{}", id),
            None,
        )?;
        let body: OccurrenceDetailsJson = self.api.send(req).await?.json()?;
        Ok(body.occurrence)
    }

    /// Move an occurrence to a new time slot.
    pub async fn update(
        &self,
        id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PingdomResponse, Error> {
        if to <= from {
            return Err(Error::validation("to", "must be after `from`"));
        }
        let params = Params::from([
            ("from".to_string(), from.timestamp().to_string()),
            ("to".to_string(), to.timestamp().to_string()),
        ]);
        let req = self.api.new_request(
            Method::PUT,
            &format!("/maintenance.occurrences/{}", id),
            Some(&params),
        )?;
        self.api.send(req).await?.json()
    }

    pub async fn delete(&self, id: i64) -> Result<PingdomResponse, Error> {
        let req = self.api.new_request(
            Method::DELETE,
            &format!("/maintenance.occurrences/{}", id),
            None,
        )?;
        self.api.send(req).await?.json()
    }

    /// Delete several occurrences; each id is sent as its own
    /// `occurenceids` entry (the API's spelling).
    pub async fn multi_delete(&self, ids: &[i64]) -> Result<PingdomResponse, Error> {
        if ids.is_empty() {
            return Err(Error::validation("occurenceids", "at least one id is required"));
        }
        let params = MultiParams::from([(
            "occurenceids".to_string(),
            ids.iter().map(ToString::to_string).collect(),
        )]);
        let req = self.api.new_request_multi_param_value(
            Method::DELETE,
            "/maintenance.occurrences",
            Some(&params),
        )?;
        self.api.send(req).await?.json()
    }
}
