//! Uptime checks (`/checks`).
//!
//! Creation and updates are sent as form-style query parameters, which is
//! what the API expects for this resource. [`Check`] is implemented by each
//! check type that can be created.

use crate::error::Error;
use crate::helpers::join_list;
use crate::request::{Params, PingdomResponse, Requester};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const VALID_RESOLUTIONS: [u32; 5] = [1, 5, 15, 30, 60];

/// Parameters needed to create or update a check.
pub trait Check: Sync {
    /// Parameters for `PUT /checks/{id}`.
    fn put_params(&self) -> Params;
    /// Parameters for `POST /checks`; includes the check `type`.
    fn post_params(&self) -> Params;
    /// Reject payloads the API would refuse.
    fn validate(&self) -> Result<(), Error>;
}

/// HTTP(S) check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpCheck {
    pub name: String,
    pub hostname: String,
    /// Minutes between tests; one of 1, 5, 15, 30, 60.
    pub resolution: u32,
    pub paused: bool,
    pub send_notification_when_down: Option<u32>,
    pub notify_again_every: Option<u32>,
    pub notify_when_back_up: bool,
    pub url: Option<String>,
    pub encryption: bool,
    pub port: Option<u16>,
    /// Basic-auth `(username, password)`.
    pub auth: Option<(String, String)>,
    pub should_contain: Option<String>,
    pub should_not_contain: Option<String>,
    pub post_data: Option<String>,
    pub request_headers: BTreeMap<String, String>,
    pub response_time_threshold: Option<u32>,
    pub verify_certificate: Option<bool>,
    pub ssl_down_days_before: Option<u32>,
    pub tags: Vec<String>,
    pub user_ids: Vec<i64>,
    pub team_ids: Vec<i64>,
    pub integration_ids: Vec<i64>,
    pub probe_filters: Vec<String>,
}

/// ICMP ping check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PingCheck {
    pub name: String,
    pub hostname: String,
    pub resolution: u32,
    pub paused: bool,
    pub send_notification_when_down: Option<u32>,
    pub notify_again_every: Option<u32>,
    pub notify_when_back_up: bool,
    pub response_time_threshold: Option<u32>,
    pub tags: Vec<String>,
    pub user_ids: Vec<i64>,
    pub team_ids: Vec<i64>,
    pub integration_ids: Vec<i64>,
    pub probe_filters: Vec<String>,
}

/// Settings every check type shares.
struct Common<'a> {
    name: &'a str,
    hostname: &'a str,
    resolution: u32,
    paused: bool,
    send_notification_when_down: Option<u32>,
    notify_again_every: Option<u32>,
    notify_when_back_up: bool,
    response_time_threshold: Option<u32>,
    tags: &'a [String],
    user_ids: &'a [i64],
    team_ids: &'a [i64],
    integration_ids: &'a [i64],
    probe_filters: &'a [String],
}

impl Common<'_> {
    fn params(&self) -> Params {
        let mut m = Params::new();
        m.insert("name".into(), self.name.to_string());
        m.insert("host".into(), self.hostname.to_string());
        m.insert("resolution".into(), self.resolution.to_string());
        m.insert("paused".into(), self.paused.to_string());
        m.insert("notifywhenbackup".into(), self.notify_when_back_up.to_string());
        m.insert("tags".into(), join_list(self.tags));
        m.insert("userids".into(), join_list(self.user_ids));
        m.insert("teamids".into(), join_list(self.team_ids));
        m.insert("integrationids".into(), join_list(self.integration_ids));
        m.insert("probe_filters".into(), join_list(self.probe_filters));
        if let Some(n) = self.send_notification_when_down {
            m.insert("sendnotificationwhendown".into(), n.to_string());
        }
        if let Some(n) = self.notify_again_every {
            m.insert("notifyagainevery".into(), n.to_string());
        }
        if let Some(n) = self.response_time_threshold {
            m.insert("responsetime_threshold".into(), n.to_string());
        }
        m
    }

    fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::validation("name", "must contain non-empty string"));
        }
        if self.hostname.is_empty() {
            return Err(Error::validation("hostname", "must contain non-empty string"));
        }
        if !VALID_RESOLUTIONS.contains(&self.resolution) {
            return Err(Error::validation(
                "resolution",
                format!(
                    "{} is not allowed; allowed values are {:?}",
                    self.resolution, VALID_RESOLUTIONS
                ),
            ));
        }
        Ok(())
    }
}

/// Creation omits empty list parameters; updates send them to clear values.
fn post_from_put(mut params: Params, check_type: &str) -> Params {
    params.retain(|_, v| !v.is_empty());
    params.insert("type".into(), check_type.to_string());
    params
}

impl HttpCheck {
    fn common(&self) -> Common<'_> {
        Common {
            name: &self.name,
            hostname: &self.hostname,
            resolution: self.resolution,
            paused: self.paused,
            send_notification_when_down: self.send_notification_when_down,
            notify_again_every: self.notify_again_every,
            notify_when_back_up: self.notify_when_back_up,
            response_time_threshold: self.response_time_threshold,
            tags: &self.tags,
            user_ids: &self.user_ids,
            team_ids: &self.team_ids,
            integration_ids: &self.integration_ids,
            probe_filters: &self.probe_filters,
        }
    }
}

impl Check for HttpCheck {
    fn put_params(&self) -> Params {
        let mut m = self.common().params();
        m.insert("url".into(), self.url.clone().unwrap_or_else(|| "/".into()));
        m.insert("encryption".into(), self.encryption.to_string());
        if let Some(port) = self.port {
            m.insert("port".into(), port.to_string());
        }
        if let Some((user, pass)) = &self.auth {
            m.insert("auth".into(), format!("{}:{}", user, pass));
        }
        if let Some(s) = &self.should_contain {
            m.insert("shouldcontain".into(), s.clone());
        } else if let Some(s) = &self.should_not_contain {
            m.insert("shouldnotcontain".into(), s.clone());
        }
        if let Some(data) = &self.post_data {
            m.insert("postdata".into(), data.clone());
        }
        if let Some(v) = self.verify_certificate {
            m.insert("verify_certificate".into(), v.to_string());
        }
        if let Some(days) = self.ssl_down_days_before {
            m.insert("ssl_down_days_before".into(), days.to_string());
        }
        // Headers are numbered requestheader0..N in key order.
        for (i, (k, v)) in self.request_headers.iter().enumerate() {
            m.insert(format!("requestheader{}", i), format!("{}:{}", k, v));
        }
        m
    }

    fn post_params(&self) -> Params {
        post_from_put(self.put_params(), "http")
    }

    fn validate(&self) -> Result<(), Error> {
        self.common().validate()?;
        if self.should_contain.is_some() && self.should_not_contain.is_some() {
            return Err(Error::validation(
                "should_contain",
                "`should_contain` and `should_not_contain` must not be set at the same time",
            ));
        }
        Ok(())
    }
}

impl PingCheck {
    fn common(&self) -> Common<'_> {
        Common {
            name: &self.name,
            hostname: &self.hostname,
            resolution: self.resolution,
            paused: self.paused,
            send_notification_when_down: self.send_notification_when_down,
            notify_again_every: self.notify_again_every,
            notify_when_back_up: self.notify_when_back_up,
            response_time_threshold: self.response_time_threshold,
            tags: &self.tags,
            user_ids: &self.user_ids,
            team_ids: &self.team_ids,
            integration_ids: &self.integration_ids,
            probe_filters: &self.probe_filters,
        }
    }
}

impl Check for PingCheck {
    fn put_params(&self) -> Params {
        self.common().params()
    }

    fn post_params(&self) -> Params {
        post_from_put(self.put_params(), "ping")
    }

    fn validate(&self) -> Result<(), Error> {
        self.common().validate()
    }
}

/// A check as returned by list and read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resolution: u32,
    #[serde(default)]
    pub sendnotificationwhendown: u32,
    #[serde(default)]
    pub notifyagainevery: u32,
    #[serde(default)]
    pub notifywhenbackup: bool,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub lasterrortime: i64,
    #[serde(default)]
    pub lasttesttime: i64,
    #[serde(default)]
    pub lastresponsetime: i64,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub ipv6: bool,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CheckKind>,
    #[serde(default)]
    pub tags: Vec<CheckTag>,
    #[serde(default)]
    pub teams: Vec<CheckTeam>,
    #[serde(default)]
    pub userids: Vec<i64>,
    #[serde(default)]
    pub integrationids: Vec<i64>,
    #[serde(default)]
    pub probe_filters: Vec<String>,
}

/// `type` is a bare name in listings and an object keyed by the name, with
/// type-specific settings, when reading a single check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckKind {
    Name(String),
    Details(serde_json::Map<String, Value>),
}

impl CheckKind {
    pub fn name(&self) -> Option<&str> {
        match self {
            CheckKind::Name(n) => Some(n),
            CheckKind::Details(m) => m.keys().next().map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckTag {
    pub name: String,
    #[serde(default, rename = "type")]
    pub tag_type: String,
    /// Sent as either a number or a string.
    #[serde(default)]
    pub count: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckTeam {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
struct ListChecksJson {
    #[serde(default)]
    checks: Vec<CheckResponse>,
}

#[derive(Deserialize)]
struct CheckDetailsJson {
    check: CheckResponse,
}

/// Operations on `/checks`.
pub struct CheckService<'a, R: ?Sized> {
    api: &'a R,
}

impl<'a, R: Requester + ?Sized> CheckService<'a, R> {
    pub fn new(api: &'a R) -> Self {
        Self { api }
    }

    /// List checks. `params` are passed through (e.g. `limit`, `offset`,
    /// `tags`, `include_tags`).
    pub async fn list(&self, params: Option<&Params>) -> Result<Vec<CheckResponse>, Error> {
        let req = self.api.new_request(Method::GET, "/checks", params)?;
        let body: ListChecksJson = self.api.send(req).await?.json()?;
        Ok(body.checks)
    }

    /// Detailed description of one check, including its teams.
    pub async fn read(&self, id: i64) -> Result<CheckResponse, Error> {
        let params = Params::from([("include_teams".to_string(), "true".to_string())]);
        let req = self
            .api
            .new_request(Method::GET, &format!("/checks/{}", id), Some(&params))?;
        let body: CheckDetailsJson = self.api.send(req).await?.json()?;
        Ok(body.check)
    }

    /// Create a check. Only `id` and `name` are populated in the result.
    pub async fn create<C: Check + ?Sized>(&self, check: &C) -> Result<CheckResponse, Error> {
        check.validate()?;
        let params = check.post_params();
        let req = self.api.new_request(Method::POST, "/checks", Some(&params))?;
        let body: CheckDetailsJson = self.api.send(req).await?.json()?;
        Ok(body.check)
    }

    pub async fn update<C: Check + ?Sized>(
        &self,
        id: i64,
        check: &C,
    ) -> Result<PingdomResponse, Error> {
        check.validate()?;
        let params = check.put_params();
        let req = self
            .api
            .new_request(Method::PUT, &format!("/checks/{}", id), Some(&params))?;
        self.api.send(req).await?.json()
    }

    pub async fn delete(&self, id: i64) -> Result<PingdomResponse, Error> {
        let req = self
            .api
            .new_request(Method::DELETE, &format!("/checks/{}", id), None)?;
        self.api.send(req).await?.json()
    }
}
