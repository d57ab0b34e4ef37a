//! Probe servers (`/probes`).

use crate::error::Error;
use crate::request::{Params, Requester};
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub id: i64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub ipv6: String,
    #[serde(default)]
    pub countryiso: String,
    #[serde(default)]
    pub region: String,
}

#[derive(Deserialize)]
struct ListProbesJson {
    #[serde(default)]
    probes: Vec<ProbeResponse>,
}

/// Operations on `/probes`.
pub struct ProbeService<'a, R: ?Sized> {
    api: &'a R,
}

impl<'a, R: Requester + ?Sized> ProbeService<'a, R> {
    pub fn new(api: &'a R) -> Self {
        Self { api }
    }

    /// List probes. `params` are passed through (`limit`, `offset`,
    /// `onlyactive`, `includedeleted`).
    pub async fn list(&self, params: Option<&Params>) -> Result<Vec<ProbeResponse>, Error> {
        let req = self.api.new_request(Method::GET, "/probes", params)?;
        let body: ListProbesJson = self.api.send(req).await?.json()?;
        Ok(body.probes)
    }
}
