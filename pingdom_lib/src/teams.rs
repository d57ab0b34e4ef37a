//! Alerting teams (`/alerting/teams`).

use crate::error::Error;
use crate::request::{PingdomResponse, Requester};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Payload for creating or updating a team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub member_ids: Vec<i64>,
}

impl TeamData {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::validation("name", "must contain non-empty string"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub member_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamResponse {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

#[derive(Deserialize)]
struct ListTeamsJson {
    #[serde(default)]
    teams: Vec<TeamResponse>,
}

#[derive(Deserialize)]
struct TeamDetailsJson {
    team: TeamResponse,
}

/// Operations on `/alerting/teams`.
pub struct TeamService<'a, R: ?Sized> {
    api: &'a R,
}

impl<'a, R: Requester + ?Sized> TeamService<'a, R> {
    pub fn new(api: &'a R) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<TeamResponse>, Error> {
        let req = self.api.new_request(Method::GET, "/alerting/teams", None)?;
        let body: ListTeamsJson = self.api.send(req).await?.json()?;
        Ok(body.teams)
    }

    pub async fn read(&self, id: i64) -> Result<TeamResponse, Error> {
        let req = self
            .api
            .new_request(Method::GET, &format!("/alerting/teams/{}", id), None)?;
        let body: TeamDetailsJson = self.api.send(req).await?.json()?;
        Ok(body.team)
    }

    pub async fn create(&self, team: &TeamData) -> Result<TeamResponse, Error> {
        team.validate()?;
        let body = serde_json::to_string(team)?;
        let req = self
            .api
            .new_json_request(Method::POST, "/alerting/teams", body)?;
        let body: TeamDetailsJson = self.api.send(req).await?.json()?;
        Ok(body.team)
    }

    pub async fn update(&self, id: i64, team: &TeamData) -> Result<TeamResponse, Error> {
        team.validate()?;
        let body = serde_json::to_string(team)?;
        let req =
            self.api
                .new_json_request(Method::PUT, &format!("/alerting/teams/{}", id), body)?;
        let body: TeamDetailsJson = self.api.send(req).await?.json()?;
        Ok(body.team)
    }

    pub async fn delete(&self, id: i64) -> Result<PingdomResponse, Error> {
        let req = self
            .api
            .new_request(Method::DELETE, &format!("/alerting/teams/{}", id), None)?;
        self.api.send(req).await?.json()
    }
}
