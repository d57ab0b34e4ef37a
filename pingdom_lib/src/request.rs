//! The request/response contract shared by every resource service.

use crate::error::{Error, ErrorEnvelope};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Single-valued query parameters.
pub type Params = BTreeMap<String, String>;

/// Multi-valued query parameters; each value is sent as its own `key=value`
/// entry, in order.
pub type MultiParams = BTreeMap<String, Vec<String>>;

/// The four operations resource services are allowed to depend on.
///
/// [`crate::Client`] is the production implementation. Services are generic
/// over this trait so they can run against an in-memory fake.
#[async_trait]
pub trait Requester: Send + Sync {
    /// Authenticated request with single-valued query parameters.
    fn new_request(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
    ) -> Result<Request, Error>;

    /// Authenticated request with repeated-key query parameters.
    fn new_request_multi_param_value(
        &self,
        method: Method,
        path: &str,
        params: Option<&MultiParams>,
    ) -> Result<Request, Error>;

    /// Authenticated request carrying a pre-serialized JSON body.
    fn new_json_request(&self, method: Method, path: &str, body: String)
        -> Result<Request, Error>;

    /// Send the request and read the whole body. Non-2xx responses fail with
    /// [`Error::Pingdom`].
    async fn send(&self, request: Request) -> Result<RawResponse, Error>;
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decode the body into `dest`. A missing destination is an error.
    pub fn decode_into<T: DeserializeOwned>(&self, dest: Option<&mut T>) -> Result<(), Error> {
        let dest = dest.ok_or(Error::NoDestination)?;
        *dest = self.json()?;
        Ok(())
    }
}

/// Pass 2xx responses through; turn anything else into the decoded error
/// envelope.
pub fn check_response(response: RawResponse) -> Result<RawResponse, Error> {
    if response.status.is_success() {
        return Ok(response);
    }
    let envelope: ErrorEnvelope = serde_json::from_slice(&response.body)?;
    Err(Error::Pingdom(envelope.error))
}

/// Plain `{"message": ...}` acknowledgement returned by update and delete
/// endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingdomResponse {
    #[serde(default)]
    pub message: String,
}
