//! In-memory [`Requester`] used by the service unit tests.

use crate::config::ClientConfig;
use crate::error::Error;
use crate::request::{check_response, MultiParams, Params, RawResponse, Requester};
use crate::Client;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, StatusCode};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request as seen by the fake transport.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<String>,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.body.as_deref().unwrap_or("null")).unwrap()
    }

    /// Decoded query pairs, in wire order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.query.as_deref().unwrap_or("").as_bytes())
            .into_owned()
            .collect()
    }

    pub fn param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

/// Builds requests with a real [`Client`] and answers them from a queue of
/// canned `(status, body)` pairs.
pub struct MockRequester {
    client: Client,
    responses: Mutex<VecDeque<(u16, String)>>,
    sent: Mutex<Vec<Recorded>>,
}

impl MockRequester {
    pub fn new() -> Self {
        let config = ClientConfig::with_api_token("test-token").base_url("https://api.test");
        Self {
            client: Client::with_config(config).unwrap(),
            responses: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
        self
    }

    pub fn sent(&self) -> Vec<Recorded> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.sent().pop().expect("no request sent")
    }
}

#[async_trait]
impl Requester for MockRequester {
    fn new_request(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
    ) -> Result<Request, Error> {
        self.client.new_request(method, path, params)
    }

    fn new_request_multi_param_value(
        &self,
        method: Method,
        path: &str,
        params: Option<&MultiParams>,
    ) -> Result<Request, Error> {
        self.client
            .new_request_multi_param_value(method, path, params)
    }

    fn new_json_request(
        &self,
        method: Method,
        path: &str,
        body: String,
    ) -> Result<Request, Error> {
        self.client.new_json_request(method, path, body)
    }

    async fn send(&self, request: Request) -> Result<RawResponse, Error> {
        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| String::from_utf8_lossy(b).into_owned());
        self.sent.lock().unwrap().push(Recorded {
            method: request.method().clone(),
            path: request.url().path().to_string(),
            query: request.url().query().map(String::from),
            body,
        });
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((200, "{}".to_string()));
        check_response(RawResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            body.into_bytes(),
        ))
    }
}
