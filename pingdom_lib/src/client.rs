//! HTTP client for the Pingdom REST API.

use crate::checks::CheckService;
use crate::config::{non_empty, ClientConfig, DEFAULT_BASE_URL};
use crate::contacts::ContactService;
use crate::error::Error;
use crate::maintenance::MaintenanceService;
use crate::occurrences::OccurrenceService;
use crate::probes::ProbeService;
use crate::request::{check_response, MultiParams, Params, RawResponse, Requester};
use crate::teams::TeamService;
use crate::tms::TmsCheckService;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, Method, Request};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Pingdom API client.
///
/// Immutable once built. Cloning is cheap and shares the underlying
/// connection pool.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    api_token: Option<String>,
    api_key: Option<String>,
    authorization: HeaderValue,
    user_agent: HeaderValue,
    http: HttpClient,
}

impl Client {
    /// Build a client from explicit configuration.
    ///
    /// Fails when neither an API token nor an API key is set, or when the
    /// base URL does not parse. Apply [`ClientConfig::with_env_fallback`]
    /// first to pick up credentials from the environment.
    pub fn with_config(config: ClientConfig) -> Result<Self, Error> {
        let base = non_empty(config.base_url.as_deref()).unwrap_or(DEFAULT_BASE_URL);
        Url::parse(base)?;
        let base_url = base.trim_end_matches('/').to_string();

        let api_token = non_empty(config.api_token.as_deref()).map(String::from);
        let api_key = non_empty(config.api_key.as_deref()).map(String::from);
        let credential = api_key.as_deref().or(api_token.as_deref()).ok_or_else(|| {
            Error::Config("either an API token or an API key must be provided".to_string())
        })?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", credential))?;
        authorization.set_sensitive(true);
        let user_agent = HeaderValue::from_str(&format!("pingdom-rs/{}", crate::VERSION))?;

        Ok(Self {
            base_url,
            api_token,
            api_key,
            authorization,
            user_agent,
            http: config.http_client.unwrap_or_default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// The credential sent as the bearer value: the API key when set,
    /// otherwise the API token.
    pub fn credential(&self) -> &str {
        self.api_key
            .as_deref()
            .or(self.api_token.as_deref())
            .unwrap_or_default()
    }

    pub fn checks(&self) -> CheckService<'_, Self> {
        CheckService::new(self)
    }

    pub fn contacts(&self) -> ContactService<'_, Self> {
        ContactService::new(self)
    }

    pub fn maintenances(&self) -> MaintenanceService<'_, Self> {
        MaintenanceService::new(self)
    }

    pub fn occurrences(&self) -> OccurrenceService<'_, Self> {
        OccurrenceService::new(self)
    }

    pub fn probes(&self) -> ProbeService<'_, Self> {
        ProbeService::new(self)
    }

    pub fn teams(&self) -> TeamService<'_, Self> {
        TeamService::new(self)
    }

    pub fn tms_checks(&self) -> TmsCheckService<'_, Self> {
        TmsCheckService::new(self)
    }

    /// Send `request` and decode a 2xx body into `dest`.
    ///
    /// Service errors take priority over a missing destination. A decode
    /// failure on a 2xx response (including a missing destination) comes
    /// back as [`Error::Decode`] with the response attached.
    pub async fn do_request<T: DeserializeOwned>(
        &self,
        request: Request,
        dest: Option<&mut T>,
    ) -> Result<RawResponse, Error> {
        let response = self.send(request).await?;
        match response.decode_into(dest) {
            Ok(()) => Ok(response),
            Err(source) => Err(Error::Decode {
                response: Box::new(response),
                source: Box::new(source),
            }),
        }
    }

    /// Send `request` and decode the 2xx body as `T`.
    pub async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T, Error> {
        self.send(request).await?.json()
    }

    /// Base URL plus `path`, concatenated as-is.
    fn resource_url(&self, path: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    fn authorized(&self, method: Method, url: Url) -> Request {
        let mut request = Request::new(method, url);
        let headers = request.headers_mut();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        request
    }
}

/// Replace the query string with `pairs`; leaves the URL untouched when empty.
fn with_query<'a, I>(mut url: Url, pairs: I) -> Url
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs = pairs.into_iter().peekable();
    if pairs.peek().is_some() {
        url.set_query(None);
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

#[async_trait]
impl Requester for Client {
    fn new_request(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
    ) -> Result<Request, Error> {
        let mut url = self.resource_url(path)?;
        if let Some(params) = params {
            url = with_query(url, params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(self.authorized(method, url))
    }

    fn new_request_multi_param_value(
        &self,
        method: Method,
        path: &str,
        params: Option<&MultiParams>,
    ) -> Result<Request, Error> {
        let mut url = self.resource_url(path)?;
        if let Some(params) = params {
            let pairs = params
                .iter()
                .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())));
            url = with_query(url, pairs);
        }
        Ok(self.authorized(method, url))
    }

    fn new_json_request(
        &self,
        method: Method,
        path: &str,
        body: String,
    ) -> Result<Request, Error> {
        let url = self.resource_url(path)?;
        let mut request = self.authorized(method, url);
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(body.into());
        Ok(request)
    }

    async fn send(&self, request: Request) -> Result<RawResponse, Error> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending Pingdom API request");

        let res = self.http.execute(request).await?;
        let status = res.status();
        let headers = res.headers().clone();
        let body = res.bytes().await?.to_vec();
        debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "received Pingdom API response");

        check_response(RawResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{API_KEY_ENV, API_TOKEN_ENV};

    fn client(base: &str) -> Client {
        Client::with_config(ClientConfig::with_api_token("my_api_token").base_url(base)).unwrap()
    }

    fn auth_header(req: &Request) -> &str {
        req.headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn defaults_to_production_base_url() {
        let c = Client::with_config(ClientConfig::with_api_token("token")).unwrap();
        assert_eq!(c.base_url(), DEFAULT_BASE_URL);
        assert_eq!(c.api_token(), Some("token"));
        assert_eq!(c.api_key(), None);
    }

    #[test]
    fn keeps_both_credentials() {
        let c = Client::with_config(ClientConfig::with_api_token("token").api_key("key")).unwrap();
        assert_eq!(c.api_token(), Some("token"));
        assert_eq!(c.api_key(), Some("key"));
        assert_eq!(c.credential(), "key");
    }

    #[test]
    fn rejects_missing_credentials() {
        let err = Client::with_config(ClientConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Config(_)));

        let err = Client::with_config(ClientConfig::with_api_token("").api_key(""))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_malformed_base_url() {
        let err = Client::with_config(ClientConfig::with_api_token("t").base_url("not a url"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn env_fallback_token_and_key() {
        let lookup = |name: &str| match name {
            API_TOKEN_ENV => Some("envSetToken".to_string()),
            API_KEY_ENV => Some("envSetKey".to_string()),
            _ => None,
        };
        let c = Client::with_config(ClientConfig::default().with_fallback(lookup)).unwrap();
        assert_eq!(c.api_token(), Some("envSetToken"));
        assert_eq!(c.api_key(), Some("envSetKey"));
        assert_eq!(c.credential(), "envSetKey");
    }

    #[test]
    fn new_request_builds_exact_url() {
        let c = client("https://x/");
        let req = c.new_request(Method::GET, "/checks", None).unwrap();
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.url().as_str(), "https://x/checks");
        assert_eq!(auth_header(&req), "Bearer my_api_token");
        assert!(req.body().is_none());
    }

    #[test]
    fn new_request_empty_params_has_no_query() {
        let c = client("https://x");
        let req = c
            .new_request(Method::GET, "/checks", Some(&Params::new()))
            .unwrap();
        assert_eq!(req.url().as_str(), "https://x/checks");
    }

    #[test]
    fn new_request_encodes_params() {
        let c = client("https://x");
        let mut params = Params::new();
        params.insert("name".to_string(), "my check".to_string());
        params.insert("limit".to_string(), "10".to_string());
        let req = c.new_request(Method::GET, "/checks", Some(&params)).unwrap();
        assert_eq!(req.url().as_str(), "https://x/checks?limit=10&name=my+check");
    }

    #[test]
    fn params_replace_existing_query() {
        let c = client("https://x");
        let params = Params::from([("limit".to_string(), "10".to_string())]);
        let req = c
            .new_request(Method::GET, "/checks?v=1", Some(&params))
            .unwrap();
        assert_eq!(req.url().as_str(), "https://x/checks?limit=10");

        let multi = MultiParams::from([("tags".to_string(), vec!["a".to_string()])]);
        let req = c
            .new_request_multi_param_value(Method::GET, "/tms/check?v=1", Some(&multi))
            .unwrap();
        assert_eq!(req.url().as_str(), "https://x/tms/check?tags=a");

        let req = c.new_request(Method::GET, "/checks?v=1", None).unwrap();
        assert_eq!(req.url().query(), Some("v=1"));
    }

    #[test]
    fn multi_param_values_repeat_key() {
        let c = client("https://x");
        let mut params = MultiParams::new();
        params.insert("tags".to_string(), vec!["a".to_string(), "b".to_string()]);
        let req = c
            .new_request_multi_param_value(Method::GET, "/tms/check", Some(&params))
            .unwrap();
        assert_eq!(req.url().query(), Some("tags=a&tags=b"));
    }

    #[test]
    fn multi_param_empty_values_have_no_query() {
        let c = client("https://x");
        let mut params = MultiParams::new();
        params.insert("tags".to_string(), Vec::new());
        let req = c
            .new_request_multi_param_value(Method::DELETE, "/maintenance.occurrences", Some(&params))
            .unwrap();
        assert_eq!(req.url().query(), None);
    }

    #[test]
    fn json_request_sets_body_and_content_type() {
        let c = client("https://x");
        let req = c
            .new_json_request(Method::POST, "/alerting/teams", r#"{"name":"ops"}"#.to_string())
            .unwrap();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(
            req.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"name":"ops"}"#);
    }

    #[test]
    fn api_key_takes_precedence() {
        let c = Client::with_config(
            ClientConfig::with_api_token("token")
                .api_key("key")
                .base_url("https://x"),
        )
        .unwrap();
        let req = c.new_request(Method::GET, "/", None).unwrap();
        assert_eq!(auth_header(&req), "Bearer key");
    }

    #[test]
    fn authorization_header_is_sensitive() {
        let c = client("https://x");
        let req = c.new_request(Method::GET, "/checks", None).unwrap();
        assert!(req.headers().get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn malformed_path_is_url_error() {
        let c = client("https://x");
        let err = c.new_request(Method::GET, ":bad", None).unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn root_path() {
        let c = client("https://x/api/3.1/");
        let req = c.new_request(Method::GET, "/", None).unwrap();
        assert_eq!(req.url().as_str(), "https://x/api/3.1/");
    }
}
