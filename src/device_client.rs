use crate::{configuration::Credentials, error::Result};
use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    StatusCode,
};
use secrecy::ExposeSecret;
use std::net::SocketAddrV4;
use tracing::*;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Single-shot command channel to a Tasmota device
pub trait DeviceTransport {
    fn perform_request(&self, command: &str, body: Option<&str>) -> Result<DeviceResponse>;
}

#[derive(Debug, Clone)]
pub struct TasmotaClient {
    http_client: Client,
    url: String,
    credentials: Option<Credentials>,
}

impl TasmotaClient {
    pub fn new(address: SocketAddrV4, credentials: Option<Credentials>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()?;
        let url = format!("http://{}/cm", address);
        Ok(Self {
            http_client,
            url,
            credentials,
        })
    }
}

impl DeviceTransport for TasmotaClient {
    #[instrument(skip(self, body))]
    fn perform_request(&self, command: &str, body: Option<&str>) -> Result<DeviceResponse> {
        let mut request = self.http_client.get(&self.url);
        if let Some(credentials) = &self.credentials {
            request = request.query(&[
                ("user", credentials.user.as_str()),
                ("password", credentials.password.expose_secret().as_str()),
            ]);
        }
        request = request.query(&[("cmnd", command)]);
        if let Some(body) = body {
            request = request.body(body.to_owned());
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        debug!(%status, "device responded");
        Ok(DeviceResponse { status, body })
    }
}
