//! Client side of the registration action boundary.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::RegistrationRequest,
    protocol::{ActionResult, RegistrationReceipt},
};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

#[async_trait]
pub trait RegistrationAction: Send + Sync {
    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<ActionResult<RegistrationReceipt>, ClientError>;
}

pub struct HttpRegistrationAction {
    http: Client,
    endpoint: Url,
}

impl HttpRegistrationAction {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::new(),
            endpoint: registrations_endpoint(server_url)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RegistrationAction for HttpRegistrationAction {
    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<ActionResult<RegistrationReceipt>, ClientError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "registration response");

        // Every action outcome is JSON regardless of status; anything else
        // came from outside the action boundary.
        serde_json::from_slice(&body).map_err(|_| ClientError::UnexpectedResponse {
            status: status.as_u16(),
        })
    }
}

fn registrations_endpoint(server_url: &str) -> Result<Url, ClientError> {
    let mut base = Url::parse(server_url.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("registrations")?)
}
