use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use forge_core::config::ConsoleConfig;
use forge_core::file::UploadedFile;
use forge_core::mac::MacAddr;
use forge_core::machine::Machine;
use forge_core::version::ServiceInfo;

use crate::error::{ClientError, Result};

/// JSON envelope the service wraps error responses in.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed client for the provisioning service REST API.
///
/// One instance per endpoint; cheap to clone, the underlying HTTP
/// client is reference-counted. Every operation returns its own
/// `Result` — there is no shared error state. Mutations are idempotent
/// on the server side and callers are expected to re-fetch the
/// affected listing afterwards rather than patch local copies.
#[derive(Clone)]
pub struct ConsoleClient {
    http: reqwest::Client,
    base: String,
    pub(crate) max_concurrent_uploads: usize,
}

impl ConsoleClient {
    /// Build a client from connection settings.
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("forgectl/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base: config.endpoint.trim_end_matches('/').to_string(),
            max_concurrent_uploads: config.max_concurrent_uploads.max(1),
        })
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// List all machines known to the service, in server order.
    pub async fn machines(&self) -> Result<Vec<Machine>> {
        self.get_json("/api/machines").await
    }

    /// Remove a machine and everything associated with it.
    pub async fn delete_machine(&self, mac: &MacAddr) -> Result<()> {
        self.expect_ok(self.http.delete(self.url(&format!("/api/machines/{}", mac))))
            .await
    }

    /// All variables set on one machine.
    pub async fn machine_variables(&self, mac: &MacAddr) -> Result<BTreeMap<String, String>> {
        self.get_json(&format!("/api/machines/{}/variables", mac))
            .await
    }

    /// Set a machine-scoped variable. Last write wins; safe to retry.
    pub async fn set_machine_variable(
        &self,
        mac: &MacAddr,
        name: &str,
        value: &str,
    ) -> Result<()> {
        require_key(name)?;
        self.expect_ok(
            self.http
                .put(self.url(&format!("/api/machines/{}/variables/{}", mac, name)))
                .form(&[("value", value)]),
        )
        .await
    }

    /// Remove a machine-scoped variable. Deleting an absent name is
    /// tolerated by callers, who re-fetch afterwards anyway.
    pub async fn delete_machine_variable(&self, mac: &MacAddr, name: &str) -> Result<()> {
        require_key(name)?;
        self.expect_ok(
            self.http
                .delete(self.url(&format!("/api/machines/{}/variables/{}", mac, name))),
        )
        .await
    }

    /// Cluster-wide variables.
    pub async fn variables(&self) -> Result<BTreeMap<String, String>> {
        self.get_json("/api/variables").await
    }

    /// Set a cluster variable. Last write wins; safe to retry.
    pub async fn set_variable(&self, name: &str, value: &str) -> Result<()> {
        require_key(name)?;
        self.expect_ok(
            self.http
                .put(self.url(&format!("/api/variables/{}", name)))
                .form(&[("value", value)]),
        )
        .await
    }

    /// Remove a cluster variable.
    pub async fn delete_variable(&self, name: &str) -> Result<()> {
        require_key(name)?;
        self.expect_ok(self.http.delete(self.url(&format!("/api/variables/{}", name))))
            .await
    }

    /// List uploaded workspace files, in server order.
    pub async fn files(&self) -> Result<Vec<UploadedFile>> {
        self.get_json("/files/").await
    }

    /// Delete an uploaded file. Files are addressed by name.
    pub async fn delete_file(&self, name: &str) -> Result<()> {
        require_key(name)?;
        self.expect_ok(self.http.delete(self.url("/files")).query(&[("name", name)]))
            .await
    }

    /// Version and uptime details of the service instance.
    pub async fn version(&self) -> Result<ServiceInfo> {
        self.get_json("/api/version").await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let resp = self.http.get(&url).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn expect_ok(&self, req: reqwest::RequestBuilder) -> Result<()> {
        let resp = req.send().await?;
        check_status(resp).await?;
        Ok(())
    }
}

fn require_key(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ClientError::EmptyKey);
    }
    Ok(())
}

/// Map non-2xx responses to [`ClientError::Api`] carrying the body's
/// message.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: extract_message(&body),
    })
}

/// The service wraps errors as `{"error": "..."}`; plain-text bodies
/// pass through unchanged.
fn extract_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(e) => e.error,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "request failed".to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}
