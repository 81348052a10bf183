//! Request orchestration for the translations API.
//!
//! # Design
//! Every operation is split in two halves, as in the host-does-IO pattern:
//! a pure `build_*` method that validates arguments and produces an
//! `HttpRequest`, and `parse_response`, which maps an `HttpResponse` onto
//! the decoded body or a `ClientError`. Local validation (`ENOLANG`,
//! `EBADREQUEST`) happens in `build_*`, so a failing call never reaches the
//! network.
//!
//! The async methods glue the halves together around a `Transport`, adding
//! the `Authorization` header on the way out. The client holds no per-call
//! state and can be shared freely between tasks.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{AuthScheme, CredentialSource};
use crate::config::ClientConfig;
use crate::diff::diff_removals;
use crate::error::{ClientError, ErrorKind, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::language::LanguageCatalog;
use crate::patch;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{ContentBlob, PutBlobBody};

/// Async client for the translations service.
#[derive(Clone)]
pub struct TranslationsClient {
    base_url: String,
    auth_scheme: AuthScheme,
    credentials: Option<CredentialSource>,
    transport: Arc<dyn Transport>,
    catalog: Arc<LanguageCatalog>,
}

impl fmt::Debug for TranslationsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationsClient")
            .field("base_url", &self.base_url)
            .field("auth_scheme", &self.auth_scheme)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Default for TranslationsClient {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl TranslationsClient {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_scheme: config.auth_scheme,
            credentials: None,
            transport: Arc::new(ReqwestTransport::from_config(config)),
            catalog: LanguageCatalog::iso639_shared(),
        }
    }

    pub fn with_credentials(mut self, credentials: CredentialSource) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_auth_scheme(mut self, auth_scheme: AuthScheme) -> Self {
        self.auth_scheme = auth_scheme;
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Resolve languages against `catalog` instead of the embedded one.
    pub fn with_catalog(mut self, catalog: impl Into<Arc<LanguageCatalog>>) -> Self {
        self.catalog = catalog.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- request builders ---------------------------------------------------

    pub fn build_list_services(&self) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/v1/services", self.base_url), None)
    }

    pub fn build_describe_service(&self, service_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, self.service_url(service_id), None)
    }

    /// Fails with `ENOLANG` when `language` does not resolve.
    pub fn build_get_language_blob(&self, service_id: &str, language: &str) -> Result<HttpRequest> {
        let code = self
            .catalog
            .resolve_code(language)
            .ok_or_else(|| ClientError::new(ErrorKind::NoLanguage))?;
        Ok(self.request(HttpMethod::Get, self.blob_url(service_id, code), None))
    }

    /// Fails with `ENOLANG` when `language` does not resolve to a record
    /// complete enough to build upload metadata.
    pub fn build_put_language_blob(
        &self,
        service_id: &str,
        language: &str,
        blob: &Value,
    ) -> Result<HttpRequest> {
        let record = self
            .catalog
            .resolve_record(language)
            .ok_or_else(|| ClientError::new(ErrorKind::NoLanguage))?;
        let metadata = record
            .metadata()
            .ok_or_else(|| ClientError::new(ErrorKind::NoLanguage))?;
        let body = PutBlobBody {
            blob: blob.clone(),
            metadata,
        };
        let body = serde_json::to_string(&body)
            .map_err(|e| ClientError::with_message(ErrorKind::Generic, e.to_string()))?;
        Ok(self.request(
            HttpMethod::Put,
            self.blob_url(service_id, &record.code3),
            Some(body),
        ))
    }

    /// Fails with `EBADREQUEST`, carrying the validator's message, when
    /// `patch` is not a well-formed operation sequence. The body is sent
    /// exactly as supplied.
    pub fn build_patch_structure(&self, service_id: &str, patch: &Value) -> Result<HttpRequest> {
        patch::validate(patch)
            .map_err(|e| ClientError::with_message(ErrorKind::BadRequest, e.to_string()))?;
        Ok(self.request(
            HttpMethod::Patch,
            format!("{}/structure", self.service_url(service_id)),
            Some(patch.to_string()),
        ))
    }

    // -- response parsing ---------------------------------------------------

    /// Map a response to its decoded body or to an error kind.
    ///
    /// Bodies that are not JSON come back as a JSON string; an empty body
    /// decodes to `null`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value> {
        check_status(&response)?;
        Ok(decode_body(response.body))
    }

    // -- operations ---------------------------------------------------------

    pub async fn list_services(&self) -> Result<Value> {
        self.send(self.build_list_services()).await
    }

    pub async fn describe_service(&self, service_id: &str) -> Result<Value> {
        self.send(self.build_describe_service(service_id)).await
    }

    pub async fn get_language_blob(&self, service_id: &str, language: &str) -> Result<Value> {
        let request = self.build_get_language_blob(service_id, language)?;
        self.send(request).await
    }

    pub async fn put_language_blob(
        &self,
        service_id: &str,
        language: &str,
        blob: &Value,
    ) -> Result<Value> {
        let request = self.build_put_language_blob(service_id, language, blob)?;
        self.send(request).await
    }

    pub async fn patch_structure(&self, service_id: &str, patch: &Value) -> Result<Value> {
        let request = self.build_patch_structure(service_id, patch)?;
        self.send(request).await
    }

    /// Delete from the service's structure every key the remote blob has and
    /// `local` lacks. Returns `None`, without a PATCH, when nothing needs
    /// removing.
    ///
    /// The read and the write are not atomic: a structure changed remotely
    /// between the two calls is patched with a stale diff.
    pub async fn remove_keys_from_structure(
        &self,
        service_id: &str,
        local: &ContentBlob,
    ) -> Result<Option<Value>> {
        let remote = self.get_language_blob(service_id, &local.blob_id).await?;
        let remote_data = remote.get("data").unwrap_or(&Value::Null);

        let removals = diff_removals(remote_data, &local.data);
        if removals.is_empty() {
            debug!(service_id, blob_id = %local.blob_id, "no keys to remove, skipping structure patch");
            return Ok(None);
        }

        debug!(service_id, removals = removals.len(), "removing keys from structure");
        let patch = serde_json::to_value(&removals)
            .map_err(|e| ClientError::with_message(ErrorKind::Generic, e.to_string()))?;
        self.patch_structure(service_id, &patch).await.map(Some)
    }

    // -- internals ----------------------------------------------------------

    fn service_url(&self, service_id: &str) -> String {
        format!("{}/v1/services/{service_id}", self.base_url)
    }

    fn blob_url(&self, service_id: &str, code: &str) -> String {
        format!("{}/blobs/{code}", self.service_url(service_id))
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }

    async fn authorize(&self, request: &mut HttpRequest) -> bool {
        let Some(source) = &self.credentials else {
            return false;
        };
        match source.resolve().await {
            Some(credential) => {
                let value = self.auth_scheme.header_value(&credential);
                request.headers.push(("authorization".to_string(), value));
                true
            }
            None => false,
        }
    }

    async fn send(&self, mut request: HttpRequest) -> Result<Value> {
        let authorized = self.authorize(&mut request).await;
        let method = request.method.as_str();
        let url = request.path.clone();
        debug!(method, %url, authorized, "sending request");

        let response = self.transport.execute(request).await.map_err(|err| {
            warn!(method, %url, error = %err, "transport failure");
            ClientError::with_message(ErrorKind::Generic, err.to_string())
        })?;

        self.parse_response(response).inspect_err(|err| {
            warn!(method, %url, kind = err.name(), "request failed");
        })
    }
}

/// Map non-success status codes onto the error taxonomy.
fn check_status(response: &HttpResponse) -> Result<()> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    let kind = match response.status {
        404 => ErrorKind::NotFound,
        401 | 403 => ErrorKind::NoAccess,
        _ => ErrorKind::Generic,
    };
    Err(ClientError::with_message(
        kind,
        format!("{} (HTTP {})", kind.default_message(), response.status),
    ))
}

fn decode_body(body: String) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}
