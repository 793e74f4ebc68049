//! REST catalog client
//!
//! Talks to a metadata catalog view server over HTTP using a blocking
//! `ureq` agent. Every call is scoped to one server and one user:
//!
//! ```text
//! {endpoint}/servers/{server}/api/quill/users/{user}/...
//! ```
//!
//! Reads that fail with a retryable error are retried
//! once. Mutations are never retried.

use std::time::Duration;

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use quill_core::{
    CatalogClient, CatalogError, CatalogErrorKind, CatalogResult, EntityMatch, EntityRecord, Guid,
    OutputFormat, Properties,
};

use crate::render::render_record;

/// Credentials sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>`
    Token(String),
    /// HTTP basic auth
    Basic {
        /// User name
        user: String,
        /// Password
        password: String,
    },
    /// No `Authorization` header
    Anonymous,
}

impl Credentials {
    fn header(&self) -> Option<String> {
        match self {
            Credentials::Token(token) => Some(format!("Bearer {}", token)),
            Credentials::Basic { user, password } => {
                let raw = format!("{}:{}", user, password);
                Some(format!(
                    "Basic {}",
                    base64::engine::general_purpose::STANDARD.encode(raw)
                ))
            }
            Credentials::Anonymous => None,
        }
    }
}

/// Catalog reached over HTTP.
pub struct HttpCatalog {
    agent: ureq::Agent,
    base: String,
    auth: Option<String>,
}

impl std::fmt::Debug for HttpCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalog")
            .field("base", &self.base)
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn transport_error(e: ureq::Error) -> CatalogError {
    let msg = e.to_string();
    if msg.contains("timed out") || msg.contains("Timeout") {
        CatalogError::new(CatalogErrorKind::Timeout, msg)
    } else {
        CatalogError::new(CatalogErrorKind::Network, msg)
    }
}

fn status_error(status: u16, what: &str, body: &str) -> CatalogError {
    let snippet: String = body.chars().take(200).collect();
    let kind = match status {
        404 => CatalogErrorKind::NotFound,
        401 | 403 => CatalogErrorKind::Auth,
        500..=599 => CatalogErrorKind::Server,
        _ => CatalogErrorKind::Protocol,
    };
    CatalogError::new(kind, format!("{} returned HTTP {}: {}", what, status, snippet))
}

fn decode<T: DeserializeOwned>(what: &str, body: &str) -> CatalogResult<T> {
    serde_json::from_str(body).map_err(|e| {
        CatalogError::new(
            CatalogErrorKind::Protocol,
            format!("invalid JSON from {}: {}", what, e),
        )
    })
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

impl HttpCatalog {
    /// Build a client for `user` on `server` behind `endpoint`.
    pub fn new(
        endpoint: &str,
        server: &str,
        user: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        let base = format!(
            "{}/servers/{}/api/quill/users/{}",
            endpoint.trim_end_matches('/'),
            server,
            user
        );
        tracing::debug!(target: "quill::catalog", %base, "Remote catalog configured");
        Self {
            agent: ureq::Agent::new_with_config(config),
            base,
            auth: credentials.header(),
        }
    }

    /// Root URL all requests are made under.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> CatalogResult<(u16, String)> {
        let url = format!("{}/{}", self.base, path);
        let mut request = self.agent.get(&url).header("Accept", "application/json");
        for (k, v) in query {
            request = request.query(*k, *v);
        }
        if let Some(auth) = &self.auth {
            request = request.header("Authorization", auth);
        }
        let mut response = request.call().map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| CatalogError::new(CatalogErrorKind::Network, format!("failed to read response: {}", e)))?;
        tracing::trace!(target: "quill::catalog", %url, status, "GET");
        Ok((status, body))
    }

    fn post(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> CatalogResult<(u16, String)> {
        let url = format!("{}/{}", self.base, path);
        let bytes = serde_json::to_vec(body).map_err(|e| {
            CatalogError::new(
                CatalogErrorKind::Protocol,
                format!("failed to serialize request: {}", e),
            )
        })?;
        let mut request = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");
        for (k, v) in query {
            request = request.query(*k, *v);
        }
        if let Some(auth) = &self.auth {
            request = request.header("Authorization", auth);
        }
        let mut response = request.send(&bytes[..]).map_err(transport_error)?;
        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| CatalogError::new(CatalogErrorKind::Network, format!("failed to read response: {}", e)))?;
        tracing::trace!(target: "quill::catalog", %url, status, "POST");
        Ok((status, text))
    }

    /// Run a read, retrying once on a transient failure.
    fn read<T>(&self, operation: &str, call: impl Fn() -> CatalogResult<T>) -> CatalogResult<T> {
        match call() {
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    target: "quill::catalog",
                    op = operation,
                    error = %e,
                    "First call failed, retrying"
                );
                call()
            }
            other => other,
        }
    }

    /// POST a mutation and require a 2xx answer.
    fn mutate(
        &self,
        what: &str,
        path: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> CatalogResult<String> {
        let (status, text) = self.post(path, query, body)?;
        if !is_success(status) {
            return Err(status_error(status, what, &text));
        }
        Ok(text)
    }
}

impl CatalogClient for HttpCatalog {
    fn lookup_by_name(&self, entity_type: &str, name: &str) -> CatalogResult<Vec<EntityMatch>> {
        self.read("lookup_by_name", || {
            let body = json!({ "entityType": entity_type, "name": name });
            let (status, text) = self.post("entities/by-name", &[], &body)?;
            match status {
                404 => Ok(Vec::new()),
                s if is_success(s) => decode("lookup_by_name", &text),
                s => Err(status_error(s, "lookup_by_name", &text)),
            }
        })
    }

    fn lookup_by_guid(&self, entity_type: &str, guid: &Guid) -> CatalogResult<Option<EntityRecord>> {
        self.read("lookup_by_guid", || {
            let path = format!("entities/{}", guid);
            let (status, text) = self.get(&path, &[("type", entity_type)])?;
            match status {
                404 => Ok(None),
                s if is_success(s) => decode("lookup_by_guid", &text).map(Some),
                s => Err(status_error(s, "lookup_by_guid", &text)),
            }
        })
    }

    fn find(&self, entity_type: &str, search: &str) -> CatalogResult<Vec<EntityMatch>> {
        self.read("find", || {
            let body = json!({ "entityType": entity_type, "searchString": search });
            let (status, text) = self.post("entities/search", &[], &body)?;
            match status {
                404 => Ok(Vec::new()),
                s if is_success(s) => decode("find", &text),
                s => Err(status_error(s, "find", &text)),
            }
        })
    }

    fn create(&self, entity_type: &str, properties: &Properties) -> CatalogResult<Guid> {
        let body = json!({ "entityType": entity_type, "properties": properties });
        let text = self.mutate("create", "entities", &[], &body)?;
        let reply: serde_json::Value = decode("create", &text)?;
        let guid = reply
            .get("guid")
            .and_then(|g| g.as_str())
            .ok_or_else(|| CatalogError::new(CatalogErrorKind::Protocol, "create reply has no guid"))?;
        Ok(Guid::new(guid))
    }

    fn update(
        &self,
        entity_type: &str,
        guid: &Guid,
        properties: &Properties,
        replace_all: bool,
    ) -> CatalogResult<()> {
        let body = json!({ "entityType": entity_type, "properties": properties });
        let path = format!("entities/{}/update", guid);
        let replace = if replace_all { "true" } else { "false" };
        self.mutate("update", &path, &[("replaceAll", replace)], &body)
            .map(|_| ())
    }

    fn link(
        &self,
        relationship_type: &str,
        end1: &Guid,
        end2: &Guid,
        properties: &Properties,
    ) -> CatalogResult<()> {
        let body = json!({
            "relationshipType": relationship_type,
            "end1Guid": end1,
            "end2Guid": end2,
            "properties": properties,
        });
        self.mutate("link", "relationships", &[], &body).map(|_| ())
    }

    fn related(&self, relationship_type: &str, end1: &Guid, end2: &Guid) -> CatalogResult<bool> {
        #[derive(Deserialize)]
        struct Related {
            exists: bool,
        }

        self.read("related", || {
            let body = json!({
                "relationshipType": relationship_type,
                "end1Guid": end1,
                "end2Guid": end2,
            });
            let (status, text) = self.post("relationships/query", &[], &body)?;
            match status {
                404 => Ok(false),
                s if is_success(s) => decode::<Related>("related", &text).map(|r| r.exists),
                s => Err(status_error(s, "related", &text)),
            }
        })
    }

    fn detach(&self, relationship_type: &str, end1: &Guid, end2: &Guid) -> CatalogResult<()> {
        let body = json!({
            "relationshipType": relationship_type,
            "end1Guid": end1,
            "end2Guid": end2,
        });
        self.mutate("detach", "relationships/detach", &[], &body)
            .map(|_| ())
    }

    fn delete(&self, entity_type: &str, guid: &Guid) -> CatalogResult<()> {
        let body = json!({ "entityType": entity_type });
        let path = format!("entities/{}/delete", guid);
        self.mutate("delete", &path, &[], &body).map(|_| ())
    }

    fn render(&self, guid: &Guid, format: OutputFormat) -> CatalogResult<String> {
        let record = self
            .lookup_by_guid("Referenceable", guid)?
            .ok_or_else(|| CatalogError::not_found(format!("entity {}", guid)))?;
        Ok(render_record(&record, format))
    }
}
