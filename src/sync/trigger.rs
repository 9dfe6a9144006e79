//! Credential-guarded entry point for scheduled syncs.
//!
//! The caller presents a shared secret either as an `Authorization: Bearer`
//! header value or as a `secret` query parameter. Verification yields an
//! [`AuthDecision`]; only a granted decision carries the [`SyncGrant`]
//! needed to reach the engine.

use super::{CatalogSyncEngine, SyncError, SyncReport};
use crate::catalog::CatalogSource;
use crate::store::CatalogStore;
use serde_json::{json, Value};
use std::fmt;
use tracing::{error, info, warn};

/// The configured shared secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncSecret(String);

impl SyncSecret {
    /// An empty secret counts as "not configured".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }
}

impl fmt::Debug for SyncSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyncSecret(***)")
    }
}

/// Proof that a credential check passed.
#[derive(Debug)]
pub struct SyncGrant {
    _private: (),
}

#[derive(Debug)]
pub enum AuthDecision {
    Granted(SyncGrant),
    Denied,
}

impl AuthDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AuthDecision::Granted(_))
    }
}

/// The credential-bearing parts of a trigger call.
#[derive(Debug, Clone, Default)]
pub struct TriggerRequest {
    /// Raw `Authorization` header value.
    pub authorization: Option<String>,
    /// Value of the `secret` query parameter.
    pub query_secret: Option<String>,
}

impl TriggerRequest {
    /// The presented credential: a bearer token wins over the query value.
    pub fn credential(&self) -> Option<&str> {
        credential_from_request(self.authorization.as_deref(), self.query_secret.as_deref())
    }
}

pub fn credential_from_request<'a>(
    authorization: Option<&'a str>,
    query_secret: Option<&'a str>,
) -> Option<&'a str> {
    authorization
        .and_then(|header| header.strip_prefix("Bearer "))
        .or(query_secret)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Check a presented credential against the configured secret. With no
/// configured secret every call is denied.
pub fn authorize(expected: Option<&SyncSecret>, presented: Option<&str>) -> AuthDecision {
    match (expected, presented) {
        (Some(expected), Some(presented))
            if constant_time_eq(expected.0.as_bytes(), presented.as_bytes()) =>
        {
            AuthDecision::Granted(SyncGrant { _private: () })
        }
        _ => AuthDecision::Denied,
    }
}

/// Result of a trigger call, shaped for an HTTP-style caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerResponse {
    Synced { synced: usize },
    Unauthorized,
    Failed { message: String },
}

impl TriggerResponse {
    pub fn from_result(result: Result<SyncReport, SyncError>) -> Self {
        match result {
            Ok(report) => TriggerResponse::Synced {
                synced: report.synced,
            },
            Err(SyncError::Unauthorized) => TriggerResponse::Unauthorized,
            Err(e) => TriggerResponse::Failed {
                message: e.to_string(),
            },
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            TriggerResponse::Synced { .. } => 200,
            TriggerResponse::Unauthorized => 401,
            TriggerResponse::Failed { .. } => 500,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            TriggerResponse::Synced { synced } => json!({ "ok": true, "synced": synced }),
            TriggerResponse::Unauthorized => json!({ "error": "Unauthorized" }),
            TriggerResponse::Failed { message } => json!({ "error": message }),
        }
    }
}

/// Verify the caller, fetch the catalog and run the engine.
pub async fn run_sync<S: CatalogStore>(
    request: &TriggerRequest,
    secret: Option<&SyncSecret>,
    source: &CatalogSource,
    engine: &mut CatalogSyncEngine<S>,
) -> Result<SyncReport, SyncError> {
    let grant = match authorize(secret, request.credential()) {
        AuthDecision::Granted(grant) => grant,
        AuthDecision::Denied => {
            warn!("Rejected sync trigger: missing or invalid credential");
            return Err(SyncError::Unauthorized);
        }
    };

    sync_with_grant(grant, source, engine).await
}

async fn sync_with_grant<S: CatalogStore>(
    _grant: SyncGrant,
    source: &CatalogSource,
    engine: &mut CatalogSyncEngine<S>,
) -> Result<SyncReport, SyncError> {
    info!("Sync authorized; reading catalog from {}", source.describe());
    let items = source.fetch_courses().await.map_err(|e| {
        error!("Catalog fetch failed: {}", e);
        SyncError::Upstream(e)
    })?;

    engine.sync_catalog(&items)
}

/// [`run_sync`] folded into a response.
pub async fn handle<S: CatalogStore>(
    request: &TriggerRequest,
    secret: Option<&SyncSecret>,
    source: &CatalogSource,
    engine: &mut CatalogSyncEngine<S>,
) -> TriggerResponse {
    TriggerResponse::from_result(run_sync(request, secret, source, engine).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FileCatalog;
    use crate::store::SqliteStore;
    use tempfile::TempDir;

    fn bearer(token: &str) -> TriggerRequest {
        TriggerRequest {
            authorization: Some(format!("Bearer {}", token)),
            query_secret: None,
        }
    }

    fn catalog_file(temp_dir: &TempDir, body: &str) -> CatalogSource {
        let path = temp_dir.path().join("items.json");
        std::fs::write(&path, body).unwrap();
        CatalogSource::File(FileCatalog::new(path))
    }

    #[test]
    fn test_credential_extraction() {
        assert_eq!(credential_from_request(Some("Bearer abc"), Some("q")), Some("abc"));
        assert_eq!(credential_from_request(Some("Basic abc"), Some("q")), Some("q"));
        assert_eq!(credential_from_request(None, Some("q")), Some("q"));
        assert_eq!(credential_from_request(None, None), None);
    }

    #[test]
    fn test_authorize() {
        let secret = SyncSecret::new("s3cret");
        assert!(authorize(secret.as_ref(), Some("s3cret")).is_granted());
        assert!(!authorize(secret.as_ref(), Some("s3cre")).is_granted());
        assert!(!authorize(secret.as_ref(), None).is_granted());
        assert!(!authorize(None, Some("")).is_granted());
        assert!(SyncSecret::new("").is_none());
    }

    #[test]
    fn test_secret_is_redacted() {
        let secret = SyncSecret::new("s3cret").unwrap();
        assert!(!format!("{:?}", secret).contains("s3cret"));
    }

    #[test]
    fn test_response_bodies() {
        let ok = TriggerResponse::Synced { synced: 3 };
        assert_eq!(ok.status(), 200);
        assert_eq!(ok.body(), json!({"ok": true, "synced": 3}));

        assert_eq!(TriggerResponse::Unauthorized.status(), 401);
        assert_eq!(
            TriggerResponse::Unauthorized.body(),
            json!({"error": "Unauthorized"})
        );

        let failed = TriggerResponse::Failed {
            message: "boom".to_string(),
        };
        assert_eq!(failed.status(), 500);
        assert_eq!(failed.body(), json!({"error": "boom"}));
    }

    #[test]
    fn test_unauthorized_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let source = catalog_file(&temp_dir, r#"[{"id": "c1", "displayName": "One"}]"#);
        let mut engine = CatalogSyncEngine::new(SqliteStore::in_memory().unwrap());
        let secret = SyncSecret::new("right");

        let response =
            tokio_test::block_on(handle(&bearer("wrong"), secret.as_ref(), &source, &mut engine));

        assert_eq!(response, TriggerResponse::Unauthorized);
        assert_eq!(engine.store().course_count().unwrap(), 0);
    }

    #[test]
    fn test_query_secret_runs_sync() {
        let temp_dir = TempDir::new().unwrap();
        let source = catalog_file(
            &temp_dir,
            r#"{"items": [{"id": "c1", "displayName": "One"}, {"id": "c2", "displayName": "Two"}]}"#,
        );
        let mut engine = CatalogSyncEngine::new(SqliteStore::in_memory().unwrap());
        let request = TriggerRequest {
            authorization: None,
            query_secret: Some("right".to_string()),
        };

        let response = tokio_test::block_on(handle(
            &request,
            SyncSecret::new("right").as_ref(),
            &source,
            &mut engine,
        ));

        assert_eq!(response, TriggerResponse::Synced { synced: 2 });
        assert_eq!(engine.store().course_count().unwrap(), 2);
    }

    #[test]
    fn test_malformed_catalog_is_total_failure() {
        let temp_dir = TempDir::new().unwrap();
        let source = catalog_file(&temp_dir, "not json");
        let mut engine = CatalogSyncEngine::new(SqliteStore::in_memory().unwrap());

        let result = tokio_test::block_on(run_sync(
            &bearer("right"),
            SyncSecret::new("right").as_ref(),
            &source,
            &mut engine,
        ));

        assert!(matches!(result, Err(SyncError::Upstream(_))));
        assert_eq!(engine.store().course_count().unwrap(), 0);
        assert_eq!(TriggerResponse::from_result(result).status(), 500);
    }
}
