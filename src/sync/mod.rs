//! Catalog synchronization: the reconciliation engine and the
//! credential-guarded trigger that runs it.

pub mod engine;
pub mod trigger;

pub use engine::{preview_catalog, CatalogSyncEngine, SyncReport};
pub use trigger::{authorize, SyncSecret, TriggerRequest, TriggerResponse};

use crate::catalog::CatalogError;
use crate::store::StoreError;
use thiserror::Error;

/// Terminal failures of a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Upstream(#[from] CatalogError),

    #[error("failed to sync course {external_id}: {source}")]
    Persistence {
        external_id: String,
        #[source]
        source: StoreError,
    },
}
