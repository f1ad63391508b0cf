//! Failure taxonomy for the recorder.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the recorder. None of these are retried or swallowed;
/// each propagates to the engine from the entry point that hit it.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Could not resolve invoking user: ${override_var} is unset and the OS user lookup failed")]
    IdentityResolution { override_var: String },

    #[error("Log directory unavailable: {}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to append audit record to {}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No environment label: first host of the play has no '{variable}' variable")]
    MissingEnvironmentMetadata { variable: String },
}
