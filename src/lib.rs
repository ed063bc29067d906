//! Goliath Rust Backend
//!
//! Builds a patched Go toolchain from source: download a release's source
//! archive, rewrite a handful of linker sources so that dead-code elimination
//! keeps every symbol, then run the toolchain's own `make.bash`.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Versions, workspace layout and patch outcomes
//! - **config**: Settings file, environment overrides and host checks
//! - **log_collector**: Console logger with the custom `SUCCESS` level
//! - **toolchain**: Source fetching and linker patching
//! - **orchestrator**: Stage sequencing and build execution
//! - **cli**: Argument parsing and exit status mapping

// Core foundational modules
pub mod error;
pub mod models;

pub mod config;
pub mod log_collector;

pub mod toolchain;
pub mod orchestrator;

pub mod cli;

// Re-export the log crate for macro usage
pub use log;

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{BuildError, ConfigError, FetchError, GoliathError, PatchError, Result};

pub use models::{BuildPhase, GoVersion, PatchOutcome, PatchRecord, PatchReport, Workspace};

pub use config::GoliathConfig;

pub use log_collector::{LogCollector, LogLevel, LogLine};

pub use orchestrator::{MakeBashBuilder, Pipeline, PipelineSummary, SourceFetcher, ToolchainBuilder};

pub use toolchain::sources::HttpSourceFetcher;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_error_reexport() {
        let _: Result<i32> = Ok(42);
    }

    #[test]
    fn test_enum_variants_accessible() {
        assert_eq!(BuildPhase::Patching, BuildPhase::Patching);
        assert_eq!(LogLevel::Success.label(), "SUCCESS");
    }
}
