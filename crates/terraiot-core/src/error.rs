//! Library-wide errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::feed::FeedError;

/// Errors surfaced by TerraIoT collaborators
///
/// History operations never fail; everything here comes from the
/// configuration, export or power control layers.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Live feed error: {0}")]
    Feed(#[from] FeedError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export_nothing() -> Result<(), MonitorError> {
        crate::export::export_to_path("unused.csv", &[])?;
        Ok(())
    }

    #[test]
    fn test_export_error_converts() {
        let err = export_nothing().unwrap_err();
        assert!(matches!(err, MonitorError::Export(ExportError::NoData)));
        assert_eq!(err.to_string(), "Export failed: No data available to export");
    }

    #[test]
    fn test_config_error_converts() {
        let err: MonitorError = ConfigError::Invalid("bad".into()).into();
        assert_eq!(err.to_string(), "Configuration error: Invalid config: bad");
    }

    #[test]
    fn test_feed_error_converts() {
        let err: MonitorError = FeedError::Rejected("locked".into()).into();
        assert_eq!(
            err.to_string(),
            "Live feed error: Power request rejected: locked"
        );
    }
}
