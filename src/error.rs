use reqwest::StatusCode;

use crate::status::CPU_FIELDS;

/// Why a status refresh did not update the bar.
///
/// Every failure leaves the display slots untouched; the caller decides
/// whether to log, show a stale marker, or exit.
#[derive(Debug, thiserror::Error)]
pub enum RefreshFailure {
    #[error("procmon request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("procmon endpoint returned {0}")]
    Status(StatusCode),

    #[error("invalid procmon response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("procmon response has {found} cpu entries, need at least {}", CPU_FIELDS)]
    MissingCpu { found: usize },
}

impl RefreshFailure {
    /// Short label for the status bar's stale marker.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "unreachable",
            Self::Status(_) => "bad status",
            Self::Decode(_) => "bad payload",
            Self::MissingCpu { .. } => "short cpu list",
        }
    }
}
