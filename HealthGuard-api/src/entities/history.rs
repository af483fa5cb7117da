use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_guard_domain::analysis::AnalysisType;
use health_guard_domain::entities::{DataExport, HistoryEntry};

use super::user::PublicUser;

/// One analysis on record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicHistoryEntry {
    pub id: String,
    pub user_id: String,
    pub analysis_type: AnalysisType,
    pub message: String,
    /// Present for nail and eye analyses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hb_level: Option<String>,
    pub created_at: String,
}

impl From<HistoryEntry> for PublicHistoryEntry {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            analysis_type: entry.analysis_type,
            message: entry.message,
            hb_level: entry.hb_level,
            created_at: entry.created_at,
        }
    }
}

/// Result of clearing the caller's history
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicDeleteHistoryResponse {
    pub message: String,
    pub deleted: usize,
}

/// Downloadable copy of everything stored about the caller
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicDataExport {
    pub user: PublicUser,
    pub history: Vec<PublicHistoryEntry>,
    pub exported_at: DateTime<Utc>,
}

impl From<DataExport> for PublicDataExport {
    fn from(export: DataExport) -> Self {
        Self {
            user: export.user.into(),
            history: export.history.into_iter().map(Into::into).collect(),
            exported_at: export.exported_at,
        }
    }
}
