use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisType;
use super::user::User;

/// One recorded analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub user_id: String,
    pub analysis_type: AnalysisType,
    pub message: String,
    /// Present for nail and eye analyses
    pub hb_level: Option<String>,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// Everything stored about a user, for download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataExport {
    pub user: User,
    /// Newest first
    pub history: Vec<HistoryEntry>,
    pub exported_at: DateTime<Utc>,
}
