use serde::{Deserialize, Serialize};

/// Storage model for one analysis in a user's scan history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Owning user's id; not enforced as a foreign key
    pub user_id: String,

    /// "nail", "skin" or "eye"
    pub analysis_type: String,

    /// Diagnostic message shown to the user
    pub message: String,

    /// Formatted hemoglobin level, e.g. "118.5 g/L" (anemia analyses only)
    pub hb_level: Option<String>,

    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// Input data for recording an analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    pub user_id: String,
    pub analysis_type: String,
    pub message: String,
    pub hb_level: Option<String>,
}
