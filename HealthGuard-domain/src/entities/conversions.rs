use health_guard_data::models::{HistoryRecord, NewHistoryRecord, NewUserRecord, UserRecord};

use crate::analysis::{AnalysisType, Sex};
use crate::entities::{HistoryEntry, User};

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Convert a stored user into the domain entity.
///
/// Fails when the stored sex code is not one the domain understands.
pub fn convert_to_domain_user(record: UserRecord) -> Result<User, String> {
    let sex = record
        .sex
        .parse::<Sex>()
        .map_err(|_| format!("User {} has invalid stored sex '{}'", record.id, record.sex))?;

    Ok(User {
        id: record.id,
        email: record.email,
        first_name: record.first_name,
        last_name: record.last_name,
        sex,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

/// Build the storage input for a new account
pub fn convert_to_data_new_user(
    email: &str,
    password_hash: String,
    first_name: &str,
    last_name: &str,
    sex: Sex,
) -> NewUserRecord {
    NewUserRecord {
        email: email.to_string(),
        password_hash,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        sex: sex.code().to_string(),
    }
}

pub fn convert_to_domain_history(record: HistoryRecord) -> Result<HistoryEntry, String> {
    let analysis_type = record.analysis_type.parse::<AnalysisType>().map_err(|_| {
        format!(
            "History entry {} has invalid analysis type '{}'",
            record.id, record.analysis_type
        )
    })?;

    Ok(HistoryEntry {
        id: record.id,
        user_id: record.user_id,
        analysis_type,
        message: record.message,
        hb_level: record.hb_level,
        created_at: record.created_at,
    })
}

pub fn convert_to_data_new_history(
    user_id: &str,
    analysis_type: AnalysisType,
    message: &str,
    hb_level: Option<&str>,
) -> NewHistoryRecord {
    NewHistoryRecord {
        user_id: user_id.to_string(),
        analysis_type: analysis_type.as_str().to_string(),
        message: message.to_string(),
        hb_level: hb_level.map(str::to_string),
    }
}
