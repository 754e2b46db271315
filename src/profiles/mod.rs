mod candidates;
mod me;

use axum::{routing::get, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(me::my_profile).put(me::update_profile))
        .route("/candidates", get(candidates::candidates))
}

const REQUIRED_FIELDS: [&str; 5] = ["full_name", "department", "year", "gender", "instagram_handle"];

#[derive(Debug, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub gender: Option<String>,
    pub instagram_handle: Option<String>,
}

impl Profile {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            &self.full_name,
            &self.department,
            &self.year,
            &self.gender,
            &self.instagram_handle,
        ];
        REQUIRED_FIELDS
            .into_iter()
            .zip(fields)
            .filter(|(_, value)| value.as_deref().is_none_or(|v| v.is_empty()))
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Profile {
        Profile {
            id: Uuid::now_v7(),
            email: "a@campus.edu".into(),
            full_name: None,
            department: None,
            year: None,
            gender: None,
            instagram_handle: None,
        }
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let mut profile = blank();
        profile.full_name = Some("Asha".into());
        profile.department = Some("".into());
        assert!(!profile.is_complete());
        assert_eq!(
            profile.missing_fields(),
            vec!["department", "year", "gender", "instagram_handle"]
        );
    }

    #[test]
    fn all_fields_filled_is_complete() {
        let mut profile = blank();
        profile.full_name = Some("Asha".into());
        profile.department = Some("CS".into());
        profile.year = Some("3".into());
        profile.gender = Some("female".into());
        profile.instagram_handle = Some("asha".into());
        assert!(profile.is_complete());
    }
}
