// Job seeker / user profile
// One row per user, created empty at sign-up.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::schema::profiles;
use crate::utils::validation::{clearable, trim_optional_field};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub full_name: String,
}

/// Partial update; `Some(None)` clears a nullable column
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = profiles)]
pub struct ProfileChangeset {
    pub full_name: Option<String>,
    pub headline: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// PUT /profile body. Omitted fields are left as they are; empty strings clear.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 255, message = "Headline must be less than 255 characters"))]
    pub headline: Option<String>,

    #[validate(length(max = 5000, message = "Bio must be less than 5000 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(max = 50))]
    pub phone: Option<String>,

    #[validate(length(max = 50, message = "Maximum 50 skills allowed"))]
    pub skills: Option<Vec<String>>,

    #[validate(length(max = 2048))]
    pub resume_url: Option<String>,

    #[validate(length(max = 2048))]
    pub avatar_url: Option<String>,
}

impl UpdateProfileRequest {
    pub fn into_changeset(self) -> ProfileChangeset {
        ProfileChangeset {
            full_name: trim_optional_field(self.full_name.as_ref()),
            headline: clearable(self.headline),
            bio: clearable(self.bio),
            location: clearable(self.location),
            phone: clearable(self.phone),
            skills: self.skills.map(|skills| {
                skills
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            resume_url: clearable(self.resume_url),
            avatar_url: clearable(self.avatar_url),
            updated_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            full_name: p.full_name,
            headline: p.headline,
            bio: p.bio,
            location: p.location,
            phone: p.phone,
            skills: p.skills,
            resume_url: p.resume_url,
            avatar_url: p.avatar_url,
            updated_at: p.updated_at,
        }
    }
}

impl Profile {
    pub async fn create_empty(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
        full_name_val: &str,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::profiles::dsl::*;

        diesel::insert_into(profiles)
            .values(&NewProfile {
                user_id: user_id_val,
                full_name: full_name_val.trim().to_string(),
            })
            .returning(Profile::as_returning())
            .get_result::<Profile>(conn)
            .await
    }

    pub async fn find_by_user(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::profiles::dsl::*;

        profiles
            .filter(user_id.eq(user_id_val))
            .select(Profile::as_select())
            .first::<Profile>(conn)
            .await
            .optional()
    }

    pub async fn update_for_user(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
        changes: &ProfileChangeset,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::profiles::dsl::*;

        diesel::update(profiles.filter(user_id.eq(user_id_val)))
            .set(changes)
            .returning(Profile::as_returning())
            .get_result::<Profile>(conn)
            .await
    }

    /// Display names for a set of users; users without a profile are absent
    pub async fn full_names(
        conn: &mut AsyncPgConnection,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, diesel::result::Error> {
        use crate::schema::profiles::dsl::*;

        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = profiles
            .filter(user_id.eq_any(user_ids))
            .select((user_id, full_name))
            .load::<(Uuid, String)>(conn)
            .await?;

        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changeset_clears_empty_strings() {
        let req = UpdateProfileRequest {
            headline: Some("   ".to_string()),
            bio: Some(" Rustacean ".to_string()),
            skills: Some(vec!["rust".into(), " ".into(), " sql ".into()]),
            ..Default::default()
        };
        let changes = req.into_changeset();

        assert_eq!(changes.headline, Some(None));
        assert_eq!(changes.bio, Some(Some("Rustacean".to_string())));
        assert_eq!(changes.skills, Some(vec!["rust".to_string(), "sql".to_string()]));
        // Untouched fields stay out of the UPDATE
        assert_eq!(changes.location, None);
        assert_eq!(changes.full_name, None);
    }

    #[test]
    fn test_update_request_rejects_empty_name() {
        let req = UpdateProfileRequest {
            full_name: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
