// Own-profile read and partial update

use diesel_async::AsyncPgConnection;
use tracing::instrument;
use validator::Validate;

use crate::db::DieselPool;
use crate::models::{AuthenticatedUser, Profile, ProfileResponse, UpdateProfileRequest};
use crate::utils::ServiceError;

#[derive(Clone)]
pub struct ProfileService {
    pool: DieselPool,
}

/// Sign-up creates the row; accounts provisioned elsewhere get one on first access
async fn find_or_create(
    conn: &mut AsyncPgConnection,
    user: &AuthenticatedUser,
) -> Result<Profile, ServiceError> {
    match Profile::find_by_user(conn, user.user_id).await? {
        Some(profile) => Ok(profile),
        None => Ok(Profile::create_empty(conn, user.user_id, "").await?),
    }
}

impl ProfileService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    pub async fn get_own(&self, user: &AuthenticatedUser) -> Result<ProfileResponse, ServiceError> {
        let mut conn = self.pool.get().await?;
        Ok(find_or_create(&mut conn, user).await?.into())
    }

    #[instrument(skip(self, request), fields(user_id = %user.user_id))]
    pub async fn update_own(
        &self,
        user: &AuthenticatedUser,
        request: UpdateProfileRequest,
    ) -> Result<ProfileResponse, ServiceError> {
        request.validate()?;

        let mut conn = self.pool.get().await?;
        find_or_create(&mut conn, user).await?;

        let updated =
            Profile::update_for_user(&mut conn, user.user_id, &request.into_changeset()).await?;
        Ok(updated.into())
    }
}
