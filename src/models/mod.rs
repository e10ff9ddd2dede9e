/// Implements Diesel `Text` conversion for an enum that already provides
/// `as_str()` and `FromStr`. Stored values are the upper-case wire names.
macro_rules! impl_text_sql {
    ($ty:ty) => {
        impl<DB> diesel::deserialize::FromSql<diesel::sql_types::Text, DB> for $ty
        where
            DB: diesel::backend::Backend,
            String: diesel::deserialize::FromSql<diesel::sql_types::Text, DB>,
        {
            fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
                let value = String::from_sql(bytes)?;
                <$ty as std::str::FromStr>::from_str(&value).map_err(|e| e.into())
            }
        }

        impl<DB> diesel::serialize::ToSql<diesel::sql_types::Text, DB> for $ty
        where
            DB: diesel::backend::Backend,
            str: diesel::serialize::ToSql<diesel::sql_types::Text, DB>,
        {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, DB>,
            ) -> diesel::serialize::Result {
                self.as_str().to_sql(out)
            }
        }
    };
}

pub mod application;
pub mod auth;
pub mod company;
pub mod job;
pub mod pagination;
pub mod profile;
pub mod refresh_token;
pub mod revoked_token;
pub mod saved_job;
pub mod user;
pub mod verification_ledger;

// Re-export common types
pub use application::{
    Application, ApplicationStatus, ApplicationResponse, ApplyRequest, NewApplication,
    UpdateApplicationStatusRequest,
};
pub use auth::*;
pub use company::{
    Company, CompanyChangeset, CompanyResponse, CreateCompanyRequest, NewCompany,
    UpdateCompanyRequest,
};
pub use job::{
    CreateJobRequest, Job, JobChangeset, JobFilter, JobResponse, JobType, NewJob,
    UpdateJobRequest,
};
pub use pagination::{PageQuery, Paginated, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use profile::{NewProfile, Profile, ProfileChangeset, ProfileResponse, UpdateProfileRequest};
pub use refresh_token::*;
pub use revoked_token::*;
pub use saved_job::{NewSavedJob, SavedJob, SavedJobResponse};
pub use user::*;
pub use verification_ledger::*;
