// Company Database Model
// One company per employer account

use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::pagination::{contains_pattern, PageQuery};
use crate::schema::companies;
use crate::utils::validation::{clearable, trim_optional_field, validate_http_url};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Company {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub founded_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = companies)]
pub struct NewCompany {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub founded_year: Option<i32>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = companies)]
pub struct CompanyChangeset {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub industry: Option<Option<String>>,
    pub size: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub logo_url: Option<Option<String>>,
    pub founded_year: Option<Option<i32>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 255, message = "Company name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 5000, message = "Description must be less than 5000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 255), custom = "validate_http_url")]
    pub website: Option<String>,

    #[validate(length(max = 120))]
    pub industry: Option<String>,

    #[validate(length(max = 50))]
    pub size: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(max = 2048), custom = "validate_http_url")]
    pub logo_url: Option<String>,

    #[validate(range(min = 1800, max = 2100, message = "Founded year is out of range"))]
    pub founded_year: Option<i32>,
}

impl CreateCompanyRequest {
    pub fn into_new_company(self, owner_id: Uuid) -> NewCompany {
        NewCompany {
            owner_id,
            name: self.name.trim().to_string(),
            description: trim_optional_field(self.description.as_ref()),
            website: trim_optional_field(self.website.as_ref()),
            industry: trim_optional_field(self.industry.as_ref()),
            size: trim_optional_field(self.size.as_ref()),
            location: trim_optional_field(self.location.as_ref()),
            logo_url: trim_optional_field(self.logo_url.as_ref()),
            founded_year: self.founded_year,
        }
    }
}

/// PUT /companies/{id} body. Omitted fields stay; empty strings clear.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 255, message = "Company name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(max = 255), custom = "validate_http_url")]
    pub website: Option<String>,

    #[validate(length(max = 120))]
    pub industry: Option<String>,

    #[validate(length(max = 50))]
    pub size: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(max = 2048), custom = "validate_http_url")]
    pub logo_url: Option<String>,

    #[validate(range(min = 1800, max = 2100, message = "Founded year is out of range"))]
    pub founded_year: Option<i32>,
}

impl UpdateCompanyRequest {
    pub fn into_changeset(self) -> CompanyChangeset {
        CompanyChangeset {
            name: trim_optional_field(self.name.as_ref()),
            description: clearable(self.description),
            website: clearable(self.website),
            industry: clearable(self.industry),
            size: clearable(self.size),
            location: clearable(self.location),
            logo_url: clearable(self.logo_url),
            founded_year: self.founded_year.map(Some),
            updated_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub founded_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(c: Company) -> Self {
        Self {
            id: c.id,
            owner_id: c.owner_id,
            name: c.name,
            description: c.description,
            website: c.website,
            industry: c.industry,
            size: c.size,
            location: c.location,
            logo_url: c.logo_url,
            founded_year: c.founded_year,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

fn search_query<'a>(search: Option<&str>) -> companies::BoxedQuery<'a, Pg> {
    let mut query = companies::table.into_boxed();
    if let Some(pattern) = search.and_then(contains_pattern) {
        query = query.filter(
            companies::name
                .ilike(pattern.clone())
                .or(companies::industry.ilike(pattern.clone()))
                .or(companies::location.ilike(pattern)),
        );
    }
    query
}

impl Company {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_company: NewCompany,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(companies::table)
            .values(&new_company)
            .returning(Company::as_returning())
            .get_result::<Company>(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        company_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        companies::table
            .find(company_id)
            .select(Company::as_select())
            .first::<Company>(conn)
            .await
            .optional()
    }

    pub async fn find_by_owner(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        companies::table
            .filter(companies::owner_id.eq(owner))
            .select(Company::as_select())
            .first::<Company>(conn)
            .await
            .optional()
    }

    /// Page of companies matching `search` on name, industry or location
    pub async fn search(
        conn: &mut AsyncPgConnection,
        search: Option<&str>,
        page: &PageQuery,
    ) -> Result<(Vec<Self>, i64), diesel::result::Error> {
        let total = search_query(search)
            .count()
            .get_result::<i64>(conn)
            .await?;

        let items = search_query(search)
            .order(companies::name.asc())
            .limit(page.limit())
            .offset(page.offset())
            .select(Company::as_select())
            .load::<Company>(conn)
            .await?;

        Ok((items, total))
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        company_id: Uuid,
        changes: &CompanyChangeset,
    ) -> Result<Self, diesel::result::Error> {
        diesel::update(companies::table.find(company_id))
            .set(changes)
            .returning(Company::as_returning())
            .get_result::<Company>(conn)
            .await
    }

    /// Jobs, applications and saved jobs go with it (ON DELETE CASCADE)
    pub async fn delete(
        conn: &mut AsyncPgConnection,
        company_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(companies::table.find(company_id))
            .execute(conn)
            .await
    }

    pub async fn count_all(conn: &mut AsyncPgConnection) -> Result<i64, diesel::result::Error> {
        companies::table.count().get_result::<i64>(conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateCompanyRequest {
        CreateCompanyRequest {
            name: " Acme ".to_string(),
            description: Some("Rockets".to_string()),
            website: Some("https://acme.example".to_string()),
            industry: None,
            size: Some("  ".to_string()),
            location: None,
            logo_url: None,
            founded_year: Some(1999),
        }
    }

    #[test]
    fn test_create_request_trims() {
        let owner = Uuid::new_v4();
        let new_company = create_request().into_new_company(owner);
        assert_eq!(new_company.name, "Acme");
        assert_eq!(new_company.owner_id, owner);
        assert_eq!(new_company.size, None);
        assert_eq!(new_company.founded_year, Some(1999));
    }

    #[test]
    fn test_create_request_validation() {
        assert!(create_request().validate().is_ok());

        let bad_site = CreateCompanyRequest {
            website: Some("javascript:alert(1)".to_string()),
            ..create_request()
        };
        assert!(bad_site.validate().is_err());

        let bad_year = CreateCompanyRequest {
            founded_year: Some(1200),
            ..create_request()
        };
        assert!(bad_year.validate().is_err());
    }

    #[test]
    fn test_update_changeset_skips_absent_fields() {
        let changes = UpdateCompanyRequest {
            location: Some("".to_string()),
            ..Default::default()
        }
        .into_changeset();

        assert_eq!(changes.location, Some(None));
        assert!(changes.name.is_none());
        assert!(changes.website.is_none());
        assert!(changes.updated_at.is_some());
    }
}
