//! Contributor procedures

use sqlx::SqliteConnection;

use super::like_filter;
use super::person::{person_exists, resolve_person, write_person_fields, PersonResolution, RoleCreation};
use crate::api::types::{Contributor, ContributorDependencies, ContributorFields, Person};
use crate::db::gateway::{Procedure, StoreCode, StoreError, StoreResult};
use crate::db::models::{ContributorDependencyRow, ContributorRow};

const SELECT_CONTRIBUTORS: &str = "SELECT contributor_id, nif, name, date_of_birth, email, \
     phone_number, record_label_name, roles FROM vw_contributors";

fn not_found(id: i64) -> StoreError {
    StoreError::signal(
        StoreCode::ContributorNotFound,
        format!("Contributor {id} not found"),
    )
}

async fn insert_contributor(
    conn: &mut SqliteConnection,
    nif: &str,
    fields: &ContributorFields,
) -> StoreResult<i64> {
    let result = sqlx::query("INSERT INTO contributor (nif, roles) VALUES (?1, ?2)")
        .bind(nif)
        .bind(fields.roles.joined())
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Contributor id for a person NIF, signalling 50041 when there is none
pub(crate) async fn contributor_id_by_nif(
    conn: &mut SqliteConnection,
    nif: &str,
) -> StoreResult<i64> {
    sqlx::query_scalar("SELECT contributor_id FROM contributor WHERE nif = ?1")
        .bind(nif)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            StoreError::signal(
                StoreCode::ReferencedContributorNotFound,
                format!("No contributor with NIF {nif}"),
            )
        })
}

/// `sp_GetContributors`: substring filters, NULL skips a filter
#[derive(Debug, Clone, Default)]
pub struct GetContributors {
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Procedure for GetContributors {
    const NAME: &'static str = "sp_GetContributors";
    type Output = Vec<Contributor>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let sql = format!(
            "{SELECT_CONTRIBUTORS} WHERE {} AND {} AND {} AND {} ORDER BY contributor_id",
            like_filter("name", 1),
            like_filter("roles", 2),
            like_filter("email", 3),
            like_filter("phone_number", 4),
        );
        let rows = sqlx::query_as::<_, ContributorRow>(&sql)
            .bind(self.name)
            .bind(self.role)
            .bind(self.email)
            .bind(self.phone)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(Contributor::from).collect())
    }
}

/// `sp_GetContributorByID`
#[derive(Debug, Clone, Copy)]
pub struct GetContributorById {
    pub id: i64,
}

impl Procedure for GetContributorById {
    const NAME: &'static str = "sp_GetContributorByID";
    type Output = Option<Contributor>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let sql = format!("{SELECT_CONTRIBUTORS} WHERE contributor_id = ?1");
        let row = sqlx::query_as::<_, ContributorRow>(&sql)
            .bind(self.id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(Contributor::from))
    }
}

/// `sp_CreateContributor`
///
/// Inserts person and contributor when the NIF is new. An existing person
/// with differing fields is reported as a conflict and nothing is written.
/// An identical existing person is reported with its current contributor
/// id, which is `None` when it has no contributor record yet.
#[derive(Debug, Clone)]
pub struct CreateContributor {
    pub person: Person,
    pub fields: ContributorFields,
}

impl Procedure for CreateContributor {
    const NAME: &'static str = "sp_CreateContributor";
    type Output = RoleCreation;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let person_nif = self.person.nif.clone();
        match resolve_person(conn, &self.person).await? {
            PersonResolution::Inserted => {
                let id = insert_contributor(conn, &person_nif, &self.fields).await?;
                Ok(RoleCreation {
                    role_id: Some(id),
                    person_nif,
                    existing: false,
                    conflict: false,
                })
            }
            PersonResolution::Matching(stored) => Ok(RoleCreation {
                role_id: stored.contributor_id,
                person_nif,
                existing: true,
                conflict: false,
            }),
            PersonResolution::Conflicting(_) => Ok(RoleCreation {
                role_id: None,
                person_nif,
                existing: true,
                conflict: true,
            }),
        }
    }
}

/// `sp_AddContributorFromExistingPerson`
///
/// A second contributor for the same person violates UNIQUE(nif).
#[derive(Debug, Clone)]
pub struct AddContributorFromExistingPerson {
    pub nif: String,
    pub fields: ContributorFields,
}

impl Procedure for AddContributorFromExistingPerson {
    const NAME: &'static str = "sp_AddContributorFromExistingPerson";
    type Output = i64;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        if !person_exists(conn, &self.nif).await? {
            return Err(StoreError::signal(
                StoreCode::PersonNotFound,
                format!("Person with NIF {} not found", self.nif),
            ));
        }
        insert_contributor(conn, &self.nif, &self.fields).await
    }
}

/// `sp_UpdateContributor`: person fields and roles in place
///
/// `person.nif` empty means "keep"; a different NIF is rejected because
/// renames go through the person endpoint.
#[derive(Debug, Clone)]
pub struct UpdateContributor {
    pub id: i64,
    pub person: Person,
    pub fields: ContributorFields,
}

impl Procedure for UpdateContributor {
    const NAME: &'static str = "sp_UpdateContributor";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let stored_nif: String =
            sqlx::query_scalar("SELECT nif FROM contributor WHERE contributor_id = ?1")
                .bind(self.id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| not_found(self.id))?;

        if !self.person.nif.is_empty() && self.person.nif != stored_nif {
            return Err(StoreError::signal(
                StoreCode::NifImmutable,
                "NIF cannot be changed here; use PUT /api/persons/{nif} with NewNIF",
            ));
        }

        let person = Person {
            nif: stored_nif,
            ..self.person
        };
        write_person_fields(conn, &person).await?;

        sqlx::query("UPDATE contributor SET roles = ?2 WHERE contributor_id = ?1")
            .bind(self.id)
            .bind(self.fields.roles.joined())
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

/// `sp_DeleteContributor`: the person row stays
#[derive(Debug, Clone, Copy)]
pub struct DeleteContributor {
    pub id: i64,
}

impl Procedure for DeleteContributor {
    const NAME: &'static str = "sp_DeleteContributor";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let result = sqlx::query("DELETE FROM contributor WHERE contributor_id = ?1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(self.id));
        }
        Ok(())
    }
}

/// `sp_GetContributorDependencies`
#[derive(Debug, Clone, Copy)]
pub struct GetContributorDependencies {
    pub id: i64,
}

impl Procedure for GetContributorDependencies {
    const NAME: &'static str = "sp_GetContributorDependencies";
    type Output = ContributorDependencies;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let row = sqlx::query_as::<_, ContributorDependencyRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM collaboration_contributor WHERE contributor_id = c.contributor_id) AS collaboration_count,
                (SELECT COUNT(*) FROM song_contributor WHERE contributor_id = c.contributor_id) AS song_count
            FROM contributor c
            WHERE c.contributor_id = ?1
            "#,
        )
        .bind(self.id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found(self.id))?;

        Ok(row.into())
    }
}
