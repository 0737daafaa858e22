//! Person procedures and the detection half of identity reconciliation

use sqlx::SqliteConnection;

use crate::api::types::{normalize_optional, Person, PersonSnapshot, PersonUpdatePayload};
use crate::db::gateway::{Procedure, StoreCode, StoreError, StoreResult};
use crate::db::models::PersonRow;

/// Outcome of a role-creation procedure (`sp_CreateContributor`, `sp_CreateEmployee`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCreation {
    /// Role record id: newly created, or already attached to a matching person
    pub role_id: Option<i64>,
    pub person_nif: String,
    /// Person row existed before the call
    pub existing: bool,
    /// Existing person's fields differ from the submission; nothing was written
    pub conflict: bool,
}

/// How a submitted person relates to the stored one
#[derive(Debug)]
pub(crate) enum PersonResolution {
    Inserted,
    Matching(PersonSnapshot),
    Conflicting(PersonSnapshot),
}

pub(crate) async fn fetch_person(
    conn: &mut SqliteConnection,
    nif: &str,
) -> StoreResult<Option<PersonSnapshot>> {
    let row = sqlx::query_as::<_, PersonRow>(
        r#"
        SELECT p.nif, p.name, p.date_of_birth, p.email, p.phone_number,
               c.contributor_id, e.employee_id
        FROM person p
        LEFT JOIN contributor c ON c.nif = p.nif
        LEFT JOIN employee e ON e.nif = p.nif
        WHERE p.nif = ?1
        "#,
    )
    .bind(nif)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(PersonSnapshot::from))
}

pub(crate) async fn person_exists(conn: &mut SqliteConnection, nif: &str) -> StoreResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM person WHERE nif = ?1")
        .bind(nif)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Insert the person when absent, otherwise compare it with the stored row
pub(crate) async fn resolve_person(
    conn: &mut SqliteConnection,
    person: &Person,
) -> StoreResult<PersonResolution> {
    match fetch_person(conn, &person.nif).await? {
        Some(stored) if stored.person.same_fields(person) => Ok(PersonResolution::Matching(stored)),
        Some(stored) => Ok(PersonResolution::Conflicting(stored)),
        None => {
            sqlx::query(
                "INSERT INTO person (nif, name, date_of_birth, email, phone_number) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&person.nif)
            .bind(&person.name)
            .bind(person.date_of_birth)
            .bind(&person.email)
            .bind(&person.phone_number)
            .execute(&mut *conn)
            .await?;
            Ok(PersonResolution::Inserted)
        }
    }
}

/// Overwrite the descriptive fields of a person; NIF stays
pub(crate) async fn write_person_fields(
    conn: &mut SqliteConnection,
    person: &Person,
) -> StoreResult<u64> {
    let result = sqlx::query(
        "UPDATE person SET name = ?2, date_of_birth = ?3, email = ?4, phone_number = ?5 WHERE nif = ?1",
    )
    .bind(&person.nif)
    .bind(&person.name)
    .bind(person.date_of_birth)
    .bind(&person.email)
    .bind(&person.phone_number)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// `sp_GetPersonByNIF`
#[derive(Debug, Clone)]
pub struct GetPersonByNif {
    pub nif: String,
}

impl Procedure for GetPersonByNif {
    const NAME: &'static str = "sp_GetPersonByNIF";
    type Output = Option<PersonSnapshot>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        fetch_person(conn, &self.nif).await
    }
}

/// `sp_UpdatePerson`: partial update, optional rename via `NewNIF`
///
/// Returns the NIF the person is stored under afterwards. A rename cascades
/// to the contributor and employee rows through their foreign keys.
#[derive(Debug, Clone)]
pub struct UpdatePerson {
    pub nif: String,
    pub changes: PersonUpdatePayload,
}

impl Procedure for UpdatePerson {
    const NAME: &'static str = "sp_UpdatePerson";
    type Output = String;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let changes = self.changes;
        let new_nif = normalize_optional(changes.new_nif);

        let result = sqlx::query(
            r#"
            UPDATE person SET
                nif = COALESCE(?2, nif),
                name = COALESCE(?3, name),
                date_of_birth = COALESCE(?4, date_of_birth),
                email = COALESCE(?5, email),
                phone_number = COALESCE(?6, phone_number)
            WHERE nif = ?1
            "#,
        )
        .bind(&self.nif)
        .bind(&new_nif)
        .bind(normalize_optional(changes.name))
        .bind(changes.date_of_birth)
        .bind(normalize_optional(changes.email))
        .bind(normalize_optional(changes.phone_number))
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::signal(
                StoreCode::PersonNotFound,
                format!("Person with NIF {} not found", self.nif),
            ));
        }

        Ok(new_nif.unwrap_or(self.nif))
    }
}

/// `sp_OverwritePerson`: replace all descriptive fields of an existing person
#[derive(Debug, Clone)]
pub struct OverwritePerson {
    pub person: Person,
}

impl Procedure for OverwritePerson {
    const NAME: &'static str = "sp_OverwritePerson";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        if write_person_fields(conn, &self.person).await? == 0 {
            return Err(StoreError::signal(
                StoreCode::PersonNotFound,
                format!("Person with NIF {} not found", self.person.nif),
            ));
        }
        Ok(())
    }
}
