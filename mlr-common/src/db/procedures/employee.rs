//! Employee procedures

use sqlx::SqliteConnection;

use super::like_filter;
use super::person::{person_exists, resolve_person, write_person_fields, PersonResolution, RoleCreation};
use super::record_label::ensure_record_label;
use crate::api::types::{Employee, EmployeeFields, Person};
use crate::db::gateway::{Procedure, StoreCode, StoreError, StoreResult};
use crate::db::models::EmployeeRow;

const SELECT_EMPLOYEES: &str = "SELECT employee_id, nif, name, date_of_birth, job_title, \
     department, salary, hire_date, email, phone_number, record_label_id, record_label_name \
     FROM vw_employees";

async fn insert_employee(
    conn: &mut SqliteConnection,
    nif: &str,
    fields: &EmployeeFields,
) -> StoreResult<i64> {
    ensure_record_label(conn, fields.record_label_id).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO employee (nif, job_title, department, salary, hire_date, record_label_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(nif)
    .bind(&fields.job_title)
    .bind(&fields.department)
    .bind(fields.salary)
    .bind(fields.hire_date)
    .bind(fields.record_label_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// `sp_GetEmployees`: substring filters, NULL skips a filter
#[derive(Debug, Clone, Default)]
pub struct GetEmployees {
    pub nif: Option<String>,
    pub name: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Record label name
    pub label: Option<String>,
}

impl Procedure for GetEmployees {
    const NAME: &'static str = "sp_GetEmployees";
    type Output = Vec<Employee>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let sql = format!(
            "{SELECT_EMPLOYEES} WHERE {} AND {} AND {} AND {} AND {} AND {} AND {} ORDER BY employee_id",
            like_filter("nif", 1),
            like_filter("name", 2),
            like_filter("job_title", 3),
            like_filter("department", 4),
            like_filter("email", 5),
            like_filter("phone_number", 6),
            like_filter("record_label_name", 7),
        );
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(self.nif)
            .bind(self.name)
            .bind(self.job_title)
            .bind(self.department)
            .bind(self.email)
            .bind(self.phone)
            .bind(self.label)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }
}

/// `sp_GetEmployeeByID`
#[derive(Debug, Clone, Copy)]
pub struct GetEmployeeById {
    pub id: i64,
}

impl Procedure for GetEmployeeById {
    const NAME: &'static str = "sp_GetEmployeeByID";
    type Output = Option<Employee>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let sql = format!("{SELECT_EMPLOYEES} WHERE employee_id = ?1");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(self.id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(Employee::from))
    }
}

/// `sp_CreateEmployee`: same detection contract as `sp_CreateContributor`
#[derive(Debug, Clone)]
pub struct CreateEmployee {
    pub person: Person,
    pub fields: EmployeeFields,
}

impl Procedure for CreateEmployee {
    const NAME: &'static str = "sp_CreateEmployee";
    type Output = RoleCreation;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let person_nif = self.person.nif.clone();
        let resolution = resolve_person(conn, &self.person).await?;

        let creation = match resolution {
            PersonResolution::Inserted => RoleCreation {
                role_id: Some(insert_employee(conn, &person_nif, &self.fields).await?),
                person_nif,
                existing: false,
                conflict: false,
            },
            PersonResolution::Matching(stored) => RoleCreation {
                role_id: stored.employee_id,
                person_nif,
                existing: true,
                conflict: false,
            },
            PersonResolution::Conflicting(_) => RoleCreation {
                role_id: None,
                person_nif,
                existing: true,
                conflict: true,
            },
        };
        Ok(creation)
    }
}

/// `sp_AddEmployeeFromExistingPerson`
#[derive(Debug, Clone)]
pub struct AddEmployeeFromExistingPerson {
    pub nif: String,
    pub fields: EmployeeFields,
}

impl Procedure for AddEmployeeFromExistingPerson {
    const NAME: &'static str = "sp_AddEmployeeFromExistingPerson";
    type Output = i64;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        if !person_exists(conn, &self.nif).await? {
            return Err(StoreError::signal(
                StoreCode::PersonNotFound,
                format!("Person with NIF {} not found", self.nif),
            ));
        }
        insert_employee(conn, &self.nif, &self.fields).await
    }
}

/// `sp_UpdateEmployee`: person fields and employment fields in place
#[derive(Debug, Clone)]
pub struct UpdateEmployee {
    pub id: i64,
    pub person: Person,
    pub fields: EmployeeFields,
}

impl Procedure for UpdateEmployee {
    const NAME: &'static str = "sp_UpdateEmployee";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let stored_nif: String =
            sqlx::query_scalar("SELECT nif FROM employee WHERE employee_id = ?1")
                .bind(self.id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| {
                    StoreError::signal(
                        StoreCode::EmployeeNotFound,
                        format!("Employee {} not found", self.id),
                    )
                })?;

        if !self.person.nif.is_empty() && self.person.nif != stored_nif {
            return Err(StoreError::signal(
                StoreCode::NifImmutable,
                "NIF cannot be changed here; use PUT /api/persons/{nif} with NewNIF",
            ));
        }

        ensure_record_label(conn, self.fields.record_label_id).await?;

        let person = Person {
            nif: stored_nif,
            ..self.person
        };
        write_person_fields(conn, &person).await?;

        sqlx::query(
            r#"
            UPDATE employee SET
                job_title = ?2, department = ?3, salary = ?4, hire_date = ?5, record_label_id = ?6
            WHERE employee_id = ?1
            "#,
        )
        .bind(self.id)
        .bind(&self.fields.job_title)
        .bind(&self.fields.department)
        .bind(self.fields.salary)
        .bind(self.fields.hire_date)
        .bind(self.fields.record_label_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

/// `sp_DeleteEmployee`: the person row stays
#[derive(Debug, Clone, Copy)]
pub struct DeleteEmployee {
    pub id: i64,
}

impl Procedure for DeleteEmployee {
    const NAME: &'static str = "sp_DeleteEmployee";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let result = sqlx::query("DELETE FROM employee WHERE employee_id = ?1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::signal(
                StoreCode::EmployeeDeleteNotFound,
                format!("Employee {} not found", self.id),
            ));
        }
        Ok(())
    }
}
