//! Identity reconciliation for role-record creation
//!
//! Creating a Contributor or Employee carries a full person payload. The
//! person is matched by NIF and the request ends in one of:
//!
//! - `Created`: new person and role, role attached to an existing person,
//!   or person overwritten first and then attached
//! - `Conflict`: the stored person differs from the submission; nothing
//!   is written and the client decides between `useOldPerson` and
//!   `overwritePerson`
//!
//! Each step is its own store call and commits on its own. If the process
//! stops between an overwrite and the attach, the person stays updated
//! without the role; resubmitting with `useOldPerson=true` completes it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mlr_common::api::types::{ContributorFields, EmployeeFields, Person, PersonSnapshot};
use mlr_common::db::procedures::contributor::{AddContributorFromExistingPerson, CreateContributor};
use mlr_common::db::procedures::employee::{AddEmployeeFromExistingPerson, CreateEmployee};
use mlr_common::db::procedures::person::{GetPersonByNif, OverwritePerson};
use mlr_common::db::procedures::RoleCreation;
use mlr_common::db::Procedure;
use mlr_common::{Gateway, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};

/// A role table attached to a person
pub trait RoleKind {
    /// Role name used in logs and messages
    const ROLE: &'static str;

    type Fields: Clone + Serialize + Send + Sync + 'static;
    type Create: Procedure<Output = RoleCreation>;
    type Attach: Procedure<Output = i64>;

    fn create(person: Person, fields: Self::Fields) -> Self::Create;
    fn attach(nif: String, fields: Self::Fields) -> Self::Attach;
    fn existing_role(snapshot: &PersonSnapshot) -> Option<i64>;
}

pub struct ContributorRole;

impl RoleKind for ContributorRole {
    const ROLE: &'static str = "contributor";

    type Fields = ContributorFields;
    type Create = CreateContributor;
    type Attach = AddContributorFromExistingPerson;

    fn create(person: Person, fields: ContributorFields) -> CreateContributor {
        CreateContributor { person, fields }
    }

    fn attach(nif: String, fields: ContributorFields) -> AddContributorFromExistingPerson {
        AddContributorFromExistingPerson { nif, fields }
    }

    fn existing_role(snapshot: &PersonSnapshot) -> Option<i64> {
        snapshot.contributor_id
    }
}

pub struct EmployeeRole;

impl RoleKind for EmployeeRole {
    const ROLE: &'static str = "employee";

    type Fields = EmployeeFields;
    type Create = CreateEmployee;
    type Attach = AddEmployeeFromExistingPerson;

    fn create(person: Person, fields: EmployeeFields) -> CreateEmployee {
        CreateEmployee { person, fields }
    }

    fn attach(nif: String, fields: EmployeeFields) -> AddEmployeeFromExistingPerson {
        AddEmployeeFromExistingPerson { nif, fields }
    }

    fn existing_role(snapshot: &PersonSnapshot) -> Option<i64> {
        snapshot.employee_id
    }
}

/// `useOldPerson` / `overwritePerson` query modifiers as sent by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonModeQuery {
    #[serde(rename = "useOldPerson")]
    pub use_old_person: Option<String>,
    #[serde(rename = "overwritePerson")]
    pub overwrite_person: Option<String>,
}

/// Client-selected reconciliation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersonMode {
    pub use_old_person: bool,
    /// Implies `use_old_person`
    pub overwrite_person: bool,
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

impl From<PersonModeQuery> for PersonMode {
    fn from(query: PersonModeQuery) -> Self {
        PersonMode {
            use_old_person: flag(query.use_old_person.as_deref()),
            overwrite_person: flag(query.overwrite_person.as_deref()),
        }
    }
}

/// How the role record came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePath {
    /// Person and role both created
    NewPerson,
    /// Role attached to a person that already existed
    AttachedToExisting,
    /// Person fields overwritten, then role attached
    Overwritten,
    /// Matching person already had this role; nothing written
    AlreadyPresent,
}

impl ReconcilePath {
    pub fn status(self) -> StatusCode {
        match self {
            ReconcilePath::AlreadyPresent => StatusCode::OK,
            _ => StatusCode::CREATED,
        }
    }
}

/// 409 body: stored person next to the submission
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonConflict {
    pub message: String,
    pub existing_person: PersonSnapshot,
    pub incoming_data: Value,
}

impl IntoResponse for PersonConflict {
    fn into_response(self) -> Response {
        (StatusCode::CONFLICT, Json(self)).into_response()
    }
}

#[derive(Debug)]
pub enum Reconciled {
    Created { role_id: i64, path: ReconcilePath },
    Conflict(PersonConflict),
}

/// Create a role record for the submitted person under the given mode
pub async fn reconcile<R: RoleKind>(
    gateway: &Gateway,
    person: Person,
    fields: R::Fields,
    mode: PersonMode,
) -> ApiResult<Reconciled> {
    if mode.overwrite_person {
        gateway
            .call(OverwritePerson {
                person: person.clone(),
            })
            .await?;
        info!(nif = %person.nif, role = R::ROLE, "Person overwritten with submitted fields");
    }

    if mode.use_old_person || mode.overwrite_person {
        let role_id = gateway.call(R::attach(person.nif.clone(), fields)).await?;
        let path = if mode.overwrite_person {
            ReconcilePath::Overwritten
        } else {
            ReconcilePath::AttachedToExisting
        };
        info!(nif = %person.nif, role = R::ROLE, role_id, "Role attached to existing person");
        return Ok(Reconciled::Created { role_id, path });
    }

    match gateway.call(R::create(person.clone(), fields.clone())).await {
        Ok(creation) => settle::<R>(gateway, person, fields, creation).await,
        Err(StoreError::Integrity(detail)) => {
            late_conflict::<R>(gateway, person, fields, detail).await
        }
        Err(err) => Err(err.into()),
    }
}

/// Interpret the detection result of the create procedure
async fn settle<R: RoleKind>(
    gateway: &Gateway,
    person: Person,
    fields: R::Fields,
    creation: RoleCreation,
) -> ApiResult<Reconciled> {
    if creation.conflict {
        let stored = fetch_snapshot(gateway, &creation.person_nif).await?.ok_or_else(|| {
            ApiError::Internal(format!(
                "Conflict reported for NIF {} but no person row found",
                creation.person_nif
            ))
        })?;
        return conflict::<R>(stored, &person, &fields);
    }

    match (creation.role_id, creation.existing) {
        (Some(role_id), false) => {
            info!(nif = %creation.person_nif, role = R::ROLE, role_id, "Person and role created");
            Ok(Reconciled::Created {
                role_id,
                path: ReconcilePath::NewPerson,
            })
        }
        (Some(role_id), true) => {
            debug!(nif = %creation.person_nif, role = R::ROLE, role_id, "Role already present");
            Ok(Reconciled::Created {
                role_id,
                path: ReconcilePath::AlreadyPresent,
            })
        }
        (None, true) => {
            debug!(nif = %creation.person_nif, role = R::ROLE, "Person matches; attaching role");
            let role_id = gateway.call(R::attach(creation.person_nif, fields)).await?;
            Ok(Reconciled::Created {
                role_id,
                path: ReconcilePath::AttachedToExisting,
            })
        }
        (None, false) => Err(ApiError::Internal(format!(
            "{} creation for NIF {} returned no id",
            R::ROLE,
            creation.person_nif
        ))),
    }
}

/// A concurrent request won the race between detection and write
///
/// Treated like the detection outcome it would have produced.
async fn late_conflict<R: RoleKind>(
    gateway: &Gateway,
    person: Person,
    fields: R::Fields,
    detail: String,
) -> ApiResult<Reconciled> {
    let Some(stored) = fetch_snapshot(gateway, &person.nif).await? else {
        return Err(ApiError::Integrity(detail));
    };
    warn!(nif = %person.nif, role = R::ROLE, "Integrity violation during create; re-evaluating");

    if !stored.person.same_fields(&person) {
        return conflict::<R>(stored, &person, &fields);
    }

    match R::existing_role(&stored) {
        Some(role_id) => Ok(Reconciled::Created {
            role_id,
            path: ReconcilePath::AlreadyPresent,
        }),
        None => {
            let role_id = gateway.call(R::attach(person.nif, fields)).await?;
            Ok(Reconciled::Created {
                role_id,
                path: ReconcilePath::AttachedToExisting,
            })
        }
    }
}

async fn fetch_snapshot(gateway: &Gateway, nif: &str) -> ApiResult<Option<PersonSnapshot>> {
    Ok(gateway
        .call(GetPersonByNif {
            nif: nif.to_string(),
        })
        .await?)
}

fn conflict<R: RoleKind>(
    stored: PersonSnapshot,
    person: &Person,
    fields: &R::Fields,
) -> ApiResult<Reconciled> {
    info!(nif = %person.nif, role = R::ROLE, "Submitted person conflicts with stored person");
    Ok(Reconciled::Conflict(PersonConflict {
        message: format!(
            "A person with NIF {} already exists with different details. \
             Resubmit with useOldPerson=true to keep the stored person or \
             overwritePerson=true to replace it.",
            person.nif
        ),
        existing_person: stored,
        incoming_data: incoming_data(person, fields)?,
    }))
}

/// Submitted person and role fields as one JSON object
pub fn incoming_data<F: Serialize>(person: &Person, fields: &F) -> Result<Value, serde_json::Error> {
    let mut data = serde_json::to_value(person)?;
    if let (Value::Object(target), Value::Object(extra)) = (&mut data, serde_json::to_value(fields)?) {
        target.extend(extra);
    }
    Ok(data)
}
