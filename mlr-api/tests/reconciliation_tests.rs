//! Person identity reconciliation through the contributor and employee POSTs

mod helpers;

use axum::http::StatusCode;
use helpers::app::{employee_body, test_app};
use serde_json::json;

#[tokio::test]
async fn test_new_person_creates_contributor() {
    let app = test_app().await;

    let (status, created) = app
        .post(
            "/api/contributors",
            json!({"NIF": "123456789", "Name": "Ana", "Roles": "Producer, Mixer, Producer"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["NIF"], json!("123456789"));
    assert_eq!(created["Roles"], json!(["Producer", "Mixer"]));
    assert_eq!(created["RecordLabelName"], json!(""));

    let id = created["ContributorID"].as_i64().unwrap();
    let (status, fetched) = app.get(&format!("/api/contributors/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_identical_resubmission_returns_existing_role() {
    let app = test_app().await;
    let id = app.create_contributor("123456789", "Ana", "Producer").await;

    let (status, body) = app
        .post(
            "/api/contributors",
            json!({"NIF": "123456789", "Name": "Ana", "Roles": "Producer"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ContributorID"], json!(id));

    let (_, all) = app.get("/api/contributors").await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_identical_person_gets_second_role_attached() {
    let app = test_app().await;
    let label = app.create_label("Blue Harbour").await;
    app.create_contributor("123456789", "Ana", "Producer").await;

    let (status, employee) = app
        .post("/api/employees", employee_body("123456789", "Ana", label))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(employee["NIF"], json!("123456789"));

    let (_, person) = app.get("/api/persons/123456789").await;
    assert_eq!(person["EmployeeID"], employee["EmployeeID"]);
    assert!(person["ContributorID"].is_i64());
}

#[tokio::test]
async fn test_conflict_reports_both_sides_without_mutation() {
    let app = test_app().await;
    app.create_contributor("123456789", "Ana", "Producer").await;

    for _ in 0..2 {
        let (status, body) = app
            .post(
                "/api/contributors",
                json!({"NIF": "123456789", "Name": "Ana Maria", "Roles": "Singer"}),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["message"].as_str().unwrap().contains("123456789"));
        assert_eq!(body["existingPerson"]["Name"], json!("Ana"));
        assert_eq!(body["incomingData"]["Name"], json!("Ana Maria"));
        assert_eq!(body["incomingData"]["Roles"], json!(["Singer"]));
    }

    let (_, person) = app.get("/api/persons/123456789").await;
    assert_eq!(person["Name"], json!("Ana"));

    let (_, all) = app.get("/api/contributors").await;
    assert_eq!(all[0]["Roles"], json!(["Producer"]));
}

#[tokio::test]
async fn test_blank_optional_matches_missing_value() {
    let app = test_app().await;
    app.create_contributor("123456789", "Ana", "Producer").await;

    let (status, _) = app
        .post(
            "/api/contributors",
            json!({"NIF": "123456789", "Name": "Ana", "Email": "  ", "Roles": "Producer"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_use_old_person_keeps_stored_fields() {
    let app = test_app().await;
    let label = app.create_label("Blue Harbour").await;
    app.create_contributor("123456789", "Ana", "Producer").await;

    let (status, employee) = app
        .post(
            "/api/employees?useOldPerson=true",
            employee_body("123456789", "Ana Maria", label),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(employee["Name"], json!("Ana"));

    // Second attach violates the one-employee-per-person constraint
    let (status, body) = app
        .post(
            "/api/employees?useOldPerson=true",
            employee_body("123456789", "Ana Maria", label),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INTEGRITY_VIOLATION"));
}

#[tokio::test]
async fn test_overwrite_person_replaces_fields_then_attaches() {
    let app = test_app().await;
    let label = app.create_label("Blue Harbour").await;
    app.create_contributor("123456789", "Ana", "Producer").await;

    let (status, _) = app
        .post("/api/employees", employee_body("123456789", "Ana Maria", label))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, employee) = app
        .post(
            "/api/employees?overwritePerson=TRUE",
            employee_body("123456789", "Ana Maria", label),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(employee["Name"], json!("Ana Maria"));

    let (_, contributors) = app.get("/api/contributors?name=Maria").await;
    assert_eq!(contributors.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_flagged_modes_need_existing_person() {
    let app = test_app().await;
    let label = app.create_label("Blue Harbour").await;

    let (status, body) = app
        .post(
            "/api/employees?overwritePerson=true",
            employee_body("555000111", "Rui", label),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["description"].as_str().unwrap().contains("51010"));

    let (status, _) = app
        .post(
            "/api/contributors?useOldPerson=true",
            json!({"NIF": "555000111", "Name": "Rui", "Roles": "Singer"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/persons/555000111").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_employee_create_populates_label_name() {
    let app = test_app().await;
    let label = app.create_label("Blue Harbour").await;
    assert_eq!(label, 1);

    let (status, employee) = app
        .post("/api/employees", employee_body("123456789", "Ana", 1))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(employee["EmployeeID"].as_i64().unwrap() > 0);
    assert_eq!(employee["RecordLabelName"], json!("Blue Harbour"));
    assert_eq!(employee["HireDate"], json!("2024-01-01"));
    assert_eq!(employee["Salary"], json!(3000.0));
}

#[tokio::test]
async fn test_employee_for_unknown_label_is_not_found() {
    let app = test_app().await;

    let (status, _) = app
        .post("/api/employees", employee_body("123456789", "Ana", 99))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/persons/123456789").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_fields_listed_in_one_message() {
    let app = test_app().await;

    let (status, body) = app.post("/api/employees", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert!(body["description"]
        .as_str()
        .unwrap()
        .contains("NIF, Name, JobTitle, Salary, HireDate, RecordLabelID"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_for_one_nif_settle_cleanly() {
    let app = test_app().await;

    for round in 0..5 {
        let nif = format!("70000000{round}");
        let body = |name: &str| json!({"NIF": nif, "Name": name, "Roles": "Producer"});

        let (a, b, c, d, e, f, g, h) = tokio::join!(
            app.post("/api/contributors", body("Ana")),
            app.post("/api/contributors", body("Bea")),
            app.post("/api/contributors", body("Ana")),
            app.post("/api/contributors", body("Bea")),
            app.post("/api/contributors", body("Ana")),
            app.post("/api/contributors", body("Bea")),
            app.post("/api/contributors", body("Ana")),
            app.post("/api/contributors", body("Bea")),
        );
        let results = [a, b, c, d, e, f, g, h];

        for (status, body) in &results {
            assert!(
                [StatusCode::OK, StatusCode::CREATED, StatusCode::CONFLICT].contains(status),
                "unexpected {status}: {body}"
            );
        }
        let created = results
            .iter()
            .filter(|(status, _)| *status == StatusCode::CREATED)
            .count();
        assert_eq!(created, 1);

        let (_, person) = app.get(&format!("/api/persons/{nif}")).await;
        let winner = person["Name"].clone();
        for (status, body) in &results {
            if *status == StatusCode::CONFLICT {
                assert_eq!(body["existingPerson"]["Name"], winner);
                assert_ne!(body["incomingData"]["Name"], winner);
            }
        }
    }

    let (_, all) = app.get("/api/contributors").await;
    assert_eq!(all.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_blank_date_of_birth_is_stored_as_null() {
    let app = test_app().await;

    let (status, created) = app
        .post(
            "/api/contributors",
            json!({"NIF": "123456789", "Name": "Ana", "DateOfBirth": "", "Roles": "Producer"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["DateOfBirth"], json!(null));

    let (status, _) = app
        .post(
            "/api/contributors",
            json!({"NIF": "123456789", "Name": "Ana", "Roles": "Producer"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
