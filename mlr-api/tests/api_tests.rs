//! Entity endpoints, dependency guard, admin routes

mod helpers;

use axum::http::{Method, StatusCode};
use helpers::app::{employee_body, test_app, test_app_with};
use serde_json::json;

#[tokio::test]
async fn test_health_and_buildinfo() {
    let app = test_app().await;

    let (status, health) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], json!("ok"));
    assert_eq!(health["module"], json!("mlr-api"));

    let (status, build) = app.get("/api/buildinfo").await;
    assert_eq!(status, StatusCode::OK);
    assert!(build["git_hash"].is_string());
    assert_eq!(build["version"], health["version"]);
}

#[tokio::test]
async fn test_label_delete_blocked_then_cascaded() {
    let app = test_app().await;
    let label = app.create_label("Blue Harbour").await;
    let (status, employee) = app
        .post("/api/employees", employee_body("123456789", "Ana", label))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let employee_id = employee["EmployeeID"].as_i64().unwrap();

    let (status, deps) = app.get(&format!("/api/record_labels/{label}/dependencies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deps, json!({"EmployeeCount": 1, "CollaborationCount": 0}));

    let (status, blocked) = app.delete(&format!("/api/record_labels/{label}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(blocked["employeeCount"], json!(1));
    assert_eq!(blocked["collaborationCount"], json!(0));

    let (status, _) = app.get(&format!("/api/record_labels/{label}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .delete(&format!("/api/record_labels/{label}?cascade=true"))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = app.get(&format!("/api/record_labels/{label}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/employees/{employee_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Person survives its employee record
    let (status, _) = app.get("/api/persons/123456789").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_label_without_dependents_deletes_directly() {
    let app = test_app().await;
    let label = app.create_label("Atlas Sound").await;

    let (status, _) = app.delete(&format!("/api/record_labels/{label}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.delete(&format!("/api/record_labels/{label}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_label_name_is_integrity_error() {
    let app = test_app().await;
    app.create_label("Atlas Sound").await;

    let (status, body) = app
        .post(
            "/api/record_labels",
            json!({"Name": "Atlas Sound", "Email": "other@example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INTEGRITY_VIOLATION"));
}

#[tokio::test]
async fn test_record_label_update_and_filters() {
    let app = test_app().await;
    let label = app.create_label("Atlas Sound").await;
    app.create_label("Blue Harbour").await;

    let (status, updated) = app
        .put(
            &format!("/api/record_labels/{label}"),
            json!({"Name": "Atlas Sound", "Email": "hello@atlas.example", "Website": "atlas.example"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["Website"], json!("atlas.example"));
    assert_eq!(updated["Location"], json!(null));

    let (_, found) = app.get("/api/record_labels?website=atlas").await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    let (_, all) = app.get("/api/record_labels?name=&email=").await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, _) = app
        .put("/api/record_labels/99", json!({"Name": "Ghost", "Email": "g@example.com"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_song_round_trip_and_filters() {
    let app = test_app().await;
    app.create_contributor("123456789", "Ana", "Singer").await;
    app.create_contributor("987654321", "Rui", "Guitar").await;

    let (status, created) = app
        .post(
            "/api/songs",
            json!({
                "Title": "Saudade",
                "Duration": 215,
                "Genres": "Fado, World",
                "Contributors": ["123456789", "987654321"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["ReleaseDate"], json!(null));
    assert_eq!(created["Genres"], json!(["Fado", "World"]));
    let id = created["SongID"].as_i64().unwrap();

    let (status, updated) = app
        .put(
            &format!("/api/songs/{id}"),
            json!({
                "Title": "Saudade (Live)",
                "Duration": 240,
                "ReleaseDate": "2024-03-01",
                "Genres": ["Fado"],
                "Contributors": "987654321"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = app.get(&format!("/api/songs/{id}")).await;
    assert_eq!(fetched, updated);
    assert_eq!(fetched["Title"], json!("Saudade (Live)"));
    assert_eq!(fetched["ReleaseDate"], json!("2024-03-01"));
    assert_eq!(fetched["Genres"], json!(["Fado"]));
    assert_eq!(fetched["Contributors"], json!(["987654321"]));

    let (_, long) = app.get("/api/songs?minDuration=230").await;
    assert_eq!(long.as_array().unwrap().len(), 1);
    let (_, short) = app.get("/api/songs?maxDuration=100").await;
    assert!(short.as_array().unwrap().is_empty());
    let (status, _) = app.get("/api/songs?minDuration=long").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, deps) = app.get(&format!("/api/songs/{id}/dependencies")).await;
    assert_eq!(deps, json!({"CollaborationCount": 0, "ContributorCount": 1}));

    let (status, _) = app.delete(&format!("/api/songs/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/songs/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_song_with_unknown_contributor_is_rejected() {
    let app = test_app().await;

    let (status, body) = app
        .post(
            "/api/songs",
            json!({"Title": "Orphan", "Duration": 100, "Contributors": "000000000"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["description"].as_str().unwrap().contains("50041"));

    let (_, songs) = app.get("/api/songs").await;
    assert!(songs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_collaboration_links_song_labels_contributors() {
    let app = test_app().await;
    app.create_label("Blue Harbour").await;
    app.create_label("Atlas Sound").await;
    let contributor = app.create_contributor("123456789", "Ana", "Singer").await;
    let (_, song) = app
        .post("/api/songs", json!({"Title": "Night Drive", "Duration": 180}))
        .await;

    let (status, collab) = app
        .post(
            "/api/collaborations",
            json!({
                "CollaborationName": "Harbour Sessions",
                "StartDate": "2024-01-01",
                "SongTitle": "Night Drive",
                "RecordLabels": "Blue Harbour, Atlas Sound",
                "Contributors": ["123456789"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(collab["SongID"], song["SongID"]);
    assert_eq!(collab["RecordLabels"], json!(["Blue Harbour", "Atlas Sound"]));
    assert_eq!(collab["Contributors"], json!(["123456789"]));

    let (_, contributor) = app.get(&format!("/api/contributors/{contributor}")).await;
    let label_names = contributor["RecordLabelName"].as_str().unwrap();
    assert!(label_names.contains("Blue Harbour") && label_names.contains("Atlas Sound"));

    let (_, found) = app.get("/api/collaborations?labels=Atlas&start=2023-12-31").await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    let (_, none) = app.get("/api/collaborations?start=2024-06-01").await;
    assert!(none.as_array().unwrap().is_empty());

    let (status, _) = app
        .post(
            "/api/collaborations",
            json!({
                "CollaborationName": "Lost",
                "StartDate": "2024-01-01",
                "RecordLabels": "Nobody Records"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = collab["CollaborationID"].as_i64().unwrap();
    let (status, _) = app.delete(&format!("/api/collaborations/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&format!("/api/collaborations/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_person_rename_cascades_to_roles() {
    let app = test_app().await;
    let id = app.create_contributor("123456789", "Ana", "Singer").await;

    let (status, _) = app.put("/api/persons/123456789", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, person) = app
        .put(
            "/api/persons/123456789",
            json!({"NewNIF": "111222333", "Email": "ana@example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(person["NIF"], json!("111222333"));
    assert_eq!(person["Name"], json!("Ana"));
    assert_eq!(person["ContributorID"], json!(id));

    let (_, contributor) = app.get(&format!("/api/contributors/{id}")).await;
    assert_eq!(contributor["NIF"], json!("111222333"));
    assert_eq!(contributor["Email"], json!("ana@example.com"));

    let (status, _) = app.put("/api/persons/123456789", json!({"Name": "X"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_role_update_cannot_change_nif() {
    let app = test_app().await;
    let id = app.create_contributor("123456789", "Ana", "Singer").await;

    let (status, body) = app
        .put(
            &format!("/api/contributors/{id}"),
            json!({"NIF": "999999999", "Name": "Ana", "Roles": "Singer"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["description"].as_str().unwrap().contains("51040"));

    let (status, updated) = app
        .put(
            &format!("/api/contributors/{id}"),
            json!({"Name": "Ana Sofia", "Roles": ["Singer", "Composer"]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["NIF"], json!("123456789"));
    assert_eq!(updated["Name"], json!("Ana Sofia"));
    assert_eq!(updated["Roles"], json!(["Singer", "Composer"]));
}

#[tokio::test]
async fn test_contributor_delete_and_dependencies() {
    let app = test_app().await;
    let id = app.create_contributor("123456789", "Ana", "Singer").await;
    app.post(
        "/api/songs",
        json!({"Title": "Blue Hour", "Duration": 200, "Contributors": "123456789"}),
    )
    .await;

    let (status, deps) = app.get(&format!("/api/contributors/{id}/dependencies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deps, json!({"CollaborationCount": 0, "SongCount": 1}));

    let (status, _) = app.delete(&format!("/api/contributors/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/contributors/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/contributors/{id}/dependencies")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = test_app().await;

    let (status, body) = app
        .send_raw(Method::POST, "/api/record_labels", "{\"Name\": ")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_admin_populate_and_dashboard() {
    let app = test_app().await;

    let (status, body) = app.send(Method::POST, "/api/db/populate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, counts) = app.get("/api/dashboard/counts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        counts,
        json!({
            "RecordLabelCount": 3,
            "EmployeeCount": 3,
            "SongCount": 3,
            "ContributorCount": 3,
            "CollaborationCount": 2
        })
    );

    let (status, _) = app.send(Method::POST, "/api/db/drop_tables", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/dashboard/counts").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = app.send(Method::POST, "/api/db/init", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, counts) = app.get("/api/dashboard/counts").await;
    assert_eq!(counts["SongCount"], json!(0));
}

#[tokio::test]
async fn test_admin_routes_absent_when_disabled() {
    let app = test_app_with(|config| config.enable_admin = false).await;

    let (status, _) = app.send(Method::POST, "/api/db/init", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/dashboard/counts").await;
    assert_eq!(status, StatusCode::OK);
}
