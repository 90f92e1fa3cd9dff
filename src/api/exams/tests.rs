use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn create_then_get_returns_same_course_and_date() {
    let ctx = test_support::setup_test_context().await;
    let token = test_support::professor_token(&ctx).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exams",
            Some(&token),
            Some(json!({"course": "Linear Algebra", "date": "2025-06-14"})),
        ))
        .await
        .expect("create exam");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = test_support::read_json(response).await;
    let exam_id = created["id"].as_str().expect("exam id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/exams/{exam_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("get exam");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = test_support::read_json(response).await;
    assert_eq!(fetched["id"], exam_id);
    assert_eq!(fetched["course"], "Linear Algebra");
    assert_eq!(fetched["date"], "2025-06-14");
}

#[tokio::test]
async fn create_rejects_blank_course_and_bad_date() {
    let ctx = test_support::setup_test_context().await;
    let token = test_support::professor_token(&ctx).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exams",
            Some(&token),
            Some(json!({"course": "   ", "date": "2025-06-14"})),
        ))
        .await
        .expect("create exam");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exams",
            Some(&token),
            Some(json!({"course": "Physics", "date": "June 14"})),
        ))
        .await
        .expect("create exam");
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn list_orders_by_newest_date() {
    let ctx = test_support::setup_test_context().await;
    let token = test_support::professor_token(&ctx).await;
    test_support::insert_exam(ctx.state.db(), "Older", "2024-01-10").await;
    test_support::insert_exam(ctx.state.db(), "Newer", "2025-03-02").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/exams/", Some(&token), None))
        .await
        .expect("list exams");
    assert_eq!(response.status(), StatusCode::OK);
    let exams = test_support::read_json(response).await;
    let courses: Vec<_> =
        exams.as_array().expect("array").iter().map(|exam| exam["course"].clone()).collect();
    assert_eq!(courses, vec![json!("Newer"), json!("Older")]);
}

#[tokio::test]
async fn patch_updates_only_given_fields() {
    let ctx = test_support::setup_test_context().await;
    let token = test_support::professor_token(&ctx).await;
    let exam = test_support::insert_exam(ctx.state.db(), "Chemistry", "2025-05-01").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/exams/{}", exam.id),
            Some(&token),
            Some(json!({"date": "2025-05-20"})),
        ))
        .await
        .expect("patch exam");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = test_support::read_json(response).await;
    assert_eq!(updated["course"], "Chemistry");
    assert_eq!(updated["date"], "2025-05-20");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            "/api/v1/exams/missing",
            Some(&token),
            Some(json!({"course": "Biology"})),
        ))
        .await
        .expect("patch missing");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_exam_and_missing_is_not_found() {
    let ctx = test_support::setup_test_context().await;
    let token = test_support::professor_token(&ctx).await;
    let exam = test_support::insert_exam(ctx.state.db(), "History", "2025-02-11").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            "/api/v1/exams/does-not-exist",
            Some(&token),
            None,
        ))
        .await
        .expect("delete missing");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/exams/{}", exam.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete exam");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/exams", Some(&token), None))
        .await
        .expect("list exams");
    let exams = test_support::read_json(response).await;
    assert!(exams.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn report_counts_graded_copies() {
    let ctx = test_support::setup_test_context().await;
    let token = test_support::professor_token(&ctx).await;
    let exam = test_support::insert_exam(ctx.state.db(), "Statistics", "2025-04-04").await;

    let upload = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            &format!("/api/v1/exams/{}/copies", exam.id),
            &token,
            &[("files", Some("a.pdf"), b"%PDF-a"), ("files", Some("b.pdf"), b"%PDF-b")],
        ))
        .await
        .expect("upload");
    assert_eq!(upload.status(), StatusCode::CREATED);
    let upload = test_support::read_json(upload).await;
    let first_copy_id = upload["first_copy_id"].as_str().expect("copy id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/copies/{first_copy_id}/correct", exam.id),
            Some(&token),
            None,
        ))
        .await
        .expect("correct");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/exams/{}/report?type=detailed", exam.id),
            Some(&token),
            None,
        ))
        .await
        .expect("report");
    assert_eq!(response.status(), StatusCode::OK);
    let report = test_support::read_json(response).await;
    assert_eq!(report["exam_id"], exam.id);
    assert_eq!(report["type"], "detailed");
    assert_eq!(report["report"], "detailed report");
    assert_eq!(report["copy_count"], 2);
    assert_eq!(report["graded_count"], 1);
    assert_eq!(report["average_grade"], 15.5);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/exams/{}/report", exam.id),
            Some(&token),
            None,
        ))
        .await
        .expect("summary report");
    let report = test_support::read_json(response).await;
    assert_eq!(report["type"], "summary");
    assert_eq!(report["report"], "summary report");
}

#[tokio::test]
async fn report_rejects_unknown_type_and_missing_exam() {
    let ctx = test_support::setup_test_context().await;
    let token = test_support::professor_token(&ctx).await;
    let exam = test_support::insert_exam(ctx.state.db(), "Geometry", "2025-04-04").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/exams/{}/report?type=weekly", exam.id),
            Some(&token),
            None,
        ))
        .await
        .expect("report");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/exams/missing/report",
            Some(&token),
            None,
        ))
        .await
        .expect("report");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
