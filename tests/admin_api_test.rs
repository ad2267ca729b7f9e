mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use common::{expiring, new_notice, TestApp, ADMIN_TOKEN, FACULTY_TOKEN, STUDENT_TOKEN};

#[tokio::test]
async fn test_admin_routes_reject_non_admins() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let notice = app.notice(new_notice("Pending")).await?;

    let routes = [
        (Method::GET, "/api/v1/admin/users".to_string(), None),
        (Method::GET, "/api/v1/admin/users/student-1".to_string(), None),
        (Method::PUT, "/api/v1/admin/users/student-1/role".to_string(), Some(json!({ "role": "admin" }))),
        (Method::DELETE, "/api/v1/admin/users/faculty-1".to_string(), None),
        (Method::GET, "/api/v1/admin/notices".to_string(), None),
        (Method::PUT, format!("/api/v1/admin/notices/{}/approve", notice.id), None),
        (Method::PUT, format!("/api/v1/admin/notices/{}/reject", notice.id), Some(json!({ "reason": "no" }))),
        (Method::POST, "/api/v1/admin/notices/bulk-approve".to_string(), Some(json!({ "notice_ids": [notice.id] }))),
        (Method::DELETE, format!("/api/v1/admin/notices/{}", notice.id), None),
        (Method::GET, "/api/v1/admin/stats".to_string(), None),
    ];

    for (method, uri, body) in routes {
        for token in [STUDENT_TOKEN, FACULTY_TOKEN] {
            let (status, _) = app.request(method.clone(), &uri, Some(token), body.clone()).await?;
            assert_eq!(status, StatusCode::FORBIDDEN, "{} {} as {}", method, uri, token);
        }

        let (status, _) = app.request(method.clone(), &uri, None, body.clone()).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} anonymously", method, uri);
    }

    let unchanged = app.context.notice_repo.find_by_id(notice.id).await?;
    assert_eq!(unchanged.map(|n| n.approval_status.as_str()), Some("pending"));

    Ok(())
}

#[tokio::test]
async fn test_approve_and_reject_only_pending() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let first = app.notice(new_notice("First")).await?;
    let second = app.notice(new_notice("Second")).await?;

    let approve = format!("/api/v1/admin/notices/{}/approve", first.id);
    let (status, body) = app.request(Method::PUT, &approve, Some(ADMIN_TOKEN), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Notice approved successfully");
    assert_eq!(body["notice"]["approval_status"], "approved");
    assert_eq!(body["notice"]["approved_by"], "admin-1");
    assert!(body["notice"]["approved_at"].is_string());

    let (status, _) = app.request(Method::PUT, &approve, Some(ADMIN_TOKEN), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let reject_first = format!("/api/v1/admin/notices/{}/reject", first.id);
    let (status, _) = app
        .request(Method::PUT, &reject_first, Some(ADMIN_TOKEN), Some(json!({ "reason": "Too late" })))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let reject_second = format!("/api/v1/admin/notices/{}/reject", second.id);
    let (status, _) = app
        .request(Method::PUT, &reject_second, Some(ADMIN_TOKEN), Some(json!({ "reason": "  " })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(Method::PUT, &reject_second, Some(ADMIN_TOKEN), Some(json!({ "reason": "Off topic" })))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["approval_status"], "rejected");
    assert_eq!(body["notice"]["rejection_reason"], "Off topic");

    let (status, _) = app
        .request(Method::PUT, "/api/v1/admin/notices/31337/approve", Some(ADMIN_TOKEN), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_bulk_approve() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let a = app.notice(new_notice("A")).await?;
    let b = app.notice(new_notice("B")).await?;
    let uri = "/api/v1/admin/notices/bulk-approve";
    let payload = json!({ "notice_ids": [a.id, b.id, 555555] });

    let (status, body) = app
        .request(Method::POST, uri, Some(ADMIN_TOKEN), Some(payload.clone()))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approved_count"], 2);
    assert_eq!(body["total_requested"], 3);
    assert_eq!(body["message"], "Approved 2 notices");

    let (status, body) = app
        .request(Method::POST, uri, Some(ADMIN_TOKEN), Some(payload))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approved_count"], 0);

    let (status, body) = app
        .request(Method::POST, uri, Some(ADMIN_TOKEN), Some(json!({ "notice_ids": [555555] })))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No notices found with provided IDs");

    let (status, _) = app
        .request(Method::POST, uri, Some(ADMIN_TOKEN), Some(json!({ "notice_ids": [] })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_admin_notice_listing_sees_everything() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let visible = app.notice(new_notice("Visible")).await?;
    app.notice(expiring("Expired", Utc::now() - Duration::days(2))).await?;
    let mut inactive = app.notice(new_notice("Inactive")).await?;
    inactive.is_active = false;
    app.context.notice_repo.update(inactive.id, inactive.clone()).await?;

    app.request(
        Method::PUT,
        &format!("/api/v1/admin/notices/{}/approve", visible.id),
        Some(ADMIN_TOKEN),
        None,
    )
    .await?;

    let (status, body) = app.get("/api/v1/admin/notices", Some(ADMIN_TOKEN)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    let (_, body) = app
        .get("/api/v1/admin/notices?include_expired=false", Some(ADMIN_TOKEN))
        .await?;
    assert_eq!(body["total"], 2);

    let (_, body) = app
        .get("/api/v1/admin/notices?approval_status=approved", Some(ADMIN_TOKEN))
        .await?;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], visible.id);

    let (_, body) = app
        .get("/api/v1/admin/notices?approval_status=pending", Some(ADMIN_TOKEN))
        .await?;
    assert_eq!(body["total"], 2);

    Ok(())
}

#[tokio::test]
async fn test_stats() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let a = app.notice(new_notice("A")).await?;
    let b = app.notice(new_notice("B")).await?;
    app.notice(new_notice("C")).await?;

    app.request(Method::PUT, &format!("/api/v1/admin/notices/{}/approve", a.id), Some(ADMIN_TOKEN), None)
        .await?;
    app.request(
        Method::PUT,
        &format!("/api/v1/admin/notices/{}/reject", b.id),
        Some(ADMIN_TOKEN),
        Some(json!({ "reason": "Duplicate" })),
    )
    .await?;

    let (status, body) = app.get("/api/v1/admin/stats", Some(ADMIN_TOKEN)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 3);
    assert_eq!(body["total_notices"], 3);
    assert_eq!(body["pending_notices"], 1);
    assert_eq!(body["approved_notices"], 1);
    assert_eq!(body["rejected_notices"], 1);
    assert_eq!(body["users_by_role"], json!({ "student": 1, "faculty": 1, "admin": 1 }));
    assert!(body["generated_at"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_role_changes_and_user_deletion() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/v1/admin/users/student-1/role",
            Some(ADMIN_TOKEN),
            Some(json!({ "role": "faculty" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User role updated to faculty");
    assert_eq!(body["user"]["role"], "faculty");

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/v1/admin/users/student-1/role",
            Some(ADMIN_TOKEN),
            Some(json!({ "role": "dean" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/v1/admin/users/nobody/role",
            Some(ADMIN_TOKEN),
            Some(json!({ "role": "faculty" })),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(Method::DELETE, "/api/v1/admin/users/admin-1", Some(ADMIN_TOKEN), None)
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Cannot delete admin users");

    let (status, _) = app
        .request(Method::DELETE, "/api/v1/admin/users/student-1", Some(ADMIN_TOKEN), None)
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/v1/admin/users/student-1", Some(ADMIN_TOKEN)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(Method::DELETE, "/api/v1/admin/users/student-1", Some(ADMIN_TOKEN), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_admin_deletes_notice() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let notice = app.notice(new_notice("Spam")).await?;
    let uri = format!("/api/v1/admin/notices/{}", notice.id);

    let (status, _) = app.request(Method::DELETE, &uri, Some(ADMIN_TOKEN), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::DELETE, &uri, Some(ADMIN_TOKEN), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
