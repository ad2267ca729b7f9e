mod common;

use chrono::Utc;
use noticeboard::{
    domain::{CreateUserRequest, Role, UpdateUserRequest},
    error::AppError,
    repository::{SqliteUserRepository, UserRepository},
};

use common::test_pool;

fn request(uid: &str, email: &str, role: Role) -> CreateUserRequest {
    CreateUserRequest {
        uid: uid.to_string(),
        email: email.to_string(),
        name: format!("User {}", uid),
        role,
        department: Some("Physics".to_string()),
    }
}

#[tokio::test]
async fn test_user_crud() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let repo = SqliteUserRepository::new(pool);

    let user = repo.create(request("u-1", "one@uni.edu", Role::Faculty)).await?;
    assert_eq!(user.uid, "u-1");
    assert_eq!(user.role, Role::Faculty);
    assert!(user.is_active);
    assert!(user.last_login.is_none());

    let by_email = repo.find_by_email("one@uni.edu").await?;
    assert_eq!(by_email.map(|u| u.uid), Some("u-1".to_string()));

    let updated = repo.update("u-1", UpdateUserRequest {
        name: Some("Renamed".to_string()),
        department: Some(None),
        ..Default::default()
    }).await?;
    assert_eq!(updated.name, "Renamed");
    assert!(updated.department.is_none());
    assert_eq!(updated.role, Role::Faculty);

    repo.touch_last_login("u-1", Utc::now()).await?;
    let touched = repo.find_by_uid("u-1").await?;
    assert!(touched.and_then(|u| u.last_login).is_some());

    assert!(repo.delete("u-1").await?);
    assert!(repo.find_by_uid("u-1").await?.is_none());
    assert!(!repo.delete("u-1").await?);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let repo = SqliteUserRepository::new(pool);

    repo.create(request("u-1", "same@uni.edu", Role::Student)).await?;
    let duplicate = repo.create(request("u-2", "same@uni.edu", Role::Student)).await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn test_update_missing_user_is_not_found() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let repo = SqliteUserRepository::new(pool);

    let result = repo.update("nobody", UpdateUserRequest::default()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_list_and_count_by_role() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let repo = SqliteUserRepository::new(pool);

    repo.create(request("s-1", "s1@uni.edu", Role::Student)).await?;
    repo.create(request("s-2", "s2@uni.edu", Role::Student)).await?;
    repo.create(request("f-1", "f1@uni.edu", Role::Faculty)).await?;

    assert_eq!(repo.count(None).await?, 3);
    assert_eq!(repo.count(Some(Role::Student)).await?, 2);
    assert_eq!(repo.count(Some(Role::Admin)).await?, 0);

    let students = repo.list(Some(Role::Student), 10, 0).await?;
    assert_eq!(students.len(), 2);
    assert!(students.iter().all(|u| u.role == Role::Student));

    let page = repo.list(None, 2, 2).await?;
    assert_eq!(page.len(), 1);

    Ok(())
}
