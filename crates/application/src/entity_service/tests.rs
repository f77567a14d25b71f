use std::sync::Arc;

use campus_core::{AppError, AppResult, Claim, Principal};
use campus_domain::{
    CourseMemberCreate, CourseMemberUpdate, CourseRole, RoleClaimCreate, RoleClaimQuery,
    RoleCreate, RoleQuery, RoleUpdate, UserQuery, UserRoleCreate, UserRoleQuery,
};
use serde_json::json;

use crate::authorization_service::AuthorizationService;
use crate::entity_interface::EntityInterface;
use crate::entity_registry::EntityRegistry;
use crate::interfaces::{
    CourseInterface, CourseMemberInterface, RoleClaimInterface, RoleInterface, SessionInterface,
    UserInterface, UserRoleInterface,
};
use crate::query::ListWindow;
use crate::test_support::{FakeEntityRepository, SEEDED_AT};

use super::EntityService;

fn service(repository: Arc<FakeEntityRepository>) -> AppResult<EntityService> {
    let registry = Arc::new(EntityRegistry::new()?);
    Ok(EntityService::new(
        AuthorizationService::new(registry),
        repository,
    ))
}

fn admin() -> Principal {
    Principal::new("admin", true, [])
}

async fn seed_user(repository: &FakeEntityRepository, id: &str, username: &str) {
    repository
        .seed(
            UserInterface::schema(),
            json!({
                "id": id,
                "username": username,
                "given_name": null,
                "family_name": null,
                "email": null,
                "user_type": "user",
                "password_hash": null,
                "created_at": SEEDED_AT,
                "updated_at": SEEDED_AT,
            }),
        )
        .await;
}

async fn seed_course(repository: &FakeEntityRepository, id: &str) {
    repository
        .seed(
            CourseInterface::schema(),
            json!({
                "id": id,
                "path": id,
                "title": null,
                "description": null,
                "created_at": SEEDED_AT,
                "updated_at": SEEDED_AT,
            }),
        )
        .await;
}

#[tokio::test]
async fn forbidden_caller_never_reaches_storage() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    let service = service(repository.clone())?;
    let caller = Principal::new("u1", false, [Claim::permission("role", "create")]);

    let result = service
        .list::<RoleInterface>(&caller, None, ListWindow::default())
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(repository.calls().await, 0);
    Ok(())
}

#[tokio::test]
async fn created_role_is_readable_by_its_generated_id() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    let service = service(repository)?;

    let created = service
        .create::<RoleInterface>(
            &admin(),
            &RoleCreate {
                id: None,
                title: Some("Reviewer".to_owned()),
                description: Some("Reviews submissions".to_owned()),
                builtin: false,
            },
        )
        .await?;

    assert!(!created.id.is_empty());
    let fetched = service.get::<RoleInterface>(&admin(), &created.id).await?;
    assert_eq!(fetched, created);
    Ok(())
}

#[tokio::test]
async fn restricted_scope_and_filters_are_combined() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    seed_user(&repository, "u1", "ada").await;
    seed_user(&repository, "u2", "grace").await;
    let service = service(repository)?;
    let caller = Principal::new("u1", false, []);

    let visible = service
        .list::<UserInterface>(&caller, None, ListWindow::default())
        .await?;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].username, "ada");

    let someone_else = UserQuery {
        username: Some("grace".to_owned()),
        ..UserQuery::default()
    };
    let filtered = service
        .list::<UserInterface>(&caller, Some(&someone_else), ListWindow::default())
        .await?;
    assert!(filtered.is_empty());
    Ok(())
}

#[tokio::test]
async fn rows_outside_scope_are_not_found() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    seed_user(&repository, "u1", "ada").await;
    seed_user(&repository, "u2", "grace").await;
    let service = service(repository)?;
    let caller = Principal::new("u1", false, []);

    let result = service.get::<UserInterface>(&caller, "u2").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn list_window_pages_in_id_order() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    for id in ["c3", "c1", "c2"] {
        seed_course(&repository, id).await;
    }
    let service = service(repository)?;

    let page = service
        .list::<CourseInterface>(&admin(), None, ListWindow::new(Some(2), Some(1))?)
        .await?;
    let ids: Vec<_> = page.iter().map(|course| course.id.as_str()).collect();
    assert_eq!(ids, vec!["c2", "c3"]);
    Ok(())
}

#[tokio::test]
async fn empty_update_is_rejected() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    let service = service(repository.clone())?;

    let result = service
        .update::<RoleInterface>(&admin(), "r1", &RoleUpdate::default())
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(repository.calls().await, 0);
    Ok(())
}

#[tokio::test]
async fn builtin_roles_cannot_be_updated_or_deleted() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    repository
        .seed(
            RoleInterface::schema(),
            json!({ "id": "_admin", "title": "Administrator", "description": null, "builtin": true }),
        )
        .await;
    let service = service(repository)?;

    let update = RoleUpdate {
        title: Some("Root".to_owned()),
        description: None,
    };
    let updated = service
        .update::<RoleInterface>(&admin(), "_admin", &update)
        .await;
    let deleted = service.delete::<RoleInterface>(&admin(), "_admin").await;

    assert!(matches!(updated, Err(AppError::Forbidden(_))));
    assert!(matches!(deleted, Err(AppError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn update_touches_only_allow_listed_fields() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    repository
        .seed(
            RoleInterface::schema(),
            json!({ "id": "reviewer", "title": "Reviewer", "description": null, "builtin": false }),
        )
        .await;
    let service = service(repository)?;

    let updated = service
        .update::<RoleInterface>(
            &admin(),
            "reviewer",
            &RoleUpdate {
                title: None,
                description: Some("Reviews submissions".to_owned()),
            },
        )
        .await?;

    assert_eq!(updated.title.as_deref(), Some("Reviewer"));
    assert_eq!(updated.description.as_deref(), Some("Reviews submissions"));
    Ok(())
}

#[tokio::test]
async fn role_claim_for_missing_role_is_not_found() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    let service = service(repository.clone())?;

    let result = service
        .create::<RoleClaimInterface>(
            &admin(),
            &RoleClaimCreate {
                role_id: "ghost".to_owned(),
                claim_type: "permissions".to_owned(),
                claim_value: "group:get".to_owned(),
                properties: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(repository.rows(RoleClaimInterface::schema()).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_role_claim_conflicts() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    repository
        .seed(
            RoleInterface::schema(),
            json!({ "id": "reviewer", "title": null, "description": null, "builtin": false }),
        )
        .await;
    let service = service(repository)?;
    let claim = RoleClaimCreate {
        role_id: "reviewer".to_owned(),
        claim_type: "permissions".to_owned(),
        claim_value: "group:get".to_owned(),
        properties: None,
    };

    service
        .create::<RoleClaimInterface>(&admin(), &claim)
        .await?;
    let second = service.create::<RoleClaimInterface>(&admin(), &claim).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn lecturer_cannot_enroll_into_foreign_course() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    seed_user(&repository, "u2", "grace").await;
    seed_course(&repository, "c1").await;
    seed_course(&repository, "c2").await;
    let service = service(repository.clone())?;
    let lecturer = Principal::new("u1", false, [Claim::course_role("c1", "_lecturer")]);

    let foreign = service
        .create::<CourseMemberInterface>(
            &lecturer,
            &CourseMemberCreate {
                user_id: "u2".to_owned(),
                course_id: "c2".to_owned(),
                course_role_id: CourseRole::Student,
            },
        )
        .await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));

    let own = service
        .create::<CourseMemberInterface>(
            &lecturer,
            &CourseMemberCreate {
                user_id: "u2".to_owned(),
                course_id: "c1".to_owned(),
                course_role_id: CourseRole::Student,
            },
        )
        .await?;
    assert_eq!(own.course_id, "c1");
    assert_eq!(
        repository.rows(CourseMemberInterface::schema()).await.len(),
        1
    );
    Ok(())
}

#[tokio::test]
async fn delete_removes_only_the_target_row() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    for id in ["s1", "s2"] {
        repository
            .seed(
                SessionInterface::schema(),
                json!({
                    "id": id,
                    "user_id": "u1",
                    "session_hash": format!("hash-{id}"),
                    "ip_address": null,
                    "created_at": SEEDED_AT,
                }),
            )
            .await;
    }
    let service = service(repository.clone())?;
    let owner = Principal::new("u1", false, []);
    let stranger = Principal::new("u2", false, []);

    let foreign = service.delete::<SessionInterface>(&stranger, "s1").await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    service.delete::<SessionInterface>(&owner, "s1").await?;
    let remaining = repository.rows(SessionInterface::schema()).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(
        remaining[0].get("id").and_then(|id| id.as_str()),
        Some("s2")
    );
    Ok(())
}

#[tokio::test]
async fn detailed_listing_projects_the_get_shape() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    repository
        .seed(
            RoleInterface::schema(),
            json!({ "id": "tutor", "title": "Tutor", "description": "Grades course work", "builtin": false }),
        )
        .await;
    let service = service(repository)?;
    let params = RoleQuery {
        description: Some("course".to_owned()),
        ..RoleQuery::default()
    };

    let detailed = service
        .list_detailed::<RoleInterface>(&admin(), Some(&params), ListWindow::default())
        .await?;

    assert_eq!(detailed.len(), 1);
    assert_eq!(detailed[0].description.as_deref(), Some("Grades course work"));
    Ok(())
}

async fn seed_role_claim(repository: &FakeEntityRepository, id: &str, role_id: &str, value: &str) {
    repository
        .seed(
            RoleClaimInterface::schema(),
            json!({
                "id": id,
                "role_id": role_id,
                "claim_type": "permissions",
                "claim_value": value,
                "properties": null,
            }),
        )
        .await;
}

async fn seed_member(repository: &FakeEntityRepository, id: &str, user_id: &str, role: &str) {
    repository
        .seed(
            CourseMemberInterface::schema(),
            json!({
                "id": id,
                "user_id": user_id,
                "course_id": "c1",
                "course_role_id": role,
                "created_at": SEEDED_AT,
                "updated_at": SEEDED_AT,
            }),
        )
        .await;
}

async fn seed_grant(repository: &FakeEntityRepository, id: &str, user_id: &str, role_id: &str) {
    repository
        .seed(
            UserRoleInterface::schema(),
            json!({ "id": id, "user_id": user_id, "role_id": role_id, "created_at": SEEDED_AT }),
        )
        .await;
}

#[tokio::test]
async fn list_claim_alone_does_not_grant_role_claim_listing() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    seed_role_claim(&repository, "rc1", "_workspace_user", "group:get").await;
    let service = service(repository.clone())?;
    let lister = Principal::new("u1", false, [Claim::permission("role_claim", "list")]);

    let result = service
        .list::<RoleClaimInterface>(&lister, None, ListWindow::default())
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(repository.calls().await, 0);

    let reader = Principal::new("u1", false, [Claim::permission("role_claim", "get")]);
    let visible = service
        .list::<RoleClaimInterface>(&reader, None, ListWindow::default())
        .await?;
    assert_eq!(visible.len(), 1);
    Ok(())
}

#[tokio::test]
async fn role_claims_filter_by_role_id() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    seed_role_claim(&repository, "rc1", "_workspace_user", "group:get").await;
    seed_role_claim(&repository, "rc2", "_user_manager", "user:get").await;
    seed_role_claim(&repository, "rc3", "_workspace_user", "course:get").await;
    let service = service(repository)?;
    let reader = Principal::new("u1", false, [Claim::permission("role_claim", "get")]);

    let workspace_user = RoleClaimQuery {
        role_id: Some("_workspace_user".to_owned()),
        ..RoleClaimQuery::default()
    };
    let claims = service
        .list::<RoleClaimInterface>(&reader, Some(&workspace_user), ListWindow::default())
        .await?;
    let ids: Vec<_> = claims.iter().map(|claim| claim.id.as_str()).collect();
    assert_eq!(ids, vec!["rc1", "rc3"]);
    assert!(claims.iter().all(|claim| claim.role_id == "_workspace_user"));

    let unknown = RoleClaimQuery {
        role_id: Some("_nobody".to_owned()),
        ..RoleClaimQuery::default()
    };
    let none = service
        .list::<RoleClaimInterface>(&reader, Some(&unknown), ListWindow::default())
        .await?;
    assert!(none.is_empty());
    Ok(())
}

#[tokio::test]
async fn user_role_fields_are_combined_with_and() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    seed_grant(&repository, "g1", "u1", "r1").await;
    seed_grant(&repository, "g2", "u1", "r2").await;
    seed_grant(&repository, "g3", "u2", "r1").await;
    let service = service(repository)?;

    let params = UserRoleQuery {
        user_id: Some("u1".to_owned()),
        role_id: Some("r1".to_owned()),
    };
    let grants = service
        .list::<UserRoleInterface>(&admin(), Some(&params), ListWindow::default())
        .await?;

    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].id, "g1");
    Ok(())
}

#[tokio::test]
async fn lecturers_cannot_manage_roles_above_their_own() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    seed_member(&repository, "m2", "u2", "_student").await;
    seed_member(&repository, "m3", "u3", "_owner").await;
    let service = service(repository.clone())?;
    let lecturer = Principal::new("u1", false, [Claim::course_role("c1", "_lecturer")]);
    let to_role = |role| CourseMemberUpdate {
        course_role_id: Some(role),
    };

    let promoted = service
        .update::<CourseMemberInterface>(&lecturer, "m2", &to_role(CourseRole::Owner))
        .await;
    assert!(matches!(promoted, Err(AppError::Forbidden(_))));

    let demoted_owner = service
        .update::<CourseMemberInterface>(&lecturer, "m3", &to_role(CourseRole::Student))
        .await;
    assert!(matches!(demoted_owner, Err(AppError::Forbidden(_))));

    let removed_owner = service.delete::<CourseMemberInterface>(&lecturer, "m3").await;
    assert!(matches!(removed_owner, Err(AppError::Forbidden(_))));

    let enrolled_owner = service
        .create::<CourseMemberInterface>(
            &lecturer,
            &CourseMemberCreate {
                user_id: "u4".to_owned(),
                course_id: "c1".to_owned(),
                course_role_id: CourseRole::Owner,
            },
        )
        .await;
    assert!(matches!(enrolled_owner, Err(AppError::Forbidden(_))));

    let tutor = service
        .update::<CourseMemberInterface>(&lecturer, "m2", &to_role(CourseRole::Tutor))
        .await?;
    assert_eq!(tutor.course_role_id, CourseRole::Tutor);
    assert_eq!(
        repository.rows(CourseMemberInterface::schema()).await.len(),
        2
    );
    Ok(())
}

#[tokio::test]
async fn only_admins_manage_admin_grants() -> AppResult<()> {
    let repository = Arc::new(FakeEntityRepository::default());
    seed_user(&repository, "u1", "ada").await;
    for id in ["_admin", "reviewer"] {
        repository
            .seed(
                RoleInterface::schema(),
                json!({ "id": id, "title": null, "description": null, "builtin": id == "_admin" }),
            )
            .await;
    }
    seed_grant(&repository, "g1", "root", "_admin").await;
    let service = service(repository.clone())?;
    let manager = Principal::new(
        "u1",
        false,
        [
            Claim::permission("user_role", "create"),
            Claim::permission("user_role", "delete"),
        ],
    );
    let grant = |role_id: &str| UserRoleCreate {
        user_id: "u1".to_owned(),
        role_id: role_id.to_owned(),
    };

    let escalated = service
        .create::<UserRoleInterface>(&manager, &grant("_admin"))
        .await;
    assert!(matches!(escalated, Err(AppError::Forbidden(_))));

    let revoked = service.delete::<UserRoleInterface>(&manager, "g1").await;
    assert!(matches!(revoked, Err(AppError::Forbidden(_))));

    service
        .create::<UserRoleInterface>(&manager, &grant("reviewer"))
        .await?;
    service
        .create::<UserRoleInterface>(&admin(), &grant("_admin"))
        .await?;
    assert_eq!(repository.rows(UserRoleInterface::schema()).await.len(), 3);
    Ok(())
}
