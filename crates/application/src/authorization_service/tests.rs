use std::sync::Arc;

use campus_core::{AppError, AppResult, Claim, Principal};
use campus_domain::{Action, EntityKind};

use crate::entity_registry::EntityRegistry;
use crate::query::{Condition, EntityQuery};

use super::AuthorizationService;

fn service() -> AppResult<AuthorizationService> {
    Ok(AuthorizationService::new(Arc::new(EntityRegistry::new()?)))
}

fn principal(claims: impl IntoIterator<Item = Claim>) -> Principal {
    Principal::new("u1", false, claims)
}

#[test]
fn admin_gets_unrestricted_query_for_every_kind_and_action() -> AppResult<()> {
    let service = service()?;
    let admin = Principal::new("root", true, []);

    for kind in EntityKind::all() {
        for action in Action::all() {
            let query = service.check_permissions(&admin, *kind, *action);
            assert_eq!(query.ok(), Some(EntityQuery::unrestricted(*kind)));
        }
    }

    Ok(())
}

#[test]
fn general_claim_grants_unrestricted_query() -> AppResult<()> {
    let service = service()?;
    let caller = principal([Claim::permission("role_claim", "get")]);

    let query = service.check_permissions(&caller, EntityKind::RoleClaim, Action::Get);
    assert_eq!(
        query.ok(),
        Some(EntityQuery::unrestricted(EntityKind::RoleClaim))
    );

    Ok(())
}

#[test]
fn get_claim_grants_both_reads_and_list_claim_grants_none() -> AppResult<()> {
    let service = service()?;
    let reader = principal([Claim::permission("group", "get")]);
    let lister = principal([Claim::permission("group", "list")]);

    assert!(
        service
            .check_permissions(&reader, EntityKind::Group, Action::List)
            .is_ok()
    );
    for action in [Action::List, Action::Get] {
        assert!(matches!(
            service.check_permissions(&lister, EntityKind::Group, action),
            Err(AppError::Forbidden(_))
        ));
    }

    Ok(())
}

#[test]
fn claim_for_another_kind_is_forbidden() -> AppResult<()> {
    let service = service()?;
    let caller = principal([Claim::permission("role", "get")]);

    let result = service.check_permissions(&caller, EntityKind::RoleClaim, Action::Get);
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    Ok(())
}

#[test]
fn users_without_claims_are_scoped_to_their_own_row() -> AppResult<()> {
    let service = service()?;
    let caller = principal([]);

    let query = service.check_permissions(&caller, EntityKind::User, Action::Update);
    assert_eq!(
        query.ok(),
        Some(EntityQuery::restricted(
            EntityKind::User,
            Condition::equals("id", "u1")
        ))
    );
    assert!(matches!(
        service.check_permissions(&caller, EntityKind::User, Action::Delete),
        Err(AppError::Forbidden(_))
    ));

    Ok(())
}

#[test]
fn course_reads_are_scoped_to_enrolled_courses() -> AppResult<()> {
    let service = service()?;
    let student = principal([Claim::course_role("c1", "_student")]);

    let query = service.check_permissions(&student, EntityKind::Course, Action::List);
    assert_eq!(
        query.ok(),
        Some(EntityQuery::restricted(
            EntityKind::Course,
            Condition::any_of("id", ["c1".to_owned()])
        ))
    );
    assert!(matches!(
        service.check_permissions(&student, EntityKind::Course, Action::Update),
        Err(AppError::Forbidden(_))
    ));

    Ok(())
}

#[test]
fn unenrolled_principal_cannot_read_courses() -> AppResult<()> {
    let service = service()?;
    assert!(matches!(
        service.check_permissions(&principal([]), EntityKind::Course, Action::Get),
        Err(AppError::Forbidden(_))
    ));

    Ok(())
}

#[test]
fn tutors_read_results_of_their_courses_and_their_own() -> AppResult<()> {
    let service = service()?;
    let tutor = principal([
        Claim::course_role("c1", "_tutor"),
        Claim::course_role("c2", "_student"),
    ]);

    let query = service.check_permissions(&tutor, EntityKind::Result, Action::Get);
    assert_eq!(
        query.ok(),
        Some(EntityQuery::restricted(
            EntityKind::Result,
            Condition::Or(vec![
                Condition::equals("user_id", "u1"),
                Condition::any_of("course_id", ["c1".to_owned()]),
            ])
        ))
    );

    Ok(())
}

#[test]
fn course_member_writes_require_lecturer_role() -> AppResult<()> {
    let service = service()?;
    let tutor = principal([Claim::course_role("c1", "_tutor")]);
    let lecturer = principal([Claim::course_role("c1", "_lecturer")]);

    assert!(matches!(
        service.check_permissions(&tutor, EntityKind::CourseMember, Action::Create),
        Err(AppError::Forbidden(_))
    ));
    assert!(
        service
            .check_permissions(&lecturer, EntityKind::CourseMember, Action::Create)
            .is_ok()
    );

    Ok(())
}

#[test]
fn roles_and_groups_have_no_restricted_scope() -> AppResult<()> {
    let service = service()?;
    let student = principal([Claim::course_role("c1", "_owner")]);

    for kind in [EntityKind::Role, EntityKind::RoleClaim, EntityKind::Group] {
        assert!(matches!(
            service.check_permissions(&student, kind, Action::List),
            Err(AppError::Forbidden(_))
        ));
    }

    Ok(())
}
