use campus_domain::{
    CourseMemberQuery, CourseQuery, EntityKind, GroupQuery, ResultQuery, RoleClaimQuery,
    RoleQuery, SessionQuery, UserQuery, UserRoleQuery,
};
use proptest::option;
use proptest::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::entity_interface::{FilterField, FilterMode, QueryParameters, search};
use crate::query::{Condition, EntityQuery, StoredRecord};
use crate::test_support::record;

/// Values a field may take, valid for the column's shape.
fn candidates(field: &FilterField) -> Vec<Value> {
    match (field.mode, field.column) {
        (FilterMode::ExactFlag, _) => vec![json!(true), json!(false), json!(true)],
        (_, "course_role_id") => vec![json!("_student"), json!("_tutor"), json!("_owner")],
        (_, "status") => vec![json!("scheduled"), json!("failed"), json!("finished")],
        (_, "group_type") => vec![json!("fixed"), json!("dynamic"), json!("fixed")],
        (_, "user_type") => vec![json!("user"), json!("token"), json!("user")],
        _ => vec![json!(""), json!("a"), json!("Ab")],
    }
}

/// Per field: whether the parameter is present, its value, whether the row
/// has a value, and which one.
type FieldChoices = Vec<(bool, usize, bool, usize)>;

fn field_choices<P: QueryParameters>() -> impl Strategy<Value = FieldChoices> {
    proptest::collection::vec(
        (any::<bool>(), 0..3usize, any::<bool>(), 0..3usize),
        P::filter_fields().len(),
    )
}

fn field_admits(field: &FilterField, expected: &Value, actual: &Value) -> bool {
    match (field.mode, expected, actual) {
        (FilterMode::Contains, Value::String(needle), Value::String(text)) => {
            text.to_lowercase().contains(&needle.to_lowercase())
        }
        (_, _, Value::Null) => false,
        _ => expected == actual,
    }
}

/// Checks the identity and conjunction laws of one query shape.
fn check_search_laws<P>(kind: EntityKind, choices: &FieldChoices) -> Result<(), TestCaseError>
where
    P: QueryParameters + DeserializeOwned + Default,
{
    let base = EntityQuery::unrestricted(kind);
    prop_assert_eq!(search::<P>(base.clone(), None), base.clone());
    prop_assert_eq!(search(base.clone(), Some(&P::default())), base.clone());

    let mut params = StoredRecord::new();
    let mut row = StoredRecord::new();
    let mut expected = true;
    for (field, (present, value, stored, stored_value)) in P::filter_fields().iter().zip(choices) {
        let pool = candidates(field);
        let actual = if *stored {
            pool[*stored_value].clone()
        } else {
            Value::Null
        };
        if *present {
            expected &= field_admits(field, &pool[*value], &actual);
            params.insert(field.name.to_owned(), pool[*value].clone());
        }
        row.insert(field.column.to_owned(), actual);
    }

    let params: P = serde_json::from_value(Value::Object(params))
        .map_err(|error| TestCaseError::fail(error.to_string()))?;
    let query = search(base, Some(&params));
    let present = choices.iter().filter(|(present, ..)| *present).count();
    prop_assert_eq!(query.filters().len(), present);
    prop_assert_eq!(query.matches(&row), expected);
    Ok(())
}

fn role_query() -> impl Strategy<Value = RoleQuery> {
    (
        option::of("[ab]{1,2}"),
        option::of("[ab]{0,2}"),
        option::of("[aAb]{0,2}"),
        option::of(any::<bool>()),
    )
        .prop_map(|(id, title, description, builtin)| RoleQuery {
            id,
            title,
            description,
            builtin,
        })
}

proptest! {
    #[test]
    fn search_admits_exactly_the_rows_satisfying_every_present_parameter(
        params in role_query(),
        row_id in "[ab]{1,2}",
        row_title in option::of("[ab]{0,2}"),
        row_description in option::of("[aAb]{0,3}"),
        row_builtin in any::<bool>(),
    ) {
        let row = record(json!({
            "id": row_id,
            "title": row_title,
            "description": row_description,
            "builtin": row_builtin,
        }));

        let expected = params.id.as_ref().is_none_or(|id| *id == row_id)
            && params
                .title
                .as_ref()
                .is_none_or(|title| row_title.as_ref() == Some(title))
            && params.description.as_ref().is_none_or(|needle| {
                row_description
                    .as_ref()
                    .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase()))
            })
            && params.builtin.is_none_or(|builtin| builtin == row_builtin);

        let query = search(EntityQuery::unrestricted(EntityKind::Role), Some(&params));
        prop_assert_eq!(query.matches(&row), expected);
    }

    #[test]
    fn search_only_narrows_a_restricted_query(
        params in role_query(),
        scope_id in "[ab]{1,2}",
        row_id in "[ab]{1,2}",
        row_builtin in any::<bool>(),
    ) {
        let base = EntityQuery::restricted(EntityKind::Role, Condition::id(&scope_id));
        let row = record(json!({
            "id": row_id,
            "title": null,
            "description": null,
            "builtin": row_builtin,
        }));

        let query = search(base.clone(), Some(&params));

        prop_assert_eq!(query.scope(), base.scope());
        prop_assert!(!query.matches(&row) || base.matches(&row));
    }
}

proptest! {
    #[test]
    fn role_search_obeys_the_laws(choices in field_choices::<RoleQuery>()) {
        check_search_laws::<RoleQuery>(EntityKind::Role, &choices)?;
    }

    #[test]
    fn role_claim_search_obeys_the_laws(choices in field_choices::<RoleClaimQuery>()) {
        check_search_laws::<RoleClaimQuery>(EntityKind::RoleClaim, &choices)?;
    }

    #[test]
    fn user_role_search_obeys_the_laws(choices in field_choices::<UserRoleQuery>()) {
        check_search_laws::<UserRoleQuery>(EntityKind::UserRole, &choices)?;
    }

    #[test]
    fn user_search_obeys_the_laws(choices in field_choices::<UserQuery>()) {
        check_search_laws::<UserQuery>(EntityKind::User, &choices)?;
    }

    #[test]
    fn group_search_obeys_the_laws(choices in field_choices::<GroupQuery>()) {
        check_search_laws::<GroupQuery>(EntityKind::Group, &choices)?;
    }

    #[test]
    fn session_search_obeys_the_laws(choices in field_choices::<SessionQuery>()) {
        check_search_laws::<SessionQuery>(EntityKind::Session, &choices)?;
    }

    #[test]
    fn course_search_obeys_the_laws(choices in field_choices::<CourseQuery>()) {
        check_search_laws::<CourseQuery>(EntityKind::Course, &choices)?;
    }

    #[test]
    fn course_member_search_obeys_the_laws(choices in field_choices::<CourseMemberQuery>()) {
        check_search_laws::<CourseMemberQuery>(EntityKind::CourseMember, &choices)?;
    }

    #[test]
    fn result_search_obeys_the_laws(choices in field_choices::<ResultQuery>()) {
        check_search_laws::<ResultQuery>(EntityKind::Result, &choices)?;
    }
}
