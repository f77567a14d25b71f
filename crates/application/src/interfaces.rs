//! Entity interfaces of every kind served by the platform.

mod course;
mod course_member;
mod group;
mod result;
mod role;
mod role_claim;
mod session;
mod user;
mod user_role;

use campus_core::Principal;
use campus_domain::CourseRole;

pub use course::CourseInterface;
pub use course_member::CourseMemberInterface;
pub use group::GroupInterface;
pub use result::ResultInterface;
pub use role::RoleInterface;
pub use role_claim::RoleClaimInterface;
pub(crate) use session::SESSION_HASH_COLUMN;
pub use session::SessionInterface;
pub(crate) use user::PASSWORD_HASH_COLUMN;
pub use user::UserInterface;
pub use user_role::UserRoleInterface;

use crate::query::{Condition, FilterValue};

fn text(value: &Option<String>) -> Option<FilterValue> {
    value.clone().map(FilterValue::Text)
}

/// Course ids where the principal holds `minimum` or a higher course role.
pub(crate) fn courses_with_role(principal: &Principal, minimum: CourseRole) -> Vec<String> {
    principal
        .course_roles()
        .filter(|(_, role)| {
            role.parse::<CourseRole>()
                .is_ok_and(|role| role.at_least(minimum))
        })
        .map(|(course_id, _)| course_id.to_owned())
        .collect()
}

/// Highest course role the principal holds in one course.
fn course_role_in(principal: &Principal, course_id: &str) -> Option<CourseRole> {
    principal
        .course_roles()
        .filter(|(id, _)| *id == course_id)
        .filter_map(|(_, role)| role.parse::<CourseRole>().ok())
        .max()
}

/// Rows whose `column` names a course where the principal holds `minimum`.
///
/// Returns `None` when the principal has no such course.
fn course_scope(
    principal: &Principal,
    column: &'static str,
    minimum: CourseRole,
) -> Option<Condition> {
    let course_ids = courses_with_role(principal, minimum);
    if course_ids.is_empty() {
        return None;
    }

    Some(Condition::any_of(column, course_ids))
}

fn owned_by(principal: &Principal, column: &'static str) -> Condition {
    Condition::equals(column, principal.user_id())
}

/// Own rows, or rows of courses where the principal holds `minimum`.
fn owned_or_course_scope(
    principal: &Principal,
    owner_column: &'static str,
    course_column: &'static str,
    minimum: CourseRole,
) -> Condition {
    let mut alternatives = vec![owned_by(principal, owner_column)];
    alternatives.extend(course_scope(principal, course_column, minimum));
    Condition::Or(alternatives)
}
