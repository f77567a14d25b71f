//! Canonical entity schemas and invariants.
//!
//! Every entity kind has exactly one definition of its create, get, list,
//! update and query shapes, shared by the application services, the storage
//! adapters and the HTTP surface.

#![forbid(unsafe_code)]

mod builtin_roles;
mod course;
mod entity_kind;
mod group;
mod result;
mod role;
mod security;
mod user;
mod validation;

pub use builtin_roles::{BuiltinRole, builtin_roles};
pub use course::{
    CourseCreate, CourseGet, CourseList, CourseMemberCreate, CourseMemberGet, CourseMemberList,
    CourseMemberQuery, CourseMemberUpdate, CourseQuery, CourseUpdate,
};
pub use entity_kind::EntityKind;
pub use group::{GroupCreate, GroupGet, GroupList, GroupQuery, GroupType, GroupUpdate};
pub use result::{ResultCreate, ResultGet, ResultList, ResultQuery, ResultStatus, ResultUpdate};
pub use role::{
    RoleClaimCreate, RoleClaimGet, RoleClaimList, RoleClaimQuery, RoleCreate, RoleGet, RoleList,
    RoleQuery, RoleUpdate, UserRoleCreate, UserRoleGet, UserRoleList, UserRoleQuery,
};
pub use security::{
    ADMIN_ROLE_ID, Action, CourseRole, USER_MANAGER_ROLE_ID, WORKSPACE_USER_ROLE_ID,
};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, SessionGet, SessionList,
    SessionQuery, UserCreate, UserGet, UserList, UserQuery, UserType, UserUpdate,
    validate_password,
};
