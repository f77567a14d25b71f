//! Application services and ports.
//!
//! Every entity kind is served through one generic pipeline: an
//! [`EntityInterface`] describes the kind, [`AuthorizationService`] turns a
//! principal into a scoped [`EntityQuery`], and [`EntityService`] runs the
//! query against an [`EntityRepository`].

#![forbid(unsafe_code)]

mod auth_service;
mod authorization_service;
mod bootstrap_service;
mod entity_interface;
mod entity_ports;
mod entity_registry;
mod entity_service;
mod interfaces;
mod query;
mod test_run_service;

#[cfg(test)]
mod query_laws;
#[cfg(test)]
mod test_support;

pub use auth_service::{AuthService, IssuedSession, PasswordHasher};
pub use authorization_service::AuthorizationService;
pub use bootstrap_service::BootstrapService;
pub use entity_interface::{
    Column, ColumnDefault, ColumnType, EntityInterface, EntitySchema, FilterField, FilterMode,
    QueryParameters, Reference, Unsupported, WritePayload, search,
};
pub use entity_ports::EntityRepository;
pub use entity_registry::{EntityRegistry, EntityRegistryBuilder, RegisteredInterface};
pub use entity_service::EntityService;
pub use interfaces::{
    CourseInterface, CourseMemberInterface, GroupInterface, ResultInterface, RoleClaimInterface,
    RoleInterface, SessionInterface, UserInterface, UserRoleInterface,
};
pub use query::{
    Condition, DEFAULT_LIST_LIMIT, EntityQuery, FilterValue, ID_COLUMN, ListWindow,
    MAX_LIST_LIMIT, StoredRecord,
};
pub use test_run_service::{
    TestJobDescriptor, TestJobDispatcher, TestRunReceipt, TestRunRequest, TestRunService,
    TestRunStatus,
};
