//! Process-wide table of entity interfaces, validated once at startup.

use std::collections::HashSet;

use campus_core::{AppError, AppResult, Principal};
use campus_domain::{Action, EntityKind};

use crate::entity_interface::{
    ColumnType, EntityInterface, EntitySchema, FilterField, FilterMode, QueryParameters, Reference,
};
use crate::interfaces::{
    CourseInterface, CourseMemberInterface, GroupInterface, ResultInterface, RoleClaimInterface,
    RoleInterface, SessionInterface, UserInterface, UserRoleInterface,
};
use crate::query::Condition;

type ScopePolicy = fn(&Principal, Action) -> Option<Condition>;

/// Type-erased view of one registered interface.
#[derive(Debug, Clone, Copy)]
pub struct RegisteredInterface {
    kind: EntityKind,
    schema: &'static EntitySchema,
    filters: &'static [FilterField],
    update_fields: &'static [&'static str],
    references: &'static [Reference],
    restricted_scope: ScopePolicy,
}

impl RegisteredInterface {
    fn of<I: EntityInterface>() -> Self {
        Self {
            kind: I::KIND,
            schema: I::schema(),
            filters: <I::Query as QueryParameters>::filter_fields(),
            update_fields: I::update_fields(),
            references: I::references(),
            restricted_scope: I::restricted_scope,
        }
    }

    /// Returns the served kind.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the storage description.
    #[must_use]
    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Returns the narrowed scope the principal may use for the action.
    #[must_use]
    pub fn restricted_scope(&self, principal: &Principal, action: Action) -> Option<Condition> {
        (self.restricted_scope)(principal, action)
    }

    fn validate(&self, registered: &HashSet<EntityKind>) -> AppResult<()> {
        let kind = self.kind;
        require_identifier(kind, self.schema.table)?;

        let mut column_names = HashSet::new();
        for column in self.schema.columns {
            require_identifier(kind, column.name)?;
            if !column_names.insert(column.name) {
                return Err(invalid(
                    kind,
                    format!("column '{}' is declared twice", column.name),
                ));
            }
        }

        for filter in self.filters {
            let Some(column) = self.schema.column(filter.column) else {
                return Err(invalid(
                    kind,
                    format!(
                        "filter '{}' targets unknown column '{}'",
                        filter.name, filter.column
                    ),
                ));
            };

            if column.internal {
                return Err(invalid(
                    kind,
                    format!(
                        "filter '{}' targets internal column '{}'",
                        filter.name, filter.column
                    ),
                ));
            }

            let compatible = match filter.mode {
                FilterMode::ExactText | FilterMode::Contains => {
                    column.column_type == ColumnType::Text
                }
                FilterMode::ExactFlag => column.column_type == ColumnType::Flag,
            };
            if !compatible {
                return Err(invalid(
                    kind,
                    format!(
                        "filter '{}' does not match the type of column '{}'",
                        filter.name, filter.column
                    ),
                ));
            }
        }

        for field in self.update_fields {
            if self
                .schema
                .column(field)
                .is_none_or(|column| column.internal)
            {
                return Err(invalid(
                    kind,
                    format!("update field '{field}' is not a public column"),
                ));
            }
        }

        for reference in self.references {
            if self.schema.column(reference.column).is_none() {
                return Err(invalid(
                    kind,
                    format!("reference column '{}' is unknown", reference.column),
                ));
            }
            if !registered.contains(&reference.kind) {
                return Err(invalid(
                    kind,
                    format!("reference target '{}' is not registered", reference.kind),
                ));
            }
        }

        for unique in self.schema.unique {
            if let Some(column) = unique
                .iter()
                .find(|column| self.schema.column(column).is_none())
            {
                return Err(invalid(
                    kind,
                    format!("unique constraint names unknown column '{column}'"),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(kind: EntityKind, detail: String) -> AppError {
    AppError::Internal(format!("entity interface '{kind}' is invalid: {detail}"))
}

fn require_identifier(kind: EntityKind, name: &str) -> AppResult<()> {
    let mut characters = name.chars();
    let valid_start = characters
        .next()
        .is_some_and(|character| character.is_ascii_lowercase() || character == '_');
    let valid_rest = characters.all(|character| {
        character.is_ascii_lowercase() || character.is_ascii_digit() || character == '_'
    });

    if valid_start && valid_rest {
        return Ok(());
    }

    Err(invalid(kind, format!("'{name}' is not a plain identifier")))
}

/// Collects interfaces before validation.
#[derive(Debug, Default)]
pub struct EntityRegistryBuilder {
    interfaces: Vec<RegisteredInterface>,
}

impl EntityRegistryBuilder {
    /// Adds one interface.
    #[must_use]
    pub fn register<I: EntityInterface>(mut self) -> Self {
        self.interfaces.push(RegisteredInterface::of::<I>());
        self
    }

    /// Validates every interface and freezes the table.
    pub fn build(self) -> AppResult<EntityRegistry> {
        let mut registered = HashSet::new();
        for interface in &self.interfaces {
            if !registered.insert(interface.kind) {
                return Err(invalid(
                    interface.kind,
                    "kind is registered twice".to_owned(),
                ));
            }
        }

        if let Some(missing) = EntityKind::all()
            .iter()
            .find(|kind| !registered.contains(*kind))
        {
            return Err(invalid(
                *missing,
                "kind has no registered interface".to_owned(),
            ));
        }

        for interface in &self.interfaces {
            interface.validate(&registered)?;
        }

        let mut interfaces = self.interfaces;
        interfaces.sort_by_key(|interface| interface.kind.index());

        Ok(EntityRegistry { interfaces })
    }
}

/// Immutable table of every entity interface, indexed by kind.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    interfaces: Vec<RegisteredInterface>,
}

impl EntityRegistry {
    /// Registers and validates the interfaces of every kind.
    pub fn new() -> AppResult<Self> {
        Self::builder()
            .register::<RoleInterface>()
            .register::<RoleClaimInterface>()
            .register::<UserRoleInterface>()
            .register::<UserInterface>()
            .register::<GroupInterface>()
            .register::<SessionInterface>()
            .register::<CourseInterface>()
            .register::<CourseMemberInterface>()
            .register::<ResultInterface>()
            .build()
    }

    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> EntityRegistryBuilder {
        EntityRegistryBuilder::default()
    }

    /// Returns the interface of a kind.
    ///
    /// Construction guarantees one interface per kind, sorted by index.
    #[must_use]
    pub fn interface(&self, kind: EntityKind) -> &RegisteredInterface {
        &self.interfaces[kind.index()]
    }

    /// Returns the storage description of a kind.
    #[must_use]
    pub fn schema(&self, kind: EntityKind) -> &'static EntitySchema {
        self.interface(kind).schema()
    }
}
