use sqlx::{Postgres, QueryBuilder};

use campus_application::{Condition, EntityQuery, EntitySchema, FilterValue};
use campus_core::{AppError, AppResult};

use super::ROW_ALIAS;

/// Appends the `WHERE` clause for the scope and filters of a query.
pub(super) fn push_query_conditions(
    builder: &mut QueryBuilder<'_, Postgres>,
    schema: &EntitySchema,
    query: &EntityQuery,
) -> AppResult<()> {
    builder.push(" WHERE TRUE");
    for condition in query.conditions() {
        builder.push(" AND ");
        push_condition(builder, schema, condition)?;
    }
    Ok(())
}

fn push_column(
    builder: &mut QueryBuilder<'_, Postgres>,
    schema: &EntitySchema,
    column: &str,
) -> AppResult<()> {
    if schema.column(column).is_none() {
        return Err(AppError::Internal(format!(
            "condition references unknown column '{}.{column}'",
            schema.table
        )));
    }

    builder.push(ROW_ALIAS);
    builder.push('.');
    builder.push(column);
    Ok(())
}

/// Escapes `LIKE` metacharacters so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    for character in needle.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}

fn push_group(
    builder: &mut QueryBuilder<'_, Postgres>,
    schema: &EntitySchema,
    conditions: &[Condition],
    separator: &str,
) -> AppResult<()> {
    builder.push('(');
    for (index, condition) in conditions.iter().enumerate() {
        if index > 0 {
            builder.push(separator);
        }
        push_condition(builder, schema, condition)?;
    }
    builder.push(')');
    Ok(())
}

fn push_condition(
    builder: &mut QueryBuilder<'_, Postgres>,
    schema: &EntitySchema,
    condition: &Condition,
) -> AppResult<()> {
    match condition {
        Condition::Equals { column, value } => {
            push_column(builder, schema, column)?;
            builder.push(" = ");
            match value {
                FilterValue::Text(text) => builder.push_bind(text.clone()),
                FilterValue::Flag(flag) => builder.push_bind(*flag),
            };
        }
        Condition::ContainsInsensitive { column, needle } => {
            push_column(builder, schema, column)?;
            builder.push(" ILIKE ");
            builder.push_bind(format!("%{}%", escape_like(needle)));
        }
        Condition::AnyOf { values, .. } if values.is_empty() => {
            builder.push("FALSE");
        }
        Condition::AnyOf { column, values } => {
            push_column(builder, schema, column)?;
            builder.push(" = ANY(");
            builder.push_bind(values.clone());
            builder.push(')');
        }
        Condition::All(conditions) if conditions.is_empty() => {
            builder.push("TRUE");
        }
        Condition::All(conditions) => push_group(builder, schema, conditions, " AND ")?,
        Condition::Or(conditions) if conditions.is_empty() => {
            builder.push("FALSE");
        }
        Condition::Or(conditions) => push_group(builder, schema, conditions, " OR ")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use campus_application::{Condition, CourseMemberInterface, EntityInterface, EntityQuery};
    use campus_core::{AppError, AppResult};
    use campus_domain::EntityKind;
    use sqlx::{Postgres, QueryBuilder};

    use super::{escape_like, push_query_conditions};

    fn render(query: &EntityQuery) -> AppResult<String> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1");
        push_query_conditions(&mut builder, CourseMemberInterface::schema(), query)?;
        Ok(builder.sql().to_owned())
    }

    #[test]
    fn scope_and_filters_render_as_one_conjunction() -> AppResult<()> {
        let query = EntityQuery::restricted(
            EntityKind::CourseMember,
            Condition::Or(vec![
                Condition::equals("user_id", "u1"),
                Condition::any_of("course_id", ["c1".to_owned(), "c2".to_owned()]),
            ]),
        )
        .and(Condition::equals("course_role_id", "_student"));

        assert_eq!(
            render(&query)?,
            "SELECT 1 WHERE TRUE AND (entity_row.user_id = $1 OR entity_row.course_id = ANY($2)) \
             AND entity_row.course_role_id = $3"
        );
        Ok(())
    }

    #[test]
    fn empty_groups_render_as_constants() -> AppResult<()> {
        let query = EntityQuery::restricted(EntityKind::CourseMember, Condition::Or(Vec::new()))
            .and(Condition::All(Vec::new()))
            .and(Condition::any_of("course_id", Vec::new()));

        assert_eq!(
            render(&query)?,
            "SELECT 1 WHERE TRUE AND FALSE AND TRUE AND FALSE"
        );
        Ok(())
    }

    #[test]
    fn unknown_columns_are_refused() {
        let query = EntityQuery::unrestricted(EntityKind::CourseMember)
            .and(Condition::equals("nickname", "ada"));

        assert!(matches!(render(&query), Err(AppError::Internal(_))));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
    }
}
