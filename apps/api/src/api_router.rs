use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, get, post, put};
use campus_application::{
    CourseInterface, CourseMemberInterface, EntityInterface, GroupInterface, ResultInterface,
    RoleClaimInterface, RoleInterface, SessionInterface, UserInterface, UserRoleInterface,
};
use campus_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, entities, health, test_runs};
use crate::middleware;
use crate::state::AppState;

/// Write endpoints an entity kind exposes besides list, get and delete.
#[derive(Debug, Clone, Copy)]
struct Writes {
    create: bool,
    update: bool,
}

impl Writes {
    const ALL: Self = Self {
        create: true,
        update: true,
    };
    const CREATE: Self = Self {
        create: true,
        update: false,
    };
    const NONE: Self = Self {
        create: false,
        update: false,
    };
}

fn entity_routes<I: EntityInterface>(
    router: Router<AppState>,
    path: &str,
    writes: Writes,
) -> Router<AppState> {
    let mut collection: MethodRouter<AppState> = get(entities::list_handler::<I>);
    if writes.create {
        collection = collection.post(entities::create_handler::<I>);
    }

    let mut item: MethodRouter<AppState> =
        get(entities::get_handler::<I>).delete(entities::delete_handler::<I>);
    if writes.update {
        item = item.patch(entities::update_handler::<I>);
    }

    router
        .route(&format!("/api/{path}"), collection)
        .route(&format!("/api/{path}/{{id}}"), item)
}

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let mut protected_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/auth/me", get(auth::me_handler))
        .route(
            "/api/users/{id}/password",
            put(auth::set_password_handler),
        )
        .route("/api/tests", post(test_runs::create_test_run_handler))
        .route(
            "/api/tests/status/{result_id}",
            get(test_runs::test_run_status_handler),
        );

    protected_routes = entity_routes::<RoleInterface>(protected_routes, "roles", Writes::ALL);
    protected_routes =
        entity_routes::<RoleClaimInterface>(protected_routes, "role-claims", Writes::CREATE);
    protected_routes =
        entity_routes::<UserRoleInterface>(protected_routes, "user-roles", Writes::CREATE);
    protected_routes = entity_routes::<UserInterface>(protected_routes, "users", Writes::ALL);
    protected_routes = entity_routes::<GroupInterface>(protected_routes, "groups", Writes::ALL);
    protected_routes =
        entity_routes::<SessionInterface>(protected_routes, "sessions", Writes::NONE);
    protected_routes = entity_routes::<CourseInterface>(protected_routes, "courses", Writes::ALL);
    protected_routes =
        entity_routes::<CourseMemberInterface>(protected_routes, "course-members", Writes::ALL);
    protected_routes = entity_routes::<ResultInterface>(protected_routes, "results", Writes::ALL);

    let protected_routes = protected_routes.route_layer(from_fn_with_state(
        app_state.clone(),
        middleware::require_auth,
    ));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Ok(Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
