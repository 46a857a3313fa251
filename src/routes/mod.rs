use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{admin, auth, bookings, travel};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::middleware::user_rate_limit::create_user_governor;
use crate::AppState;

/// Build the API router. The per-IP governor is added by the caller since it
/// needs the peer address from `ConnectInfo`.
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let public_routes = Router::new()
        .route("/home", get(travel::home))
        .route("/travel-options", get(travel::list_travel_options))
        .route("/travel-options/{id}", get(travel::get_travel_option));

    // Authenticated user routes (per-user rate limit)
    let user_routes = Router::new()
        .route("/travel-options/{id}/book", post(bookings::create_booking))
        .route("/bookings", get(bookings::my_bookings))
        .route("/bookings/{id}/cancel", post(bookings::cancel_booking))
        .route("/profile", get(auth::profile).put(auth::update_profile))
        .layer(create_user_governor())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        .route("/travel-options", post(admin::create_travel_option))
        .route(
            "/travel-options/{id}",
            put(admin::update_travel_option).delete(admin::delete_travel_option),
        )
        .route("/bookings", get(admin::list_all_bookings))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes.merge(user_routes))
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
