//! Route definitions for the dairy herd management backend

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - farm summary
        .nest("/dashboard", dashboard_routes())
        // Protected routes - herd management
        .nest("/animals", animal_routes())
        // Protected routes - worker accounts
        .nest("/workers", worker_routes())
        // Protected routes - customer accounts
        .nest("/customers", customer_routes())
        // Protected routes - production records and stock
        .nest("/milk", milk_routes())
        // Protected routes - sales
        .nest("/sales", sale_routes())
        // Protected routes - expenses
        .nest("/expenses", expense_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login_admin))
        .route("/worker/login", post(handlers::login_worker))
        .route("/customer/login", post(handlers::login_customer))
}

/// Farm summary routes (protected)
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Herd management routes (protected)
fn animal_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_animals).post(handlers::create_animal),
        )
        .route(
            "/:animal_id",
            get(handlers::get_animal)
                .put(handlers::update_animal)
                .delete(handlers::delete_animal),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Worker account routes (protected)
fn worker_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_workers).post(handlers::create_worker),
        )
        .route(
            "/:worker_id",
            get(handlers::get_worker)
                .put(handlers::update_worker)
                .delete(handlers::delete_worker),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer account routes (protected)
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route(
            "/:customer_id/history",
            get(handlers::customer_history),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Production record and stock routes (protected)
fn milk_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_records).post(handlers::add_record))
        .route("/stock", get(handlers::get_stock))
        .route(
            "/:record_id",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::record_sale))
        .route(
            "/:sale_id",
            get(handlers::get_sale)
                .put(handlers::update_sale)
                .delete(handlers::delete_sale),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Expense routes (protected)
fn expense_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/:expense_id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
