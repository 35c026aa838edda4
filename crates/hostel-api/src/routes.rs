//! Router assembly

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// All routes. Cross-cutting layers (CORS, tracing) are added by the binary.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(handlers::health::health_check));

    let payment_routes = Router::new()
        .route("/payments/allocate", post(handlers::allocations::allocate))
        .route("/payments/allocations", get(handlers::reports::list_allocations))
        .route("/payments/allocations/{id}", delete(handlers::allocations::checkout))
        .route(
            "/payments",
            get(handlers::reports::list_payments).post(handlers::payments::record_payment),
        )
        .route("/payments/summary/{allocation_id}", get(handlers::payments::payment_summary))
        .route("/payments/statistics", get(handlers::reports::finance_statistics));

    let admin_routes = Router::new()
        .route(
            "/expenses",
            get(handlers::expenses::list_expenses).post(handlers::expenses::record_expense),
        )
        .route("/expenses/summary", get(handlers::expenses::expense_summary))
        .route(
            "/semesters",
            get(handlers::semesters::list_semesters).post(handlers::semesters::create_semester),
        )
        .route("/semesters/active", get(handlers::semesters::active_semester))
        .route("/semesters/{id}/activate", post(handlers::semesters::activate_semester))
        .route("/students", post(handlers::students::register_student))
        .route("/check-ins", post(handlers::check_ins::check_in))
        .route("/check-ins/{id}/checkout", post(handlers::check_ins::check_out));

    Router::new()
        .merge(public_routes)
        .merge(payment_routes)
        .merge(admin_routes)
        .with_state(state)
}
