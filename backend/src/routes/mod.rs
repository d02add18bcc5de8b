//! Route definitions for BrickWorks Manager

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use shared::models::{Customer, Supplier};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
///
/// Everything except register, login and the PIN-guarded admin routes sits
/// behind the JWT middleware.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        // Factory and subscription
        .nest("/factories", factory_routes())
        .nest("/subscription", subscription_routes())
        // Raw materials
        .nest("/materials", material_routes())
        .nest("/purchases", purchase_routes())
        .nest("/usage", usage_routes())
        // Sales and receivables
        .nest("/sales", sale_routes())
        // Production
        .nest("/products", product_routes())
        .nest("/production", production_routes())
        // Payroll and expenses
        .nest("/employees", employee_routes())
        .nest("/employee-payments", employee_payment_routes())
        .nest("/expenses", expense_routes())
        .nest("/rates", rate_routes())
        // Directory
        .nest("/customers", customer_routes())
        .nest("/suppliers", supplier_routes())
        // Reports
        .nest("/reports", report_routes())
        .route("/dashboard", get(handlers::get_dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Auth routes (public)
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        // Admin routes (PIN, not JWT)
        .nest("/admin", admin_routes())
        .merge(protected)
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/verify-pin", post(handlers::verify_admin_pin))
        .route("/users", get(handlers::list_admin_users))
}

fn factory_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_factory))
        .route(
            "/me",
            get(handlers::get_my_factory).put(handlers::update_my_factory),
        )
}

fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::subscription_status))
        .route("/complete", post(handlers::complete_subscription))
        .route("/restore", post(handlers::restore_subscription))
}

fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_materials).post(handlers::create_material))
        .route("/valuation", get(handlers::inventory_valuation))
        .route(
            "/:material_id",
            get(handlers::get_material)
                .put(handlers::update_material)
                .delete(handlers::delete_material),
        )
        .route("/:material_id/recompute", post(handlers::recompute_material))
}

fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_purchases).post(handlers::create_purchase))
        .route(
            "/:purchase_id",
            get(handlers::get_purchase)
                .put(handlers::update_purchase)
                .delete(handlers::delete_purchase),
        )
}

fn usage_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_usage).post(handlers::create_usage))
        .route(
            "/:usage_id",
            get(handlers::get_usage)
                .put(handlers::update_usage)
                .delete(handlers::delete_usage),
        )
}

fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/payments", post(handlers::record_customer_payment))
        .route("/customers", get(handlers::customer_ledger))
        .route(
            "/customers/:customer_name/statement",
            get(handlers::customer_statement),
        )
        .route(
            "/:sale_id",
            get(handlers::get_sale)
                .put(handlers::update_sale)
                .delete(handlers::delete_sale),
        )
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

fn production_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_production).post(handlers::create_production))
        .route(
            "/:log_id",
            get(handlers::get_production)
                .put(handlers::update_production)
                .delete(handlers::delete_production),
        )
}

fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_employees).post(handlers::create_employee))
        .route(
            "/:employee_id",
            get(handlers::get_employee)
                .put(handlers::update_employee)
                .delete(handlers::delete_employee),
        )
}

fn employee_payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_employee_payments).post(handlers::create_employee_payment),
        )
        .route(
            "/:payment_id",
            get(handlers::get_employee_payment)
                .put(handlers::update_employee_payment)
                .delete(handlers::delete_employee_payment),
        )
}

fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_expenses).post(handlers::create_expense))
        .route(
            "/:expense_id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
}

fn rate_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_rates).post(handlers::create_rate))
        .route("/current", get(handlers::current_piece_rates))
        .route(
            "/:rate_id",
            axum::routing::put(handlers::update_rate).delete(handlers::delete_rate),
        )
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_contacts::<Customer>).post(handlers::create_contact::<Customer>),
        )
        .route(
            "/:customer_id",
            get(handlers::get_contact::<Customer>)
                .put(handlers::update_contact::<Customer>)
                .delete(handlers::delete_contact::<Customer>),
        )
}

fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_contacts::<Supplier>).post(handlers::create_contact::<Supplier>),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_contact::<Supplier>)
                .put(handlers::update_contact::<Supplier>)
                .delete(handlers::delete_contact::<Supplier>),
        )
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/profit-loss", get(handlers::profit_loss_report))
        .route("/profit-loss.csv", get(handlers::export_profit_loss_csv))
}
