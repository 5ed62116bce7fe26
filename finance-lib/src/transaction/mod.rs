use actix_web::web::ServiceConfig;
use actix_web::{web, Scope};

mod handlers;
pub mod payload;

pub fn transaction_service() -> Scope {
    web::scope("/transactions")
        .service(handlers::create_new_transaction)
        .service(handlers::get_all_transactions)
        .service(handlers::get_transaction)
        .service(handlers::update_transaction)
        .service(handlers::delete_transaction)
}

/// Filtered listings and sums over the caller's transactions.
pub fn summary_routes(cfg: &mut ServiceConfig) {
    cfg.service(handlers::get_earnings)
        .service(handlers::get_expenses)
        .service(handlers::get_earnings_sum)
        .service(handlers::get_expenses_sum)
        .service(handlers::get_total_sum);
}
