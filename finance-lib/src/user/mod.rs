mod handlers;

use actix_web::{web, Scope};

pub fn user_service() -> Scope {
    web::scope("/users")
        .service(handlers::get_all_users)
        .service(handlers::get_user)
        .service(handlers::update_user)
        .service(handlers::delete_user)
        .service(handlers::get_user_transactions)
        .service(handlers::get_user_earnings)
        .service(handlers::get_user_expenses)
}
