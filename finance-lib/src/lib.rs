use actix_web::web::{self, Data, ServiceConfig};
use actix_web_httpauth::middleware::HttpAuthentication;
use auth::jwt::JWTAuth;
use finance_repo::token_repo::TokenRepo;
use finance_repo::transaction_repo::TransactionRepo;
use finance_repo::user_repo::UserRepo;
use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod error;
pub mod tracing;
pub mod transaction;
pub mod user;
pub mod validation;

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(error::json_payload_error)
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(error::path_error)
}

/// Registers shared state and every route. Routes other than `/register` and `/login` sit behind
/// the bearer token gate.
pub fn app_config_func(
    jwt_auth: JWTAuth,
    user_repo: Arc<dyn UserRepo>,
    transaction_repo: Arc<dyn TransactionRepo>,
    token_repo: Arc<dyn TokenRepo>,
    signups_enabled: bool,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let bearer_auth_middleware = HttpAuthentication::bearer(auth::credentials_validator);
        cfg.app_data(jwt_auth)
            .app_data(Data::new(user_repo))
            .app_data(Data::new(transaction_repo))
            .app_data(Data::new(token_repo))
            .app_data(json_config())
            .app_data(path_config())
            .configure(auth::public_routes(signups_enabled))
            .service(
                web::scope("")
                    .configure(auth::protected_routes)
                    .configure(transaction::summary_routes)
                    .service(user::user_service())
                    .service(transaction::transaction_service())
                    .wrap(bearer_auth_middleware)
                    .wrap(error::json_error_handlers()),
            );
    }
}
