#![allow(dead_code)]

use std::sync::Arc;

use finance_lib::auth::Caller;
use rstest::*;
use tracing::info;
use tracing::Level;
use uuid::Uuid;

use finance_repo::token_repo::TokenRepo;
use finance_repo::transaction_repo::TransactionRepo;
use finance_repo::user_repo::{NewUser, UserId, UserRepo};

pub mod mock;

pub type Repos = (
    Arc<dyn UserRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn TokenRepo>,
);

/// App with the user and transaction routes, authenticated as `$caller`.
macro_rules! build_app {
    ($repos:ident, $caller:expr) => {{
        let (user_repo, transaction_repo, _token_repo) = $repos.clone();
        let app = actix_web::App::new()
            .app_data(actix_web::web::Data::new(user_repo))
            .app_data(actix_web::web::Data::new(transaction_repo))
            .app_data(finance_lib::json_config())
            .app_data(finance_lib::path_config())
            .wrap(finance_lib::tracing::create_middleware())
            .service(
                actix_web::web::scope("")
                    .configure(finance_lib::transaction::summary_routes)
                    .service(finance_lib::transaction::transaction_service())
                    .service(finance_lib::user::user_service())
                    .wrap(crate::utils::mock::MockAuthentication { caller: $caller }),
            );
        tracing::info!("Built app");
        app
    }};
}

/// The complete app, with real bearer token authentication.
macro_rules! build_full_app {
    ($repos:ident, $jwt_auth:expr, $signups_enabled:expr) => {{
        let (user_repo, transaction_repo, token_repo) = $repos.clone();
        let app = actix_web::App::new()
            .wrap(finance_lib::tracing::create_middleware())
            .configure(finance_lib::app_config_func(
                $jwt_auth,
                user_repo,
                transaction_repo,
                token_repo,
                $signups_enabled,
            ));
        tracing::info!("Built app");
        app
    }};
}

macro_rules! create_transaction {
    (&$service:ident, $new_transaction:expr) => {{
        let request = actix_web::test::TestRequest::post()
            .uri("/transactions")
            .set_json(&$new_transaction)
            .to_request();
        let response = actix_web::test::call_service(&$service, request).await;
        assert_eq!(
            actix_web::http::StatusCode::CREATED,
            response.status(),
            "Got {} response when creating transaction",
            response.status()
        );
        actix_web::test::read_body_json(response).await
    }};
}

pub struct TestUser {
    pub id: UserId,
    pub email: String,
    admin: bool,
    repo: Arc<dyn UserRepo>,
}

impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        Self::create(user_repo, false).await
    }

    pub async fn new_admin(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        Self::create(user_repo, true).await
    }

    async fn create(user_repo: &Arc<dyn UserRepo>, admin: bool) -> TestUser {
        let email = format!("test-user-{}@example.com", Uuid::new_v4());
        let password_hash = finance_lib::auth::password::encode_password("password123").unwrap();
        let new_user = NewUser {
            admin,
            ..NewUser::new("Test User".to_owned(), email.clone(), password_hash)
        };
        let user = user_repo.create_user(new_user).await.unwrap();
        info!(user_id = user.id, %email, "Created user");
        TestUser {
            id: user.id,
            email,
            admin,
            repo: user_repo.clone(),
        }
    }

    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.id,
            admin: self.admin,
        }
    }

    pub async fn delete(&self) {
        self.repo.delete_user(self.id).await.unwrap()
    }
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> Repos {
    finance_repo::mem_repo::create_repos()
}
