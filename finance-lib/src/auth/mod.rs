use crate::error::HandlerError;
use actix_web::dev::ServiceRequest;
use actix_web::web::{Data, ServiceConfig};
use actix_web::{Error, HttpMessage};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use anyhow::anyhow;
use finance_repo::token_repo::TokenRepo;
use finance_repo::user_repo::{UserId, UserRepo, UserRepoError};
use jwt::JWTAuth;
use std::sync::Arc;
use tracing_actix_web::RootSpan;

pub mod handlers;
pub mod jwt;
pub mod password;

/// The authenticated user a request is made on behalf of.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Caller {
    pub user_id: UserId,
    pub admin: bool,
}

impl Caller {
    /// Admins can access every user's records, everyone else only their own.
    pub fn can_access(&self, owner: UserId) -> bool {
        self.admin || self.user_id == owner
    }

    pub fn authorize(&self, owner: UserId) -> Result<(), HandlerError> {
        if self.can_access(owner) {
            Ok(())
        } else {
            Err(HandlerError::forbidden())
        }
    }
}

/// Routes reachable without a token.
pub fn public_routes(signups_enabled: bool) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(handlers::login);
        if signups_enabled {
            cfg.service(handlers::register);
        } else {
            cfg.service(handlers::register_disabled);
        }
    }
}

/// Identity routes that need a [Caller].
pub fn protected_routes(cfg: &mut ServiceConfig) {
    cfg.service(handlers::logout)
        .service(handlers::connected_user)
        .service(handlers::is_admin)
        .service(handlers::is_user_admin);
}

/// Validates the bearer token against [JWTAuth] and the stored tokens. If valid, injects the
/// [Caller] into the request and the user id into the [RootSpan].
pub async fn credentials_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    match resolve_caller(&req, credentials.token()).await {
        Ok(caller) => {
            if let Some(root_span) = req.extensions().get::<RootSpan>() {
                root_span.record("user_id", &caller.user_id);
            }
            req.extensions_mut().insert::<Caller>(caller);
            Ok(req)
        }
        Err(e) => Err((e.into(), req)),
    }
}

async fn resolve_caller(req: &ServiceRequest, token: &str) -> Result<Caller, HandlerError> {
    let jwt_auth = req
        .app_data::<JWTAuth>()
        .ok_or_else(|| anyhow!("JWTAuth not configured"))?;
    let token_repo = req
        .app_data::<Data<Arc<dyn TokenRepo>>>()
        .ok_or_else(|| anyhow!("TokenRepo not configured"))?;
    let user_repo = req
        .app_data::<Data<Arc<dyn UserRepo>>>()
        .ok_or_else(|| anyhow!("UserRepo not configured"))?;

    let claims = jwt_auth
        .validate_token(token)
        .map_err(|_| HandlerError::unauthenticated())?;

    let stored_token = token_repo.get_token(&claims.jti).await?;
    if stored_token.user_id != claims.sub {
        return Err(HandlerError::unauthenticated());
    }

    let user = match user_repo.get_user(claims.sub).await {
        Ok(user) => user,
        Err(UserRepoError::UserNotFound(_)) => return Err(HandlerError::unauthenticated()),
        Err(e) => return Err(e.into()),
    };

    Ok(Caller {
        user_id: user.id,
        admin: user.admin,
    })
}
