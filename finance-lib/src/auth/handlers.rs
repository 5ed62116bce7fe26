use crate::auth::jwt::JWTAuth;
use crate::auth::{password, Caller};
use crate::error::HandlerError;
use crate::validation::{self, ValidationErrors, MAX_STRING_LENGTH};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use anyhow::anyhow;
use finance_repo::token_repo::TokenRepo;
use finance_repo::user_repo::{NewUser, UserId, UserRepo};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct RegisterPayload {
    name: Option<Value>,
    email: Option<Value>,
    password: Option<Value>,
    password_confirmation: Option<Value>,
}

#[derive(Deserialize)]
pub struct LoginPayload {
    email: Option<Value>,
    password: Option<Value>,
}

fn jwt_auth(req: &HttpRequest) -> Result<&JWTAuth, HandlerError> {
    req.app_data::<JWTAuth>()
        .ok_or_else(|| anyhow!("JWTAuth not configured").into())
}

/// Stores a fresh token id for the user and returns the signed bearer token. With `replace` set
/// every other token of the user is revoked in the same step.
async fn issue_token(
    jwt_auth: &JWTAuth,
    token_repo: &dyn TokenRepo,
    user_id: UserId,
    replace: bool,
) -> Result<String, HandlerError> {
    let token_id = Uuid::new_v4().to_string();
    let token = jwt_auth.create_token(user_id, &token_id)?;
    if replace {
        token_repo.replace_tokens(user_id, &token_id).await?;
    } else {
        token_repo.create_token(user_id, &token_id).await?;
    }
    Ok(token)
}

#[post("/register")]
pub async fn register(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    token_repo: web::Data<Arc<dyn TokenRepo>>,
    payload: web::Json<RegisterPayload>,
    req: HttpRequest,
) -> Result<impl Responder, HandlerError> {
    let payload = payload.into_inner();

    let mut errors = ValidationErrors::new();
    let name = validation::required_string("name", payload.name.as_ref(), MAX_STRING_LENGTH);
    let email = validation::email("email", payload.email.as_ref());
    let password = validation::password(
        "password",
        payload.password.as_ref(),
        payload.password_confirmation.as_ref(),
    );
    errors.collect("name", &name);
    errors.collect("email", &email);
    errors.collect("password", &password);

    if let Ok(email) = &email {
        if user_repo.get_user_by_email(email).await?.is_some() {
            errors.add("email", validation::EMAIL_TAKEN);
        }
    }

    let (name, email, password) = match (name, email, password) {
        (Ok(name), Ok(email), Ok(password)) if errors.is_empty() => (name, email, password),
        _ => return Err(errors.into()),
    };

    let password_hash = password::encode_password(&password)?;
    let user = user_repo
        .create_user(NewUser::new(name, email, password_hash))
        .await?;
    info!(user_id = user.id, "Registered user");

    let token = issue_token(jwt_auth(&req)?, &***token_repo, user.id, false).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": true,
        "message": "User Created Successfully",
        "token": token,
    })))
}

#[post("/register")]
pub async fn register_disabled() -> Result<HttpResponse, HandlerError> {
    Err(HandlerError::Authorization(
        "Registration is disabled.".to_owned(),
    ))
}

#[post("/login")]
pub async fn login(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    token_repo: web::Data<Arc<dyn TokenRepo>>,
    payload: web::Json<LoginPayload>,
    req: HttpRequest,
) -> Result<impl Responder, HandlerError> {
    let payload = payload.into_inner();

    let mut errors = ValidationErrors::new();
    let email = validation::email("email", payload.email.as_ref());
    let password = validation::required_string(
        "password",
        payload.password.as_ref(),
        usize::MAX,
    );
    errors.collect("email", &email);
    errors.collect("password", &password);

    let (email, password) = match (email, password) {
        (Ok(email), Ok(password)) => (email, password),
        _ => return Err(errors.into()),
    };

    // unknown email and wrong password are indistinguishable to the client
    let user = user_repo
        .get_user_by_email(&email)
        .await?
        .ok_or_else(HandlerError::invalid_credentials)?;
    if !password::verify_password(&password, &user.password_hash)? {
        return Err(HandlerError::invalid_credentials());
    }

    let token = issue_token(jwt_auth(&req)?, &***token_repo, user.id, true).await?;
    info!(user_id = user.id, "User logged in");

    Ok(HttpResponse::Ok().json(json!({
        "status": true,
        "message": "Login successful",
        "user": user,
        "token": token,
    })))
}

#[post("/logout")]
pub async fn logout(
    token_repo: web::Data<Arc<dyn TokenRepo>>,
    caller: web::ReqData<Caller>,
) -> Result<impl Responder, HandlerError> {
    let revoked = token_repo.revoke_tokens(caller.user_id).await?;
    info!(user_id = caller.user_id, revoked, "User logged out");

    Ok(HttpResponse::Ok().json(json!({
        "status": true,
        "message": "Logout successful",
    })))
}

#[get("/connectedUser")]
pub async fn connected_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    caller: web::ReqData<Caller>,
) -> Result<impl Responder, HandlerError> {
    let user = user_repo.get_user(caller.user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/isadmin")]
pub async fn is_admin(caller: web::ReqData<Caller>) -> impl Responder {
    HttpResponse::Ok().json(json!({ "is_admin": caller.admin }))
}

#[get("/isadmin/{user_id}")]
pub async fn is_user_admin(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    caller: web::ReqData<Caller>,
    user_id: web::Path<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    caller.authorize(user_id)?;

    let user = user_repo.get_user(user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "is_admin": user.admin })))
}
