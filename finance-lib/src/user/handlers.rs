use crate::auth::Caller;
use crate::error::HandlerError;
use crate::validation::{self, ValidationErrors, MAX_STRING_LENGTH};
use actix_web::{delete, get, put, web, HttpResponse, Responder};
use finance_repo::transaction_repo::{Filter, TransactionRepo, TransactionType};
use finance_repo::user_repo::{UserId, UserRepo, UserRepoError, UserUpdate};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
pub struct UserPayload {
    name: Option<Value>,
    email: Option<Value>,
    admin: Option<Value>,
}

impl UserPayload {
    fn validate(&self) -> Result<UserUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = validation::required_string("name", self.name.as_ref(), MAX_STRING_LENGTH);
        let email = validation::email("email", self.email.as_ref());
        let admin = validation::boolean("admin", self.admin.as_ref());
        errors.collect("name", &name);
        errors.collect("email", &email);
        errors.collect("admin", &admin);

        match (name, email, admin) {
            (Ok(name), Ok(email), Ok(admin)) => Ok(UserUpdate { name, email, admin }),
            _ => Err(errors),
        }
    }
}

#[get("")]
pub async fn get_all_users(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    caller: web::ReqData<Caller>,
) -> Result<impl Responder, HandlerError> {
    if !caller.admin {
        return Err(HandlerError::forbidden());
    }
    let users = user_repo.get_all_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/{user_id}")]
pub async fn get_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    caller: web::ReqData<Caller>,
    user_id: web::Path<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    caller.authorize(user_id)?;

    let user = user_repo.get_user(user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[put("/{user_id}")]
pub async fn update_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    caller: web::ReqData<Caller>,
    user_id: web::Path<UserId>,
    payload: web::Json<UserPayload>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    caller.authorize(user_id)?;
    let user = user_repo.get_user(user_id).await?;

    let update = payload.validate()?;
    if let Some(existing) = user_repo.get_user_by_email(&update.email).await? {
        if existing.id != user_id {
            return Err(UserRepoError::EmailAlreadyExists(update.email).into());
        }
    }
    if update.admin != user.admin && !caller.admin {
        return Err(HandlerError::forbidden());
    }

    let user = user_repo.update_user(user_id, update).await?;
    info!(user_id, updated_by = caller.user_id, "Updated user");
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/{user_id}")]
pub async fn delete_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    caller: web::ReqData<Caller>,
    user_id: web::Path<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    caller.authorize(user_id)?;

    user_repo.delete_user(user_id).await?;
    info!(user_id, deleted_by = caller.user_id, "Deleted user");
    Ok(HttpResponse::Ok().json(json!({
        "status": true,
        "message": "User deleted successfully",
    })))
}

async fn list_for_user(
    user_repo: &dyn UserRepo,
    transaction_repo: &dyn TransactionRepo,
    caller: &Caller,
    user_id: UserId,
    filter: Filter,
) -> Result<HttpResponse, HandlerError> {
    caller.authorize(user_id)?;
    user_repo.get_user(user_id).await?;

    let transactions = transaction_repo.get_all_transactions(user_id, filter).await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/{user_id}/transactions")]
pub async fn get_user_transactions(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
    user_id: web::Path<UserId>,
) -> Result<impl Responder, HandlerError> {
    list_for_user(
        &***user_repo,
        &***transaction_repo,
        &caller,
        user_id.into_inner(),
        Filter::NONE,
    )
    .await
}

#[get("/{user_id}/earnings")]
pub async fn get_user_earnings(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
    user_id: web::Path<UserId>,
) -> Result<impl Responder, HandlerError> {
    list_for_user(
        &***user_repo,
        &***transaction_repo,
        &caller,
        user_id.into_inner(),
        Filter::of_type(TransactionType::Earning),
    )
    .await
}

#[get("/{user_id}/expenses")]
pub async fn get_user_expenses(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
    user_id: web::Path<UserId>,
) -> Result<impl Responder, HandlerError> {
    list_for_user(
        &***user_repo,
        &***transaction_repo,
        &caller,
        user_id.into_inner(),
        Filter::of_type(TransactionType::Expense),
    )
    .await
}
