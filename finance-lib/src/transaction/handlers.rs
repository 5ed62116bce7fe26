use crate::auth::Caller;
use crate::error::HandlerError;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use finance_repo::transaction_repo::{
    Filter, Transaction, TransactionId, TransactionRepo, TransactionType,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::payload::TransactionPayload;

/// Sums are returned as plain JSON numbers.
#[derive(Serialize)]
struct Amount(#[serde(with = "rust_decimal::serde::float")] Decimal);

/// Fetches a transaction the caller is allowed to see. Missing transactions are reported before
/// foreign ones.
async fn get_authorized(
    transaction_repo: &dyn TransactionRepo,
    caller: &Caller,
    transaction_id: TransactionId,
) -> Result<Transaction, HandlerError> {
    let transaction = transaction_repo.get_transaction(transaction_id).await?;
    caller.authorize(transaction.user_id)?;
    Ok(transaction)
}

#[get("/{transaction_id}")]
pub async fn get_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
    transaction_id: web::Path<TransactionId>,
) -> Result<impl Responder, HandlerError> {
    let transaction =
        get_authorized(&***transaction_repo, &caller, transaction_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[get("")]
pub async fn get_all_transactions(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
) -> Result<impl Responder, HandlerError> {
    let transactions = transaction_repo
        .get_all_transactions(caller.user_id, Filter::NONE)
        .await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[post("")]
pub async fn create_new_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
    payload: web::Json<TransactionPayload>,
) -> Result<impl Responder, HandlerError> {
    let valid = payload.validate()?;
    let transaction = transaction_repo
        .create_new_transaction(caller.user_id, valid.into())
        .await?;
    info!(
        user_id = caller.user_id,
        transaction_id = transaction.id,
        "Created transaction"
    );
    Ok(HttpResponse::Created().json(transaction))
}

#[put("/{transaction_id}")]
pub async fn update_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
    transaction_id: web::Path<TransactionId>,
    payload: web::Json<TransactionPayload>,
) -> Result<impl Responder, HandlerError> {
    let transaction_id = transaction_id.into_inner();
    get_authorized(&***transaction_repo, &caller, transaction_id).await?;

    let valid = payload.validate()?;
    let transaction = transaction_repo
        .update_transaction(transaction_id, valid.into())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[delete("/{transaction_id}")]
pub async fn delete_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
    transaction_id: web::Path<TransactionId>,
) -> Result<impl Responder, HandlerError> {
    let transaction_id = transaction_id.into_inner();
    get_authorized(&***transaction_repo, &caller, transaction_id).await?;

    transaction_repo.delete_transaction(transaction_id).await?;
    info!(user_id = caller.user_id, transaction_id, "Deleted transaction");
    Ok(HttpResponse::Ok().json(json!({
        "status": true,
        "message": "Transaction deleted successfully",
    })))
}

#[get("/earnings")]
pub async fn get_earnings(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
) -> Result<impl Responder, HandlerError> {
    let transactions = transaction_repo
        .get_all_transactions(caller.user_id, Filter::of_type(TransactionType::Earning))
        .await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/expenses")]
pub async fn get_expenses(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
) -> Result<impl Responder, HandlerError> {
    let transactions = transaction_repo
        .get_all_transactions(caller.user_id, Filter::of_type(TransactionType::Expense))
        .await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/earnings-sum")]
pub async fn get_earnings_sum(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
) -> Result<impl Responder, HandlerError> {
    let total = transaction_repo
        .get_sum(caller.user_id, Filter::of_type(TransactionType::Earning))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "total_earnings": Amount(total) })))
}

#[get("/expenses-sum")]
pub async fn get_expenses_sum(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
) -> Result<impl Responder, HandlerError> {
    let total = transaction_repo
        .get_sum(caller.user_id, Filter::of_type(TransactionType::Expense))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "total_expenses": Amount(total) })))
}

/// Plain sum of every amount, whatever the type.
#[get("/total-sum")]
pub async fn get_total_sum(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    caller: web::ReqData<Caller>,
) -> Result<impl Responder, HandlerError> {
    let total = transaction_repo
        .get_sum(caller.user_id, Filter::NONE)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "sum": Amount(total) })))
}
