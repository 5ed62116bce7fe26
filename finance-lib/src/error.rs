use crate::validation::{self, ValidationErrors};
use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::error::{JsonPayloadError, PathError};
use actix_web::http::header::{self, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use finance_repo::token_repo::TokenRepoError;
use finance_repo::transaction_repo::TransactionRepoError;
use finance_repo::user_repo::UserRepoError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("The given data was invalid.")]
    Validation(ValidationErrors),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Unable to parse JSON payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn unauthenticated() -> HandlerError {
        HandlerError::Authentication("Unauthenticated.".to_owned())
    }

    pub fn invalid_credentials() -> HandlerError {
        HandlerError::Authentication("Invalid credentials".to_owned())
    }

    pub fn forbidden() -> HandlerError {
        HandlerError::Authorization("This action is unauthorized.".to_owned())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Validation(_) => "validation_error",
            HandlerError::Authentication(_) => "authentication_error",
            HandlerError::Authorization(_) => "authorization_error",
            HandlerError::NotFound(_) => "not_found",
            HandlerError::InvalidPayload(_) => "invalid_payload",
            HandlerError::Internal(_) => "internal_error",
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            HandlerError::Validation(errors) => json!({
                "status": false,
                "kind": self.kind(),
                "message": self.to_string(),
                "errors": errors,
            }),
            // details of internal errors are only logged
            HandlerError::Internal(_) => json!({
                "status": false,
                "kind": self.kind(),
                "message": "Internal server error",
            }),
            _ => json!({
                "status": false,
                "kind": self.kind(),
                "message": self.to_string(),
            }),
        }
    }
}

impl From<UserRepoError> for HandlerError {
    fn from(e: UserRepoError) -> Self {
        match e {
            UserRepoError::UserNotFound(_) => HandlerError::NotFound("User not found".to_owned()),
            UserRepoError::EmailAlreadyExists(_) => HandlerError::Validation(
                ValidationErrors::single("email", validation::EMAIL_TAKEN),
            ),
            UserRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<TransactionRepoError> for HandlerError {
    fn from(e: TransactionRepoError) -> Self {
        match e {
            TransactionRepoError::TransactionNotFound(_) => {
                HandlerError::NotFound("Transaction not found".to_owned())
            }
            TransactionRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<TokenRepoError> for HandlerError {
    fn from(e: TokenRepoError) -> Self {
        match e {
            TokenRepoError::TokenNotFound(_) => HandlerError::unauthenticated(),
            TokenRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<argon2::Error> for HandlerError {
    fn from(e: argon2::Error) -> Self {
        HandlerError::Internal(anyhow::Error::new(e).context("Password hashing failed"))
    }
}

impl From<jsonwebtoken::errors::Error> for HandlerError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        HandlerError::Internal(anyhow::Error::new(e).context("Unable to create token"))
    }
}

impl From<ValidationErrors> for HandlerError {
    fn from(errors: ValidationErrors) -> Self {
        HandlerError::Validation(errors)
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HandlerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            HandlerError::Authorization(_) => StatusCode::FORBIDDEN,
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            HandlerError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        if let HandlerError::Internal(e) = self {
            error!(error = ?e, "Internal error");
        }
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

/// Error handler for [actix_web::web::JsonConfig], turning unparseable bodies into
/// `invalid_payload` errors.
pub fn json_payload_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    error!(req_path = req.path(), %err);
    HandlerError::InvalidPayload(err.to_string()).into()
}

/// Error handler for [actix_web::web::PathConfig]. An id that does not parse names no resource,
/// so it is reported as `not_found`.
pub fn path_error(err: PathError, req: &HttpRequest) -> actix_web::Error {
    info!(req_path = req.path(), %err, "Unparseable path");
    HandlerError::NotFound("Resource not found".to_owned()).into()
}

/// Middleware rewriting 401 responses that were not produced by [HandlerError] (e.g. a missing
/// `Authorization` header rejected by the bearer extractor) into the JSON error shape.
pub fn json_error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::UNAUTHORIZED, json_unauthorized)
}

fn json_unauthorized<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let is_json = res
        .response()
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|content_type| content_type == "application/json")
        .unwrap_or(false);
    if is_json {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let (req, res) = res.into_parts();
    let res = res.set_body(HandlerError::unauthenticated().body().to_string());
    let mut res = ServiceResponse::new(req, res)
        .map_into_boxed_body()
        .map_into_right_body();
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(ErrorHandlerResponse::Response(res))
}

#[cfg(test)]
mod tests {
    use super::HandlerError;
    use crate::validation::ValidationErrors;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use finance_repo::transaction_repo::TransactionRepoError;
    use finance_repo::user_repo::UserRepoError;

    #[test]
    fn repo_errors_map_to_status_codes() {
        let not_found: HandlerError = TransactionRepoError::TransactionNotFound(3).into();
        assert_eq!(StatusCode::NOT_FOUND, not_found.status_code());

        let taken: HandlerError = UserRepoError::EmailAlreadyExists("a@b.co".to_owned()).into();
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, taken.status_code());
        assert_eq!("validation_error", taken.kind());

        let other: HandlerError = UserRepoError::Other(anyhow::anyhow!("db down")).into();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, other.status_code());
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let error = HandlerError::Internal(anyhow::anyhow!("connection refused"));
        let body = error.body();
        assert_eq!("Internal server error", body["message"]);
        assert_eq!(false, body["status"]);
    }

    #[test]
    fn validation_body_lists_fields() {
        let error = HandlerError::Validation(ValidationErrors::single(
            "name",
            "The name field is required.",
        ));
        let body = error.body();
        assert_eq!("validation_error", body["kind"]);
        assert_eq!("The name field is required.", body["errors"]["name"][0]);
    }
}
