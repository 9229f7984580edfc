//! API error types with HTTP response mapping.

use accounts::AccountError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart::CartError;
use catalog::CatalogError;
use checkout::{CheckoutError, LineFailure};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request.
    BadRequest(String),
    /// Missing or unknown session token.
    Unauthorized(String),
    /// Authenticated, but not allowed.
    Forbidden(String),
    Cart(CartError),
    Catalog(CatalogError),
    Checkout(CheckoutError),
    Account(AccountError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, failures) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::Cart(err) => with_no_failures(cart_error_to_response(err)),
            ApiError::Catalog(err) => with_no_failures(catalog_error_to_response(err)),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Account(err) => with_no_failures(account_error_to_response(err)),
        };

        let body = match failures {
            Some(failures) => serde_json::json!({ "error": message, "failures": failures }),
            None => serde_json::json!({ "error": message }),
        };
        (status, axum::Json(body)).into_response()
    }
}

fn with_no_failures(
    (status, message): (StatusCode, String),
) -> (StatusCode, String, Option<Vec<LineFailure>>) {
    (status, message, None)
}

fn internal(err: &dyn std::fmt::Display) -> (StatusCode, String) {
    tracing::error!(error = %err, "internal server error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error.".to_string(),
    )
}

fn cart_error_to_response(err: CartError) -> (StatusCode, String) {
    match err {
        CartError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "Product not found.".to_string()),
        CartError::ItemNotFound(_) => (StatusCode::NOT_FOUND, "Cart item not found.".to_string()),
        CartError::Forbidden { .. } => (
            StatusCode::FORBIDDEN,
            "This item is not in your cart.".to_string(),
        ),
        CartError::InvalidQuantity(_) => (StatusCode::BAD_REQUEST, "Invalid quantity.".to_string()),
        CartError::Catalog(inner) => catalog_error_to_response(inner),
        db @ CartError::Database(_) => internal(&db),
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String) {
    match &err {
        CatalogError::ProductNotFound(_) => {
            (StatusCode::NOT_FOUND, "Product not found.".to_string())
        }
        CatalogError::InsufficientStock { .. } | CatalogError::StockConflict(_) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CatalogError::InvalidProduct(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        CatalogError::Decode(_) | CatalogError::Database(_) => internal(&err),
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String, Option<Vec<LineFailure>>) {
    match err {
        CheckoutError::EmptyCart => (
            StatusCode::BAD_REQUEST,
            CheckoutError::EmptyCart.to_string(),
            None,
        ),
        CheckoutError::InventoryConflict(failures) => {
            let message = failures
                .iter()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            (StatusCode::CONFLICT, message, Some(failures))
        }
        CheckoutError::Cart(err) => with_no_failures(cart_error_to_response(err)),
        CheckoutError::Catalog(err) => with_no_failures(catalog_error_to_response(err)),
    }
}

fn account_error_to_response(err: AccountError) -> (StatusCode, String) {
    match &err {
        AccountError::InvalidUsername
        | AccountError::PasswordMismatch
        | AccountError::PasswordTooShort(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        AccountError::UsernameTaken(_) => (StatusCode::CONFLICT, err.to_string()),
        AccountError::InvalidCredentials | AccountError::InvalidSession => {
            (StatusCode::UNAUTHORIZED, err.to_string())
        }
        AccountError::Database(_) => internal(&err),
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        ApiError::Account(err)
    }
}
