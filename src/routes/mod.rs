// Route exports
pub mod pooling;

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::models::ErrorResponse;

pub use pooling::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").configure(pooling::configure));
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let response = bad_request("invalid_json", format!("Invalid JSON: {}", err));
    error::InternalError::from_response(err, response).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    let response = bad_request("invalid_query", format!("Invalid query: {}", err));
    error::InternalError::from_response(err, response).into()
}
