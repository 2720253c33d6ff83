use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use depot_service::{Envelope, Operation, Payload};

/// Map a service envelope to an HTTP response.
///
/// The status is the error's status, or 201/200 on success. With `redact`
/// set the error object keeps only `message`, `code` and `status`.
pub fn envelope_response(envelope: Envelope<Payload>, operation: Operation, redact: bool) -> axum::response::Response {
    match envelope.into_result() {
        Ok(data) => {
            let status = if operation.creates() {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, axum::Json(json!({ "success": true, "data": data }))).into_response()
        }
        Err(error) => {
            let status = StatusCode::from_u16(error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = if redact {
                json!({ "success": false, "error": error.redacted() })
            } else {
                json!({ "success": false, "error": error })
            };
            (status, axum::Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::Resource;
    use depot_service::{ErrorCode, ErrorInfo, ErrorKind, Step};

    fn not_found() -> Envelope<Payload> {
        Envelope::err(ErrorInfo::new(
            ErrorKind::NotFound,
            "order not found",
            Some(ErrorCode::new(Resource::Order, Operation::Get, Step::ParentMissing)),
        ))
    }

    #[test]
    fn error_status_becomes_http_status() {
        let res = envelope_response(not_found(), Operation::Get, false);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn creates_answer_201() {
        let res = envelope_response(Envelope::ok(Payload::Records(Vec::new())), Operation::Create, false);
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = envelope_response(Envelope::ok(Payload::Records(Vec::new())), Operation::List, false);
        assert_eq!(res.status(), StatusCode::OK);
    }
}
