//! HTTP status and send-failure mapping shared by the reqwest transports.

use reqwest::StatusCode;

use crate::BackendError;

pub(crate) fn error_for_status(status: StatusCode, message: String) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => BackendError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => BackendError::timeout(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            BackendError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            BackendError::unavailable(message)
        }
        _ => BackendError::transport(message),
    }
}

pub(crate) fn send_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::timeout(err.to_string())
    } else {
        BackendError::transport(err.to_string())
    }
}
