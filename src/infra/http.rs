use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))
}

pub fn transport_error(service: &str, err: reqwest::Error) -> AppError {
    AppError::RemoteService(format!("failed to call {service}: {err}"))
}

/// Passes successful responses through and maps everything else onto the
/// error taxonomy.
pub async fn ensure_success(service: &str, response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unable to read response>".to_string());
    Err(status_error(service, status, &body))
}

pub fn status_error(service: &str, status: StatusCode, body: &str) -> AppError {
    let message = format!("{service} responded with {status}: {body}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Auth(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::RemoteService(message),
    }
}

/// Treats a missing resource as already handled; other errors pass through.
pub fn ignore_not_found<T>(result: AppResult<T>) -> AppResult<()> {
    match result {
        Ok(_) | Err(AppError::NotFound(_)) => Ok(()),
        Err(err) => Err(err),
    }
}

pub async fn read_json<T: DeserializeOwned>(service: &str, response: Response) -> AppResult<T> {
    let body = response
        .text()
        .await
        .map_err(|err| transport_error(service, err))?;
    decode(service, &body)
}

pub fn decode<T: DeserializeOwned>(service: &str, body: &str) -> AppResult<T> {
    serde_json::from_str(body)
        .map_err(|err| AppError::Data(format!("failed to parse {service} response: {err}")))
}
