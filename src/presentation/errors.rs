// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::utils::errors::CrawlError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误。抓取错误按类别映射状态码，其余一律为500。
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self.0.downcast_ref::<CrawlError>() {
            Some(CrawlError::InvalidRegion(_)) => StatusCode::NOT_FOUND,
            Some(CrawlError::TooManyTargets { .. }) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
