use std::{any::Any, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::{
    db_helpers::ArticleResource,
    errors::RequestError,
    services::{ResourceService, Writable},
    ArticleQueryParams, ArticleResponse, ErrorWrapper, JsonResponse, SuccessWrapper,
};

type JsonResult<T> = Result<JsonResponse<SuccessWrapper<T>>, RequestError>;
type Service<R> = Extension<Arc<ResourceService<R>>>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> RequestError {
    RequestError::RouteNotFound(uri.to_string())
}

pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_owned()
    };
    RequestError::Panicked(detail).into_response()
}

/// Gives error responses produced by the router itself (405, extractor
/// rejections) the same `{status_code, error}` body as ours. Anything that
/// already carries JSON is left alone.
pub async fn wrap_bare_errors(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.starts_with("application/json"));
    if is_json || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let reason = status.canonical_reason().unwrap_or("Request failed");
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut wrapped = (status, Json(ErrorWrapper::new(status, reason))).into_response();
    if let Some(allow) = allow {
        wrapped.headers_mut().insert(header::ALLOW, allow);
    }
    wrapped
}

fn read_id(id: Result<Path<String>, PathRejection>) -> Result<String, RequestError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| RequestError::Validation(rejection.body_text()))
}

fn read_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RequestError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| RequestError::Validation(rejection.body_text()))
}

// ----------------- Resource Handlers -----------------
pub async fn create<R: Writable>(
    Extension(service): Service<R>,
    payload: Result<Json<R::Request>, JsonRejection>,
) -> JsonResult<String> {
    let request = read_body(payload)?;
    service.create(request).await?;
    Ok(SuccessWrapper::wrap_with_status(
        StatusCode::CREATED,
        format!("{} created", R::LABEL),
    ))
}

pub async fn list<R: Writable>(Extension(service): Service<R>) -> JsonResult<Vec<R::Response>> {
    Ok(SuccessWrapper::ok(service.list().await?))
}

pub async fn list_soft_deleted<R: Writable>(
    Extension(service): Service<R>,
) -> JsonResult<Vec<R::Response>> {
    Ok(SuccessWrapper::ok(service.list_soft_deleted().await?))
}

pub async fn find_one<R: Writable>(
    Extension(service): Service<R>,
    id: Result<Path<String>, PathRejection>,
) -> JsonResult<Option<R::Response>> {
    Ok(SuccessWrapper::ok(service.find_one(&read_id(id)?).await?))
}

pub async fn update<R: Writable>(
    Extension(service): Service<R>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<R::Request>, JsonRejection>,
) -> JsonResult<String> {
    let request = read_body(payload)?;
    service.update(&read_id(id)?, request).await?;
    Ok(SuccessWrapper::ok(format!("{} updated", R::LABEL)))
}

pub async fn soft_delete<R: Writable>(
    Extension(service): Service<R>,
    id: Result<Path<String>, PathRejection>,
) -> JsonResult<String> {
    service.soft_delete(&read_id(id)?).await?;
    Ok(SuccessWrapper::ok(format!("{} deleted", R::LABEL)))
}

pub async fn delete_permanently<R: Writable>(
    Extension(service): Service<R>,
    id: Result<Path<String>, PathRejection>,
) -> JsonResult<String> {
    service.delete(&read_id(id)?).await?;
    Ok(SuccessWrapper::ok(format!("{} deleted from database", R::LABEL)))
}

// ----------------- Article Handlers -----------------
pub async fn list_articles(
    Extension(service): Service<ArticleResource>,
    params: Result<Query<ArticleQueryParams>, QueryRejection>,
) -> JsonResult<Vec<ArticleResponse>> {
    let Query(params) = params.map_err(|rejection| RequestError::Validation(rejection.body_text()))?;
    let articles = match params.title_filter() {
        Some(title) => service.list_by_filter(title).await?,
        None => service.list().await?,
    };
    Ok(SuccessWrapper::ok(articles))
}
