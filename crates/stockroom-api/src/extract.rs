//! Extractors whose rejections render as the failure envelope

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body; a malformed body becomes a 400 envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path parameters; an unparsable segment becomes a 400 envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// Query string parameters; a malformed query becomes a 400 envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);
