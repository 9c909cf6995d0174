use axum::extract::FromRequest;

use crate::errors::AppError;

/// `Json` whose rejections become the `AppError` envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Form` whose rejections become the `AppError` envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct AppForm<T>(pub T);
