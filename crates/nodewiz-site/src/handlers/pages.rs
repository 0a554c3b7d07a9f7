//! Static content pages.

use axum::{http::StatusCode, response::IntoResponse};

use crate::templates::{
  AboutTemplate, HomeTemplate, NotFoundTemplate, ServicesTemplate, UseCasesTemplate,
};

pub async fn home() -> HomeTemplate { HomeTemplate }

pub async fn services() -> ServicesTemplate { ServicesTemplate }

pub async fn use_cases() -> UseCasesTemplate { UseCasesTemplate }

pub async fn about() -> AboutTemplate { AboutTemplate }

pub async fn not_found() -> impl IntoResponse { (StatusCode::NOT_FOUND, NotFoundTemplate) }
