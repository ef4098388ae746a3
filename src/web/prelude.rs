pub(super) use super::flash;
pub(crate) use crate::error::StudioError;
pub(crate) use askama::Template;
pub(crate) use askama_web::WebTemplate;
pub(crate) use axum::extract::{Form, Path, Query, State};
pub(crate) use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
pub(crate) use axum::response::{IntoResponse, Redirect, Response};
pub(crate) use serde::Deserialize;
pub(crate) use tower_sessions::Session;
pub(crate) use tracing::{error, info};
