use crate::server::templates::ErrorTemplate;
use askama::Template;
use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{FormRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;
use weblog_common::model::{Id, post::PostMarker};
use weblog_db::store::{DbError, PostStore};

mod forms;
mod routes;
mod templates;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub store: Arc<PostStore>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming form rejected: {0}")]
    FormRejection(#[from] FormRejection),
    #[error("Template could not be rendered: {0}")]
    Template(#[from] askama::Error),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("The store reported zero inserted rows.")]
    PostInsertFailed,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::FormRejection(_) => StatusCode::BAD_REQUEST,
            ServerError::Template(_) | ServerError::Database(_) | ServerError::PostInsertFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        // The page carries only the status line, never the internal error.
        match ErrorTemplate::new(status).render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(render_error) => {
                error!(error = %render_error, "Error page could not be rendered");
                status.into_response()
            }
        }
    }
}
