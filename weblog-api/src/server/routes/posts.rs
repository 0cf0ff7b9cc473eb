use crate::server::{
    Result, ServerError, ServerRouter,
    forms::{Form, PostForm},
    templates::{EditTemplate, IndexTemplate, NewTemplate, PostFormView, ViewTemplate},
};
use askama::Template;
use axum::{
    Router,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use weblog_common::model::{Id, post::PostMarker};
use weblog_db::store::PostStore;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(index)
        .typed_get(view_post)
        .typed_get(new_post_form)
        .typed_post(create_post)
        .typed_get(edit_post_form)
        .typed_post(update_post)
        .typed_post(delete_post)
}

#[derive(TypedPath)]
#[typed_path("/")]
struct IndexPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/view/{id}", rejection(ServerError))]
struct ViewPath {
    id: Id<PostMarker>,
}

#[derive(TypedPath)]
#[typed_path("/new")]
struct NewPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/edit/{id}", rejection(ServerError))]
struct EditPath {
    id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/delete/{id}", rejection(ServerError))]
struct DeletePath {
    id: Id<PostMarker>,
}

async fn index(_: IndexPath, State(store): State<Arc<PostStore>>) -> Result<Html<String>> {
    let posts = store.list_posts().await?;

    Ok(Html(IndexTemplate::new(&posts).render()?))
}

async fn view_post(
    ViewPath { id }: ViewPath,
    State(store): State<Arc<PostStore>>,
) -> Result<Html<String>> {
    let post = store
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Html(ViewTemplate::new(&post).render()?))
}

async fn new_post_form(_: NewPath) -> Result<Html<String>> {
    Ok(Html(NewTemplate::new(PostFormView::empty()).render()?))
}

#[axum::debug_handler]
async fn create_post(
    _: NewPath,
    State(store): State<Arc<PostStore>>,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            let page = NewTemplate::new(PostFormView::with_errors(form, &errors));
            return Ok(Html(page.render()?).into_response());
        }
    };

    let post = store
        .create_post(&draft)
        .await?
        .ok_or(ServerError::PostInsertFailed)?;
    debug!(id = %post.id, "Created post");

    Ok(Redirect::to(IndexPath.to_uri().path()).into_response())
}

async fn edit_post_form(
    EditPath { id }: EditPath,
    State(store): State<Arc<PostStore>>,
) -> Result<Html<String>> {
    let post = store
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Html(EditTemplate::new(id, PostFormView::prefilled(&post)).render()?))
}

async fn update_post(
    EditPath { id }: EditPath,
    State(store): State<Arc<PostStore>>,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            let page = EditTemplate::new(id, PostFormView::with_errors(form, &errors));
            return Ok(Html(page.render()?).into_response());
        }
    };

    if !store.update_post(id, &draft).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }

    Ok(Redirect::to(IndexPath.to_uri().path()).into_response())
}

async fn delete_post(
    DeletePath { id }: DeletePath,
    State(store): State<Arc<PostStore>>,
) -> Result<Redirect> {
    if !store.delete_post(id).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }

    Ok(Redirect::to(IndexPath.to_uri().path()))
}
