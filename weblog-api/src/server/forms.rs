use crate::server::ServerError;
use axum::{Form as AxumForm, extract::FromRequest};
use serde::Deserialize;
use weblog_common::model::post::{
    InvalidPostContentError, InvalidPostTitleError, PostContent, PostDraft, PostTitle,
};

/// Urlencoded-form extractor whose rejection is a [`ServerError`].
#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumForm), rejection(ServerError))]
pub struct Form<T>(pub T);

/// Raw form fields as submitted. [`PostForm::validate`] turns them into a
/// draft or into per-field error annotations for re-rendering.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostFormErrors {
    pub title: Option<InvalidPostTitleError>,
    pub content: Option<InvalidPostContentError>,
}

impl PostForm {
    pub fn validate(&self) -> Result<PostDraft, PostFormErrors> {
        let title = PostTitle::new(self.title.clone());
        let content = PostContent::new(self.content.clone());

        match (title, content) {
            (Ok(title), Ok(content)) => Ok(PostDraft { title, content }),
            (title, content) => Err(PostFormErrors {
                title: title.err(),
                content: content.err(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::server::forms::PostForm;

    fn form(title: &str, content: &str) -> PostForm {
        PostForm {
            title: title.to_owned(),
            content: content.to_owned(),
        }
    }

    #[test]
    fn valid_form_becomes_a_draft() {
        let draft = form("Hello", "World").validate().unwrap();

        assert_eq!(draft.title.get(), "Hello");
        assert_eq!(draft.content.get(), "World");
    }

    #[test]
    fn empty_title_is_annotated_without_touching_content() {
        let errors = form("", "World").validate().unwrap_err();

        assert!(errors.title.is_some());
        assert!(errors.content.is_none());
    }

    #[test]
    fn empty_content_is_annotated_without_touching_title() {
        let errors = form("Hello", "").validate().unwrap_err();

        assert!(errors.title.is_none());
        assert!(errors.content.is_some());
    }

    #[test]
    fn whitespace_only_fields_are_rejected() {
        let errors = form("   ", "\n").validate().unwrap_err();

        assert!(errors.title.is_some());
        assert!(errors.content.is_some());
    }
}
