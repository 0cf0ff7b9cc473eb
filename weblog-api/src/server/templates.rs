use crate::server::forms::{PostForm, PostFormErrors};
use askama::Template;
use axum::http::StatusCode;
use time::{UtcDateTime, format_description::BorrowedFormatItem, macros::format_description};
use weblog_common::model::{
    Id,
    post::{Post, PostMarker},
};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday repr:short], [month repr:short] [day] [hour]:[minute]");

fn display_timestamp(timestamp: UtcDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).unwrap_or_default()
}

/// Post fields preformatted for display.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PostView {
    pub id: Id<PostMarker>,
    pub title: String,
    pub content: String,
    pub posted_at: String,
    pub last_modified: String,
}

impl PostView {
    fn new(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.get().to_owned(),
            content: post.content.get().to_owned(),
            posted_at: display_timestamp(post.posted_at),
            last_modified: display_timestamp(post.last_modified),
        }
    }
}

/// Field values and error annotations carried into the post form.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostFormView {
    pub title: String,
    pub content: String,
    pub title_error: Option<String>,
    pub content_error: Option<String>,
}

impl PostFormView {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prefilled(post: &Post) -> Self {
        Self {
            title: post.title.get().to_owned(),
            content: post.content.get().to_owned(),
            ..Self::default()
        }
    }

    /// Keeps the entered values so the user does not lose their text.
    #[must_use]
    pub fn with_errors(form: PostForm, errors: &PostFormErrors) -> Self {
        Self {
            title: form.title,
            content: form.content,
            title_error: errors.title.map(|error| error.to_string()),
            content_error: errors.content.map(|error| error.to_string()),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    posts: Vec<PostView>,
}

impl IndexTemplate {
    #[must_use]
    pub fn new(posts: &[Post]) -> Self {
        Self {
            posts: posts.iter().map(PostView::new).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "view.html")]
pub struct ViewTemplate {
    post: PostView,
}

impl ViewTemplate {
    #[must_use]
    pub fn new(post: &Post) -> Self {
        Self {
            post: PostView::new(post),
        }
    }
}

#[derive(Template)]
#[template(path = "new.html")]
pub struct NewTemplate {
    form: PostFormView,
}

impl NewTemplate {
    #[must_use]
    pub fn new(form: PostFormView) -> Self {
        Self { form }
    }
}

#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditTemplate {
    id: Id<PostMarker>,
    form: PostFormView,
}

impl EditTemplate {
    #[must_use]
    pub fn new(id: Id<PostMarker>, form: PostFormView) -> Self {
        Self { id, form }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    status: u16,
    reason: &'static str,
}

impl ErrorTemplate {
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::server::{
        forms::PostForm,
        templates::{EditTemplate, ErrorTemplate, IndexTemplate, NewTemplate, PostFormView, ViewTemplate},
    };
    use askama::Template;
    use axum::http::StatusCode;
    use time::macros::utc_datetime;
    use uuid::Uuid;
    use weblog_common::model::post::{Post, PostContent, PostTitle};

    fn post(id: u128, title: &str, content: &str) -> Post {
        Post {
            id: Uuid::from_u128(id).into(),
            title: PostTitle::new(title.to_owned()).unwrap(),
            content: PostContent::new(content.to_owned()).unwrap(),
            posted_at: utc_datetime!(2024-08-07 14:30),
            last_modified: utc_datetime!(2024-08-07 14:30),
        }
    }

    #[test]
    fn index_lists_posts_in_the_given_order() {
        let posts = [post(1, "Newest", "b"), post(2, "Oldest", "a")];

        let html = IndexTemplate::new(&posts).render().unwrap();

        let newest = html.find("Newest").unwrap();
        let oldest = html.find("Oldest").unwrap();
        assert!(newest < oldest);
        assert!(html.contains(&format!("/view/{}", Uuid::from_u128(1))));
    }

    #[test]
    fn index_mentions_when_there_are_no_posts() {
        let html = IndexTemplate::new(&[]).render().unwrap();

        assert!(html.contains("No posts yet"));
    }

    #[test]
    fn view_escapes_html_in_user_content() {
        let html = ViewTemplate::new(&post(1, "Title", "<script>alert(1)</script>"))
            .render()
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn view_shows_formatted_timestamps() {
        let html = ViewTemplate::new(&post(1, "Title", "Body")).render().unwrap();

        assert!(html.contains("Wed, Aug 07 14:30"));
    }

    #[test]
    fn new_form_carries_errors_and_entered_values() {
        let form = PostForm {
            title: String::new(),
            content: "kept text".to_owned(),
        };
        let errors = form.validate().unwrap_err();

        let html = NewTemplate::new(PostFormView::with_errors(form, &errors))
            .render()
            .unwrap();

        assert!(html.contains("The post title must not be empty"));
        assert!(!html.contains("The post content must not be empty"));
        assert!(html.contains("kept text"));
    }

    #[test]
    fn edit_form_posts_back_to_the_same_id() {
        let post = post(9, "Title", "Body");

        let html = EditTemplate::new(post.id, PostFormView::prefilled(&post))
            .render()
            .unwrap();

        assert!(html.contains(&format!("action=\"/edit/{}\"", post.id)));
        assert!(html.contains("Title"));
        assert!(html.contains("Body"));
    }

    #[test]
    fn error_page_shows_the_status_line() {
        let html = ErrorTemplate::new(StatusCode::NOT_FOUND).render().unwrap();

        assert!(html.contains("404 Not Found"));
    }
}
