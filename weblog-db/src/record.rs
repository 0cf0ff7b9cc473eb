use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;
use weblog_common::model::{
    ModelValidationError,
    post::{Post, PostContent, PostTitle},
};

/// Raw row shape of the posts table, before model validation.
#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub struct PostRecord {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub posted_at: OffsetDateTime,
    pub last_modified: OffsetDateTime,
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            title: PostTitle::new(value.title)?,
            content: PostContent::new(value.content)?,
            posted_at: value.posted_at.to_utc(),
            last_modified: value.last_modified.to_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::PostRecord;
    use time::OffsetDateTime;
    use uuid::Uuid;
    use weblog_common::model::{ModelValidationError, post::Post};

    fn record(title: &str, content: &str) -> PostRecord {
        PostRecord {
            id: Uuid::from_u128(7),
            title: title.to_owned(),
            content: content.to_owned(),
            posted_at: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
            last_modified: OffsetDateTime::from_unix_timestamp(1_700_000_060).unwrap(),
        }
    }

    #[test]
    fn valid_record_converts() {
        let post = Post::try_from(record("Hello", "World")).unwrap();

        assert_eq!(post.id, Uuid::from_u128(7).into());
        assert_eq!(post.title.get(), "Hello");
        assert_eq!(post.content.get(), "World");
        assert_eq!(post.posted_at.unix_timestamp(), 1_700_000_000);
        assert_eq!(post.last_modified.unix_timestamp(), 1_700_000_060);
    }

    #[test]
    fn blank_title_is_a_data_error() {
        assert!(matches!(
            Post::try_from(record("   ", "World")),
            Err(ModelValidationError::Title(_))
        ));
    }

    #[test]
    fn blank_content_is_a_data_error() {
        assert!(matches!(
            Post::try_from(record("Hello", "")),
            Err(ModelValidationError::Content(_))
        ));
    }
}
