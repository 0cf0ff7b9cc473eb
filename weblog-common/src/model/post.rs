use crate::model::Id;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// A stored blog entry. The store assigns `id` and `posted_at` once at
/// insert; `last_modified` advances on every successful update.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: PostTitle,
    pub content: PostContent,
    pub posted_at: UtcDateTime,
    pub last_modified: UtcDateTime,
}

/// Validated title/content pair awaiting an insert or update.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostDraft {
    pub title: PostTitle,
    pub content: PostContent,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct PostTitle(String);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The post title must not be empty")]
pub struct InvalidPostTitleError;

impl PostTitle {
    pub fn new(title: String) -> Result<Self, InvalidPostTitleError> {
        if title.trim().is_empty() {
            Err(InvalidPostTitleError)
        } else {
            Ok(PostTitle(title))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for PostTitle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        if inner.trim().is_empty() {
            Err(Error::invalid_value(
                Unexpected::Str(&inner),
                &"a non-empty post title",
            ))
        } else {
            Ok(PostTitle(inner))
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct PostContent(String);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The post content must not be empty")]
pub struct InvalidPostContentError;

impl PostContent {
    pub fn new(content: String) -> Result<Self, InvalidPostContentError> {
        if content.trim().is_empty() {
            Err(InvalidPostContentError)
        } else {
            Ok(PostContent(content))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for PostContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        if inner.trim().is_empty() {
            Err(Error::invalid_value(
                Unexpected::Str(&inner),
                &"non-empty post content",
            ))
        } else {
            Ok(PostContent(inner))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::post::{InvalidPostContentError, InvalidPostTitleError, PostContent, PostTitle};

    #[test]
    fn title_rejects_blank_input() {
        assert_eq!(PostTitle::new(String::new()), Err(InvalidPostTitleError));
        assert_eq!(PostTitle::new("   ".to_owned()), Err(InvalidPostTitleError));
        assert_eq!(PostTitle::new("\t\n".to_owned()), Err(InvalidPostTitleError));
    }

    #[test]
    fn title_keeps_text_as_entered() {
        let title = PostTitle::new("Hello world ".to_owned()).unwrap();
        assert_eq!(title.get(), "Hello world ");
        assert_eq!(title.into_inner(), "Hello world ");
    }

    #[test]
    fn content_rejects_blank_input() {
        assert_eq!(PostContent::new(String::new()), Err(InvalidPostContentError));
        assert_eq!(
            PostContent::new(" \n ".to_owned()),
            Err(InvalidPostContentError)
        );
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<PostTitle>("\"\"").is_err());
        assert!(serde_json::from_str::<PostContent>("\" \"").is_err());

        let title: PostTitle = serde_json::from_str("\"Hello\"").unwrap();
        assert_eq!(title.get(), "Hello");
    }
}
