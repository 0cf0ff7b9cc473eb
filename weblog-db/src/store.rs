use crate::record::PostRecord;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use thiserror::Error;
use weblog_common::model::{
    Id, ModelValidationError,
    post::{Post, PostDraft, PostMarker},
};

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection settings for the store, normally taken from the environment.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub table: String,
}

/// CRUD over the configured posts table. Every call checks a connection out
/// of the pool for the duration of the statement and releases it afterwards.
#[derive(Debug)]
pub struct PostStore {
    pool: PgPool,
    table: String,
}

impl PostStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        let pool = PgPoolOptions::new().connect_with(options).await?;

        Ok(Self {
            pool,
            table: config.table.clone(),
        })
    }

    /// Creates the posts table if it does not exist yet.
    pub async fn setup(&self) -> Result<()> {
        sqlx::query(&create_table_statement(&self.table))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let records: Vec<PostRecord> = sqlx::query_as(&list_statement(&self.table))
            .fetch_all(&self.pool)
            .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, ModelValidationError>>()?;
        Ok(posts)
    }

    pub async fn fetch_post(&self, id: Id<PostMarker>) -> Result<Option<Post>> {
        let record: Option<PostRecord> = sqlx::query_as(&fetch_statement(&self.table))
            .bind(id.uuid())
            .fetch_optional(&self.pool)
            .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    /// Inserts a draft, letting the store assign the id and both timestamps.
    /// Returns `None` when the insert reports zero inserted rows.
    pub async fn create_post(&self, draft: &PostDraft) -> Result<Option<Post>> {
        let record: Option<PostRecord> = sqlx::query_as(&insert_statement(&self.table))
            .bind(draft.title.get())
            .bind(draft.content.get())
            .fetch_optional(&self.pool)
            .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    /// Merges the draft into the existing row and refreshes `last_modified`.
    /// True iff the store reports exactly one modified row.
    pub async fn update_post(&self, id: Id<PostMarker>, draft: &PostDraft) -> Result<bool> {
        let result = sqlx::query(&update_statement(&self.table))
            .bind(id.uuid())
            .bind(draft.title.get())
            .bind(draft.content.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// True iff the store reports exactly one deleted row. Deleting an id
    /// that does not exist yields false, not an error.
    pub async fn delete_post(&self, id: Id<PostMarker>) -> Result<bool> {
        let result = sqlx::query(&delete_statement(&self.table))
            .bind(id.uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

const POST_COLUMNS: &str = "id, title, content, posted_at, last_modified";

fn list_statement(table: &str) -> String {
    format!("SELECT {POST_COLUMNS} FROM {table} ORDER BY posted_at DESC")
}

fn fetch_statement(table: &str) -> String {
    format!("SELECT {POST_COLUMNS} FROM {table} WHERE id = $1")
}

fn insert_statement(table: &str) -> String {
    format!(
        "INSERT INTO {table} (title, content, posted_at, last_modified) \
         VALUES ($1, $2, now(), now()) \
         RETURNING {POST_COLUMNS}"
    )
}

fn update_statement(table: &str) -> String {
    format!("UPDATE {table} SET title = $2, content = $3, last_modified = now() WHERE id = $1")
}

fn delete_statement(table: &str) -> String {
    format!("DELETE FROM {table} WHERE id = $1")
}

fn create_table_statement(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         id UUID PRIMARY KEY DEFAULT gen_random_uuid(), \
         title TEXT NOT NULL, \
         content TEXT NOT NULL, \
         posted_at TIMESTAMPTZ NOT NULL, \
         last_modified TIMESTAMPTZ NOT NULL)"
    )
}
