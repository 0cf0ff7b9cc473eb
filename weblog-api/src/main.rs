use clap::Parser;
use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weblog_db::store::{DbError, PostStore, StoreConfig};

mod server;

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error connecting to the post store: {0}")]
    Store(#[from] DbError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

/// Minimal server-rendered blog backed by PostgreSQL.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Create the posts table, then exit.
    #[arg(long)]
    setup: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    #[serde(default = "default_server_address")]
    server_address: IpAddr,
    #[serde(default = "default_server_port")]
    server_port: u16,
    #[serde(default = "default_db_host")]
    db_host: String,
    #[serde(default = "default_db_port")]
    db_port: u16,
    #[serde(default = "default_db_user")]
    db_user: String,
    #[serde(default)]
    db_password: Option<String>,
    #[serde(default = "default_db_name")]
    db_name: String,
    #[serde(default = "default_db_table")]
    db_table: String,
}

fn default_server_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_server_port() -> u16 {
    5000
}

fn default_db_host() -> String {
    "localhost".to_owned()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_owned()
}

fn default_db_name() -> String {
    "weblog".to_owned()
}

fn default_db_table() -> String {
    "blogposts".to_owned()
}

impl Env {
    fn store_config(&self) -> StoreConfig {
        StoreConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
            table: self.db_table.clone(),
        }
    }
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "weblog_api=debug,weblog_common=debug,weblog_db=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    let args = Args::parse();
    install_tracing();
    let env = get_env()?;

    let store = PostStore::connect(&env.store_config()).await?;
    if args.setup {
        store.setup().await?;
        info!(table = %env.db_table, "Post store setup completed");
        return Ok(());
    }

    let state = server::ServerState {
        store: Arc::new(store),
    };
    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes().with_state(state).layer(tracing_layer);

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "Error listening for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use crate::Env;

    #[test]
    fn env_defaults_mirror_the_legacy_setup() {
        let env: Env = envy::from_iter(std::iter::empty::<(String, String)>()).unwrap();

        assert_eq!(env.server_port, 5000);
        assert_eq!(env.db_host, "localhost");
        assert_eq!(env.db_port, 5432);
        assert_eq!(env.db_user, "postgres");
        assert_eq!(env.db_password, None);
        assert_eq!(env.db_name, "weblog");
        assert_eq!(env.db_table, "blogposts");
    }

    #[test]
    fn env_overrides_apply() {
        let vars = [
            ("SERVER_PORT".to_owned(), "8080".to_owned()),
            ("DB_TABLE".to_owned(), "entries".to_owned()),
            ("DB_PASSWORD".to_owned(), "hunter2".to_owned()),
        ];

        let env: Env = envy::from_iter(vars).unwrap();

        assert_eq!(env.server_port, 8080);
        assert_eq!(env.db_table, "entries");
        assert_eq!(env.db_password.as_deref(), Some("hunter2"));
        assert_eq!(env.db_host, "localhost");
    }
}
