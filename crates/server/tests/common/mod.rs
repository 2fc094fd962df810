//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the `versetag-server`
//! integration tests:
//!
//! - `TestApp`: spawns the real router on a random port, backed by a temporary
//!   SQLite database and a generated `config.yml`.
//! - Token helpers that mint JWTs signed with the harness secret.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use core_access::{get_or_create_user, set_user_role, User, REVIEWER_ROLE};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use std::{
    fs::File,
    io::Write,
    net::SocketAddr,
    time::{SystemTime, UNIX_EPOCH},
};
use tempfile::{tempdir, NamedTempFile, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};
use versetag::{taxonomy, verses, NewTag, Tag};
use versetag_server::{
    auth::middleware::Claims,
    config, router,
    state::{build_app_state, AppState},
};
use versetag_test_utils::sample_verse;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub app_state: AppState,
    _db_file: NamedTempFile,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server and returns a `TestApp` instance.
    pub async fn spawn() -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let db_file = NamedTempFile::new()?;
        let db_path = db_file.path().to_path_buf();

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
db_url: "{}"
jwt_secret: "{}"
"#,
            db_path.display(),
            TEST_JWT_SECRET
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config_path = config_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non UTF-8 config path"))?;
        let config = config::get_config(Some(config_path))?;
        let app_state = build_app_state(config).await?;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            app_state: app_state_for_harness,
            _db_file: db_file,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Imports verse `canto.chapter.verse` with an optional purport.
    pub async fn seed_verse(
        &self,
        canto_num: i64,
        chapter_num: i64,
        verse_num: i64,
        purport: Option<&str>,
    ) -> Result<()> {
        let conn = self.app_state.sqlite_provider.connect()?;
        let verse = sample_verse(canto_num, chapter_num, verse_num, purport);
        verses::insert_verse(&conn, &verse).await?;
        Ok(())
    }

    pub async fn seed_tag(
        &self,
        name: &str,
        level: i64,
        parent_id: Option<i64>,
        is_leaf: bool,
    ) -> Result<Tag> {
        let conn = self.app_state.sqlite_provider.connect()?;
        let tag = taxonomy::create_tag(
            &conn,
            &NewTag {
                name: name.to_string(),
                level,
                parent_id,
                is_leaf,
            },
        )
        .await?;
        Ok(tag)
    }

    /// Registers `sub` and promotes them to reviewer.
    pub async fn promote_to_reviewer(&self, sub: &str) -> Result<User> {
        let db = &self.app_state.sqlite_provider.db;
        let user = get_or_create_user(db, sub).await?;
        Ok(set_user_role(db, &user.id, REVIEWER_ROLE).await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Generates a valid JWT for a given user identifier (subject).
pub fn generate_jwt(sub: &str) -> Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    generate_jwt_with_exp(sub, now + 3600)
}

/// Generates a JWT with an explicit `exp` timestamp.
pub fn generate_jwt_with_exp(sub: &str, exp: u64) -> Result<String> {
    let claims = Claims {
        sub: sub.to_string(),
        exp: exp as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )?;
    Ok(token)
}
