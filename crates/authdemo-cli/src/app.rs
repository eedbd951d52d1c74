//! Application state for the authdemo command line.
//!
//! `App` is the presentation glue: it owns the shared `SessionStore` and the
//! `ApiClient`, turns each command into one core call, and keeps the status
//! line the renderer shows.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error, info, warn};

use authdemo_core::config::ENV_PASSWORD;
use authdemo_core::storage::{KeyValueStore, MemoryStore};
use authdemo_core::{ApiClient, Config, Credential, DemoEndpoint, Notice, SessionStore};

use crate::commands::{Command, HELP};
use crate::render;

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Quitting,
}

pub struct App {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    /// Where the remembered username is written back, if anywhere
    config_file: Option<PathBuf>,
    pub state: AppState,
    /// Last status line, rendered after every command
    pub status: Notice,
}

impl App {
    /// Create a new application instance from config and environment
    pub fn new() -> Result<Self> {
        let mut config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        config.apply_env();
        debug!(server_url = %config.server_url, storage = %config.storage, "Config loaded");

        let storage: Arc<dyn KeyValueStore> = match config.open_storage() {
            Ok(storage) => storage,
            Err(e) => {
                warn!(error = %e, "Failed to open session storage, keeping the session in memory");
                Arc::new(MemoryStore::new())
            }
        };
        let session = Arc::new(SessionStore::open(storage));
        let api = ApiClient::new(&config.server_url, session.clone())?;

        let mut app = Self::with_parts(config, session, api);
        app.config_file = Config::path().ok();
        Ok(app)
    }

    /// Assemble an app from ready-made parts. Nothing is written to the config file.
    pub fn with_parts(config: Config, session: Arc<SessionStore>, api: ApiClient) -> Self {
        Self {
            config,
            session,
            api,
            config_file: None,
            state: AppState::Normal,
            status: Notice::cleared(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_logged_in()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Run one command. Output goes to stdout; failures end up in the status line.
    pub async fn execute(&mut self, command: Command) -> Result<()> {
        debug!(command = %command, "Executing command");
        match command {
            Command::Login(username) => {
                let credential = self.read_credential(username)?;
                self.attempt_login(credential).await;
                render::status(&self.status);
                render::panel(&self.session);
            }
            Command::Logout => {
                self.logout();
                render::status(&self.status);
                render::panel(&self.session);
            }
            Command::WhoAmI => render::panel(&self.session),
            Command::Status => {
                render::status(&self.status);
                render::panel(&self.session);
            }
            Command::Demo(endpoint) => {
                self.fetch(endpoint).await;
                render::status(&self.status);
            }
            Command::All => {
                self.fetch_all(|endpoint, notice| render::endpoint_result(endpoint, notice))
                    .await;
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => self.state = AppState::Quitting,
        }
        Ok(())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Attempt login; on success the session is saved and the username remembered
    pub async fn attempt_login(&mut self, credential: Credential) {
        self.status = Notice::cleared();

        if let Err(message) = credential.validate() {
            self.status = Notice::failure(message);
            return;
        }

        match self.api.login(&credential).await {
            Ok(session) => {
                if let Err(e) = self.session.save(&session) {
                    error!(error = %e, "Failed to save session");
                    self.status = Notice::failure(format!("Could not save session: {}", e));
                    return;
                }
                self.remember_username(&credential.username);
                info!(user = %session.username, "Login successful");
            }
            Err(e) => {
                error!(error = %e, kind = ?e.kind(), "Login failed");
                self.status = Notice::from_error(&e);
            }
        }
    }

    /// Forget the saved session
    pub fn logout(&mut self) {
        self.status = Notice::cleared();
        if let Err(e) = self.session.clear() {
            error!(error = %e, "Failed to clear session");
            self.status = Notice::failure(format!("Could not clear session: {}", e));
            return;
        }
        info!("Logged out");
    }

    fn remember_username(&mut self, username: &str) {
        self.config.last_username = Some(username.to_string());

        let Some(ref path) = self.config_file else {
            return;
        };

        // Only the username is written back; env overrides stay out of the file
        let mut stored = Config::load_from(path).unwrap_or_default();
        stored.last_username = Some(username.to_string());
        if let Err(e) = stored.save_to(path) {
            warn!(error = %e, "Failed to save config");
        }
    }

    /// Write the remembered username to `path` after each successful login
    pub fn persist_config_to(&mut self, path: PathBuf) {
        self.config_file = Some(path);
    }

    fn read_credential(&self, username: Option<String>) -> Result<Credential> {
        let username = match username.or_else(|| self.config.last_username.clone()) {
            Some(user) => user,
            None => prompt_username()?,
        };

        let password = match std::env::var(ENV_PASSWORD) {
            Ok(password) if !password.is_empty() => password,
            _ => rpassword::prompt_password(format!("Password for {}: ", username))?,
        };

        Ok(Credential::new(username, password))
    }

    // =========================================================================
    // Demo endpoints
    // =========================================================================

    /// Call one demo endpoint and update the status line
    pub async fn fetch(&mut self, endpoint: DemoEndpoint) {
        let result = self.api.demo(endpoint).await;
        if let Err(ref e) = result {
            debug!(endpoint = %endpoint, error = %e, "Demo call failed");
        }
        self.status = Notice::from_result(&result);
    }

    /// Call every demo endpoint concurrently.
    ///
    /// Results are reported in completion order and the last one to arrive
    /// becomes the status line.
    pub async fn fetch_all<F>(&mut self, mut on_result: F)
    where
        F: FnMut(DemoEndpoint, &Notice),
    {
        let mut pending: FuturesUnordered<_> = DemoEndpoint::ALL
            .iter()
            .map(|&endpoint| {
                let api = self.api.clone();
                async move { (endpoint, api.demo(endpoint).await) }
            })
            .collect();

        while let Some((endpoint, result)) = pending.next().await {
            let notice = Notice::from_result(&result);
            on_result(endpoint, &notice);
            self.status = notice;
        }
    }
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    Ok(username.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use authdemo_core::api::{HttpRequest, HttpResponse, HttpTransport};
    use authdemo_core::{ApiErrorKind, Session, Severity};
    use reqwest::StatusCode;

    use super::*;

    /// Replies with queued responses in order, recording each request
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<(u16, String)>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn reply(self, status: u16, body: &str) -> Self {
            self.replies.lock().unwrap().push_back((status, body.to_string()));
            self
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            let (status, body) = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("connection refused"))?;
            Ok(HttpResponse::new(StatusCode::from_u16(status)?, body))
        }
    }

    fn test_app(transport: ScriptedTransport) -> (App, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let session = Arc::new(SessionStore::open(Arc::new(MemoryStore::new())));
        let config = Config::default();
        let api = ApiClient::with_transport(&config.server_url, session.clone(), transport.clone());
        (App::with_parts(config, session, api), transport)
    }

    #[tokio::test]
    async fn test_login_saves_session_and_username() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let (mut app, _) = test_app(
            ScriptedTransport::default().reply(200, r#"{"token":"t1","username":"alice","roles":["user"]}"#),
        );
        app.persist_config_to(config_path.clone());

        app.attempt_login(Credential::new("alice", "secret")).await;

        assert!(app.is_authenticated());
        assert_eq!(app.status, Notice::cleared());
        assert_eq!(app.session.describe(), "User: alice (user)");
        assert_eq!(app.config.last_username.as_deref(), Some("alice"));

        let stored = Config::load_from(&config_path).unwrap();
        assert_eq!(stored.last_username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_failed_login_shows_server_message() {
        let (mut app, _) = test_app(ScriptedTransport::default().reply(401, r#"{"message":"bad credentials"}"#));

        app.attempt_login(Credential::new("alice", "wrong")).await;

        assert!(!app.is_authenticated());
        assert_eq!(app.status, Notice::failure("bad credentials"));
    }

    #[tokio::test]
    async fn test_failed_relogin_keeps_existing_session() {
        let (mut app, _) = test_app(ScriptedTransport::default().reply(401, r#"{"message":"bad credentials"}"#));
        app.session.save(&Session::new("t0", "alice", vec![])).unwrap();

        app.attempt_login(Credential::new("bob", "wrong")).await;

        assert_eq!(app.session.current_token().as_deref(), Some("t0"));
    }

    #[tokio::test]
    async fn test_long_password_is_sent_to_server() {
        let (mut app, transport) = test_app(
            ScriptedTransport::default().reply(200, r#"{"token":"t2","username":"alice","roles":["user"]}"#),
        );

        app.attempt_login(Credential::new("alice", "p".repeat(129))).await;

        assert_eq!(transport.calls(), 1);
        assert!(app.is_authenticated());
        assert_eq!(app.session.current_token().as_deref(), Some("t2"));
    }

    #[tokio::test]
    async fn test_empty_credentials_never_reach_network() {
        let (mut app, transport) = test_app(ScriptedTransport::default());

        app.attempt_login(Credential::new("", "")).await;

        assert_eq!(app.status.severity, Severity::Failure);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_status() {
        let (mut app, _) = test_app(ScriptedTransport::default());
        app.session.save(&Session::new("t", "alice", vec![])).unwrap();
        app.status = Notice::failure("old error");

        app.logout();
        assert!(!app.is_authenticated());
        assert_eq!(app.status, Notice::cleared());

        app.logout();
        assert!(!app.is_authenticated());
    }

    #[tokio::test]
    async fn test_fetch_protected_while_logged_out() {
        let (mut app, transport) = test_app(ScriptedTransport::default());

        app.fetch(DemoEndpoint::Admin).await;

        assert_eq!(app.status, Notice::failure("You must login to use this feature"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_success_and_network_failure() {
        let (mut app, _) = test_app(ScriptedTransport::default().reply(200, r#"{"info":"hello"}"#));

        app.fetch(DemoEndpoint::Anonymous).await;
        assert_eq!(app.status, Notice::success("hello"));

        // No reply queued: the transport fails
        let result = app.api.demo(DemoEndpoint::Anonymous).await;
        assert_eq!(result.unwrap_err().kind(), ApiErrorKind::NetworkOrParseError);
    }

    #[tokio::test]
    async fn test_fetch_all_reports_every_endpoint() {
        let mut transport = ScriptedTransport::default();
        for _ in DemoEndpoint::ALL {
            transport = transport.reply(200, r#"{"info":"ok"}"#);
        }
        let (mut app, transport) = test_app(transport);
        app.session.save(&Session::new("t", "alice", vec!["user".to_string()])).unwrap();

        let mut seen = Vec::new();
        app.fetch_all(|endpoint, notice| seen.push((endpoint, notice.clone()))).await;

        assert_eq!(seen.len(), DemoEndpoint::ALL.len());
        assert_eq!(transport.calls(), DemoEndpoint::ALL.len());
        assert!(seen.iter().all(|(_, n)| n.is_success()));
        assert_eq!(app.status, seen.last().unwrap().1);
    }

    #[tokio::test]
    async fn test_fetch_all_logged_out_only_calls_anonymous() {
        let (mut app, transport) = test_app(ScriptedTransport::default().reply(200, r#"{"info":"public"}"#));

        let mut failures = 0;
        app.fetch_all(|_, notice| {
            if !notice.is_success() {
                failures += 1;
            }
        })
        .await;

        assert_eq!(transport.calls(), 1);
        assert_eq!(failures, DemoEndpoint::ALL.len() - 1);
    }

    #[tokio::test]
    async fn test_quit_command() {
        let (mut app, _) = test_app(ScriptedTransport::default());
        app.execute(Command::Quit).await.unwrap();
        assert_eq!(app.state, AppState::Quitting);
    }
}
