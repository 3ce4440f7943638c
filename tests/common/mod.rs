//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use fittrack::auth::{AuthManager, Claims, TokenService};
use fittrack::database::{Database, SqliteDatabase};
use fittrack::models::{NewUser, User};
use fittrack::server::AppState;

/// Signing secret shared by every integration test
pub const TEST_SECRET: &str = "integration-test-secret";

/// Placeholder hash for users that never log in with a password
pub const DUMMY_HASH: &str = "not-a-real-hash";

/// Create an in-memory database for testing
pub async fn create_test_database() -> Arc<SqliteDatabase> {
    Arc::new(
        SqliteDatabase::new(":memory:")
            .await
            .expect("Failed to create test database"),
    )
}

/// Token service with the test secret and no expiry
pub fn create_test_tokens() -> Arc<TokenService> {
    Arc::new(TokenService::new(TEST_SECRET, None).expect("Failed to create token service"))
}

/// Create a test authentication manager
pub fn create_test_auth_manager<D: Database>(
    db: Arc<D>,
    tokens: Arc<TokenService>,
) -> Arc<AuthManager<D>> {
    Arc::new(AuthManager::new(db, tokens, Duration::from_millis(500)))
}

/// Create a test application state over any database
pub fn create_test_state_with<D: Database>(db: Arc<D>, tokens: Arc<TokenService>) -> AppState<D> {
    let auth_manager = create_test_auth_manager(Arc::clone(&db), tokens);

    AppState {
        auth_manager,
        database: db,
        exercises: None,
        recommender: None,
    }
}

/// Create a test application state backed by in-memory SQLite
pub async fn create_test_state() -> AppState<SqliteDatabase> {
    let database = create_test_database().await;
    create_test_state_with(database, create_test_tokens())
}

/// Insert a user directly, skipping password hashing
pub async fn insert_user<D: Database>(db: &D, user_name: &str, email: &str) -> User {
    db.create_user(&NewUser::new(user_name, email, DUMMY_HASH))
        .await
        .expect("Failed to insert user")
}

/// Issue a token for a stored user
pub fn token_for(tokens: &TokenService, user: &User) -> String {
    tokens
        .issue(&Claims::new(user.id, user.email.clone(), user.user_name.clone()))
        .expect("Failed to issue token")
}

/// Run a test server in the background and return the address
/// The server will be shut down when the returned shutdown sender is dropped or sent
pub async fn run_test_server<D: Database + 'static>(
    state: AppState<D>,
) -> (std::net::SocketAddr, tokio::sync::oneshot::Sender<()>) {
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local address");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let app = fittrack::server::build_router(state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server error");
    });

    // Give the server a moment to start (100ms is sufficient for slow CI systems)
    tokio::time::sleep(Duration::from_millis(100)).await;

    (addr, shutdown_tx)
}
