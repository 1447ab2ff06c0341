//! Mock ERP gateway server.
//!
//! Provides an axum-based HTTP server that simulates the ERP query gateway.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;

/// A mock ERP gateway for testing.
///
/// The server runs in the background and can be used to test the client and
/// the lookup helpers against a realistic gateway.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty tables.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL when creating an `ErpClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the tables during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        Self::state_from_scenario(Fixtures::default_scenario())
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new().with_company(scenario.company_id);

        for debtor in &scenario.debtors {
            state = state.with_entity(debtor);
        }

        for item in &scenario.items {
            state = state.with_entity(item);
        }

        for line in &scenario.order_lines {
            state = state.with_entity(line);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            .route("/companies/:company/query/:entity", post(handlers::query))
            .route("/companies/:company/cache/:entity", get(handlers::load_cache))
            .route(
                "/companies/:company/cache/:entity/changes",
                get(handlers::cache_changes),
            )
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Debtor, ErpClient, GetByKeyStr, GetByRowId};

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_debtor_with_erp_client() {
        let server = MockServer::start().await;
        let client = ErpClient::new("test-token", server.url(), 1).unwrap();

        let debtor = Debtor::get_by_key_str(&client, "10001")
            .await
            .expect("Failed to query debtor")
            .expect("Debtor should exist");

        assert_eq!(debtor.name, "Acme A/S");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;
        let client = ErpClient::new("test-token", server.url(), 1).unwrap();

        let result = Debtor::get_by_row_id(&client, 1).await.unwrap();

        assert!(result.is_none());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_wrong_company_is_an_error() {
        let server = MockServer::start().await;
        let client = ErpClient::new("test-token", server.url(), 999).unwrap();

        let result = Debtor::get_by_row_id(&client, 1).await;

        assert!(matches!(
            result,
            Err(crate::ErpError::ApiError {
                status_code: Some(404),
                ..
            })
        ));

        server.shutdown().await;
    }
}
