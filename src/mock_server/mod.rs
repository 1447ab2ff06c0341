//! Mock ERP query gateway for E2E testing.
//!
//! This module provides an in-memory gateway that serves the query and cache
//! endpoints [`crate::ErpClient`] talks to. Unlike wiremock, which mocks at
//! the HTTP level per test, this server keeps its tables across requests and
//! stamps every row change, so incremental cache refreshes can be exercised
//! end to end.
//!
//! # Example
//!
//! ```ignore
//! use erplookup::mock_server::MockServer;
//! use erplookup::{Debtor, ErpClient, GetByKeyStr};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = ErpClient::new("test-token", server.url(), 1).unwrap();
//!
//!     // Server comes with default fixtures
//!     let debtor = Debtor::get_by_key_str(&client, "10001").await.unwrap();
//!     assert_eq!(debtor.unwrap().name, "Acme A/S");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{MockState, StoredRow};
