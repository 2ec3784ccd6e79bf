//! Dapr sidecar client for the Courier bridge.
//!
//! Talks to the sidecar's HTTP API to:
//!
//! - publish input envelopes to a pub/sub topic ([`DaprPublisher`])
//! - read the conversation held by a workflow actor ([`WorkflowActorClient`])
//!
//! # Example
//!
//! ```no_run
//! use courier_dapr::DaprClient;
//!
//! # fn example() -> courier_dapr::Result<()> {
//! let client = DaprClient::builder()
//!     .base_url("http://127.0.0.1:3500")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod client;
pub mod error;
pub mod publisher;

pub use actor::{DEFAULT_ACTOR_TYPE, DEFAULT_CONVERSATION_METHOD, WorkflowActorClient};
pub use client::{ClientBuilder, DaprClient};
pub use error::{Error, Result};
pub use publisher::DaprPublisher;
