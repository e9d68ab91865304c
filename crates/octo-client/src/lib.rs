//! Octo Client: GraphQL gateway for the OctoMesh asset service.
//!
//! The [`GraphqlGateway`] trait is the single seam between command handlers
//! and the network. [`HttpGateway`] talks to a real endpoint;
//! [`MockGateway`] replays canned bodies for tests.

mod gateway;
mod http;
mod mock;
mod response;

pub use gateway::GraphqlGateway;
pub use http::{HttpGateway, MAX_ERROR_BODY_CHARS};
pub use mock::{MockGateway, RecordedRequest};
pub use response::{GatewayResponse, GraphqlError, GraphqlLocation, GraphqlResponse};
