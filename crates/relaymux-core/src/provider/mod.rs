//! Provider contract consumed by the failover controller and load balancer.
//!
//! Concrete providers (desktop hooks, pad protocol clients, web sessions) live
//! outside this crate. Each one owns its own connection state and must tolerate
//! concurrent lifecycle calls; the core never reaches inside it.

mod registry;

pub use registry::{ProviderFactory, ProviderRegistry};

use async_trait::async_trait;
use relaymux_types::error::ProviderResult;
use relaymux_types::models::{
    ConnectionState, InboundEvent, OutboundMedia, ProviderConfig, SendReceipt,
};
use std::sync::Arc;

/// A pluggable backend session to the external messaging service.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable instance name, unique within a pool.
    fn name(&self) -> &str;

    /// Priority rank. Lower values outrank higher ones.
    fn tier(&self) -> i32;

    /// Prepare the session. Inbound traffic is delivered to `handler` once started.
    async fn initialize(
        &self,
        config: &ProviderConfig,
        handler: Arc<dyn MessageHandler>,
    ) -> ProviderResult<()>;

    async fn start(&self) -> ProviderResult<()>;

    async fn stop(&self) -> ProviderResult<()>;

    fn is_running(&self) -> bool;

    fn connection_state(&self) -> ConnectionState;

    async fn send_text(&self, chat_id: &str, text: &str) -> ProviderResult<SendReceipt>;

    async fn send_image(&self, chat_id: &str, image: &OutboundMedia)
        -> ProviderResult<SendReceipt>;

    async fn send_file(&self, chat_id: &str, file: &OutboundMedia) -> ProviderResult<SendReceipt>;

    async fn revoke_message(&self, chat_id: &str, message_id: &str) -> ProviderResult<()>;
}

/// Receives inbound events from providers. Supplied by the protocol
/// translation layer and passed through to providers uninterpreted.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_event(&self, event: InboundEvent);
}

/// A handler that drops every event, for headless tests and dry runs.
pub struct NoopMessageHandler;

#[async_trait]
impl MessageHandler for NoopMessageHandler {
    async fn handle_event(&self, event: InboundEvent) {
        tracing::trace!(provider = %event.provider, chat = %event.chat_id, "Dropping inbound event");
    }
}

/// A provider is healthy iff it is running and logged in.
pub fn is_healthy(provider: &dyn Provider) -> bool {
    provider.is_running() && provider.connection_state().is_logged_in()
}
