//! WhatsApp transport adapters. Implement the ChatTransport port.

pub mod mock_transport;
pub mod protocol;
pub mod transport;

pub use mock_transport::{MockBehavior, MockTransport};
pub use transport::NodeBridgeTransport;
