pub mod config;
pub mod error;
pub mod observability;
pub mod poll;
pub mod protocol;
pub mod stream;

mod util;

pub use error::{GatewayError, PollError};
pub use protocol::canonical::{CanonicalEvent, CanonicalUsage, FinishReason, ProviderKind};
pub use stream::{normalize_stream, NormalizeOptions, StreamAdapter, UpstreamDelta};
