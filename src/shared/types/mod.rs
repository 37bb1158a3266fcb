pub mod errors;

pub use errors::{DiscoveryError, DiscoveryResult};
