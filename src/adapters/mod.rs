// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod location;

pub use http::AladhanClient;
pub use location::StaticDevice;
