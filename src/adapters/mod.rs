// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod notify;

pub use http::HttpAdvisorClient;
pub use notify::{ConsoleNotifier, MemoryNotifier};
