pub mod config;
pub mod errors;
pub mod handlers;
pub mod mcp;
pub mod metrics;
pub mod models;
pub mod quote_id;
pub mod services;

// Re-exports for convenience
pub use errors::AgentError;
pub use services::QuoteService;
