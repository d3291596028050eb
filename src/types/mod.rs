// Public modules
pub mod message;
pub mod post_message_params;

// Re-exports
pub use message::Message;
pub use post_message_params::PostMessageParams;
