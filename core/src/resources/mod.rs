//! Website resources. Each one is a thin namespace of methods mapping
//! one-to-one onto REST endpoints, generic over the [`Transport`] used.
//!
//! [`Transport`]: crate::transport::Transport

pub mod batch;
pub mod conversation;

pub use batch::WebsiteBatch;
pub use conversation::WebsiteConversation;
