//! Synchronous API client core for the Crisp REST API.
//!
//! # Overview
//! Exposes website conversation and batch operations as local method calls.
//! Each method composes a URL, a query string and a JSON body, then hands
//! them to a [`Transport`]. The bundled [`CrispClient`] transport builds
//! `HttpRequest` values and parses `HttpResponse` values without touching
//! the network (host-does-IO pattern).
//!
//! # Design
//! - Resources (`WebsiteConversation`, `WebsiteBatch`) borrow a transport and
//!   return its output unmodified; they own no state.
//! - `CrispClient` is stateless apart from configuration: base URL, tier and
//!   credentials.
//! - Search filters are a closed enum ([`SearchOption`]) with a fixed
//!   query-key table.
//!
//! ```no_run
//! use crisp_core::{CrispClient, SearchOption, SearchParams};
//!
//! let client = CrispClient::from_env()?;
//! let search = SearchParams::new().with(SearchOption::FilterUnread, true);
//! let request = client
//!     .website_conversation()
//!     .find_with_search("website_id", Some(1), Some(&search));
//! println!("{} {}", request.method, request.url());
//! # Ok::<(), crisp_core::ApiError>(())
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod resources;
pub mod search;
pub mod transport;
pub mod types;

pub use client::{CrispClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Query};
pub use resources::{WebsiteBatch, WebsiteConversation};
pub use search::{SearchOption, SearchParams};
pub use transport::Transport;
pub use types::{
    Conversation, ConversationMessage, ConversationState, Envelope, MessageReceipt,
    NewConversation, Tier,
};
