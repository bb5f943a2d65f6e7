//! Conversation endpoints of a website.

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::http::Query;
use crate::search::SearchParams;
use crate::transport::Transport;
use crate::types::ConversationState;

/// Conversation operations scoped to a website.
///
/// Every method composes one request and forwards it to the transport; the
/// transport's output is returned as-is.
#[derive(Debug)]
pub struct WebsiteConversation<'a, T: Transport> {
    transport: &'a T,
}

impl<'a, T: Transport> WebsiteConversation<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    fn conversation_url(&self, website_id: &str, session_id: &str, action: &str) -> String {
        self.transport.prepare_rest_url(&[
            "website",
            website_id,
            "conversation",
            session_id,
            action,
        ])
    }

    /// List page `page` of conversations matching `search`. A page of 0 or
    /// `None` means the first page.
    pub fn find_with_search(
        &self,
        website_id: &str,
        page: Option<u32>,
        search: Option<&SearchParams>,
    ) -> T::Output {
        let page = page.filter(|p| *p > 0).unwrap_or(1).to_string();
        let query = search.map(SearchParams::to_query).unwrap_or_default();

        self.transport.get(
            self.transport
                .prepare_rest_url(&["website", website_id, "conversations", &page]),
            query,
        )
    }

    pub fn get_list(&self, website_id: &str, page: Option<u32>) -> T::Output {
        self.find_with_search(website_id, page, None)
    }

    pub fn get_one(&self, website_id: &str, session_id: &str) -> T::Output {
        self.transport.get(
            self.transport
                .prepare_rest_url(&["website", website_id, "conversation", session_id]),
            Query::new(),
        )
    }

    pub fn create(&self, website_id: &str) -> T::Output {
        self.transport.post(
            self.transport
                .prepare_rest_url(&["website", website_id, "conversation"]),
            Some(Query::new()),
            None,
        )
    }

    pub fn initiate_one(&self, website_id: &str, session_id: &str) -> T::Output {
        self.transport.post(
            self.conversation_url(website_id, session_id, "initiate"),
            Some(Query::new()),
            None,
        )
    }

    /// Send `message` as-is, e.g.
    /// `{"type":"text","from":"operator","origin":"chat","content":"Hi"}`.
    pub fn send_message(&self, website_id: &str, session_id: &str, message: Value) -> T::Output {
        self.transport.post(
            self.conversation_url(website_id, session_id, "message"),
            None,
            Some(message),
        )
    }

    /// Signal that a message is being composed.
    pub fn compose_message(&self, website_id: &str, session_id: &str, data: Value) -> T::Output {
        self.transport.patch(
            self.conversation_url(website_id, session_id, "compose"),
            None,
            Some(data),
        )
    }

    /// Alias of [`Self::compose_message`].
    pub fn compose_messages(&self, website_id: &str, session_id: &str, data: Value) -> T::Output {
        self.compose_message(website_id, session_id, data)
    }

    /// Fails with [`ApiError::InvalidArgument`] without touching the
    /// transport when `state` is not `resolved`, `unresolved` or `pending`.
    pub fn set_state(
        &self,
        website_id: &str,
        session_id: &str,
        state: &str,
    ) -> Result<T::Output, ApiError> {
        let state: ConversationState = state.parse()?;

        Ok(self.transport.patch(
            self.conversation_url(website_id, session_id, "state"),
            None,
            Some(json!({ "state": state })),
        ))
    }

    pub fn get_routing(&self, website_id: &str, session_id: &str) -> T::Output {
        self.transport.get(
            self.conversation_url(website_id, session_id, "routing"),
            Query::new(),
        )
    }

    pub fn set_routing(&self, website_id: &str, session_id: &str, assign: Value) -> T::Output {
        self.transport.patch(
            self.conversation_url(website_id, session_id, "routing"),
            None,
            Some(assign),
        )
    }

    pub fn get_meta(&self, website_id: &str, session_id: &str) -> T::Output {
        self.transport.get(
            self.conversation_url(website_id, session_id, "meta"),
            Query::new(),
        )
    }

    pub fn update_meta(&self, website_id: &str, session_id: &str, update: Value) -> T::Output {
        self.transport.patch(
            self.conversation_url(website_id, session_id, "meta"),
            None,
            Some(update),
        )
    }

    /// Messages older than `timestamp_before` (milliseconds), or the latest
    /// batch when `None`. A zero timestamp is treated as absent.
    pub fn get_messages(
        &self,
        website_id: &str,
        session_id: &str,
        timestamp_before: Option<u64>,
    ) -> T::Output {
        let mut query = Query::new();
        if let Some(timestamp) = timestamp_before.filter(|t| *t > 0) {
            query.push("timestamp_before", timestamp.to_string());
        }

        self.transport.get(
            self.conversation_url(website_id, session_id, "messages"),
            query,
        )
    }

    pub fn set_block(&self, website_id: &str, session_id: &str, block: bool) -> T::Output {
        self.transport.patch(
            self.conversation_url(website_id, session_id, "block"),
            None,
            Some(json!({ "blocked": block })),
        )
    }

    pub fn delete_one(&self, website_id: &str, session_id: &str) -> T::Output {
        self.transport.delete(
            self.transport
                .prepare_rest_url(&["website", website_id, "conversation", session_id]),
        )
    }

    pub fn delivered_messages(
        &self,
        website_id: &str,
        session_id: &str,
        from: &str,
        origin: &str,
        fingerprints: &[u64],
    ) -> T::Output {
        self.transport.patch(
            self.conversation_url(website_id, session_id, "delivered"),
            None,
            Some(acknowledgement(from, origin, fingerprints)),
        )
    }

    pub fn read_messages(
        &self,
        website_id: &str,
        session_id: &str,
        from: &str,
        origin: &str,
        fingerprints: &[u64],
    ) -> T::Output {
        self.transport.patch(
            self.conversation_url(website_id, session_id, "read"),
            None,
            Some(acknowledgement(from, origin, fingerprints)),
        )
    }

    /// Alias of [`Self::read_messages`].
    pub fn acknowledge_messages(
        &self,
        website_id: &str,
        session_id: &str,
        from: &str,
        origin: &str,
        fingerprints: &[u64],
    ) -> T::Output {
        self.read_messages(website_id, session_id, from, origin, fingerprints)
    }
}

fn acknowledgement(from: &str, origin: &str, fingerprints: &[u64]) -> Value {
    json!({
        "origin": origin,
        "from": from,
        "fingerprints": fingerprints,
    })
}
