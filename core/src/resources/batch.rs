//! Batch endpoints of a website.
//!
//! The service's batch endpoint shapes are not wired yet. Every operation
//! returns [`ApiError::NotImplemented`] without reaching the transport, so a
//! caller never sends a malformed request by accident.

use std::marker::PhantomData;

use crate::error::ApiError;
use crate::transport::Transport;

#[derive(Debug)]
pub struct WebsiteBatch<'a, T: Transport> {
    // Unused until the batch endpoints are wired.
    _transport: PhantomData<&'a T>,
}

impl<'a, T: Transport> WebsiteBatch<'a, T> {
    pub fn new(_transport: &'a T) -> Self {
        Self {
            _transport: PhantomData,
        }
    }

    pub fn batch_resolve_conversations(
        &self,
        website_id: &str,
        sessions: &[String],
    ) -> Result<T::Output, ApiError> {
        unimplemented_batch("batch_resolve_conversations", website_id, sessions.len())
    }

    pub fn batch_read_conversations(
        &self,
        website_id: &str,
        sessions: &[String],
    ) -> Result<T::Output, ApiError> {
        unimplemented_batch("batch_read_conversations", website_id, sessions.len())
    }

    pub fn batch_remove_conversations(
        &self,
        website_id: &str,
        sessions: &[String],
    ) -> Result<T::Output, ApiError> {
        unimplemented_batch("batch_remove_conversations", website_id, sessions.len())
    }

    pub fn batch_remove_people(
        &self,
        website_id: &str,
        people: &[String],
    ) -> Result<T::Output, ApiError> {
        unimplemented_batch("batch_remove_people", website_id, people.len())
    }
}

fn unimplemented_batch<O>(
    operation: &'static str,
    website_id: &str,
    targets: usize,
) -> Result<O, ApiError> {
    tracing::warn!(operation, website_id, targets, "batch operation is not implemented");
    Err(ApiError::NotImplemented { operation })
}
