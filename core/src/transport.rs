//! The seam between resources and whatever performs the HTTP call.
//!
//! Resources only compose a URL, a query and a body, then hand them to one
//! verb of a `Transport`. Whatever the transport returns for that verb is
//! returned to the caller untouched, so a transport may yield plain request
//! data (`CrispClient`), a future, or a recorded call in tests.

use serde_json::Value;

use crate::http::Query;

pub trait Transport {
    /// What a single verb call yields.
    type Output;

    /// Join path segments into an absolute REST URL.
    fn prepare_rest_url(&self, segments: &[&str]) -> String;

    fn get(&self, url: String, query: Query) -> Self::Output;

    fn post(&self, url: String, query: Option<Query>, body: Option<Value>) -> Self::Output;

    fn patch(&self, url: String, query: Option<Query>, body: Option<Value>) -> Self::Output;

    fn delete(&self, url: String) -> Self::Output;
}
