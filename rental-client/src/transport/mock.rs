//! Recording transport for tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use serde_json::Value;

use crate::{
    api::envelope::extract_error_message,
    error::{RentalError, Result},
    transport::{HttpMethod, RequestContext, Transport, TransportResponse, sealed},
};

/// One request seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub bearer_token: Option<String>,
    pub body: Option<Value>,
}

/// Transport that records every request and answers from a queue.
///
/// Responses are consumed in order. Non-2xx statuses become
/// [`RentalError::Api`] exactly as [`HttpTransport`](super::HttpTransport) does.
/// An empty queue answers with a 503.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockTransport {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    responses: Arc<Mutex<VecDeque<Result<TransportResponse>>>>,
}

impl sealed::private::Sealed for MockTransport {}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON response with the given status.
    pub(crate) fn respond(&self, status: u16, body: Value) -> &Self {
        let body = body.to_string().into_bytes();
        let response = if (200..300).contains(&status) {
            Ok(TransportResponse { status, body })
        } else {
            Err(RentalError::Api { status, message: extract_error_message(&body) })
        };
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Queues a transport-level failure.
    pub(crate) fn fail(&self, error: RentalError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls matching a method and path.
    pub(crate) fn calls_to(&self, method: HttpMethod, path: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.method == method && c.path == path).collect()
    }

    fn record(
        &self,
        method: HttpMethod,
        ctx: &RequestContext<'_>,
        body: Option<&[u8]>,
    ) -> Result<TransportResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: ctx.path.to_owned(),
            bearer_token: ctx.bearer_token.map(str::to_owned),
            body: body.and_then(|b| serde_json::from_slice(b).ok()),
        });
        self.responses.lock().unwrap().pop_front().unwrap_or(Err(RentalError::Api {
            status: 503,
            message: Some("no queued response".to_owned()),
        }))
    }
}

impl Transport for MockTransport {
    async fn get<'a>(&'a self, ctx: RequestContext<'a>) -> Result<TransportResponse> {
        self.record(HttpMethod::Get, &ctx, None)
    }

    async fn post<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> Result<TransportResponse> {
        self.record(HttpMethod::Post, &ctx, Some(body))
    }

    async fn put<'a>(&'a self, ctx: RequestContext<'a>, body: &'a [u8]) -> Result<TransportResponse> {
        self.record(HttpMethod::Put, &ctx, Some(body))
    }

    async fn patch<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> Result<TransportResponse> {
        self.record(HttpMethod::Patch, &ctx, Some(body))
    }

    fn protocol_name(&self) -> &'static str {
        "mock"
    }
}
