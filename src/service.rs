//! Tower service adapter for the analysis engine.
//!
//! Lets the engine sit in an async pipeline behind the usual tower
//! middleware (timeouts, limits) even though the computation itself is
//! synchronous and immediate.

use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::Service;
use uuid::Uuid;

use crate::analysis::{AnalysisEngine, AnalysisReport};
use crate::error::EngineError;
use crate::perception::PerceptionResult;

/// One classification request with caller-supplied correlation ids. The
/// user and message references are opaque to the engine and echoed back
/// for the result sink.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub request_id: Uuid,
    pub user_ref: String,
    pub message_ref: String,
    pub perception: PerceptionResult,
    pub declared_type: Option<String>,
}

impl AnalysisRequest {
    pub fn new(user_ref: impl Into<String>, message_ref: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user_ref: user_ref.into(),
            message_ref: message_ref.into(),
            perception: PerceptionResult::default(),
            declared_type: None,
        }
    }

    pub fn with_perception(mut self, perception: PerceptionResult) -> Self {
        self.perception = perception;
        self
    }

    pub fn with_declared_type(mut self, product_type: impl Into<String>) -> Self {
        self.declared_type = Some(product_type.into());
        self
    }
}

/// A finished request: the report plus the correlation ids it belongs to.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub request_id: Uuid,
    pub user_ref: String,
    pub message_ref: String,
    pub report: AnalysisReport,
}

#[derive(Debug, Clone)]
pub struct AnalysisService {
    engine: AnalysisEngine,
}

impl AnalysisService {
    pub fn new(engine: AnalysisEngine) -> Self {
        Self { engine }
    }
}

impl Service<AnalysisRequest> for AnalysisService {
    type Response = AnalysisOutcome;
    type Error = EngineError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: AnalysisRequest) -> Self::Future {
        let result = self
            .engine
            .analyze(&request.perception, request.declared_type.as_deref())
            .map(|report| AnalysisOutcome {
                request_id: request.request_id,
                user_ref: request.user_ref,
                message_ref: request.message_ref,
                report,
            });

        Box::pin(async move { result })
    }
}
