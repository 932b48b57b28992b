//! Request loop wiring the external collaborators around the engine.
//!
//! The perception provider and the result sink are thin I/O boundaries
//! owned by the deployment (vision service, datastore); the coordinator
//! only sequences them: perceive, analyze, persist. One job fails, the
//! loop logs it and keeps draining.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::AnalysisEngine;
use crate::error::AppError;
use crate::perception::PerceptionResult;
use crate::service::AnalysisOutcome;

/// External vision/OCR collaborator. Implementations fetch the image and
/// return the structured perception data; the engine never sees bytes.
#[async_trait]
pub trait PerceptionProvider: Send + Sync {
    async fn perceive(&self, image_ref: &str) -> Result<PerceptionResult, AppError>;
}

/// External persistence collaborator. Receives the finished outcome,
/// correlation ids included, and stores it verbatim.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn persist(&self, outcome: &AnalysisOutcome) -> Result<(), AppError>;
}

/// One queued unit of work: where the image lives and who asked.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub request_id: Uuid,
    pub user_ref: String,
    pub message_ref: String,
    pub image_ref: String,
    pub declared_type: Option<String>,
}

impl AnalysisJob {
    pub fn new(
        user_ref: impl Into<String>,
        message_ref: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user_ref: user_ref.into(),
            message_ref: message_ref.into(),
            image_ref: image_ref.into(),
            declared_type: None,
        }
    }
}

pub struct Coordinator {
    job_tx: Sender<AnalysisJob>,
    worker: tokio::task::JoinHandle<()>,
}

impl Coordinator {
    fn start(
        engine: AnalysisEngine,
        provider: Arc<dyn PerceptionProvider>,
        sink: Arc<dyn ResultSink>,
        queue_size: usize,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel(queue_size);
        let worker = Self::start_worker(engine, provider, sink, job_rx);
        Self { job_tx, worker }
    }

    fn start_worker(
        engine: AnalysisEngine,
        provider: Arc<dyn PerceptionProvider>,
        sink: Arc<dyn ResultSink>,
        mut job_rx: Receiver<AnalysisJob>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(job) = job_rx.recv().await {
                if let Err(e) = Self::run_job(&engine, provider.as_ref(), sink.as_ref(), job).await
                {
                    error!("Analysis job failed: {e}");
                }
            }
        })
    }

    async fn run_job(
        engine: &AnalysisEngine,
        provider: &dyn PerceptionProvider,
        sink: &dyn ResultSink,
        job: AnalysisJob,
    ) -> Result<(), AppError> {
        info!(user = %job.user_ref, image = %job.image_ref, "processing analysis job");
        let perception = provider.perceive(&job.image_ref).await?;
        let report = engine.analyze(&perception, job.declared_type.as_deref())?;
        let outcome = AnalysisOutcome {
            request_id: job.request_id,
            user_ref: job.user_ref.clone(),
            message_ref: job.message_ref,
            report,
        };
        sink.persist(&outcome).await?;
        info!(
            user = %job.user_ref,
            probability = outcome.report.probability,
            "analysis job persisted"
        );
        Ok(())
    }

    /// Queue one job, waiting for capacity.
    pub async fn submit(&self, job: AnalysisJob) -> Result<(), AppError> {
        self.job_tx.send(job).await.map_err(|_| AppError::QueueClosed)
    }

    /// Stop accepting jobs and wait until the queue is drained.
    pub async fn shutdown(self) {
        drop(self.job_tx);
        if let Err(e) = self.worker.await {
            error!("Coordinator worker ended abnormally: {e}");
        }
    }
}

pub struct CoordinatorBuilder {
    engine: AnalysisEngine,
    provider: Option<Arc<dyn PerceptionProvider>>,
    sink: Option<Arc<dyn ResultSink>>,
    queue_size: usize,
}

impl CoordinatorBuilder {
    pub fn new(engine: AnalysisEngine) -> Self {
        Self {
            engine,
            provider: None,
            sink: None,
            queue_size: 32,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn PerceptionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    pub fn build(self) -> Result<Coordinator, AppError> {
        let provider = self
            .provider
            .ok_or_else(|| AppError::InvalidConfig("perception provider not set".to_string()))?;
        let sink = self
            .sink
            .ok_or_else(|| AppError::InvalidConfig("result sink not set".to_string()))?;
        Ok(Coordinator::start(
            self.engine,
            provider,
            sink,
            self.queue_size,
        ))
    }
}
