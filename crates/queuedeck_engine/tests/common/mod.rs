#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use queuedeck_core::{
    Action, Format, Job, JobId, JobStatus, LogStream, StatusSummary, TaskId,
};
use queuedeck_engine::{ApiError, FailureKind, JobQueueApi};
use tokio::sync::Notify;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(deck_logging::initialize_for_tests);
}

pub fn network_error() -> ApiError {
    ApiError {
        kind: FailureKind::Network,
        message: "connection refused".into(),
    }
}

/// In-memory server that records every call by name.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<String>>,
    pub offline: AtomicBool,
    pub jobs: Mutex<Vec<Job>>,
    pub statuses: Mutex<VecDeque<Result<JobStatus, ApiError>>>,
    pub status_gate: Option<Arc<Notify>>,
    pub log_body: Vec<u8>,
    pub reject_create: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    fn record(&self, name: impl Into<String>) {
        self.calls.lock().unwrap().push(name.into());
    }
}

#[async_trait::async_trait]
impl JobQueueApi for FakeApi {
    async fn ping(&self) -> Result<(), ApiError> {
        self.record("ping");
        if self.offline.load(Ordering::SeqCst) {
            Err(network_error())
        } else {
            Ok(())
        }
    }

    async fn status_summary(&self) -> Result<StatusSummary, ApiError> {
        self.record("status");
        Ok(StatusSummary {
            num_total: self.jobs.lock().unwrap().len() as u32,
            ..StatusSummary::default()
        })
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.record("jobs");
        Ok(self.jobs.lock().unwrap().clone())
    }

    async fn job_status(&self, job_id: &JobId) -> Result<JobStatus, ApiError> {
        self.record(format!("get {job_id}"));
        if let Some(gate) = &self.status_gate {
            gate.notified().await;
        }
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(JobStatus::Done))
    }

    async fn create_job(&self, url: &str, format: &str) -> Result<JobId, ApiError> {
        self.record(format!("new {url} {format}"));
        if self.reject_create.load(Ordering::SeqCst) {
            Err(ApiError {
                kind: FailureKind::HttpStatus(400),
                message: "status code 400".into(),
            })
        } else {
            Ok(JobId::new("job-1"))
        }
    }

    async fn list_formats(&self) -> Result<Vec<Format>, ApiError> {
        self.record("formats");
        Ok(vec![Format {
            id: "mp3".into(),
            display: "MP3 audio".into(),
        }])
    }

    async fn job_action(&self, job_id: &JobId, action: Action) -> Result<(), ApiError> {
        self.record(format!("{action} {job_id}"));
        Ok(())
    }

    async fn bulk_action(&self, action: Action) -> Result<(), ApiError> {
        self.record(format!("{action}_all"));
        Ok(())
    }

    async fn task_action(&self, task_id: &TaskId, action: Action) -> Result<(), ApiError> {
        self.record(format!("{action} task {task_id}"));
        Ok(())
    }

    async fn task_log(&self, task_id: &TaskId, stream: LogStream) -> Result<Vec<u8>, ApiError> {
        self.record(format!("{stream} {task_id}"));
        Ok(self.log_body.clone())
    }

    async fn get_config(&self) -> Result<serde_json::Value, ApiError> {
        self.record("get config");
        Ok(serde_json::json!({}))
    }

    async fn set_config(&self, _value: &serde_json::Value) -> Result<(), ApiError> {
        self.record("set config");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ApiError> {
        self.record("shutdown");
        Ok(())
    }
}
