//! The pipeline outbox: a bounded queue keyed by request id.
//!
//! The async tail of an approval is not fire-and-forget. Every approved
//! request gets exactly one outbox entry; a worker claims entries FIFO and
//! runs the pipeline. After a crash the `incomplete` listing shows which
//! pipelines never finished, so they can be resumed or reported instead of
//! silently lost. There is no automatic retry: a failed pipeline stays
//! failed until someone looks at it.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use siteproc_core::{RequestId, TenantId};

/// Where one pipeline run currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Pending,
    Running,
    Completed,
    Failed { error: String },
}

impl PipelineStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStatus::Completed | PipelineStatus::Failed { .. })
    }
}

/// One queued (or finished) pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineJob {
    pub request_id: RequestId,
    pub tenant_id: TenantId,
    pub status: PipelineStatus,
    pub enqueued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OutboxError {
    /// The request already has a pipeline entry (in any state); one
    /// approval means one pipeline.
    #[error("pipeline already enqueued for request {0}")]
    Duplicate(RequestId),
    /// Backpressure: too many pipelines in flight.
    #[error("pipeline queue full (capacity {capacity})")]
    Full { capacity: usize },
    #[error("no pipeline entry for request {0}")]
    NotFound(RequestId),
}

/// In-memory bounded outbox.
#[derive(Debug)]
pub struct ProcurementOutbox {
    capacity: usize,
    jobs: Mutex<HashMap<RequestId, PipelineJob>>,
}

impl ProcurementOutbox {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Queue the pipeline for one approved request.
    pub fn enqueue(&self, tenant_id: TenantId, request_id: RequestId) -> Result<(), OutboxError> {
        let mut jobs = self.jobs.lock().unwrap();
        if jobs.contains_key(&request_id) {
            return Err(OutboxError::Duplicate(request_id));
        }
        let in_flight = jobs.values().filter(|j| !j.status.is_terminal()).count();
        if in_flight >= self.capacity {
            return Err(OutboxError::Full {
                capacity: self.capacity,
            });
        }
        let now = Utc::now();
        jobs.insert(
            request_id,
            PipelineJob {
                request_id,
                tenant_id,
                status: PipelineStatus::Pending,
                enqueued_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    /// Claim the oldest pending job, marking it running.
    pub fn claim_next(&self) -> Option<PipelineJob> {
        let mut jobs = self.jobs.lock().unwrap();
        let next = jobs
            .values()
            .filter(|j| j.status == PipelineStatus::Pending)
            .min_by_key(|j| j.enqueued_at)
            .map(|j| j.request_id)?;
        let job = jobs.get_mut(&next)?;
        job.status = PipelineStatus::Running;
        job.updated_at = Utc::now();
        Some(job.clone())
    }

    pub fn complete(&self, request_id: RequestId) -> Result<(), OutboxError> {
        self.transition(request_id, PipelineStatus::Completed)
    }

    pub fn fail(&self, request_id: RequestId, error: impl Into<String>) -> Result<(), OutboxError> {
        self.transition(
            request_id,
            PipelineStatus::Failed {
                error: error.into(),
            },
        )
    }

    fn transition(&self, request_id: RequestId, status: PipelineStatus) -> Result<(), OutboxError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(&request_id)
            .ok_or(OutboxError::NotFound(request_id))?;
        job.status = status;
        job.updated_at = Utc::now();
        Ok(())
    }

    /// Jobs that have not reached a terminal state, oldest first. After a
    /// restart this is the list of pipelines to resume or report.
    pub fn incomplete(&self) -> Vec<PipelineJob> {
        let jobs = self.jobs.lock().unwrap();
        let mut open: Vec<_> = jobs
            .values()
            .filter(|j| !j.status.is_terminal())
            .cloned()
            .collect();
        open.sort_by_key(|j| j.enqueued_at);
        open
    }

    /// Re-queue a job that was claimed but never finished (e.g. found
    /// `Running` after a restart).
    pub fn requeue(&self, request_id: RequestId) -> Result<(), OutboxError> {
        self.transition(request_id, PipelineStatus::Pending)
    }

    pub fn get(&self, request_id: RequestId) -> Option<PipelineJob> {
        self.jobs.lock().unwrap().get(&request_id).cloned()
    }
}

impl Default for ProcurementOutbox {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_claim_and_complete() {
        let outbox = ProcurementOutbox::default();
        let tenant = TenantId::new();
        let first = RequestId::new();
        let second = RequestId::new();

        outbox.enqueue(tenant, first).unwrap();
        outbox.enqueue(tenant, second).unwrap();

        let claimed = outbox.claim_next().unwrap();
        assert_eq!(claimed.request_id, first);
        assert_eq!(claimed.status, PipelineStatus::Running);

        outbox.complete(first).unwrap();
        assert_eq!(outbox.claim_next().unwrap().request_id, second);
        outbox.complete(second).unwrap();

        assert!(outbox.claim_next().is_none());
        assert!(outbox.incomplete().is_empty());
    }

    #[test]
    fn duplicate_request_is_rejected() {
        let outbox = ProcurementOutbox::default();
        let tenant = TenantId::new();
        let request = RequestId::new();

        outbox.enqueue(tenant, request).unwrap();
        assert_eq!(
            outbox.enqueue(tenant, request),
            Err(OutboxError::Duplicate(request))
        );

        // Still rejected after completion: one approval, one pipeline.
        outbox.claim_next().unwrap();
        outbox.complete(request).unwrap();
        assert_eq!(
            outbox.enqueue(tenant, request),
            Err(OutboxError::Duplicate(request))
        );
    }

    #[test]
    fn capacity_bounds_in_flight_work() {
        let outbox = ProcurementOutbox::new(2);
        let tenant = TenantId::new();

        outbox.enqueue(tenant, RequestId::new()).unwrap();
        outbox.enqueue(tenant, RequestId::new()).unwrap();
        assert_eq!(
            outbox.enqueue(tenant, RequestId::new()),
            Err(OutboxError::Full { capacity: 2 })
        );

        // Completing one frees a slot.
        let claimed = outbox.claim_next().unwrap();
        outbox.complete(claimed.request_id).unwrap();
        assert!(outbox.enqueue(tenant, RequestId::new()).is_ok());
    }

    #[test]
    fn incomplete_lists_interrupted_pipelines() {
        let outbox = ProcurementOutbox::default();
        let tenant = TenantId::new();
        let crashed = RequestId::new();
        let waiting = RequestId::new();
        let done = RequestId::new();

        outbox.enqueue(tenant, crashed).unwrap();
        outbox.claim_next().unwrap();
        outbox.enqueue(tenant, waiting).unwrap();
        outbox.enqueue(tenant, done).unwrap();

        // `done` finishes, `crashed` is stuck running, `waiting` is pending.
        // (Claim order is FIFO, so pull `waiting` and finish `done` by hand.)
        outbox.fail(done, "simulated").unwrap();

        let open: Vec<_> = outbox.incomplete().iter().map(|j| j.request_id).collect();
        assert_eq!(open, vec![crashed, waiting]);

        // A stuck running job can be requeued and claimed again.
        outbox.requeue(crashed).unwrap();
        assert_eq!(outbox.claim_next().unwrap().request_id, crashed);
    }

    #[test]
    fn failed_pipeline_keeps_its_error() {
        let outbox = ProcurementOutbox::default();
        let tenant = TenantId::new();
        let request = RequestId::new();

        outbox.enqueue(tenant, request).unwrap();
        outbox.claim_next().unwrap();
        outbox.fail(request, "selector blew up").unwrap();

        let job = outbox.get(request).unwrap();
        assert_eq!(
            job.status,
            PipelineStatus::Failed { error: "selector blew up".to_string() }
        );
    }
}
