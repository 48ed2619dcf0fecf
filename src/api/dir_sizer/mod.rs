// src/api/dir_sizer/mod.rs
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::{
    api::{cancel::CancelFlag, error::DispatchError},
    dashboard::page::{Page, Placeholder, RowId},
};

mod jobs;
mod source;

pub use source::{HttpSizeSource, SizeSource, DIR_SIZE_ROUTE};

/// Outcome of one size query, addressed to the row it resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeEvent {
    Resolved {
        row: RowId,
        path: String,
        mb: String,
    },
    Failed {
        row: RowId,
        path: String,
        error: DispatchError,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub resolved: usize,
    pub dropped: usize,
    /// Path and reason of every dropped row, in arrival order.
    pub failures: Vec<(String, DispatchError)>,
}

pub fn cancel_dir_sizer(job_id: &str) -> bool {
    jobs::cancel(job_id)
}

/// Cancels every running dispatch job. Returns how many were running.
pub fn cancel_all() -> usize {
    jobs::cancel_all()
}

/// Fires one query per placeholder, all at once, and streams each outcome
/// as soon as it arrives. Cancelled queries send nothing. The receiver
/// closes when every query has finished.
pub fn start_dir_sizer(
    job_id: &str,
    placeholders: Vec<Placeholder>,
    source: Arc<dyn SizeSource>,
) -> Result<mpsc::Receiver<SizeEvent>, DispatchError> {
    let cancel = CancelFlag::new();
    if !jobs::register(job_id, &cancel) {
        return Err(DispatchError::JobExists(job_id.to_string()));
    }

    let (tx, rx) = mpsc::channel(placeholders.len().max(1));
    let job_id = job_id.to_string();

    tokio::spawn(async move {
        let mut tasks = Vec::with_capacity(placeholders.len());

        for Placeholder { row, path } in placeholders {
            let tx = tx.clone();
            let source = source.clone();
            let cancel = cancel.clone();

            tasks.push(tokio::spawn(async move {
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => return,
                    r = source.query(&path) => r,
                };
                let event = match outcome {
                    Ok(size) => SizeEvent::Resolved {
                        row,
                        path,
                        mb: size.mb,
                    },
                    Err(e) => {
                        error!(path = %path, error = %e, "size query failed");
                        SizeEvent::Failed {
                            row,
                            path,
                            error: e,
                        }
                    }
                };
                let _ = tx.send(event).await;
            }));
        }
        drop(tx);

        for t in tasks {
            let _ = t.await;
        }
        debug!(job_id = %job_id, "size dispatch finished");
        jobs::unregister(&job_id, &cancel);
    });

    Ok(rx)
}

/// Resolves every pending size cell of `page` in place.
pub async fn resolve_page(
    page: &mut Page,
    job_id: &str,
    source: Arc<dyn SizeSource>,
) -> Result<DispatchSummary, DispatchError> {
    let mut rx = start_dir_sizer(job_id, page.placeholders(), source)?;
    let mut summary = DispatchSummary::default();

    while let Some(event) = rx.recv().await {
        if !page.apply(&event) {
            continue;
        }
        match event {
            SizeEvent::Resolved { .. } => summary.resolved += 1,
            SizeEvent::Failed { path, error, .. } => {
                summary.dropped += 1;
                summary.failures.push((path, error));
            }
        }
    }
    Ok(summary)
}
