// src/api/dir_sizer/jobs.rs
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use crate::api::cancel::CancelFlag;

/// Running dispatch jobs by id, so they can be cancelled from anywhere.
static JOBS: Lazy<Mutex<HashMap<String, CancelFlag>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn registry() -> Option<MutexGuard<'static, HashMap<String, CancelFlag>>> {
    JOBS.lock().ok()
}

/// Registers `cancel` under `job_id`. Fails while the id is still taken.
pub fn register(job_id: &str, cancel: &CancelFlag) -> bool {
    let Some(mut jobs) = registry() else {
        return false;
    };
    if jobs.contains_key(job_id) {
        return false;
    }
    jobs.insert(job_id.to_string(), cancel.clone());
    true
}

/// Drops the entry for `job_id` only if it still holds `cancel`. A job that
/// was cancelled and replaced under the same id keeps its entry.
pub fn unregister(job_id: &str, cancel: &CancelFlag) -> bool {
    let Some(mut jobs) = registry() else {
        return false;
    };
    match jobs.get(job_id) {
        Some(current) if current.same_as(cancel) => {
            jobs.remove(job_id);
            true
        }
        _ => false,
    }
}

pub fn cancel(job_id: &str) -> bool {
    let flag = registry().and_then(|mut jobs| jobs.remove(job_id));
    flag.map(|f| f.cancel()).is_some()
}

pub fn cancel_all() -> usize {
    let drained: Vec<CancelFlag> = registry()
        .map(|mut jobs| jobs.drain().map(|(_, flag)| flag).collect())
        .unwrap_or_default();
    drained.iter().for_each(CancelFlag::cancel);
    drained.len()
}
