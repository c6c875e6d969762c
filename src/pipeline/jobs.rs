// Lectern Async Media Job Client
// Copyright (c) 2026 The Lectern Authors
//
// Submit one vendor job per work item, then poll the vendor's status
// endpoint in rounds until every tracked job resolves or the policy's
// attempt budget runs out. Submission order is preserved end-to-end:
// record N always corresponds to item N.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// A generation vendor reachable over HTTP.
///
/// `submit` returns `Ok(None)` when the vendor rejects the item (e.g. a
/// non-success HTTP status); `check` returns `Ok(None)` while the job is
/// still pending. Transport errors are surfaced as `Err` and treated by
/// the driver the same as a pending round.
#[async_trait]
pub trait MediaVendor {
    type Item: Send + Sync;

    async fn submit(&self, item: &Self::Item) -> Result<Option<String>>;

    async fn check(&self, job_id: &str) -> Result<Option<String>>;
}

/// Bounded polling schedule. The vendor needs a long first delay before
/// any job-set has results, then settles into short rounds.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub retry_interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(30),
            retry_interval: Duration::from_secs(5),
            max_attempts: 120,
        }
    }
}

/// Terminal and intermediate states of one tracked job. A `Resolved`
/// URL is written exactly once and never regresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "url", rename_all = "snake_case")]
pub enum JobState {
    SubmitFailed,
    Pending,
    Resolved(String),
    TimedOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    /// Position of the originating item in the submission order.
    pub index: usize,
    pub job_id: Option<String>,
    #[serde(flatten)]
    pub state: JobState,
}

impl JobRecord {
    pub fn url(&self) -> Option<&str> {
        match &self.state {
            JobState::Resolved(url) => Some(url.as_str()),
            _ => None,
        }
    }
}

/// Submit every item in order, then poll until all tracked jobs resolve
/// or `policy.max_attempts` rounds have elapsed. Jobs still pending at
/// the end come back as `TimedOut`; jobs the vendor rejected come back
/// as `SubmitFailed`. The output is always `items.len()` records long,
/// in submission order.
pub async fn run_jobs<V: MediaVendor + Sync>(
    vendor: &V,
    items: &[V::Item],
    policy: &PollPolicy,
) -> Vec<JobRecord> {
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        match vendor.submit(item).await {
            Ok(Some(job_id)) => records.push(JobRecord {
                index,
                job_id: Some(job_id),
                state: JobState::Pending,
            }),
            Ok(None) => {
                warn!("[JOBS] Vendor rejected item {}", index);
                records.push(JobRecord {
                    index,
                    job_id: None,
                    state: JobState::SubmitFailed,
                });
            }
            Err(e) => {
                warn!("[JOBS] Submission failed for item {}: {}", index, e);
                records.push(JobRecord {
                    index,
                    job_id: None,
                    state: JobState::SubmitFailed,
                });
            }
        }
    }

    let submitted = records
        .iter()
        .filter(|r| r.state == JobState::Pending)
        .count();
    info!(
        "[JOBS] Submitted {}/{} jobs, polling for results",
        submitted,
        items.len()
    );

    if submitted > 0 {
        tokio::time::sleep(policy.initial_delay).await;
    }

    for round in 0..policy.max_attempts {
        let mut pending = 0;
        for record in records.iter_mut() {
            if record.state != JobState::Pending {
                continue;
            }
            let Some(job_id) = record.job_id.as_deref() else {
                continue;
            };
            match vendor.check(job_id).await {
                Ok(Some(url)) => {
                    info!("[JOBS] Job {} resolved: {}", job_id, url);
                    record.state = JobState::Resolved(url);
                }
                Ok(None) => pending += 1,
                Err(e) => {
                    // Vendor hiccups count as "still pending" for this round.
                    warn!("[JOBS] Status check failed for {}: {}", job_id, e);
                    pending += 1;
                }
            }
        }

        if pending == 0 {
            break;
        }
        if round + 1 < policy.max_attempts {
            tokio::time::sleep(policy.retry_interval).await;
        }
    }

    let mut timed_out = 0;
    for record in records.iter_mut() {
        if record.state == JobState::Pending {
            record.state = JobState::TimedOut;
            timed_out += 1;
        }
    }
    if timed_out > 0 {
        warn!("[JOBS] {} job(s) never completed within the poll budget", timed_out);
    }

    records
}

/// Resolved URLs only, in submission order. This is the view the media
/// assembler consumes.
pub fn resolved_urls(records: &[JobRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.url().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Test double: items are (submit_ok, checks_until_done). A job with
    /// `checks_until_done == u32::MAX` never completes.
    struct ScriptedVendor {
        checks: Mutex<HashMap<String, u32>>,
    }

    impl ScriptedVendor {
        fn new() -> Self {
            Self {
                checks: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl MediaVendor for ScriptedVendor {
        type Item = (bool, u32);

        async fn submit(&self, item: &(bool, u32)) -> Result<Option<String>> {
            if item.0 {
                Ok(Some(format!("job-{}", item.1)))
            } else {
                Ok(None)
            }
        }

        async fn check(&self, job_id: &str) -> Result<Option<String>> {
            let due: u32 = job_id.trim_start_matches("job-").parse().unwrap();
            let mut checks = self.checks.lock().unwrap();
            let seen = checks.entry(job_id.to_string()).or_insert(0);
            *seen += 1;
            if due != u32::MAX && *seen > due {
                Ok(Some(format!("https://cdn.example/{job_id}.mp4")))
            } else {
                Ok(None)
            }
        }
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_millis(0),
            retry_interval: Duration::from_millis(1),
            max_attempts: 5,
        }
    }

    #[tokio::test]
    async fn test_partial_completion_is_bounded() {
        // Two jobs finish, one never does; run_jobs must still return.
        let vendor = ScriptedVendor::new();
        let items = vec![(true, 0), (true, 1), (true, u32::MAX)];
        let records = run_jobs(&vendor, &items, &fast_policy()).await;

        assert_eq!(records.len(), 3);
        assert!(matches!(records[0].state, JobState::Resolved(_)));
        assert!(matches!(records[1].state, JobState::Resolved(_)));
        assert_eq!(records[2].state, JobState::TimedOut);
        assert_eq!(resolved_urls(&records).len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_submission_is_recorded_not_dropped() {
        let vendor = ScriptedVendor::new();
        let items = vec![(false, 0), (true, 0)];
        let records = run_jobs(&vendor, &items, &fast_policy()).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].state, JobState::SubmitFailed);
        assert!(records[0].job_id.is_none());
        assert!(matches!(records[1].state, JobState::Resolved(_)));
        // The legacy view simply omits the failed item.
        assert_eq!(resolved_urls(&records), vec![records[1].url().unwrap()]);
    }

    #[tokio::test]
    async fn test_output_order_matches_submission_order() {
        // Later submissions resolve first; order must not change.
        let vendor = ScriptedVendor::new();
        let items = vec![(true, 2), (true, 0), (true, 1)];
        let records = run_jobs(&vendor, &items, &fast_policy()).await;

        let indices: Vec<usize> = records.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        let urls = resolved_urls(&records);
        assert_eq!(urls[0], "https://cdn.example/job-2.mp4");
        assert_eq!(urls[1], "https://cdn.example/job-0.mp4");
        assert_eq!(urls[2], "https://cdn.example/job-1.mp4");
    }

    #[tokio::test]
    async fn test_nothing_submitted_skips_polling() {
        let vendor = ScriptedVendor::new();
        let items = vec![(false, 0), (false, 0)];
        let records = run_jobs(&vendor, &items, &fast_policy()).await;
        assert!(records.iter().all(|r| r.state == JobState::SubmitFailed));
        assert!(resolved_urls(&records).is_empty());
    }

    #[test]
    fn test_job_record_serialization() {
        let record = JobRecord {
            index: 0,
            job_id: Some("abc".to_string()),
            state: JobState::Resolved("https://cdn.example/a.mp4".to_string()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["state"], "resolved");
        assert_eq!(json["url"], "https://cdn.example/a.mp4");
    }
}
