//! Retention engine implementation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, info, warn};

use super::directory::MediaDirectory;
use super::error::RetentionError;
use super::planner::{plan_age_purge, plan_size_purge};
use super::types::{
    DeletionFailure, MediaFile, PassReport, RemovedFile, RetentionPolicy, RetentionReport,
};

/// Applies a [`RetentionPolicy`] to a media directory.
pub struct RetentionEngine {
    directory: Arc<dyn MediaDirectory>,
    policy: RetentionPolicy,
    dry_run: bool,
}

impl RetentionEngine {
    pub fn new(directory: Arc<dyn MediaDirectory>, policy: RetentionPolicy) -> Self {
        Self {
            directory,
            policy,
            dry_run: false,
        }
    }

    /// Select files without deleting them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Run the age pass then the size pass, evaluated against `now`.
    ///
    /// Each pass scans the directory afresh, so the size pass sees the
    /// directory as the age pass left it. Only a failed scan is an error.
    pub fn enforce(&self, now: SystemTime) -> Result<RetentionReport, RetentionError> {
        let mut report = RetentionReport {
            dry_run: self.dry_run,
            ..Default::default()
        };
        // Files a dry run pretends to have removed
        let mut simulated: HashSet<String> = HashSet::new();

        if let Some(max_age) = self.policy.max_age {
            let files = self.snapshot(&simulated)?;
            let victims = plan_age_purge(&files, now, max_age);
            debug!(candidates = files.len(), victims = victims.len(), "Age pass planned");
            report.age_pass = Some(self.remove_all(&victims, "age", &mut simulated));
        }

        if let Some(max_size) = self.policy.max_size {
            let files = self.snapshot(&simulated)?;
            let victims = plan_size_purge(&files, max_size);
            debug!(candidates = files.len(), victims = victims.len(), "Size pass planned");
            report.size_pass = Some(self.remove_all(&victims, "size", &mut simulated));
        }

        let remaining = self.snapshot(&simulated)?;
        report.remaining_files = remaining.len();
        report.remaining_bytes = remaining.iter().map(|f| f.size).sum();

        Ok(report)
    }

    fn snapshot(&self, simulated: &HashSet<String>) -> Result<Vec<MediaFile>, RetentionError> {
        let mut files = self.directory.scan()?;
        if !simulated.is_empty() {
            files.retain(|f| !simulated.contains(&f.name));
        }
        Ok(files)
    }

    /// Delete each victim independently; failures are recorded, not raised.
    fn remove_all(
        &self,
        victims: &[&MediaFile],
        pass: &str,
        simulated: &mut HashSet<String>,
    ) -> PassReport {
        let mut report = PassReport::default();

        for file in victims {
            if self.dry_run {
                info!(pass = pass, file = %file.name, size = file.size, "Would delete");
                simulated.insert(file.name.clone());
            } else if let Err(e) = self.directory.remove(file) {
                warn!(pass = pass, file = %file.name, "Failed to delete: {}", e);
                report.failures.push(DeletionFailure {
                    name: file.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            } else {
                info!(pass = pass, file = %file.name, size = file.size, "Deleted");
            }

            report.bytes_freed += file.size;
            report.removed.push(RemovedFile {
                name: file.name.clone(),
                size: file.size,
            });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryMediaDirectory;
    use std::time::{Duration, UNIX_EPOCH};

    const DAY: u64 = 86_400;

    fn now() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_000 * DAY)
    }

    fn ago(secs: u64) -> SystemTime {
        now() - Duration::from_secs(secs)
    }

    fn engine(dir: &Arc<MemoryMediaDirectory>, policy: RetentionPolicy) -> RetentionEngine {
        RetentionEngine::new(dir.clone(), policy)
    }

    #[test]
    fn test_unbounded_policy_touches_nothing() {
        let dir = Arc::new(MemoryMediaDirectory::new());
        dir.add("a.opus", 100, ago(100 * DAY));

        let report = engine(&dir, RetentionPolicy::default()).enforce(now()).unwrap();
        assert!(report.age_pass.is_none());
        assert!(report.size_pass.is_none());
        assert_eq!(report.remaining_files, 1);
        assert_eq!(dir.names(), vec!["a.opus"]);
    }

    #[test]
    fn test_age_pass() {
        let dir = Arc::new(MemoryMediaDirectory::new());
        dir.add("stale.opus", 10, ago(2 * DAY));
        dir.add("fresh.opus", 10, ago(3600));

        let policy = RetentionPolicy {
            max_age: Some(Duration::from_secs(DAY)),
            max_size: None,
        };
        let report = engine(&dir, policy).enforce(now()).unwrap();

        assert_eq!(dir.names(), vec!["fresh.opus"]);
        let age = report.age_pass.unwrap();
        assert_eq!(age.removed.len(), 1);
        assert_eq!(age.bytes_freed, 10);
    }

    #[test]
    fn test_size_pass_sees_age_pass_result() {
        let dir = Arc::new(MemoryMediaDirectory::new());
        dir.add("ancient.opus", 1000, ago(30 * DAY));
        dir.add("old.opus", 100, ago(3 * DAY));
        dir.add("mid.opus", 200, ago(2 * DAY));
        dir.add("new.opus", 300, ago(DAY));

        // Without the age pass the total (1600) would already exceed
        // the budget; after it, 600 > 350 still triggers the size pass.
        let policy = RetentionPolicy {
            max_age: Some(Duration::from_secs(10 * DAY)),
            max_size: Some(350),
        };
        let report = engine(&dir, policy).enforce(now()).unwrap();

        assert_eq!(dir.names(), vec!["new.opus"]);
        assert_eq!(report.age_pass.unwrap().removed.len(), 1);
        let size = report.size_pass.unwrap();
        let removed: Vec<_> = size.removed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(removed, vec!["old.opus", "mid.opus"]);
        assert_eq!(report.remaining_bytes, 300);
    }

    #[test]
    fn test_age_pass_can_satisfy_size_budget() {
        let dir = Arc::new(MemoryMediaDirectory::new());
        dir.add("big-old.opus", 1000, ago(30 * DAY));
        dir.add("new.opus", 100, ago(DAY));

        let policy = RetentionPolicy {
            max_age: Some(Duration::from_secs(7 * DAY)),
            max_size: Some(500),
        };
        let report = engine(&dir, policy).enforce(now()).unwrap();

        assert_eq!(dir.names(), vec!["new.opus"]);
        assert!(report.size_pass.unwrap().removed.is_empty());
    }

    #[test]
    fn test_deletion_failure_does_not_stop_others() {
        let dir = Arc::new(MemoryMediaDirectory::new());
        dir.add("locked.opus", 10, ago(5 * DAY));
        dir.add("old.opus", 10, ago(4 * DAY));
        dir.fail_removal("locked.opus");

        let policy = RetentionPolicy {
            max_age: Some(Duration::from_secs(DAY)),
            max_size: None,
        };
        let report = engine(&dir, policy).enforce(now()).unwrap();

        assert_eq!(dir.names(), vec!["locked.opus"]);
        let age = report.age_pass.unwrap();
        assert_eq!(age.failures.len(), 1);
        assert_eq!(age.failures[0].name, "locked.opus");
        assert_eq!(age.removed.len(), 1);
        assert_eq!(report.remaining_files, 1);
    }

    #[test]
    fn test_dry_run_deletes_nothing_but_plans_both_passes() {
        let dir = Arc::new(MemoryMediaDirectory::new());
        dir.add("ancient.opus", 1000, ago(30 * DAY));
        dir.add("old.opus", 100, ago(3 * DAY));
        dir.add("new.opus", 300, ago(DAY));

        let policy = RetentionPolicy {
            max_age: Some(Duration::from_secs(10 * DAY)),
            max_size: Some(350),
        };
        let report = engine(&dir, policy)
            .with_dry_run(true)
            .enforce(now())
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(dir.names().len(), 3);
        assert_eq!(report.age_pass.unwrap().removed[0].name, "ancient.opus");
        // Size pass plans against the directory minus the age victims
        assert_eq!(report.size_pass.unwrap().removed[0].name, "old.opus");
        assert_eq!(report.remaining_bytes, 300);
    }

    #[test]
    fn test_scan_failure_is_an_error() {
        let dir = Arc::new(MemoryMediaDirectory::new());
        dir.fail_scans(true);
        let policy = RetentionPolicy {
            max_size: Some(1),
            ..Default::default()
        };
        assert!(engine(&dir, policy).enforce(now()).is_err());
    }
}
