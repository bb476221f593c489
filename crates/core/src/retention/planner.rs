//! Victim selection for the retention passes.
//!
//! Both planners are pure: they take a snapshot and return the files to
//! delete, oldest first. Files with equal `earliest_time` are ordered by
//! name so a given snapshot always yields the same plan.

use std::cmp::Ordering;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::types::MediaFile;

/// Total order used by both passes: earliest time, then name.
pub fn oldest_first(a: &MediaFile, b: &MediaFile) -> Ordering {
    a.earliest_time()
        .cmp(&b.earliest_time())
        .then_with(|| a.name.cmp(&b.name))
}

/// Files whose earliest time is strictly before `now - max_age`.
pub fn plan_age_purge(files: &[MediaFile], now: SystemTime, max_age: Duration) -> Vec<&MediaFile> {
    let threshold = now.checked_sub(max_age).unwrap_or(UNIX_EPOCH);

    let mut victims: Vec<&MediaFile> = files
        .iter()
        .filter(|f| f.earliest_time() < threshold)
        .collect();
    victims.sort_by(|a, b| oldest_first(a, b));
    victims
}

/// Oldest files to drop so the directory fits under `max_size`.
///
/// If the total is already within budget nothing is selected. Otherwise the
/// newest files are kept while their running total stays strictly below
/// `max_size`; everything older than the first file that breaks the budget
/// (that file included) is selected.
pub fn plan_size_purge(files: &[MediaFile], max_size: u64) -> Vec<&MediaFile> {
    let total: u64 = files.iter().map(|f| f.size).sum();
    if total <= max_size {
        return Vec::new();
    }

    let mut ordered: Vec<&MediaFile> = files.iter().collect();
    ordered.sort_by(|a, b| oldest_first(a, b));

    let mut kept_bytes = 0u64;
    let mut kept = 0usize;
    for file in ordered.iter().rev() {
        kept_bytes = kept_bytes.saturating_add(file.size);
        if kept_bytes >= max_size {
            break;
        }
        kept += 1;
    }

    ordered.truncate(ordered.len() - kept);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn file(name: &str, size: u64, secs: u64) -> MediaFile {
        MediaFile::new(format!("/media/{}", name), size, at(secs))
    }

    fn names(files: &[&MediaFile]) -> Vec<String> {
        files.iter().map(|f| f.name.clone()).collect()
    }

    #[test]
    fn test_age_purge_deletes_only_expired() {
        let now = at(100 * DAY);
        let files = vec![
            file("two-days.opus", 10, 98 * DAY),
            file("one-hour.opus", 10, 100 * DAY - 3600),
        ];

        let victims = plan_age_purge(&files, now, Duration::from_secs(DAY));
        assert_eq!(names(&victims), vec!["two-days.opus"]);
    }

    #[test]
    fn test_age_purge_threshold_is_strict() {
        let now = at(10 * DAY);
        let files = vec![file("exact.opus", 1, 9 * DAY)];
        assert!(plan_age_purge(&files, now, Duration::from_secs(DAY)).is_empty());
    }

    #[test]
    fn test_age_purge_uses_earliest_timestamp() {
        let now = at(100 * DAY);
        let mut touched = file("touched.opus", 1, 99 * DAY);
        // Recently accessed, but modified long ago
        touched.accessed = at(100 * DAY);
        touched.modified = at(50 * DAY);

        let files = vec![touched];
        let victims = plan_age_purge(&files, now, Duration::from_secs(7 * DAY));
        assert_eq!(victims.len(), 1);
    }

    #[test]
    fn test_age_purge_huge_age_selects_nothing() {
        let files = vec![file("a", 1, 0)];
        let victims = plan_age_purge(&files, at(DAY), Duration::from_secs(u64::MAX / 4));
        assert!(victims.is_empty());
    }

    #[test]
    fn test_size_purge_keeps_newest_under_budget() {
        let files = vec![
            file("newest-300", 300, 3),
            file("oldest-100", 100, 1),
            file("middle-200", 200, 2),
        ];

        let victims = plan_size_purge(&files, 350);
        assert_eq!(names(&victims), vec!["oldest-100", "middle-200"]);
    }

    #[test]
    fn test_size_purge_noop_within_budget() {
        let files = vec![file("a", 100, 1), file("b", 250, 2)];
        assert!(plan_size_purge(&files, 350).is_empty());
        assert!(plan_size_purge(&files, 1000).is_empty());
    }

    #[test]
    fn test_size_purge_exact_fit_is_removed() {
        // Running total reaching max_size exactly is not strictly less
        let files = vec![file("old", 50, 1), file("new", 100, 2)];
        let victims = plan_size_purge(&files, 100);
        assert_eq!(names(&victims), vec!["old", "new"]);
    }

    #[test]
    fn test_size_purge_stops_at_first_overflow() {
        // A small old file after a big one is still removed
        let files = vec![
            file("tiny-old", 1, 1),
            file("big", 500, 2),
            file("new", 100, 3),
        ];
        let victims = plan_size_purge(&files, 300);
        assert_eq!(names(&victims), vec!["tiny-old", "big"]);
    }

    #[test]
    fn test_size_purge_tie_break_by_name() {
        let files = vec![file("b", 100, 5), file("a", 100, 5), file("c", 100, 5)];

        // Newest-first keep scan walks c, b, a
        let victims = plan_size_purge(&files, 250);
        assert_eq!(names(&victims), vec!["a"]);

        // Deterministic across input orderings
        let reversed: Vec<MediaFile> = files.iter().rev().cloned().collect();
        assert_eq!(names(&plan_size_purge(&reversed, 250)), vec!["a"]);
    }

    #[test]
    fn test_size_purge_empty_directory() {
        assert!(plan_size_purge(&[], 1).is_empty());
    }
}
