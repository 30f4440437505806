use crate::rules::Rule;
use chrono::{Duration, Utc};
use repovet_host::{HostPort, Repository};
use repovet_types::ValidationResult;
use std::collections::HashMap;
use tracing::debug;

const STALE_AFTER_DAYS: i64 = 90;
const STALE_LIMIT: usize = 10;

const HOW_TO_FIX: &str =
    "Remove branches, that have not been updated in 90 days or more.";

/// Fewer than ten branches may have a tip commit older than ninety days.
///
/// The scan short-circuits as soon as the limit is reached: this is a
/// threshold check, not an exhaustive count. Tip-commit dates are memoized
/// per SHA so branches sharing a tip cost one commit fetch.
pub struct HasNotManyStaleBranches;

impl HasNotManyStaleBranches {
    pub const NAME: &'static str = "Stale branches";
}

impl Rule for HasNotManyStaleBranches {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_valid(
        &self,
        host: &dyn HostPort,
        repo: &Repository,
    ) -> anyhow::Result<ValidationResult> {
        let branches = host.branches(&repo.owner, &repo.name)?;

        let now = Utc::now();
        let cutoff = Duration::days(STALE_AFTER_DAYS);
        let mut stale_by_sha: HashMap<String, bool> = HashMap::new();
        let mut stale_count = 0usize;

        for branch in &branches {
            let stale = match stale_by_sha.get(&branch.tip_sha) {
                Some(known) => *known,
                None => {
                    let commit = host.commit(&repo.owner, &repo.name, &branch.tip_sha)?;
                    let stale = now - commit.author_date > cutoff;
                    stale_by_sha.insert(branch.tip_sha.clone(), stale);
                    stale
                }
            };

            if stale {
                stale_count += 1;
            }
            if stale_count >= STALE_LIMIT {
                break;
            }
        }

        let valid = stale_count < STALE_LIMIT;
        debug!(
            repository = %repo.full_name(),
            stale_count,
            valid,
            "stale branch scan"
        );
        Ok(ValidationResult::new(Self::NAME, HOW_TO_FIX, valid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::repository;
    use repovet_host::{Commit, InMemoryHost};

    fn seed_branches(host: &mut InMemoryHost, stale: usize, fresh: usize) {
        let now = Utc::now();
        for i in 0..stale {
            let sha = format!("stale-{i}");
            host.add_branch("org/repo", &format!("old-{i}"), &sha);
            host.add_commit(Commit {
                sha,
                tree_sha: format!("tree-{i}"),
                author_date: now - Duration::days(180),
            });
        }
        for i in 0..fresh {
            let sha = format!("fresh-{i}");
            host.add_branch("org/repo", &format!("new-{i}"), &sha);
            host.add_commit(Commit {
                sha,
                tree_sha: format!("tree-fresh-{i}"),
                author_date: now - Duration::days(3),
            });
        }
    }

    #[test]
    fn nine_stale_branches_are_valid() {
        let mut host = InMemoryHost::new();
        seed_branches(&mut host, 9, 1);
        let repo = repository("org", "repo");
        assert!(HasNotManyStaleBranches
            .is_valid(&host, &repo)
            .expect("rule")
            .is_valid);
    }

    #[test]
    fn ten_stale_branches_are_invalid() {
        let mut host = InMemoryHost::new();
        seed_branches(&mut host, 10, 0);
        let repo = repository("org", "repo");
        assert!(!HasNotManyStaleBranches
            .is_valid(&host, &repo)
            .expect("rule")
            .is_valid);
    }

    #[test]
    fn scan_stops_at_the_tenth_stale_branch() {
        let mut host = InMemoryHost::new();
        seed_branches(&mut host, 25, 0);
        let repo = repository("org", "repo");
        let result = HasNotManyStaleBranches.is_valid(&host, &repo).expect("rule");
        assert!(!result.is_valid);
        assert_eq!(host.calls_to("commit"), 10);
    }

    #[test]
    fn shared_tip_commits_are_fetched_once() {
        let mut host = InMemoryHost::new();
        let now = Utc::now();
        host.add_commit(Commit {
            sha: "shared".into(),
            tree_sha: "tree".into(),
            author_date: now - Duration::days(180),
        });
        for i in 0..3 {
            host.add_branch("org/repo", &format!("b-{i}"), "shared");
        }
        let repo = repository("org", "repo");
        assert!(HasNotManyStaleBranches
            .is_valid(&host, &repo)
            .expect("rule")
            .is_valid);
        assert_eq!(host.calls_to("commit"), 1);
    }

    #[test]
    fn empty_repository_is_valid() {
        let host = InMemoryHost::new();
        let repo = repository("org", "repo");
        assert!(HasNotManyStaleBranches
            .is_valid(&host, &repo)
            .expect("rule")
            .is_valid);
    }
}
