use anyhow::Context;
use repovet_host::{HostPort, Release};

/// Looks up the latest published release tag of a named dependency.
pub struct ReleaseVersionFetcher {
    owner: String,
    name: String,
}

impl ReleaseVersionFetcher {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Latest published release. The host already excludes prereleases and
    /// drafts; a repository with no releases at all is an error, because a
    /// rule cannot establish its baseline from nothing.
    pub fn latest(&self, host: &dyn HostPort) -> anyhow::Result<Release> {
        host.latest_release(&self.owner, &self.name)
            .with_context(|| format!("fetch latest release of {}/{}", self.owner, self.name))?
            .with_context(|| format!("{}/{} has no published releases", self.owner, self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repovet_host::InMemoryHost;

    #[test]
    fn returns_the_latest_tag() {
        let mut host = InMemoryHost::new();
        host.set_release("protacon/jenkins-ptcs-library", "2.0.1");
        let fetcher = ReleaseVersionFetcher::new("protacon", "jenkins-ptcs-library");
        assert_eq!(fetcher.latest(&host).expect("release").tag_name, "2.0.1");
    }

    #[test]
    fn no_releases_is_an_error() {
        let host = InMemoryHost::new();
        let fetcher = ReleaseVersionFetcher::new("protacon", "jenkins-ptcs-library");
        assert!(fetcher.latest(&host).is_err());
    }
}
