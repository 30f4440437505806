//! Validation of the pinned-library flags before any network traffic.

use anyhow::bail;
use repovet_rules::PinnedLibrary;

/// Assemble the pinned-library rule config from the CLI flags.
///
/// Both `--library` and `--library-source` must be given together; with
/// neither, the catalog simply runs without the version rule.
pub fn pinned_library(
    library: Option<&str>,
    source: Option<&str>,
    pipeline_file: &str,
) -> anyhow::Result<Option<PinnedLibrary>> {
    let (library, source) = match (library, source) {
        (None, None) => return Ok(None),
        (Some(library), Some(source)) => (library, source),
        (Some(_), None) => bail!("--library requires --library-source (OWNER/REPO)"),
        (None, Some(_)) => bail!("--library-source requires --library"),
    };
    if library.trim().is_empty() {
        bail!("--library must not be empty");
    }
    let (owner, repo) = parse_source(source)?;
    Ok(Some(PinnedLibrary {
        source_owner: owner,
        source_repo: repo,
        library: library.to_string(),
        pipeline_file: pipeline_file.to_string(),
    }))
}

fn parse_source(source: &str) -> anyhow::Result<(String, String)> {
    match source.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => bail!("--library-source must be OWNER/REPO, got {source:?}"),
    }
}
