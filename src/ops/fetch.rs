//! Fetching upstream sources into a work directory.
//!
//! Archives go through a shared download cache; git sources are cloned
//! straight into the work tree.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use flate2::read::GzDecoder;
use git2::{Repository, ResetType};
use tempfile::NamedTempFile;
use url::Url;

use crate::builder::recipe::SourceSpec;
use crate::util::diagnostic::suggestions;
use crate::util::fs::ensure_dir;
use crate::util::hash::verify_sha256;

/// Default HTTP timeout for downloads.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Options for fetching sources.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Shared download cache
    pub cache_dir: PathBuf,
    /// Fail instead of touching the network
    pub offline: bool,
    pub timeout: Duration,
}

impl FetchOptions {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        FetchOptions {
            cache_dir: cache_dir.into(),
            offline: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Make the sources described by `source` available under `work_root`.
pub fn fetch_source(source: &SourceSpec, work_root: &Path, opts: &FetchOptions) -> Result<()> {
    ensure_dir(work_root)?;

    match source {
        SourceSpec::Archive {
            urls,
            file_name,
            sha256,
        } => {
            let archive = cached_archive(urls, file_name, opts)?;
            if let Some(expected) = sha256 {
                if let Err(e) = verify_sha256(&archive, expected) {
                    // A corrupt cache entry must not survive to the next attempt.
                    let _ = std::fs::remove_file(&archive);
                    return Err(e);
                }
                tracing::debug!("checksum verified for {}", file_name);
            }
            extract_archive(&archive, work_root)
                .with_context(|| format!("failed to extract {}", archive.display()))
        }
        SourceSpec::Git { url, rev, dest } => {
            fetch_git(url, rev, &work_root.join(dest), opts.offline)
        }
    }
}

/// Path of `file_name` in the download cache, downloading it if needed.
///
/// URLs are tried in order; the first successful download wins.
fn cached_archive(urls: &[String], file_name: &str, opts: &FetchOptions) -> Result<PathBuf> {
    let cached = opts.cache_dir.join(file_name);
    if cached.is_file() {
        tracing::debug!("using cached {}", cached.display());
        return Ok(cached);
    }

    if opts.offline {
        bail!(
            "{} is not in the download cache ({}) and offline mode is enabled\nhelp: {}",
            file_name,
            opts.cache_dir.display(),
            suggestions::OFFLINE
        );
    }

    ensure_dir(&opts.cache_dir)?;

    let mut last_error = None;
    for url in urls {
        match download(url, &cached, opts.timeout) {
            Ok(()) => return Ok(cached),
            Err(e) => {
                tracing::warn!("download from {} failed: {:#}", url, e);
                last_error = Some(e);
            }
        }
    }

    let err = last_error.unwrap_or_else(|| anyhow!("no download URLs configured"));
    Err(err.context(format!(
        "failed to download {}\nhelp: {}",
        file_name,
        suggestions::FETCH_FAILED
    )))
}

/// Validate a download URL.
pub fn parse_download_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).with_context(|| format!("invalid download URL: {}", url))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => bail!("unsupported URL scheme `{}` in {}", other, url),
    }
}

/// File name an URL downloads to, if its path has one.
pub fn url_file_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .next_back()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Download `url` to `dest` through a temporary file in the same directory.
fn download(url: &str, dest: &Path, timeout: Duration) -> Result<()> {
    let parsed = parse_download_url(url)?;
    tracing::info!(
        "Downloading {}",
        url_file_name(&parsed).unwrap_or_else(|| url.to_string())
    );

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to create HTTP client")?;

    let mut response = client
        .get(parsed)
        .send()
        .with_context(|| format!("failed to download {}", url))?;

    if !response.status().is_success() {
        bail!("failed to download {}: HTTP {}", url, response.status());
    }

    let dir = dest
        .parent()
        .ok_or_else(|| anyhow!("download target has no parent: {}", dest.display()))?;
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;

    response
        .copy_to(&mut tmp)
        .with_context(|| format!("failed to read response body from {}", url))?;

    tmp.persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to store {}", dest.display()))?;

    Ok(())
}

/// Unpack a `.tar.gz` archive into `dest`.
///
/// Entries that would land outside `dest` are skipped.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive: {}", archive.display()))?;
    let mut tarball = tar::Archive::new(GzDecoder::new(file));

    ensure_dir(dest)?;

    for entry in tarball.entries().context("failed to read archive entries")? {
        let mut entry = entry.context("failed to read archive entry")?;
        let unpacked = entry
            .unpack_in(dest)
            .context("failed to unpack archive entry")?;

        if !unpacked {
            let path = entry.path().map(|p| p.display().to_string()).unwrap_or_default();
            tracing::warn!("skipped archive entry outside destination: {}", path);
        }
    }

    Ok(())
}

/// Clone `url` into `dest` (or reuse an existing clone) and check out `rev`.
fn fetch_git(url: &str, rev: &str, dest: &Path, offline: bool) -> Result<()> {
    let repo = if dest.join(".git").exists() {
        Repository::open(dest)
            .with_context(|| format!("failed to open git repository: {}", dest.display()))?
    } else {
        if offline {
            bail!(
                "{} must be cloned but offline mode is enabled\nhelp: {}",
                url,
                suggestions::OFFLINE
            );
        }
        tracing::info!("Cloning {}", url);
        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        Repository::clone(url, dest).with_context(|| format!("failed to clone {}", url))?
    };

    let object = repo
        .revparse_single(rev)
        .or_else(|_| repo.revparse_single(&format!("origin/{}", rev)))
        .with_context(|| format!("revision `{}` not found in {}", rev, url))?;
    let commit = object
        .peel_to_commit()
        .with_context(|| format!("revision `{}` is not a commit", rev))?;

    repo.reset(commit.as_object(), ResetType::Hard, None)
        .with_context(|| format!("failed to check out {} at {}", url, rev))?;

    tracing::debug!("checked out {} at {}", url, commit.id());
    Ok(())
}
