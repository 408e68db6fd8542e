//! # pdfium-auto
//!
//! Locate, download and cache a [PDFium](https://pdfium.googlesource.com/pdfium/)
//! shared library at runtime so `pdfium-render` users need no manual setup.
//!
//! ## Lookup order
//!
//! 1. `PDFIUM_LIB_PATH`, when it points at an existing file.
//! 2. The per-version cache directory (see [`pdfium_cache_dir`]).
//! 3. A download of the matching archive from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries),
//!    extracted into the cache.
//!
//! After the first success the path is memoised for the rest of the process.
//!
//! ```rust,no_run
//! let pdfium = pdfium_auto::bind_pdfium_silent().expect("PDFium unavailable");
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PDFIUM_LIB_PATH` — path to an existing pdfium library; skips download.
//! - `PDFIUM_AUTO_CACHE_DIR` — override the default cache directory.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

/// Environment variable naming an existing library.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "PDFIUM_AUTO_CACHE_DIR";

const BASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

/// Directory under the user cache root that holds downloaded libraries.
const CACHE_NAMESPACE: &str = "pdf2pptx";

const DOWNLOAD_CHUNK: usize = 64 * 1024;

/// Download progress: `(bytes_so_far, total_if_known)`.
pub type ProgressFn<'a> = &'a dyn Fn(u64, Option<u64>);

/// Errors returned by pdfium-auto operations.
#[derive(Error, Debug)]
pub enum PdfiumAutoError {
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Cache directory error: {0}")]
    CacheDir(#[source] std::io::Error),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Archive extraction failed: {0}")]
    Extract(String),

    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

// ── Platform table ───────────────────────────────────────────────────────────

/// One downloadable build of pdfium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Platform {
    os: &'static str,
    arch: &'static str,
    /// Release asset, e.g. `pdfium-mac-arm64.tgz`.
    archive: &'static str,
    /// Member path inside the archive.
    member: &'static str,
}

impl Platform {
    /// File name written into the cache directory.
    fn lib_name(&self) -> &'static str {
        self.member.rsplit('/').next().unwrap_or(self.member)
    }

    fn url(&self) -> String {
        format!("{BASE_URL}/chromium%2F{PDFIUM_VERSION}/{}", self.archive)
    }
}

const PLATFORMS: &[Platform] = &[
    Platform {
        os: "macos",
        arch: "aarch64",
        archive: "pdfium-mac-arm64.tgz",
        member: "lib/libpdfium.dylib",
    },
    Platform {
        os: "macos",
        arch: "x86_64",
        archive: "pdfium-mac-x64.tgz",
        member: "lib/libpdfium.dylib",
    },
    Platform {
        os: "linux",
        arch: "x86_64",
        archive: "pdfium-linux-x64.tgz",
        member: "lib/libpdfium.so",
    },
    Platform {
        os: "linux",
        arch: "aarch64",
        archive: "pdfium-linux-arm64.tgz",
        member: "lib/libpdfium.so",
    },
    Platform {
        os: "windows",
        arch: "x86_64",
        archive: "pdfium-win-x64.tgz",
        member: "bin/pdfium.dll",
    },
    Platform {
        os: "windows",
        arch: "aarch64",
        archive: "pdfium-win-arm64.tgz",
        member: "bin/pdfium.dll",
    },
    Platform {
        os: "windows",
        arch: "x86",
        archive: "pdfium-win-x86.tgz",
        member: "bin/pdfium.dll",
    },
];

fn platform_for(os: &str, arch: &str) -> Result<Platform, PdfiumAutoError> {
    PLATFORMS
        .iter()
        .find(|p| p.os == os && p.arch == arch)
        .copied()
        .ok_or_else(|| PdfiumAutoError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

fn current_platform() -> Result<Platform, PdfiumAutoError> {
    platform_for(std::env::consts::OS, std::env::consts::ARCH)
}

// ── Cache directory ──────────────────────────────────────────────────────────

/// Per-version cache directory for the library.
///
/// Defaults to `<user cache dir>/pdf2pptx/pdfium-{VERSION}/`
/// (`~/.cache` on Linux, `~/Library/Caches` on macOS, `%LOCALAPPDATA%` on
/// Windows). `PDFIUM_AUTO_CACHE_DIR` replaces the `<user cache dir>/pdf2pptx`
/// part.
pub fn pdfium_cache_dir() -> PathBuf {
    let version_dir = format!("pdfium-{PDFIUM_VERSION}");
    if let Ok(root) = std::env::var(CACHE_DIR_ENV) {
        return PathBuf::from(root).join(version_dir);
    }
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir)
        .join(CACHE_NAMESPACE)
        .join(version_dir)
}

fn env_library() -> Option<PathBuf> {
    let path = PathBuf::from(std::env::var_os(LIB_PATH_ENV)?);
    if path.exists() {
        Some(path)
    } else {
        warn!("{LIB_PATH_ENV}='{}' does not exist; ignoring", path.display());
        None
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

static RESOLVED_PATH: OnceLock<PathBuf> = OnceLock::new();

/// The library path if it is available without a download.
pub fn cached_pdfium_path() -> Option<PathBuf> {
    if let Some(path) = RESOLVED_PATH.get() {
        return Some(path.clone());
    }
    env_library().or_else(|| {
        let platform = current_platform().ok()?;
        let path = pdfium_cache_dir().join(platform.lib_name());
        path.exists().then_some(path)
    })
}

/// `true` when no network access is needed to bind pdfium.
pub fn is_pdfium_cached() -> bool {
    cached_pdfium_path().is_some()
}

/// Return the path of a usable pdfium library, downloading it if needed.
///
/// Safe to call from several threads; once resolved, the path is reused for
/// the rest of the process.
pub fn ensure_pdfium_library(
    on_progress: Option<ProgressFn<'_>>,
) -> Result<PathBuf, PdfiumAutoError> {
    if let Some(path) = cached_pdfium_path() {
        debug!("Using pdfium at {}", path.display());
        return Ok(RESOLVED_PATH.get_or_init(|| path).clone());
    }

    let platform = current_platform()?;
    let cache_dir = pdfium_cache_dir();
    std::fs::create_dir_all(&cache_dir).map_err(PdfiumAutoError::CacheDir)?;

    let url = platform.url();
    info!("Downloading pdfium {PDFIUM_VERSION} from {url}");
    let archive = download_bytes(&url, on_progress)?;

    let lib_path = cache_dir.join(platform.lib_name());
    extract_member(&archive, platform.member, &lib_path)?;
    info!("pdfium cached at {}", lib_path.display());

    Ok(RESOLVED_PATH.get_or_init(|| lib_path).clone())
}

/// Bind to pdfium, downloading it first if necessary.
pub fn bind_pdfium(on_progress: Option<ProgressFn<'_>>) -> Result<Pdfium, PdfiumAutoError> {
    let path = ensure_pdfium_library(on_progress)?;
    bind_pdfium_from_path(&path)
}

/// [`bind_pdfium`] without progress reporting.
pub fn bind_pdfium_silent() -> Result<Pdfium, PdfiumAutoError> {
    bind_pdfium(None)
}

/// Bind to the library at `path`; never downloads.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumAutoError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumAutoError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

// ── Download and extraction ──────────────────────────────────────────────────

fn download_bytes(
    url: &str,
    on_progress: Option<ProgressFn<'_>>,
) -> Result<Vec<u8>, PdfiumAutoError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-auto/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| PdfiumAutoError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| PdfiumAutoError::Download(format!("GET {url}: {e}")))?;
    if !response.status().is_success() {
        return Err(PdfiumAutoError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let mut buf = Vec::with_capacity(total.unwrap_or(0) as usize);
    read_with_progress(&mut response, &mut buf, total, on_progress)
        .map_err(|e| PdfiumAutoError::Download(format!("Read error: {e}")))?;
    Ok(buf)
}

/// Drain `reader` into `buf`, reporting progress after every chunk.
fn read_with_progress(
    reader: &mut impl Read,
    buf: &mut Vec<u8>,
    total: Option<u64>,
    on_progress: Option<ProgressFn<'_>>,
) -> std::io::Result<()> {
    let mut chunk = vec![0u8; DOWNLOAD_CHUNK];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(cb) = on_progress {
                    cb(buf.len() as u64, total);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Extract `member` from a `.tgz` into `dest`.
///
/// The file is unpacked next to `dest` and renamed into place, so a crash
/// mid-extraction never leaves a truncated library in the cache.
fn extract_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), PdfiumAutoError> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let extract_err = |e: std::io::Error| PdfiumAutoError::Extract(e.to_string());
    let mut tar = Archive::new(GzDecoder::new(archive));

    for entry in tar.entries().map_err(extract_err)? {
        let mut entry = entry.map_err(extract_err)?;
        if entry.path().map_err(extract_err)?.to_string_lossy() != member {
            continue;
        }
        let partial = dest.with_extension("partial");
        entry
            .unpack(&partial)
            .map_err(|e| PdfiumAutoError::Extract(format!("Unpack failed: {e}")))?;
        return std::fs::rename(&partial, dest).map_err(PdfiumAutoError::CacheDir);
    }

    Err(PdfiumAutoError::Extract(format!(
        "'{member}' not found in archive"
    )))
}
