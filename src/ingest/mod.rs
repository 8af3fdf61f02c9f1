//! File-level ingestion: discovery, per-file scanning and batch aggregation.

pub mod batch;
pub mod discover;
pub mod file;

pub use batch::{BatchResult, BatchRunner, MultiRootResult, MultiRootSummary, RootResult, SurveyRow};
pub use discover::{default_root, resolve_roots, root_label, root_labels, DiscoveryRules};
pub use file::FileScanner;

/// Name of the machine doing the ingesting, recorded on every message.
pub fn local_hostname() -> String {
    #[cfg(unix)]
    {
        let mut buf = [0u8; 256];
        // SAFETY: buf is writable for its full length and gethostname never
        // writes past the length it is given.
        let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
        if rc == 0 {
            let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            let name = String::from_utf8_lossy(&buf[..end]).into_owned();
            if !name.is_empty() {
                return name;
            }
        }
    }

    std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
