use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::mpsc::SyncSender;
use tracing::warn;

/// True when the text after the path's last `.` is exactly `git`.
///
/// The whole path is split, not only the basename, so `/src/app/.git`,
/// `/srv/mirror.git` and even a plain file named `notes.git` all match while
/// `/src/app.git/HEAD` does not.
pub fn is_repository_candidate(path: &Path) -> bool {
    path.to_string_lossy().rsplit('.').next() == Some("git")
}

/// Walks `root` and sends every candidate path to `tx`, blocking until the
/// receiver takes it. Returns how many candidates were handed off; stops early
/// only if the receiver has gone away.
pub fn discover(root: &Path, tx: &SyncSender<PathBuf>) -> usize {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    let mut sent = 0;
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error while walking {}: {e}", root.display());
                continue;
            }
        };
        if !is_repository_candidate(entry.path()) {
            continue;
        }
        if tx.send(entry.into_path()).is_err() {
            warn!("Scan worker stopped; ending discovery early");
            break;
        }
        sent += 1;
    }
    sent
}
