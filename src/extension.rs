use crate::model::NO_EXTENSION;

/// Extension key for a repository path.
///
/// Uses the text after the last `.` of the final `/` segment, case preserved.
/// Dotfiles such as `.gitignore` classify as `gitignore`, and a trailing dot
/// yields the empty extension.
pub fn classify(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) => &name[dot + 1..],
        None => NO_EXTENSION,
    }
}
