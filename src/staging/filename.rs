//! Staging filename derivation from the payload URL.

use std::path::{Component, Path};

use url::Url;

use super::StagingError;

/// Returns the name the payload is staged under: the URL's last path segment.
///
/// The segment is percent-decoded and sanitized; query and fragment are not
/// part of it.
///
/// # Errors
///
/// Returns [`StagingError::InvalidFileName`] when the URL does not parse or
/// has no usable final segment (e.g. `http://host/` or `http://host/jobs/`).
pub fn staging_file_name(file_url: &str) -> Result<String, StagingError> {
    let invalid = || StagingError::invalid_file_name(file_url);

    let url = Url::parse(file_url).map_err(|_| invalid())?;
    let last = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(invalid)?;

    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |d| d.into_owned());
    let name = sanitize_filename(&decoded);

    if name.trim_matches('_').is_empty() || !is_safe_filename_segment(&name) {
        return Err(invalid());
    }
    Ok(name)
}

/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > | and control characters.
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
