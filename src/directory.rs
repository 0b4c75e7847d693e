use crate::error::{Error, Result};

/// Grouping key for a repository-relative test path: the first component
/// of its containing directory (`/css/foo/bar.html` -> `css`).
///
/// Names without a leading directory (`bar.html`) have no key.
pub fn directory_key(test_name: &str) -> Result<&str> {
    dirname(test_name)
        .split('/')
        .nth(1)
        .ok_or_else(|| Error::TestNameShape { test_name: test_name.to_string() })
}

// POSIX dirname: keep a root made only of slashes, strip trailing ones otherwise.
pub(crate) fn dirname(path: &str) -> &str {
    let head = match path.rfind('/') {
        Some(i) => &path[..=i],
        None => return "",
    };
    if head.bytes().all(|b| b == b'/') { head } else { head.trim_end_matches('/') }
}
