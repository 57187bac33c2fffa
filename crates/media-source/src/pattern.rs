//! File name matching: extension suffix and glob pattern.
//!
//! Both checks run on the bare file name, never on the full path, and
//! neither allocates.

use core::str::Chars;

/// Returns `true` when the suffix after the last `.` in `name` equals
/// `extension`, ignoring ASCII case.
///
/// A leading `.` on `extension` is ignored, so `".mp3"` and `"mp3"` behave
/// the same. An empty extension accepts every name.
pub fn extension_matches(name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return true;
    }
    match name.rsplit_once('.') {
        Some((_, suffix)) => suffix.eq_ignore_ascii_case(extension),
        None => false,
    }
}

/// Glob match of `name` against `pattern`. Case-sensitive.
///
/// `*` matches any run of characters (including none), `?` matches exactly
/// one character, everything else matches itself. An empty pattern matches
/// every name.
pub fn name_matches(pattern: &str, name: &str) -> bool {
    pattern.is_empty() || glob_match(pattern, name)
}

/// Iterative wildcard matcher with single-star backtracking.
///
/// On a mismatch after a `*`, the star absorbs one more character of `name`
/// and matching resumes right after the star. Runs in O(|pattern| × |name|)
/// worst case with constant memory.
fn glob_match(pattern: &str, name: &str) -> bool {
    let mut p = pattern.chars();
    let mut n = name.chars();
    // Pattern just past the most recent '*', and the name position it was tried at.
    let mut star: Option<(Chars<'_>, Chars<'_>)> = None;

    loop {
        let mut p_next = p.clone();
        let pc = p_next.next();
        if pc == Some('*') {
            p = p_next;
            star = Some((p.clone(), n.clone()));
            continue;
        }

        let mut n_next = n.clone();
        match (pc, n_next.next()) {
            (None, None) => return true,
            (Some(pc), Some(nc)) if pc == '?' || pc == nc => {
                p = p_next;
                n = n_next;
                continue;
            }
            _ => {}
        }

        let Some((star_p, star_n)) = star.as_mut() else {
            return false;
        };
        if star_n.next().is_none() {
            return false;
        }
        p = star_p.clone();
        n = star_n.clone();
    }
}
