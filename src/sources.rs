//! Source-root inference.
//!
//! Cobertura's `<sources>` list names the directories that class file paths
//! are relative to. JaCoCo has no such concept, but the package names it
//! reports are path suffix fragments of the real source layout: a file
//! `/home/ci/project/src/main/java/com/example/Foo.java` in package
//! `com/example` implies the root `/home/ci/project/src/main/java/`. Each
//! known source file is matched against the report's package names and the
//! path prefix before the first match is collected as a root.

/// Derive the distinct source roots implied by `files` (absolute source
/// file paths) and `package_names` (slash-separated, in report order).
/// Roots are collected in first-seen order; files matching no package
/// contribute nothing.
#[must_use]
pub fn resolve_roots(files: &[String], package_names: &[String]) -> Vec<String> {
    let mut roots: Vec<String> = Vec::new();
    for file in files {
        if let Some(root) = root_for_file(file, package_names) {
            if !root.is_empty() && !roots.contains(&root) {
                roots.push(root);
            }
        }
    }
    roots
}

/// The path prefix preceding the first package-name match. All packages are
/// tried in slash form before any is tried in dot form; that precedence
/// decides which root wins for ambiguous layouts.
fn root_for_file(file: &str, package_names: &[String]) -> Option<String> {
    for package in package_names {
        if let Some(idx) = file.find(package.as_str()) {
            return Some(file[..idx].to_string());
        }
    }
    for package in package_names {
        let dotted = package.replace('/', ".");
        if let Some(idx) = file.find(&dotted) {
            return Some(file[..idx].to_string());
        }
    }
    None
}
