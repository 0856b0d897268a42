//! Lexical path helpers.
//!
//! Fragment paths are compared and cached by their lexical form, so
//! `defs/./Pet.yml` and `paths/../defs/Pet.yml` must normalize to the same
//! key. Nothing here touches the filesystem except [`absolutize`].

use std::path::{Component, Path, PathBuf};

/// Removes `.` components and folds `..` into the preceding component.
///
/// A `..` that would climb above the start of a relative path is kept, one
/// that would climb above the root of an absolute path is dropped.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Makes `path` absolute against the current directory and normalizes it.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    Ok(normalize(&std::path::absolute(path)?))
}

/// Computes `target` relative to `base`, both taken lexically.
///
/// The result always uses `/` as separator since it ends up inside YAML
/// `$ref` values.
pub fn relative_to(target: &Path, base: &Path) -> String {
    let target = normalize(target);
    let base = normalize(base);
    let target: Vec<Component<'_>> = target.components().collect();
    let base: Vec<Component<'_>> = base
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..base.len() {
        parts.push("..".to_string());
    }
    for component in &target[common..] {
        if let Component::Normal(name) = component {
            parts.push(name.to_string_lossy().into_owned());
        }
    }
    parts.join("/")
}
