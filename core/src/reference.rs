//! `$ref` line detection and re-indentation.
//!
//! Only whole lines of the form
//!
//! ```text
//! <spaces>[- ]$ref: ./relative/path.yml
//! ```
//!
//! are references. Anything else that merely looks similar (a quoted value,
//! a JSON pointer like `$ref: '#/definitions/Pet'`, a path without a leading
//! `./` or `../`) is left as literal text.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::paths;

static REF_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ ]*)(- )?\$ref: (\.\.?/.+\.ya?ml)$").expect("static regex must compile")
});

/// A reference line found in a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Byte range of the matched line, without its newline.
    pub span: Range<usize>,
    /// Leading spaces before the reference (or its list marker).
    pub indent: String,
    /// Whether the reference is a list item (`- $ref: ...`).
    pub is_list: bool,
    /// Relative path as written, starting with `./` or `../`.
    pub path: String,
}

impl Reference {
    /// Resolves the referenced path against the directory of the fragment
    /// containing this reference.
    pub fn target(&self, dir: &Path) -> PathBuf {
        paths::normalize(&dir.join(&self.path))
    }

    /// Re-indents `text` so it can replace this reference line.
    ///
    /// The first line takes the reference's position; every following line
    /// is prefixed with the reference indentation, plus one `indent_unit` for
    /// list references so the inlined block nests under its `- ` marker.
    ///
    /// # Examples
    ///
    /// ```
    /// use yamlfrag_core::find_references;
    ///
    /// let refs = find_references("items:\n  - $ref: ./Pet.yml\n");
    /// let block = refs[0].indent_block("type: object\nrequired:\n  - name\n", "  ");
    /// assert_eq!(block, "  - type: object\n    required:\n      - name");
    /// ```
    pub fn indent_block(&self, text: &str, indent_unit: &str) -> String {
        let mut marker = self.indent.clone();
        let mut continuation = format!("\n{}", self.indent);
        if self.is_list {
            marker.push_str("- ");
            continuation.push_str(indent_unit);
        }
        let joined = text.split('\n').collect::<Vec<_>>().join(&continuation);
        format!("{marker}{}", joined.trim())
    }
}

/// Finds every reference line in `text`, in document order.
///
/// # Examples
///
/// ```
/// use yamlfrag_core::find_references;
///
/// let text = "\
/// definitions:
///   $ref: ./definitions/.map.yml
/// tags:
///   - $ref: ../shared/tag.yaml
/// other:
///   $ref: '#/definitions/Pet'
/// ";
/// let refs = find_references(text);
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].path, "./definitions/.map.yml");
/// assert!(refs[1].is_list);
/// ```
pub fn find_references(text: &str) -> Vec<Reference> {
    REF_LINE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Reference {
                span: whole.range(),
                indent: caps.get(1).map_or("", |m| m.as_str()).to_string(),
                is_list: caps.get(2).is_some(),
                path: caps.get(3)?.as_str().to_string(),
            })
        })
        .collect()
}
