//! File tree of one branch
//!
//! A [`BranchTreeView`] is a directory at a fixed path on a fixed branch. Its
//! keys are the names of the directory's entries, with a trailing `/` on
//! subdirectories. Resolving a key either descends into a child directory
//! view or runs the configured content extractor on the file.

use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use serde_json::Value;

use super::repository::RepositoryHandle;
use super::LazyKeyedView;
use crate::github::client::encode_path;
use crate::github::{ContentFile, HubError, Result};

/// Turns a fetched file entry into the value exposed for it
pub type ContentExtractor<V> = Rc<dyn Fn(&ContentFile) -> Result<V>>;

/// Decoded file bytes
pub fn decoded_contents(file: &ContentFile) -> Result<Vec<u8>> {
    file.decoded_content()
}

/// Decoded file bytes as UTF-8 text
///
/// Fails with a protocol error on a non-UTF-8 payload.
pub fn text_contents(file: &ContentFile) -> Result<String> {
    String::from_utf8(file.decoded_content()?)
        .map_err(|e| HubError::protocol(format!("{} is not valid UTF-8: {}", file.path, e)))
}

/// The default extractor: raw decoded bytes
pub fn default_extractor() -> ContentExtractor<Vec<u8>> {
    Rc::new(decoded_contents)
}

/// What a tree key resolves to
pub enum TreeValue<V> {
    Dir(BranchTreeView<V>),
    File(V),
}

impl<V> fmt::Debug for TreeValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeValue::Dir(view) => f.debug_tuple("Dir").field(view).finish(),
            TreeValue::File(_) => f.write_str("File(..)"),
        }
    }
}

/// `.` and `..` never name an entry; the remote would collapse them
fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == "." || segment == "..")
}

pub struct BranchTreeView<V = Vec<u8>> {
    repo: RepositoryHandle,
    branch: String,
    path: String,
    extractor: ContentExtractor<V>,
    entries: OnceCell<Vec<ContentFile>>,
}

impl<V> BranchTreeView<V> {
    /// A directory view at `path` (`""` for the repository root) on `branch`
    pub fn new(
        repo: RepositoryHandle,
        branch: impl Into<String>,
        path: impl Into<String>,
        extractor: ContentExtractor<V>,
    ) -> Self {
        let path: String = path.into();
        Self {
            repo,
            branch: branch.into(),
            path: path.trim_matches('/').to_string(),
            extractor,
            entries: OnceCell::new(),
        }
    }

    pub fn repository(&self) -> &RepositoryHandle {
        &self.repo
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Directory path from the repository root, without leading or trailing `/`
    pub fn path(&self) -> &str {
        &self.path
    }

    fn child_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path, name)
        }
    }

    fn contents_route(&self, path: &str) -> String {
        let encoded = encode_path(path);
        if encoded.is_empty() {
            self.repo.route("contents")
        } else {
            self.repo.route(&format!("contents/{}", encoded))
        }
    }

    fn fetch(&self, path: &str) -> Result<Value> {
        let route = self.contents_route(path);
        self.repo
            .client()
            .get_json::<Value>(&route, &[("ref", self.branch.clone())])
            .map_err(|e| {
                if e.is_not_found() {
                    HubError::not_found(format!(
                        "{}@{}:/{}",
                        self.repo.full_name(),
                        self.branch,
                        path
                    ))
                } else {
                    e
                }
            })
    }

    /// Directory entries, fetched once per view
    pub fn entries(&self) -> Result<&[ContentFile]> {
        let entries = self.entries.get_or_try_init(|| -> Result<Vec<ContentFile>> {
            match self.fetch(&self.path)? {
                Value::Array(items) => {
                    let entries = serde_json::from_value::<Vec<ContentFile>>(Value::Array(items))?;
                    tracing::debug!(
                        "{}@{}:/{} has {} entries",
                        self.repo.full_name(),
                        self.branch,
                        self.path,
                        entries.len()
                    );
                    Ok(entries)
                }
                _ => Err(HubError::protocol(format!(
                    "{}@{}:/{} is not a directory",
                    self.repo.full_name(),
                    self.branch,
                    self.path
                ))),
            }
        })?;
        Ok(entries.as_slice())
    }

    fn child(&self, path: String, entries: Option<Vec<ContentFile>>) -> BranchTreeView<V> {
        BranchTreeView {
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            path: path.trim_matches('/').to_string(),
            extractor: self.extractor.clone(),
            // the fetch that identified the directory already listed it
            entries: entries.map_or_else(OnceCell::new, OnceCell::with_value),
        }
    }
}

impl<V> LazyKeyedView for BranchTreeView<V> {
    type Key = String;
    type Value = TreeValue<V>;

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .entries()?
            .iter()
            .map(|entry| {
                if entry.is_dir() {
                    format!("{}/", entry.name)
                } else {
                    entry.name.clone()
                }
            })
            .collect())
    }

    /// Resolves a name (or a relative multi-segment path) below this directory
    ///
    /// A trailing `/` is accepted and ignored, so every key from
    /// [`keys`](LazyKeyedView::keys) resolves.
    fn get(&self, key: &String) -> Result<TreeValue<V>> {
        let name = key.trim_matches('/');
        if name.is_empty() || has_dot_segment(name) {
            return Err(HubError::not_found(format!(
                "{:?} under {}@{}:/{}",
                key,
                self.repo.full_name(),
                self.branch,
                self.path
            )));
        }
        let path = self.child_path(name);

        match self.fetch(&path)? {
            Value::Array(items) => {
                let entries = serde_json::from_value::<Vec<ContentFile>>(Value::Array(items))?;
                Ok(TreeValue::Dir(self.child(path, Some(entries))))
            }
            file @ Value::Object(_) => {
                let file: ContentFile = serde_json::from_value(file)?;
                if file.is_dir() {
                    return Ok(TreeValue::Dir(self.child(path, None)));
                }
                Ok(TreeValue::File((self.extractor)(&file)?))
            }
            other => Err(HubError::protocol(format!(
                "unexpected contents payload for {}: {}",
                path, other
            ))),
        }
    }
}

impl<V> fmt::Debug for BranchTreeView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchTreeView")
            .field("repo", &self.repo.full_name())
            .field("branch", &self.branch)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::ContentKind;

    fn entry(content: &str) -> ContentFile {
        ContentFile {
            name: "hello.txt".to_string(),
            path: "hello.txt".to_string(),
            kind: ContentKind::File,
            sha: None,
            size: None,
            encoding: Some("base64".to_string()),
            content: Some(content.to_string()),
            download_url: None,
            html_url: None,
        }
    }

    #[test]
    fn test_text_contents_decodes_utf8() {
        // "héllo"
        assert_eq!(text_contents(&entry("aMOpbGxv")).unwrap(), "héllo");
    }

    #[test]
    fn test_text_contents_rejects_binary() {
        assert!(text_contents(&entry("//79")).unwrap_err().is_remote_protocol());
        assert_eq!(decoded_contents(&entry("//79")).unwrap(), vec![0xff, 0xfe, 0xfd]);
    }

    #[test]
    fn test_default_extractor_is_decoded_bytes() {
        let extract = default_extractor();
        assert_eq!(extract(&entry("aGk=")).unwrap(), b"hi".to_vec());
    }
}
