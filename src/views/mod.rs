//! Lazy keyed views over GitHub resources
//!
//! Every level of the account → repository → branch → path hierarchy (and the
//! repository → issue / discussion → comment hierarchies) is a
//! [`LazyKeyedView`]: it can list its keys and resolve one key to a value, and
//! the value is often the next view down. Nothing touches the network until a
//! key is listed or resolved.
//!
//! ```no_run
//! use hubcap::github::GithubClient;
//! use hubcap::views::{AccountView, LazyKeyedView, TreeValue};
//!
//! let client = GithubClient::from_env().unwrap();
//! let account = AccountView::new(client, "tacogips").unwrap();
//!
//! let branches = account.get(&"hubcap".to_string()).unwrap();
//! let tree = branches.get(&"main".to_string()).unwrap();
//! if let TreeValue::File(bytes) = tree.get(&"Cargo.toml".to_string()).unwrap() {
//!     println!("{}", String::from_utf8_lossy(&bytes));
//! }
//! ```
//!
//! ## Caching
//!
//! A view memoizes its key listing for its own lifetime: listing twice costs
//! one remote enumeration, and later listings do not observe remote changes.
//! Views are single-threaded; use one view chain per thread.

mod account;
mod branches;
mod collection;
mod discussions;
mod issues;
mod objects;
mod repository;
mod tree;

pub use account::AccountView;
pub use branches::RepositoryBranchesView;
pub use collection::{EnumeratedCollectionView, enumerate_items, identity, keyed_by};
pub use discussions::DiscussionCollectionView;
pub use issues::{
    IssueCollectionView, IssueCommentsView, IssueContent, IssueContentsView, IssueField,
};
pub use objects::{ItemKey, KeyKind, ObjectsSpec, RepoObjectsView};
pub use repository::{
    DEFAULT_SUMMARY_FIELDS, RepoCollection, RepoCollectionValue, RepositoryHandle, RepositoryView,
};
pub use tree::{
    BranchTreeView, ContentExtractor, TreeValue, decoded_contents, default_extractor,
    text_contents,
};

use crate::github::Result;

/// Uniform navigation contract implemented by every resource view
pub trait LazyKeyedView {
    type Key;
    type Value;

    /// Lists the valid keys, in remote order
    ///
    /// The first call may hit the network; later calls on the same instance
    /// reuse the memoized listing.
    fn keys(&self) -> Result<Vec<Self::Key>>;

    /// Resolves one key
    ///
    /// Fails with [`HubError::NotFound`](crate::github::HubError::NotFound)
    /// when the key does not exist at this level.
    fn get(&self, key: &Self::Key) -> Result<Self::Value>;

    /// Whether `key` resolves
    ///
    /// Only a not-found outcome becomes `false`; every other failure is
    /// returned as an error.
    fn contains(&self, key: &Self::Key) -> Result<bool> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
