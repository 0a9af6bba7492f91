//! Lazy key-value views over GitHub
//!
//! This library exposes GitHub resources as nested keyed lookups:
//! - an account maps repository names to repositories
//! - a repository maps branch names to file trees, and collection names
//!   (`issues`, `discussions`, `pulls`, `workflow_runs`, ...) to collections
//! - a file tree maps entry names to subdirectories or file contents
//! - an issue collection maps issue numbers to issues, a discussion collection
//!   maps discussion numbers to discussions with all comments and replies
//!
//! Every level implements [`views::LazyKeyedView`]. Nothing is fetched until a
//! key is listed or resolved, and each view lists its keys at most once.
//!
//! ## Authentication
//!
//! Public REST reads work without a token. Discussions (GraphQL) and the
//! authenticated user's repositories require one.
//!
//! ```bash
//! # Set GitHub token for authentication
//! export HUBCAP_GITHUB_TOKEN=your_github_token
//! ```
//!
//! ### GitHub Token (`HUBCAP_GITHUB_TOKEN`, falling back to `GITHUB_TOKEN`)
//!
//! - **Rate Limits**:
//!   - Without token: 60 requests/hour (unauthenticated)
//!   - With token: 5,000 requests/hour (authenticated)
//! - **Private Repositories**: Requires token with `repo` scope
//!
//! ## Usage
//!
//! ```no_run
//! use hubcap::github::GithubClient;
//! use hubcap::router::{PathRouter, Resolved};
//!
//! let router = PathRouter::new(GithubClient::from_env().unwrap());
//!
//! // Browser URLs work as well as plain paths
//! let readme = router
//!     .route("https://github.com/acme/widget/blob/main/README.md")
//!     .unwrap();
//! if let Resolved::File(bytes) = readme {
//!     println!("{}", String::from_utf8_lossy(&bytes));
//! }
//!
//! for number in router.route("acme/widget/issues").unwrap().keys().unwrap() {
//!     println!("issue #{}", number);
//! }
//! ```
//!
//! Views are single-threaded (`!Send`); build one view chain per thread.

pub mod github;
pub mod router;
pub mod views;
