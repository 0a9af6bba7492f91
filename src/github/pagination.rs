//! Pagination helpers for REST `Link` headers and GraphQL connections.

use serde::Deserialize;

use super::error::{HubError, Result};

/// Upper bound on pages fetched for a single listing before giving up
///
/// At 100 items per page this allows 100k items, far beyond anything a
/// repository listing legitimately returns.
pub const MAX_PAGES: usize = 1000;

/// GraphQL `pageInfo` block
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// GraphQL connection: one page of nodes plus its `pageInfo`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub page_info: PageInfo,
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Connection<T> {
    /// Cursor to request the next page with, or `None` when this is the last page
    ///
    /// A page that claims a successor but carries no cursor would make the
    /// caller re-request the same page forever, so it is rejected.
    pub fn next_cursor(&self) -> Result<Option<String>> {
        if !self.page_info.has_next_page {
            return Ok(None);
        }
        match &self.page_info.end_cursor {
            Some(cursor) => Ok(Some(cursor.clone())),
            None => Err(HubError::protocol(
                "connection reports hasNextPage without an endCursor",
            )),
        }
    }
}

/// Accumulates every node of a GraphQL connection
///
/// `first` is an already-fetched first page (for connections embedded in a
/// larger query); when `None`, the first page is fetched with a `None` cursor.
/// `fetch_page` receives the cursor of the page to fetch.
pub fn paginate<T, F>(first: Option<Connection<T>>, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Result<Connection<T>>,
{
    let mut page = match first {
        Some(page) => page,
        None => fetch_page(None)?,
    };
    let mut items = Vec::new();
    let mut pages = 1;

    loop {
        let next = page.next_cursor()?;
        items.append(&mut page.nodes);

        let Some(cursor) = next else {
            break;
        };
        if pages >= MAX_PAGES {
            return Err(HubError::protocol(format!(
                "pagination did not terminate after {} pages",
                MAX_PAGES
            )));
        }
        page = fetch_page(Some(cursor))?;
        pages += 1;
    }

    tracing::debug!("Accumulated {} nodes over {} page(s)", items.len(), pages);
    Ok(items)
}

/// Extracts the `rel="next"` target from a REST `Link` header
///
/// ```
/// use hubcap::github::pagination::next_link;
///
/// let header = r#"<https://api.github.com/user/repos?page=3>; rel="next", <https://api.github.com/user/repos?page=50>; rel="last""#;
/// assert_eq!(next_link(header).as_deref(), Some("https://api.github.com/user/repos?page=3"));
/// ```
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if is_next && target.starts_with('<') && target.ends_with('>') {
            Some(target[1..target.len() - 1].to_string())
        } else {
            None
        }
    })
}
