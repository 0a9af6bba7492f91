//! Generic JSON collections of a repository
//!
//! Pull requests, workflow runs, releases and the other repository listings
//! share one shape: a paginated REST listing whose items are exposed as raw
//! JSON, keyed by an attribute or by position. Each collection is one row of
//! [`RepoCollection::objects_spec`].

use std::fmt;

use serde_json::Value;

use super::collection::EnumeratedCollectionView;
use super::repository::{RepoCollection, RepositoryHandle};
use super::LazyKeyedView;
use crate::github::client::encode_path;
use crate::github::{HubError, Result};

/// How the items of a collection are keyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// A numeric attribute, e.g. `number` or `id`
    Number(&'static str),
    /// A text attribute, e.g. `sha` or `login`
    Text(&'static str),
    /// Listing position
    Position,
}

/// Key of an item in a [`RepoObjectsView`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Index(usize),
    Number(u64),
    Name(String),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Index(i) => write!(f, "{}", i),
            ItemKey::Number(n) => write!(f, "{}", n),
            ItemKey::Name(name) => f.write_str(name),
        }
    }
}

impl KeyKind {
    /// Reads the key of one listed item
    pub fn key_of(&self, position: usize, item: &Value) -> Result<ItemKey> {
        match self {
            KeyKind::Position => Ok(ItemKey::Index(position)),
            KeyKind::Number(field) => item
                .get(field)
                .and_then(Value::as_u64)
                .map(ItemKey::Number)
                .ok_or_else(|| missing_attribute(field, item)),
            KeyKind::Text(field) => item
                .get(field)
                .and_then(Value::as_str)
                .map(|s| ItemKey::Name(s.to_string()))
                .ok_or_else(|| missing_attribute(field, item)),
        }
    }

    /// Parses a path segment into a key of this kind
    ///
    /// A segment that cannot be a key of this kind is not found.
    pub fn parse_segment(&self, segment: &str) -> Result<ItemKey> {
        match self {
            KeyKind::Position => segment
                .parse()
                .map(ItemKey::Index)
                .map_err(|_| HubError::not_found(format!("no item at position '{}'", segment))),
            KeyKind::Number(field) => segment
                .parse()
                .map(ItemKey::Number)
                .map_err(|_| HubError::not_found(format!("no item with {} '{}'", field, segment))),
            KeyKind::Text(_) => Ok(ItemKey::Name(segment.to_string())),
        }
    }
}

fn missing_attribute(field: &str, item: &Value) -> HubError {
    let preview: String = item.to_string().chars().take(120).collect();
    HubError::protocol(format!("listed item has no usable '{}': {}", field, preview))
}

/// One row of the collection table
#[derive(Debug, Clone, Copy)]
pub struct ObjectsSpec {
    /// Listing route under `repos/{owner}/{repo}/`
    pub endpoint: &'static str,
    /// Array field of wrapped listings, e.g. `workflow_runs`
    pub items_field: Option<&'static str>,
    pub key: KeyKind,
    /// Extra listing query parameters
    pub query: &'static [(&'static str, &'static str)],
    /// Single-item route with `{}` standing for the key
    pub item_route: Option<&'static str>,
}

const fn spec(
    endpoint: &'static str,
    items_field: Option<&'static str>,
    key: KeyKind,
    query: &'static [(&'static str, &'static str)],
    item_route: Option<&'static str>,
) -> ObjectsSpec {
    ObjectsSpec {
        endpoint,
        items_field,
        key,
        query,
        item_route,
    }
}

impl RepoCollection {
    /// Table row for collections served as raw JSON
    ///
    /// `None` for `issues` and `discussions`, which have dedicated views.
    pub fn objects_spec(&self) -> Option<ObjectsSpec> {
        const ALL: &[(&str, &str)] = &[("state", "all")];

        let row = match self {
            Self::Issues | Self::Discussions => return None,
            Self::Pulls => spec("pulls", None, KeyKind::Number("number"), ALL, Some("pulls/{}")),
            Self::Workflows => spec(
                "actions/workflows",
                Some("workflows"),
                KeyKind::Number("id"),
                &[],
                Some("actions/workflows/{}"),
            ),
            Self::WorkflowRuns => spec(
                "actions/runs",
                Some("workflow_runs"),
                KeyKind::Number("id"),
                &[],
                Some("actions/runs/{}"),
            ),
            Self::Commits => spec("commits", None, KeyKind::Text("sha"), &[], Some("commits/{}")),
            Self::Releases => spec(
                "releases",
                None,
                KeyKind::Text("tag_name"),
                &[],
                Some("releases/tags/{}"),
            ),
            Self::Tags => spec("tags", None, KeyKind::Text("name"), &[], None),
            Self::Labels => spec("labels", None, KeyKind::Text("name"), &[], Some("labels/{}")),
            Self::Milestones => spec(
                "milestones",
                None,
                KeyKind::Number("number"),
                ALL,
                Some("milestones/{}"),
            ),
            Self::Contributors => spec("contributors", None, KeyKind::Text("login"), &[], None),
            Self::Forks => spec("forks", None, KeyKind::Text("full_name"), &[], None),
            Self::Stargazers => spec("stargazers", None, KeyKind::Text("login"), &[], None),
            Self::Deployments => spec(
                "deployments",
                None,
                KeyKind::Number("id"),
                &[],
                Some("deployments/{}"),
            ),
            Self::Events => spec("events", None, KeyKind::Position, &[], None),
        };
        Some(row)
    }
}

/// A repository collection exposed as raw JSON items
pub struct RepoObjectsView {
    collection: RepoCollection,
    spec: ObjectsSpec,
    view: EnumeratedCollectionView<RepositoryHandle, ItemKey, Value, Value>,
}

impl RepoObjectsView {
    /// Fails with a configuration error for collections with a dedicated view
    pub fn new(repo: RepositoryHandle, collection: RepoCollection) -> Result<Self> {
        let spec = collection.objects_spec().ok_or_else(|| {
            HubError::configuration(format!("{} is not a generic collection", collection))
        })?;
        let label = format!("{} {}", repo.full_name(), collection);

        let mut view = EnumeratedCollectionView::new(
            label,
            repo,
            move |repo: &RepositoryHandle| {
                let query: Vec<(&str, String)> = spec
                    .query
                    .iter()
                    .map(|(k, v)| (*k, v.to_string()))
                    .collect();
                repo.client()
                    .get_paginated::<Value>(&repo.route(spec.endpoint), &query, spec.items_field)
            },
            move |items: Vec<Value>| {
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| Ok((spec.key.key_of(i, &item)?, item)))
                    .collect()
            },
            |item: &Value| Ok(item.clone()),
        );

        if let Some(item_route) = spec.item_route {
            view = view.with_fetcher(move |repo: &RepositoryHandle, key: &ItemKey| {
                let route = repo.route(&item_route.replace("{}", &encode_path(&key.to_string())));
                repo.client().get_json::<Value>(&route, &[]).map_err(|e| {
                    if e.is_not_found() {
                        HubError::not_found(format!("{} {} of {}", collection, key, repo.full_name()))
                    } else {
                        e
                    }
                })
            });
        }

        Ok(Self {
            collection,
            spec,
            view,
        })
    }

    pub fn collection(&self) -> RepoCollection {
        self.collection
    }

    pub fn key_kind(&self) -> KeyKind {
        self.spec.key
    }

    /// Parses a path segment into a key of this collection
    pub fn parse_key(&self, segment: &str) -> Result<ItemKey> {
        self.spec.key.parse_segment(segment)
    }
}

impl LazyKeyedView for RepoObjectsView {
    type Key = ItemKey;
    type Value = Value;

    fn keys(&self) -> Result<Vec<ItemKey>> {
        self.view.keys()
    }

    fn get(&self, key: &ItemKey) -> Result<Value> {
        self.view.get(key)
    }
}

impl fmt::Debug for RepoObjectsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoObjectsView")
            .field("collection", &self.collection)
            .field("view", &self.view)
            .finish()
    }
}
