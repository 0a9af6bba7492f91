//! Generic adapter from a remote "list X under P" call to a keyed view.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use once_cell::unsync::OnceCell;

use super::LazyKeyedView;
use crate::github::{HubError, Result};

type Lister<P, R> = Box<dyn Fn(&P) -> Result<Vec<R>>>;
type KeyOf<K, R> = Box<dyn Fn(Vec<R>) -> Result<Vec<(K, R)>>>;
type ValueOf<R, V> = Box<dyn Fn(&R) -> Result<V>>;
type Fetcher<P, K, R> = Box<dyn Fn(&P, &K) -> Result<R>>;

/// Positional keys 0, 1, 2, ... for resources without a natural id
pub fn enumerate_items<R>(items: Vec<R>) -> Result<Vec<(usize, R)>> {
    Ok(items.into_iter().enumerate().collect())
}

/// Keys each item by an attribute read off the item
pub fn keyed_by<K, R, F>(key: F) -> impl Fn(Vec<R>) -> Result<Vec<(K, R)>>
where
    F: Fn(&R) -> Result<K>,
{
    move |items| {
        items
            .into_iter()
            .map(|item| Ok((key(&item)?, item)))
            .collect()
    }
}

/// Exposes the raw item unchanged
pub fn identity<R: Clone>(raw: &R) -> Result<R> {
    Ok(raw.clone())
}

/// The materialized `key -> raw item` association, in listing order
struct Listing<K, R> {
    entries: Vec<(K, R)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone + fmt::Debug, R> Listing<K, R> {
    fn new(keyed: Vec<(K, R)>) -> Self {
        let mut entries = Vec::with_capacity(keyed.len());
        let mut index = HashMap::with_capacity(keyed.len());
        for (key, raw) in keyed {
            if index.contains_key(&key) {
                tracing::warn!("Duplicate key {:?} in listing; keeping the first", key);
                continue;
            }
            index.insert(key.clone(), entries.len());
            entries.push((key, raw));
        }
        Self { entries, index }
    }

    fn lookup(&self, key: &K) -> Option<&R> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }
}

/// A keyed view over any paginated remote listing
///
/// Configured with:
/// - `parent`: the owning resource handle
/// - `lister`: `parent -> raw items` (the remote listing call)
/// - `key_of`: `raw items -> (key, raw item)` pairs, see [`enumerate_items`]
///   and [`keyed_by`]
/// - `value_of`: `raw item -> exposed value`, applied on every `get`
/// - optionally a `fetcher`: `(parent, key) -> raw item`, a direct single-item
///   lookup `get` uses while the listing has not been materialized
///
/// The lister runs at most once per instance. Once the listing exists, `get`
/// answers from it, so a key absent from the listing is not found even if the
/// remote would now resolve it. A fetched item is keyed with `key_of` and must
/// carry exactly the requested key, so fetchers only suit attribute keys.
pub struct EnumeratedCollectionView<P, K, R, V> {
    label: String,
    parent: P,
    lister: Lister<P, R>,
    key_of: KeyOf<K, R>,
    value_of: ValueOf<R, V>,
    fetcher: Option<Fetcher<P, K, R>>,
    listing: OnceCell<Listing<K, R>>,
}

impl<P, K, R, V> EnumeratedCollectionView<P, K, R, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// `label` names the collection in logs and not-found errors
    pub fn new<L, KF, VF>(
        label: impl Into<String>,
        parent: P,
        lister: L,
        key_of: KF,
        value_of: VF,
    ) -> Self
    where
        L: Fn(&P) -> Result<Vec<R>> + 'static,
        KF: Fn(Vec<R>) -> Result<Vec<(K, R)>> + 'static,
        VF: Fn(&R) -> Result<V> + 'static,
    {
        Self {
            label: label.into(),
            parent,
            lister: Box::new(lister),
            key_of: Box::new(key_of),
            value_of: Box::new(value_of),
            fetcher: None,
            listing: OnceCell::new(),
        }
    }

    /// Adds a direct single-item lookup
    pub fn with_fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: Fn(&P, &K) -> Result<R> + 'static,
    {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }

    /// Whether the listing has already been fetched
    pub fn is_materialized(&self) -> bool {
        self.listing.get().is_some()
    }

    fn listing(&self) -> Result<&Listing<K, R>> {
        self.listing.get_or_try_init(|| -> Result<Listing<K, R>> {
            tracing::debug!("Enumerating {}", self.label);
            let raw = (self.lister)(&self.parent)?;
            let keyed = (self.key_of)(raw)?;
            let listing = Listing::new(keyed);
            tracing::debug!("{}: {} key(s) memoized", self.label, listing.entries.len());
            Ok(listing)
        })
    }

    /// Raw items with their keys, in listing order
    pub fn raw_items(&self) -> Result<impl Iterator<Item = (&K, &R)>> {
        Ok(self.listing()?.entries.iter().map(|(k, r)| (k, r)))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.listing()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn not_found(&self, key: &K) -> HubError {
        HubError::not_found(format!("{}: no key {:?}", self.label, key))
    }
}

impl<P, K, R, V> LazyKeyedView for EnumeratedCollectionView<P, K, R, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    type Key = K;
    type Value = V;

    fn keys(&self) -> Result<Vec<K>> {
        Ok(self.listing()?.entries.iter().map(|(k, _)| k.clone()).collect())
    }

    fn get(&self, key: &K) -> Result<V> {
        if let (None, Some(fetcher)) = (self.listing.get(), &self.fetcher) {
            let raw = fetcher(&self.parent, key)?;
            return match (self.key_of)(vec![raw])?.pop() {
                Some((fetched, raw)) if fetched == *key => (self.value_of)(&raw),
                Some((fetched, _)) => {
                    tracing::debug!("{}: {:?} resolved as {:?}", self.label, key, fetched);
                    Err(self.not_found(key))
                }
                None => Err(self.not_found(key)),
            };
        }
        let raw = self.listing()?.lookup(key).ok_or_else(|| self.not_found(key))?;
        (self.value_of)(raw)
    }
}

impl<P: fmt::Debug, K, R, V> fmt::Debug for EnumeratedCollectionView<P, K, R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumeratedCollectionView")
            .field("label", &self.label)
            .field("parent", &self.parent)
            .field("materialized", &self.listing.get().is_some())
            .finish_non_exhaustive()
    }
}
