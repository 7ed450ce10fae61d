use crate::error::{BlockchainError, Result};
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

/// Reduce a peer address to its network location.
///
/// `http://127.0.0.1:5001/get_chain` and `127.0.0.1:5001` both become
/// `127.0.0.1:5001`. Scheme, path, query, fragment and user info are dropped.
pub fn canonical_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let without_scheme = match trimmed.find("://") {
        Some(idx) => &trimmed[idx + 3..],
        None => trimmed,
    };
    let location = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let location = match location.rfind('@') {
        Some(idx) => &location[idx + 1..],
        None => location,
    };

    if location.is_empty() || location.starts_with(':') {
        return Err(BlockchainError::MalformedInput(format!(
            "Peer address has no host: {address:?}"
        )));
    }
    Ok(location.to_ascii_lowercase())
}

/// The set of known peers. Iteration order is sorted and carries no meaning.
pub struct Nodes {
    inner: RwLock<BTreeSet<String>>,
}

impl Default for Nodes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nodes {
    pub fn new() -> Nodes {
        Nodes {
            inner: RwLock::new(BTreeSet::new()),
        }
    }

    /// Canonicalize and insert; returns whether the peer was new
    pub fn add_node(&self, address: &str) -> Result<bool> {
        let addr = canonical_address(address)?;
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.insert(addr))
    }

    pub fn get_nodes(&self) -> BTreeSet<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn node_is_known(&self, address: &str) -> bool {
        match canonical_address(address) {
            Ok(addr) => self
                .inner
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(&addr),
            Err(_) => false,
        }
    }
}
