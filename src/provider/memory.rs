//! In-memory provider for tests and local experiments.
//!
//! Serves a fixed set of listing pages and records every delete request, so
//! tests can assert both on pagination behavior and on exactly which groups
//! were (or were not) terminated.

use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use super::{
    GroupDescription, GroupLister, GroupPage, GroupTerminator, ProviderError, ProviderResult,
};

pub struct InMemoryProvider {
    pages: Vec<Vec<GroupDescription>>,
    /// Page index at which listing fails, if any.
    fail_listing_at: Option<usize>,
    /// Group names whose deletion fails.
    failing_deletes: HashSet<String>,
    deleted: Mutex<Vec<String>>,
    pages_fetched: AtomicUsize,
}

impl InMemoryProvider {
    /// A provider serving the given listing pages.
    pub fn new(pages: Vec<Vec<GroupDescription>>) -> Self {
        Self {
            pages,
            fail_listing_at: None,
            failing_deletes: HashSet::new(),
            deleted: Mutex::new(Vec::new()),
            pages_fetched: AtomicUsize::new(0),
        }
    }

    /// A provider serving all groups in a single page.
    pub fn single_page(groups: Vec<GroupDescription>) -> Self {
        Self::new(vec![groups])
    }

    /// Fail the listing when the given page index is requested.
    pub fn fail_listing_at(mut self, page: usize) -> Self {
        self.fail_listing_at = Some(page);
        self
    }

    /// Fail deletion of the given group name.
    pub fn fail_delete(mut self, name: impl Into<String>) -> Self {
        self.failing_deletes.insert(name.into());
        self
    }

    /// Names deleted so far, in request order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("deleted lock poisoned").clone()
    }

    /// Number of listing pages served so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GroupLister for InMemoryProvider {
    async fn list_page(&self, next_token: Option<String>) -> ProviderResult<GroupPage> {
        let index = match next_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ProviderError::List(format!("invalid page token '{token}'")))?,
        };

        if self.fail_listing_at == Some(index) {
            return Err(ProviderError::List("listing unavailable".to_string()));
        }

        self.pages_fetched.fetch_add(1, Ordering::SeqCst);

        let groups = self.pages.get(index).cloned().unwrap_or_default();
        let next_token = if index + 1 < self.pages.len() {
            Some((index + 1).to_string())
        } else {
            None
        };

        Ok(GroupPage { groups, next_token })
    }
}

#[async_trait]
impl GroupTerminator for InMemoryProvider {
    async fn force_delete(&self, name: &str) -> ProviderResult<()> {
        if self.failing_deletes.contains(name) {
            return Err(ProviderError::Delete {
                name: name.to_string(),
                message: "scaling activity in progress".to_string(),
            });
        }
        self.deleted
            .lock()
            .expect("deleted lock poisoned")
            .push(name.to_string());
        Ok(())
    }
}
