//! Job search pager: accumulates "load more" pages of one query.
//!
//! A fetch is split into `plan` (decide the effective page, invalidate older
//! fetches) and `apply` (merge the response), so callers can run the network
//! call without holding a lock on the pager. Results on screen are only
//! replaced when a fresh query's first page actually lands.

use tracing::{debug, info, warn};

use crate::models::job::JobListing;
use crate::models::search::{SearchPage, SearchParams};

/// Accumulated state of one query.
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub params: SearchParams,
    pub results: Vec<JobListing>,
    /// Provider-reported total. Can exceed what will ever be accumulated.
    pub total: u64,
    /// Listings the provider suppressed on the latest page. Informational.
    pub filtered_out: u64,
    pub page: u32,
    generation: u64,
}

impl SearchSession {
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.results.len() as u64)
    }

    pub fn has_more(&self) -> bool {
        self.remaining() > 0
    }
}

/// A fetch the pager has agreed to merge, if it is still current on return.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub params: SearchParams,
    pub page: u32,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct JobSearchPager {
    session: Option<SearchSession>,
    generation: u64,
}

impl JobSearchPager {
    pub fn session(&self) -> Option<&SearchSession> {
        self.session.as_ref()
    }

    /// The session, unless a fresh query has been planned since it was built.
    fn current(&self) -> Option<&SearchSession> {
        self.session
            .as_ref()
            .filter(|session| session.generation == self.generation)
    }

    /// Decides what to fetch for `(params, page)`.
    ///
    /// Page 1 starts a new query: any fetch still in flight becomes stale,
    /// but the previous results stay visible until the new page arrives. A
    /// later page is only valid for the params that produced page 1; anything
    /// else is a caller error and is downgraded to a fresh page-1 query.
    pub fn plan(&mut self, params: SearchParams, page: u32) -> PageRequest {
        let mut page = page.max(1);

        if page > 1 {
            let continues = self
                .current()
                .is_some_and(|session| session.params == params);
            if !continues {
                warn!(
                    "Search page {page} requested for params that did not produce page 1; \
                     starting a fresh query instead"
                );
                page = 1;
            }
        }

        if page == 1 {
            self.generation += 1;
        }

        PageRequest {
            params,
            page,
            generation: self.generation,
        }
    }

    /// Plans the page after the current one, if the provider reports more.
    pub fn plan_next(&mut self) -> Option<PageRequest> {
        let session = self.current()?;
        if !session.has_more() {
            return None;
        }
        let params = session.params.clone();
        let next = session.page + 1;
        Some(self.plan(params, next))
    }

    /// Merges a response. Returns `false` when the request was superseded by a
    /// newer query, in which case nothing changes.
    pub fn apply(&mut self, request: PageRequest, response: SearchPage) -> bool {
        if request.generation != self.generation {
            debug!(
                "Dropping stale search page {} for {:?}",
                request.page, request.params.keywords
            );
            return false;
        }

        let SearchPage {
            results,
            total,
            filtered_out,
        } = response;
        let fetched = results.len();

        match self.session.as_mut() {
            Some(session) if request.page > 1 => {
                session.results.extend(results);
                session.total = total;
                session.filtered_out = filtered_out;
                session.page = request.page;
            }
            _ => {
                self.session = Some(SearchSession {
                    params: request.params,
                    results,
                    total,
                    filtered_out,
                    page: 1,
                    generation: request.generation,
                });
            }
        }

        if let Some(session) = &self.session {
            info!(
                "Search page {}: {} results ({} accumulated, {} remaining, {} filtered)",
                session.page,
                fetched,
                session.results.len(),
                session.remaining(),
                session.filtered_out
            );
        }
        true
    }

    /// Gives up on a failed fetch. When it was a fresh query, the previous
    /// results become current again so "load more" keeps working on them.
    pub fn abandon(&mut self, request: &PageRequest) {
        if request.generation != self.generation {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            debug!(
                "Search page {} failed, keeping {} results",
                request.page,
                session.results.len()
            );
            session.generation = self.generation;
        }
    }
}
