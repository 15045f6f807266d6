//! Index page state for one page visit.
//!
//! Mounting a page fires exactly one fetch. The result is applied only while
//! the page is still mounted; unmounting (or dropping) the page advances its
//! generation and aborts the fetch, so late results are discarded.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use metrics::{counter, histogram};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{Instrument, Span, debug, error, info};

use crate::application::loader::PostSource;
use crate::domain::posts::{self, CategoryFilter, Post};

/// Observable state of the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub posts: Vec<Post>,
    pub loading: bool,
    pub selection: CategoryFilter,
}

impl PageState {
    fn mounting(selection: CategoryFilter) -> Self {
        Self {
            posts: Vec::new(),
            loading: true,
            selection,
        }
    }

    pub fn categories(&self) -> Vec<String> {
        posts::categories(&self.posts)
    }

    pub fn visible_posts(&self) -> Vec<&Post> {
        posts::filter_posts(&self.posts, &self.selection)
    }
}

pub struct IndexPage {
    state: Arc<watch::Sender<PageState>>,
    lifetime: Arc<AtomicU64>,
    fetch: Option<JoinHandle<()>>,
}

impl IndexPage {
    /// Mount the page with no category selected.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(source: Arc<dyn PostSource>) -> Self {
        Self::mount_with_selection(source, CategoryFilter::All)
    }

    /// Mount the page with an initial selection, e.g. one given on the command line.
    pub fn mount_with_selection(source: Arc<dyn PostSource>, selection: CategoryFilter) -> Self {
        Self::mount_in_span(source, selection, Span::current())
    }

    /// Mount the page with its fetch task running inside `span`, so the
    /// loader's logs carry the fields of the visit that started it.
    pub fn mount_in_span(
        source: Arc<dyn PostSource>,
        selection: CategoryFilter,
        span: Span,
    ) -> Self {
        let (sender, _) = watch::channel(PageState::mounting(selection));
        let state = Arc::new(sender);
        let lifetime = Arc::new(AtomicU64::new(0));

        let fetch = tokio::spawn(
            load_posts(
                source,
                state.clone(),
                lifetime.clone(),
                lifetime.load(Ordering::Acquire),
            )
            .instrument(span),
        );

        Self {
            state,
            lifetime,
            fetch: Some(fetch),
        }
    }

    pub fn snapshot(&self) -> PageState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_mounted(&self) -> bool {
        self.fetch.is_some()
    }

    /// Receiver that observes every state change, for re-rendering.
    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.state.subscribe()
    }

    /// Wait until loading has ended and return the resulting state.
    ///
    /// Returns the current state right away if the page is already unmounted.
    pub async fn loaded(&self) -> PageState {
        if !self.is_mounted() {
            return self.snapshot();
        }

        let mut receiver = self.state.subscribe();
        match receiver.wait_for(|page| !page.loading).await {
            Ok(page) => page.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Change the active category. Explicit user action only.
    pub fn select(&self, selection: CategoryFilter) {
        self.state.send_if_modified(|page| {
            if page.selection == selection {
                return false;
            }
            page.selection = selection;
            true
        });
    }

    /// Tear the page down; a fetch still in flight will not touch its state.
    pub fn unmount(&mut self) {
        let Some(fetch) = self.fetch.take() else {
            return;
        };
        self.lifetime.fetch_add(1, Ordering::AcqRel);
        if !fetch.is_finished() {
            debug!(target = "postboard::page", "unmounting page with fetch in flight");
        }
        fetch.abort();
    }
}

impl Drop for IndexPage {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Clears `loading` if the fetch task ends without reporting, e.g. when the
/// source panics. Unmounted generations are left alone.
struct LoadingGuard {
    state: Arc<watch::Sender<PageState>>,
    lifetime: Arc<AtomicU64>,
    generation: u64,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.state.send_if_modified(|page| {
            if !page.loading || self.lifetime.load(Ordering::Acquire) != self.generation {
                return false;
            }
            error!(
                target = "postboard::loader",
                "fetch task ended without a result"
            );
            page.loading = false;
            true
        });
    }
}

async fn load_posts(
    source: Arc<dyn PostSource>,
    state: Arc<watch::Sender<PageState>>,
    lifetime: Arc<AtomicU64>,
    generation: u64,
) {
    let _guard = LoadingGuard {
        state: state.clone(),
        lifetime: lifetime.clone(),
        generation,
    };
    let started = Instant::now();
    let result = source.fetch_posts().await;
    histogram!("postboard_fetch_ms").record(started.elapsed().as_secs_f64() * 1000.0);
    counter!("postboard_fetch_total").increment(1);

    if let Err(err) = &result {
        counter!("postboard_fetch_failures_total").increment(1);
        error!(target = "postboard::loader", error = %err, "failed to fetch posts");
    }

    state.send_if_modified(|page| {
        if lifetime.load(Ordering::Acquire) != generation {
            counter!("postboard_fetch_discarded_total").increment(1);
            debug!(
                target = "postboard::loader",
                "discarding posts for an unmounted page"
            );
            return false;
        }

        if let Ok(posts) = result {
            info!(
                target = "postboard::loader",
                count = posts.len(),
                "posts loaded"
            );
            page.posts = posts;
        }
        page.loading = false;
        true
    });
}
