//! Latest-request-wins ordering for lookups fired from user input.
//!
//! A search box can start a second lookup before the first one answers. Each
//! lookup takes a [`Ticket`]; a completion is only delivered when its ticket is
//! still the newest one issued by the same [`RequestSequencer`].

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next ticket. Every ticket issued before it becomes stale.
    pub fn issue(&self) -> Ticket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { id, latest: Arc::clone(&self.latest) }
    }

    /// Take a ticket now and await `fut` under it. The returned future yields
    /// `None` when a newer ticket was issued before `fut` completed.
    ///
    /// The ticket is taken when `run` is called, not when the future is first
    /// polled, so ordering follows the order requests were made.
    pub fn run<F: Future>(&self, fut: F) -> impl Future<Output = Option<F::Output>> + use<F> {
        let ticket = self.issue();
        async move {
            let output = fut.await;
            ticket.is_latest().then_some(output)
        }
    }
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_latest(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }
}
