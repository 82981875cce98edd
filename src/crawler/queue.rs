//! Dispatch queue shared by the worker pool
//!
//! A multi-producer, multi-consumer FIFO of fetched pages with join
//! semantics: every pushed page must be matched by one `task_done` call once
//! its expansion has finished, and `join` resolves when nothing is left.

use crate::page::Page;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{mpsc, Mutex, Notify};

/// Queue of fetched pages waiting for expansion
#[derive(Debug)]
pub struct DispatchQueue {
    sender: mpsc::UnboundedSender<Page>,
    receiver: Mutex<mpsc::UnboundedReceiver<Page>>,

    /// Maximum number of pages sitting in the queue, if bounded
    capacity: Option<usize>,

    /// Pages currently sitting in the queue
    queued: AtomicUsize,

    /// Pages pushed but not yet marked done
    pending: AtomicUsize,

    drained: Notify,
}

impl DispatchQueue {
    /// Creates a queue; `None` means unbounded
    pub fn new(capacity: Option<usize>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            capacity,
            queued: AtomicUsize::new(0),
            pending: AtomicUsize::new(0),
            drained: Notify::new(),
        }
    }

    /// Pushes a page without waiting
    ///
    /// A bounded queue that is full hands the page back; the caller is
    /// expected to expand it itself.
    pub fn try_push(&self, page: Page) -> Result<(), Page> {
        if !self.reserve_slot() {
            return Err(page);
        }

        self.pending.fetch_add(1, Ordering::SeqCst);
        if let Err(mpsc::error::SendError(page)) = self.sender.send(page) {
            // The receiver lives as long as the sender, so this is unreachable
            self.queued.fetch_sub(1, Ordering::SeqCst);
            self.complete_one();
            return Err(page);
        }
        Ok(())
    }

    /// Takes the oldest page, waiting while the queue is empty
    ///
    /// Cancel safe: dropping the future never loses a page.
    pub async fn pop(&self) -> Option<Page> {
        let page = self.receiver.lock().await.recv().await?;
        self.queued.fetch_sub(1, Ordering::SeqCst);
        Some(page)
    }

    /// Marks one popped page as fully expanded
    pub fn task_done(&self) {
        self.complete_one();
    }

    /// Waits until every pushed page has been marked done
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Pages pushed but not yet marked done
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Pages waiting to be popped
    pub fn len(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn reserve_slot(&self) -> bool {
        match self.capacity {
            None => {
                self.queued.fetch_add(1, Ordering::SeqCst);
                true
            }
            Some(capacity) => self
                .queued
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    (n < capacity).then_some(n + 1)
                })
                .is_ok(),
        }
    }

    fn complete_one(&self) {
        let previous = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match previous {
            Ok(1) => self.drained.notify_waiters(),
            Ok(_) => {}
            Err(_) => tracing::warn!("task_done called more times than pages were pushed"),
        }
    }
}
