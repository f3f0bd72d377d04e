//! Deterministic load queue.
//!
//! Files are parsed off the main thread but registered strictly in the order
//! they were requested. Each request gets a [`Ticket`]; workers send
//! `(ticket, result)` back over a `flume` channel and [`LoadQueue::poll`]
//! registers completed tickets in ticket order. A finished later ticket waits
//! until every earlier one has completed.
//!
//! ```rust,ignore
//! let mut queue = LoadQueue::new();
//! let loader: Arc<dyn AssetLoader> = Arc::new(GltfLoader::new());
//! for (name, bytes) in files {
//!     queue.spawn(loader.clone(), name, bytes);
//! }
//! // once per frame
//! for report in queue.poll(&mut registry) { ... }
//! ```

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::assets::loader::{AssetLoader, ParsedAsset};
use crate::errors::{ForgeError, Result};
use crate::registry::{FileInfo, ModelId, Registry};

/// Position of a request in selection order.
pub type Ticket = u64;

/// A finished parse travelling back to the main thread.
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: Ticket,
    pub name: String,
    pub size_bytes: u64,
    pub result: Result<ParsedAsset>,
}

/// Result of registering one ticket.
#[derive(Debug)]
pub struct LoadReport {
    pub ticket: Ticket,
    pub name: String,
    pub result: Result<ModelId>,
}

/// Cloneable handle for delivering outcomes from any thread.
#[derive(Debug, Clone)]
pub struct LoadSender {
    tx: flume::Sender<LoadOutcome>,
}

impl LoadSender {
    pub fn send(&self, outcome: LoadOutcome) {
        if self.tx.send(outcome).is_err() {
            log::debug!("Load queue dropped before a parse finished");
        }
    }
}

#[derive(Debug)]
pub struct LoadQueue {
    tx: flume::Sender<LoadOutcome>,
    rx: flume::Receiver<LoadOutcome>,

    next_ticket: Ticket,
    next_to_register: Ticket,

    completed: BTreeMap<Ticket, LoadOutcome>,
}

impl Default for LoadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadQueue {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            tx,
            rx,
            next_ticket: 0,
            next_to_register: 0,
            completed: BTreeMap::new(),
        }
    }

    /// Reserves the next ticket. The caller must eventually deliver an outcome
    /// for it through [`sender`](Self::sender), or later tickets stall.
    pub fn reserve(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    #[must_use]
    pub fn sender(&self) -> LoadSender {
        LoadSender {
            tx: self.tx.clone(),
        }
    }

    /// Reserves a ticket and parses `bytes` on a new thread.
    ///
    /// A panicking loader is reported as a [`ForgeError::Load`] for its ticket.
    pub fn spawn(&mut self, loader: Arc<dyn AssetLoader>, name: String, bytes: Vec<u8>) -> Ticket {
        let ticket = self.reserve();
        let sender = self.sender();

        std::thread::spawn(move || {
            let result = std::panic::catch_unwind(AssertUnwindSafe(|| loader.parse(&bytes, &name)))
                .unwrap_or_else(|_| {
                    Err(ForgeError::Load {
                        name: name.clone(),
                        reason: "loader panicked".to_string(),
                    })
                });
            sender.send(LoadOutcome {
                ticket,
                size_bytes: bytes.len() as u64,
                name,
                result,
            });
        });

        ticket
    }

    /// Tickets handed out but not yet registered.
    #[must_use]
    pub fn pending(&self) -> usize {
        (self.next_ticket - self.next_to_register) as usize
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Collects finished parses and registers every ticket whose predecessors
    /// are done. Failed tickets are reported and skipped.
    pub fn poll(&mut self, registry: &mut Registry) -> Vec<LoadReport> {
        for outcome in self.rx.try_iter() {
            if outcome.ticket < self.next_to_register || outcome.ticket >= self.next_ticket {
                log::warn!("Ignoring outcome for unknown ticket {}", outcome.ticket);
                continue;
            }
            self.completed.insert(outcome.ticket, outcome);
        }

        let mut reports = Vec::new();
        while let Some(outcome) = self.completed.remove(&self.next_to_register) {
            self.next_to_register += 1;

            let result = match outcome.result {
                Ok(parsed) => {
                    let info = FileInfo::new(&outcome.name, outcome.size_bytes);
                    registry.add_model(parsed, info)
                }
                Err(err) => {
                    log::warn!("Failed to load '{}': {err}", outcome.name);
                    Err(err)
                }
            };

            reports.push(LoadReport {
                ticket: outcome.ticket,
                name: outcome.name,
                result,
            });
        }
        reports
    }
}
