//! Background fetching for the TUI.
//!
//! Each request runs on its own short-lived thread using the blocking
//! catalog client and reports back over a channel, so the event loop keeps
//! drawing while a slow response is in flight. Responses are tagged with
//! the [`Ticket`] handed out when the request was issued.

use crate::state::Ticket;
use sfhelper_catalog::{
    CatalogSource, FetchError, ListQuery, ProductDetail, ProductPage, fetch_product_detail,
    fetch_product_list,
};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::debug;

#[derive(Clone, Debug)]
pub enum FetchRequest {
    List(ListQuery),
    Detail { id: String },
}

impl FetchRequest {
    fn run(&self, source: &CatalogSource) -> FetchOutcome {
        match self {
            FetchRequest::List(query) => FetchOutcome::List(fetch_product_list(source, query)),
            FetchRequest::Detail { id } => FetchOutcome::Detail(fetch_product_detail(source, id)),
        }
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    List(Result<ProductPage, FetchError>),
    Detail(Result<ProductDetail, FetchError>),
}

#[derive(Debug)]
pub struct FetchResponse {
    pub ticket: Ticket,
    pub outcome: FetchOutcome,
}

pub struct Fetcher {
    source: Arc<CatalogSource>,
    last_ticket: u64,
    tx: Sender<FetchResponse>,
    rx: Receiver<FetchResponse>,
}

impl Fetcher {
    pub fn new(source: CatalogSource) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source: Arc::new(source),
            last_ticket: 0,
            tx,
            rx,
        }
    }

    /// Start `request` in the background and return its ticket.
    pub fn request(&mut self, request: FetchRequest) -> Ticket {
        self.last_ticket += 1;
        let ticket = Ticket(self.last_ticket);
        debug!(%ticket, ?request, "issuing request");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let outcome = request.run(&source);
            // The receiver is gone once the app has exited; nothing to do.
            let _ = tx.send(FetchResponse { ticket, outcome });
        });

        ticket
    }

    /// Next finished response, if any. Never blocks.
    pub fn try_recv(&self) -> Option<FetchResponse> {
        self.rx.try_recv().ok()
    }
}
