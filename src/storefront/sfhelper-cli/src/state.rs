//! Per-screen view state and request tickets.

/// Sequence number attached to every outgoing request.
///
/// Tickets are issued in increasing order by a single `Fetcher`, so a
/// response carries the ticket of the request that produced it and a
/// screen only accepts the ticket it is currently waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a screen's single logical request:
/// `Idle → Loading → {Loaded | Empty | Failed}`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The request succeeded but returned no record.
    Empty,
    /// The request failed; holds a one-line reason.
    Failed(String),
}

impl Status {
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading)
    }
}

/// `{status, data}` record owned by a single screen.
#[derive(Debug, Default)]
pub struct ScreenState<T> {
    status: Status,
    data: T,
    pending: Option<Ticket>,
}

impl<T: Default> ScreenState<T> {
    /// Enter `Loading` for `ticket`, discarding any previous result.
    pub fn begin(&mut self, ticket: Ticket) {
        self.status = Status::Loading;
        self.data = T::default();
        self.pending = Some(ticket);
    }

    /// Store a result if `ticket` is the one being waited for.
    ///
    /// Returns false (and changes nothing) for stale tickets, including
    /// a second response for a ticket that already settled.
    pub fn settle(&mut self, ticket: Ticket, status: Status, data: T) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        self.status = status;
        self.data = data;
        true
    }
}

impl<T> ScreenState<T> {
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<Ticket> {
        self.pending
    }
}
