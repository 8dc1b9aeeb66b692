//! Request tickets for latest-only async results.
//!
//! Every tracked request takes a ticket for its key. A response is applied
//! only while its ticket is still the latest one for that key; anything
//! superseded or cancelled is dropped.

use std::collections::HashMap;

use board_types::{CommentId, PostId};

/// What a tracked request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKey {
    /// Like toggle on a post
    Like(PostId),
    /// Content edit of a post
    EditPost(PostId),
    /// Text edit of a comment
    EditComment(CommentId),
    /// Detail view of the open post (post + comments)
    OpenPost,
}

/// Opaque ticket matching an async result to the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    key: RequestKey,
    id: u64,
}

/// Tracks the latest active request per key and ignores stale results.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next: u64,
    active: HashMap<RequestKey, u64>,
}

impl RequestTracker {
    /// Start a new request for `key`, superseding any earlier one.
    pub fn begin(&mut self, key: RequestKey) -> Ticket {
        let id = self.next;
        self.next += 1;
        self.active.insert(key, id);
        Ticket { key, id }
    }

    /// Cancel the active request for `key`, if any.
    pub fn cancel(&mut self, key: RequestKey) {
        self.active.remove(&key);
    }

    /// Returns true if `ticket` is still the active request for its key.
    pub fn is_active(&self, ticket: Ticket) -> bool {
        self.active.get(&ticket.key) == Some(&ticket.id)
    }

    /// Finish the request if it's still active.
    pub fn finish_if_active(&mut self, ticket: Ticket) -> bool {
        if self.is_active(ticket) {
            self.active.remove(&ticket.key);
            true
        } else {
            false
        }
    }
}
