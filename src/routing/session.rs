//! Sequenced route requests
//!
//! Interactive hosts re-request routes rapidly while a waypoint is dragged.
//! A [`RouteSession`] tags every request with a monotonically increasing
//! ticket and discards any completion that is no longer the latest, so a
//! stale computation can never overwrite a newer one. Adapting this to a
//! specific host's callback shape is the host adapter's job; the core
//! router itself stays synchronous and stateless.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use geo::Point;
use log::debug;

use super::router::{RouteResult, Router};
use crate::Error;

pub struct RouteSession {
    router: Arc<Router>,
    issued: AtomicU64,
}

impl RouteSession {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            issued: AtomicU64::new(0),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Issues a new request ticket, superseding all earlier ones.
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `ticket` is still the latest issued request.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket
    }

    /// Computes the route for an issued ticket; returns `None` when a newer
    /// request was issued in the meantime and this completion is stale.
    pub fn route(
        &self,
        ticket: u64,
        waypoints: &[Point<f64>],
    ) -> Option<Result<RouteResult, Error>> {
        let result = self.router.route(waypoints);
        if self.is_current(ticket) {
            Some(result)
        } else {
            debug!("Discarding stale route completion for ticket {ticket}");
            None
        }
    }

    /// Convenience wrapper: issue a ticket and compute in one call.
    pub fn route_latest(&self, waypoints: &[Point<f64>]) -> Option<Result<RouteResult, Error>> {
        let ticket = self.begin();
        self.route(ticket, waypoints)
    }
}
