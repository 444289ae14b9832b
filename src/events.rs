//! Engine events.
//!
//! Routers and the driver record what they did as typed events; the
//! simulation renders them into the human-readable event log.

use std::fmt;
use crate::network::LinkStatus;
use crate::routing_table::NextHop;
use crate::types::{Metric, Prefix};
use crate::{LinkId, RouterId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationCause {
    Timeout,
    Poisoned { by: String },
    LinkDown { interface: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SimulationInitialized { routers: usize, links: usize, seed: u64 },
    SettingsUpdated,
    LinkToggled { link: LinkId, status: LinkStatus },
    UnknownLink { link: LinkId },
    UpdateSent { router: RouterId, triggered: bool },
    UpdateReceived { router: RouterId, from: String, interface: String, entries: usize },
    RouteLearned { router: RouterId, prefix: Prefix, from: String, interface: String, metric: Metric },
    RouteRefreshed { router: RouterId, prefix: Prefix, from: String, metric: Metric },
    RouteChanged { router: RouterId, prefix: Prefix, from: String, interface: String, metric: Metric },
    RouteInvalidated { router: RouterId, prefix: Prefix, next_hop: NextHop, cause: InvalidationCause },
    RouteFlushed { router: RouterId, prefix: Prefix, next_hop: NextHop },
    DirectRouteAdded { router: RouterId, prefix: Prefix, interface: String },
    DirectRouteRemoved { router: RouterId, prefix: Prefix, interface: String },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::SimulationInitialized { routers, links, seed } => {
                write!(f, "Simulation initialized: {} routers, {} links (seed {}).", routers, links, seed)
            }
            Event::SettingsUpdated => write!(f, "Settings updated."),
            Event::LinkToggled { link, status } => write!(f, "Link {} set {}.", link, status),
            Event::UnknownLink { link } => write!(f, "ERROR: unknown link {}.", link),
            Event::UpdateSent { router, triggered } => write!(
                f,
                "{} sending {} update.",
                router,
                if *triggered { "TRIGGERED" } else { "REGULAR" }
            ),
            Event::UpdateReceived { router, from, interface, entries } => write!(
                f,
                "{}: received update from {} on {} with {} entries.",
                router, from, interface, entries
            ),
            Event::RouteLearned { router, prefix, from, interface, metric } => write!(
                f,
                "{}: new route {} learned from {} (int {}), metric {}.",
                router, prefix, from, interface, metric
            ),
            Event::RouteRefreshed { router, prefix, from, metric } => write!(
                f,
                "{}: route {} via {} refreshed, metric {}.",
                router, prefix, from, metric
            ),
            Event::RouteChanged { router, prefix, from, interface, metric } => write!(
                f,
                "{}: route {} switched to {} (int {}), metric {}.",
                router, prefix, from, interface, metric
            ),
            Event::RouteInvalidated { router, prefix, next_hop, cause } => match cause {
                InvalidationCause::Timeout => write!(
                    f,
                    "{}: route {} via {} marked invalid (timeout), metric 16.",
                    router, prefix, next_hop
                ),
                InvalidationCause::Poisoned { by } => {
                    write!(f, "{}: route {} poisoned by {}.", router, prefix, by)
                }
                InvalidationCause::LinkDown { interface } => write!(
                    f,
                    "{}: route {} via {} (int {}) invalidated by link failure.",
                    router, prefix, next_hop, interface
                ),
            },
            Event::RouteFlushed { router, prefix, next_hop } => write!(
                f,
                "{}: route {} via {} removed (flush timeout).",
                router, prefix, next_hop
            ),
            Event::DirectRouteAdded { router, prefix, interface } => write!(
                f,
                "{}: direct route {} on {} added (link up).",
                router, prefix, interface
            ),
            Event::DirectRouteRemoved { router, prefix, interface } => write!(
                f,
                "{}: direct route {} on {} removed (link down).",
                router, prefix, interface
            ),
        }
    }
}
