use std::collections::BTreeMap;
use std::fmt;
use log::debug;
use serde::Serialize;
use crate::config::Settings;
use crate::types::{Metric, Prefix, INFINITY_METRIC};
use crate::RouterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteSource {
    Direct,   // Network served by one of the router's own interfaces
    Learned,  // Advertised by a neighbor
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NextHop {
    Direct,
    Neighbor(String),
}

impl NextHop {
    pub fn is(&self, address: &str) -> bool {
        matches!(self, NextHop::Neighbor(a) if a == address)
    }
}

impl fmt::Display for NextHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextHop::Direct => f.write_str("::"),
            NextHop::Neighbor(address) => f.write_str(address),
        }
    }
}

/// Invalid/flush timer state of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteTimer {
    /// Directly connected: never expires.
    Permanent,
    /// Usable; becomes invalid when the countdown reaches zero.
    Active { invalid_countdown: u32 },
    /// Advertised with metric 16; removed when the countdown reaches zero.
    Invalid { flush_countdown: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTransition {
    Invalidated,
    Flushed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEntry {
    pub prefix: Prefix,
    pub next_hop: NextHop,
    pub metric: Metric,
    pub via_interface: String,
    pub source: RouteSource,
    pub source_router_id: RouterId,
    timer: RouteTimer,
}

impl RouteEntry {
    pub fn direct(prefix: Prefix, interface: &str, router_id: &str) -> Self {
        Self {
            prefix,
            next_hop: NextHop::Direct,
            metric: 1,
            via_interface: interface.to_string(),
            source: RouteSource::Direct,
            source_router_id: router_id.to_string(),
            timer: RouteTimer::Permanent,
        }
    }

    pub fn learned(
        prefix: Prefix,
        from: &str,
        metric: Metric,
        interface: &str,
        source_router_id: &str,
        settings: &Settings,
    ) -> Self {
        Self {
            prefix,
            next_hop: NextHop::Neighbor(from.to_string()),
            metric: metric.clamp(1, INFINITY_METRIC),
            via_interface: interface.to_string(),
            source: RouteSource::Learned,
            source_router_id: source_router_id.to_string(),
            timer: RouteTimer::Active {
                invalid_countdown: settings.invalid_timeout,
            },
        }
    }

    pub fn is_directly_connected(&self) -> bool {
        self.source == RouteSource::Direct
    }

    pub fn marked_for_deletion(&self) -> bool {
        matches!(self.timer, RouteTimer::Invalid { .. })
    }

    pub fn timer(&self) -> RouteTimer {
        self.timer
    }

    /// Seconds left before invalidation; `None` when the timer is not running.
    pub fn invalid_countdown(&self) -> Option<u32> {
        match self.timer {
            RouteTimer::Active { invalid_countdown } => Some(invalid_countdown),
            _ => None,
        }
    }

    /// Seconds left before the entry is flushed; `None` when not invalid.
    pub fn flush_countdown(&self) -> Option<u32> {
        match self.timer {
            RouteTimer::Invalid { flush_countdown } => Some(flush_countdown),
            _ => None,
        }
    }

    /// Whether this entry was learned from `neighbor` on `interface`.
    pub fn is_via(&self, neighbor: &str, interface: &str) -> bool {
        self.next_hop.is(neighbor) && self.via_interface == interface
    }

    /// Advance the entry's timers by one second.
    pub fn tick_second(&mut self, settings: &Settings) -> Option<TimerTransition> {
        match self.timer {
            RouteTimer::Permanent => None,
            RouteTimer::Active { invalid_countdown } => {
                let remaining = invalid_countdown.saturating_sub(1);
                if remaining == 0 {
                    self.invalidate(settings);
                    Some(TimerTransition::Invalidated)
                } else {
                    self.timer = RouteTimer::Active { invalid_countdown: remaining };
                    None
                }
            }
            RouteTimer::Invalid { flush_countdown } => {
                let remaining = flush_countdown.saturating_sub(1);
                self.timer = RouteTimer::Invalid { flush_countdown: remaining };
                if remaining == 0 {
                    Some(TimerTransition::Flushed)
                } else {
                    None
                }
            }
        }
    }

    /// Install `new_metric` and restart the invalid timer. Refreshing an
    /// unchanged route goes through here too.
    pub fn reset_timers(&mut self, new_metric: Metric, settings: &Settings) {
        if self.is_directly_connected() {
            return;
        }
        self.metric = new_metric.clamp(1, INFINITY_METRIC);
        self.timer = RouteTimer::Active {
            invalid_countdown: settings.invalid_timeout,
        };
    }

    /// Force the entry to metric 16 and start its flush timer.
    pub fn invalidate(&mut self, settings: &Settings) {
        if self.is_directly_connected() {
            return;
        }
        debug!("Invalidating route to {} via {}", self.prefix, self.next_hop);
        self.metric = INFINITY_METRIC;
        self.timer = RouteTimer::Invalid {
            flush_countdown: settings.flush_timeout,
        };
    }
}

/// One entry per prefix, iterated in prefix order.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    entries: BTreeMap<Prefix, RouteEntry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert `entry`, replacing whatever was stored for its prefix.
    pub fn insert(&mut self, entry: RouteEntry) -> Option<RouteEntry> {
        self.entries.insert(entry.prefix.clone(), entry)
    }

    pub fn remove(&mut self, prefix: &Prefix) -> Option<RouteEntry> {
        self.entries.remove(prefix)
    }

    pub fn get(&self, prefix: &Prefix) -> Option<&RouteEntry> {
        self.entries.get(prefix)
    }

    pub fn get_mut(&mut self, prefix: &Prefix) -> Option<&mut RouteEntry> {
        self.entries.get_mut(prefix)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RouteEntry> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn snapshot(&self) -> Vec<RouteEntry> {
        self.entries.values().cloned().collect()
    }
}
