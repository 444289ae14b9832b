use std::collections::HashSet;
use log::{debug, info, warn};

use crate::config::{DirectPoisonPolicy, RouterSpec, Settings};
use crate::events::{Event, InvalidationCause};
use crate::messages::{RouteAdvertisement, UpdatePacket, UpdateRequest};
use crate::network::{LinkStatus, NetworkInterface, Topology};
use crate::routing_table::{NextHop, RouteEntry, RoutingTable, TimerTransition};
use crate::types::{next_hop_metric, Prefix, INFINITY_METRIC};
use crate::RouterId;

pub struct Router {
    pub id: RouterId,
    pub name: String,
    interfaces: Vec<NetworkInterface>,
    routing_table: RoutingTable,
    update_countdown: u32,
    pending_triggered_update: bool,
    // Own networks lost in the latest link event, announced with metric 16.
    poisoned_direct_prefixes: Vec<Prefix>,
    events: Vec<Event>,
}

impl Router {
    /// Build a router from its description. Interfaces start with the status
    /// of their link in `topology`; `update_countdown` is the number of
    /// seconds before the first periodic update.
    pub fn new(spec: &RouterSpec, topology: &Topology, update_countdown: u32) -> Self {
        let interfaces = spec
            .interfaces
            .iter()
            .map(|iface| {
                let status = match topology.link(&iface.link_id) {
                    Some(link) if link.has_endpoint(&spec.id, &iface.name) => link.status,
                    _ => {
                        warn!("{}: interface {} is not attached to link {}", spec.id, iface.name, iface.link_id);
                        LinkStatus::Down
                    }
                };
                NetworkInterface::new(&spec.id, iface, status)
            })
            .collect();

        let mut router = Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            interfaces,
            routing_table: RoutingTable::new(),
            update_countdown: update_countdown.max(1),
            pending_triggered_update: false,
            poisoned_direct_prefixes: Vec::new(),
            events: Vec::new(),
        };
        router.install_direct_routes();
        router
    }

    fn install_direct_routes(&mut self) {
        for iface in &self.interfaces {
            if iface.is_usable() && self.routing_table.get(&iface.network_prefix).is_none() {
                self.routing_table
                    .insert(RouteEntry::direct(iface.network_prefix.clone(), &iface.name, &self.id));
            }
        }
    }

    pub fn interfaces(&self) -> &[NetworkInterface] {
        &self.interfaces
    }

    pub fn interface(&self, name: &str) -> Option<&NetworkInterface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn is_interface_usable(&self, name: &str) -> bool {
        self.interface(name).is_some_and(NetworkInterface::is_usable)
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn route(&self, prefix: &Prefix) -> Option<&RouteEntry> {
        self.routing_table.get(prefix)
    }

    pub fn update_countdown(&self) -> u32 {
        self.update_countdown
    }

    pub fn pending_triggered_update(&self) -> bool {
        self.pending_triggered_update
    }

    pub fn poisoned_direct_prefixes(&self) -> &[Prefix] {
        &self.poisoned_direct_prefixes
    }

    /// Take the events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Run one second of route timers and the update timer. Returns a request
    /// when an update is due.
    pub fn advance_one_second(&mut self, settings: &Settings) -> Option<UpdateRequest> {
        let mut flushed = Vec::new();

        for entry in self.routing_table.iter_mut() {
            match entry.tick_second(settings) {
                Some(TimerTransition::Invalidated) => {
                    info!("{}: route {} via {} timed out", self.id, entry.prefix, entry.next_hop);
                    self.events.push(Event::RouteInvalidated {
                        router: self.id.clone(),
                        prefix: entry.prefix.clone(),
                        next_hop: entry.next_hop.clone(),
                        cause: InvalidationCause::Timeout,
                    });
                    self.pending_triggered_update = true;
                }
                Some(TimerTransition::Flushed) => flushed.push(entry.prefix.clone()),
                None => {}
            }
        }

        for prefix in flushed {
            if let Some(entry) = self.routing_table.remove(&prefix) {
                info!("{}: route {} via {} flushed", self.id, entry.prefix, entry.next_hop);
                self.events.push(Event::RouteFlushed {
                    router: self.id.clone(),
                    prefix: entry.prefix,
                    next_hop: entry.next_hop,
                });
                self.pending_triggered_update = true;
            }
        }

        self.update_countdown = self.update_countdown.saturating_sub(1);
        let triggered = self.pending_triggered_update && settings.triggered_updates;
        if self.update_countdown == 0 || triggered {
            debug!(
                "{}: update due (timer expired: {}, triggered: {})",
                self.id,
                self.update_countdown == 0,
                triggered
            );
            self.update_countdown = settings.update_period;
            self.pending_triggered_update = false;
            return Some(UpdateRequest {
                router_id: self.id.clone(),
                triggered,
            });
        }

        None
    }

    /// Routes to advertise on `interface_name`. Does not change the router.
    pub fn build_update_packet(&self, interface_name: &str, settings: &Settings) -> UpdatePacket {
        let mut packet = Vec::new();
        if !self.is_interface_usable(interface_name) {
            debug!("{}: interface {} is down, no update built", self.id, interface_name);
            return packet;
        }

        let mut advertised = HashSet::new();

        for prefix in &self.poisoned_direct_prefixes {
            packet.push(RouteAdvertisement {
                prefix: prefix.clone(),
                metric: INFINITY_METRIC,
                source_router_id: self.id.clone(),
            });
            advertised.insert(prefix);
        }

        for entry in self.routing_table.iter() {
            if advertised.contains(&entry.prefix) {
                continue;
            }

            let mut metric = entry.metric;
            if settings.split_horizon && !entry.is_directly_connected() && entry.via_interface == interface_name {
                if settings.poison_reverse {
                    metric = INFINITY_METRIC;
                } else {
                    continue;
                }
            }

            packet.push(RouteAdvertisement {
                prefix: entry.prefix.clone(),
                metric,
                source_router_id: self.id.clone(),
            });
            advertised.insert(&entry.prefix);
        }

        debug!("{}: built update for {} with {} entries", self.id, interface_name, packet.len());
        packet
    }

    /// Called once every packet of a serviced update has been built.
    pub fn complete_update(&mut self, settings: &Settings) {
        if settings.direct_poison == DirectPoisonPolicy::OneShot {
            self.poisoned_direct_prefixes.clear();
        }
    }

    /// Apply an update received from `from` (the neighbor's link-local
    /// address) on `on_interface`.
    pub fn ingest_update(
        &mut self,
        packet: &[RouteAdvertisement],
        from: &str,
        on_interface: &str,
        settings: &Settings,
    ) {
        let own_prefix = match self.interface(on_interface) {
            Some(iface) if iface.is_usable() => iface.network_prefix.clone(),
            _ => return,
        };

        self.events.push(Event::UpdateReceived {
            router: self.id.clone(),
            from: from.to_string(),
            interface: on_interface.to_string(),
            entries: packet.len(),
        });

        let mut table_changed = false;

        for adv in packet {
            if adv.prefix == own_prefix && adv.metric < INFINITY_METRIC {
                continue;
            }

            let candidate = next_hop_metric(adv.metric);

            match self.routing_table.get_mut(&adv.prefix) {
                None => {
                    if candidate < INFINITY_METRIC {
                        info!("{}: learned {} from {} metric {}", self.id, adv.prefix, from, candidate);
                        self.routing_table.insert(RouteEntry::learned(
                            adv.prefix.clone(),
                            from,
                            candidate,
                            on_interface,
                            &adv.source_router_id,
                            settings,
                        ));
                        self.events.push(Event::RouteLearned {
                            router: self.id.clone(),
                            prefix: adv.prefix.clone(),
                            from: from.to_string(),
                            interface: on_interface.to_string(),
                            metric: candidate,
                        });
                        table_changed = true;
                    }
                }
                Some(entry) if entry.is_directly_connected() => {}
                Some(entry) if entry.is_via(from, on_interface) => {
                    if candidate < INFINITY_METRIC {
                        if candidate <= entry.metric {
                            if candidate < entry.metric {
                                table_changed = true;
                            }
                            entry.reset_timers(candidate, settings);
                            self.events.push(Event::RouteRefreshed {
                                router: self.id.clone(),
                                prefix: adv.prefix.clone(),
                                from: from.to_string(),
                                metric: candidate,
                            });
                        }
                    } else if entry.metric < INFINITY_METRIC {
                        info!("{}: route {} poisoned by {}", self.id, adv.prefix, from);
                        entry.invalidate(settings);
                        self.events.push(Event::RouteInvalidated {
                            router: self.id.clone(),
                            prefix: adv.prefix.clone(),
                            next_hop: entry.next_hop.clone(),
                            cause: InvalidationCause::Poisoned { by: from.to_string() },
                        });
                        table_changed = true;
                    }
                }
                Some(entry) => {
                    if candidate < entry.metric {
                        info!(
                            "{}: route {} moves to {} (int {}) metric {} -> {}",
                            self.id, adv.prefix, from, on_interface, entry.metric, candidate
                        );
                        entry.next_hop = NextHop::Neighbor(from.to_string());
                        entry.via_interface = on_interface.to_string();
                        entry.source_router_id = adv.source_router_id.clone();
                        entry.reset_timers(candidate, settings);
                        self.events.push(Event::RouteChanged {
                            router: self.id.clone(),
                            prefix: adv.prefix.clone(),
                            from: from.to_string(),
                            interface: on_interface.to_string(),
                            metric: candidate,
                        });
                        table_changed = true;
                    }
                }
            }
        }

        if table_changed && settings.triggered_updates {
            self.pending_triggered_update = true;
        }
    }

    /// React to `link_id` changing to `status`. `neighbor` is the link-local
    /// address of the router on the other end, when known; learned routes
    /// through other next hops on the same interface are left alone.
    pub fn handle_link_change(
        &mut self,
        link_id: &str,
        status: LinkStatus,
        neighbor: Option<&str>,
        settings: &Settings,
    ) {
        let Some(index) = self.interfaces.iter().position(|i| i.link_id == link_id) else {
            warn!("{}: no interface on link {}", self.id, link_id);
            return;
        };

        self.poisoned_direct_prefixes.clear();
        self.interfaces[index].set_link_status(status);
        let interface = self.interfaces[index].name.clone();
        let prefix = self.interfaces[index].network_prefix.clone();

        match status {
            LinkStatus::Down => {
                let mut changed = false;

                let direct_here = self
                    .routing_table
                    .get(&prefix)
                    .is_some_and(|r| r.is_directly_connected() && r.via_interface == interface);
                if direct_here {
                    self.routing_table.remove(&prefix);
                    info!("{}: direct route {} on {} removed", self.id, prefix, interface);
                    self.events.push(Event::DirectRouteRemoved {
                        router: self.id.clone(),
                        prefix: prefix.clone(),
                        interface: interface.clone(),
                    });
                    self.poisoned_direct_prefixes.push(prefix);
                    changed = true;
                }

                for entry in self.routing_table.iter_mut() {
                    if entry.is_directly_connected()
                        || entry.via_interface != interface
                        || entry.metric >= INFINITY_METRIC
                        || !neighbor.is_none_or(|n| entry.next_hop.is(n))
                    {
                        continue;
                    }
                    entry.invalidate(settings);
                    info!("{}: route {} via {} lost with link {}", self.id, entry.prefix, entry.next_hop, link_id);
                    self.events.push(Event::RouteInvalidated {
                        router: self.id.clone(),
                        prefix: entry.prefix.clone(),
                        next_hop: entry.next_hop.clone(),
                        cause: InvalidationCause::LinkDown { interface: interface.clone() },
                    });
                    changed = true;
                }

                if changed {
                    self.pending_triggered_update = true;
                }
            }
            LinkStatus::Up => {
                let has_direct = self
                    .routing_table
                    .get(&prefix)
                    .is_some_and(RouteEntry::is_directly_connected);
                if !has_direct {
                    self.routing_table
                        .insert(RouteEntry::direct(prefix.clone(), &interface, &self.id));
                    info!("{}: direct route {} on {} added", self.id, prefix, interface);
                    self.events.push(Event::DirectRouteAdded {
                        router: self.id.clone(),
                        prefix,
                        interface,
                    });
                }
                self.pending_triggered_update = true;
            }
        }
    }
}
