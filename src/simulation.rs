use std::collections::HashMap;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Settings, StartupOffset, TopologySpec};
use crate::error::TopologyError;
use crate::event_log::EventLog;
use crate::events::Event;
use crate::messages::{UpdatePacket, UpdateRequest};
use crate::network::{link_local_address, Link, LinkStatus, Topology};
use crate::router::Router;
use crate::routing_table::RouteEntry;
use crate::RouterId;

/// What happened during one call to [`Simulation::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// Clock value after the tick.
    pub time: u64,
    pub sent: Vec<UpdateRequest>,
    /// Log lines recorded during the tick, oldest first.
    pub log: Vec<String>,
}

struct Delivery {
    to: usize,
    interface: String,
    from: String,
    packet: UpdatePacket,
}

pub struct Simulation {
    spec: TopologySpec,
    settings: Settings,
    topology: Topology,
    routers: Vec<Router>,
    router_index: HashMap<RouterId, usize>,
    seed: u64,
    rng: StdRng,
    clock: u64,
    event_log: EventLog,
}

impl Simulation {
    /// Validate `spec` and build a simulation at time zero. Without a seed
    /// a random one is drawn; it is reported by [`Simulation::seed`].
    pub fn new(spec: TopologySpec, settings: Settings, seed: Option<u64>) -> Result<Self, TopologyError> {
        let seed = seed.unwrap_or_else(rand::random);
        let topology = Topology::from_spec(&spec)?;

        let mut sim = Self {
            spec,
            settings: settings.normalized(),
            topology,
            routers: Vec::new(),
            router_index: HashMap::new(),
            seed,
            rng: StdRng::seed_from_u64(seed),
            clock: 0,
            event_log: EventLog::new(),
        };
        sim.populate();
        Ok(sim)
    }

    fn populate(&mut self) {
        self.routers.clear();
        self.router_index.clear();

        for spec in &self.spec.routers {
            let countdown = match self.settings.startup_offset {
                StartupOffset::Uniform => self.rng.random_range(1..=self.settings.update_period),
                StartupOffset::Fixed(n) => n.max(1),
            };
            debug!("{}: first update in {}s", spec.id, countdown);
            self.router_index.insert(spec.id.clone(), self.routers.len());
            self.routers.push(Router::new(spec, &self.topology, countdown));
        }

        info!(
            "Simulation initialized with {} routers and {} links (seed {})",
            self.routers.len(),
            self.topology.links().len(),
            self.seed
        );
        self.event_log.record(
            self.clock,
            Event::SimulationInitialized {
                routers: self.routers.len(),
                links: self.topology.links().len(),
                seed: self.seed,
            },
        );
    }

    /// Replace the topology. On a validation error nothing changes.
    pub fn initialize(&mut self, spec: TopologySpec) -> Result<(), TopologyError> {
        let topology = Topology::from_spec(&spec)?;
        self.spec = spec;
        self.topology = topology;
        self.restart();
        Ok(())
    }

    /// Rebuild from the current topology description with every link back
    /// at its declared status.
    pub fn reset(&mut self) {
        match Topology::from_spec(&self.spec) {
            Ok(topology) => self.topology = topology,
            Err(e) => warn!("Keeping current links, topology no longer validates: {}", e),
        }
        self.restart();
    }

    fn restart(&mut self) {
        self.clock = 0;
        self.rng = StdRng::seed_from_u64(self.seed);
        self.event_log.clear();
        self.populate();
    }

    /// Advance simulated time by one second.
    pub fn tick(&mut self) -> TickSummary {
        let now = self.clock + 1;
        let mut events = Vec::new();

        let mut requests = Vec::new();
        for router in &mut self.routers {
            if let Some(request) = router.advance_one_second(&self.settings) {
                requests.push(request);
            }
            events.extend(router.drain_events());
        }

        let mut packets = 0;
        for request in &requests {
            let Some(&index) = self.router_index.get(&request.router_id) else {
                continue;
            };
            events.push(Event::UpdateSent {
                router: request.router_id.clone(),
                triggered: request.triggered,
            });

            let deliveries = self.collect_deliveries(index);
            packets += deliveries.len();
            for delivery in deliveries {
                let receiver = &mut self.routers[delivery.to];
                receiver.ingest_update(&delivery.packet, &delivery.from, &delivery.interface, &self.settings);
                events.extend(receiver.drain_events());
            }
            self.routers[index].complete_update(&self.settings);
        }
        debug!("T={}: {} updates, {} packets", now, requests.len(), packets);

        self.clock = now;
        let log = events
            .into_iter()
            .map(|event| self.event_log.record(now, event))
            .collect();

        TickSummary {
            time: now,
            sent: requests,
            log,
        }
    }

    /// Packets `sender` puts on each of its usable interfaces right now.
    fn collect_deliveries(&self, sender: usize) -> Vec<Delivery> {
        let router = &self.routers[sender];
        let mut deliveries = Vec::new();
        for iface in router.interfaces() {
            if !iface.is_usable() {
                continue;
            }
            let Some(link) = self.topology.link(&iface.link_id) else {
                continue;
            };
            if link.status != LinkStatus::Up {
                continue;
            }
            let Some(peer) = link.peer_of(&router.id, &iface.name) else {
                continue;
            };
            let Some(&to) = self.router_index.get(&peer.router_id) else {
                continue;
            };

            let packet = router.build_update_packet(&iface.name, &self.settings);
            if packet.is_empty() {
                continue;
            }
            deliveries.push(Delivery {
                to,
                interface: peer.interface.clone(),
                from: iface.link_local_address.clone(),
                packet,
            });
        }
        deliveries
    }

    /// Flip `link_id` and tell both endpoint routers. Returns the new
    /// status, or `None` if no such link exists.
    pub fn toggle_link(&mut self, link_id: &str) -> Option<LinkStatus> {
        let Some(link) = self.topology.link_mut(link_id) else {
            warn!("Toggle requested for unknown link {}", link_id);
            self.event_log.record(self.clock, Event::UnknownLink { link: link_id.to_string() });
            return None;
        };

        link.status = link.status.toggled();
        let status = link.status;
        let peers = link.peers.clone();

        info!("Link {} is now {}", link_id, status);
        self.event_log.record(
            self.clock,
            Event::LinkToggled {
                link: link_id.to_string(),
                status,
            },
        );

        for (i, peer) in peers.iter().enumerate() {
            let other = &peers[1 - i];
            let neighbor = link_local_address(&other.router_id, &other.interface);
            let Some(&index) = self.router_index.get(&peer.router_id) else {
                continue;
            };
            let router = &mut self.routers[index];
            router.handle_link_change(link_id, status, Some(&neighbor), &self.settings);
            for event in router.drain_events() {
                self.event_log.record(self.clock, event);
            }
        }

        Some(status)
    }

    /// Install new settings. Accepts a [`Settings`] or a
    /// [`RawSettings`](crate::config::RawSettings) with textual timers.
    pub fn update_settings(&mut self, settings: impl Into<Settings>) {
        self.settings = settings.into().normalized();
        info!("Settings updated: {:?}", self.settings);
        self.event_log.record(self.clock, Event::SettingsUpdated);
    }

    /// Prefix-ordered copy of a router's table.
    pub fn routing_table(&self, router_id: &str) -> Option<Vec<RouteEntry>> {
        self.router(router_id).map(|r| r.routing_table().snapshot())
    }

    /// Rendered log lines, newest first.
    pub fn event_log(&self) -> Vec<String> {
        self.event_log.iter().map(str::to_string).collect()
    }

    pub fn time(&self) -> u64 {
        self.clock
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn router(&self, router_id: &str) -> Option<&Router> {
        self.router_index.get(router_id).map(|&i| &self.routers[i])
    }

    /// Routers in declaration order.
    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    pub fn link(&self, link_id: &str) -> Option<&Link> {
        self.topology.link(link_id)
    }

    pub fn links(&self) -> &[Link] {
        self.topology.links()
    }
}
