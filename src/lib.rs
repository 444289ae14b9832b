pub mod config;
pub mod error;
pub mod event_log;
pub mod events;
pub mod messages;
pub mod network;
pub mod report;
pub mod router;
pub mod routing_table;
pub mod simulation;
pub mod types;

pub use config::{RawSettings, Settings, TopologySpec};
pub use error::TopologyError;
pub use router::Router;
pub use routing_table::{NextHop, RouteEntry, RoutingTable};
pub use simulation::{Simulation, TickSummary};
pub use types::{LinkId, Metric, Prefix, RouterId, INFINITY_METRIC};
