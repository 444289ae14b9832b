use serde::{Deserialize, Serialize};
use crate::types::{Metric, Prefix};
use crate::RouterId;

/// One route as carried in an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAdvertisement {
    pub prefix: Prefix,
    pub metric: Metric,
    pub source_router_id: RouterId,
}

/// Update sent on one interface. Delivery is in-process; nothing is
/// serialized on the way.
pub type UpdatePacket = Vec<RouteAdvertisement>;

/// A router asking the driver to send an update this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub router_id: RouterId,
    pub triggered: bool,
}
