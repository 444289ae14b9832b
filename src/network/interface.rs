use serde::{Deserialize, Serialize};
use crate::config::InterfaceSpec;
use crate::network::LinkStatus;
use crate::types::Prefix;
use crate::LinkId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub address: String,
    pub network_prefix: Prefix,
    pub link_id: LinkId,
    pub link_local_address: String,
    pub rip_enabled: bool,
    /// Last status the owning router was told about for `link_id`.
    pub link_status: LinkStatus,
}

impl NetworkInterface {
    pub fn new(router_id: &str, spec: &InterfaceSpec, link_status: LinkStatus) -> Self {
        Self {
            name: spec.name.clone(),
            address: spec.address.clone(),
            network_prefix: spec.network_prefix.clone(),
            link_id: spec.link_id.clone(),
            link_local_address: link_local_address(router_id, &spec.name),
            rip_enabled: spec.rip_enabled,
            link_status,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.rip_enabled && self.link_status == LinkStatus::Up
    }

    pub fn set_link_status(&mut self, status: LinkStatus) {
        self.link_status = status;
    }

    pub fn set_rip_enabled(&mut self, enabled: bool) {
        self.rip_enabled = enabled;
    }
}

/// Address a router uses as the source of updates sent on an interface.
pub fn link_local_address(router_id: &str, interface: &str) -> String {
    format!("fe80::{}:{}", router_id, interface)
}
