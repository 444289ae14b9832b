use anyhow::Context;
use serde::{Deserialize, Serialize};
use crate::{LinkId, RouterId};
use crate::network::LinkStatus;
use crate::types::Prefix;

/// Declarative description of the routers and links to simulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySpec {
    #[serde(default)]
    pub routers: Vec<RouterSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterSpec {
    pub id: RouterId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    pub name: String,
    pub address: String,
    pub network_prefix: Prefix,
    pub link_id: LinkId,
    #[serde(default = "default_rip_enabled")]
    pub rip_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub id: LinkId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: LinkStatus,
    pub peers: [EndpointSpec; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub router_id: RouterId,
    pub interface: String,
}

fn default_rip_enabled() -> bool {
    true
}

impl InterfaceSpec {
    pub fn new(name: &str, address: &str, network_prefix: &str, link_id: &str) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            network_prefix: Prefix::from(network_prefix),
            link_id: link_id.to_string(),
            rip_enabled: true,
        }
    }
}

impl RouterSpec {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            interfaces: Vec::new(),
        }
    }

    pub fn with_interface(mut self, interface: InterfaceSpec) -> Self {
        self.interfaces.push(interface);
        self
    }
}

impl EndpointSpec {
    pub fn new(router_id: &str, interface: &str) -> Self {
        Self {
            router_id: router_id.to_string(),
            interface: interface.to_string(),
        }
    }
}

impl LinkSpec {
    pub fn new(id: &str, name: &str, a: EndpointSpec, b: EndpointSpec) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status: LinkStatus::Up,
            peers: [a, b],
        }
    }
}

impl TopologySpec {
    pub fn new() -> Self {
        Self {
            routers: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Four routers chained over three links: R1-R2 (L1), R2-R4 (L2) and
    /// R3-R4 (L3). Both ends of a link serve the same /64.
    pub fn reference() -> Self {
        Self {
            routers: vec![
                RouterSpec::new("R1", "Router 1")
                    .with_interface(InterfaceSpec::new("eth0", "2000:1::1/64", "2000:1::/64", "L1")),
                RouterSpec::new("R2", "Router 2")
                    .with_interface(InterfaceSpec::new("eth1", "2000:1::2/64", "2000:1::/64", "L1"))
                    .with_interface(InterfaceSpec::new("eth0", "2000:2::2/64", "2000:2::/64", "L2")),
                RouterSpec::new("R3", "Router 3")
                    .with_interface(InterfaceSpec::new("eth1", "2000:3::1/64", "2000:3::/64", "L3")),
                RouterSpec::new("R4", "Router 4")
                    .with_interface(InterfaceSpec::new("eth0", "2000:3::2/64", "2000:3::/64", "L3"))
                    .with_interface(InterfaceSpec::new("eth1", "2000:2::1/64", "2000:2::/64", "L2")),
            ],
            links: vec![
                LinkSpec::new("L1", "R1-S1-R2", EndpointSpec::new("R1", "eth0"), EndpointSpec::new("R2", "eth1")),
                LinkSpec::new("L2", "R2-S2-R4", EndpointSpec::new("R2", "eth0"), EndpointSpec::new("R4", "eth1")),
                LinkSpec::new("L3", "R3-S3-R4", EndpointSpec::new("R3", "eth1"), EndpointSpec::new("R4", "eth0")),
            ],
        }
    }

    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading topology from {}", path))?;
        let spec: TopologySpec = serde_json::from_str(&content)
            .with_context(|| format!("parsing topology in {}", path))?;
        Ok(spec)
    }

    pub fn save_to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing topology to {}", path))?;
        Ok(())
    }
}

impl Default for TopologySpec {
    fn default() -> Self {
        Self::new()
    }
}
