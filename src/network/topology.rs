use std::collections::{HashMap, HashSet};
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::config::{EndpointSpec, TopologySpec};
use crate::error::TopologyError;
use crate::LinkId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Up,
    Down,
}

impl LinkStatus {
    pub fn toggled(self) -> Self {
        match self {
            LinkStatus::Up => LinkStatus::Down,
            LinkStatus::Down => LinkStatus::Up,
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Up => f.write_str("up"),
            LinkStatus::Down => f.write_str("down"),
        }
    }
}

/// One side of a link: a router and the interface it uses.
pub type Endpoint = EndpointSpec;

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: LinkId,
    pub name: String,
    pub status: LinkStatus,
    pub peers: [Endpoint; 2],
}

impl Link {
    /// The endpoint opposite to `router_id`/`interface`, if that pair is one
    /// of this link's peers.
    pub fn peer_of(&self, router_id: &str, interface: &str) -> Option<&Endpoint> {
        match &self.peers {
            [a, b] if a.router_id == router_id && a.interface == interface => Some(b),
            [a, b] if b.router_id == router_id && b.interface == interface => Some(a),
            _ => None,
        }
    }

    pub fn has_endpoint(&self, router_id: &str, interface: &str) -> bool {
        self.peers
            .iter()
            .any(|p| p.router_id == router_id && p.interface == interface)
    }
}

/// Link index built once per topology. Only link status changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    links: Vec<Link>,
    index: HashMap<LinkId, usize>,
}

impl Topology {
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Validate `spec` and index its links.
    pub fn from_spec(spec: &TopologySpec) -> Result<Self, TopologyError> {
        let mut interfaces: HashMap<&str, HashMap<&str, &str>> = HashMap::new();
        for router in &spec.routers {
            if interfaces.contains_key(router.id.as_str()) {
                return Err(TopologyError::DuplicateRouter(router.id.clone()));
            }
            let mut names = HashMap::new();
            let mut attached: HashMap<&str, &str> = HashMap::new();
            for iface in &router.interfaces {
                if names.insert(iface.name.as_str(), iface.link_id.as_str()).is_some() {
                    return Err(TopologyError::DuplicateInterface {
                        router: router.id.clone(),
                        interface: iface.name.clone(),
                    });
                }
                if let Some(first) = attached.insert(iface.link_id.as_str(), iface.name.as_str()) {
                    return Err(TopologyError::SharedLink {
                        router: router.id.clone(),
                        link: iface.link_id.clone(),
                        first: first.to_string(),
                        second: iface.name.clone(),
                    });
                }
            }
            interfaces.insert(router.id.as_str(), names);
        }

        let mut topology = Topology::new();
        let mut seen_links = HashSet::new();
        for link in &spec.links {
            if !seen_links.insert(link.id.as_str()) {
                return Err(TopologyError::DuplicateLink(link.id.clone()));
            }

            for peer in &link.peers {
                let router_ifaces = interfaces.get(peer.router_id.as_str()).ok_or_else(|| {
                    TopologyError::UnknownRouter {
                        link: link.id.clone(),
                        router: peer.router_id.clone(),
                    }
                })?;
                let declared = router_ifaces.get(peer.interface.as_str()).ok_or_else(|| {
                    TopologyError::UnknownInterface {
                        link: link.id.clone(),
                        router: peer.router_id.clone(),
                        interface: peer.interface.clone(),
                    }
                })?;
                if *declared != link.id {
                    return Err(TopologyError::LinkMismatch {
                        link: link.id.clone(),
                        router: peer.router_id.clone(),
                        interface: peer.interface.clone(),
                        declared: declared.to_string(),
                    });
                }
            }

            if link.peers[0] == link.peers[1] {
                return Err(TopologyError::SelfLoop {
                    link: link.id.clone(),
                    router: link.peers[0].router_id.clone(),
                    interface: link.peers[0].interface.clone(),
                });
            }

            topology.index.insert(link.id.clone(), topology.links.len());
            topology.links.push(Link {
                id: link.id.clone(),
                name: link.name.clone(),
                status: link.status,
                peers: link.peers.clone(),
            });
        }

        Ok(topology)
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        self.index.get(id).map(|&i| &self.links[i])
    }

    pub fn link_mut(&mut self, id: &str) -> Option<&mut Link> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.links[i]),
            None => None,
        }
    }

    /// Links in declaration order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Status of `id`, treating unknown links as down.
    pub fn status_of(&self, id: &str) -> LinkStatus {
        self.link(id).map(|l| l.status).unwrap_or(LinkStatus::Down)
    }
}
