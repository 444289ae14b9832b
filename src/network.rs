pub mod interface;
pub mod topology;

pub use interface::{link_local_address, NetworkInterface};
pub use topology::{Endpoint, Link, LinkStatus, Topology};
