use ripng_sim::config::{EndpointSpec, InterfaceSpec, LinkSpec, RouterSpec, StartupOffset};
use ripng_sim::{Settings, TopologySpec};

/// The reference chain R1 - R2 - R4 - R3 with a distinct /64 on every
/// interface:
///
/// R1/eth0 2000:1, R2/eth1 2000:2 (L1), R2/eth0 2000:3, R4/eth1 2000:4 (L2),
/// R4/eth0 2000:5, R3/eth1 2000:6 (L3).
pub fn distinct_prefix_chain() -> TopologySpec {
    TopologySpec {
        routers: vec![
            RouterSpec::new("R1", "Router 1")
                .with_interface(InterfaceSpec::new("eth0", "2000:1::1/64", "2000:1::/64", "L1")),
            RouterSpec::new("R2", "Router 2")
                .with_interface(InterfaceSpec::new("eth1", "2000:2::1/64", "2000:2::/64", "L1"))
                .with_interface(InterfaceSpec::new("eth0", "2000:3::1/64", "2000:3::/64", "L2")),
            RouterSpec::new("R3", "Router 3")
                .with_interface(InterfaceSpec::new("eth1", "2000:6::1/64", "2000:6::/64", "L3")),
            RouterSpec::new("R4", "Router 4")
                .with_interface(InterfaceSpec::new("eth0", "2000:5::1/64", "2000:5::/64", "L3"))
                .with_interface(InterfaceSpec::new("eth1", "2000:4::1/64", "2000:4::/64", "L2")),
        ],
        links: vec![
            LinkSpec::new("L1", "R1-S1-R2", EndpointSpec::new("R1", "eth0"), EndpointSpec::new("R2", "eth1")),
            LinkSpec::new("L2", "R2-S2-R4", EndpointSpec::new("R2", "eth0"), EndpointSpec::new("R4", "eth1")),
            LinkSpec::new("L3", "R3-S3-R4", EndpointSpec::new("R3", "eth1"), EndpointSpec::new("R4", "eth0")),
        ],
    }
}

#[allow(dead_code)]
pub fn fixed_start(offset: u32) -> Settings {
    Settings {
        startup_offset: StartupOffset::Fixed(offset),
        ..Settings::default()
    }
}
