use serde::{Deserialize, Serialize};
use std::fmt;

pub type RouterId = String;
pub type LinkId = String;
pub type Metric = u8;

/// Hop count used to mark a destination as unreachable.
pub const INFINITY_METRIC: Metric = 16;

/// Network identifier advertised by the protocol, e.g. `2000:1::/64`.
///
/// Prefixes are opaque: two prefixes are the same route only if their text
/// is identical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prefix(String);

impl Prefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Prefix {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Prefix {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Metric a neighbor's advertisement costs once it has crossed one more hop.
pub fn next_hop_metric(advertised: Metric) -> Metric {
    advertised.saturating_add(1).min(INFINITY_METRIC)
}
