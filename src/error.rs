use thiserror::Error;

/// Structural problems found while building a topology from its description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("router {0} is declared more than once")]
    DuplicateRouter(String),

    #[error("router {router} declares interface {interface} more than once")]
    DuplicateInterface { router: String, interface: String },

    #[error("router {router} attaches interfaces {first} and {second} to the same link {link}")]
    SharedLink {
        router: String,
        link: String,
        first: String,
        second: String,
    },

    #[error("link {0} is declared more than once")]
    DuplicateLink(String),

    #[error("link {link} names unknown router {router}")]
    UnknownRouter { link: String, router: String },

    #[error("link {link} names unknown interface {router}/{interface}")]
    UnknownInterface {
        link: String,
        router: String,
        interface: String,
    },

    #[error("interface {router}/{interface} belongs to link {declared}, not {link}")]
    LinkMismatch {
        link: String,
        router: String,
        interface: String,
        declared: String,
    },

    #[error("link {link} connects {router}/{interface} to itself")]
    SelfLoop {
        link: String,
        router: String,
        interface: String,
    },
}
