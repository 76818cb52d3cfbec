//! Service and Endpoints records - the two entity kinds flowing through the mux.

use serde::{Deserialize, Serialize};

/// Merge-key access shared by every entity kind.
///
/// The mux treats payloads as opaque values and merges entities purely by
/// this name.
pub trait Named {
    /// Unique entity name (the merge key).
    fn name(&self) -> &str;
}

/// A named cluster service.
///
/// Beyond `name`, the fields are opaque to the mux; it compares and replaces
/// services as whole values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Unique service name
    pub name: String,

    /// Port the proxy listens on for this service
    pub port: u16,

    /// Transport protocol
    #[serde(default)]
    pub protocol: Protocol,
}

impl Service {
    /// Create a TCP service.
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            protocol: Protocol::default(),
        }
    }
}

impl Named for Service {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Transport protocol of a service port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

/// The backend set of one service.
///
/// `name` matches the backed service; `addresses` is an ordered list of
/// `host:port` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Name of the service these backends serve
    pub name: String,

    /// Backend addresses as `host:port`
    pub addresses: Vec<String>,
}

impl Endpoints {
    /// Create an endpoints record from any iterable of addresses.
    pub fn new<I, S>(name: impl Into<String>, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }
}

impl Named for Endpoints {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Copy of a snapshot ordered by entity name.
///
/// Snapshot ordering is not part of the mux contract; consumers that need a
/// stable order use this.
pub fn sorted_by_name<T: Named + Clone>(snapshot: &[T]) -> Vec<T> {
    let mut sorted = snapshot.to_vec();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));
    sorted
}
