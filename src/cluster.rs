//! Cluster metadata snapshot and broker resolution.
//!
//! The snapshot is produced by the transport collaborator; this module only
//! answers "which broker must receive this request".

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::types::BrokerId;

/// A broker endpoint as advertised in cluster metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broker {
    pub id: BrokerId,
    pub host: String,
    pub port: i32,
    pub rack: Option<String>,
}

impl Broker {
    pub fn new(id: impl Into<BrokerId>, host: impl Into<String>, port: i32) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
            rack: None,
        }
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.id, self.host, self.port)
    }
}

/// Brokers known to the client and the current controller.
///
/// `controller` is [`BrokerId::INVALID`] while no controller is elected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub controller: BrokerId,
    pub brokers: HashMap<BrokerId, Broker>,
}

impl Default for Cluster {
    fn default() -> Self {
        Self {
            controller: BrokerId::INVALID,
            brokers: HashMap::new(),
        }
    }
}

impl Cluster {
    pub fn new(controller: impl Into<BrokerId>, brokers: impl IntoIterator<Item = Broker>) -> Self {
        Self {
            controller: controller.into(),
            brokers: brokers.into_iter().map(|b| (b.id, b)).collect(),
        }
    }

    pub fn broker(&self, id: BrokerId) -> Option<&Broker> {
        self.brokers.get(&id)
    }

    /// The controller's broker entry.
    ///
    /// Fails with [`Error::NoController`] when no controller is elected or
    /// its id is missing from the broker set.
    pub fn controller(&self) -> Result<Broker> {
        if !self.controller.is_valid() {
            return Err(Error::NoController);
        }
        self.broker(self.controller)
            .cloned()
            .ok_or(Error::NoController)
    }
}

/// Resolution rule for controller-targeted requests.
pub fn resolve_broker(cluster: &Cluster) -> Result<Broker> {
    let broker = cluster.controller()?;
    tracing::trace!(broker = %broker, "resolved controller");
    Ok(broker)
}
