//! JACK graph runtime.
//!
//! Opens a plain client (no ports, no process callback) on a running JACK
//! server and uses it to query and rewire other clients' ports.
//!
//! Enable with: `cargo build --features jack`

use jack::{Client, ClientOptions, PortFlags};
use treadle_core::{GraphError, GraphRuntime};

/// A [`GraphRuntime`] backed by a JACK server.
pub struct JackGraph {
    client: Client,
}

impl JackGraph {
    /// Connects to the running JACK server as `name`. Never starts a server.
    pub fn open(name: &str) -> Result<Self, GraphError> {
        let (client, status) = Client::new(name, ClientOptions::NO_START_SERVER)
            .map_err(|e| GraphError::Backend(format!("cannot open JACK client '{name}': {e}")))?;
        tracing::info!(client = client.name(), ?status, "connected to JACK server");
        Ok(Self { client })
    }

    /// The underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn classify(&self, source: &str, destination: &str, error: &jack::Error) -> GraphError {
        for port in [source, destination] {
            if self.client.port_by_name(port).is_none() {
                return GraphError::NoSuchPort(port.to_owned());
            }
        }
        GraphError::Backend(error.to_string())
    }
}

impl GraphRuntime for JackGraph {
    fn list_ports(&self, owner_pattern: Option<&str>, type_pattern: Option<&str>) -> Vec<String> {
        self.client.ports(owner_pattern, type_pattern, PortFlags::empty())
    }

    fn is_connected(&self, a: &str, b: &str) -> bool {
        self.client
            .port_by_name(a)
            .is_some_and(|port| port.is_connected_to(b).unwrap_or(false))
    }

    fn connect(&mut self, source: &str, destination: &str) -> Result<(), GraphError> {
        match self.client.connect_ports_by_name(source, destination) {
            Ok(()) => Ok(()),
            Err(jack::Error::PortAlreadyConnected(..)) => Err(GraphError::AlreadyConnected),
            Err(e) => Err(self.classify(source, destination, &e)),
        }
    }

    fn disconnect(&mut self, source: &str, destination: &str) -> Result<(), GraphError> {
        if !self.is_connected(source, destination) {
            return Err(GraphError::NotConnected);
        }
        self.client
            .disconnect_ports_by_name(source, destination)
            .map_err(|e| self.classify(source, destination, &e))
    }
}
