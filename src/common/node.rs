//! Struct and implementation of the peer record stored in the leaf set
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use crate::common::Id;

#[derive(Debug, Clone)]
/// Peer record stored in the leaf set.
///
/// Cheap to clone, a `Node` is a shared handle to the record built from a
/// network announcement. A leaf set slot takes shared read access rather
/// than a copy of the record.
pub struct Node(Arc<NodeInner>);

#[derive(Debug)]
struct NodeInner {
    id: Id,
    local_address: IpAddr,
    public_address: IpAddr,
    region: String,
    port: u16,
}

impl Node {
    /// Creates a new Node from an id, its reachable addresses, a region
    /// label and a port.
    pub fn new(
        id: Id,
        local_address: IpAddr,
        public_address: IpAddr,
        region: String,
        port: u16,
    ) -> Node {
        Node(Arc::new(NodeInner {
            id,
            local_address,
            public_address,
            region,
            port,
        }))
    }

    /// Creates a node with a random [Id] on the loopback address.
    pub fn random() -> Node {
        Node::new(
            Id::random(),
            Ipv4Addr::LOCALHOST.into(),
            Ipv4Addr::LOCALHOST.into(),
            "local".to_string(),
            0,
        )
    }

    /// Creates a node with an id and port derived from `i`, useful to
    /// generate distinct deterministic nodes.
    pub fn unique(i: usize) -> Node {
        Node::new(
            Id::digest(i.to_be_bytes()),
            Ipv4Addr::LOCALHOST.into(),
            Ipv4Addr::LOCALHOST.into(),
            "local".to_string(),
            i as u16,
        )
    }

    // === Getters ===

    /// Returns this node's [Id].
    pub fn id(&self) -> &Id {
        &self.0.id
    }

    /// The address this node is reachable at from within its region.
    pub fn local_address(&self) -> IpAddr {
        self.0.local_address
    }

    /// The publicly reachable address of this node.
    pub fn public_address(&self) -> IpAddr {
        self.0.public_address
    }

    /// The region or namespace this node announced itself under.
    pub fn region(&self) -> &str {
        &self.0.region
    }

    /// The port this node is listening on.
    pub fn port(&self) -> u16 {
        self.0.port
    }
}

impl PartialEq for Node {
    /// Two records with equal [Id]s describe the same peer, even when the
    /// address fields differ.
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Node {}
