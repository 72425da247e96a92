//! Leaf set actor.
//!
//! Each node in the overlay keeps the peers nearest to its own [Id] in the
//! circular id space, split into an ordered counter-clockwise ([Side::Left])
//! and clockwise ([Side::Right]) half. All state is owned by a dedicated
//! actor thread; callers talk to it through cheap clonable handles, and
//! every operation is serialized through the actor's command channel.

use std::cmp::Ordering;
use std::thread;

use flume::{Receiver, Sender};
use tracing::debug;

use crate::common::{Id, Node, Side};
use crate::{Error, Result};

#[derive(Debug, Clone)]
/// A handle to the leaf set of a local [Node].
///
/// Created with [LeafSet::new], which spawns the actor thread owning the
/// two ordered halves. Handles can be cloned into as many threads as
/// needed; commands are processed one at a time in arrival order, so no
/// two operations ever interleave at the data-structure level.
pub struct LeafSet(Sender<ActorMessage>);

impl LeafSet {
    /// Creates a leaf set bound to the local `node` and spawns its actor
    /// thread. The actor runs until [LeafSet::shutdown] is called or the
    /// last handle is dropped.
    pub fn new(node: Node) -> LeafSet {
        let (sender, receiver) = flume::unbounded();

        let mut actor = Actor::new(node, receiver);
        thread::spawn(move || actor.run());

        LeafSet(sender)
    }

    // === Getters ===

    /// Information about this leaf set: the local node and the current
    /// length of both sides.
    pub fn info(&self) -> Result<Info> {
        let (sender, receiver) = flume::bounded(1);

        self.0
            .send(ActorMessage::Info(sender))
            .map_err(|_| Error::LeafSetShutdown)?;

        receiver.recv().map_err(|_| Error::LeafSetShutdown)
    }

    // === Public Methods ===

    /// Inserts `node` into the half of the leaf set its id falls on,
    /// keeping that side ordered by ascending distance from the local id.
    /// Position 0 is always the nearest peer on its side.
    ///
    /// Idempotent: re-inserting an already known id leaves the leaf set
    /// untouched and returns the position of the record as stored.
    ///
    /// Returns [Error::SelfEntry] for the local node's own id, and
    /// [Error::LeafSetShutdown] after [LeafSet::shutdown].
    pub fn insert(&self, node: Node) -> Result<NodePosition> {
        let (sender, receiver) = flume::bounded(1);

        self.0
            .send(ActorMessage::Insert(node, sender))
            .map_err(|_| Error::LeafSetShutdown)?;

        receiver.recv().map_err(|_| Error::LeafSetShutdown)?
    }

    /// Looks up a peer by id, searching both sides.
    ///
    /// Returns `None` when no entry with that id exists. The returned
    /// position is a snapshot; a later insert of a closer peer on the
    /// same side shifts entries behind it.
    pub fn get_by_id(&self, id: &Id) -> Result<Option<NodePosition>> {
        self.get(Lookup::ById(*id))
    }

    /// Looks up the entry at `position` on `side`.
    ///
    /// Returns `None` when `position` is out of range for that side.
    pub fn get_by_position(&self, position: usize, side: Side) -> Result<Option<NodePosition>> {
        self.get(Lookup::ByPosition { position, side })
    }

    /// Removes the entry with `id` from whichever side holds it and
    /// returns its last position, or `None` when no such entry exists.
    /// Entries behind the removed one shift down by one.
    pub fn remove(&self, id: &Id) -> Result<Option<NodePosition>> {
        let (sender, receiver) = flume::bounded(1);

        self.0
            .send(ActorMessage::Remove(*id, sender))
            .map_err(|_| Error::LeafSetShutdown)?;

        receiver.recv().map_err(|_| Error::LeafSetShutdown)
    }

    /// Shuts the actor thread down.
    ///
    /// Commands already queued ahead of the shutdown are still honored.
    /// Terminal: every further operation on any clone of this handle
    /// returns [Error::LeafSetShutdown].
    pub fn shutdown(&mut self) {
        let (sender, receiver) = flume::bounded(1);

        let _ = self.0.send(ActorMessage::Shutdown(sender));
        let _ = receiver.recv();
    }

    fn get(&self, lookup: Lookup) -> Result<Option<NodePosition>> {
        let (sender, receiver) = flume::bounded(1);

        self.0
            .send(ActorMessage::Get(lookup, sender))
            .map_err(|_| Error::LeafSetShutdown)?;

        receiver.recv().map_err(|_| Error::LeafSetShutdown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A peer's placement in the leaf set: the record as stored, its zero-based
/// rank on its side (0 = nearest to the local id), and the side itself.
pub struct NodePosition {
    pub node: Node,
    pub position: usize,
    pub side: Side,
}

#[derive(Debug, Clone)]
/// Information about a leaf set at the moment of the snapshot.
pub struct Info {
    node: Node,
    left: usize,
    right: usize,
}

impl Info {
    /// The local node this leaf set is bound to.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Number of entries on the left (counter-clockwise) side.
    pub fn left_len(&self) -> usize {
        self.left
    }

    /// Number of entries on the right (clockwise) side.
    pub fn right_len(&self) -> usize {
        self.right
    }
}

impl From<&Actor> for Info {
    fn from(actor: &Actor) -> Self {
        Info {
            node: actor.node.clone(),
            left: actor.left.len(),
            right: actor.right.len(),
        }
    }
}

#[derive(Debug)]
enum ActorMessage {
    Insert(Node, Sender<Result<NodePosition>>),
    Get(Lookup, Sender<Option<NodePosition>>),
    Remove(Id, Sender<Option<NodePosition>>),
    Info(Sender<Info>),
    Shutdown(Sender<()>),
}

#[derive(Debug)]
/// Addressing modes for a leaf set lookup.
enum Lookup {
    ById(Id),
    ByPosition { position: usize, side: Side },
}

#[derive(Debug)]
/// Owns the leaf set state; only the actor thread ever touches the two
/// ordered halves.
struct Actor {
    node: Node,
    left: Vec<Node>,
    right: Vec<Node>,
    receiver: Receiver<ActorMessage>,
}

impl Actor {
    fn new(node: Node, receiver: Receiver<ActorMessage>) -> Actor {
        Actor {
            node,
            left: Vec::new(),
            right: Vec::new(),
            receiver,
        }
    }

    fn run(&mut self) {
        debug!(id = ?self.node.id(), "Leaf set actor started");

        while let Ok(message) = self.receiver.recv() {
            match message {
                ActorMessage::Insert(node, sender) => {
                    let _ = sender.send(self.insert(node));
                }
                ActorMessage::Get(lookup, sender) => {
                    let _ = sender.send(self.get(&lookup));
                }
                ActorMessage::Remove(id, sender) => {
                    let _ = sender.send(self.remove(&id));
                }
                ActorMessage::Info(sender) => {
                    let _ = sender.send(Info::from(&*self));
                }
                ActorMessage::Shutdown(sender) => {
                    debug!(id = ?self.node.id(), "Leaf set actor shutdown");
                    let _ = sender.send(());
                    return;
                }
            }
        }

        // All handles were dropped.
        debug!(id = ?self.node.id(), "Leaf set actor stopped after Drop");
    }

    fn insert(&mut self, node: Node) -> Result<NodePosition> {
        let self_id = *self.node.id();

        if node.id() == &self_id {
            return Err(Error::SelfEntry);
        }

        let side = self_id.side_of(node.id());
        let seek = self_id.distance(node.id());
        let nodes = self.side_mut(side);

        match nodes.binary_search_by(|probe| {
            if probe.id() == node.id() {
                Ordering::Equal
            } else {
                self_id.distance(probe.id()).cmp(&seek)
            }
        }) {
            Ok(position) => Ok(NodePosition {
                node: nodes[position].clone(),
                position,
                side,
            }),
            Err(position) => {
                nodes.insert(position, node.clone());

                debug!(id = ?node.id(), ?side, position, "Inserted node into leaf set");

                Ok(NodePosition {
                    node,
                    position,
                    side,
                })
            }
        }
    }

    fn get(&self, lookup: &Lookup) -> Option<NodePosition> {
        match lookup {
            Lookup::ById(id) => self.position_of(id),
            Lookup::ByPosition { position, side } => {
                self.side(*side).get(*position).map(|node| NodePosition {
                    node: node.clone(),
                    position: *position,
                    side: *side,
                })
            }
        }
    }

    fn remove(&mut self, id: &Id) -> Option<NodePosition> {
        let removed = self.position_of(id)?;
        self.side_mut(removed.side).remove(removed.position);

        debug!(?id, side = ?removed.side, position = removed.position, "Removed node from leaf set");

        Some(removed)
    }

    fn position_of(&self, id: &Id) -> Option<NodePosition> {
        for side in [Side::Left, Side::Right] {
            if let Some(position) = self.side(side).iter().position(|node| node.id() == id) {
                return Some(NodePosition {
                    node: self.side(side)[position].clone(),
                    position,
                    side,
                });
            }
        }

        None
    }

    fn side(&self, side: Side) -> &[Node] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut Vec<Node> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}
