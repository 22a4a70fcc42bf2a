//! Ports: named, typed connection points between stages.
//!
//! Ports live in an arena owned by the pipeline that created them and
//! reference each other by index rather than by pointer, so that
//! destruction and disconnection are simple index clears instead of a
//! reference-counted pointer cycle.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

/// Maximum number of peers a single port may be connected to.
pub const MAX_CONNECTIONS: usize = 10;

/// An index into a [`PortArena`]. Stable for the lifetime of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    None,
}

#[derive(thiserror::Error, Debug)]
pub enum PortError {
    #[error("port data type mismatch: port holds {found}, caller asked for {expected}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("port has no bound data")]
    Unbound,
    #[error("cannot connect two ports of the same direction")]
    SameDirection,
    #[error("port connection limit ({MAX_CONNECTIONS}) reached")]
    ConnectionLimitReached,
    #[error("ports are already connected")]
    AlreadyConnected,
    #[error("unknown port id")]
    UnknownPort,
}

type DataCell = Rc<RefCell<Box<dyn Any>>>;

struct Port {
    name: String,
    direction: Direction,
    type_id: TypeId,
    type_name: &'static str,
    data: RefCell<Option<DataCell>>,
    connections: RefCell<Vec<PortId>>,
}

/// Owns every port created for a pipeline. Ports reference peers by
/// [`PortId`]; there are no raw pointers between ports.
#[derive(Default)]
pub struct PortArena {
    ports: Vec<Port>,
}

impl PortArena {
    pub fn new() -> Self {
        Self { ports: Vec::new() }
    }

    pub fn create_port<T: 'static>(&mut self, name: impl Into<String>, direction: Direction) -> PortId {
        let id = PortId(self.ports.len());
        self.ports.push(Port {
            name: name.into(),
            direction,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            data: RefCell::new(None),
            connections: RefCell::new(Vec::new()),
        });
        id
    }

    pub fn name(&self, id: PortId) -> &str {
        &self.ports[id.0].name
    }

    /// Find the first port with the given name, in creation order.
    /// Convenient for wiring concrete pipelines where a stage's ports
    /// were declared into the pipeline's arena but its `PortId`s weren't
    /// otherwise captured.
    pub fn find(&self, name: &str) -> Option<PortId> {
        self.ports
            .iter()
            .position(|p| p.name == name)
            .map(PortId)
    }

    pub fn direction(&self, id: PortId) -> Direction {
        self.ports[id.0].direction
    }

    pub fn num_connections(&self, id: PortId) -> usize {
        self.ports[id.0].connections.borrow().len()
    }

    fn max_connections(&self, id: PortId) -> usize {
        match self.ports[id.0].direction {
            Direction::In => 1,
            Direction::Out => MAX_CONNECTIONS,
            Direction::None => 0,
        }
    }

    pub fn is_connected_with(&self, a: PortId, b: PortId) -> bool {
        self.ports[a.0].connections.borrow().contains(&b)
    }

    /// Connect `a` and `b`. Succeeds iff their directions differ, neither
    /// is `None`, their types match, neither is already connected to the
    /// other, and neither is at its connection limit. On success, every
    /// input among the two (there is at most one, since `In` caps at 1
    /// connection) has its data handle rebound to the output's handle.
    pub fn connect(&self, a: PortId, b: PortId) -> Result<(), PortError> {
        let pa = &self.ports[a.0];
        let pb = &self.ports[b.0];

        if pa.direction == Direction::None || pb.direction == Direction::None {
            return Err(PortError::SameDirection);
        }
        if pa.direction == pb.direction {
            return Err(PortError::SameDirection);
        }
        if pa.type_id != pb.type_id {
            return Err(PortError::WrongType {
                expected: pa.type_name,
                found: pb.type_name,
            });
        }
        if self.is_connected_with(a, b) {
            return Err(PortError::AlreadyConnected);
        }
        if self.num_connections(a) >= self.max_connections(a)
            || self.num_connections(b) >= self.max_connections(b)
        {
            return Err(PortError::ConnectionLimitReached);
        }

        pa.connections.borrow_mut().push(b);
        pb.connections.borrow_mut().push(a);

        let (out_id, in_id) = if pa.direction == Direction::Out { (a, b) } else { (b, a) };
        self.rebind_input(in_id, out_id);

        Ok(())
    }

    fn rebind_input(&self, input: PortId, output: PortId) {
        let cell = self.ports[output.0].data.borrow().clone();
        *self.ports[input.0].data.borrow_mut() = cell;
    }

    /// Disconnect `a` and `b`. The input side's data handle becomes null.
    pub fn disconnect(&self, a: PortId, b: PortId) {
        self.ports[a.0].connections.borrow_mut().retain(|&p| p != b);
        self.ports[b.0].connections.borrow_mut().retain(|&p| p != a);

        for (id, other) in [(a, b), (b, a)] {
            let _ = other;
            if self.ports[id.0].direction == Direction::In {
                *self.ports[id.0].data.borrow_mut() = None;
            }
        }
    }

    /// Disconnect every peer of `id`. Mirrors "destroying a port
    /// disconnects all peers".
    pub fn disconnect_all(&self, id: PortId) {
        let peers: Vec<PortId> = self.ports[id.0].connections.borrow().clone();
        for peer in peers {
            self.disconnect(id, peer);
        }
    }

    /// Write `value` into an `Out` port, propagating the new data handle
    /// to every connected `In` port.
    pub fn set_data<T: 'static>(&self, id: PortId, value: T) {
        debug_assert_eq!(self.ports[id.0].type_id, TypeId::of::<T>());
        let cell: DataCell = Rc::new(RefCell::new(Box::new(value)));
        *self.ports[id.0].data.borrow_mut() = Some(cell);

        if self.ports[id.0].direction == Direction::Out {
            let peers = self.ports[id.0].connections.borrow().clone();
            for peer in peers {
                self.rebind_input(peer, id);
            }
        }
    }

    /// Read the current value of a port. Fails with `WrongType` if the
    /// static type of the port doesn't match `T`, or `Unbound` if no data
    /// has been written (or the input has been disconnected).
    pub fn data<T: 'static + Clone>(&self, id: PortId) -> Result<T, PortError> {
        let port = &self.ports[id.0];
        if port.type_id != TypeId::of::<T>() {
            return Err(PortError::WrongType {
                expected: std::any::type_name::<T>(),
                found: port.type_name,
            });
        }
        let cell = port.data.borrow();
        let cell = cell.as_ref().ok_or(PortError::Unbound)?;
        let boxed = cell.borrow();
        let value = boxed.downcast_ref::<T>().ok_or(PortError::WrongType {
            expected: std::any::type_name::<T>(),
            found: port.type_name,
        })?;
        Ok(value.clone())
    }

    pub fn is_bound(&self, id: PortId) -> bool {
        self.ports[id.0].data.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_is_symmetric_and_disconnect_clears_both() {
        let mut arena = PortArena::new();
        let out = arena.create_port::<f64>("out", Direction::Out);
        let input = arena.create_port::<f64>("in", Direction::In);

        arena.connect(out, input).unwrap();
        assert!(arena.is_connected_with(out, input));
        assert!(arena.is_connected_with(input, out));

        arena.disconnect(out, input);
        assert!(!arena.is_connected_with(out, input));
        assert!(!arena.is_connected_with(input, out));
    }

    #[test]
    fn wrong_type_connection_is_rejected_and_leaves_no_data_bound() {
        let mut arena = PortArena::new();
        let out = arena.create_port::<f64>("out", Direction::Out);
        let input = arena.create_port::<i32>("in", Direction::In);

        let result = arena.connect(out, input);
        assert!(result.is_err());
        assert!(!arena.is_connected_with(out, input));
        assert!(!arena.is_bound(input));
    }

    #[test]
    fn input_caps_at_one_connection() {
        let mut arena = PortArena::new();
        let out1 = arena.create_port::<f64>("out1", Direction::Out);
        let out2 = arena.create_port::<f64>("out2", Direction::Out);
        let input = arena.create_port::<f64>("in", Direction::In);

        arena.connect(out1, input).unwrap();
        let result = arena.connect(out2, input);
        assert!(result.is_err());
    }

    #[test]
    fn output_propagates_value_to_connected_input_on_write() {
        let mut arena = PortArena::new();
        let out = arena.create_port::<f64>("out", Direction::Out);
        let input = arena.create_port::<f64>("in", Direction::In);
        arena.connect(out, input).unwrap();

        arena.set_data(out, 42.0);
        assert_eq!(arena.data::<f64>(input).unwrap(), 42.0);
    }

    #[test]
    fn unbound_input_read_fails() {
        let mut arena = PortArena::new();
        let input = arena.create_port::<f64>("in", Direction::In);
        assert!(matches!(arena.data::<f64>(input), Err(PortError::Unbound)));
    }

    #[test]
    fn disconnect_all_clears_every_peer() {
        let mut arena = PortArena::new();
        let out = arena.create_port::<f64>("out", Direction::Out);
        let in1 = arena.create_port::<f64>("in1", Direction::In);
        let in2 = arena.create_port::<f64>("in2", Direction::In);
        arena.connect(out, in1).unwrap();
        arena.connect(out, in2).unwrap();

        arena.disconnect_all(out);
        assert_eq!(arena.num_connections(out), 0);
        assert_eq!(arena.num_connections(in1), 0);
        assert_eq!(arena.num_connections(in2), 0);
    }
}
