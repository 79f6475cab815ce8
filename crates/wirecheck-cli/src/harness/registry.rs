//! Registry mapping command names to test operations.

use std::collections::HashMap;

/// A test operation resolvable by command name.
///
/// Pure predicates carry their function value directly; networked
/// operations are tagged variants the runner dispatches against the
/// harness context, which keeps dispatch free of boxed async closures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Pure predicate over the argument list; no I/O.
    Predicate(fn(&[String]) -> bool),
    /// Open the persistent connection to a loopback port.
    Connect,
    /// Close the current connection; idempotent.
    Disconnect,
    /// Reachability probe expecting the port to accept.
    VerifyOpen,
    /// Reachability probe expecting the port to refuse.
    VerifyClose,
    /// Encode and transmit one packet.
    Send,
    /// Receive one reassembled packet and compare it to expectations.
    Read,
}

/// Table of operations keyed by command name. Last registration wins.
pub struct Registry {
    ops: HashMap<String, Operation>,
}

impl Registry {
    /// A registry seeded with the two self-check probes, `probe_true` and
    /// `probe_false`, used to verify dispatch before testing anything
    /// networked.
    pub fn new() -> Self {
        let mut registry = Self {
            ops: HashMap::new(),
        };
        registry.register("probe_true", Operation::Predicate(|_| true));
        registry.register("probe_false", Operation::Predicate(|_| false));
        registry
    }

    /// A registry with the built-in networked operations on top of the
    /// probes. This is what the `wirecheck run` binary installs.
    pub fn with_network_ops() -> Self {
        let mut registry = Self::new();
        registry.register("connect", Operation::Connect);
        registry.register("disconnect", Operation::Disconnect);
        registry.register("verify_open", Operation::VerifyOpen);
        registry.register("verify_close", Operation::VerifyClose);
        registry.register("send", Operation::Send);
        registry.register("read", Operation::Read);
        registry
    }

    /// Insert or overwrite the mapping for `name`.
    pub fn register(&mut self, name: impl Into<String>, op: Operation) {
        self.ops.insert(name.into(), op);
    }

    /// Pure lookup, no side effects.
    pub fn resolve(&self, name: &str) -> Option<Operation> {
        self.ops.get(name).copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
