// Route lookup engine with longest prefix matching over a binary trie

use super::{ADDRESS_BITS, Interface, Route, Subnet};
use std::net::Ipv4Addr;

/// One bit position along an inserted prefix.
///
/// `zero` and `one` lead to the next level; `route` is set when a subnet
/// terminates exactly at this depth. A node may be both a branch point and
/// the end of a shorter prefix.
#[derive(Debug, Default)]
struct Node {
    zero: Option<Box<Node>>,
    one: Option<Box<Node>>,
    route: Option<Route>,
}

impl Node {
    fn child(&self, bit: bool) -> Option<&Node> {
        if bit { self.one.as_deref() } else { self.zero.as_deref() }
    }

    fn child_or_insert(&mut self, bit: bool) -> &mut Node {
        let slot = if bit { &mut self.one } else { &mut self.zero };
        slot.get_or_insert_with(Box::default)
    }
}

/// Bit `depth` of `value` counting from the most significant bit
fn bit_at(value: u32, depth: u8) -> bool {
    (value >> (ADDRESS_BITS - 1 - depth)) & 1 == 1
}

/// IPv4 routing table answering longest-prefix-match queries.
///
/// Lookups cost at most 32 steps no matter how many routes are stored.
/// The table has no internal locking; share it behind a lock if needed.
#[derive(Debug, Default)]
pub struct Router {
    root: Node,
    len: usize,
}

impl Router {
    pub fn new() -> Self {
        Router::default()
    }

    /// Bind `subnet` to `interface`.
    ///
    /// Inserting a subnet whose prefix is already present replaces the stored
    /// subnet and interface. Returns true when an existing route was replaced.
    pub fn insert(&mut self, subnet: Subnet, interface: Interface) -> bool {
        let prefix_len = subnet.prefix_len();
        assert!(prefix_len <= ADDRESS_BITS, "prefix length {} exceeds 32", prefix_len);

        let bits = u32::from(subnet.address());
        let mut node = &mut self.root;
        for depth in 0..prefix_len {
            node = node.child_or_insert(bit_at(bits, depth));
        }

        let replaced = node.route.replace(Route { subnet, interface });
        match replaced {
            Some(old) => {
                tracing::warn!(
                    "Route {} -> {} replaced by {} -> {}",
                    old.subnet,
                    old.interface,
                    subnet,
                    interface
                );
                true
            }
            None => {
                self.len += 1;
                tracing::debug!("Added route {} -> {}", subnet, interface);
                false
            }
        }
    }

    /// Find the most specific route matching `dest`
    pub fn lookup_route(&self, dest: Ipv4Addr) -> Option<&Route> {
        let bits = u32::from(dest);
        let mut node = &self.root;
        let mut best_match = node.route.as_ref();

        for depth in 0..ADDRESS_BITS {
            match node.child(bit_at(bits, depth)) {
                Some(next) => node = next,
                None => break,
            }
            if let Some(route) = &node.route {
                best_match = Some(route);
            }
        }

        best_match
    }

    /// Interface of the most specific route matching `dest`, or `None` if no route matches
    pub fn lookup(&self, dest: Ipv4Addr) -> Option<Interface> {
        self.lookup_route(dest).map(|route| route.interface)
    }

    /// Number of stored routes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All routes in trie order: ascending network address, shorter prefixes first
    pub fn routes(&self) -> Vec<Route> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Some(route) = node.route {
                out.push(route);
            }
            // one pushed first so the zero branch is visited first
            if let Some(one) = node.one.as_deref() {
                stack.push(one);
            }
            if let Some(zero) = node.zero.as_deref() {
                stack.push(zero);
            }
        }
        out
    }

    /// Drop every route
    pub fn clear(&mut self) {
        self.root = Node::default();
        self.len = 0;
    }
}

impl Extend<(Subnet, Interface)> for Router {
    fn extend<T: IntoIterator<Item = (Subnet, Interface)>>(&mut self, iter: T) {
        for (subnet, interface) in iter {
            self.insert(subnet, interface);
        }
    }
}

impl FromIterator<(Subnet, Interface)> for Router {
    fn from_iter<T: IntoIterator<Item = (Subnet, Interface)>>(iter: T) -> Self {
        let mut router = Router::new();
        router.extend(iter);
        router
    }
}
