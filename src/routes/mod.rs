// Routes module - route data model, the bit-trie routing table and text parsing

pub mod lookup;
pub mod parser;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

use crate::error::{AppError, AppResult};

/// Number of bits in an IPv4 address, and the deepest level of the trie
pub const ADDRESS_BITS: u8 = 32;

/// Identifier of an outgoing interface
pub type Interface = u8;

/// Packs four octets into a 32-bit value, octet 0 being the most significant byte.
pub fn pack_octets(octets: [u8; 4]) -> u32 {
    (octets[0] as u32) << 24 | (octets[1] as u32) << 16 | (octets[2] as u32) << 8 | octets[3] as u32
}

/// Inverse of [`pack_octets`].
pub fn unpack_octets(value: u32) -> [u8; 4] {
    [
        (value >> 24) as u8,
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
    ]
}

/// Renders the leading `len` bits of `value`, grouped by four.
pub fn prefix_bits(value: u32, len: u8) -> String {
    let mut out = String::new();
    for i in 0..len.min(ADDRESS_BITS) {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        let bit = (value >> (ADDRESS_BITS - 1 - i)) & 1;
        out.push(if bit == 1 { '1' } else { '0' });
    }
    out
}

/// An IPv4 network: an address plus the number of leading bits that form the prefix.
///
/// The address is kept as given, host bits included; only the leading
/// `prefix_len` bits decide where the subnet sits in the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    address: Ipv4Addr,
    prefix_len: u8,
}

impl Subnet {
    pub fn new(address: Ipv4Addr, prefix_len: u32) -> AppResult<Self> {
        if prefix_len > ADDRESS_BITS as u32 {
            return Err(AppError::InvalidPrefixLength(prefix_len));
        }
        Ok(Subnet {
            address,
            prefix_len: prefix_len as u8,
        })
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Address with the host bits cleared
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.address) & self.mask())
    }

    pub fn mask(&self) -> u32 {
        match self.prefix_len {
            0 => 0,
            len => u32::MAX << (ADDRESS_BITS - len),
        }
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        (u32::from(addr) & self.mask()) == (u32::from(self.address) & self.mask())
    }

    /// True when both subnets occupy the same position in the trie
    pub fn same_prefix(&self, other: &Subnet) -> bool {
        self.prefix_len == other.prefix_len && self.network() == other.network()
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

/// A subnet bound to an interface; the record held by the routing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub subnet: Subnet,
    pub interface: Interface,
}

/// Flattened view of a route, used when dumping the table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteSummary {
    pub destination: String, // CIDR notation, as inserted
    pub network: String,
    pub prefix_bits: String,
    pub interface: Interface,
}

impl From<&Route> for RouteSummary {
    fn from(route: &Route) -> Self {
        RouteSummary {
            destination: route.subnet.to_string(),
            network: route.subnet.network().to_string(),
            prefix_bits: prefix_bits(u32::from(route.subnet.address()), route.subnet.prefix_len()),
            interface: route.interface,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingTable {
    pub routes: Vec<RouteSummary>,
    pub count: usize,
}
