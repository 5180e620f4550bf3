// Parsers for the textual route and address formats

use super::{Interface, Subnet};
use crate::error::{AppError, AppResult};
use std::net::Ipv4Addr;

/// Parse a dotted-quad IPv4 address such as `192.168.1.1`
pub fn parse_address(text: &str) -> AppResult<Ipv4Addr> {
    let text = text.trim();
    text.parse()
        .map_err(|_| AppError::InvalidAddress(text.to_string()))
}

/// Parse CIDR notation such as `10.0.0.0/8`
pub fn parse_subnet(text: &str) -> AppResult<Subnet> {
    let text = text.trim();
    let (addr, prefix) = text
        .split_once('/')
        .ok_or_else(|| AppError::InvalidSubnet(text.to_string()))?;

    let address: Ipv4Addr = addr
        .parse()
        .map_err(|_| AppError::InvalidSubnet(text.to_string()))?;
    let prefix_len: u32 = prefix
        .parse()
        .map_err(|_| AppError::InvalidSubnet(text.to_string()))?;

    Subnet::new(address, prefix_len)
}

/// Parse an interface identifier in `0..=255`
pub fn parse_interface(text: &str) -> AppResult<Interface> {
    let text = text.trim();
    text.parse()
        .map_err(|_| AppError::InvalidInterface(text.to_string()))
}

/// Parse a route line: `<subnet> <interface>`
pub fn parse_route_line(line: &str) -> AppResult<(Subnet, Interface)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [subnet, interface] => Ok((parse_subnet(subnet)?, parse_interface(interface)?)),
        [subnet] => Err(AppError::InvalidInterface(format!("missing after {}", subnet))),
        _ => Err(AppError::InvalidSubnet(line.trim().to_string())),
    }
}

/// Parse a line holding a non-negative count
pub fn parse_count(text: &str) -> Option<usize> {
    text.trim().parse().ok()
}
