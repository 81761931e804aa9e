//! IPv4 text validation and small address helpers.
//!
//! Validation works on the text a user typed into a text box, so the rules
//! are stricter than `Ipv4Addr::from_str` in a few places that matter for
//! the panel (and spelled out here rather than inherited from std):
//!
//! - exactly four dot-separated groups of 1-3 ASCII digits
//! - no empty groups, no leading or trailing dot
//! - no leading zeros except the literal `"0"`
//! - every group in `0..=255`

use std::net::Ipv4Addr;

/// Check dotted-quad IPv4 text.
pub fn is_valid_ip_address(text: &str) -> bool {
    parse_ipv4(text).is_some()
}

/// Parse dotted-quad text with the rules above.
pub fn parse_ipv4(text: &str) -> Option<Ipv4Addr> {
    if text.is_empty() {
        return None;
    }

    let mut octets = [0u8; 4];
    let mut count = 0;

    for group in text.split('.') {
        if count == 4 {
            return None;
        }
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if group.len() > 1 && group.starts_with('0') {
            return None;
        }
        let value: u16 = group.parse().ok()?;
        octets[count] = u8::try_from(value).ok()?;
        count += 1;
    }

    (count == 4).then(|| Ipv4Addr::from(octets))
}

/// Check a subnet mask: valid address text whose bits are a run of ones
/// followed by a run of zeros.
pub fn is_valid_subnet_mask(text: &str) -> bool {
    match parse_ipv4(text) {
        Some(mask) => {
            let inverted = !u32::from(mask);
            inverted & inverted.wrapping_add(1) == 0
        }
        None => false,
    }
}

/// Validate a static network configuration.
///
/// All three fields must be well formed. For a `/24` mask the address and
/// gateway must also share their first three octets; other masks are only
/// checked for format.
pub fn validate_network_config(ip: &str, subnet: &str, gateway: &str) -> bool {
    let (Some(ip_addr), Some(gateway_addr)) = (parse_ipv4(ip), parse_ipv4(gateway)) else {
        return false;
    };
    if !is_valid_subnet_mask(subnet) {
        return false;
    }

    if subnet == "255.255.255.0" {
        return ip_addr.octets()[..3] == gateway_addr.octets()[..3];
    }

    true
}

/// True when both addresses fall in the same network under `mask`.
pub fn same_subnet(a: Ipv4Addr, b: Ipv4Addr, mask: Ipv4Addr) -> bool {
    let mask = u32::from(mask);
    u32::from(a) & mask == u32::from(b) & mask
}

/// One-line summary for a status readout.
pub fn format_ip_display(ip: &str, subnet: &str, gateway: &str) -> String {
    format!("IP: {ip} | Subnet: {subnet} | Gateway: {gateway}")
}

/// Gateway derived as `(ip & subnet) + 1`.
///
/// Workaround for the UNO R4 WiFi stack, whose gateway query returns the
/// subnet mask instead of the gateway. Only the last octet is incremented,
/// matching the board library's behaviour.
pub fn corrected_gateway(ip: Ipv4Addr, subnet: Ipv4Addr) -> Ipv4Addr {
    let network = u32::from(ip) & u32::from(subnet);
    let mut octets = network.to_be_bytes();
    octets[3] = octets[3].wrapping_add(1);
    Ipv4Addr::from(octets)
}

/// Static address for `device_number` inside the gateway's network.
///
/// `/24`, `/16` and `/8` masks keep the matching number of network octets
/// from the gateway; any other mask is treated as `/24`.
pub fn calculate_static_ip(gateway: Ipv4Addr, subnet: Ipv4Addr, device_number: u8) -> Ipv4Addr {
    let g = gateway.octets();
    match subnet.octets() {
        [255, 255, 255, 0] => Ipv4Addr::new(g[0], g[1], g[2], device_number),
        [255, 255, 0, 0] => Ipv4Addr::new(g[0], g[1], 0, device_number),
        [255, 0, 0, 0] => Ipv4Addr::new(g[0], 0, 0, device_number),
        _ => Ipv4Addr::new(g[0], g[1], g[2], device_number),
    }
}
