// # iproute2 Address Source
//
// Discovers the interface's current global IPv6 address by invoking
// iproute2's `ip` with JSON output (`ip -j -6 address show`).
//
// ## Why the external command
//
// `ip` is in practice the stable interface to the kernel's address
// state. Its JSON mode gives structured, parseable records without
// binding to netlink crate APIs that differ between kernels and
// environments; filter semantics are identical either way.
//
// ## Filtering
//
// The command requests global scope and excludes tentative, deprecated
// and DAD-failed addresses kernel-side. In-process we additionally drop
// temporary (privacy-extension) addresses and unique-local `fc00::/7`
// addresses; neither is a stable target for a AAAA record.
//
// ## Selection
//
// The first surviving address, in the order the kernel reports them.
// That order is not guaranteed stable across kernel versions: with
// several global addresses on one interface, the chosen one may vary.
//
// ## Platform Support
//
// Requires iproute2, so effectively Linux.

use async_trait::async_trait;
use ddns6_core::traits::AddressSource;
use ddns6_core::{Error, Result};
use serde::Deserialize;
use std::net::Ipv6Addr;
use tokio::process::Command;
use tracing::debug;

/// One interface block from `ip -j address show`
#[derive(Debug, Deserialize)]
struct InterfaceAddrs {
    #[serde(default)]
    addr_info: Vec<AddrInfo>,
}

/// One address record from `ip -j address show`
///
/// Address flags appear as individual booleans in the JSON output;
/// an absent flag means unset.
#[derive(Debug, Deserialize)]
struct AddrInfo {
    #[serde(default)]
    family: String,
    #[serde(default)]
    local: Option<String>,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    temporary: bool,
    #[serde(default)]
    deprecated: bool,
    #[serde(default)]
    tentative: bool,
    #[serde(default)]
    dadfailed: bool,
}

impl AddrInfo {
    fn is_candidate(&self) -> bool {
        self.family == "inet6"
            && self.scope == "global"
            && !self.temporary
            && !self.deprecated
            && !self.tentative
            && !self.dadfailed
    }
}

/// AddressSource backed by the iproute2 `ip` command
pub struct IprouteAddressSource {
    interface: String,
}

impl IprouteAddressSource {
    /// Create a source inspecting `interface`
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }

    /// The inspected interface name
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

#[async_trait]
impl AddressSource for IprouteAddressSource {
    async fn resolve(&self) -> Result<Ipv6Addr> {
        let output = Command::new("ip")
            .args([
                "-j",
                "-6",
                "address",
                "show",
                "dev",
                self.interface.as_str(),
                "scope",
                "global",
                "-tentative",
                "-deprecated",
                "-dadfailed",
            ])
            .output()
            .await
            .map_err(|e| Error::no_address(format!("failed to run ip: {}", e)))?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::no_address(format!(
                "ip exited with {}: {} {}",
                output.status,
                stdout.trim(),
                stderr.trim()
            )));
        }

        let interfaces: Vec<InterfaceAddrs> = serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::no_address(format!("unparseable ip output: {}", e)))?;

        let address = select_address(&interfaces).ok_or_else(|| {
            Error::no_address(format!(
                "no usable global IPv6 address on {}",
                self.interface
            ))
        })?;

        debug!("selected {} on {}", address, self.interface);
        Ok(address)
    }

    fn source_name(&self) -> &'static str {
        "iproute2"
    }
}

/// Pick the first address surviving the filter, in kernel-reported order.
fn select_address(interfaces: &[InterfaceAddrs]) -> Option<Ipv6Addr> {
    interfaces
        .iter()
        .flat_map(|iface| iface.addr_info.iter())
        .filter(|info| info.is_candidate())
        .filter_map(|info| info.local.as_deref()?.parse::<Ipv6Addr>().ok())
        .find(|addr| !is_unique_local(addr))
}

/// Unique-local addresses (`fc00::/7`) are not globally routable.
fn is_unique_local(addr: &Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xfe00) == 0xfc00
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<InterfaceAddrs> {
        serde_json::from_str(json).expect("fixture parses")
    }

    #[test]
    fn picks_first_global_address_in_input_order() {
        let interfaces = parse(
            r#"[{"ifname":"eth0","addr_info":[
                {"family":"inet6","local":"2001:db8::10","prefixlen":64,"scope":"global"},
                {"family":"inet6","local":"2001:db8::20","prefixlen":64,"scope":"global"}
            ]}]"#,
        );

        assert_eq!(
            select_address(&interfaces),
            Some("2001:db8::10".parse().unwrap())
        );
    }

    #[test]
    fn temporary_addresses_excluded_regardless_of_position() {
        let interfaces = parse(
            r#"[{"ifname":"eth0","addr_info":[
                {"family":"inet6","local":"2001:db8::aaaa","scope":"global","temporary":true,"dynamic":true},
                {"family":"inet6","local":"2001:db8::1","scope":"global","mngtmpaddr":true,"dynamic":true},
                {"family":"inet6","local":"2001:db8::bbbb","scope":"global","temporary":true}
            ]}]"#,
        );

        assert_eq!(
            select_address(&interfaces),
            Some("2001:db8::1".parse().unwrap())
        );
    }

    #[test]
    fn unique_local_addresses_excluded() {
        let interfaces = parse(
            r#"[{"ifname":"eth0","addr_info":[
                {"family":"inet6","local":"fc00::1","scope":"global"},
                {"family":"inet6","local":"fd12:3456:789a::1","scope":"global"},
                {"family":"inet6","local":"2001:db8::1","scope":"global"}
            ]}]"#,
        );

        assert_eq!(
            select_address(&interfaces),
            Some("2001:db8::1".parse().unwrap())
        );
    }

    #[test]
    fn flagged_addresses_excluded() {
        let interfaces = parse(
            r#"[{"ifname":"eth0","addr_info":[
                {"family":"inet6","local":"2001:db8::1","scope":"global","deprecated":true},
                {"family":"inet6","local":"2001:db8::2","scope":"global","tentative":true},
                {"family":"inet6","local":"2001:db8::3","scope":"global","dadfailed":true}
            ]}]"#,
        );

        assert_eq!(select_address(&interfaces), None);
    }

    #[test]
    fn non_global_and_non_inet6_records_ignored() {
        let interfaces = parse(
            r#"[{"ifname":"eth0","addr_info":[
                {"family":"inet","local":"192.0.2.1","scope":"global"},
                {"family":"inet6","local":"fe80::1","scope":"link"}
            ]}]"#,
        );

        assert_eq!(select_address(&interfaces), None);
    }

    #[test]
    fn empty_reply_yields_nothing() {
        assert_eq!(select_address(&parse("[]")), None);
        assert_eq!(
            select_address(&parse(r#"[{"ifname":"eth0","addr_info":[]}]"#)),
            None
        );
    }

    #[test]
    fn unique_local_prefix_detection() {
        assert!(is_unique_local(&"fc00::1".parse().unwrap()));
        assert!(is_unique_local(&"fdff::1".parse().unwrap()));
        assert!(!is_unique_local(&"fe80::1".parse().unwrap()));
        assert!(!is_unique_local(&"2001:db8::1".parse().unwrap()));
    }
}
