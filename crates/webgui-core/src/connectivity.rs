//! WiFi bring-up.
//!
//! The board's WiFi stack is reached through the narrow [`WifiDriver`]
//! trait. [`NetworkAdapter`] layers the panel's policy on top: a bounded
//! retry budget instead of a timeout, static address configuration from
//! text, the gateway workaround for stacks that misreport it, and network
//! range auto-configuration.

use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::net;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("SSID must not be empty")]
    EmptySsid,

    #[error("invalid {field} address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("WiFi driver error: {0}")]
    Driver(String),
}

/// Operations a board WiFi stack provides.
pub trait WifiDriver {
    /// Start hosting a network. Returns the access point's own address.
    fn start_access_point(&mut self, ssid: &str, password: &str) -> Result<Ipv4Addr, ConnectError>;

    /// Start joining a network. Completion is observed via [`is_connected`].
    ///
    /// [`is_connected`]: WifiDriver::is_connected
    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), ConnectError>;

    fn is_connected(&self) -> bool;

    /// Use a fixed address on the next join instead of DHCP.
    fn configure_static(
        &mut self,
        ip: Ipv4Addr,
        gateway: Ipv4Addr,
        subnet: Ipv4Addr,
    ) -> Result<(), ConnectError>;

    fn disconnect(&mut self) -> Result<(), ConnectError>;

    fn local_ip(&self) -> Ipv4Addr;

    fn subnet_mask(&self) -> Ipv4Addr;

    /// Gateway as reported by the stack.
    fn gateway_ip(&self) -> Ipv4Addr;
}

/// Network roles the panel can take.
///
/// Failures to join are reported as `false`; falling back to access point
/// mode is left to the caller.
pub trait Connectivity {
    fn become_access_point(&mut self, ssid: &str, password: &str) -> Result<Ipv4Addr, ConnectError>;

    fn join_network(&mut self, ssid: &str, password: &str) -> bool;

    fn join_network_static(
        &mut self,
        ssid: &str,
        password: &str,
        ip: &str,
        subnet: &str,
        gateway: &str,
    ) -> bool;

    fn current_local_address(&self) -> Ipv4Addr;
}

/// Retry policy and platform quirks around a [`WifiDriver`].
#[derive(Debug)]
pub struct NetworkAdapter<D> {
    driver: D,
    max_attempts: u32,
    retry_interval: Duration,
    gateway_quirk: bool,
    access_point: Option<Ipv4Addr>,
}

impl<D: WifiDriver> NetworkAdapter<D> {
    pub const DEFAULT_ATTEMPTS: u32 = 30;
    pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(driver: D) -> Self {
        Self {
            driver,
            max_attempts: Self::DEFAULT_ATTEMPTS,
            retry_interval: Self::DEFAULT_RETRY_INTERVAL,
            gateway_quirk: false,
            access_point: None,
        }
    }

    pub fn with_retry(mut self, max_attempts: u32, retry_interval: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_interval = retry_interval;
        self
    }

    /// Derive the gateway from address and mask instead of trusting the
    /// stack. Needed on the UNO R4 WiFi.
    pub fn with_gateway_quirk(mut self, enabled: bool) -> Self {
        self.gateway_quirk = enabled;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn is_access_point(&self) -> bool {
        self.access_point.is_some()
    }

    pub fn start_access_point(&mut self, ssid: &str, password: &str) -> Result<Ipv4Addr, ConnectError> {
        if ssid.is_empty() {
            return Err(ConnectError::EmptySsid);
        }
        let ip = self.driver.start_access_point(ssid, password)?;
        self.access_point = Some(ip);
        info!("Access point '{}' started at {}", ssid, ip);
        Ok(ip)
    }

    fn wait_for_connection(&self) -> bool {
        let mut attempts = 0;
        while !self.driver.is_connected() && attempts < self.max_attempts {
            thread::sleep(self.retry_interval);
            attempts += 1;
            debug!("Waiting for WiFi, attempt {}/{}", attempts, self.max_attempts);
        }
        self.driver.is_connected()
    }

    fn try_join(&mut self, ssid: &str, password: &str) -> Result<bool, ConnectError> {
        if ssid.is_empty() {
            return Err(ConnectError::EmptySsid);
        }
        self.access_point = None;
        self.driver.begin(ssid, password)?;
        Ok(self.wait_for_connection())
    }

    /// Join `ssid` via DHCP within the retry budget.
    pub fn join_network(&mut self, ssid: &str, password: &str) -> bool {
        match self.try_join(ssid, password) {
            Ok(true) => {
                info!("WiFi connected to '{}', IP {}", ssid, self.driver.local_ip());
                true
            }
            Ok(false) => {
                warn!("WiFi connection to '{}' failed", ssid);
                false
            }
            Err(e) => {
                warn!("WiFi connection to '{}' failed: {}", ssid, e);
                false
            }
        }
    }

    /// Parse and apply a static address configuration.
    pub fn configure_static_ip(&mut self, ip: &str, subnet: &str, gateway: &str) -> Result<(), ConnectError> {
        let parse = |field: &'static str, value: &str| {
            net::parse_ipv4(value).ok_or_else(|| ConnectError::InvalidAddress {
                field,
                value: value.to_string(),
            })
        };
        let ip = parse("ip", ip)?;
        let subnet = parse("subnet", subnet)?;
        let gateway = parse("gateway", gateway)?;

        self.driver.configure_static(ip, gateway, subnet)?;
        info!("Static IP configured: {}", net::format_ip_display(&ip.to_string(), &subnet.to_string(), &gateway.to_string()));
        Ok(())
    }

    /// Join `ssid` with a fixed address. Invalid address text fails before
    /// any join attempt.
    pub fn join_network_static(
        &mut self,
        ssid: &str,
        password: &str,
        ip: &str,
        subnet: &str,
        gateway: &str,
    ) -> bool {
        if let Err(e) = self.configure_static_ip(ip, subnet, gateway) {
            warn!("Static IP configuration rejected: {}", e);
            return false;
        }
        self.join_network(ssid, password)
    }

    /// The address clients should browse to.
    pub fn local_address(&self) -> Ipv4Addr {
        self.access_point.unwrap_or_else(|| self.driver.local_ip())
    }

    pub fn current_subnet(&self) -> Ipv4Addr {
        self.driver.subnet_mask()
    }

    /// Gateway of the joined network, corrected when the quirk is enabled.
    pub fn current_gateway(&self) -> Ipv4Addr {
        if self.gateway_quirk {
            let corrected = net::corrected_gateway(self.driver.local_ip(), self.driver.subnet_mask());
            debug!(
                "Gateway workaround: reported {}, using {}",
                self.driver.gateway_ip(),
                corrected
            );
            corrected
        } else {
            self.driver.gateway_ip()
        }
    }

    /// Join via DHCP to learn the network, then rejoin with the static
    /// address `device_number` inside it.
    pub fn auto_configure_network_range(&mut self, ssid: &str, password: &str, device_number: u8) -> bool {
        info!("Discovering network range of '{}'", ssid);
        if !self.join_network(ssid, password) {
            warn!("Network discovery failed: could not connect via DHCP");
            return false;
        }

        let dhcp_ip = self.driver.local_ip();
        let subnet = self.driver.subnet_mask();
        let gateway = self.current_gateway();
        let static_ip = net::calculate_static_ip(gateway, subnet, device_number);
        info!(
            "Discovered DHCP IP {}, gateway {}, subnet {}; switching to {}",
            dhcp_ip, gateway, subnet, static_ip
        );

        let reconfigure = self
            .driver
            .disconnect()
            .and_then(|()| self.driver.configure_static(static_ip, gateway, subnet));
        if let Err(e) = reconfigure {
            warn!("Network discovery failed: {}", e);
            return false;
        }

        let joined = self.join_network(ssid, password);
        if !joined {
            warn!("Network discovery failed: could not reconnect with static IP");
        }
        joined
    }
}

impl<D: WifiDriver> Connectivity for NetworkAdapter<D> {
    fn become_access_point(&mut self, ssid: &str, password: &str) -> Result<Ipv4Addr, ConnectError> {
        self.start_access_point(ssid, password)
    }

    fn join_network(&mut self, ssid: &str, password: &str) -> bool {
        NetworkAdapter::join_network(self, ssid, password)
    }

    fn join_network_static(
        &mut self,
        ssid: &str,
        password: &str,
        ip: &str,
        subnet: &str,
        gateway: &str,
    ) -> bool {
        NetworkAdapter::join_network_static(self, ssid, password, ip, subnet, gateway)
    }

    fn current_local_address(&self) -> Ipv4Addr {
        self.local_address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Driver that connects after a fixed number of status polls.
    #[derive(Debug, Default)]
    struct ScriptedWifi {
        polls_until_connected: Option<u32>,
        polls: std::cell::Cell<u32>,
        joining: bool,
        static_ip: Option<(Ipv4Addr, Ipv4Addr, Ipv4Addr)>,
        disconnects: u32,
        begins: u32,
        reported_gateway: Option<Ipv4Addr>,
    }

    impl ScriptedWifi {
        fn connecting_after(polls: u32) -> Self {
            Self {
                polls_until_connected: Some(polls),
                ..Default::default()
            }
        }

        fn never_connecting() -> Self {
            Self::default()
        }
    }

    impl WifiDriver for ScriptedWifi {
        fn start_access_point(&mut self, _ssid: &str, _password: &str) -> Result<Ipv4Addr, ConnectError> {
            Ok(Ipv4Addr::new(192, 168, 4, 1))
        }

        fn begin(&mut self, _ssid: &str, _password: &str) -> Result<(), ConnectError> {
            self.joining = true;
            self.begins += 1;
            self.polls.set(0);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            if !self.joining {
                return false;
            }
            let polls = self.polls.get();
            self.polls.set(polls + 1);
            matches!(self.polls_until_connected, Some(n) if polls >= n)
        }

        fn configure_static(&mut self, ip: Ipv4Addr, gateway: Ipv4Addr, subnet: Ipv4Addr) -> Result<(), ConnectError> {
            self.static_ip = Some((ip, gateway, subnet));
            Ok(())
        }

        fn disconnect(&mut self) -> Result<(), ConnectError> {
            self.joining = false;
            self.disconnects += 1;
            Ok(())
        }

        fn local_ip(&self) -> Ipv4Addr {
            match self.static_ip {
                Some((ip, _, _)) => ip,
                None => Ipv4Addr::new(10, 20, 30, 77),
            }
        }

        fn subnet_mask(&self) -> Ipv4Addr {
            Ipv4Addr::new(255, 255, 255, 0)
        }

        fn gateway_ip(&self) -> Ipv4Addr {
            self.reported_gateway.unwrap_or(Ipv4Addr::new(10, 20, 30, 254))
        }
    }

    fn adapter(driver: ScriptedWifi) -> NetworkAdapter<ScriptedWifi> {
        NetworkAdapter::new(driver).with_retry(5, Duration::ZERO)
    }

    #[test]
    fn test_join_within_budget() {
        let mut net = adapter(ScriptedWifi::connecting_after(3));
        assert!(net.join_network("home", "secret"));
        assert_eq!(net.local_address(), Ipv4Addr::new(10, 20, 30, 77));
    }

    #[test]
    fn test_join_gives_up_after_budget() {
        let mut net = adapter(ScriptedWifi::never_connecting());
        assert!(!net.join_network("home", "secret"));
        // One check per attempt plus the initial and final checks.
        assert_eq!(net.driver().polls.get(), 7);
    }

    #[test]
    fn test_empty_ssid_fails() {
        let mut net = adapter(ScriptedWifi::connecting_after(0));
        assert!(!net.join_network("", "secret"));
        assert!(matches!(net.start_access_point("", "x"), Err(ConnectError::EmptySsid)));
    }

    #[test]
    fn test_static_join_rejects_bad_text_before_joining() {
        let mut net = adapter(ScriptedWifi::connecting_after(0));
        assert!(!net.join_network_static("home", "pw", "192.168.1.300", "255.255.255.0", "192.168.1.1"));
        assert_eq!(net.driver().begins, 0);

        assert!(net.join_network_static("home", "pw", "192.168.1.50", "255.255.255.0", "192.168.1.1"));
        assert_eq!(net.local_address(), Ipv4Addr::new(192, 168, 1, 50));
    }

    #[test]
    fn test_access_point_address() {
        let mut net = adapter(ScriptedWifi::never_connecting());
        let ip = net.start_access_point("panel", "password").unwrap();
        assert_eq!(ip, Ipv4Addr::new(192, 168, 4, 1));
        assert!(net.is_access_point());
        assert_eq!(net.current_local_address(), ip);
    }

    #[test]
    fn test_gateway_quirk() {
        let mut driver = ScriptedWifi::connecting_after(0);
        driver.reported_gateway = Some(Ipv4Addr::new(255, 255, 255, 0));

        let mut plain = adapter(driver);
        plain.join_network("home", "pw");
        assert_eq!(plain.current_gateway(), Ipv4Addr::new(255, 255, 255, 0));

        let mut fixed = plain.with_gateway_quirk(true);
        assert_eq!(fixed.current_gateway(), Ipv4Addr::new(10, 20, 30, 1));
        assert!(fixed.join_network("home", "pw"));
    }

    #[test]
    fn test_auto_configure_network_range() {
        let mut net = adapter(ScriptedWifi::connecting_after(1));
        assert!(net.auto_configure_network_range("home", "pw", 42));

        let driver = net.driver();
        assert_eq!(driver.disconnects, 1);
        assert_eq!(driver.begins, 2);
        assert_eq!(
            driver.static_ip,
            Some((
                Ipv4Addr::new(10, 20, 30, 42),
                Ipv4Addr::new(10, 20, 30, 254),
                Ipv4Addr::new(255, 255, 255, 0)
            ))
        );
    }

    #[test]
    fn test_auto_configure_fails_without_dhcp() {
        let mut net = adapter(ScriptedWifi::never_connecting());
        assert!(!net.auto_configure_network_range("home", "pw", 42));
        assert_eq!(net.driver().disconnects, 0);
    }
}
