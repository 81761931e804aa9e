//! [`WifiDriver`] over the ESP-IDF WiFi stack.

use std::net::Ipv4Addr;

use anyhow::Result;
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{modem::Modem, peripheral},
    ipv4::{
        ClientConfiguration as IpClientConfiguration, ClientSettings, Configuration as IpConfiguration,
        Mask, Subnet,
    },
    netif::{EspNetif, NetifConfiguration},
    nvs::EspDefaultNvsPartition,
    wifi::{AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::{info, warn};

use webgui_core::connectivity::{ConnectError, WifiDriver};

/// Board WiFi, driven blockingly.
pub struct EspWifiDriver {
    wifi: BlockingWifi<EspWifi<'static>>,
}

fn driver_error(e: impl std::fmt::Display) -> ConnectError {
    ConnectError::Driver(e.to_string())
}

fn auth_method(password: &str) -> AuthMethod {
    if password.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    }
}

impl EspWifiDriver {
    pub fn new(
        modem: impl peripheral::Peripheral<P = Modem> + 'static,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        Ok(Self { wifi })
    }

    pub fn inner(&self) -> &BlockingWifi<EspWifi<'static>> {
        &self.wifi
    }
}

impl WifiDriver for EspWifiDriver {
    fn start_access_point(&mut self, ssid: &str, password: &str) -> Result<Ipv4Addr, ConnectError> {
        let config = AccessPointConfiguration {
            ssid: ssid
                .try_into()
                .map_err(|_| driver_error("SSID too long (max 32 chars)"))?,
            password: password
                .try_into()
                .map_err(|_| driver_error("password too long (max 64 chars)"))?,
            auth_method: auth_method(password),
            ..Default::default()
        };
        self.wifi
            .set_configuration(&Configuration::AccessPoint(config))
            .map_err(driver_error)?;
        self.wifi.start().map_err(driver_error)?;
        self.wifi.wait_netif_up().map_err(driver_error)?;

        let ip_info = self.wifi.wifi().ap_netif().get_ip_info().map_err(driver_error)?;
        info!("Access point '{}' up at {}", ssid, ip_info.ip);
        Ok(ip_info.ip)
    }

    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), ConnectError> {
        let config = ClientConfiguration {
            ssid: ssid
                .try_into()
                .map_err(|_| driver_error("SSID too long (max 32 chars)"))?,
            password: password
                .try_into()
                .map_err(|_| driver_error("password too long (max 64 chars)"))?,
            auth_method: auth_method(password),
            ..Default::default()
        };
        self.wifi
            .set_configuration(&Configuration::Client(config))
            .map_err(driver_error)?;
        if !self.wifi.is_started().map_err(driver_error)? {
            self.wifi.start().map_err(driver_error)?;
        }

        info!("Connecting to '{}'...", ssid);
        self.wifi.wifi_mut().connect().map_err(driver_error)?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        let associated = self.wifi.is_connected().unwrap_or(false);
        associated && self.wifi.wifi().sta_netif().is_up().unwrap_or(false)
    }

    fn configure_static(
        &mut self,
        ip: Ipv4Addr,
        gateway: Ipv4Addr,
        subnet: Ipv4Addr,
    ) -> Result<(), ConnectError> {
        let mask = Mask::try_from(subnet).map_err(|_| ConnectError::InvalidAddress {
            field: "subnet",
            value: subnet.to_string(),
        })?;
        let netif = EspNetif::new_with_conf(&NetifConfiguration {
            ip_configuration: Some(IpConfiguration::Client(IpClientConfiguration::Fixed(
                ClientSettings {
                    ip,
                    subnet: Subnet {
                        gateway,
                        mask,
                    },
                    dns: Some(gateway),
                    secondary_dns: None,
                },
            ))),
            ..NetifConfiguration::wifi_default_client()
        })
        .map_err(driver_error)?;

        self.wifi.wifi_mut().swap_netif_sta(netif).map_err(driver_error)?;
        info!("Static address {}/{} via {}", ip, mask.0, gateway);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ConnectError> {
        if let Err(e) = self.wifi.disconnect() {
            warn!("Disconnect failed: {}", e);
        }
        Ok(())
    }

    fn local_ip(&self) -> Ipv4Addr {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .map(|info| info.ip)
            .unwrap_or(Ipv4Addr::UNSPECIFIED)
    }

    fn subnet_mask(&self) -> Ipv4Addr {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .map(|info| Ipv4Addr::from(info.subnet.mask))
            .unwrap_or(Ipv4Addr::UNSPECIFIED)
    }

    fn gateway_ip(&self) -> Ipv4Addr {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .map(|info| info.subnet.gateway)
            .unwrap_or(Ipv4Addr::UNSPECIFIED)
    }
}
