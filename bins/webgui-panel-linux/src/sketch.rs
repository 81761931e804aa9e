//! Demo panel: an LED with brightness control, simulated sensors and a
//! network settings form persisted across restarts.

use std::net::Ipv4Addr;
use std::time::Instant;

use webgui_core::connectivity::{ConnectError, WifiDriver};
use webgui_core::{
    Button, ButtonStyle, ControlPanel, Handle, SensorStatus, SettingsError, SettingsStore, Slider,
    TextBox, Theme, Toggle,
};

const KEY_LED: &str = "led";
const KEY_BRIGHTNESS: &str = "brightness";
const KEY_SSID: &str = "ssid";
const KEY_STATIC_IP: &str = "static_ip";

/// Widgets and state of the demo panel.
pub struct Sketch {
    led: Handle<Toggle>,
    brightness: Handle<Slider>,
    save: Handle<Button>,
    clear: Handle<Button>,
    temperature: Handle<SensorStatus>,
    uptime: Handle<SensorStatus>,
    led_state: Handle<SensorStatus>,
    ssid: Handle<TextBox>,
    static_ip: Handle<TextBox>,
    status: Handle<SensorStatus>,
    settings: Box<dyn SettingsStore + Send>,
    started: Instant,
}

impl Sketch {
    /// Register the widgets on `panel` and restore saved values.
    pub fn setup(
        panel: &mut ControlPanel,
        settings: Box<dyn SettingsStore + Send>,
    ) -> Result<Self, SettingsError> {
        panel.set_title("WebGUI Demo");
        panel.set_theme(Theme::default());

        let led = panel.add_toggle("LED");
        let brightness = panel.add_slider("Brightness", 0, 255, 128);
        let led_state = panel.add_sensor_status("LED output");
        let temperature = panel.add_sensor_status("Temperature (C)");
        let uptime = panel.add_sensor_status("Uptime (s)");
        let ssid = panel.add_text_box("WiFi network", "network name");
        let static_ip = panel.add_text_box("Static IP", "192.168.1.100");
        let save = panel.add_button("Save settings");
        let clear = panel.add_button("Clear settings");
        let status = panel.add_sensor_status("Status");

        if let Some(slider) = panel.get_mut(brightness) {
            slider.set_debounce_ms(100);
        }
        if let Some(button) = panel.get_mut(clear) {
            button.set_style(ButtonStyle::Danger);
        }

        let mut sketch = Self {
            led,
            brightness,
            save,
            clear,
            temperature,
            uptime,
            led_state,
            ssid,
            static_ip,
            status,
            settings,
            started: Instant::now(),
        };
        sketch.restore(panel)?;
        Ok(sketch)
    }

    fn restore(&mut self, panel: &mut ControlPanel) -> Result<(), SettingsError> {
        let led = self.settings.load::<bool>(KEY_LED)?;
        let brightness = self.settings.load::<i32>(KEY_BRIGHTNESS)?;
        let ssid = self.settings.load::<String>(KEY_SSID)?;
        let static_ip = self.settings.load::<String>(KEY_STATIC_IP)?;

        if let Some(toggle) = panel.get_mut(self.led) {
            toggle.set_state(led);
        }
        if brightness > 0 {
            if let Some(slider) = panel.get_mut(self.brightness) {
                slider.set_value(brightness);
            }
        }
        if let Some(text) = panel.get_mut(self.ssid) {
            text.set_value(ssid);
        }
        if let Some(text) = panel.get_mut(self.static_ip) {
            text.set_value(static_ip);
        }
        self.set_status(panel, "Ready");
        tracing::info!("Restored settings: led={}, brightness={}", led, brightness);
        Ok(())
    }

    fn set_status(&self, panel: &mut ControlPanel, text: &str) {
        if let Some(status) = panel.get_mut(self.status) {
            status.set_text(text);
        }
    }

    /// React to browser input and refresh the readouts. Called after every
    /// dispatcher poll. Settings failures are logged and shown in the status
    /// readout; the panel keeps running.
    pub fn poll(&mut self, panel: &mut ControlPanel) {
        let led_on = panel.get(self.led).map(Toggle::is_on).unwrap_or(false);
        let level = panel.get(self.brightness).map(Slider::value).unwrap_or(0);

        if panel.get_mut(self.led).is_some_and(|t| t.was_toggled()) {
            tracing::info!("LED switched {}", if led_on { "on" } else { "off" });
        }
        if panel.get_mut(self.brightness).is_some_and(|s| s.was_changed()) {
            tracing::info!("Brightness set to {}", level);
        }
        if let Some(sensor) = panel.get_mut(self.led_state) {
            sensor.set_int(if led_on { i64::from(level) } else { 0 });
        }

        let seconds = self.started.elapsed().as_secs();
        if let Some(sensor) = panel.get_mut(self.uptime) {
            sensor.set_int(seconds as i64);
        }
        if let Some(sensor) = panel.get_mut(self.temperature) {
            let simulated = 21.0 + (seconds as f32 / 30.0).sin() * 1.5;
            sensor.set_float(simulated);
        }

        if panel.get_mut(self.ssid).is_some_and(|t| t.was_changed()) {
            self.set_status(panel, "Network name changed, press Save");
        }
        if panel.get_mut(self.static_ip).is_some_and(|t| t.was_changed()) {
            let valid = panel.get(self.static_ip).is_some_and(TextBox::has_valid_ip_address);
            let text = if valid { "Static IP valid, press Save" } else { "Invalid IP address" };
            self.set_status(panel, text);
        }

        if panel.get_mut(self.save).is_some_and(|b| b.was_pressed()) {
            if let Err(e) = self.save(panel) {
                tracing::error!("Failed to save settings: {}", e);
                self.set_status(panel, "Save failed");
            }
        }
        if panel.get_mut(self.clear).is_some_and(|b| b.was_pressed()) {
            match self.settings.clear_all() {
                Ok(()) => self.set_status(panel, "Settings cleared"),
                Err(e) => {
                    tracing::error!("Failed to clear settings: {}", e);
                    self.set_status(panel, "Clear failed");
                }
            }
        }
    }

    fn save(&mut self, panel: &mut ControlPanel) -> Result<(), SettingsError> {
        let led_on = panel.get(self.led).map(Toggle::is_on).unwrap_or(false);
        let level = panel.get(self.brightness).map(Slider::value).unwrap_or(0);
        let ssid = panel.get(self.ssid).map(|t| t.value().to_string()).unwrap_or_default();
        let ip = panel.get(self.static_ip).and_then(TextBox::ip_address).map(str::to_string);

        self.settings.save(KEY_LED, led_on)?;
        self.settings.save(KEY_BRIGHTNESS, level)?;
        self.settings.save(KEY_SSID, ssid)?;
        if let Some(ip) = ip {
            self.settings.save(KEY_STATIC_IP, ip)?;
        }

        self.set_status(panel, "Settings saved");
        tracing::info!("Settings saved");
        Ok(())
    }
}

/// WiFi stand-in for hosts: every join succeeds at once on a /24 around
/// the host address.
#[derive(Debug)]
pub struct HostWifi {
    host_ip: Ipv4Addr,
    static_ip: Option<(Ipv4Addr, Ipv4Addr, Ipv4Addr)>,
    connected: bool,
}

impl HostWifi {
    pub fn new(host_ip: Ipv4Addr) -> Self {
        Self {
            host_ip,
            static_ip: None,
            connected: false,
        }
    }
}

impl WifiDriver for HostWifi {
    fn start_access_point(&mut self, ssid: &str, _password: &str) -> Result<Ipv4Addr, ConnectError> {
        tracing::debug!("Host access point '{}' simulated", ssid);
        Ok(self.host_ip)
    }

    fn begin(&mut self, _ssid: &str, _password: &str) -> Result<(), ConnectError> {
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn configure_static(&mut self, ip: Ipv4Addr, gateway: Ipv4Addr, subnet: Ipv4Addr) -> Result<(), ConnectError> {
        self.static_ip = Some((ip, gateway, subnet));
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ConnectError> {
        self.connected = false;
        Ok(())
    }

    fn local_ip(&self) -> Ipv4Addr {
        self.static_ip.map(|(ip, _, _)| ip).unwrap_or(self.host_ip)
    }

    fn subnet_mask(&self) -> Ipv4Addr {
        self.static_ip
            .map(|(_, _, subnet)| subnet)
            .unwrap_or(Ipv4Addr::new(255, 255, 255, 0))
    }

    fn gateway_ip(&self) -> Ipv4Addr {
        match self.static_ip {
            Some((_, gateway, _)) => gateway,
            None => {
                let [a, b, c, _] = self.host_ip.octets();
                Ipv4Addr::new(a, b, c, 1)
            }
        }
    }
}
