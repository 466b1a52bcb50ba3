use crate::error::Result;
use crate::protocol::Values;
use crate::types::{decode_as, Fan, FanDir, Humidity, Mode, Name, Parameter, Power, Temperature};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Daikin unit, identified by its address
///
/// Discovery creates devices with only an address; the control and sensor
/// groups are filled in by [`DeviceClient`](crate::DeviceClient) fetches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Device {
    /// IPv4 address of the unit (an explicit `:port` is accepted)
    pub address: String,

    /// Human readable name, set by a basic info fetch
    #[serde(default)]
    pub name: Name,

    /// Bearer token sent with every request, if the unit requires one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Last fetched (or locally modified) control settings
    #[serde(default)]
    pub control: Option<ControlInfo>,

    /// Last fetched sensor readings
    #[serde(default)]
    pub sensor: Option<SensorInfo>,
}

impl Device {
    /// Create a device known only by address
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Create a device that authenticates with a bearer token
    pub fn with_token(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(address)
        }
    }

    /// Base URL of the unit's HTTP endpoints
    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name)?;
        if let Some(control) = &self.control {
            writeln!(f, "{}", control)?;
        }
        if let Some(sensor) = &self.sensor {
            write!(f, "{}", sensor)?;
        }
        Ok(())
    }
}

/// Settable control state of a unit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlInfo {
    pub power: Power,
    pub mode: Mode,
    pub fan: Fan,
    pub fan_dir: FanDir,
    /// Target temperature
    pub temperature: Temperature,
    /// Target humidity
    pub humidity: Humidity,
}

impl ControlInfo {
    /// Build control info from a `get_control_info` response
    pub fn from_values(values: &Values) -> Result<Self> {
        let mut info = Self::default();
        info.populate(values)?;
        Ok(info)
    }

    /// Decode every known key of `values` into `self`.
    ///
    /// Unknown keys are ignored. The first decode error is returned and
    /// leaves `self` partially updated.
    pub fn populate(&mut self, values: &Values) -> Result<()> {
        for (key, raw) in values {
            match key.as_str() {
                Power::KEY => self.power = Power::decode(raw)?,
                Mode::KEY => self.mode = Mode::decode(raw)?,
                Fan::KEY => self.fan = Fan::decode(raw)?,
                FanDir::KEY => self.fan_dir = FanDir::decode(raw)?,
                Temperature::KEY => self.temperature = Temperature::decode(raw)?,
                Humidity::KEY => self.humidity = Humidity::decode(raw)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Form fields for `set_control_info`, one per settable parameter
    pub fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            (Power::KEY, self.power.encode()),
            (Mode::KEY, self.mode.encode()),
            (Fan::KEY, self.fan.encode()),
            (FanDir::KEY, self.fan_dir.encode()),
            (Temperature::KEY, self.temperature.encode()),
            (Humidity::KEY, self.humidity.encode()),
        ]
    }
}

impl fmt::Display for ControlInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pow: {}\nmode: {}\nstemp: {}\nshum: {}\nf_rate: {}\nf_dir: {}",
            self.power, self.mode, self.temperature, self.humidity, self.fan, self.fan_dir
        )
    }
}

/// Sensor readings reported by a unit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorInfo {
    /// Indoor temperature
    pub home_temperature: Temperature,
    /// Outdoor temperature
    pub outside_temperature: Temperature,
    /// Indoor humidity
    pub humidity: Humidity,
}

impl SensorInfo {
    const HOME_TEMPERATURE: &'static str = "htemp";
    const OUTSIDE_TEMPERATURE: &'static str = "otemp";
    const HUMIDITY: &'static str = "hhum";

    /// Build sensor info from a `get_sensor_info` response
    pub fn from_values(values: &Values) -> Result<Self> {
        let mut info = Self::default();
        info.populate(values)?;
        Ok(info)
    }

    /// Decode every known key of `values` into `self`, see
    /// [`ControlInfo::populate`].
    pub fn populate(&mut self, values: &Values) -> Result<()> {
        for (key, raw) in values {
            match key.as_str() {
                Self::HOME_TEMPERATURE => self.home_temperature = decode_as(key, raw)?,
                Self::OUTSIDE_TEMPERATURE => self.outside_temperature = decode_as(key, raw)?,
                Self::HUMIDITY => self.humidity = decode_as(key, raw)?,
                _ => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for SensorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "in_temp: {}", self.home_temperature)?;
        writeln!(f, "in_humidity: {}", self.humidity)?;
        writeln!(f, "out_temp: {}", self.outside_temperature)
    }
}

/// Identity details from `/common/basic_info`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BasicInfo {
    pub name: Name,
    pub mac: String,
    /// Adapter firmware version
    pub firmware: String,
    /// Unit type, e.g. `aircon`
    pub kind: String,
}

impl BasicInfo {
    pub fn from_values(values: &Values) -> Result<Self> {
        let text = |key: &str| values.get(key).cloned().unwrap_or_default();
        let name = match values.get(Name::KEY) {
            Some(raw) => Name::decode(raw)?,
            None => Name::default(),
        };
        Ok(Self {
            name,
            mac: text("mac"),
            firmware: text("ver"),
            kind: text("type"),
        })
    }
}
