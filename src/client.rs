use crate::config::ClientConfig;
use crate::device::{BasicInfo, ControlInfo, Device, SensorInfo};
use crate::error::{DaikinError, Result};
use crate::protocol::{ensure_ok, parse_response, paths, Values};
use reqwest::RequestBuilder;
use serde::Serialize;

/// HTTP client for the unit control protocol
///
/// One client can serve any number of devices. Operations on a single
/// [`Device`] take it by `&mut` where they store results, so a device's
/// fetch/modify/push cycle cannot interleave with itself.
///
/// # Example
///
/// ```no_run
/// use daikin_net::{Device, DeviceClient, Power};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = DeviceClient::new()?;
///     let mut device = Device::new("192.168.1.50");
///
///     client.fetch_control_info(&mut device).await?;
///     if let Some(control) = device.control.as_mut() {
///         control.power = Power::On;
///     }
///     client.push_control_info(&device).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
}

impl DeviceClient {
    /// Create a client with the default [`ClientConfig`]
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a client from explicit settings
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http })
    }

    /// Wrap an existing `reqwest` client
    pub fn from_reqwest(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// GET `path` from the device and frame the response
    pub async fn get(&self, device: &Device, path: &str) -> Result<Values> {
        let url = device.url(path);
        tracing::debug!("GET {}", url);
        self.exchange(device, self.http.get(url)).await
    }

    /// POST `fields` as a form to `path`; the device must answer `ret=OK`
    pub async fn set<T>(&self, device: &Device, path: &str, fields: &T) -> Result<Values>
    where
        T: Serialize + ?Sized,
    {
        let url = device.url(path);
        tracing::debug!("POST {}", url);
        let values = self.exchange(device, self.http.post(url).form(fields)).await?;
        ensure_ok(&values)?;
        Ok(values)
    }

    async fn exchange(&self, device: &Device, request: RequestBuilder) -> Result<Values> {
        let request = match &device.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let body = request.send().await?.error_for_status()?.text().await?;
        tracing::debug!("Received from {}: {}", device.address, body);
        parse_response(&body)
    }

    /// Fetch the control settings into `device.control`
    ///
    /// On failure `device.control` is left empty.
    pub async fn fetch_control_info(&self, device: &mut Device) -> Result<()> {
        device.control = None;
        let values = self.get(device, paths::CONTROL_INFO).await?;
        device.control = Some(ControlInfo::from_values(&values)?);
        Ok(())
    }

    /// Fetch the sensor readings into `device.sensor`
    ///
    /// On failure `device.sensor` is left empty.
    pub async fn fetch_sensor_info(&self, device: &mut Device) -> Result<()> {
        device.sensor = None;
        let values = self.get(device, paths::SENSOR_INFO).await?;
        device.sensor = Some(SensorInfo::from_values(&values)?);
        Ok(())
    }

    /// Fetch identity details and store the unit's name in `device.name`
    pub async fn fetch_basic_info(&self, device: &mut Device) -> Result<BasicInfo> {
        let values = self.get(device, paths::BASIC_INFO).await?;
        let info = BasicInfo::from_values(&values)?;
        device.name = info.name.clone();
        Ok(info)
    }

    /// Fetch both control settings and sensor readings
    pub async fn refresh(&self, device: &mut Device) -> Result<()> {
        self.fetch_control_info(device).await?;
        self.fetch_sensor_info(device).await
    }

    /// Send `device.control` to the unit
    pub async fn push_control_info(&self, device: &Device) -> Result<()> {
        let control = device.control.as_ref().ok_or(DaikinError::MissingControlInfo)?;
        self.set(device, paths::SET_CONTROL_INFO, &control.form_values())
            .await?;
        Ok(())
    }
}
