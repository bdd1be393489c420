use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::AttendanceError;
use crate::model::sensor_log::{NewSensorLog, SensorLog};
use crate::store::SensorStore;

/// Ingestion and history of device sensor samples.
#[derive(Clone)]
pub struct SensorLogService {
    store: Arc<dyn SensorStore>,
    history_limit: u32,
}

impl SensorLogService {
    pub fn new(store: Arc<dyn SensorStore>, history_limit: u32) -> Self {
        Self {
            store,
            history_limit,
        }
    }

    pub async fn record(&self, sample: NewSensorLog) -> Result<SensorLog, AttendanceError> {
        let stored = self.store.insert(sample).await?;
        info!(
            temperature = stored.temperature,
            humidity = stored.humidity,
            light = stored.light,
            "Sensor sample saved"
        );
        Ok(stored)
    }

    /// The newest samples in chronological order.
    pub async fn history(&self) -> Result<Vec<SensorLog>, AttendanceError> {
        Ok(self.store.latest(self.history_limit).await?)
    }
}

/// Builds a sample from a device payload.
///
/// `suhu` and `kelembaban` are required and may arrive as numbers or numeric
/// strings. `cahaya` is an integer read from the leading digits of its value
/// (`"12lx"` is 12) and falls back to 0 when absent or unparsable.
pub fn parse_sample(payload: &Value) -> Result<NewSensorLog, AttendanceError> {
    let temperature = number_field(payload, "suhu");
    let humidity = number_field(payload, "kelembaban");

    let (Some(temperature), Some(humidity)) = (temperature, humidity) else {
        return Err(AttendanceError::validation(
            "Temperature or humidity data is invalid",
        ));
    };

    let light = light_field(payload).unwrap_or(0);

    Ok(NewSensorLog {
        temperature,
        humidity,
        light,
    })
}

fn light_field(payload: &Value) -> Option<i32> {
    match payload.get("cahaya")? {
        Value::Number(n) => {
            let v = n.as_f64()?.trunc();
            (v >= i32::MIN as f64 && v <= i32::MAX as f64).then_some(v as i32)
        }
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

/// Optional sign followed by at least one digit; trailing text is ignored.
fn leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['-', '+']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

fn number_field(payload: &Value, key: &str) -> Option<f64> {
    let value = match payload.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}
