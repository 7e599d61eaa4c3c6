use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::core::{SensorSeries, SensorSnapshot, SnapshotPayload, TimeSeriesSet};
use crate::error::{DashError, DashResult};

/// Responses nest at most this many JSON-in-a-string layers.
const MAX_ENCODING_LAYERS: usize = 3;

/// Decodes a response body that may be JSON text wrapped in JSON strings.
///
/// The backend answers some endpoints with `json.dumps` output sent as a JSON
/// string, so the payload has to be unwrapped before the real shape appears.
pub fn decode_layered<T: DeserializeOwned>(body: &str) -> DashResult<T> {
    let mut current = body.trim().to_owned();
    for _ in 0..MAX_ENCODING_LAYERS {
        match serde_json::from_str::<String>(&current) {
            Ok(inner) => current = inner,
            Err(_) => break,
        }
    }
    serde_json::from_str(&current)
        .map_err(|e| DashError::DataUnavailable(format!("undecodable response: {e}")))
}

/// Latest values keyed by measurement point, in response order.
pub fn decode_latest(body: &str) -> DashResult<IndexMap<String, SensorSnapshot>> {
    let payloads: IndexMap<String, SnapshotPayload> = decode_layered(body)?;
    payloads
        .into_iter()
        .map(|(point, payload)| {
            let snapshot = SensorSnapshot::try_from(payload).map_err(|error| match error {
                DashError::MalformedSeries(detail) => {
                    DashError::MalformedSeries(format!("point `{point}`: {detail}"))
                }
                other => other,
            })?;
            Ok((point, snapshot))
        })
        .collect()
}

/// Range histories keyed by measurement point, in response order.
pub fn decode_range(body: &str) -> DashResult<IndexMap<String, TimeSeriesSet>> {
    let payloads: IndexMap<String, Vec<SensorSeries>> = decode_layered(body)?;
    payloads
        .into_iter()
        .map(|(point, series)| Ok((point, TimeSeriesSet::new(series)?)))
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AvailablePoints {
    Names(Vec<String>),
    Keyed(IndexMap<String, serde_json::Value>),
}

/// Point names from either a plain list or a map keyed by point name.
pub fn decode_available_points(body: &str) -> DashResult<Vec<String>> {
    Ok(match decode_layered(body)? {
        AvailablePoints::Names(names) => names,
        AvailablePoints::Keyed(points) => points.into_keys().collect(),
    })
}

/// Encodes a request body the way the backend reads it: JSON text sent as a
/// JSON string.
pub fn encode_layered<T: serde::Serialize>(value: &T) -> DashResult<String> {
    let inner = serde_json::to_string(value)
        .map_err(|e| DashError::InvalidConfig(format!("failed to encode request: {e}")))?;
    serde_json::to_string(&inner)
        .map_err(|e| DashError::InvalidConfig(format!("failed to encode request: {e}")))
}
