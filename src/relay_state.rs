use crate::{error::Result, shutter::RelayPort};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const SWITCH_PREFIX: &str = "Switch";
const ON: &str = "ON";

/// Momentary on/off view of the device relays
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayStates(BTreeMap<RelayPort, bool>);

impl RelayStates {
    pub fn is_on(&self, port: RelayPort) -> bool {
        self.0.get(&port).copied().unwrap_or(false)
    }

    /// False if any of the ports is off or missing from the snapshot
    pub fn all_on(&self, ports: &[RelayPort]) -> bool {
        ports.iter().all(|port| self.is_on(*port))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(RelayPort, bool)> for RelayStates {
    fn from_iter<I: IntoIterator<Item = (RelayPort, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(rename = "StatusSNS")]
    status_sns: Option<Map<String, Value>>,
}

/// Parse the answer to `Status 8`
///
/// Every `SwitchN` property of `StatusSNS` becomes port N, lit only when the
/// value is exactly `"ON"`. A payload without `StatusSNS` yields no states.
pub fn parse_status(body: &str) -> Result<RelayStates> {
    let response: StatusResponse = serde_json::from_str(body)?;
    let Some(sensors) = response.status_sns else {
        return Ok(RelayStates::default());
    };

    Ok(sensors
        .iter()
        .filter_map(|(name, value)| {
            let port = name.strip_prefix(SWITCH_PREFIX)?.parse::<u8>().ok()?;
            Some((RelayPort(port), value.as_str() == Some(ON)))
        })
        .collect())
}
