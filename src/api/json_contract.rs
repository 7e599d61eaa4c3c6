use serde::{Deserialize, Serialize};

use crate::core::ChartSlot;
use crate::error::{DashError, DashResult};
use crate::render::LayoutSpec;

use super::DashboardConfig;

pub const LAYOUT_JSON_SCHEMA_V1: u32 = 1;
pub const DASHBOARD_CONFIG_JSON_SCHEMA_V1: u32 = 1;

/// Layout of one slot as handed to host tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutJsonContractV1<'a> {
    pub schema_version: u32,
    pub slot: ChartSlot,
    pub option: &'a LayoutSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: DashboardConfig,
}

impl LayoutSpec {
    /// Bare ECharts option tree.
    pub fn to_option_json_pretty(&self) -> DashResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            DashError::MalformedSeries(format!("failed to serialize layout option: {e}"))
        })
    }

    pub fn to_json_contract_v1_pretty(&self, slot: ChartSlot) -> DashResult<String> {
        let payload = LayoutJsonContractV1 {
            schema_version: LAYOUT_JSON_SCHEMA_V1,
            slot,
            option: self,
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            DashError::MalformedSeries(format!("failed to serialize layout contract v1: {e}"))
        })
    }
}

impl DashboardConfig {
    pub fn to_json_contract_v1_pretty(&self) -> DashResult<String> {
        let payload = DashboardConfigJsonContractV1 {
            schema_version: DASHBOARD_CONFIG_JSON_SCHEMA_V1,
            config: *self,
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            DashError::InvalidConfig(format!("failed to serialize config contract v1: {e}"))
        })
    }

    /// Accepts either a bare config or a versioned contract, and validates it.
    pub fn from_json_compat_str(input: &str) -> DashResult<Self> {
        let config = match serde_json::from_str::<DashboardConfigJsonContractV1>(input) {
            Ok(payload) if payload.schema_version == DASHBOARD_CONFIG_JSON_SCHEMA_V1 => {
                payload.config
            }
            Ok(payload) => {
                return Err(DashError::InvalidConfig(format!(
                    "unsupported config schema version: {}",
                    payload.schema_version
                )));
            }
            Err(_) => serde_json::from_str::<DashboardConfig>(input).map_err(|e| {
                DashError::InvalidConfig(format!("failed to parse dashboard config: {e}"))
            })?,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::DashboardConfig;
    use crate::core::ChartSlot;
    use crate::render::{Color, LayoutSpec};

    #[test]
    fn layout_contract_carries_slot_and_version() {
        let spec = LayoutSpec::placeholder(Color::TRANSPARENT);
        let json = spec
            .to_json_contract_v1_pretty(ChartSlot::Derivative)
            .expect("contract");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["slot"], "derivChart");
        assert_eq!(value["option"]["backgroundColor"], "rgba(0,0,0,0)");
    }

    #[test]
    fn config_accepts_bare_and_versioned_payloads() {
        let config = DashboardConfig::default().with_fill_y_max(180.0);
        let versioned = config.to_json_contract_v1_pretty().expect("contract");
        assert_eq!(
            DashboardConfig::from_json_compat_str(&versioned).expect("versioned"),
            config
        );
        let bare = serde_json::to_string(&config).expect("bare");
        assert_eq!(DashboardConfig::from_json_compat_str(&bare).expect("bare"), config);
    }

    #[test]
    fn unknown_config_schema_is_rejected() {
        let error = DashboardConfig::from_json_compat_str(
            r#"{"schema_version": 7, "config": {}}"#,
        )
        .expect_err("schema 7 must fail");
        assert!(error.to_string().contains("unsupported config schema version: 7"));
    }
}
