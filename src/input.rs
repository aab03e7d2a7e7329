use crate::core::demand::profile::{DemandProfile, HeatIntent, Provenance};
use crate::core::heating_systems::heat_pump::EmitterUpgradeAppetite;
use crate::errors::SimulationError;
use crate::resolution::Resolution;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::io::{BufReader, Read};
use strum::Display;

pub fn ingest_for_processing(json: impl Read) -> Result<ComparisonInput, anyhow::Error> {
    let input: ComparisonInput = serde_json::from_reader(BufReader::new(json))?;
    input
        .validate()
        .map_err(|errors| anyhow!("Input failed validation: {errors}"))?;

    Ok(input)
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ComparisonInput {
    #[serde(default)]
    pub resolution_minutes: Resolution,
    #[validate]
    pub building: BuildingInputs,
    /// Painted profile; when absent one is derived from the building
    pub profile: Option<ProfileInput>,
    #[validate]
    pub system_a: SystemSpec,
    #[validate]
    pub system_b: SystemSpec,
    #[validate(minimum = 1.5)]
    #[validate(maximum = 5.0)]
    pub ashp_spf_midpoint: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BuildingInputs {
    /// Peak (design-day) heat loss, in W
    #[validate(minimum = 0.)]
    pub heat_loss_watts: f64,
    #[validate(maximum = 10)]
    pub bathroom_count: u32,
    #[serde(default)]
    pub occupancy: OccupancyPattern,
    #[serde(default)]
    pub emitter_upgrade_appetite: EmitterUpgradeAppetite,
    /// Outdoor temperature per slice, in deg C. Enables hour-by-hour heat pump CoP.
    #[serde(default)]
    pub outdoor_temperatures_c: Option<Vec<f64>>,
}

impl BuildingInputs {
    pub fn new(heat_loss_watts: f64, bathroom_count: u32) -> Self {
        Self {
            heat_loss_watts,
            bathroom_count,
            occupancy: Default::default(),
            emitter_upgrade_appetite: Default::default(),
            outdoor_temperatures_c: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyPattern {
    #[default]
    AwayDaytime,
    HomeAllDay,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileInput {
    pub heat_intent: Vec<HeatIntent>,
    pub dhw_lpm: Vec<f64>,
    pub cold_draw_lpm: Vec<f64>,
    #[serde(default = "ProfileInput::default_provenance")]
    pub provenance: Provenance,
}

impl ProfileInput {
    fn default_provenance() -> Provenance {
        Provenance::UserEdit
    }

    pub fn into_profile(self, resolution: Resolution) -> Result<DemandProfile, SimulationError> {
        DemandProfile::from_arrays(
            resolution,
            self.heat_intent,
            self.dhw_lpm,
            self.cold_draw_lpm,
            self.provenance,
        )
    }
}

/// Which physical rule set a compared system follows
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SystemArchetype {
    Combi,
    StoredVented,
    StoredUnvented,
    AirSourceHeatPump,
}

impl SystemArchetype {
    pub fn is_boiler(&self) -> bool {
        !matches!(self, SystemArchetype::AirSourceHeatPump)
    }

    pub fn boiler_type(&self) -> Option<BoilerType> {
        match self {
            SystemArchetype::Combi => Some(BoilerType::Combi),
            SystemArchetype::StoredVented => Some(BoilerType::Regular),
            SystemArchetype::StoredUnvented => Some(BoilerType::System),
            SystemArchetype::AirSourceHeatPump => None,
        }
    }

    /// Column label for the performance figure this archetype reports
    pub fn performance_label(&self) -> &'static str {
        if self.is_boiler() {
            "efficiency"
        } else {
            "cop"
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SystemSpec {
    pub archetype: SystemArchetype,
    #[serde(default)]
    #[validate]
    pub boiler: Option<BoilerInputs>,
}

impl SystemSpec {
    pub fn new(archetype: SystemArchetype) -> Self {
        Self {
            archetype,
            boiler: None,
        }
    }

    pub fn with_boiler(archetype: SystemArchetype, boiler: BoilerInputs) -> Self {
        Self {
            archetype,
            boiler: Some(boiler),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoilerType {
    Combi,
    System,
    Regular,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BoilerInputs {
    #[serde(default)]
    pub boiler_type: Option<BoilerType>,
    #[serde(default)]
    pub nameplate_id: Option<String>,
    /// Seasonal efficiency as a percentage, e.g. 89.0
    #[serde(default)]
    #[validate(minimum = 30.)]
    #[validate(maximum = 110.)]
    pub efficiency_percent: Option<f64>,
    #[serde(default)]
    pub condensing: Option<bool>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub age_years: Option<f64>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub nominal_output_kw: Option<f64>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub peak_heat_loss_kw: Option<f64>,
}
