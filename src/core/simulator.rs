use crate::core::common::AdvisoryNote;
use crate::core::delivery::{DeliveryRule, PurgeState, SliceContext, SystemOutput, SystemRule};
use crate::core::demand::profile::DemandProfile;
use crate::core::demand::{demand_series, DemandSlice};
use crate::core::heating_systems::boiler::BoilerEfficiencyModel;
use crate::core::heating_systems::heat_pump::DesignRegime;
use crate::errors::SimulationError;
use crate::input::{BuildingInputs, SystemArchetype, SystemSpec};
use crate::resolution::Resolution;
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// One slice of the day, with both compared systems on identical demand
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationRow {
    pub slice_index: usize,
    pub start_hour: f64,
    pub demand: DemandSlice,
    pub system_a: SystemOutput,
    pub system_b: SystemOutput,
}

/// How a compared system was resolved before the day was run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SystemDetails {
    pub archetype: SystemArchetype,
    pub boiler: Option<BoilerEfficiencyModel>,
    pub design_regime: Option<DesignRegime>,
}

impl SystemDetails {
    fn from_rule(archetype: SystemArchetype, rule: &SystemRule, demand: &[DemandSlice]) -> Self {
        let space_heat_kw = demand.iter().map(|slice| slice.space_heat_kw).collect_vec();
        Self {
            archetype,
            boiler: rule
                .boiler_model()
                .map(|model| model.clone().with_demand_series(&space_heat_kw)),
            design_regime: rule.design_regime().cloned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationResult {
    pub resolution: Resolution,
    pub system_a: SystemArchetype,
    pub system_b: SystemArchetype,
    pub hourly: Vec<SimulationRow>,
    pub notes: Vec<AdvisoryNote>,
    pub system_a_details: SystemDetails,
    pub system_b_details: SystemDetails,
}

impl SimulationResult {
    pub fn demand(&self) -> impl Iterator<Item = &DemandSlice> {
        self.hourly.iter().map(|row| &row.demand)
    }
}

/// Run one day for two systems over the same demand.
///
/// All inputs are checked against the profile's resolution before any slice
/// is computed. Slices are processed in order because a combi's purge
/// depends on whether the previous slice drew hot water.
pub fn simulate(
    building: &BuildingInputs,
    profile: &DemandProfile,
    system_a: &SystemSpec,
    system_b: &SystemSpec,
    ashp_spf_midpoint: f64,
) -> Result<SimulationResult, SimulationError> {
    let resolution = profile.resolution();
    profile.check_lengths()?;
    if let Some(outdoor_temperatures_c) = &building.outdoor_temperatures_c {
        resolution.check_length("outdoor_temperatures_c", outdoor_temperatures_c.len())?;
    }

    debug!(
        resolution_minutes = resolution.minutes(),
        slices = resolution.slice_count(),
        system_a = %system_a.archetype,
        system_b = %system_b.archetype,
        "simulating day"
    );

    let demand = demand_series(building, profile)?;

    let mut notes = vec![];
    let rule_a = SystemRule::for_system(system_a, building, ashp_spf_midpoint, &mut notes);
    let rule_b = SystemRule::for_system(system_b, building, ashp_spf_midpoint, &mut notes);

    let slice_hours = resolution.slice_hours();
    let hourly = resolution
        .iter()
        .zip(demand.iter())
        .scan(
            (PurgeState::default(), PurgeState::default()),
            |states, (slice, slice_demand)| {
                let context = SliceContext {
                    slice,
                    slice_hours,
                    outdoor_temp_c: building
                        .outdoor_temperatures_c
                        .as_ref()
                        .map(|temperatures| temperatures[slice.index]),
                };
                let (output_a, next_a) = rule_a.deliver(slice_demand, &context, states.0);
                let (output_b, next_b) = rule_b.deliver(slice_demand, &context, states.1);
                *states = (next_a, next_b);

                Some(SimulationRow {
                    slice_index: slice.index,
                    start_hour: slice.start_hour(),
                    demand: *slice_demand,
                    system_a: output_a,
                    system_b: output_b,
                })
            },
        )
        .collect();

    Ok(SimulationResult {
        resolution,
        system_a: system_a.archetype,
        system_b: system_b.archetype,
        hourly,
        notes,
        system_a_details: SystemDetails::from_rule(system_a.archetype, &rule_a, &demand),
        system_b_details: SystemDetails::from_rule(system_b.archetype, &rule_b, &demand),
    })
}

/// Run several independent system pairs over the same building and profile.
/// Pairs are spread over the rayon pool; each day is still run slice by slice.
pub fn compare_pairs(
    building: &BuildingInputs,
    profile: &DemandProfile,
    pairs: &[(SystemSpec, SystemSpec)],
    ashp_spf_midpoint: f64,
) -> Result<Vec<SimulationResult>, SimulationError> {
    pairs
        .par_iter()
        .map(|(system_a, system_b)| {
            simulate(building, profile, system_a, system_b, ashp_spf_midpoint)
        })
        .collect()
}
