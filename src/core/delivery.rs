use crate::core::common::{AdvisoryCode, AdvisoryNote};
use crate::core::demand::DemandSlice;
use crate::core::heating_systems::boiler::BoilerEfficiencyModel;
use crate::core::heating_systems::heat_pump::{
    clamp_cop, select_design_regime, shaped_cop, DesignRegime, DESIGN_OUTDOOR_TEMP_C,
};
use crate::core::units::watts_to_kilowatts;
use crate::input::{BuildingInputs, SystemArchetype, SystemSpec};
use crate::resolution::Slice;
use serde::Serialize;

/// This module holds the per-archetype delivery rules. Each rule turns one
/// slice of system-independent demand into what the system actually delivers,
/// threading a small state record from slice to slice.

pub const BOILER_NOMINAL_EFFICIENCY: f64 = 0.92;
/// Efficiency lost while a combi diverts its single heat exchanger to hot water
const SERVICE_SWITCH_PENALTY: f64 = 0.04;
const COMBI_EFFICIENCY_MIN: f64 = 0.50;
const COMBI_EFFICIENCY_MAX: f64 = 0.99;

/// Net heat removed from the hot water service while standing cold water is flushed, in kWh
pub const PURGE_NET_LOSS_KWH: f64 = 0.05;
/// Heat sent down the drain with the flushed water, in kWh
pub const PURGE_DUMPED_KWH: f64 = 0.10;
/// Fuel burned during the purge, in kWh
pub const PURGE_FUEL_INPUT_KWH: f64 = 0.12;

/// Hour of day before which a heat pump sees the cold-morning CoP dip
const COLD_MORNING_END_HOUR: f64 = 7.;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PurgeState {
    pub was_idle_last_slice: bool,
}

impl Default for PurgeState {
    /// The day starts with the heat exchanger standing idle
    fn default() -> Self {
        Self {
            was_idle_last_slice: true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SliceContext {
    pub slice: Slice,
    pub slice_hours: f64,
    pub outdoor_temp_c: Option<f64>,
}

/// What one system delivers in one slice
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SystemOutput {
    pub space_heat_kw: f64,
    /// Negative during a combi purge
    pub dhw_kw: f64,
    pub efficiency_or_cop: f64,
    pub dumped_kw: f64,
    /// Fuel or electricity drawn
    pub input_kw: f64,
    pub purge: bool,
}

pub trait DeliveryRule {
    fn deliver(
        &self,
        demand: &DemandSlice,
        context: &SliceContext,
        state: PurgeState,
    ) -> (SystemOutput, PurgeState);
}

/// Where a boiler rule gets its efficiency from
#[derive(Clone, Debug, PartialEq)]
pub enum BoilerPerformance {
    Nominal,
    Modelled(BoilerEfficiencyModel),
}

impl BoilerPerformance {
    fn base_efficiency(&self) -> f64 {
        match self {
            BoilerPerformance::Nominal => BOILER_NOMINAL_EFFICIENCY,
            BoilerPerformance::Modelled(model) => model.in_context,
        }
    }

    fn efficiency_at_load(&self, load_kw: f64) -> f64 {
        match self {
            BoilerPerformance::Nominal => BOILER_NOMINAL_EFFICIENCY,
            BoilerPerformance::Modelled(model) => model.efficiency_at_load(load_kw),
        }
    }

    pub fn model(&self) -> Option<&BoilerEfficiencyModel> {
        match self {
            BoilerPerformance::Nominal => None,
            BoilerPerformance::Modelled(model) => Some(model),
        }
    }
}

fn input_for(output_kw: f64, efficiency: f64) -> f64 {
    if output_kw == 0. {
        0.
    } else {
        output_kw / efficiency
    }
}

/// Combi boiler: one heat exchanger, so hot water pre-empts space heating.
#[derive(Clone, Debug, PartialEq)]
pub struct CombiRule {
    pub performance: BoilerPerformance,
}

impl DeliveryRule for CombiRule {
    fn deliver(
        &self,
        demand: &DemandSlice,
        context: &SliceContext,
        state: PurgeState,
    ) -> (SystemOutput, PurgeState) {
        if !demand.has_dhw_draw() {
            let efficiency = self.performance.efficiency_at_load(demand.space_heat_kw);
            let output = SystemOutput {
                space_heat_kw: demand.space_heat_kw,
                efficiency_or_cop: efficiency,
                input_kw: input_for(demand.space_heat_kw, efficiency),
                ..Default::default()
            };
            return (
                output,
                PurgeState {
                    was_idle_last_slice: true,
                },
            );
        }

        let output = if state.was_idle_last_slice {
            // Energy per event is fixed, so shorter slices report a higher power
            SystemOutput {
                space_heat_kw: 0.,
                dhw_kw: -PURGE_NET_LOSS_KWH / context.slice_hours,
                efficiency_or_cop: COMBI_EFFICIENCY_MIN,
                dumped_kw: PURGE_DUMPED_KWH / context.slice_hours,
                input_kw: PURGE_FUEL_INPUT_KWH / context.slice_hours,
                purge: true,
            }
        } else {
            let efficiency = (self.performance.base_efficiency() - SERVICE_SWITCH_PENALTY)
                .clamp(COMBI_EFFICIENCY_MIN, COMBI_EFFICIENCY_MAX);
            SystemOutput {
                space_heat_kw: 0.,
                dhw_kw: demand.dhw_kw,
                efficiency_or_cop: efficiency,
                dumped_kw: 0.,
                input_kw: input_for(demand.dhw_kw, efficiency),
                purge: false,
            }
        };

        (
            output,
            PurgeState {
                was_idle_last_slice: false,
            },
        )
    }
}

/// Boiler with a hot water cylinder: both services run side by side.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredRule {
    pub performance: BoilerPerformance,
}

impl DeliveryRule for StoredRule {
    fn deliver(
        &self,
        demand: &DemandSlice,
        _context: &SliceContext,
        state: PurgeState,
    ) -> (SystemOutput, PurgeState) {
        let efficiency = self.performance.efficiency_at_load(demand.space_heat_kw);
        let delivered = demand.space_heat_kw + demand.dhw_kw;
        (
            SystemOutput {
                space_heat_kw: demand.space_heat_kw,
                dhw_kw: demand.dhw_kw,
                efficiency_or_cop: efficiency,
                dumped_kw: 0.,
                input_kw: input_for(delivered, efficiency),
                purge: false,
            },
            state,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeatPumpRule {
    pub spf: f64,
    pub regime: DesignRegime,
}

impl HeatPumpRule {
    fn cop_for(&self, context: &SliceContext) -> f64 {
        match context.outdoor_temp_c {
            Some(outdoor_temp_c) => shaped_cop(self.spf, outdoor_temp_c, self.regime.flow_temp_c),
            None if context.slice.starts_within(0., COLD_MORNING_END_HOUR) => {
                shaped_cop(self.spf, DESIGN_OUTDOOR_TEMP_C, self.regime.flow_temp_c)
            }
            None => clamp_cop(self.spf),
        }
    }
}

impl DeliveryRule for HeatPumpRule {
    fn deliver(
        &self,
        demand: &DemandSlice,
        context: &SliceContext,
        state: PurgeState,
    ) -> (SystemOutput, PurgeState) {
        let cop = self.cop_for(context);
        let delivered = demand.space_heat_kw + demand.dhw_kw;
        (
            SystemOutput {
                space_heat_kw: demand.space_heat_kw,
                dhw_kw: demand.dhw_kw,
                efficiency_or_cop: cop,
                dumped_kw: 0.,
                input_kw: input_for(delivered, cop),
                purge: false,
            },
            state,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SystemRule {
    Combi(CombiRule),
    Stored(StoredRule),
    HeatPump(HeatPumpRule),
}

impl SystemRule {
    /// Build the rule for a compared system. Boiler details are completed from
    /// the building where missing; any fallbacks are pushed onto `notes`.
    pub fn for_system(
        spec: &SystemSpec,
        building: &BuildingInputs,
        spf: f64,
        notes: &mut Vec<AdvisoryNote>,
    ) -> Self {
        let performance = || match &spec.boiler {
            Some(inputs) => {
                let mut inputs = inputs.clone();
                inputs.boiler_type = spec.archetype.boiler_type();
                if inputs.peak_heat_loss_kw.is_none() && building.heat_loss_watts > 0. {
                    inputs.peak_heat_loss_kw = Some(watts_to_kilowatts(building.heat_loss_watts));
                }
                BoilerPerformance::Modelled(BoilerEfficiencyModel::new(&inputs))
            }
            None => BoilerPerformance::Nominal,
        };

        let rule = match spec.archetype {
            SystemArchetype::Combi => SystemRule::Combi(CombiRule {
                performance: performance(),
            }),
            SystemArchetype::StoredVented | SystemArchetype::StoredUnvented => {
                SystemRule::Stored(StoredRule {
                    performance: performance(),
                })
            }
            SystemArchetype::AirSourceHeatPump => {
                if spec.boiler.is_some() {
                    notes.push(AdvisoryNote::new(
                        AdvisoryCode::BoilerDetailsIgnored,
                        "Boiler details were supplied for a heat pump and have been ignored",
                    ));
                }
                SystemRule::HeatPump(HeatPumpRule {
                    spf,
                    regime: select_design_regime(building.emitter_upgrade_appetite),
                })
            }
        };

        if let Some(model) = rule.boiler_model() {
            notes.extend(model.notes.iter().cloned());
        }

        rule
    }

    pub fn boiler_model(&self) -> Option<&BoilerEfficiencyModel> {
        match self {
            SystemRule::Combi(CombiRule { performance })
            | SystemRule::Stored(StoredRule { performance }) => performance.model(),
            SystemRule::HeatPump(_) => None,
        }
    }

    pub fn design_regime(&self) -> Option<&DesignRegime> {
        match self {
            SystemRule::HeatPump(rule) => Some(&rule.regime),
            _ => None,
        }
    }
}

impl DeliveryRule for SystemRule {
    fn deliver(
        &self,
        demand: &DemandSlice,
        context: &SliceContext,
        state: PurgeState,
    ) -> (SystemOutput, PurgeState) {
        match self {
            SystemRule::Combi(rule) => rule.deliver(demand, context, state),
            SystemRule::Stored(rule) => rule.deliver(demand, context, state),
            SystemRule::HeatPump(rule) => rule.deliver(demand, context, state),
        }
    }
}
