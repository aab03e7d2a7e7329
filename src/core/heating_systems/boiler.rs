use crate::core::common::{AdvisoryCode, AdvisoryNote};
use crate::core::heating_systems::boiler_catalog::lookup_seasonal_efficiency;
use crate::core::units::round_to;
use crate::input::{BoilerInputs, BoilerType};
use serde::Serialize;
use strum::Display;
use tracing::debug;

/// This module resolves the seasonal efficiency a boiler will achieve in a
/// given home, starting from the best available baseline and derating it for
/// age and for oversizing against the building's peak heat loss.

const EFFICIENCY_MIN: f64 = 0.55;
const EFFICIENCY_MAX: f64 = 0.95;
pub const UNKNOWN_EFFICIENCY: f64 = 0.84;

/// Share of nominal output below which the boiler is assumed to cycle
const LOW_LOAD_FRACTION: f64 = 0.2;
const LOW_LOAD_PENALTY: f64 = 0.02;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BaselineSource {
    CatalogLookup,
    SuppliedPercentage,
    BandEstimate,
    UnknownDefault,
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OversizeBand {
    WellMatched,
    MildOversize,
    Oversized,
    Aggressive,
}

impl OversizeBand {
    pub fn classify(ratio: f64) -> Self {
        match ratio {
            r if r <= 1.3 => OversizeBand::WellMatched,
            r if r <= 1.8 => OversizeBand::MildOversize,
            r if r <= 2.5 => OversizeBand::Oversized,
            _ => OversizeBand::Aggressive,
        }
    }

    /// Fractional efficiency lost to short-cycling
    pub fn penalty(&self) -> f64 {
        match self {
            OversizeBand::WellMatched => 0.,
            OversizeBand::MildOversize => 0.03,
            OversizeBand::Oversized => 0.06,
            OversizeBand::Aggressive => 0.09,
        }
    }
}

fn clamp_efficiency(efficiency: f64) -> f64 {
    round_to(efficiency.clamp(EFFICIENCY_MIN, EFFICIENCY_MAX), 3)
}

/// Age degradation factor, stepped by five-year bands
pub fn age_factor(age_years: f64) -> f64 {
    match age_years {
        age if age <= 5. => 1.00,
        age if age <= 10. => 0.97,
        age if age <= 15. => 0.94,
        age if age <= 20. => 0.91,
        _ => 0.88,
    }
}

/// Typical seasonal efficiency from condensing status and age, for boilers
/// without a catalog entry or a quoted figure.
pub(crate) fn band_estimate(condensing: Option<bool>, age_years: Option<f64>) -> Option<f64> {
    match (condensing, age_years) {
        (Some(true), _) => Some(0.88),
        (Some(false), Some(age)) if age > 20. => Some(0.70),
        (Some(false), _) => Some(0.78),
        // condensing boilers became mandatory in 2005, so a young boiler very likely is one
        (None, Some(age)) if age <= 15. => Some(0.85),
        (None, Some(_)) => Some(0.75),
        (None, None) => None,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoilerEfficiencyModel {
    pub baseline: f64,
    pub baseline_source: BaselineSource,
    pub age_factor: f64,
    pub age_adjusted: f64,
    pub oversize_ratio: Option<f64>,
    pub oversize_band: OversizeBand,
    pub oversize_penalty: f64,
    /// Efficiency to expect in this home once age and sizing are applied
    pub in_context: f64,
    pub shaped_series: Option<Vec<f64>>,
    pub notes: Vec<AdvisoryNote>,
    #[serde(skip)]
    nominal_output_kw: Option<f64>,
}

impl BoilerEfficiencyModel {
    pub fn new(inputs: &BoilerInputs) -> Self {
        let mut notes = vec![];

        let (baseline, baseline_source) = Self::resolve_baseline(inputs, &mut notes);

        let age_factor = match inputs.age_years {
            Some(age) => age_factor(age),
            None => {
                notes.push(AdvisoryNote::new(
                    AdvisoryCode::BoilerAgeUnknown,
                    "Boiler age unknown; no age degradation applied",
                ));
                1.0
            }
        };
        let age_adjusted = clamp_efficiency(baseline * age_factor);

        let oversize_ratio = if matches!(inputs.boiler_type, Some(BoilerType::Combi)) {
            match (inputs.nominal_output_kw, inputs.peak_heat_loss_kw) {
                (Some(output), Some(peak)) if peak > 0. => Some(output / peak),
                _ => {
                    notes.push(AdvisoryNote::new(
                        AdvisoryCode::PeakHeatLossUnknown,
                        "Oversize ratio unavailable; assuming the boiler is well matched",
                    ));
                    None
                }
            }
        } else {
            None
        };
        let oversize_band = oversize_ratio
            .map(OversizeBand::classify)
            .unwrap_or(OversizeBand::WellMatched);
        let oversize_penalty = oversize_band.penalty();

        let in_context = clamp_efficiency(age_adjusted * (1. - oversize_penalty));

        debug!(
            baseline,
            %baseline_source,
            age_adjusted,
            %oversize_band,
            in_context,
            "resolved boiler efficiency"
        );

        Self {
            baseline,
            baseline_source,
            age_factor,
            age_adjusted,
            oversize_ratio,
            oversize_band,
            oversize_penalty,
            in_context,
            shaped_series: None,
            notes,
            nominal_output_kw: inputs.nominal_output_kw,
        }
    }

    fn resolve_baseline(
        inputs: &BoilerInputs,
        notes: &mut Vec<AdvisoryNote>,
    ) -> (f64, BaselineSource) {
        if let Some(nameplate) = &inputs.nameplate_id {
            if let Some(efficiency) = lookup_seasonal_efficiency(nameplate) {
                return (clamp_efficiency(efficiency), BaselineSource::CatalogLookup);
            }
            notes.push(AdvisoryNote::new(
                AdvisoryCode::BoilerNameplateUnresolved,
                format!("Nameplate '{nameplate}' not found in catalog; estimating instead"),
            ));
        }

        if let Some(percent) = inputs.efficiency_percent {
            return (
                clamp_efficiency(percent / 100.),
                BaselineSource::SuppliedPercentage,
            );
        }

        if let Some(efficiency) = band_estimate(inputs.condensing, inputs.age_years) {
            return (clamp_efficiency(efficiency), BaselineSource::BandEstimate);
        }

        notes.push(AdvisoryNote::new(
            AdvisoryCode::BoilerEfficiencyUnknown,
            format!("No boiler details to estimate from; assuming {UNKNOWN_EFFICIENCY}"),
        ));
        (UNKNOWN_EFFICIENCY, BaselineSource::UnknownDefault)
    }

    pub fn nominal_output_kw(&self) -> Option<f64> {
        self.nominal_output_kw
    }

    /// Efficiency for a slice with the given load. Loads under a fifth of
    /// nominal output take a fixed cycling penalty.
    pub fn efficiency_at_load(&self, load_kw: f64) -> f64 {
        match self.nominal_output_kw {
            Some(nominal) if load_kw < LOW_LOAD_FRACTION * nominal => {
                clamp_efficiency(self.in_context - LOW_LOAD_PENALTY)
            }
            _ => self.in_context,
        }
    }

    pub fn shape_series(&self, demand_kw: &[f64]) -> Vec<f64> {
        demand_kw
            .iter()
            .map(|load| self.efficiency_at_load(*load))
            .collect()
    }

    pub fn with_demand_series(mut self, demand_kw: &[f64]) -> Self {
        self.shaped_series = Some(self.shape_series(demand_kw));
        self
    }
}
