use crate::errors::SimulationError;
use crate::input::{BuildingInputs, OccupancyPattern};
use crate::resolution::{Resolution, Slice};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::ops::Range;

/// Draw rates (L/min) a painted hot water intensity can take
pub const DHW_INTENSITY_STEPS: [f64; 6] = [0., 1., 3., 6., 9., 12.];

const PEAK_DHW_LPM_PER_BATHROOM: f64 = 3.;
const SHOULDER_DHW_LPM_PER_BATHROOM: f64 = 1.5;

#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum HeatIntent {
    #[default]
    Off = 0,
    Setback = 1,
    Comfort = 2,
}

impl HeatIntent {
    /// Fraction of peak heat loss the household asks for at this level
    pub fn demand_fraction(&self) -> f64 {
        match self {
            HeatIntent::Off => 0.,
            HeatIntent::Setback => 0.4,
            HeatIntent::Comfort => 1.,
        }
    }
}

/// Where a profile came from. Informational only.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Measured,
    UserEdit,
}

/// Snap a draw rate to the nearest painted intensity step
pub fn snap_dhw_intensity(litres_per_minute: f64) -> f64 {
    DHW_INTENSITY_STEPS
        .iter()
        .copied()
        .min_by(|a, b| {
            (a - litres_per_minute)
                .abs()
                .total_cmp(&(b - litres_per_minute).abs())
        })
        .unwrap_or(0.)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DemandProfile {
    resolution: Resolution,
    heat_intent: Vec<HeatIntent>,
    dhw_lpm: Vec<f64>,
    cold_draw_lpm: Vec<f64>,
    provenance: Provenance,
}

impl DemandProfile {
    /// Build a profile from raw per-slice arrays, which must each hold exactly
    /// one entry per slice of the resolution. Draw rates must be finite and
    /// non-negative; hot water rates are snapped to the intensity steps.
    pub fn from_arrays(
        resolution: Resolution,
        heat_intent: Vec<HeatIntent>,
        dhw_lpm: Vec<f64>,
        cold_draw_lpm: Vec<f64>,
        provenance: Provenance,
    ) -> Result<Self, SimulationError> {
        check_draw_rates("dhw_lpm", &dhw_lpm)?;
        check_draw_rates("cold_draw_lpm", &cold_draw_lpm)?;

        let profile = Self {
            resolution,
            heat_intent,
            dhw_lpm: dhw_lpm.into_iter().map(snap_dhw_intensity).collect(),
            cold_draw_lpm,
            provenance,
        };
        profile.check_lengths()?;
        Ok(profile)
    }

    /// Baseline profile for a building: heating comfort bands around the
    /// occupied parts of the day, a morning hot water peak sized by bathroom
    /// count, and no cold draw.
    pub fn default_for(building: &BuildingInputs, resolution: Resolution) -> Self {
        let bathrooms = building.bathroom_count.max(1) as f64;
        let peak_dhw = snap_dhw_intensity(PEAK_DHW_LPM_PER_BATHROOM * bathrooms);
        let shoulder_dhw = snap_dhw_intensity(SHOULDER_DHW_LPM_PER_BATHROOM * bathrooms);

        let (heat_intent, dhw_lpm): (Vec<HeatIntent>, Vec<f64>) = resolution
            .iter()
            .map(|slice| {
                (
                    default_heat_intent(&slice, building.occupancy),
                    default_dhw(&slice, building.occupancy, peak_dhw, shoulder_dhw),
                )
            })
            .unzip();

        Self {
            resolution,
            heat_intent,
            dhw_lpm,
            cold_draw_lpm: vec![0.; resolution.slice_count()],
            provenance: Provenance::Measured,
        }
    }

    pub(crate) fn check_lengths(&self) -> Result<(), SimulationError> {
        self.resolution
            .check_length("heat_intent", self.heat_intent.len())?;
        self.resolution.check_length("dhw_lpm", self.dhw_lpm.len())?;
        self.resolution
            .check_length("cold_draw_lpm", self.cold_draw_lpm.len())
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn heat_intent(&self) -> &[HeatIntent] {
        &self.heat_intent
    }

    pub fn dhw_lpm(&self) -> &[f64] {
        &self.dhw_lpm
    }

    pub fn cold_draw_lpm(&self) -> &[f64] {
        &self.cold_draw_lpm
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn paint_heat_intent(
        &mut self,
        slices: Range<usize>,
        intent: HeatIntent,
    ) -> Result<(), SimulationError> {
        let slices = self.checked_range(slices)?;
        self.heat_intent[slices].fill(intent);
        self.provenance = Provenance::UserEdit;
        Ok(())
    }

    /// Paint hot water draws; the rate is snapped to the nearest intensity step
    pub fn paint_dhw(
        &mut self,
        slices: Range<usize>,
        litres_per_minute: f64,
    ) -> Result<(), SimulationError> {
        let slices = self.checked_range(slices)?;
        check_draw_rate("dhw_lpm", slices.start, litres_per_minute)?;
        self.dhw_lpm[slices].fill(snap_dhw_intensity(litres_per_minute));
        self.provenance = Provenance::UserEdit;
        Ok(())
    }

    pub fn paint_cold_draw(
        &mut self,
        slices: Range<usize>,
        litres_per_minute: f64,
    ) -> Result<(), SimulationError> {
        let slices = self.checked_range(slices)?;
        check_draw_rate("cold_draw_lpm", slices.start, litres_per_minute)?;
        self.cold_draw_lpm[slices].fill(litres_per_minute);
        self.provenance = Provenance::UserEdit;
        Ok(())
    }

    fn checked_range(&self, slices: Range<usize>) -> Result<Range<usize>, SimulationError> {
        let slice_count = self.resolution.slice_count();
        if slices.start > slices.end || slices.end > slice_count {
            return Err(SimulationError::SliceOutOfRange {
                start: slices.start,
                end: slices.end,
                slice_count,
            });
        }
        Ok(slices)
    }
}

fn check_draw_rate(channel: &'static str, slice: usize, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value >= 0. {
        Ok(())
    } else {
        Err(SimulationError::InvalidDrawRate {
            channel,
            slice,
            value,
        })
    }
}

fn check_draw_rates(channel: &'static str, values: &[f64]) -> Result<(), SimulationError> {
    values
        .iter()
        .enumerate()
        .try_for_each(|(slice, value)| check_draw_rate(channel, slice, *value))
}

fn default_heat_intent(slice: &Slice, occupancy: OccupancyPattern) -> HeatIntent {
    match occupancy {
        OccupancyPattern::AwayDaytime => {
            if slice.starts_within(6., 9.) || slice.starts_within(17., 22.) {
                HeatIntent::Comfort
            } else if slice.starts_within(9., 17.) {
                HeatIntent::Setback
            } else {
                HeatIntent::Off
            }
        }
        OccupancyPattern::HomeAllDay => {
            if slice.starts_within(6., 22.) {
                HeatIntent::Comfort
            } else {
                HeatIntent::Off
            }
        }
    }
}

fn default_dhw(
    slice: &Slice,
    occupancy: OccupancyPattern,
    peak_dhw: f64,
    shoulder_dhw: f64,
) -> f64 {
    if slice.starts_within(6., 7.) {
        peak_dhw
    } else if slice.starts_within(7., 9.) {
        shoulder_dhw
    } else if occupancy == OccupancyPattern::HomeAllDay && slice.starts_within(18., 19.) {
        shoulder_dhw
    } else {
        0.
    }
}
