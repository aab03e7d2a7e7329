pub mod profile;

use crate::core::units::{dhw_flow_to_power_kw, watts_to_kilowatts};
use crate::errors::SimulationError;
use crate::input::BuildingInputs;
use profile::DemandProfile;
use serde::Serialize;

/// Physical demand in one slice. Depends only on the building and the
/// profile, never on the systems being compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DemandSlice {
    pub space_heat_kw: f64,
    pub dhw_kw: f64,
    pub cold_draw_lpm: f64,
}

impl DemandSlice {
    pub fn has_dhw_draw(&self) -> bool {
        self.dhw_kw > 0.
    }
}

/// Expand a profile into per-slice demand for the given building.
pub fn demand_series(
    building: &BuildingInputs,
    profile: &DemandProfile,
) -> Result<Vec<DemandSlice>, SimulationError> {
    profile.check_lengths()?;

    let peak_kw = watts_to_kilowatts(building.heat_loss_watts);

    Ok(profile
        .heat_intent()
        .iter()
        .zip(profile.dhw_lpm())
        .zip(profile.cold_draw_lpm())
        .map(|((intent, dhw_lpm), cold_draw_lpm)| DemandSlice {
            space_heat_kw: peak_kw * intent.demand_fraction(),
            dhw_kw: dhw_flow_to_power_kw(*dhw_lpm),
            cold_draw_lpm: *cold_draw_lpm,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::demand::profile::{HeatIntent, Provenance};
    use crate::resolution::Resolution;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_scale_space_heat_by_intent_level() {
        let resolution = Resolution::new(480).unwrap();
        let profile = DemandProfile::from_arrays(
            resolution,
            vec![HeatIntent::Off, HeatIntent::Setback, HeatIntent::Comfort],
            vec![0., 3., 0.],
            vec![0., 0., 6.],
            Provenance::UserEdit,
        )
        .unwrap();
        let demand = demand_series(&BuildingInputs::new(8000., 1), &profile).unwrap();

        assert_eq!(demand[0].space_heat_kw, 0.);
        assert_relative_eq!(demand[1].space_heat_kw, 3.2, max_relative = 1e-12);
        assert_eq!(demand[2].space_heat_kw, 8.);
        assert_eq!(demand[0].dhw_kw, 0.);
        assert_relative_eq!(demand[1].dhw_kw, 7.3255, max_relative = 1e-9);
        assert!(demand[1].has_dhw_draw());
        assert!(!demand[2].has_dhw_draw());
        assert_eq!(demand[2].cold_draw_lpm, 6.);
    }
}
