use crate::core::demand::DemandSlice;
use crate::core::simulator::SimulationResult;
use crate::errors::DemandConsistencyError;

/// Check that two runs over the same building and profile saw bit-identical
/// demand in every slice, whichever systems they compared.
pub fn assert_demand_equal(
    result_a: &SimulationResult,
    result_b: &SimulationResult,
) -> Result<(), DemandConsistencyError> {
    if result_a.hourly.len() != result_b.hourly.len() {
        return Err(DemandConsistencyError::LengthMismatch {
            a: result_a.hourly.len(),
            b: result_b.hourly.len(),
        });
    }

    for (slice, (a, b)) in result_a.demand().zip(result_b.demand()).enumerate() {
        for (channel, value_a, value_b) in channels(a, b) {
            if value_a.to_bits() != value_b.to_bits() {
                return Err(DemandConsistencyError::ChannelMismatch {
                    slice,
                    channel,
                    a: value_a,
                    b: value_b,
                });
            }
        }
    }

    Ok(())
}

fn channels(a: &DemandSlice, b: &DemandSlice) -> [(&'static str, f64, f64); 3] {
    [
        ("space_heat_kw", a.space_heat_kw, b.space_heat_kw),
        ("dhw_kw", a.dhw_kw, b.dhw_kw),
        ("cold_draw_lpm", a.cold_draw_lpm, b.cold_draw_lpm),
    ]
}

/// Check that a result carries exactly one row per slice of its resolution
pub fn assert_resolution_consistent(result: &SimulationResult) -> Result<(), DemandConsistencyError> {
    let expected = result.resolution.slice_count();
    if result.hourly.len() != expected {
        return Err(DemandConsistencyError::ResolutionMismatch {
            expected,
            actual: result.hourly.len(),
            resolution_minutes: result.resolution.minutes(),
        });
    }
    Ok(())
}
