use crate::core::delivery::SystemOutput;
use crate::core::simulator::SimulationResult;
use crate::input::SystemArchetype;
use serde::Serialize;

/// Day totals for one compared system, in kWh
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SystemDaySummary {
    pub archetype: SystemArchetype,
    pub space_heat_kwh: f64,
    /// Net of any heat lost to purges
    pub dhw_kwh: f64,
    pub input_kwh: f64,
    pub dumped_kwh: f64,
    pub purge_count: usize,
    /// Efficiency or CoP weighted by heat delivered; `None` if nothing was delivered
    pub average_efficiency_or_cop: Option<f64>,
}

impl SystemDaySummary {
    fn from_outputs<'a>(
        archetype: SystemArchetype,
        outputs: impl Iterator<Item = &'a SystemOutput>,
        slice_hours: f64,
    ) -> Self {
        let mut summary = Self {
            archetype,
            space_heat_kwh: 0.,
            dhw_kwh: 0.,
            input_kwh: 0.,
            dumped_kwh: 0.,
            purge_count: 0,
            average_efficiency_or_cop: None,
        };
        let mut delivered_kwh = 0.;
        let mut weighted_performance = 0.;

        for output in outputs {
            summary.space_heat_kwh += output.space_heat_kw * slice_hours;
            summary.dhw_kwh += output.dhw_kw * slice_hours;
            summary.input_kwh += output.input_kw * slice_hours;
            summary.dumped_kwh += output.dumped_kw * slice_hours;
            if output.purge {
                summary.purge_count += 1;
            }

            let delivered = (output.space_heat_kw + output.dhw_kw.max(0.)) * slice_hours;
            delivered_kwh += delivered;
            weighted_performance += delivered * output.efficiency_or_cop;
        }

        if delivered_kwh > 0. {
            summary.average_efficiency_or_cop = Some(weighted_performance / delivered_kwh);
        }
        summary
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DaySummary {
    pub resolution_minutes: u32,
    pub space_heat_demand_kwh: f64,
    pub dhw_demand_kwh: f64,
    pub system_a: SystemDaySummary,
    pub system_b: SystemDaySummary,
}

impl DaySummary {
    pub fn from_result(result: &SimulationResult) -> Self {
        let slice_hours = result.resolution.slice_hours();
        Self {
            resolution_minutes: result.resolution.minutes(),
            space_heat_demand_kwh: result
                .demand()
                .map(|demand| demand.space_heat_kw * slice_hours)
                .sum(),
            dhw_demand_kwh: result
                .demand()
                .map(|demand| demand.dhw_kw * slice_hours)
                .sum(),
            system_a: SystemDaySummary::from_outputs(
                result.system_a,
                result.hourly.iter().map(|row| &row.system_a),
                slice_hours,
            ),
            system_b: SystemDaySummary::from_outputs(
                result.system_b,
                result.hourly.iter().map(|row| &row.system_b),
                slice_hours,
            ),
        }
    }

    pub fn systems(&self) -> [&SystemDaySummary; 2] {
        [&self.system_a, &self.system_b]
    }
}
