/// A simple statistics module: a straight-line fit, and a heat loss estimate
/// from metered consumption built on top of it.
use anyhow::{anyhow, bail};
use itertools::Itertools;
use polyfit_rs::polyfit_rs::polyfit;
use serde::Serialize;
use statrs::statistics::Statistics;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least-squares fit of y against x.
pub fn linear_regression(x: &[f64], y: &[f64]) -> anyhow::Result<LinearFit> {
    if x.len() != y.len() {
        bail!(
            "Cannot fit a line to {} x values and {} y values",
            x.len(),
            y.len()
        );
    }
    if x.len() < 2 {
        bail!("At least two points are needed to fit a line, got {}", x.len());
    }

    // coefficients come back lowest order first
    let coefficients = polyfit(x, y, 1).map_err(|err| anyhow!(err))?;
    let [intercept, slope] = coefficients[..] else {
        bail!("Expected two coefficients from a linear fit, got {}", coefficients.len());
    };
    let fit = LinearFit {
        slope,
        intercept,
        r_squared: 1.,
    };

    let y_mean = y.mean();
    let total_sum_of_squares: f64 = y.iter().map(|y| (y - y_mean).powi(2)).sum();
    let residual_sum_of_squares: f64 = x
        .iter()
        .zip(y)
        .map(|(x, y)| (y - fit.predict(*x)).powi(2))
        .sum();

    Ok(LinearFit {
        r_squared: if total_sum_of_squares > 0. {
            1. - residual_sum_of_squares / total_sum_of_squares
        } else {
            1.
        },
        ..fit
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HeatLossEstimate {
    /// Heat transfer coefficient, in W/K
    pub heat_loss_coefficient_w_per_k: f64,
    /// Heat loss at the design temperature difference, in W
    pub peak_heat_loss_watts: f64,
    /// Weather-independent daily use (mostly hot water), in kWh
    pub base_load_kwh_per_day: f64,
    pub fit: LinearFit,
}

/// Estimate a building's peak heat loss from daily fuel use against daily mean
/// outdoor temperature. Delivered heat is regressed on degree-days, so the
/// slope is kWh per kelvin-day.
pub fn estimate_heat_loss_from_consumption(
    daily_kwh: &[f64],
    daily_mean_outdoor_c: &[f64],
    indoor_c: f64,
    design_outdoor_c: f64,
    efficiency: f64,
) -> anyhow::Result<HeatLossEstimate> {
    if efficiency <= 0. {
        bail!("Heating efficiency must be positive, got {efficiency}");
    }

    let delivered_kwh = daily_kwh.iter().map(|kwh| kwh * efficiency).collect_vec();
    let degree_days = daily_mean_outdoor_c
        .iter()
        .map(|outdoor| (indoor_c - outdoor).max(0.))
        .collect_vec();

    let fit = linear_regression(&degree_days, &delivered_kwh)?;
    if fit.slope <= 0. {
        bail!("Consumption does not rise as the weather cools; cannot infer a heat loss");
    }

    let heat_loss_coefficient_w_per_k = fit.slope * 1000. / 24.;

    Ok(HeatLossEstimate {
        heat_loss_coefficient_w_per_k,
        peak_heat_loss_watts: heat_loss_coefficient_w_per_k * (indoor_c - design_outdoor_c),
        base_load_kwh_per_day: fit.intercept,
        fit,
    })
}
