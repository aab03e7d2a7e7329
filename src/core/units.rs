pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const SECONDS_PER_MINUTE: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;
pub const MINUTES_PER_DAY: u32 = 1_440;

/// Specific heat capacity of water, in kJ/(kg.K)
pub const WATER_SPECIFIC_HEAT_KJ_PER_KG_K: f64 = 4.186;
/// Density of water, in kg/litre
pub const WATER_DENSITY_KG_PER_LITRE: f64 = 1.0;

/// Temperature rise from mains feed to delivery used for hot water draws, in deg C
pub const DHW_DELTA_T_C: f64 = 35.;

/// Convert a water draw into the thermal power needed to heat it.
///
/// Q = m_dot * Cp * dT, with the mass flow in kg/s and Cp in kJ/(kg.K),
/// which gives the power directly in kW.
///
/// Arguments:
/// * `litres_per_minute` - draw rate, not validated (negative flow gives negative power)
/// * `delta_t_c` - temperature rise, in deg C
pub fn flow_to_power_kw(litres_per_minute: f64, delta_t_c: f64) -> f64 {
    let mass_flow_kg_per_s =
        litres_per_minute * WATER_DENSITY_KG_PER_LITRE / SECONDS_PER_MINUTE as f64;

    mass_flow_kg_per_s * WATER_SPECIFIC_HEAT_KJ_PER_KG_K * delta_t_c
}

/// Power needed to serve a hot water draw at the standard mains-to-delivery rise
pub fn dhw_flow_to_power_kw(litres_per_minute: f64) -> f64 {
    flow_to_power_kw(litres_per_minute, DHW_DELTA_T_C)
}

pub fn watts_to_kilowatts(watts: f64) -> f64 {
    watts / WATTS_PER_KILOWATT as f64
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
