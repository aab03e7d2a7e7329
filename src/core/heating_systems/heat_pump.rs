use serde::{Deserialize, Serialize};
use strum::Display;

/// This module represents air-source heat pump performance with a planar
/// (affine) approximation of CoP over outdoor and flow temperature, anchored
/// at the standard rating point A7/W35.

const REF_COP: f64 = 4.10;
const REF_OUTDOOR_TEMP_C: f64 = 7.;
const REF_FLOW_TEMP_C: f64 = 35.;
/// CoP gained per degree of warmer outdoor air
const K_OUTDOOR: f64 = 0.10;
/// CoP lost per degree of hotter flow
const K_FLOW: f64 = 0.07;

pub const COP_MIN: f64 = 1.5;
pub const COP_MAX: f64 = 5.0;

/// Outdoor temperature for the design day and the cold-morning estimate
pub const DESIGN_OUTDOOR_TEMP_C: f64 = -3.;
/// Outdoor temperature the seasonal (daytime) figure is referenced to
pub const DAYTIME_OUTDOOR_TEMP_C: f64 = REF_OUTDOOR_TEMP_C;

/// Calculate CoP for the given outdoor and flow temperatures (deg C),
/// clamped to the credible range.
pub fn compute_cop(outdoor_temp_c: f64, flow_temp_c: f64) -> f64 {
    let cop = REF_COP + K_OUTDOOR * (outdoor_temp_c - REF_OUTDOOR_TEMP_C)
        - K_FLOW * (flow_temp_c - REF_FLOW_TEMP_C);

    clamp_cop(cop)
}

/// CoP at the given outdoor temperature relative to the daytime reference at
/// the same flow temperature. Used to bend a seasonal figure (SPF) into an
/// hour-by-hour value without changing its level.
pub fn cop_ratio(outdoor_temp_c: f64, flow_temp_c: f64) -> f64 {
    compute_cop(outdoor_temp_c, flow_temp_c) / compute_cop(DAYTIME_OUTDOOR_TEMP_C, flow_temp_c)
}

/// Clamp a CoP or seasonal performance factor to the credible range
pub fn clamp_cop(cop: f64) -> f64 {
    cop.clamp(COP_MIN, COP_MAX)
}

/// Apply the relative CoP shape to a seasonal performance factor
pub fn shaped_cop(spf: f64, outdoor_temp_c: f64, flow_temp_c: f64) -> f64 {
    clamp_cop(clamp_cop(spf) * cop_ratio(outdoor_temp_c, flow_temp_c))
}

/// How far the household is willing to go with emitter upgrades
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum EmitterUpgradeAppetite {
    #[serde(rename = "none")]
    NoUpgrade,
    #[default]
    #[serde(rename = "some")]
    SomeUpgrade,
    #[serde(rename = "full_job")]
    FullJob,
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmitterRating {
    Poor,
    #[serde(rename = "ok")]
    #[strum(serialize = "ok")]
    Adequate,
    Good,
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RegimeFlagCode {
    ElevatedFlowTemp,
    CopPenalty,
    FullJobUnlocksLowTemp,
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegimeFlag {
    pub code: RegimeFlagCode,
    pub severity: Severity,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DesignRegime {
    pub flow_temp_c: f64,
    pub rating: EmitterRating,
    /// CoP on the design day (outdoor -3 deg C) at this flow temperature
    pub design_day_cop: f64,
    pub flags: Vec<RegimeFlag>,
}

/// Choose the design flow temperature from the appetite for emitter work and
/// explain what it costs.
pub fn select_design_regime(appetite: EmitterUpgradeAppetite) -> DesignRegime {
    let (flow_temp_c, rating) = match appetite {
        EmitterUpgradeAppetite::NoUpgrade => (50., EmitterRating::Poor),
        EmitterUpgradeAppetite::SomeUpgrade => (45., EmitterRating::Adequate),
        EmitterUpgradeAppetite::FullJob => (35., EmitterRating::Good),
    };

    let design_day_cop = compute_cop(DESIGN_OUTDOOR_TEMP_C, flow_temp_c);
    let low_temp_cop = compute_cop(DESIGN_OUTDOOR_TEMP_C, REF_FLOW_TEMP_C);
    let cop_loss = low_temp_cop - design_day_cop;

    let flags = match rating {
        EmitterRating::Good => vec![],
        EmitterRating::Adequate => vec![
            RegimeFlag {
                code: RegimeFlagCode::CopPenalty,
                severity: Severity::Info,
                message: format!(
                    "Design CoP of {design_day_cop:.2} at {flow_temp_c} deg C flow, {cop_loss:.2} below a 35 deg C system"
                ),
            },
            full_job_flag(Severity::Info, low_temp_cop),
        ],
        EmitterRating::Poor => vec![
            RegimeFlag {
                code: RegimeFlagCode::ElevatedFlowTemp,
                severity: Severity::Warn,
                message: format!(
                    "Existing emitters need a {flow_temp_c} deg C flow temperature to meet design heat loss"
                ),
            },
            RegimeFlag {
                code: RegimeFlagCode::CopPenalty,
                severity: Severity::Warn,
                message: format!(
                    "Design CoP of {design_day_cop:.2} at {flow_temp_c} deg C flow, {cop_loss:.2} below a 35 deg C system"
                ),
            },
            full_job_flag(Severity::Warn, low_temp_cop),
        ],
    };

    DesignRegime {
        flow_temp_c,
        rating,
        design_day_cop,
        flags,
    }
}

fn full_job_flag(severity: Severity, low_temp_cop: f64) -> RegimeFlag {
    RegimeFlag {
        code: RegimeFlagCode::FullJobUnlocksLowTemp,
        severity,
        message: format!(
            "Upgrading emitters throughout would allow 35 deg C flow and a design CoP of {low_temp_cop:.2}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(7., 35., 4.10)]
    #[case(7., 50., 3.05)]
    #[case(-3., 35., 3.10)]
    #[case(-3., 50., 2.05)]
    fn should_reproduce_anchor_values(
        #[case] outdoor: f64,
        #[case] flow: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(compute_cop(outdoor, flow), expected, max_relative = 1e-12);
    }

    #[rstest]
    fn should_fall_with_flow_and_rise_with_outdoor_temperature() {
        assert!(compute_cop(7., 50.) < compute_cop(7., 35.));
        assert!(compute_cop(15., 35.) > compute_cop(7., 35.));
        assert!(compute_cop(7., 35.) > compute_cop(-3., 35.));
    }

    #[rstest]
    #[case(-10., 70.)]
    #[case(-40., 80.)]
    #[case(40., 20.)]
    #[case(25., 25.)]
    fn should_clamp_to_credible_range(#[case] outdoor: f64, #[case] flow: f64) {
        let cop = compute_cop(outdoor, flow);
        assert!((COP_MIN..=COP_MAX).contains(&cop), "cop {cop} out of range");
    }

    #[rstest]
    fn should_hit_clamp_bounds_at_extremes() {
        assert_eq!(compute_cop(-10., 70.), COP_MIN);
        assert_eq!(compute_cop(40., 20.), COP_MAX);
    }

    #[rstest]
    fn should_give_unit_ratio_at_daytime_reference() {
        assert_eq!(cop_ratio(DAYTIME_OUTDOOR_TEMP_C, 45.), 1.);
        assert!(cop_ratio(DESIGN_OUTDOOR_TEMP_C, 45.) < 1.);
    }

    #[rstest]
    fn should_not_shape_below_minimum_cop() {
        assert_eq!(shaped_cop(1.6, -20., 55.), COP_MIN);
        assert_relative_eq!(shaped_cop(3.4, 7., 45.), 3.4, max_relative = 1e-12);
    }

    #[rstest]
    #[case(5.8, 7., 35., COP_MAX)]
    #[case(4.8, 20., 35., COP_MAX)]
    #[case(1., 7., 45., COP_MIN)]
    #[case(0., -3., 50., COP_MIN)]
    fn should_keep_shaped_cop_within_credible_range(
        #[case] spf: f64,
        #[case] outdoor: f64,
        #[case] flow: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(shaped_cop(spf, outdoor, flow), expected);
    }

    #[rstest]
    #[case(EmitterUpgradeAppetite::NoUpgrade, 50., EmitterRating::Poor)]
    #[case(EmitterUpgradeAppetite::SomeUpgrade, 45., EmitterRating::Adequate)]
    #[case(EmitterUpgradeAppetite::FullJob, 35., EmitterRating::Good)]
    fn should_select_flow_temperature_from_appetite(
        #[case] appetite: EmitterUpgradeAppetite,
        #[case] flow_temp: f64,
        #[case] rating: EmitterRating,
    ) {
        let regime = select_design_regime(appetite);
        assert_eq!(regime.flow_temp_c, flow_temp);
        assert_eq!(regime.rating, rating);
        assert_eq!(regime.design_day_cop, compute_cop(-3., flow_temp));
    }

    #[rstest]
    fn should_warn_at_fifty_degrees() {
        let regime = select_design_regime(EmitterUpgradeAppetite::NoUpgrade);
        let codes: Vec<RegimeFlagCode> = regime.flags.iter().map(|flag| flag.code).collect();
        assert_eq!(
            codes,
            vec![
                RegimeFlagCode::ElevatedFlowTemp,
                RegimeFlagCode::CopPenalty,
                RegimeFlagCode::FullJobUnlocksLowTemp
            ]
        );
        assert!(regime.flags.iter().all(|flag| flag.severity == Severity::Warn));
    }

    #[rstest]
    fn should_only_inform_at_forty_five_degrees() {
        let regime = select_design_regime(EmitterUpgradeAppetite::SomeUpgrade);
        assert!(!regime.flags.is_empty());
        assert!(regime.flags.iter().all(|flag| flag.severity == Severity::Info));
        assert!(regime
            .flags
            .iter()
            .all(|flag| flag.code != RegimeFlagCode::ElevatedFlowTemp));
    }

    #[rstest]
    fn should_emit_no_flags_at_thirty_five_degrees() {
        assert!(select_design_regime(EmitterUpgradeAppetite::FullJob)
            .flags
            .is_empty());
    }

    #[rstest]
    fn should_name_flags_in_kebab_case() {
        assert_eq!(
            RegimeFlagCode::FullJobUnlocksLowTemp.to_string(),
            "full-job-unlocks-low-temp"
        );
        assert_eq!(
            serde_json::to_string(&RegimeFlagCode::ElevatedFlowTemp).unwrap(),
            "\"elevated-flow-temp\""
        );
    }

    #[rstest]
    fn should_deserialize_appetite() {
        let appetite: EmitterUpgradeAppetite = serde_json::from_str("\"full_job\"").unwrap();
        assert_eq!(appetite, EmitterUpgradeAppetite::FullJob);
        let appetite: EmitterUpgradeAppetite = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(appetite, EmitterUpgradeAppetite::NoUpgrade);
    }
}
