mod test_comparison {
    use crate::core::common::AdvisoryCode;
    use crate::core::demand::profile::{DemandProfile, HeatIntent, Provenance};
    use crate::core::heating_systems::heat_pump::{COP_MAX, COP_MIN};
    use crate::errors::{ComparisonError, SimulationError};
    use crate::input::{BoilerInputs, BuildingInputs, SystemArchetype, SystemSpec};
    use crate::output::{SinkOutput, StringOutput};
    use crate::resolution::Resolution;
    use crate::{run_comparison, simulate, SimulationResult};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    const SPF: f64 = 3.2;

    fn profile(
        resolution: Resolution,
        heat_intent: HeatIntent,
        dhw_lpm_at: impl Fn(usize) -> f64,
    ) -> DemandProfile {
        let n = resolution.slice_count();
        DemandProfile::from_arrays(
            resolution,
            vec![heat_intent; n],
            (0..n).map(dhw_lpm_at).collect(),
            vec![0.; n],
            Provenance::UserEdit,
        )
        .unwrap()
    }

    fn run(
        building: &BuildingInputs,
        profile: &DemandProfile,
        system_a: SystemArchetype,
        system_b: SystemArchetype,
    ) -> SimulationResult {
        simulate(
            building,
            profile,
            &SystemSpec::new(system_a),
            &SystemSpec::new(system_b),
            SPF,
        )
        .unwrap()
    }

    #[fixture]
    fn building() -> BuildingInputs {
        BuildingInputs::new(8000., 2)
    }

    #[fixture]
    fn request() -> serde_json::Value {
        json!({
            "resolution_minutes": 60,
            "building": {"heat_loss_watts": 8000.0, "bathroom_count": 2},
            "profile": {
                "heat_intent": vec![2; 24],
                "dhw_lpm": vec![3.0; 24],
                "cold_draw_lpm": vec![0.0; 24]
            },
            "system_a": {"archetype": "combi"},
            "system_b": {"archetype": "air_source_heat_pump"},
            "ashp_spf_midpoint": SPF
        })
    }

    #[rstest]
    fn should_reproduce_steady_comfort_and_hot_water_day(request: serde_json::Value) {
        let run = run_comparison(request.to_string().as_bytes(), SinkOutput).unwrap();
        assert_eq!(run.result.hourly.len(), 24);
        for row in &run.result.hourly {
            assert_eq!(row.demand.space_heat_kw, 8.0);
            assert!((row.demand.dhw_kw - 7.33).abs() <= 0.01);
        }
    }

    #[rstest]
    fn should_keep_purge_energy_independent_of_resolution(building: BuildingInputs) {
        let hourly = run(
            &building,
            &profile(Resolution::HOURLY, HeatIntent::Setback, |i| {
                if i == 6 {
                    3.
                } else {
                    0.
                }
            }),
            SystemArchetype::Combi,
            SystemArchetype::StoredUnvented,
        );
        let five_minute = run(
            &building,
            &profile(Resolution::new(5).unwrap(), HeatIntent::Setback, |i| {
                if i == 72 {
                    3.
                } else {
                    0.
                }
            }),
            SystemArchetype::Combi,
            SystemArchetype::StoredUnvented,
        );

        let hourly_purge = hourly.hourly[6].system_a;
        let five_minute_purge = five_minute.hourly[72].system_a;
        assert!(hourly_purge.purge && five_minute_purge.purge);
        assert_relative_eq!(
            five_minute_purge.dumped_kw,
            12. * hourly_purge.dumped_kw,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            five_minute_purge.dumped_kw * Resolution::new(5).unwrap().slice_hours(),
            hourly_purge.dumped_kw * Resolution::HOURLY.slice_hours(),
            max_relative = 1e-12
        );
    }

    #[rstest]
    #[case(SystemArchetype::Combi, SystemArchetype::AirSourceHeatPump)]
    #[case(SystemArchetype::Combi, SystemArchetype::StoredVented)]
    #[case(SystemArchetype::StoredUnvented, SystemArchetype::AirSourceHeatPump)]
    fn should_give_identical_demand_whichever_way_round(
        building: BuildingInputs,
        #[case] first: SystemArchetype,
        #[case] second: SystemArchetype,
        #[values(60, 30, 5)] minutes: u32,
    ) {
        let resolution = Resolution::new(minutes).unwrap();
        let profile = DemandProfile::default_for(&building, resolution);
        let forward = run(&building, &profile, first, second);
        let backward = run(&building, &profile, second, first);

        for (a, b) in forward.demand().zip(backward.demand()) {
            assert_eq!(a.space_heat_kw.to_bits(), b.space_heat_kw.to_bits());
            assert_eq!(a.dhw_kw.to_bits(), b.dhw_kw.to_bits());
            assert_eq!(a.cold_draw_lpm.to_bits(), b.cold_draw_lpm.to_bits());
        }
        assert_eq!(crate::assert_demand_equal(&forward, &backward), Ok(()));
    }

    #[rstest]
    fn should_never_heat_space_during_combi_hot_water(building: BuildingInputs) {
        let resolution = Resolution::new(15).unwrap();
        let result = run(
            &building,
            &DemandProfile::default_for(&building, resolution),
            SystemArchetype::StoredVented,
            SystemArchetype::Combi,
        );
        let draws: Vec<_> = result
            .hourly
            .iter()
            .filter(|row| row.demand.dhw_kw > 0.)
            .collect();
        assert!(!draws.is_empty());
        for row in draws {
            assert_eq!(row.system_b.space_heat_kw, 0.);
            assert_eq!(row.system_a.space_heat_kw, row.demand.space_heat_kw);
        }
    }

    #[rstest]
    #[case(4)]
    #[case(13)]
    #[case(22)]
    fn should_purge_only_on_first_draw_slice(building: BuildingInputs, #[case] k: usize) {
        let single = run(
            &building,
            &profile(Resolution::HOURLY, HeatIntent::Comfort, |i| {
                if i == k {
                    6.
                } else {
                    0.
                }
            }),
            SystemArchetype::Combi,
            SystemArchetype::AirSourceHeatPump,
        );
        assert!(single.hourly[k].system_a.dhw_kw < 0.);
        assert!(single.hourly[k].system_a.dumped_kw > 0.);

        let pair = run(
            &building,
            &profile(Resolution::HOURLY, HeatIntent::Comfort, |i| {
                if i == k || i == k + 1 {
                    6.
                } else {
                    0.
                }
            }),
            SystemArchetype::Combi,
            SystemArchetype::AirSourceHeatPump,
        );
        let following = pair.hourly[k + 1].system_a;
        assert!(!following.purge);
        assert!(following.dhw_kw > 0.);
        assert!((0.50..=0.99).contains(&following.efficiency_or_cop));
        assert_eq!(following.dumped_kw, 0.);
    }

    #[rstest]
    fn should_dip_heat_pump_cop_before_seven(building: BuildingInputs) {
        let result = run(
            &building,
            &profile(Resolution::new(30).unwrap(), HeatIntent::Comfort, |_| 0.),
            SystemArchetype::Combi,
            SystemArchetype::AirSourceHeatPump,
        );
        for row in &result.hourly {
            let cop = row.system_b.efficiency_or_cop;
            assert!(cop >= COP_MIN);
            if row.start_hour < 7. {
                assert!(cop < SPF, "cop {cop} at {} should dip", row.start_hour);
            } else {
                assert_eq!(cop, SPF);
            }
        }
    }

    #[rstest]
    fn should_fail_before_computing_on_short_profile(mut request: serde_json::Value) {
        request["profile"]["dhw_lpm"] = json!(vec![3.0; 23]);
        let output = StringOutput::new();
        let result = run_comparison(request.to_string().as_bytes(), &output);
        assert!(matches!(
            result,
            Err(ComparisonError::FailureInCalculation(
                SimulationError::ArrayLengthMismatch {
                    channel: "dhw_lpm",
                    expected: 24,
                    actual: 23,
                    ..
                }
            ))
        ));
        assert!(output.file_names().is_empty());
    }

    #[rstest]
    fn should_reject_malformed_request(mut request: serde_json::Value) {
        request["system_a"]["archetype"] = json!("ground_source_heat_pump");
        assert!(matches!(
            run_comparison(request.to_string().as_bytes(), SinkOutput),
            Err(ComparisonError::InvalidRequest(_))
        ));
    }

    #[rstest]
    fn should_write_results_and_summary(mut request: serde_json::Value) {
        request["system_a"]["boiler"] = json!({"nameplate_id": "Unlisted 99"});
        let output = StringOutput::new();
        let run = run_comparison(request.to_string().as_bytes(), &output).unwrap();

        let results = output.get("results.csv").unwrap();
        let lines: Vec<&str> = results.lines().collect();
        // headings, units, then one row per slice
        assert_eq!(lines.len(), 26);
        assert!(lines[0].starts_with("Slice,Start,Space heat demand,DHW demand,Cold draw"));
        assert!(lines[0].contains("A (combi) efficiency"));
        assert!(lines[0].contains("B (air_source_heat_pump) cop"));
        assert!(lines[1].starts_with("[count],[HH:MM],[kW],[kW],[L/min]"));
        assert!(lines[2].starts_with("0,00:00,8,"));
        assert!(lines[25].starts_with("23,23:00,"));

        let summary = output.get("results_summary.csv").unwrap();
        assert!(summary.contains("A (combi)"));
        assert!(summary.contains("boiler_nameplate_unresolved"));

        let codes: Vec<AdvisoryCode> = run.result.notes.iter().map(|note| note.code).collect();
        assert!(codes.contains(&AdvisoryCode::BoilerNameplateUnresolved));
        assert!(codes.contains(&AdvisoryCode::BoilerAgeUnknown));
        assert_eq!(run.summary.system_a.purge_count, 1);
    }

    #[rstest]
    fn should_derate_oversized_combi_against_building(mut request: serde_json::Value) {
        request["profile"]["dhw_lpm"] = json!(vec![0.0; 24]);
        request["system_a"]["boiler"] = json!({
            "efficiency_percent": 89.0,
            "age_years": 2.0,
            "nominal_output_kw": 24.0
        });
        let run = run_comparison(request.to_string().as_bytes(), SinkOutput).unwrap();
        let boiler = run.result.system_a_details.boiler.as_ref().unwrap();
        // 24 kW against the building's 8 kW
        assert_eq!(boiler.oversize_ratio, Some(3.));
        assert!(boiler.in_context < 0.89);
        assert_eq!(
            run.result.hourly[0].system_a.efficiency_or_cop,
            boiler.in_context
        );
    }

    #[rstest]
    fn should_follow_outdoor_temperatures_for_heat_pump(mut request: serde_json::Value) {
        request["building"]["outdoor_temperatures_c"] = json!(vec![7.0; 24]);
        let run = run_comparison(request.to_string().as_bytes(), SinkOutput).unwrap();
        for row in &run.result.hourly {
            assert_relative_eq!(row.system_b.efficiency_or_cop, SPF, max_relative = 1e-12);
        }
    }

    #[rstest]
    fn should_treat_boiler_details_on_heat_pump_as_advisory(mut request: serde_json::Value) {
        request["system_b"]["boiler"] = json!({"age_years": 4.0});
        let run = run_comparison(request.to_string().as_bytes(), SinkOutput).unwrap();
        assert_eq!(
            run.result
                .notes
                .iter()
                .map(|note| note.code)
                .collect::<Vec<_>>(),
            vec![AdvisoryCode::BoilerDetailsIgnored]
        );
    }

    #[rstest]
    fn should_default_profile_from_building(mut request: serde_json::Value) {
        request.as_object_mut().unwrap().remove("profile");
        request["resolution_minutes"] = json!(30);
        let run = run_comparison(request.to_string().as_bytes(), SinkOutput).unwrap();
        assert_eq!(run.result.hourly.len(), 48);
        assert!(run.summary.system_a.purge_count >= 1);
        assert!(run.summary.space_heat_demand_kwh > 0.);
        assert_eq!(
            run.result.system_b_details.archetype,
            SystemArchetype::AirSourceHeatPump
        );
    }

    #[rstest]
    fn should_ignore_unused_boiler_inputs_for_stored_systems(building: BuildingInputs) {
        let spec = SystemSpec::with_boiler(
            SystemArchetype::StoredVented,
            BoilerInputs {
                efficiency_percent: Some(80.),
                age_years: Some(3.),
                ..Default::default()
            },
        );
        let result = simulate(
            &building,
            &profile(Resolution::HOURLY, HeatIntent::Comfort, |_| 0.),
            &spec,
            &SystemSpec::new(SystemArchetype::Combi),
            SPF,
        )
        .unwrap();
        let boiler = result.system_a_details.boiler.as_ref().unwrap();
        assert_eq!(boiler.oversize_ratio, None);
        assert!(result.notes.is_empty());
        assert_eq!(result.hourly[3].system_a.efficiency_or_cop, 0.8);
    }

    #[rstest]
    #[case(0.)]
    #[case(1.)]
    #[case(5.8)]
    fn should_keep_heat_pump_cop_within_credible_range(
        mut building: BuildingInputs,
        #[case] spf: f64,
    ) {
        building.outdoor_temperatures_c = Some((0..24).map(|hour| hour as f64 - 4.).collect());
        let result = simulate(
            &building,
            &profile(Resolution::HOURLY, HeatIntent::Comfort, |_| 3.),
            &SystemSpec::new(SystemArchetype::AirSourceHeatPump),
            &SystemSpec::new(SystemArchetype::Combi),
            spf,
        )
        .unwrap();
        for row in &result.hourly {
            let cop = row.system_a.efficiency_or_cop;
            assert!((COP_MIN..=COP_MAX).contains(&cop), "cop {cop} out of range");
            assert!(row.system_a.input_kw.is_finite());
        }
    }

    #[rstest]
    fn should_refuse_request_with_negative_hot_water_draw(mut request: serde_json::Value) {
        request["profile"]["dhw_lpm"][5] = json!(-3.0);
        assert!(matches!(
            run_comparison(request.to_string().as_bytes(), SinkOutput),
            Err(ComparisonError::FailureInCalculation(
                SimulationError::InvalidDrawRate { slice: 5, .. }
            ))
        ));
    }
}
