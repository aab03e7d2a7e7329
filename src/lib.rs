pub mod core;
pub mod errors;
pub mod input;
pub mod output;
pub mod resolution;
pub mod statistics;

#[cfg(test)]
mod tests;

pub use crate::core::consistency::{assert_demand_equal, assert_resolution_consistent};
pub use crate::core::simulator::{compare_pairs, simulate, SimulationResult, SimulationRow};
pub use crate::core::summary::DaySummary;
use crate::core::delivery::SystemOutput;
use crate::core::demand::profile::DemandProfile;
use crate::errors::{ComparisonError, OutputError};
use crate::input::{ingest_for_processing, SystemArchetype};
use crate::output::Output;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Read;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonRun {
    pub result: SimulationResult,
    pub summary: DaySummary,
}

/// Read a comparison request, run both systems over one day of demand, check
/// the demand did not depend on which system was modelled, and write the
/// per-slice and summary CSVs to `output`.
pub fn run_comparison(
    input: impl Read,
    output: impl Output,
) -> Result<ComparisonRun, ComparisonError> {
    let input = ingest_for_processing(input)?;
    let resolution = input.resolution_minutes;

    let profile = match input.profile {
        Some(painted) => painted.into_profile(resolution)?,
        None => DemandProfile::default_for(&input.building, resolution),
    };

    let result = simulate(
        &input.building,
        &profile,
        &input.system_a,
        &input.system_b,
        input.ashp_spf_midpoint,
    )?;
    let swapped = simulate(
        &input.building,
        &profile,
        &input.system_b,
        &input.system_a,
        input.ashp_spf_midpoint,
    )?;
    assert_demand_equal(&result, &swapped)?;
    assert_resolution_consistent(&result)?;

    for note in &result.notes {
        warn!(code = %note.code, "{}", note.message);
    }

    let summary = DaySummary::from_result(&result);

    if !output.is_noop() {
        write_results_file(&output, &result)
            .map_err(|err| ComparisonError::Output(OutputError::new(err)))?;
        write_summary_file(&output, &result, &summary)
            .map_err(|err| ComparisonError::Output(OutputError::new(err)))?;
    }

    Ok(ComparisonRun { result, summary })
}

fn system_label(position: &str, archetype: SystemArchetype) -> String {
    format!("{position} ({archetype})")
}

fn write_results_file(output: &impl Output, result: &SimulationResult) -> anyhow::Result<()> {
    let location_key = "results";
    debug!("writing out to {location_key}");
    let writer = output.writer_for_location_key(location_key, "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    let mut headings: Vec<String> = vec![
        "Slice".into(),
        "Start".into(),
        "Space heat demand".into(),
        "DHW demand".into(),
        "Cold draw".into(),
    ];
    let mut units_row = vec!["[count]", "[HH:MM]", "[kW]", "[kW]", "[L/min]"];

    for (position, archetype) in [("A", result.system_a), ("B", result.system_b)] {
        let label = system_label(position, archetype);
        headings.push(format!("{label} space heat"));
        units_row.push("[kW]");
        headings.push(format!("{label} DHW"));
        units_row.push("[kW]");
        headings.push(format!("{label} {}", archetype.performance_label()));
        units_row.push("[ratio]");
        headings.push(format!("{label} dumped"));
        units_row.push("[kW]");
        headings.push(format!("{label} input"));
        units_row.push("[kW]");
        headings.push(format!("{label} purge"));
        units_row.push("[flag]");
    }

    // Write headings and units to output file
    writer.write_record(&headings)?;
    writer.write_record(&units_row)?;

    for (slice, row) in result.resolution.iter().zip(&result.hourly) {
        let mut record: Vec<String> = vec![
            row.slice_index.to_string(),
            slice.label(),
            row.demand.space_heat_kw.to_string(),
            row.demand.dhw_kw.to_string(),
            row.demand.cold_draw_lpm.to_string(),
        ];
        record.append(&mut system_output_fields(&row.system_a));
        record.append(&mut system_output_fields(&row.system_b));
        writer.write_record(&record)?;
    }

    debug!("flushing out CSV");
    writer.flush()?;

    Ok(())
}

fn system_output_fields(output: &SystemOutput) -> Vec<String> {
    vec![
        output.space_heat_kw.to_string(),
        output.dhw_kw.to_string(),
        output.efficiency_or_cop.to_string(),
        output.dumped_kw.to_string(),
        output.input_kw.to_string(),
        (output.purge as u8).to_string(),
    ]
}

fn write_summary_file(
    output: &impl Output,
    result: &SimulationResult,
    summary: &DaySummary,
) -> anyhow::Result<()> {
    let location_key = "results_summary";
    debug!("writing out to {location_key}");
    let writer = output.writer_for_location_key(location_key, "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record([
        "System",
        "Space heat delivered",
        "DHW delivered",
        "Input",
        "Dumped",
        "Purges",
        "Average efficiency or CoP",
    ])?;
    writer.write_record([
        "", "[kWh]", "[kWh]", "[kWh]", "[kWh]", "[count]", "[ratio]",
    ])?;

    for (position, system) in ["A", "B"].into_iter().zip(summary.systems()) {
        writer.write_record([
            system_label(position, system.archetype),
            system.space_heat_kwh.to_string(),
            system.dhw_kwh.to_string(),
            system.input_kwh.to_string(),
            system.dumped_kwh.to_string(),
            system.purge_count.to_string(),
            system
                .average_efficiency_or_cop
                .map(|value| value.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.write_record([""])?;
    writer.write_record([
        "Demand".to_string(),
        summary.space_heat_demand_kwh.to_string(),
        summary.dhw_demand_kwh.to_string(),
    ])?;
    writer.write_record([
        "Resolution".to_string(),
        format!("{} minutes", summary.resolution_minutes),
    ])?;

    if !result.notes.is_empty() {
        writer.write_record([""])?;
        writer.write_record(["Advisory note", "Detail"])?;
        for note in &result.notes {
            writer.write_record([note.code.to_string(), note.message.clone()])?;
        }
    }

    debug!("flushing out CSV");
    writer.flush()?;

    Ok(())
}
