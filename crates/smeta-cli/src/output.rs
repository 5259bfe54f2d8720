//! Output formatting module

use serde::Serialize;
use smeta_app::app::{AnalysisOutcome, AnalysisReport, EstimateReport};
use smeta_types::{BuildingAnalysis, OutputFormat, Result};
use std::path::Path;

/// Write any result as pretty JSON to a file
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    println!("Results saved to: {}", path.display());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_analysis(analysis: &BuildingAnalysis) {
    println!("Total area:      {:.2} m²", analysis.total_area_m2);
    match analysis.ceiling_height_m {
        Some(h) => println!("Ceiling height:  {:.2} m", h),
        None => println!("Ceiling height:  unknown"),
    }
    println!("Bathrooms:       {}", analysis.bathrooms_count);

    println!("\n--- Rooms ({}) ---", analysis.rooms.len());
    for room in &analysis.rooms {
        let mut extra = Vec::new();
        if let Some(p) = room.perimeter_m {
            extra.push(format!("P {:.2} m", p));
        }
        if let Some(h) = room.height_m {
            extra.push(format!("H {:.2} m", h));
        }
        if room.is_wet_zone {
            extra.push("wet".to_string());
        }
        let extra = if extra.is_empty() {
            String::new()
        } else {
            format!("  ({})", extra.join(", "))
        };
        println!("  {:<24} {:>8.2} m²{}", room.name, room.area_m2, extra);
    }

    if let Some(ref notes) = analysis.notes {
        println!("\nNotes: {}", notes);
    }
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        println!("\nSanity check:    OK");
    } else {
        println!("\nWarnings:");
        for w in warnings {
            println!("  ! {}", w);
        }
    }
}

pub fn output_report(output_format: OutputFormat, report: &AnalysisReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(report);
    }

    println!("\nAnalysis Result");
    println!("===============");
    println!("Run:             {}", report.run_id);
    println!("Pages analyzed:  {}", report.pages_analyzed);
    if report.pages_ignored > 0 {
        println!("Pages ignored:   {} (page limit)", report.pages_ignored);
    }
    print_analysis(&report.analysis);
    print_warnings(&report.warnings);
    Ok(())
}

pub fn output_outcome(output_format: OutputFormat, outcome: &AnalysisOutcome) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(outcome);
    }

    println!("\nMerged Analysis");
    println!("===============");
    print_analysis(&outcome.analysis);
    print_warnings(&outcome.warnings);
    Ok(())
}

pub fn output_estimate(output_format: OutputFormat, report: &EstimateReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(report);
    }

    println!("\nEstimate");
    println!("========");
    for stage in &report.estimate.stages {
        println!("\n[{}] {}", stage.stage_code, stage.stage_name);
        for line in &stage.lines {
            let price = if line.is_priced() {
                format!("{:>10.2}", line.unit_price)
            } else {
                format!("{:>10}", "-")
            };
            let mark = if line.qty_overridden || line.price_overridden {
                "*"
            } else {
                " "
            };
            println!(
                "{} {:<40} {:>9.2} {:<6} x {} = {:>12.2}",
                mark,
                line.item.name,
                line.item.qty,
                line.item.unit.label(),
                price,
                line.total
            );
        }
        println!("  {:>74}", format!("Stage total: {:.2}", stage.stage_total));
    }

    println!("\nGrand total:     {:.2}", report.estimate.grand_total);

    if report
        .estimate
        .stages
        .iter()
        .flat_map(|s| s.lines.iter())
        .any(|l| l.qty_overridden || l.price_overridden)
    {
        println!("(* edited by hand)");
    }

    let unpriced = report.estimate.unpriced();
    if !unpriced.is_empty() {
        println!("\nNo catalog price for:");
        for item in unpriced {
            println!("  {} / {}", item.stage_code, item.work_code);
        }
    }
    Ok(())
}
