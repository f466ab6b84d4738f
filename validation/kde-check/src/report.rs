//! Console tables for check results.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use crate::checks::{StageTiming, ToleranceResult};

pub fn format_tolerance_table(results: &[ToleranceResult]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Cutoff (σ)", "Max |diff|", "Bound", "Cells", "Result"]);

    for r in results {
        table.add_row(vec![
            format!("{:.1}", r.cutoff_sigmas),
            format!("{:.3e}", r.max_abs_diff),
            format!("{:.3e}", r.bound),
            r.cells.to_string(),
            if r.passed() { "PASS" } else { "FAIL" }.to_string(),
        ]);
    }

    table.to_string()
}

pub fn format_timing_table(timings: &[StageTiming]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Stage", "Mean (ms)", "Min (ms)", "Max (ms)"]);

    for t in timings {
        table.add_row(vec![
            t.stage.to_string(),
            format!("{:.3}", t.mean.as_secs_f64() * 1000.0),
            format!("{:.3}", t.min.as_secs_f64() * 1000.0),
            format!("{:.3}", t.max.as_secs_f64() * 1000.0),
        ]);
    }

    table.to_string()
}
