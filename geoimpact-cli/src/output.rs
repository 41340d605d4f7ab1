use crate::cli::OutputFormatArg;
use crate::error::CliResult;
use comfy_table::{ContentArrangement, Table};
use geoimpact_compare::ComparisonTable;
use geoimpact_core::IndicatorCode;
use geoimpact_grid::UniformCellSet;
use geoimpact_query::{BatchOutcome, IndicatorStrategy, RawValueSpec, StrategyRegistry};
use serde_json::json;

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Fixed-point rendering without trailing zeros.
pub fn format_number(v: f64) -> String {
    let s = format!("{v:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn format_value(v: Option<f64>) -> String {
    v.map_or_else(|| "null".to_string(), format_number)
}

pub fn format_cells(cells: &UniformCellSet, count_only: bool) -> String {
    if count_only {
        return cells.len().to_string();
    }
    let mut out = format!("{} cells at resolution {}", cells.len(), cells.resolution().get());
    for cell in cells {
        out.push('\n');
        out.push_str(&cell.to_string());
    }
    out
}

pub fn format_batch(outcome: &BatchOutcome, format: OutputFormatArg) -> CliResult<String> {
    match format {
        OutputFormatArg::Json => {
            let values: serde_json::Map<String, serde_json::Value> = outcome
                .values
                .iter()
                .map(|(code, v)| (code.to_string(), json!(v)))
                .collect();
            let failures: Vec<_> = outcome
                .failures
                .iter()
                .map(|f| json!({"indicator": f.indicator(), "error": f.to_string()}))
                .collect();
            let doc = json!({
                "values": values,
                "failures": failures,
                "emptyRegion": outcome.empty_region,
            });
            Ok(serde_json::to_string_pretty(&doc)?)
        }
        OutputFormatArg::Table => {
            let mut table = new_table();
            table.set_header(vec!["INDICATOR", "NAME", "VALUE"]);
            for (code, value) in &outcome.values {
                table.add_row(vec![code.to_string(), code.label().to_string(), format_value(*value)]);
            }
            Ok(table.to_string())
        }
    }
}

pub fn format_indicators(strategies: &StrategyRegistry, format: OutputFormatArg) -> CliResult<String> {
    let entries: Vec<(IndicatorCode, &[geoimpact_core::RawValueName])> = strategies
        .codes()
        .into_iter()
        .filter_map(|code| strategies.get(code).map(|s| (code, s.raw_values())))
        .collect();

    match format {
        OutputFormatArg::Json => {
            let doc: Vec<_> = entries
                .iter()
                .map(|(code, raw)| {
                    let plans: serde_json::Map<String, serde_json::Value> = raw
                        .iter()
                        .map(|r| (r.as_str().to_string(), json!(RawValueSpec::of(*r).plan_text())))
                        .collect();
                    json!({"code": code, "name": code.label(), "rawValues": plans})
                })
                .collect();
            Ok(serde_json::to_string_pretty(&doc)?)
        }
        OutputFormatArg::Table => {
            let mut table = new_table();
            table.set_header(vec!["CODE", "NAME", "RAW VALUES", "PLAN"]);
            for (code, raw) in &entries {
                let names: Vec<_> = raw.iter().map(|r| r.as_str()).collect();
                let plans: Vec<_> = raw.iter().map(|r| RawValueSpec::of(*r).plan_text()).collect();
                table.add_row(vec![
                    code.to_string(),
                    code.label().to_string(),
                    names.join("\n"),
                    plans.join("\n"),
                ]);
            }
            Ok(table.to_string())
        }
    }
}

/// One table per indicator: groups down, years across. Each cell shows
/// `impactResult (new / canceled)`; projected years are marked `*`.
pub fn format_comparison(table: &ComparisonTable, format: OutputFormatArg) -> CliResult<String> {
    if format == OutputFormatArg::Json {
        return Ok(serde_json::to_string_pretty(table)?);
    }

    let cell = |v: &geoimpact_compare::ComparisonValue| {
        let mut s = format!(
            "{} ({} / {})",
            format_number(v.impact_result),
            format_number(v.new_impact),
            format_number(v.canceled_impact)
        );
        if let Some(p) = v.percentage {
            s.push_str(&format!(" {}%", format_number(p)));
        }
        if v.is_projected {
            s.push('*');
        }
        s
    };

    let mut header = vec![table.group_by.to_string()];
    header.extend(table.years.iter().map(|y| y.to_string()));

    let mut sections = Vec::new();
    for indicator in &table.indicators {
        let mut t = new_table();
        t.set_header(header.clone());
        for row in &indicator.rows {
            let mut cells = vec![row.group.to_string()];
            cells.extend(row.values.iter().map(cell));
            t.add_row(cells);
        }
        let mut total = vec!["Total".to_string()];
        total.extend(indicator.year_sum.iter().map(cell));
        t.add_row(total);
        sections.push(format!("{} ({})\n{t}", indicator.indicator, indicator.indicator.label()));
    }

    if !table.purchased_tonnes.is_empty() {
        let mut t = new_table();
        let mut header = vec!["purchased tonnes".to_string()];
        header.extend(table.purchased_tonnes.iter().map(|p| p.year.to_string()));
        t.set_header(header);
        t.add_row(
            std::iter::once(String::new())
                .chain(table.purchased_tonnes.iter().map(|p| {
                    let mark = if p.is_projected { "*" } else { "" };
                    format!("{}{mark}", format_number(p.value))
                }))
                .collect::<Vec<_>>(),
        );
        sections.push(t.to_string());
    }

    if sections.is_empty() {
        return Ok("No impact records in range.".to_string());
    }
    Ok(sections.join("\n\n"))
}
