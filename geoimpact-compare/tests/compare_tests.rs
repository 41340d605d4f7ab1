use geoimpact_compare::{
    compare, compare_scenarios, CompareConfig, CompareError, ComparisonMode, ComparisonRequest,
    ComparisonTable, Dimensions, GroupBy, GroupKey, ImpactRecord, ImpactRole,
};
use geoimpact_core::IndicatorCode;

const DF: IndicatorCode = IndicatorCode::Deforestation;

fn supplier(name: &str) -> Dimensions {
    Dimensions {
        supplier: Some(name.to_string()),
        ..Dimensions::default()
    }
}

fn record(indicator: IndicatorCode, year: i32, value: f64, who: &str) -> ImpactRecord {
    ImpactRecord::new(indicator, year, value).with_dimensions(supplier(who))
}

fn near(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn assert_row_sums(table: &ComparisonTable) {
    for ind in &table.indicators {
        for (i, total) in ind.year_sum.iter().enumerate() {
            let result: f64 = ind.rows.iter().map(|r| r.values[i].impact_result).sum();
            let new: f64 = ind.rows.iter().map(|r| r.values[i].new_impact).sum();
            let canceled: f64 = ind.rows.iter().map(|r| r.values[i].canceled_impact).sum();
            assert!(near(result, total.impact_result), "{} {}", ind.indicator, total.year);
            assert!(near(new, total.new_impact));
            assert!(near(canceled, total.canceled_impact));
        }
    }
}

#[test]
fn supplier_example_sums_into_year_total() {
    let baseline = [record(DF, 2020, 2000.0, "Supplier A Oils")];
    let intervention = [
        record(DF, 2020, 1500.0, "Supplier A Oils"),
        record(DF, 2020, 600.0, "Supplier A Textile"),
    ];
    let table = compare(&baseline, &intervention, &ComparisonRequest::new(GroupBy::Supplier)).unwrap();

    let df = table.indicator(DF).unwrap();
    let oils = df.row(&GroupKey::Named("Supplier A Oils".into())).unwrap();
    let v = oils.value(2020).unwrap();
    assert_eq!((v.new_impact, v.canceled_impact, v.impact_result), (1500.0, 2000.0, -500.0));

    // present only on the intervention side, still a row
    let textile = df.row(&GroupKey::Named("Supplier A Textile".into())).unwrap();
    let v = textile.value(2020).unwrap();
    assert_eq!((v.new_impact, v.canceled_impact, v.impact_result), (600.0, 0.0, 600.0));

    assert_eq!(df.year_sum(2020).unwrap().impact_result, 100.0);
    assert_row_sums(&table);
}

#[test]
fn later_years_are_projected_at_growth_rate() {
    let baseline = [record(DF, 2020, 2000.0, "Oils").with_tonnes(100.0)];
    let intervention = [record(DF, 2020, 1500.0, "Oils")];
    let request = ComparisonRequest::new(GroupBy::Supplier)
        .with_years(2019, 2021)
        .with_config(&CompareConfig::default());
    let table = compare(&baseline, &intervention, &request).unwrap();
    assert_eq!(table.years, vec![2019, 2020, 2021]);

    let row = &table.indicator(DF).unwrap().rows[0];
    let before = row.value(2019).unwrap();
    assert_eq!((before.new_impact, before.canceled_impact, before.is_projected), (0.0, 0.0, false));

    let projected = row.value(2021).unwrap();
    assert!(projected.is_projected);
    assert!(near(projected.new_impact, 1522.5));
    assert!(near(projected.canceled_impact, 2030.0));
    assert!(near(projected.impact_result, -507.5));

    let tonnes: Vec<_> = table.purchased_tonnes.iter().map(|t| (t.year, t.is_projected)).collect();
    assert_eq!(tonnes, vec![(2019, false), (2020, false), (2021, true)]);
    assert!(near(table.purchased_tonnes[2].value, 101.5));
    assert!(table.indicator(DF).unwrap().year_sum(2021).unwrap().is_projected);
}

#[test]
fn row_sum_law_holds_across_groups_and_indicators() {
    let suppliers = ["a", "b", "c", "d", "e"];
    let mut baseline = Vec::new();
    let mut intervention = Vec::new();
    for (i, name) in suppliers.iter().enumerate() {
        for year in 2018..=2022 {
            for code in [IndicatorCode::Carbon, IndicatorCode::WaterUse, IndicatorCode::LandUse] {
                let k = (i as f64 + 1.0) * (year - 2017) as f64;
                // sparse coverage: some groups skip some years on each side
                if (i + year as usize) % 3 != 0 {
                    baseline.push(record(code, year, k * 0.37 + 1e-3, name));
                }
                if (i * 7 + year as usize) % 4 != 0 {
                    intervention.push(record(code, year, k * 1.13, name));
                }
            }
        }
    }
    intervention.push(ImpactRecord::new(IndicatorCode::Carbon, 2020, 42.0));

    for mode in [ComparisonMode::Absolute, ComparisonMode::Relative] {
        let request = ComparisonRequest::new(GroupBy::Supplier).with_mode(mode);
        let table = compare(&baseline, &intervention, &request).unwrap();
        assert_eq!(table.indicators.len(), 3);
        assert_row_sums(&table);
    }
}

#[test]
fn records_without_the_dimension_are_unassigned() {
    let intervention = [
        ImpactRecord::new(DF, 2020, 5.0),
        record(DF, 2020, 1.0, "zeta"),
    ];
    let table = compare(&[], &intervention, &ComparisonRequest::new(GroupBy::Supplier)).unwrap();
    let groups: Vec<_> = table.indicators[0].rows.iter().map(|r| r.group.clone()).collect();
    assert_eq!(groups, vec![GroupKey::Named("zeta".into()), GroupKey::Unassigned]);
}

#[test]
fn relative_mode_reports_percentages_of_canceled() {
    let baseline = [record(DF, 2020, 2000.0, "Oils")];
    let intervention = [record(DF, 2020, 1500.0, "Oils"), record(DF, 2020, 600.0, "Textile")];
    let request = ComparisonRequest::new(GroupBy::Supplier).with_mode(ComparisonMode::Relative);
    let table = compare(&baseline, &intervention, &request).unwrap();
    let df = table.indicator(DF).unwrap();

    assert_eq!(df.rows[0].values[0].percentage, Some(-25.0));
    assert_eq!(df.rows[1].values[0].percentage, None);
    // totals: 2100 new against 2000 canceled
    let total = df.year_sum(2020).unwrap();
    assert_eq!(total.impact_result, 100.0);
    assert!(near(total.percentage.unwrap(), 5.0));
}

#[test]
fn year_range_filters_records() {
    let baseline = [record(DF, 2015, 9.0, "x"), record(DF, 2020, 1.0, "x")];
    let table = compare(&baseline, &[], &ComparisonRequest::new(GroupBy::Supplier).with_years(2020, 2020)).unwrap();
    let df = table.indicator(DF).unwrap();
    assert_eq!(df.year_sum.len(), 1);
    assert_eq!(df.year_sum(2020).unwrap().canceled_impact, 1.0);
}

#[test]
fn intervention_split_cancels_actual_sourcing() {
    let records = [
        record(DF, 2020, 300.0, "kept"),
        record(DF, 2020, 2000.0, "Oils").with_role(ImpactRole::Canceled),
        record(DF, 2020, 1500.0, "Oils").with_role(ImpactRole::Replacing),
    ];
    let sides = geoimpact_compare::split_intervention(&records);
    let table = compare(&sides.baseline, &sides.intervention, &ComparisonRequest::new(GroupBy::Supplier)).unwrap();
    let df = table.indicator(DF).unwrap();
    assert_eq!(df.row(&GroupKey::Named("kept".into())).unwrap().values[0].impact_result, 0.0);
    assert_eq!(df.year_sum(2020).unwrap().impact_result, -500.0);
}

#[test]
fn scenarios_compare_intervention_sides() {
    let first = [
        record(DF, 2020, 2000.0, "Oils").with_role(ImpactRole::Canceled),
        record(DF, 2020, 0.0, "Oils").with_role(ImpactRole::Replacing),
    ];
    let second = [
        record(DF, 2020, 2000.0, "Oils").with_role(ImpactRole::Canceled),
        record(DF, 2020, 1500.0, "Oils").with_role(ImpactRole::Replacing),
    ];
    let table = compare_scenarios(&first, &second, &ComparisonRequest::new(GroupBy::Supplier)).unwrap();
    let v = table.indicator(DF).unwrap().rows[0].values[0].clone();
    assert_eq!((v.new_impact, v.canceled_impact, v.impact_result), (1500.0, 0.0, 1500.0));
}

#[test]
fn non_finite_values_are_rejected() {
    let baseline = [record(DF, 2021, f64::NAN, "x")];
    let err = compare(&baseline, &[], &ComparisonRequest::new(GroupBy::Supplier)).unwrap_err();
    assert_eq!(err, CompareError::NonFiniteValue { indicator: DF, year: 2021 });
}

#[test]
fn table_json_shape() {
    let baseline = [record(DF, 2020, 2.0, "x").with_tonnes(4.0)];
    let table = compare(&baseline, &[], &ComparisonRequest::new(GroupBy::Supplier)).unwrap();
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json["groupBy"], "supplier");
    assert_eq!(json["mode"], "absolute");
    assert_eq!(json["indicators"][0]["indicator"], "DF_LUC_T");
    assert_eq!(json["indicators"][0]["rows"][0]["group"], "x");
    assert_eq!(json["indicators"][0]["yearSum"][0]["impactResult"], -2.0);
    assert_eq!(json["purchasedTonnes"][0]["value"], 4.0);
}

#[test]
fn empty_inputs_give_an_empty_table() {
    let table = compare(&[], &[], &ComparisonRequest::new(GroupBy::Material)).unwrap();
    assert!(table.is_empty());
    assert!(table.years.is_empty());
    assert!(table.purchased_tonnes.is_empty());
}
