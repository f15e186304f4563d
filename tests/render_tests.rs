use chrono::NaiveDate;
use kasboek::core::{Cell, DataRow};
use kasboek::render::{FormatConfig, RowKind, render};
use kasboek::template::{HeaderContext, Template, analyze};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn plan_for(rows: &[&[&str]]) -> kasboek::template::ReportPlan {
    let template = Template::parse(&grid(rows)).unwrap();
    analyze(
        &template,
        &HeaderContext::for_year(2024),
        &FormatConfig::default(),
    )
    .unwrap()
}

fn booking_row(booking_type: &str, maingroup: &str, subgroup: &str, amount: Decimal) -> DataRow {
    DataRow::new(vec![
        Cell::Text(booking_type.into()),
        Cell::Text(maingroup.into()),
        Cell::Text(subgroup.into()),
        Cell::Amount(amount),
    ])
}

fn cells(row: &kasboek::render::RenderedRow) -> Vec<&str> {
    row.cells.iter().map(String::as_str).collect()
}

// ---------------------------------------------------------------------------
// The canonical level-break scenario
// ---------------------------------------------------------------------------

#[test]
fn two_rows_one_maingroup_emits_maingroup_and_general_totals() {
    let plan = plan_for(&[
        &["{TYPES}", "{MAINGROUPS}", "{SUBGROUPS}", "{AMOUNTS}"],
        &["{TOTAL_MAINGROUP}"],
        &["{TOTAL_GENERAL}"],
    ]);
    let data = vec![
        booking_row("Inkomsten", "Levend geld", "Collecte", dec!(100.00)),
        booking_row("Inkomsten", "Levend geld", "Gift", dec!(50.00)),
    ];
    let rendered = render(&plan, &FormatConfig::default(), &data).unwrap();

    let rows: Vec<Vec<&str>> = rendered.rows.iter().map(cells).collect();
    assert_eq!(
        rows,
        vec![
            vec!["Inkomsten", "Levend geld", "Collecte", "100,00"],
            vec!["", "", "Gift", "50,00"],
            vec!["", "Totaal Levend geld", "", "150,00"],
            vec!["Totaal Generaal", "", "", "150,00"],
        ]
    );
    assert_eq!(rendered.general_totals, vec![dec!(150.00)]);
    assert_eq!(rendered.detail_count, 2);
}

#[test]
fn group_labels_print_only_on_change() {
    let plan = plan_for(&[&["{TYPES}", "{MAINGROUPS}", "{SUBGROUPS}", "{AMOUNTS}"]]);
    let data = vec![
        booking_row("Inkomsten", "Levend geld", "Collecte", dec!(1)),
        booking_row("Inkomsten", "Levend geld", "Gift", dec!(2)),
        booking_row("Inkomsten", "Rente", "Spaarrekening", dec!(3)),
    ];
    let rendered = render(&plan, &FormatConfig::default(), &data).unwrap();
    let rows: Vec<Vec<&str>> = rendered.rows.iter().map(cells).collect();
    assert_eq!(rows[0][0], "Inkomsten");
    assert_eq!(rows[1][0], "", "unchanged type label suppressed");
    assert_eq!(rows[1][1], "", "unchanged maingroup label suppressed");
    assert_eq!(rows[2][1], "Rente", "maingroup break reprints label");
    assert_eq!(rows[2][0], "", "type unchanged across maingroup break");
}

// ---------------------------------------------------------------------------
// Break cascade and per-level resets
// ---------------------------------------------------------------------------

#[test]
fn type_break_flushes_and_resets_lower_levels() {
    let plan = plan_for(&[
        &["{TYPES}", "{MAINGROUPS}", "{SUBGROUPS}", "{AMOUNTS}"],
        &["{TOTAL_MAINGROUP}"],
        &["{TOTAL_TYPE}"],
        &["{TOTAL_GENERAL}"],
    ]);
    let data = vec![
        booking_row("Inkomsten", "A", "s1", dec!(10)),
        booking_row("Inkomsten", "A", "s2", dec!(20)),
        booking_row("Inkomsten", "B", "s3", dec!(30)),
        booking_row("Uitgaven", "C", "s4", dec!(-5)),
        booking_row("Uitgaven", "C", "s5", dec!(-7)),
    ];
    let rendered = render(&plan, &FormatConfig::default(), &data).unwrap();
    let totals: Vec<Vec<&str>> = rendered
        .rows
        .iter()
        .filter(|r| r.kind == RowKind::Total)
        .map(cells)
        .collect();
    assert_eq!(
        totals,
        vec![
            // Mid-data: maingroup A closes on the break to B.
            vec!["", "Totaal A", "", "30,00"],
            // Type break: B had one row only, so no maingroup total for it;
            // the type total flushes before the new type starts.
            vec!["Totaal Inkomsten", "", "", "60,00"],
            // End of data: least significant first, General always last.
            vec!["", "Totaal C", "", "-12,00"],
            vec!["Totaal Uitgaven", "", "", "-12,00"],
            vec!["Totaal Generaal", "", "", "48,00"],
        ]
    );
}

#[test]
fn single_row_group_gets_no_total() {
    let plan = plan_for(&[
        &["{TYPES}", "{MAINGROUPS}", "{SUBGROUPS}", "{AMOUNTS}"],
        &["{TOTAL_MAINGROUP}"],
        &["{TOTAL_GENERAL}"],
    ]);
    let data = vec![booking_row("Inkomsten", "Levend geld", "Collecte", dec!(100))];
    let rendered = render(&plan, &FormatConfig::default(), &data).unwrap();
    let totals: Vec<Vec<&str>> = rendered
        .rows
        .iter()
        .filter(|r| r.kind == RowKind::Total)
        .map(cells)
        .collect();
    // No maingroup total over a single row; the General flush is forced.
    assert_eq!(totals, vec![vec!["Totaal Generaal", "", "", "100,00"]]);
}

#[test]
fn undeclared_totals_are_computed_but_dropped() {
    let plan = plan_for(&[&["{TYPES}", "{MAINGROUPS}", "{SUBGROUPS}", "{AMOUNTS}"]]);
    let data = vec![
        booking_row("Inkomsten", "A", "s1", dec!(10)),
        booking_row("Inkomsten", "A", "s2", dec!(20)),
    ];
    let rendered = render(&plan, &FormatConfig::default(), &data).unwrap();
    assert!(rendered.rows.iter().all(|r| r.kind != RowKind::Total));
    // The General sums are still available for the cross-checker.
    assert_eq!(rendered.general_totals, vec![dec!(30)]);
}

// ---------------------------------------------------------------------------
// Formatting inside the engine
// ---------------------------------------------------------------------------

#[test]
fn zero_amounts_render_empty() {
    let plan = plan_for(&[&["{TYPES}", "{MAINGROUPS}", "{SUBGROUPS}", "{AMOUNTS}"]]);
    let data = vec![booking_row("Inkomsten", "A", "s1", dec!(0.00))];
    let rendered = render(&plan, &FormatConfig::default(), &data).unwrap();
    assert_eq!(rendered.rows[0].cells[3], "");
}

#[test]
fn dates_render_day_month_year() {
    let plan = plan_for(&[&["{DATES}", "{DESCRIPTIONS}", "{COSTS}", "{REVENUES}"]]);
    let data = vec![DataRow::new(vec![
        Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
        Cell::Text("Collecte".into()),
        Cell::Amount(Decimal::ZERO),
        Cell::Amount(dec!(100)),
    ])];
    let rendered = render(&plan, &FormatConfig::default(), &data).unwrap();
    assert_eq!(
        cells(&rendered.rows[0]),
        vec!["15-01-2024", "Collecte", "", "100,00"]
    );
}

#[test]
fn blank_line_before_total_follows_template() {
    let template = Template::parse(&grid(&[
        &["{TYPES}", "{MAINGROUPS}", "{SUBGROUPS}", "{AMOUNTS}"],
        &[""],
        &["{TOTAL_GENERAL}"],
    ]))
    .unwrap();
    let plan = analyze(
        &template,
        &HeaderContext::for_year(2024),
        &FormatConfig::default(),
    )
    .unwrap();
    let data = vec![booking_row("Inkomsten", "A", "s1", dec!(10))];
    let rendered = render(&plan, &FormatConfig::default(), &data).unwrap();
    let kinds: Vec<RowKind> = rendered.rows.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![RowKind::Detail, RowKind::Blank, RowKind::Total]);
}

#[test]
fn column_count_mismatch_is_fatal() {
    let plan = plan_for(&[&["{TYPES}", "{MAINGROUPS}", "{SUBGROUPS}", "{AMOUNTS}"]]);
    let short = DataRow::new(vec![Cell::Text("Inkomsten".into())]);
    let err = render(&plan, &FormatConfig::default(), &[short]).unwrap_err();
    assert!(matches!(
        err,
        kasboek::core::ReportError::ColumnCountMismatch { template: 4, data: 1 }
    ));
}

#[test]
fn csv_output_uses_crlf() {
    let plan = plan_for(&[&["{TYPES}", "{MAINGROUPS}", "{SUBGROUPS}", "{AMOUNTS}"]]);
    let data = vec![booking_row("Inkomsten", "A", "s1", dec!(10))];
    let rendered = render(&plan, &FormatConfig::default(), &data).unwrap();
    let csv = rendered.to_csv(';');
    assert_eq!(csv, "Inkomsten;A;s1;10,00\r\n");
}
