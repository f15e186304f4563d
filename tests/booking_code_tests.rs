use chrono::NaiveDate;
use kasboek::core::{BookingCatalog, BookingDefinition, Messages, ReportError, Transaction};
use kasboek::render::FormatConfig;
use kasboek::reports::booking_code::render_booking_code_results;
use kasboek::template::Template;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn code_template() -> Template {
    Template::parse(&grid(&[
        &["\"Resultaat per boekingscode {YEAR}\""],
        &["{BOOKING_CODES}", "{BOOKING_DESCRIPTIONS}", "{AMOUNTS}"],
        &["{TOTAL_GENERAL}"],
    ]))
    .unwrap()
}

fn catalog() -> BookingCatalog {
    BookingCatalog::new(vec![
        BookingDefinition {
            code: "AA".into(),
            description: "Aankopen".into(),
            booking_type: "Uitgaven".into(),
            maingroup: "Variabel".into(),
            subgroup: "Aankopen".into(),
            sequence: 30,
        },
        BookingDefinition {
            code: "BB".into(),
            description: "Bankkosten".into(),
            booking_type: "Uitgaven".into(),
            maingroup: "Vast".into(),
            subgroup: "Bankkosten".into(),
            sequence: 10,
        },
    ])
}

fn tx(code: &str, amount: Decimal) -> Transaction {
    Transaction {
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        description: "mutatie".into(),
        booking_code: code.into(),
        amount,
    }
}

// ---------------------------------------------------------------------------
// Condensation
// ---------------------------------------------------------------------------

#[test]
fn one_row_per_code_with_description() {
    // Pre-sorted by booking code, as the provider contract requires.
    let transactions = vec![
        tx("AA", dec!(10.00)),
        tx("AA", dec!(5.00)),
        tx("BB", dec!(-3.00)),
    ];
    let mut messages = Messages::new();
    let rendered = render_booking_code_results(
        &code_template(),
        2024,
        &transactions,
        dec!(12.00),
        &catalog(),
        &FormatConfig::default(),
        &mut messages,
    )
    .unwrap()
    .unwrap();
    let details: Vec<Vec<&str>> = rendered
        .rows
        .iter()
        .filter(|r| r.kind == kasboek::render::RowKind::Detail)
        .map(|r| r.cells.iter().map(String::as_str).collect())
        .collect();
    // Re-sorted by catalog sequence: BB (10) before AA (30).
    assert_eq!(
        details,
        vec![
            vec!["BB", "Bankkosten", "-3,00"],
            vec!["AA", "Aankopen", "15,00"],
        ]
    );
}

#[test]
fn final_zero_group_is_dropped() {
    let transactions = vec![
        tx("AA", dec!(10.00)),
        tx("BB", dec!(4.00)),
        tx("BB", dec!(-4.00)),
    ];
    let mut messages = Messages::new();
    let rendered = render_booking_code_results(
        &code_template(),
        2024,
        &transactions,
        dec!(10.00),
        &catalog(),
        &FormatConfig::default(),
        &mut messages,
    )
    .unwrap()
    .unwrap();
    assert_eq!(rendered.detail_count, 1, "zero-sum final code dropped");
}

#[test]
fn lone_zero_group_still_flushes() {
    // A report with only a zero-sum code still produces that one row.
    let transactions = vec![tx("AA", dec!(4.00)), tx("AA", dec!(-4.00))];
    let mut messages = Messages::new();
    let rendered = render_booking_code_results(
        &code_template(),
        2024,
        &transactions,
        dec!(0.00),
        &catalog(),
        &FormatConfig::default(),
        &mut messages,
    )
    .unwrap()
    .unwrap();
    assert_eq!(rendered.detail_count, 1);
}

#[test]
fn general_total_row_reconciles() {
    let transactions = vec![tx("AA", dec!(10.00)), tx("BB", dec!(-3.00))];
    let mut messages = Messages::new();
    let rendered = render_booking_code_results(
        &code_template(),
        2024,
        &transactions,
        dec!(7.00),
        &catalog(),
        &FormatConfig::default(),
        &mut messages,
    )
    .unwrap()
    .unwrap();
    assert!(rendered.to_csv(';').contains("Totaal Generaal;;7,00"));
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[test]
fn wrong_source_total_is_fatal() {
    let transactions = vec![tx("AA", dec!(10.00))];
    let mut messages = Messages::new();
    let err = render_booking_code_results(
        &code_template(),
        2024,
        &transactions,
        dec!(11.00),
        &catalog(),
        &FormatConfig::default(),
        &mut messages,
    )
    .unwrap_err();
    match err {
        ReportError::ConsistencyCheck { step, .. } => assert_eq!(step, "verdichting"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_code_warns_and_sorts_last() {
    let transactions = vec![tx("BB", dec!(1.00)), tx("ZZ", dec!(2.00))];
    let mut messages = Messages::new();
    let rendered = render_booking_code_results(
        &code_template(),
        2024,
        &transactions,
        dec!(3.00),
        &catalog(),
        &FormatConfig::default(),
        &mut messages,
    )
    .unwrap()
    .unwrap();
    let last = rendered
        .rows
        .iter()
        .filter(|r| r.kind == kasboek::render::RowKind::Detail)
        .next_back()
        .unwrap();
    assert_eq!(last.cells[0], "ZZ");
    assert_eq!(last.cells[1], "ZZ", "code stands in for the description");
    assert!(messages.warnings().count() >= 1);
}

#[test]
fn no_transactions_skips_with_warning() {
    let mut messages = Messages::new();
    let rendered = render_booking_code_results(
        &code_template(),
        2024,
        &[],
        Decimal::ZERO,
        &catalog(),
        &FormatConfig::default(),
        &mut messages,
    )
    .unwrap();
    assert!(rendered.is_none());
    assert_eq!(messages.warnings().count(), 1);
}
