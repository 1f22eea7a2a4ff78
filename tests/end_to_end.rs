use call_report::config::Config;
use call_report::filters::{FilterStage, Selection};
use call_report::output;
use call_report::session::Session;
use call_report::types::{
    CALL_WITH_CLM, CUSTOMER_ID, DATE, DIVISION, MONTH, OWNER_NAME, P1, P2, P3, P4, SPECIALITY,
    TERRITORY_CODE, YEAR_MONTH,
};
use std::io::Write;

const EXPORT: &str = "\
Field Activity Report,,,,,,,,,,
,,,,,,,,,,
In-Field Activity: Owner Name,Territory Code,Division,Customer Id,Activity Date,Product 1,product2,P3,P4,Call with CLM,Specialty
Asha,T01,North,C1,2025-03-15,Alpha,Beta,,,YES,Cardio
Asha,T01,North,C2,2025-03-20,Alpha,,,,yes,Cardio
Ravi,T02,South,C3,2025-04-02,Gamma,Alpha,,,No,Derm
Ravi,T02,South,C3,not recorded,Beta,,,,,Derm
Meena,T03,North,C4,2025-02-11,,,,,YES,
";

fn write_export(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

#[test]
fn loads_normalizes_and_derives() {
    let file = write_export(EXPORT);
    let mut session = Session::new(Config::default());
    let table = session.load(file.path()).unwrap();
    assert_eq!(
        table.columns,
        vec![
            OWNER_NAME,
            TERRITORY_CODE,
            DIVISION,
            CUSTOMER_ID,
            DATE,
            P1,
            P2,
            P3,
            P4,
            CALL_WITH_CLM,
            SPECIALITY,
            MONTH,
            YEAR_MONTH
        ]
    );
    assert_eq!(table.len(), 5);
    let months: Vec<Option<String>> = table.column(MONTH).unwrap().map(|c| c.as_text()).collect();
    assert_eq!(
        months,
        vec![
            Some("Mar".to_string()),
            Some("Mar".to_string()),
            Some("Apr".to_string()),
            None,
            Some("Feb".to_string())
        ]
    );
}

#[test]
fn unfiltered_reports() {
    let file = write_export(EXPORT);
    let mut session = Session::new(Config::default());
    session.load(file.path()).unwrap();
    let bundle = session.reports().unwrap();

    assert_eq!(bundle.kpis.total_calls, 5);
    assert_eq!(bundle.kpis.unique_customers, Some(4));
    assert_eq!(bundle.kpis.products_discussed, 3);
    assert_eq!(bundle.kpis.clm_calls, 3);

    let trend: Vec<(String, usize)> = bundle
        .trend
        .unwrap()
        .into_iter()
        .map(|r| (r.period, r.total_calls))
        .collect();
    assert_eq!(
        trend,
        vec![("2025-02".into(), 1), ("2025-03".into(), 2), ("2025-04".into(), 1)]
    );

    let products: Vec<(String, usize)> = bundle
        .top_products
        .unwrap()
        .into_iter()
        .map(|r| (r.product, r.count))
        .collect();
    assert_eq!(
        products,
        vec![("Alpha".into(), 3), ("Beta".into(), 2), ("Gamma".into(), 1)]
    );

    let employees: Vec<(String, usize)> = bundle
        .top_employees
        .unwrap()
        .into_iter()
        .map(|r| (r.employee, r.total_calls))
        .collect();
    assert_eq!(
        employees,
        vec![("Asha".into(), 2), ("Ravi".into(), 2), ("Meena".into(), 1)]
    );

    let matrix = bundle.matrix.unwrap();
    assert_eq!(matrix.len(), 5);
    assert_eq!(matrix[0].speciality, "Cardio");
    assert_eq!(matrix[0].product, "Alpha");
    assert_eq!(matrix[0].count, 2);
}

#[test]
fn filtered_reports_and_exports() {
    let file = write_export(EXPORT);
    let mut session = Session::new(Config::default());
    session.load(file.path()).unwrap();
    session.set_filter(FilterStage::Division, Selection::parse("South"));
    session.set_filter(FilterStage::Product, Selection::parse("Alpha"));

    let bundle = session.reports().unwrap();
    assert_eq!(bundle.kpis.total_calls, 1);
    assert_eq!(bundle.filtered.index, vec![2]);
    assert_eq!(session.table().unwrap().len(), 5);

    let out = tempfile::tempdir().unwrap();
    output::write_table_csv(&out.path().join("filtered.csv"), &bundle.filtered).unwrap();
    output::write_json(&out.path().join("summary.json"), &session.summary(&bundle)).unwrap();
    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["filters"]["division"], "South");
    assert_eq!(summary["filters"]["month"], "All");
    assert_eq!(summary["kpis"]["total_calls"], 1);
}

#[test]
fn empty_file_is_reported() {
    let file = write_export("");
    let mut session = Session::new(Config::default());
    assert!(session.load(file.path()).is_err());
    assert!(session.reports().is_none());
}
