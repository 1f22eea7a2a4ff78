// Entry point and high-level CLI flow.
//
// - Option [1] loads a call export (CSV or first sheet of a workbook).
// - Option [2] picks filter selections from the values in the loaded data.
// - Option [3] prints KPIs and the four summaries, and exports them.
// - After generating reports, the user can go back to the menu or exit.
use call_report::config::Config;
use call_report::filters::{FilterStage, Selection};
use call_report::output;
use call_report::session::{ReportBundle, Session};
use call_report::util::format_int;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

/// Interactive call activity report.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Call export to load at startup (.csv, .tsv, .xlsx, .xls, .ods)
    file: Option<PathBuf>,
}

/// Print a prompt and read one trimmed line. `None` on end of input.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask whether to go back to the menu after generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = prompt("Back to Menu (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(session: &mut Session, path: PathBuf) {
    match session.load(&path) {
        Ok(table) => {
            println!(
                "Data loaded: {} rows, {} columns from {}\n",
                format_int(table.len()),
                format_int(table.columns.len()),
                path.display()
            );
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Pick one filter stage, then one of its values by number.
fn handle_filters(session: &mut Session) {
    if session.table().is_none() {
        println!("Error: No data loaded. Please load a file first (option 1).\n");
        return;
    }
    loop {
        println!("Filters:");
        for (i, stage) in FilterStage::ORDER.iter().enumerate() {
            println!("[{}] {}: {}", i + 1, stage.label(), session.filters().get(*stage));
        }
        println!("[6] Reset all");
        println!("[0] Done\n");
        let Some(choice) = prompt("Enter choice: ") else {
            return;
        };
        let stage = match choice.as_str() {
            "0" => return,
            "6" => {
                session.clear_filters();
                continue;
            }
            n => match n.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                Some(i) if i < FilterStage::ORDER.len() => FilterStage::ORDER[i],
                _ => {
                    println!("Invalid choice.\n");
                    continue;
                }
            },
        };
        let options = session.options(stage);
        for (i, opt) in options.iter().enumerate() {
            println!("  [{}] {}", i + 1, opt);
        }
        let Some(pick) = prompt(&format!("{}: ", stage.label())) else {
            return;
        };
        match pick.parse::<usize>().ok().and_then(|n| options.get(n.wrapping_sub(1))) {
            Some(value) => session.set_filter(stage, Selection::parse(value)),
            None => println!("Invalid choice. Filter unchanged."),
        }
        println!();
    }
}

fn print_kpis(bundle: &ReportBundle) {
    let k = &bundle.kpis;
    println!("Key Metrics");
    println!("  Total Calls:              {}", format_int(k.total_calls));
    match k.unique_customers {
        Some(n) => println!("  Unique Customers Covered: {}", format_int(n)),
        None => println!("  Unique Customers Covered: (no Customer ID column)"),
    }
    println!("  Products Discussed:       {}", format_int(k.products_discussed));
    println!("  CLM Calls:                {}\n", format_int(k.clm_calls));
}

fn export<T: serde::Serialize>(session: &Session, file: &str, rows: Option<&[T]>) {
    let Some(rows) = rows else { return };
    let path = session.config.out_dir.join(file);
    if let Err(e) = output::write_csv(&path, rows) {
        error!(path = %path.display(), error = %e, "export failed");
        eprintln!("Write error: {}", e);
    }
}

fn handle_generate_reports(session: &Session) {
    let Some(bundle) = session.reports() else {
        println!("Error: No data loaded. Please load a file first (option 1).\n");
        return;
    };
    let preview = session.config.preview_rows;
    let out_dir = &session.config.out_dir;
    if let Err(e) = std::fs::create_dir_all(out_dir) {
        eprintln!("Cannot create {}: {}", out_dir.display(), e);
    }

    print_kpis(&bundle);
    output::preview_rows("Calls Trend Over Months", bundle.trend.as_deref(), preview);
    output::preview_rows(
        &format!("Top {} Discussed Products", session.config.top_products),
        bundle.top_products.as_deref(),
        preview,
    );
    output::preview_rows(
        "Employee Productivity (Calls Made)",
        bundle.top_employees.as_deref(),
        preview,
    );
    output::preview_rows(
        "Product x Speciality Analysis",
        bundle.matrix.as_deref(),
        preview,
    );
    println!("Filtered Data ({} rows)\n", format_int(bundle.filtered.len()));
    println!("{}\n", output::render_table(&bundle.filtered, preview));

    export(session, "calls_trend.csv", bundle.trend.as_deref());
    export(session, "top_products.csv", bundle.top_products.as_deref());
    export(session, "top_employees.csv", bundle.top_employees.as_deref());
    export(session, "product_speciality.csv", bundle.matrix.as_deref());
    let filtered_path = out_dir.join("filtered_data.csv");
    if let Err(e) = output::write_table_csv(&filtered_path, &bundle.filtered) {
        eprintln!("Write error: {}", e);
    }
    if let Err(e) = output::write_json(&out_dir.join("summary.json"), &session.summary(&bundle)) {
        eprintln!("Write error: {}", e);
    }
    println!("(Full tables exported to {})\n", out_dir.display());
}

fn main() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut session = Session::new(Config::from_env());
    if let Some(path) = cli.file {
        handle_load(&mut session, path);
    }

    loop {
        println!("Call Activity Dashboard");
        println!("[1] Load a file");
        println!("[2] Set filters");
        println!("[3] Generate reports\n");
        let Some(choice) = prompt("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Some(path) = prompt("File path: ").filter(|p| !p.is_empty()) {
                    handle_load(&mut session, PathBuf::from(path));
                }
            }
            "2" => handle_filters(&mut session),
            "3" => {
                println!();
                handle_generate_reports(&session);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}
