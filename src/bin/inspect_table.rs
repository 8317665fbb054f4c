use popdash::{Indicator, IndicatorTable};
use std::{env, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to an exported indicator Parquet file.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <PARQUET_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect_table(Path::new(&args[1])) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

/// Print the schema, the row count and every row of an exported table.
fn inspect_table(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let table = IndicatorTable::read_parquet(path)?;
    let dates = table.dates();

    println!("=== Indicator table: {} ===", path.display());
    println!("Rows:    {}", table.num_rows());
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        println!("Span:    {} .. {}", first, last);
    }
    println!();

    println!("=== Columns ===");
    for (i, name) in table.column_names().iter().enumerate() {
        println!("{:>2}  {}", i, name);
    }
    println!();

    println!("=== Rows ===");
    for (row, date) in dates.iter().enumerate() {
        let values: Vec<String> = Indicator::ALL
            .iter()
            .map(|ind| {
                table
                    .value(row, *ind)
                    .map_or_else(|| "-".to_string(), |v| v.to_string())
            })
            .collect();
        println!("{}  {}", date, values.join("  "));
    }

    Ok(())
}
