use serde::Serialize;
use serde_json::Value;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a struct's fields as `KEY: value` lines, sorted by key.
/// Scripts that do not ask for JSON grep these.
pub fn print_fields<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let Value::Object(map) = serde_json::to_value(value)? else {
        anyhow::bail!("expected an object");
    };
    for (key, value) in map {
        match value {
            Value::String(s) => println!("{key}: {s}"),
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(plain).collect();
                println!("{key}: {}", items.join(", "));
            }
            other => println!("{key}: {other}"),
        }
    }
    Ok(())
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let pad = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", pad(headers.iter().map(|h| h.to_string()).collect()));
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));
    for row in rows {
        println!("{}", pad(row));
    }
}
