use crate::app::history::HistoryEntry;
use crate::domain::model::Package;
use crate::utils::error::Result;

const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M";

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let padding = width - cell.chars().count();
                format!("{}{}", cell, " ".repeat(padding))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(headers.to_vec())];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

pub fn render_package(package: &Package) -> String {
    if !package.found() {
        return format!("{}: package not found", package.courier_name);
    }

    let status = if package.delivered() {
        "Delivered"
    } else {
        "In transit"
    };
    let rows: Vec<Vec<String>> = package
        .locations()
        .iter()
        .map(|location| {
            vec![
                location.datetime().format(DATETIME_FORMAT).to_string(),
                location.location().to_string(),
                location.description().to_string(),
            ]
        })
        .collect();

    format!(
        "{} ({})\n{}",
        package.courier_name,
        status,
        table(&["Date", "Location", "Status"], &rows)
    )
}

pub fn render_package_json(package: &Package) -> Result<String> {
    Ok(serde_json::to_string_pretty(package)?)
}

pub fn render_courier_list(couriers: &[&str]) -> String {
    let rows: Vec<Vec<String>> = couriers.iter().map(|c| vec![c.to_string()]).collect();
    format!("Supported Couriers\n{}", table(&["Name"], &rows))
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.alias.clone(),
                entry.courier.clone(),
                entry.tracking_number.clone(),
            ]
        })
        .collect();
    format!(
        "Tracking History\n{}",
        table(&["Alias", "Courier", "Tracking Number"], &rows)
    )
}
