//! Formatted terminal output for predictions and history tables.
//!
//! We keep formatting code in one place so:
//! - the encoding/prediction code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::data::history::HistoryData;
use crate::domain::{HistoricalRecord, PredictOutput};

/// Format the full prediction run summary.
pub fn format_run_summary(output: &PredictOutput, data: &HistoryData) -> String {
    let mut out = String::new();

    out.push_str("=== mpp - Market Price Prediction ===\n");
    out.push_str(&format!(
        "Dataset: n={} rows used ({} skipped)\n",
        data.rows_used,
        data.row_errors.len()
    ));

    let s = &output.input.selection;
    out.push_str(&format!(
        "Input: {} | {} / {} / {} | {} | {} | {}\n",
        s.commodity, s.region, s.district, s.market, s.unit, s.priceflag, s.pricetype
    ));

    out.push_str(&format!(
        "Date: {:04}-{:02}-{:02} (ISO week {})\n",
        output.input.year, output.input.month, output.input.day, output.input.week
    ));
    if output.week_fallback {
        out.push_str("Warning: invalid date entered; defaulted to week 1.\n");
    }

    out.push_str(&format!(
        "\nPredicted price: {} TZS\n",
        fmt_price(output.price)
    ));

    if output.history.is_empty() {
        out.push_str("\nNo historical data available for trend chart.\n");
    } else {
        let first = output.history.first().map(|r| r.date);
        let last = output.history.last().map(|r| r.date);
        if let (Some(first), Some(last)) = (first, last) {
            out.push_str(&format!(
                "\nHistory: n={} | {first} → {last}\n",
                output.history.len()
            ));
        }
    }

    out
}

/// Format the trend table (most recent rows last, matching chart order).
pub fn format_history_table(records: &[HistoricalRecord], limit: usize) -> String {
    let mut out = String::new();
    if records.is_empty() {
        out.push_str("No historical data available for trend chart.\n");
        return out;
    }

    out.push_str(&format!(
        "{:<12} {:>14} {:<10} {:<10} {:<10}\n",
        "date", "price (TZS)", "type", "unit", "flag"
    ));

    let skipped = records.len().saturating_sub(limit);
    if skipped > 0 {
        out.push_str(&format!("… {skipped} earlier rows elided …\n"));
    }
    for r in records.iter().skip(skipped) {
        out.push_str(&format!(
            "{:<12} {:>14} {:<10} {:<10} {:<10}\n",
            r.date.to_string(),
            fmt_price(r.price),
            r.pricetype,
            r.unit,
            r.priceflag
        ));
    }

    out
}

/// Price with thousands separators and two decimals (e.g. `12,345.67`).
pub fn fmt_price(value: f64) -> String {
    let negative = value < 0.0;
    let raw = format!("{:.2}", value.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketSelection, RawInput};
    use chrono::NaiveDate;

    #[test]
    fn price_formatting_groups_thousands() {
        assert_eq!(fmt_price(0.0), "0.00");
        assert_eq!(fmt_price(850.0), "850.00");
        assert_eq!(fmt_price(2534.126), "2,534.13");
        assert_eq!(fmt_price(1_234_567.8), "1,234,567.80");
        assert_eq!(fmt_price(-1234.5), "-1,234.50");
    }

    #[test]
    fn empty_history_renders_the_no_data_notice() {
        let table = format_history_table(&[], 20);
        assert!(table.contains("No historical data"));
    }

    #[test]
    fn long_history_elides_earlier_rows() {
        let records: Vec<HistoricalRecord> = (1..=5)
            .map(|m| HistoricalRecord {
                date: NaiveDate::from_ymd_opt(2023, m, 15).unwrap(),
                region: "Arusha".to_string(),
                district: "Arusha City".to_string(),
                market: "Arusha Urban".to_string(),
                category: "cereals and tubers".to_string(),
                commodity: "Maize".to_string(),
                unit: "KG".to_string(),
                priceflag: "actual".to_string(),
                pricetype: "Retail".to_string(),
                price: 800.0 + f64::from(m),
            })
            .collect();

        let table = format_history_table(&records, 2);
        assert!(table.contains("3 earlier rows elided"));
        assert!(table.contains("2023-05-15"));
        assert!(!table.contains("2023-01-15"));
    }

    #[test]
    fn summary_surfaces_the_week_fallback_warning() {
        let output = PredictOutput {
            input: RawInput {
                selection: MarketSelection {
                    region: "Arusha".to_string(),
                    district: "Arusha City".to_string(),
                    market: "Arusha Urban".to_string(),
                    category: "cereals and tubers".to_string(),
                    commodity: "Maize".to_string(),
                    unit: "KG".to_string(),
                    priceflag: "actual".to_string(),
                    pricetype: "Retail".to_string(),
                },
                year: 2024,
                month: 2,
                day: 30,
                week: 1,
            },
            week_fallback: true,
            price: 912.5,
            history: Vec::new(),
        };
        let data = HistoryData {
            records: Vec::new(),
            catalog: Default::default(),
            stats: crate::data::HistoryStats {
                n_records: 0,
                date_min: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                date_max: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                price_min: 0.0,
                price_max: 0.0,
            },
            row_errors: Vec::new(),
            rows_read: 0,
            rows_used: 0,
        };

        let summary = format_run_summary(&output, &data);
        assert!(summary.contains("defaulted to week 1"));
        assert!(summary.contains("912.50 TZS"));
        assert!(summary.contains("No historical data"));
    }
}
