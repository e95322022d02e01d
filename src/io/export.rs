//! CSV export of filtered history, optionally with the predicted price
//! attached to every row for side-by-side comparison.

use std::fs::File;
use std::path::Path;

use crate::domain::HistoricalRecord;
use crate::error::AppError;

pub fn write_history_csv(
    path: &Path,
    records: &[HistoricalRecord],
    predicted: Option<f64>,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec![
        "date",
        "admin1",
        "admin2",
        "market",
        "category",
        "commodity",
        "unit",
        "priceflag",
        "pricetype",
        "price",
    ];
    if predicted.is_some() {
        header.push("predicted_price");
    }
    writer
        .write_record(&header)
        .map_err(|e| AppError::input(format!("Failed to write export header: {e}")))?;

    for r in records {
        let mut row = vec![
            r.date.format("%Y-%m-%d").to_string(),
            r.region.clone(),
            r.district.clone(),
            r.market.clone(),
            r.category.clone(),
            r.commodity.clone(),
            r.unit.clone(),
            r.priceflag.clone(),
            r.pricetype.clone(),
            format!("{:.2}", r.price),
        ];
        if let Some(p) = predicted {
            row.push(format!("{p:.2}"));
        }
        writer
            .write_record(&row)
            .map_err(|e| AppError::input(format!("Failed to write export row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> HistoricalRecord {
        HistoricalRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            region: "Arusha".to_string(),
            district: "Arusha City".to_string(),
            market: "Arusha Urban".to_string(),
            category: "cereals and tubers".to_string(),
            commodity: "Maize".to_string(),
            unit: "KG".to_string(),
            priceflag: "actual".to_string(),
            pricetype: "Retail".to_string(),
            price: 850.0,
        }
    }

    #[test]
    fn export_includes_predicted_column_when_present() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        write_history_csv(&path, &[record()], Some(912.5)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().ends_with("price,predicted_price"));
        assert!(lines.next().unwrap().ends_with("850.00,912.50"));
    }

    #[test]
    fn export_without_prediction_keeps_dataset_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        write_history_csv(&path, &[record()], None).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.lines().next().unwrap().ends_with("pricetype,price"));
    }
}
