//! Writing categorized transactions back to CSV

use std::path::Path;

use spendmap_parser::{AMOUNT_COLUMN, CATEGORY_COLUMN, DATE_COLUMN, DESCRIPTION_COLUMN};
use spendmap_utils::atomic_write;

use crate::error::{CoreError, CoreResult};
use crate::models::Transaction;

/// Render transactions as CSV with a `Category` column
///
/// Unresolved transactions get an empty category.
pub fn to_csv_bytes(transactions: &[Transaction]) -> CoreResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_error = |e: csv::Error| CoreError::InvalidInput {
        message: format!("Cannot encode CSV: {}", e),
    };

    writer
        .write_record([DATE_COLUMN, DESCRIPTION_COLUMN, AMOUNT_COLUMN, CATEGORY_COLUMN])
        .map_err(csv_error)?;
    for t in transactions {
        writer
            .write_record([
                t.date.format("%Y-%m-%d").to_string(),
                t.description.clone(),
                t.amount.to_string(),
                t.category.clone().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    writer.into_inner().map_err(|e| CoreError::InvalidInput {
        message: format!("Cannot encode CSV: {}", e.error()),
    })
}

/// Write transactions to `path`, replacing the file atomically
pub fn write_csv(path: impl AsRef<Path>, transactions: &[Transaction]) -> CoreResult<()> {
    let path = path.as_ref();
    let bytes = to_csv_bytes(transactions)?;
    atomic_write(path, &bytes).map_err(|e| CoreError::io(path, e))?;
    log::info!("Exported {} transactions to {}", transactions.len(), path.display());
    Ok(())
}
