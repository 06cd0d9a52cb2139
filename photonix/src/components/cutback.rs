use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The grid of a cutback structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutbackSize {
    /// The number of rows. Always odd when derived from a column count.
    pub rows: usize,
    /// The number of columns.
    pub cols: usize,
}

/// Cutback sizes that accumulate each of the target losses.
///
/// Exactly one of `cols` and `rows` must be given; the other is derived from
/// `loss / loss_db`, the number of devices per structure. Derived row counts
/// are rounded down to an odd number so the structure ends on the opposite
/// side from where it starts.
pub fn cutback_loss_sizes(
    loss: &[f64],
    loss_db: f64,
    cols: Option<usize>,
    rows: Option<usize>,
) -> Result<Vec<CutbackSize>> {
    if !(loss_db > 0.) {
        return Err(Error::config(format!(
            "loss per device must be positive, got {loss_db} dB"
        )));
    }
    let devices = |loss: f64| {
        if loss < 0. {
            Err(Error::config(format!("target loss must be non-negative, got {loss} dB")))
        } else {
            Ok(loss / loss_db)
        }
    };
    match (cols, rows) {
        (Some(0), None) | (None, Some(0)) => {
            Err(Error::config("cutback rows and columns must be positive"))
        }
        (Some(cols), None) => loss
            .iter()
            .map(|&loss| {
                let rows = (devices(loss)? / cols as f64 / 2.).floor() as usize * 2 + 1;
                Ok(CutbackSize { rows, cols })
            })
            .collect(),
        (None, Some(rows)) => loss
            .iter()
            .map(|&loss| {
                let cols = (devices(loss)? / rows as f64).floor() as usize;
                Ok(CutbackSize { rows, cols })
            })
            .collect(),
        (Some(cols), Some(rows)) => Err(Error::config(format!(
            "specify either cols or rows for a cutback, not both (got cols={cols}, rows={rows})"
        ))),
        (None, None) => Err(Error::config("specify either cols or rows for a cutback")),
    }
}

/// Spiral lengths, in micrometers, that accumulate each of the target losses
/// at `loss_db_per_m` dB per meter.
pub fn cutback_loss_spiral_lengths(loss: &[f64], loss_db_per_m: f64) -> Result<Vec<f64>> {
    if !(loss_db_per_m > 0.) {
        return Err(Error::config(format!(
            "propagation loss must be positive, got {loss_db_per_m} dB/m"
        )));
    }
    Ok(loss.iter().map(|loss| loss / loss_db_per_m * 1e6).collect())
}
