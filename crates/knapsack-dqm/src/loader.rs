use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::builder::BuildError;
use crate::items::Items;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Line {line}: expected 3 fields (cost, weight, number), found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("Line {line}: invalid {field} '{text}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        text: String,
    },
    #[error("No item rows found")]
    Empty,
    #[error(transparent)]
    Items(#[from] BuildError),
}

/// Read a headerless `cost,weight,number` file
pub fn load_items(path: impl AsRef<Path>) -> Result<Items, LoadError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| LoadError::IoError(format!("{}: {}", path.display(), e)))?;
    let items = parse_items(&source)?;
    debug!(path = %path.display(), items = items.len(), "loaded items");
    Ok(items)
}

/// Parse headerless `cost,weight,number` rows, one item per line.
/// Blank lines are ignored.
pub fn parse_items(source: &str) -> Result<Items, LoadError> {
    let mut costs = Vec::new();
    let mut weights = Vec::new();
    let mut numbers = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
        let [cost, weight, number] = fields.as_slice() else {
            return Err(LoadError::FieldCount { line, found: fields.len() });
        };

        costs.push(parse_amount(cost, line, "cost")?);
        weights.push(parse_amount(weight, line, "weight")?);
        numbers.push(parse_count(number, line)?);
    }

    if costs.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(Items::new(costs, weights, numbers)?)
}

fn parse_amount(text: &str, line: usize, field: &'static str) -> Result<f64, LoadError> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(LoadError::InvalidNumber {
            line,
            field,
            text: text.to_string(),
        }),
    }
}

fn parse_count(text: &str, line: usize) -> Result<usize, LoadError> {
    // Accept integral floats such as "3.0"
    let parsed = text.parse::<usize>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
            .map(|v| v as usize)
    });
    parsed.ok_or_else(|| LoadError::InvalidNumber {
        line,
        field: "number",
        text: text.to_string(),
    })
}
