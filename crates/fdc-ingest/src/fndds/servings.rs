//! Household servings from `food_portion.csv`

use csv_async::StringRecord;
use fdc_common::types::GRAM_BASIS;
use fdc_common::{Food, Serving};
use serde::{Deserialize, Serialize};

use crate::fields::{number_or_zero, optional_number, optional_text, text};
use crate::join::RowDecoder;

/// Column positions in `food_portion.csv`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingColumns {
    pub fdc_id: usize,
    /// Household quantity, e.g. the 1 of "1 cup"
    pub amount: usize,
    pub description: usize,
    pub modifier: usize,
    pub gram_weight: usize,
}

impl Default for ServingColumns {
    fn default() -> Self {
        Self {
            fdc_id: 1,
            amount: 3,
            description: 5,
            modifier: 6,
            gram_weight: 7,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServingDecoder {
    columns: ServingColumns,
}

impl ServingDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, columns: ServingColumns) -> Self {
        self.columns = columns;
        self
    }
}

impl RowDecoder for ServingDecoder {
    type Item = Serving;

    fn name(&self) -> &'static str {
        "servings"
    }

    fn foreign_key_column(&self) -> usize {
        self.columns.fdc_id
    }

    fn decode(&self, row: &StringRecord, fdc_id: &str) -> Option<Serving> {
        Some(Serving {
            nutrient_basis: GRAM_BASIS.to_string(),
            description: text(row, self.columns.description),
            state: optional_text(row, self.columns.modifier),
            weight: optional_number(row, self.columns.gram_weight),
            amount: number_or_zero(row, self.columns.amount, "amount", fdc_id),
        })
    }

    fn assign(&self, food: &mut Food, items: Vec<Serving>) {
        food.servings = items;
    }
}
