//! Recipe ingredients from `input_food.csv`

use csv_async::StringRecord;
use fdc_common::{Food, InputFood};
use serde::{Deserialize, Serialize};

use crate::fields::{number_or_zero, text};
use crate::join::RowDecoder;

/// Column positions in `input_food.csv`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFoodColumns {
    pub fdc_id: usize,
    pub seq_no: usize,
    pub amount: usize,
    pub sr_code: usize,
    pub description: usize,
    pub unit: usize,
    pub portion: usize,
    pub portion_description: usize,
    pub weight: usize,
}

impl Default for InputFoodColumns {
    fn default() -> Self {
        Self {
            fdc_id: 1,
            seq_no: 3,
            amount: 4,
            sr_code: 5,
            description: 6,
            unit: 7,
            portion: 8,
            portion_description: 9,
            weight: 10,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputFoodDecoder {
    columns: InputFoodColumns,
}

impl InputFoodDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, columns: InputFoodColumns) -> Self {
        self.columns = columns;
        self
    }
}

impl RowDecoder for InputFoodDecoder {
    type Item = InputFood;

    fn name(&self) -> &'static str {
        "input foods"
    }

    fn foreign_key_column(&self) -> usize {
        self.columns.fdc_id
    }

    fn decode(&self, row: &StringRecord, fdc_id: &str) -> Option<InputFood> {
        let c = &self.columns;
        Some(InputFood {
            seq_no: number_or_zero(row, c.seq_no, "seq_num", fdc_id),
            description: text(row, c.description),
            unit: text(row, c.unit),
            amount: number_or_zero(row, c.amount, "amount", fdc_id),
            weight: number_or_zero(row, c.weight, "gram_weight", fdc_id),
            sr_code: number_or_zero(row, c.sr_code, "sr_code", fdc_id),
            portion: text(row, c.portion),
            portion_description: text(row, c.portion_description),
        })
    }

    fn assign(&self, food: &mut Food, items: Vec<InputFood>) {
        food.input_foods = items;
    }
}
