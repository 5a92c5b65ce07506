//! Nutrient values from `food_nutrient.csv`

use csv_async::StringRecord;
use fdc_common::{Food, NutrientData};
use serde::{Deserialize, Serialize};

use crate::dictionary::NutrientDictionary;
use crate::fields::{number_or_zero, optional_number, required_number};
use crate::join::RowDecoder;

/// Column positions in `food_nutrient.csv`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientColumns {
    pub fdc_id: usize,
    pub nutrient_number: usize,
    pub value: usize,
    pub derivation: usize,
}

impl Default for NutrientColumns {
    fn default() -> Self {
        Self {
            fdc_id: 1,
            nutrient_number: 2,
            value: 3,
            derivation: 5,
        }
    }
}

/// Resolves nutrient numbers against a loaded [`NutrientDictionary`]
///
/// A number missing from the dictionary still yields a nutrient, with blank
/// name and unit.
#[derive(Debug, Clone)]
pub struct NutrientDecoder {
    dictionary: NutrientDictionary,
    columns: NutrientColumns,
}

impl NutrientDecoder {
    pub fn new(dictionary: NutrientDictionary) -> Self {
        Self {
            dictionary,
            columns: NutrientColumns::default(),
        }
    }

    pub fn with_columns(mut self, columns: NutrientColumns) -> Self {
        self.columns = columns;
        self
    }
}

impl RowDecoder for NutrientDecoder {
    type Item = NutrientData;

    fn name(&self) -> &'static str {
        "nutrients"
    }

    fn foreign_key_column(&self) -> usize {
        self.columns.fdc_id
    }

    fn decode(&self, row: &StringRecord, fdc_id: &str) -> Option<NutrientData> {
        let nutrient_number: u32 =
            required_number(row, self.columns.nutrient_number, "nutrient_number", fdc_id)?;

        let (name, unit) = self
            .dictionary
            .nutrient(nutrient_number)
            .map(|n| (n.name.clone(), n.unit.clone()))
            .unwrap_or_default();

        let derivation = optional_number::<u32>(row, self.columns.derivation)
            .and_then(|id| self.dictionary.derivation(id))
            .map(|d| d.code.clone());

        Some(NutrientData {
            value: number_or_zero(row, self.columns.value, "value", fdc_id),
            unit,
            derivation,
            nutrient_number,
            nutrient_name: name,
        })
    }

    fn assign(&self, food: &mut Food, items: Vec<NutrientData>) {
        food.nutrients = items;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use fdc_common::{Derivation, Nutrient};

    fn decoder() -> NutrientDecoder {
        NutrientDecoder::new(NutrientDictionary::from_entries(
            vec![Nutrient {
                nutrientno: 203,
                name: "Protein".to_string(),
                unit: "g".to_string(),
                ..Default::default()
            }],
            vec![Derivation {
                id: 71,
                code: "A".to_string(),
                description: "Analytical".to_string(),
            }],
        ))
    }

    #[test]
    fn test_resolves_name_unit_and_derivation() {
        let row = StringRecord::from(vec!["1", "42", "203", "3.3", "", "71"]);
        let nutrient = decoder().decode(&row, "42").unwrap();

        assert_eq!(nutrient.nutrient_number, 203);
        assert_eq!(nutrient.nutrient_name, "Protein");
        assert_eq!(nutrient.unit, "g");
        assert_eq!(nutrient.value, 3.3);
        assert_eq!(nutrient.derivation.as_deref(), Some("A"));
    }

    #[test]
    fn test_unknown_number_keeps_blank_name() {
        let row = StringRecord::from(vec!["1", "42", "999", "1.5"]);
        let nutrient = decoder().decode(&row, "42").unwrap();

        assert_eq!(nutrient.nutrient_number, 999);
        assert_eq!(nutrient.nutrient_name, "");
        assert_eq!(nutrient.unit, "");
        assert_eq!(nutrient.derivation, None);
    }

    #[test]
    fn test_unparsable_number_skips_row() {
        let row = StringRecord::from(vec!["1", "42", "protein", "1.5"]);
        assert!(decoder().decode(&row, "42").is_none());
    }
}
