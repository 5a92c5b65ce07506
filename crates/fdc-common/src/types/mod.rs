//! Food documents and reference data
//!
//! JSON field names match the documents already served by the query API, so the
//! serde renames here are part of the storage format and must not drift.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Type marker written on every survey food aggregate.
pub const FOOD_TYPE: &str = "FOOD";

/// Nutrient basis used for survey serving sizes.
pub const GRAM_BASIS: &str = "g";

/// Merged survey food document.
///
/// Created by the seed loader from the primary extract. Each of the three
/// collections is owned by exactly one join worker, which replaces it wholesale
/// when it flushes a key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Food {
    #[serde(rename = "fdcId")]
    pub fdc_id: String,

    #[serde(rename = "foodDescription", default)]
    pub description: String,

    #[serde(rename = "dataSource", default)]
    pub source: String,

    /// `None` when the extract carried an unparsable date
    #[serde(rename = "publicationDateTime", default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<NaiveDate>,

    #[serde(rename = "type", default)]
    pub food_type: String,

    #[serde(rename = "foodCategory", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(rename = "servingSizes", default, skip_serializing_if = "Vec::is_empty")]
    pub servings: Vec<Serving>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nutrients: Vec<NutrientData>,

    #[serde(rename = "inputFoods", default, skip_serializing_if = "Vec::is_empty")]
    pub input_foods: Vec<InputFood>,
}

impl Food {
    /// Base aggregate as written by the seed loader, before any join.
    pub fn seed(
        fdc_id: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            fdc_id: fdc_id.into(),
            description: description.into(),
            source: source.into(),
            food_type: FOOD_TYPE.to_string(),
            ..Self::default()
        }
    }
}

/// A household serving size for a food
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Serving {
    #[serde(rename = "100UnitNutrientBasis")]
    pub nutrient_basis: String,

    #[serde(rename = "householdServingUom")]
    pub description: String,

    #[serde(rename = "servingState", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(rename = "weightInGmOrMl", default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,

    #[serde(rename = "householdServingValue")]
    pub amount: f32,
}

/// One nutrient value of a food, per 100 units
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientData {
    #[serde(rename = "valuePer100UnitServing")]
    pub value: f32,

    #[serde(default)]
    pub unit: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<String>,

    #[serde(rename = "nutrientNumber")]
    pub nutrient_number: u32,

    #[serde(rename = "nutrientName", default)]
    pub nutrient_name: String,
}

/// An ingredient food a survey food was composed from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputFood {
    pub seq_no: i32,
    pub description: String,
    pub unit: String,
    pub amount: f32,
    pub weight: f32,
    pub sr_code: i32,
    pub portion: String,
    pub portion_description: String,
}

/// Nutrient dictionary entry (category `NUT`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nutrient {
    pub nutrientno: u32,

    #[serde(default)]
    pub tagname: String,

    pub name: String,

    pub unit: String,

    #[serde(rename = "type", default)]
    pub category: String,
}

/// Derivation dictionary entry (category `DERV`)
///
/// Describes how a nutrient value was obtained (analysed, calculated, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    pub id: u32,

    pub code: String,

    #[serde(default)]
    pub description: String,
}
