use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timing of the intake relative to meals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MealTiming {
    Before,
    During,
    After,
    None,
}

impl fmt::Display for MealTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            MealTiming::Before => "before",
            MealTiming::During => "during",
            MealTiming::After => "after",
            MealTiming::None => "none",
        };
        f.write_str(value)
    }
}

/// Gender of the patient: m = male, f = female, d = diverse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
    #[serde(rename = "d")]
    Diverse,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Gender::Male => "m",
            Gender::Female => "f",
            Gender::Diverse => "d",
        };
        f.write_str(value)
    }
}

/// An adverse drug reaction report, documented as a Confluence page
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AdverseEventReport {
    #[schemars(description = "The name of the medicine taken.")]
    pub medication: String,

    #[schemars(description = "The observed side effect, e.g. \"headache\" or \"nausea\".")]
    pub side_effect: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "The dosage of the medicine, e.g. \"500mg\" or \"1 tablet\".")]
    pub dose: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "The duration of intake, e.g. \"5 days\" or \"2 weeks\".")]
    pub intake_duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "The severity of the side effect from 1 (mild) to 10 (severe).",
        range(min = 1, max = 10)
    )]
    pub side_effect_intensity: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Other symptoms reported by the patient.")]
    pub symptoms: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Other medications taken at the same time.")]
    pub other_medications: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Timing of the intake relative to meals.")]
    pub taken_with_meal: Option<MealTiming>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Age of the patient in years.")]
    pub age_of_patient: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Weight of the patient in kilograms.")]
    pub weight_of_patient: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Gender of the patient: m = male, f = female, d = diverse.")]
    pub gender_of_patient: Option<Gender>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Relevant pre-existing medical conditions.")]
    pub underlying_condition: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Known allergies of the patient.")]
    pub known_allergies: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConfluencePageResponse {
    /// Confirmation or failure text for the LLM
    pub message: String,

    /// Absolute URL of the created page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
