//! Typed shape of the structured analysis report.
//!
//! This mirrors the JSON contract the model is instructed to emit. The
//! analyzer deserializes the model's final payload into [`AnalysisResult`];
//! a payload that does not fit is a pipeline failure, not a partial success.

use serde::{Deserialize, Serialize};

/// A follow-up question or action the buyer should raise for a risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Short label, e.g. "Spørg mægler".
    #[serde(rename = "promptTitle")]
    pub prompt_title: String,
    /// The concrete question to ask.
    pub prompt: String,
}

/// One identified risk in the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskItem {
    /// One of: Energi, Tilstand, Økonomi, Beliggenhed, Juridisk, Andet.
    pub category: String,
    pub title: String,
    pub details: String,
    /// Listing text (or reasoning) the risk is grounded on.
    pub excerpt: String,
    pub recommendations: Vec<Recommendation>,
}

/// One identified benefit of the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightItem {
    pub icon: String,
    pub title: String,
    pub details: String,
}

/// Basic facts about the property, as the model read them off the listing.
///
/// All fields are free-form strings; the listing sites do not agree on
/// formats and the model passes values through as written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyDetails {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub udbetaling: Option<String>,
    #[serde(default, rename = "pricePerM2")]
    pub price_per_m2: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, rename = "værelser")]
    pub vaerelser: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default, rename = "boligType")]
    pub bolig_type: Option<String>,
    #[serde(default)]
    pub ejerform: Option<String>,
    #[serde(default, rename = "energiMaerke")]
    pub energi_maerke: Option<String>,
    #[serde(default)]
    pub byggeaar: Option<String>,
    #[serde(default)]
    pub renoveringsaar: Option<String>,
    #[serde(default, rename = "maanedligeUdgift")]
    pub maanedlige_udgift: Option<String>,
}

/// The full structured report produced by one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub property: Option<PropertyDetails>,
    pub risks: Vec<RiskItem>,
    pub highlights: Vec<HighlightItem>,
}
