//! Plain-language rendering of a prediction.
//!
//! Percentages are rounded to one decimal place with round-half-away-from-zero
//! applied to `prediction * 10` (so `2.25` shows as `2.3` and `42.45` as
//! `42.5`), then always printed with exactly one decimal digit.
//!
//! An absent or null code renders as an empty string, so a missing year
//! reads `in : 12.0%` rather than naming a null placeholder.

use std::fmt;

use handlebars::html_escape;
use serde::Serialize;

use super::lookups::CodeLookupTables;
use super::record::RawInputRecord;
use super::schema::FieldSchema;

pub const GEO_FIELD: &str = "geo";
pub const INDICATOR_FIELD: &str = "indic_is";
pub const INDUSTRY_FIELD: &str = "nace_r2";

/// Values whose scaled form overflows are returned unchanged.
pub fn round_one_decimal(value: f64) -> f64 {
    let scaled = value * 10.0;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / 10.0;
    // collapse -0.0 so small negative outputs never print as "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Resolved pieces of the display sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionSentence {
    pub indicator: String,
    pub industry: String,
    pub country: String,
    pub year: String,
    pub percentage: f64,
}

impl PredictionSentence {
    pub fn percentage_text(&self) -> String {
        format!("{:.1}%", self.percentage)
    }

    /// Sentence with each part emphasized. Every part is escaped because
    /// unknown codes and the year are echoed from caller input.
    pub fn to_html(&self) -> String {
        format!(
            "Estimated percentage of <b>{}</b> in <b>{}</b> of <b>{}</b> in <b>{}</b>: <b>{}</b>",
            html_escape(&self.indicator),
            html_escape(&self.industry),
            html_escape(&self.country),
            html_escape(&self.year),
            html_escape(&self.percentage_text()),
        )
    }
}

impl fmt::Display for PredictionSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Estimated percentage of {} in {} of {} in {}: {}",
            self.indicator,
            self.industry,
            self.country,
            self.year,
            self.percentage_text()
        )
    }
}

/// Resolve the sentence parts. The year is read from the schema's year
/// field and echoed as given.
pub fn describe(
    raw_input: &RawInputRecord,
    schema: &FieldSchema,
    prediction: f64,
    lookups: &CodeLookupTables,
) -> PredictionSentence {
    let geo = raw_input.display_value(GEO_FIELD);
    let indicator = raw_input.display_value(INDICATOR_FIELD);
    let industry = raw_input.display_value(INDUSTRY_FIELD);

    PredictionSentence {
        indicator: lookups.indicator(&indicator).to_string(),
        industry: lookups.industry(&industry).to_string(),
        country: lookups.country(&geo).into_owned(),
        year: raw_input.display_value(schema.year_field()),
        percentage: round_one_decimal(prediction),
    }
}

pub fn compose(
    raw_input: &RawInputRecord,
    schema: &FieldSchema,
    prediction: f64,
    lookups: &CodeLookupTables,
) -> String {
    describe(raw_input, schema, prediction, lookups).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR_FIELD: &str = "TIME_PERIOD";

    fn schema() -> FieldSchema {
        FieldSchema::ecommerce()
    }

    fn example_input(geo: &str, indicator: &str, industry: &str) -> RawInputRecord {
        RawInputRecord::new()
            .with(GEO_FIELD, geo)
            .with(INDICATOR_FIELD, indicator)
            .with(INDUSTRY_FIELD, industry)
            .with(YEAR_FIELD, "2021")
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_one_decimal(42.449999), 42.4);
        assert_eq!(round_one_decimal(42.45), 42.5);
        assert_eq!(round_one_decimal(2.25), 2.3);
        assert_eq!(round_one_decimal(-2.25), -2.3);
        assert_eq!(round_one_decimal(81.963), 82.0);
        assert!(round_one_decimal(-0.04).is_sign_positive());
    }

    #[test]
    fn rounding_leaves_overflowing_values_alone() {
        assert_eq!(round_one_decimal(1.0e308), 1.0e308);
        assert_eq!(round_one_decimal(f64::MAX), f64::MAX);
    }

    #[test]
    fn year_is_read_from_the_schema_year_field() {
        let lookups = CodeLookupTables::standard();
        let schema =
            FieldSchema::with_fields(["geo", "year"], "year", "bucket").expect("valid schema");
        let raw = RawInputRecord::new().with("geo", "DE").with("year", "2021");

        let message = compose(&raw, &schema, 1.0, &lookups);

        assert!(message.ends_with("of Germany in 2021: 1.0%"));
    }

    #[test]
    fn composes_known_codes() {
        let lookups = CodeLookupTables::standard();
        let raw = example_input("DE", "E_SELL", "C");
        let message = compose(&raw, &schema(), 37.2, &lookups);
        assert_eq!(
            message,
            "Estimated percentage of enterprises selling online in the manufacturing sector of Germany in 2021: 37.2%"
        );
    }

    #[test]
    fn unknown_codes_degrade_to_fallbacks() {
        let lookups = CodeLookupTables::standard();
        let raw = example_input("XX", "ZZZ", "Q");
        let message = compose(&raw, &schema(), 12.0, &lookups);
        assert!(message.contains("country code XX"));
        assert!(message.contains("enterprises engaged in digital activity"));
        assert!(message.contains("the selected industry"));
        assert!(message.ends_with("12.0%"));
    }

    #[test]
    fn year_is_echoed_literally() {
        let lookups = CodeLookupTables::standard();
        let raw = example_input("FR", "PC_ENT", "J").with(YEAR_FIELD, " 2022 ");
        let sentence = describe(&raw, &schema(), 50.0, &lookups);
        assert_eq!(sentence.year, " 2022 ");

        let sentence = describe(&RawInputRecord::new(), &schema(), 50.0, &lookups);
        assert_eq!(sentence.year, "");
        assert_eq!(sentence.country, "country code ");
    }

    #[test]
    fn html_variant_escapes_caller_text() {
        let lookups = CodeLookupTables::standard();
        let raw = example_input("<script>", "E_SELL", "G");
        let html = describe(&raw, &schema(), 10.0, &lookups).to_html();
        assert!(html.contains("<b>enterprises selling online</b>"));
        assert!(html.contains("the wholesale &amp; retail trade sector"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
