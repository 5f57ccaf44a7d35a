use std::borrow::Cow;
use std::collections::HashMap;

use serde::Serialize;

pub const INDICATOR_FALLBACK: &str = "enterprises engaged in digital activity";
pub const INDUSTRY_FALLBACK: &str = "the selected industry";

/// Label/code pair offered by one of the form's selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormOption {
    pub label: &'static str,
    pub code: &'static str,
}

const fn option(label: &'static str, code: &'static str) -> FormOption {
    FormOption { label, code }
}

const FREQUENCIES: &[FormOption] = &[option("Annual", "A")];

const COMPANY_SIZES: &[FormOption] = &[option("Enterprises with 10+ employees", "GE10")];

const INDUSTRIES: &[FormOption] = &[
    option("All market sectors (B\u{2013}N, S95)", "B-N_S95_XK"),
    option("Manufacturing", "C"),
    option("Wholesale & retail trade", "G"),
    option("Information & communication", "J"),
];

const INDICATORS: &[FormOption] = &[
    option("Enterprises selling online", "E_SELL"),
    option("Enterprises buying online", "PC_BUY"),
    option("Enterprises using computers / ICT", "PC_ENT"),
];

const UNITS: &[FormOption] = &[
    option("% of enterprises", "PC_ENT"),
    option("% of persons employed", "PC_PERS"),
];

const GEOGRAPHIES: &[FormOption] = &[
    option("Germany", "DE"),
    option("France", "FR"),
    option("Austria", "AT"),
    option("Belgium", "BE"),
    option("Netherlands", "NL"),
    option("Italy", "IT"),
    option("Spain", "ES"),
    option("Poland", "PL"),
    option("Czechia", "CZ"),
    option("Denmark", "DK"),
    option("Sweden", "SE"),
    option("Finland", "FI"),
    option("Ireland", "IE"),
    option("Portugal", "PT"),
    option("Greece", "EL"),
    option("Romania", "RO"),
    option("Bulgaria", "BG"),
    option("Hungary", "HU"),
    option("Croatia", "HR"),
    option("Slovakia", "SK"),
    option("Slovenia", "SI"),
    option("Estonia", "EE"),
    option("Latvia", "LV"),
    option("Lithuania", "LT"),
];

const INDICATOR_PHRASES: &[(&str, &str)] = &[
    ("E_SELL", "enterprises selling online"),
    ("PC_BUY", "enterprises buying online"),
    ("PC_ENT", "enterprises using ICT or computers"),
];

const INDUSTRY_PHRASES: &[(&str, &str)] = &[
    ("C", "the manufacturing sector"),
    ("G", "the wholesale & retail trade sector"),
    ("J", "the information & communication sector"),
    ("B-N_S95_XK", "all market sectors"),
];

/// Option lists rendered by the input form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormCatalog {
    pub frequencies: &'static [FormOption],
    pub company_sizes: &'static [FormOption],
    pub industries: &'static [FormOption],
    pub indicators: &'static [FormOption],
    pub units: &'static [FormOption],
    pub geographies: &'static [FormOption],
}

impl FormCatalog {
    pub const fn standard() -> Self {
        Self {
            frequencies: FREQUENCIES,
            company_sizes: COMPANY_SIZES,
            industries: INDUSTRIES,
            indicators: INDICATORS,
            units: UNITS,
            geographies: GEOGRAPHIES,
        }
    }
}

impl Default for FormCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Display-only code translations. Never consulted for prediction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeLookupTables {
    countries: HashMap<String, String>,
    indicators: HashMap<String, String>,
    industries: HashMap<String, String>,
}

impl CodeLookupTables {
    pub fn new(
        countries: HashMap<String, String>,
        indicators: HashMap<String, String>,
        industries: HashMap<String, String>,
    ) -> Self {
        Self {
            countries,
            indicators,
            industries,
        }
    }

    /// Tables for the e-commerce survey codes. Country names come from the
    /// form's geography suggestions.
    pub fn standard() -> Self {
        let countries = FormCatalog::standard()
            .geographies
            .iter()
            .map(|geo| (geo.code.to_string(), geo.label.to_string()))
            .collect();

        Self::new(
            countries,
            owned_pairs(INDICATOR_PHRASES),
            owned_pairs(INDUSTRY_PHRASES),
        )
    }

    pub fn country<'a>(&'a self, code: &str) -> Cow<'a, str> {
        match self.countries.get(code) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("country code {code}")),
        }
    }

    pub fn indicator(&self, code: &str) -> &str {
        self.indicators
            .get(code)
            .map(String::as_str)
            .unwrap_or(INDICATOR_FALLBACK)
    }

    pub fn industry(&self, code: &str) -> &str {
        self.industries
            .get(code)
            .map(String::as_str)
            .unwrap_or(INDUSTRY_FALLBACK)
    }
}

fn owned_pairs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(code, text)| (code.to_string(), text.to_string()))
        .collect()
}
