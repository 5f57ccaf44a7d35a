use handlebars::Handlebars;
use serde::Serialize;

use super::lookups::FormCatalog;
use super::presets::QuickExample;
use super::service::PredictionOutcome;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.hbs");
const INDEX: &str = "index";

/// Renders the form page, optionally with a result or error card.
pub struct PageRenderer {
    registry: Handlebars<'static>,
    catalog: FormCatalog,
}

impl PageRenderer {
    pub fn new(catalog: FormCatalog) -> Result<Self, PageError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(INDEX, INDEX_TEMPLATE)?;
        Ok(Self { registry, catalog })
    }

    pub fn form(&self) -> Result<String, PageError> {
        self.render(None, None)
    }

    pub fn outcome(&self, outcome: &PredictionOutcome) -> Result<String, PageError> {
        let card = ResultCard {
            message_html: outcome.sentence.to_html(),
            model: outcome.model.clone(),
            inputs: serde_json::to_string(&outcome.inputs)?,
        };
        self.render(Some(card), None)
    }

    pub fn error(&self, message: &str) -> Result<String, PageError> {
        self.render(None, Some(message))
    }

    fn render(
        &self,
        result: Option<ResultCard>,
        error: Option<&str>,
    ) -> Result<String, PageError> {
        let view = PageView {
            catalog: self.catalog,
            examples: QuickExample::ALL.map(ExampleButton::from),
            result,
            error,
        };
        Ok(self.registry.render(INDEX, &view)?)
    }
}

/// Route serving a quick example's demo button.
pub fn quick_example_path(example: QuickExample) -> String {
    format!("/quick_example_{}", example.number())
}

#[derive(Serialize)]
struct PageView<'a> {
    catalog: FormCatalog,
    examples: [ExampleButton; 2],
    result: Option<ResultCard>,
    error: Option<&'a str>,
}

#[derive(Serialize)]
struct ExampleButton {
    path: String,
    number: u8,
    label: &'static str,
}

impl From<QuickExample> for ExampleButton {
    fn from(example: QuickExample) -> Self {
        Self {
            path: quick_example_path(example),
            number: example.number(),
            label: example.label(),
        }
    }
}

/// Result card contents. `message_html` is already escaped.
#[derive(Serialize)]
struct ResultCard {
    message_html: String,
    model: String,
    inputs: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("invalid page template: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("failed to render page: {0}")]
    Render(#[from] handlebars::RenderError),
    #[error("failed to encode inputs: {0}")]
    Encode(#[from] serde_json::Error),
}
