//! Agent instructions rendered from Handlebars templates
//!
//! Templates are compiled into the binary. A prompt directory can replace any of them with a
//! `<name>.hbs` file of the same name.

use handlebars::Handlebars;
use std::path::{Path, PathBuf};

pub const ROOT_AGENT: &str = "root_agent";
pub const MEDICATION_DATA_AGENT: &str = "medication_data_agent";

const EMBEDDED: &[(&str, &str)] = &[
    (ROOT_AGENT, include_str!("../prompts/root_agent.hbs")),
    (
        MEDICATION_DATA_AGENT,
        include_str!("../prompts/medication_data_agent.hbs"),
    ),
];

#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    dir: Option<PathBuf>,
}

impl PromptLibrary {
    /// Embedded templates only
    pub fn embedded() -> Self {
        Self::default()
    }

    /// Templates in `dir` take precedence over the embedded ones
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn source(&self, name: &str) -> anyhow::Result<String> {
        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{}.hbs", name));
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading prompt template");
                return Ok(std::fs::read_to_string(&path)?);
            }
        }

        EMBEDDED
            .iter()
            .find(|(embedded, _)| *embedded == name)
            .map(|(_, template)| template.to_string())
            .ok_or_else(|| anyhow::anyhow!("Unknown prompt template: {}", name))
    }

    /// Renders the named template with an empty context
    pub fn render(&self, name: &str) -> anyhow::Result<String> {
        let template = self.source(name)?;

        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string(name, template)?;

        Ok(handlebars.render(name, &serde_json::json!({}))?)
    }
}
