//! HTML views rendered with Handlebars from embedded templates.

use axum::response::Html;
use handlebars::Handlebars;
use rust_embed::RustEmbed;
use serde::Serialize;

use crate::shared::error::{Result, SsoError};

#[derive(RustEmbed)]
#[folder = "assets/templates"]
struct Templates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Index,
    Login,
    Home,
    Error,
}

impl View {
    pub const ALL: [View; 4] = [View::Index, View::Login, View::Home, View::Error];

    pub fn name(self) -> &'static str {
        match self {
            View::Index => "index",
            View::Login => "login",
            View::Home => "home",
            View::Error => "error",
        }
    }

    fn file(self) -> String {
        format!("{}.hbs", self.name())
    }
}

/// Compiled view templates
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn load() -> Result<Self> {
        let mut registry = Handlebars::new();

        for view in View::ALL {
            let file = view.file();
            let content = Templates::get(&file)
                .ok_or_else(|| SsoError::internal(format!("Missing template: {}", file)))?;
            let source = std::str::from_utf8(&content.data)
                .map_err(|e| SsoError::internal(format!("Template {} is not UTF-8: {}", file, e)))?;
            registry.register_template_string(view.name(), source)?;
        }

        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, view: View, data: &T) -> Result<Html<String>> {
        Ok(Html(self.registry.render(view.name(), data)?))
    }
}
