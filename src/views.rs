use anyhow::Context as _;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tera::{Context, Tera};
use tracing::error;

use crate::error::AppResult;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("card_fields.html", include_str!("../templates/card_fields.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("cards.html", include_str!("../templates/cards.html")),
    ("add_card.html", include_str!("../templates/add_card.html")),
    ("edit_card.html", include_str!("../templates/edit_card.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// Compiled page templates. Output of `.html` templates is auto-escaped.
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .context("compile templates")?;
        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, ctx: &Context) -> AppResult<Html<String>> {
        Ok(Html(self.tera.render(template, ctx)?))
    }

    /// Render `template` with `status`; a template failure becomes a bare 500.
    pub fn page(&self, status: StatusCode, template: &str, ctx: &Context) -> Response {
        match self.render(template, ctx) {
            Ok(html) => (status, html).into_response(),
            Err(e) => {
                error!(error = %e, template, "render failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.user_message()).into_response()
            }
        }
    }

    pub fn error_page(&self, status: StatusCode, message: &str, username: Option<&str>) -> Response {
        let mut ctx = Context::new();
        ctx.insert("title", "Error");
        ctx.insert("error", message);
        if let Some(username) = username {
            ctx.insert("username", username);
        }
        self.page(status, "error.html", &ctx)
    }
}
