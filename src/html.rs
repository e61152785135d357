//! Templating boundary.
//!
//! Wraps a Jinja-style environment with the bundled table template and
//! default style sheet compiled in, so nothing is located through ambient
//! filesystem paths at run time. Callers may register extra templates or
//! render one-off template strings.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::Result;

/// Name of the built-in table template.
pub const SQL_TABLE_TEMPLATE: &str = "sql_table";

/// Built-in CSS block prepended to report mails when no style is set.
pub const DEFAULT_STYLE: &str = include_str!("templates/default_style.html");

const SQL_TABLE_SOURCE: &str = include_str!("templates/sql_table.html");

/// Renders HTML fragments for tables and mail bodies.
pub struct HtmlRenderer {
    env: Environment<'static>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        // Bundled templates are known-good.
        env.add_template(SQL_TABLE_TEMPLATE, SQL_TABLE_SOURCE)
            .ok();
        Self { env }
    }

    /// Register an additional template under `name`.
    pub fn add_template(&mut self, name: &'static str, source: &'static str) -> Result<()> {
        self.env.add_template(name, source)?;
        Ok(())
    }

    /// Render a registered template with an arbitrary context.
    pub fn render<C: Serialize>(&self, name: &str, ctx: C) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }

    /// Render a one-off template string with an arbitrary context.
    pub fn render_str<C: Serialize>(&self, source: &str, ctx: C) -> Result<String> {
        Ok(self.env.render_str(source, ctx)?)
    }

    /// Render the built-in table template from a header row and a body grid.
    pub fn render_table(&self, header: &[String], body: &[Vec<String>]) -> Result<String> {
        self.render(
            SQL_TABLE_TEMPLATE,
            context! { header => header, body => body },
        )
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}
