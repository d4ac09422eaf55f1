//! HTML rendering capability.
//!
//! wicket does not ship a template language. [`Templates`] maps names to plain
//! render functions, which is enough for `format!`-style pages or for pages
//! built with a compile-time templating crate. Plug in anything else through
//! [`HtmlRender`].

use std::collections::HashMap;

use crate::error::Error;

pub trait HtmlRender: Send + Sync {
    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, Error>;
}

type Template = Box<dyn Fn(&serde_json::Value) -> String + Send + Sync>;

/// Named render functions.
///
/// ```rust
/// use wicket::Templates;
///
/// let templates = Templates::new().add("hello", |data| {
///     format!("<h1>Hello, {}</h1>", data["name"].as_str().unwrap_or("stranger"))
/// });
/// ```
#[derive(Default)]
pub struct Templates {
    templates: HashMap<String, Template>,
}

impl Templates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(mut self, name: impl Into<String>, template: F) -> Self
    where
        F: Fn(&serde_json::Value) -> String + Send + Sync + 'static,
    {
        self.templates.insert(name.into(), Box::new(template));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

impl HtmlRender for Templates {
    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, Error> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| Error::TemplateNotFound(name.to_owned()))?;
        Ok(template(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_by_name() {
        let t = Templates::new().add("greet", |d| format!("<p>{}</p>", d["who"].as_str().unwrap_or("")));
        assert_eq!(t.render("greet", &json!({"who": "ann"})).unwrap(), "<p>ann</p>");
        assert!(matches!(t.render("other", &json!(null)), Err(Error::TemplateNotFound(n)) if n == "other"));
    }
}
