//! CSS-selector queries over page snapshots

use crate::error::{JobScoutError, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// Snapshot of one DOM element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub text: String,
    pub attributes: HashMap<String, String>,
    pub outer_html: String,
}

impl Element {
    fn from_ref(element: ElementRef<'_>) -> Self {
        let value = element.value();
        Self {
            tag: value.name().to_lowercase(),
            text: clean_text(&element.text().collect::<Vec<_>>().join(" ")),
            attributes: value
                .attrs()
                .map(|(name, val)| (name.to_lowercase(), val.to_string()))
                .collect(),
            outer_html: element.html(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// Form found around a clicked element, ready for submission
#[derive(Debug, Clone, PartialEq)]
pub struct FormSpec {
    pub action: Option<String>,
    pub method: String,
    pub fields: Vec<(String, String)>,
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| JobScoutError::Browser(format!("Invalid selector '{}': {:?}", selector, e)))
}

/// Elements of a full document matching `selector`, in document order
pub fn select(html: &str, selector: &str) -> Result<Vec<Element>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document.select(&selector).map(Element::from_ref).collect())
}

/// Elements inside `parent` (the parent itself included) matching `selector`
pub fn select_within(parent: &Element, selector: &str) -> Result<Vec<Element>> {
    let selector = parse_selector(selector)?;
    let fragment = Html::parse_fragment(&parent.outer_html);
    Ok(fragment.select(&selector).map(Element::from_ref).collect())
}

/// The form enclosing `element`, with its current field values
pub fn enclosing_form(html: &str, element: &Element) -> Result<Option<FormSpec>> {
    let form_selector = parse_selector("form")?;
    let field_selector = parse_selector("input[name], textarea[name], button[name]")?;
    let document = Html::parse_document(html);

    let Some(form) = document
        .select(&form_selector)
        .find(|form| form.html().contains(&element.outer_html))
    else {
        return Ok(None);
    };

    let mut fields = Vec::new();
    for field in form.select(&field_selector) {
        let value = field.value();
        let Some(name) = value.attr("name") else { continue };
        let default_kind = if value.name() == "button" { "submit" } else { "text" };
        let kind = value.attr("type").unwrap_or(default_kind).to_lowercase();

        let included = match kind.as_str() {
            "checkbox" | "radio" => value.attr("checked").is_some(),
            "submit" | "button" | "image" => field.html() == element.outer_html,
            _ => true,
        };
        if !included {
            continue;
        }

        let field_value = if value.name() == "textarea" {
            field.text().collect::<String>()
        } else {
            value.attr("value").unwrap_or_default().to_string()
        };
        fields.push((name.to_string(), field_value));
    }

    Ok(Some(FormSpec {
        action: form.value().attr("action").map(str::to_string),
        method: form.value().attr("method").unwrap_or("get").to_lowercase(),
        fields,
    }))
}

/// Collapse runs of whitespace into single spaces
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
