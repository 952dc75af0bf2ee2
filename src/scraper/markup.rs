use scraper::{ElementRef, Html, Selector};

/// Selector queries over a rendered page snapshot.
///
/// Every lookup is isolated: an invalid selector or a missing element yields
/// an empty value instead of an error, so one absent field never aborts
/// extraction of the others.
pub struct Markup {
    document: Html,
}

impl Markup {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match parse_selector(selector) {
            Some(sel) => self.document.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    pub fn exists(&self, selector: &str) -> bool {
        !self.select(selector).is_empty()
    }

    /// Trimmed text of the first match, empty when absent.
    pub fn text(&self, selector: &str) -> String {
        self.select(selector)
            .first()
            .map(|el| element_text(el))
            .unwrap_or_default()
    }

    /// Trimmed text of the first match, `None` when absent or blank.
    pub fn opt_text(&self, selector: &str) -> Option<String> {
        non_empty(self.text(selector))
    }

    /// Trimmed text of every match.
    pub fn texts(&self, selector: &str) -> Vec<String> {
        self.select(selector).iter().map(element_text).collect()
    }

    /// Attribute of the first match.
    pub fn attr(&self, selector: &str, name: &str) -> Option<String> {
        self.select(selector)
            .first()
            .and_then(|el| el.value().attr(name))
            .map(|v| v.trim().to_string())
    }
}

/// Concatenated, trimmed text content of an element.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first descendant of `el` matching `selector`.
pub fn child_text(el: &ElementRef<'_>, selector: &str) -> String {
    parse_selector(selector)
        .and_then(|sel| el.select(&sel).next().map(|child| element_text(&child)))
        .unwrap_or_default()
}

/// Attribute of the first descendant of `el` matching `selector`.
pub fn child_attr(el: &ElementRef<'_>, selector: &str, name: &str) -> Option<String> {
    let sel = parse_selector(selector)?;
    el.select(&sel)
        .next()
        .and_then(|child| child.value().attr(name))
        .map(|v| v.trim().to_string())
}

pub fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::debug!(selector, error = %e, "Invalid CSS selector");
            None
        }
    }
}
