//! Parser module for extracting structured data from HTML
//!
//! Extraction is driven by declarative [`Rule`]s: a selector plus what to read
//! from the first match (its text or a named attribute). Rules never fail at
//! extraction time; a selector that matches nothing yields an empty string.
//! Site-specific rule sets live in the submodules as plain data so layout
//! drift only touches selectors.

pub mod anime;
pub mod social;

use scraper::{ElementRef, Selector};

use crate::scraper::ScraperError;

/// A declarative extraction rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Concatenated, trimmed text of the first match
    Text(&'static str),
    /// Named attribute of the first match
    Attr(&'static str, &'static str),
}

impl Rule {
    pub fn css(&self) -> &'static str {
        match self {
            Rule::Text(css) | Rule::Attr(css, _) => css,
        }
    }
}

/// Compile a CSS selector, surfacing parse failures as errors
pub fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|_| ScraperError::InvalidSelector(css.to_string()))
}

/// A compiled [`Rule`]
#[derive(Debug)]
pub struct Field {
    selector: Selector,
    attr: Option<&'static str>,
}

impl Field {
    pub fn compile(rule: Rule) -> Result<Self, ScraperError> {
        let attr = match rule {
            Rule::Text(_) => None,
            Rule::Attr(_, name) => Some(name),
        };
        Ok(Self {
            selector: selector(rule.css())?,
            attr,
        })
    }

    fn read(&self, el: ElementRef<'_>) -> String {
        match self.attr {
            Some(name) => el.value().attr(name).unwrap_or_default().to_string(),
            None => text_of(el),
        }
    }

    /// Value of the first match under `scope`, or empty
    pub fn first(&self, scope: ElementRef<'_>) -> String {
        self.nth(scope, 0)
    }

    /// Value of the match at zero-based `index`, or empty when out of range
    pub fn nth(&self, scope: ElementRef<'_>, index: usize) -> String {
        scope
            .select(&self.selector)
            .nth(index)
            .map(|el| self.read(el))
            .unwrap_or_default()
    }

    /// Value of the last match under `scope`, or empty
    pub fn last(&self, scope: ElementRef<'_>) -> String {
        scope
            .select(&self.selector)
            .last()
            .map(|el| self.read(el))
            .unwrap_or_default()
    }

    /// Values of every match, in document order
    pub fn all(&self, scope: ElementRef<'_>) -> Vec<String> {
        scope.select(&self.selector).map(|el| self.read(el)).collect()
    }
}

/// Positional slots: the nth `slot` element, then `value` inside it.
///
/// A slot missing its value yields an empty string without shifting the
/// positions of the slots after it.
#[derive(Debug)]
pub struct Slots {
    slot: Selector,
    value: Field,
}

impl Slots {
    pub fn compile(slot: &'static str, value: Rule) -> Result<Self, ScraperError> {
        Ok(Self {
            slot: selector(slot)?,
            value: Field::compile(value)?,
        })
    }

    /// Number of slot elements under `scope`
    pub fn count(&self, scope: ElementRef<'_>) -> usize {
        scope.select(&self.slot).count()
    }

    pub fn value_at(&self, scope: ElementRef<'_>, index: usize) -> String {
        scope
            .select(&self.slot)
            .nth(index)
            .map(|slot| self.value.first(slot))
            .unwrap_or_default()
    }
}

/// Apply `f` to every match of `selector`, preserving document order
pub fn each<'a, T, F>(
    scope: ElementRef<'a>,
    selector: &Selector,
    f: F,
) -> Result<Vec<T>, ScraperError>
where
    F: FnMut(ElementRef<'a>) -> Result<T, ScraperError>,
{
    scope.select(selector).map(f).collect()
}

/// Trimmed text content of an element
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Split `text` on `separator` and take part `index`.
///
/// A missing part is an extraction miss rather than a silent empty value.
pub fn split_nth<'a>(
    text: &'a str,
    separator: &str,
    index: usize,
    field: &'static str,
) -> Result<&'a str, ScraperError> {
    text.split(separator)
        .nth(index)
        .ok_or_else(|| ScraperError::missing(field, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const LIST: &str = r#"
        <html><body>
            <ul class="items">
                <li><a href="/a" title="First">  One </a></li>
                <li><a href="/b" title="Second">Two</a></li>
                <li><a href="/c">Three</a></li>
            </ul>
            <div class="row">
                <div><span>1</span></div>
                <div></div>
                <div><span>3</span></div>
            </div>
        </body></html>
    "#;

    #[test]
    fn test_text_rule_first_match_trimmed() {
        let doc = Html::parse_document(LIST);
        let field = Field::compile(Rule::Text("ul.items li a")).unwrap();
        assert_eq!(field.first(doc.root_element()), "One");
    }

    #[test]
    fn test_attr_rule() {
        let doc = Html::parse_document(LIST);
        let field = Field::compile(Rule::Attr("ul.items li a", "href")).unwrap();
        assert_eq!(field.first(doc.root_element()), "/a");
        assert_eq!(field.last(doc.root_element()), "/c");
        assert_eq!(field.nth(doc.root_element(), 1), "/b");
    }

    #[test]
    fn test_missing_match_is_empty() {
        let doc = Html::parse_document(LIST);
        let text = Field::compile(Rule::Text("p.nothing")).unwrap();
        let attr = Field::compile(Rule::Attr("ul.items li a", "data-missing")).unwrap();
        assert_eq!(text.first(doc.root_element()), "");
        assert_eq!(attr.first(doc.root_element()), "");
        assert_eq!(text.nth(doc.root_element(), 7), "");
        assert!(text.all(doc.root_element()).is_empty());
    }

    #[test]
    fn test_all_preserves_document_order() {
        let doc = Html::parse_document(LIST);
        let field = Field::compile(Rule::Attr("ul.items li a", "title")).unwrap();
        assert_eq!(field.all(doc.root_element()), vec!["First", "Second", ""]);
    }

    #[test]
    fn test_each_maps_in_order() {
        let doc = Html::parse_document(LIST);
        let items = selector("ul.items li").unwrap();
        let link = Field::compile(Rule::Text("a")).unwrap();
        let titles = each(doc.root_element(), &items, |li| Ok(link.first(li))).unwrap();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_slots_do_not_shift() {
        let doc = Html::parse_document(LIST);
        let slots = Slots::compile("div.row > div", Rule::Text("span")).unwrap();
        let root = doc.root_element();
        assert_eq!(slots.value_at(root, 0), "1");
        assert_eq!(slots.value_at(root, 1), "");
        assert_eq!(slots.value_at(root, 2), "3");
        assert_eq!(slots.value_at(root, 3), "");
        assert_eq!(slots.count(root), 3);
    }

    #[test]
    fn test_invalid_selector() {
        let err = selector("div[").unwrap_err();
        assert!(matches!(err, ScraperError::InvalidSelector(_)));
    }

    #[test]
    fn test_split_nth() {
        assert_eq!(split_nth("Released: 2002", "Released: ", 1, "release").unwrap(), "2002");
        let err = split_nth("2002", "Released: ", 1, "release").unwrap_err();
        assert!(matches!(err, ScraperError::ExtractionMiss { field: "release", .. }));
    }
}
