//! OData-style query description handed to a [`crate::CatalogQueryRunner`].
//!
//! The engine only states projection, expansion, a substring filter on a text
//! field and an ascending sort. Encoding onto a URL is the runner's job.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataQuery {
    pub select: Vec<String>,
    pub expand: Vec<String>,
    pub filter: Option<String>,
    pub order_by: Option<(String, SortDirection)>,
    pub top: Option<u32>,
}

impl ODataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select.extend(fields.iter().map(|f| f.to_string()));
        self
    }

    pub fn expand(mut self, relations: &[&str]) -> Self {
        self.expand.extend(relations.iter().map(|r| r.to_string()));
        self
    }

    /// `substringof('<term>',<field>)` with the term's quotes escaped.
    pub fn filter_substring(mut self, field: &str, term: &str) -> Self {
        self.filter = Some(format!(
            "substringof('{}',{})",
            escape_odata_literal(term),
            field
        ));
        self
    }

    pub fn order_by_asc(mut self, field: &str) -> Self {
        self.order_by = Some((field.to_string(), SortDirection::Asc));
        self
    }

    pub fn order_by_desc(mut self, field: &str) -> Self {
        self.order_by = Some((field.to_string(), SortDirection::Desc));
        self
    }

    pub fn top(mut self, n: u32) -> Self {
        self.top = Some(n);
        self
    }

    /// Unencoded `(name, value)` pairs in a fixed order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if !self.select.is_empty() {
            out.push(("$select", self.select.join(",")));
        }
        if !self.expand.is_empty() {
            out.push(("$expand", self.expand.join(",")));
        }
        if let Some(f) = &self.filter {
            out.push(("$filter", f.clone()));
        }
        if let Some((field, dir)) = &self.order_by {
            out.push(("$orderby", format!("{} {}", field, dir.as_str())));
        }
        if let Some(n) = self.top {
            out.push(("$top", n.to_string()));
        }
        out
    }
}

impl fmt::Display for ODataQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        write!(f, "{}", parts.join("&"))
    }
}

/// Escape a string literal for an OData filter (`'` becomes `''`).
pub fn escape_odata_literal(s: &str) -> String {
    s.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_params_in_fixed_order() {
        let q = ODataQuery::new()
            .select(&["Id", "Title", "Author/EMail"])
            .expand(&["Author"])
            .order_by_asc("Order");
        assert_eq!(
            q.to_string(),
            "$select=Id,Title,Author/EMail&$expand=Author&$orderby=Order asc"
        );
    }

    #[test]
    fn descending_order_renders_desc() {
        let q = ODataQuery::new().order_by_asc("Title").order_by_desc("Order");
        assert_eq!(q.to_string(), "$orderby=Order desc");
    }

    #[test]
    fn substring_filter_escapes_quotes() {
        let q = ODataQuery::new().filter_substring("Title", "O'Brien's PPE");
        assert_eq!(
            q.filter.as_deref(),
            Some("substringof('O''Brien''s PPE',Title)")
        );
    }

    #[test]
    fn empty_query_renders_empty() {
        assert_eq!(ODataQuery::new().to_string(), "");
    }
}
