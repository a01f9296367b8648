//! Strapi's bracket-style query parameters.

/// Ordered key/value pairs for `RequestBuilder::query`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrapiQuery {
    params: Vec<(String, String)>,
}

impl StrapiQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.params.push(("pagination[page]".into(), page.to_string()));
        self.params
            .push(("pagination[pageSize]".into(), page_size.to_string()));
        self
    }

    pub fn sort(mut self, field: &str) -> Self {
        let index = self.params.iter().filter(|(k, _)| k.starts_with("sort")).count();
        self.params.push((format!("sort[{}]", index), field.to_string()));
        self
    }

    /// `populate[<relation>]=true`, or `populate[<relation>][populate]=<nested>`.
    pub fn populate(mut self, relation: &str, nested: Option<&str>) -> Self {
        match nested {
            Some(inner) => self
                .params
                .push((format!("populate[{}][populate]", relation), inner.to_string())),
            None => self.params.push((format!("populate[{}]", relation), "true".into())),
        }
        self
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }
}
