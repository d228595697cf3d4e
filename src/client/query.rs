use std::fmt;

/// Column every listing is ordered by.
pub const CREATED_AT: &str = "created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Content,
    Media,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Content => "content",
            Table::Media => "media",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column equality filter. Values are kept in their wire form (`true`, `42`, `news`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

/// Logical shape of one backend request: collection, filters, ordering and paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub newest_first: bool,
    pub limit: Option<u32>,
    /// Inclusive row range, zero based.
    pub range: Option<(u64, u64)>,
}

impl Query {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            newest_first: false,
            limit: None,
            range: None,
        }
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.to_owned(),
            value: value.to_string(),
        });
        self
    }

    /// Orders by `created_at` descending, the only ordering the collections support.
    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn range(mut self, from: u64, to: u64) -> Self {
        self.range = Some((from, to));
        self
    }

    pub fn filter_value(&self, column: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.column == column)
            .map(|f| f.value.as_str())
    }

    /// Same collection and filters, no ordering or paging.
    pub fn count_only(&self) -> Self {
        Self {
            table: self.table,
            filters: self.filters.clone(),
            newest_first: false,
            limit: None,
            range: None,
        }
    }

    /// Renders the query as REST query-string parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_owned(), "*".to_owned())];
        for filter in &self.filters {
            params.push((filter.column.clone(), format!("eq.{}", filter.value)));
        }
        if self.newest_first {
            params.push(("order".to_owned(), format!("{}.desc", CREATED_AT)));
        }
        match (self.range, self.limit) {
            (Some((from, to)), _) => {
                params.push(("offset".to_owned(), from.to_string()));
                params.push(("limit".to_owned(), (to.saturating_sub(from) + 1).to_string()));
            }
            (None, Some(limit)) => params.push(("limit".to_owned(), limit.to_string())),
            (None, None) => {}
        }
        params
    }
}

/// Inclusive row range for a 1-based page.
pub fn page_range(page: u32, page_size: u32) -> (u64, u64) {
    let page = u64::from(page.max(1));
    let size = u64::from(page_size.max(1));
    let from = (page - 1) * size;
    (from, from + size - 1)
}
