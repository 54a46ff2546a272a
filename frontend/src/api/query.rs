use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    ILike,
}

impl FilterOp {
    fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::ILike => "ilike",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Compare {
        column: String,
        op: FilterOp,
        value: String,
    },
    In {
        column: String,
        values: Vec<String>,
    },
    /// Matches when any of the columns is `ilike` the pattern.
    AnyILike {
        columns: Vec<String>,
        pattern: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A table read or write target expressed in PostgREST terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    /// Inclusive row window.
    pub range: Option<(u64, u64)>,
    pub count_exact: bool,
}

/// Stringifies a scalar the way PostgREST expects it in a filter.
pub fn filter_value(value: impl Into<Value>) -> String {
    match value.into() {
        Value::String(s) => s,
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            range: None,
            count_exact: false,
        }
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    fn compare(mut self, column: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Compare {
            column: column.to_string(),
            op,
            value: filter_value(value),
        });
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, FilterOp::Eq, value)
    }

    pub fn neq(self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, FilterOp::Neq, value)
    }

    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, FilterOp::Gt, value)
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, FilterOp::Gte, value)
    }

    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, FilterOp::Lt, value)
    }

    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(column, FilterOp::Lte, value)
    }

    /// `pattern` uses SQL `%` wildcards.
    pub fn ilike(self, column: &str, pattern: impl Into<String>) -> Self {
        self.compare(column, FilterOp::ILike, Value::String(pattern.into()))
    }

    pub fn in_list<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.push(Filter::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn any_ilike(mut self, columns: &[&str], pattern: impl Into<String>) -> Self {
        self.filters.push(Filter::AnyILike {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            pattern: pattern.into(),
        });
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn range(mut self, from: u64, to: u64) -> Self {
        self.range = Some((from, to));
        self
    }

    /// Applies 1-based page pagination.
    pub fn page(self, page: u64, limit: u64) -> Self {
        let (from, to) = page_window(page, limit);
        self.range(from, to)
    }

    pub fn count_exact(mut self) -> Self {
        self.count_exact = true;
        self
    }

    /// Query parameters for `GET /rest/v1/{table}` (and filters of PATCH).
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.clone())];
        params.extend(self.filter_params());
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }
        params
    }

    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|filter| match filter {
                Filter::Compare { column, op, value } => {
                    (column.clone(), format!("{}.{}", op.as_str(), value))
                }
                Filter::In { column, values } => {
                    let list = values.iter().map(|v| quote_list_item(v)).collect::<Vec<_>>();
                    (column.clone(), format!("in.({})", list.join(",")))
                }
                Filter::AnyILike { columns, pattern } => {
                    let parts = columns
                        .iter()
                        .map(|c| format!("{}.ilike.{}", c, quote_list_item(pattern)))
                        .collect::<Vec<_>>();
                    ("or".to_string(), format!("({})", parts.join(",")))
                }
            })
            .collect()
    }

    /// Extra request headers (`Range`, `Prefer`).
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();
        if let Some((from, to)) = self.range {
            headers.push(("Range-Unit", "items".to_string()));
            headers.push(("Range", format!("{}-{}", from, to)));
        }
        if self.count_exact {
            headers.push(("Prefer", "count=exact".to_string()));
        }
        headers
    }
}

fn quote_list_item(value: &str) -> String {
    if value.contains(&[',', '(', ')', '"', ' '][..]) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Inclusive `(from, to)` window of a 1-based page.
pub fn page_window(page: u64, limit: u64) -> (u64, u64) {
    let page = page.max(1);
    let limit = limit.max(1);
    let from = (page - 1) * limit;
    (from, from + limit - 1)
}

/// Reads the total from a `Content-Range: 0-9/42` header.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/').and_then(|(_, total)| total.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_postgrest_filters_in_order() {
        let query = Query::table("attendance")
            .select("*")
            .eq("staff_id", "abc")
            .gte("date", "2025-03-01")
            .lt("date", "2025-04-01")
            .order("date", false);
        assert_eq!(
            query.to_params(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("staff_id".to_string(), "eq.abc".to_string()),
                ("date".to_string(), "gte.2025-03-01".to_string()),
                ("date".to_string(), "lt.2025-04-01".to_string()),
                ("order".to_string(), "date.desc".to_string()),
            ]
        );
        assert!(query.headers().is_empty());
    }

    #[test]
    fn in_lists_quote_reserved_characters() {
        let query = Query::table("staff").in_list("department", ["HR", "Sales, EMEA"]);
        assert_eq!(
            query.filter_params(),
            vec![(
                "department".to_string(),
                "in.(HR,\"Sales, EMEA\")".to_string()
            )]
        );
    }

    #[test]
    fn non_string_values_are_rendered_as_json_scalars() {
        let query = Query::table("attendance").eq("is_late", true).neq("status", Value::Null);
        assert_eq!(
            query.filter_params(),
            vec![
                ("is_late".to_string(), "eq.true".to_string()),
                ("status".to_string(), "neq.null".to_string()),
            ]
        );
    }

    #[test]
    fn any_ilike_renders_an_or_group() {
        let query = Query::table("staff").any_ilike(&["name", "email"], "%ada%");
        assert_eq!(
            query.filter_params(),
            vec![(
                "or".to_string(),
                "(name.ilike.%ada%,email.ilike.%ada%)".to_string()
            )]
        );
    }

    #[test]
    fn pagination_sets_range_and_count_headers() {
        let query = Query::table("staff").page(3, 10).count_exact();
        assert_eq!(query.range, Some((20, 29)));
        assert_eq!(
            query.headers(),
            vec![
                ("Range-Unit", "items".to_string()),
                ("Range", "20-29".to_string()),
                ("Prefer", "count=exact".to_string()),
            ]
        );
    }

    #[test]
    fn page_window_clamps_to_first_page() {
        assert_eq!(page_window(0, 10), (0, 9));
        assert_eq!(page_window(2, 0), (1, 1));
    }

    #[test]
    fn content_range_total_parsing() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
    }
}
