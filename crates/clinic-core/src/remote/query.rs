//! Query builder for the backend's auto-generated table API.
//!
//! Renders the PostgREST query-string dialect: `select=` projection with
//! embedded relations, `column=op.value` filters, `order=` and `limit=`.

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lt,
}

impl FilterOp {
    fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
        }
    }
}

/// A table query: projection, filters, ordering and limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: &'static str,
    select: String,
    filters: Vec<(String, FilterOp, String)>,
    order: Vec<(String, bool)>,
    limit: Option<usize>,
}

impl Query {
    /// Start a query selecting every column of `table`.
    pub fn from(table: &'static str) -> Self {
        Self {
            table,
            select: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Column projection, e.g. `*,patients(first_name,last_name)`.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = columns.split_whitespace().collect();
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn gte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn lt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOp::Lt, value)
    }

    fn filter(mut self, column: &str, op: FilterOp, value: impl ToString) -> Self {
        self.filters.push((column.to_string(), op, value.to_string()));
        self
    }

    /// Append an ordering term; later calls break ties of earlier ones.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// REST path for the table.
    pub fn path(&self) -> String {
        format!("/rest/v1/{}", self.table)
    }

    /// Query-string pairs, unencoded.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.select.clone())];

        for (column, op, value) in &self.filters {
            pairs.push((column.clone(), format!("{}.{}", op.as_str(), value)));
        }

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(column, ascending)| {
                    format!("{}.{}", column, if *ascending { "asc" } else { "desc" })
                })
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }

    /// Filters only, for update and delete requests.
    pub fn filter_pairs(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|(column, op, value)| (column.clone(), format!("{}.{}", op.as_str(), value)))
            .collect()
    }
}

/// Total row count from a `Content-Range` header (`0-24/573` or `*/573`).
pub fn parse_content_range(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_select_all_default() {
        let query = Query::from("patients");
        assert_eq!(query.path(), "/rest/v1/patients");
        assert_eq!(query.query_pairs(), vec![pair("select", "*")]);
    }

    #[test]
    fn test_embedded_relation_and_order() {
        let query = Query::from("appointments")
            .select("*, patients (first_name, last_name)")
            .order("appointment_date", true);

        assert_eq!(
            query.query_pairs(),
            vec![
                pair("select", "*,patients(first_name,last_name)"),
                pair("order", "appointment_date.asc"),
            ]
        );
    }

    #[test]
    fn test_filters_and_limit() {
        let query = Query::from("appointments")
            .gte("appointment_date", "2026-10-18T00:00:00Z")
            .lt("appointment_date", "2026-10-19T00:00:00Z")
            .eq("status", "In Progress")
            .order("created_at", false)
            .order("id", true)
            .limit(5);

        assert_eq!(
            query.query_pairs(),
            vec![
                pair("select", "*"),
                pair("appointment_date", "gte.2026-10-18T00:00:00Z"),
                pair("appointment_date", "lt.2026-10-19T00:00:00Z"),
                pair("status", "eq.In Progress"),
                pair("order", "created_at.desc,id.asc"),
                pair("limit", "5"),
            ]
        );
        assert_eq!(query.filter_pairs().len(), 3);
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-24/573"), Some(573));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-24/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }
}
