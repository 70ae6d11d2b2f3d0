use serde_json::Value;

/// A single row predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    /// Case-insensitive pattern; `%`/`*` match any run, `_` one character
    ILike(String, String),
    In(String, Vec<Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Table query shared by every gateway: filters, ordering and a row limit.
///
/// Rendered to PostgREST query parameters by `to_params`; the in-memory store
/// evaluates the same structure directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<Condition>,
    order: Vec<Order>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(column.into(), value.into()));
        self
    }

    pub fn ilike(mut self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.conditions.push(Condition::ILike(column.into(), pattern.into()));
        self
    }

    pub fn in_list<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions.push(Condition::In(
            column.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push(Order {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn ordering(&self) -> &[Order] {
        &self.order
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn is_unfiltered(&self) -> bool {
        self.conditions.is_empty()
    }

    /// PostgREST query-string pairs, `select=*` first
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];

        for condition in &self.conditions {
            match condition {
                Condition::Eq(column, value) => {
                    params.push((column.clone(), format!("eq.{}", literal(value))));
                }
                Condition::ILike(column, pattern) => {
                    params.push((column.clone(), format!("ilike.{}", pattern)));
                }
                Condition::In(column, values) => {
                    let items: Vec<String> = values.iter().map(quoted).collect();
                    params.push((column.clone(), format!("in.({})", items.join(","))));
                }
            }
        }

        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|o| match o.direction {
                    Direction::Asc => format!("{}.asc", o.column),
                    Direction::Desc => format!("{}.desc", o.column),
                })
                .collect();
            params.push(("order".to_string(), order.join(",")));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}

/// Plain text form of a filter value
pub fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

// Values inside in.(...) are double-quoted so commas and parentheses survive
fn quoted(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        other => literal(other),
    }
}
