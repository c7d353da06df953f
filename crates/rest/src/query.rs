//! Immutable request descriptors for a PostgREST-style table endpoint.
//!
//! Every builder method consumes the descriptor and returns a new value, so
//! there is no half-built or spent state to misuse. The rendered query
//! string puts the projection first, then equality filters in call order,
//! then order directives, then the row cap:
//! `captures?select=id,url&status=eq.done&order=created_at.desc&limit=10`.

use serde_json::Value;

/// HTTP verb plus body for one request.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Command {
    /// Plain read (`GET`).
    #[default]
    Select,
    /// Create rows (`POST`) with the given payload.
    Insert(Value),
    /// Modify matching rows (`PATCH`) with the given payload.
    Update(Value),
    /// Delete matching rows (`DELETE`).
    Delete,
}

/// A single REST request against one table, described as a value.
#[derive(Clone, Debug, Default)]
pub struct Query {
    table: String,
    command: Command,
    projection: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<(String, bool)>,
    limit: Option<u32>,
}

impl Query {
    /// Start a descriptor for the given table.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            ..Self::default()
        }
    }

    /// Set the column projection. Repeated calls overwrite.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.projection = Some(columns.into());
        self
    }

    /// Append an equality filter. Multiple filters are conjunctive.
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((column.into(), value.to_string()));
        self
    }

    /// Append a sort directive.
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order.push((column.into(), ascending));
        self
    }

    /// Cap the number of returned rows.
    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    /// Turn the descriptor into an insert. Overrides any previous verb.
    pub fn insert(mut self, payload: Value) -> Self {
        self.command = Command::Insert(payload);
        self
    }

    /// Turn the descriptor into an update. Overrides any previous verb.
    pub fn update(mut self, payload: Value) -> Self {
        self.command = Command::Update(payload);
        self
    }

    /// Turn the descriptor into a delete. Overrides any previous verb.
    pub fn delete(mut self) -> Self {
        self.command = Command::Delete;
        self
    }

    /// Table this descriptor targets.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// The verb and body this descriptor will send.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Render the query-string portion, without a leading `?`.
    ///
    /// Empty when no projection, filter, order, or limit was set.
    pub fn query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(projection) = &self.projection {
            parts.push(format!("select={projection}"));
        }
        for (column, value) in &self.filters {
            parts.push(format!("{column}=eq.{}", encode_component(value)));
        }
        for (column, ascending) in &self.order {
            let direction = if *ascending { "asc" } else { "desc" };
            parts.push(format!("order={column}.{direction}"));
        }
        if let Some(n) = self.limit {
            parts.push(format!("limit={n}"));
        }
        parts.join("&")
    }

    /// Render the request path relative to the REST base URL.
    pub fn path(&self) -> String {
        let qs = self.query_string();
        if qs.is_empty() {
            self.table.clone()
        } else {
            format!("{}?{qs}", self.table)
        }
    }
}

/// Percent-encode a filter value for use inside a query string.
///
/// Leaves RFC 3986 unreserved characters (and the few marks browsers never
/// escape) intact; everything else becomes `%XX` per UTF-8 byte.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(byte as char),
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
