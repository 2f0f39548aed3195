use std::fmt;

use crate::types::SubscriptionError;

/// The most specific part of the client's outstanding work an error pertains to.
///
/// Dispatchers route on this: table and query errors go to the owning
/// subscription, request errors to the one-shot caller, and `Connection`
/// falls back to connection-level handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorScope {
    Table {
        query_id: Option<u32>,
        table_id: u32,
    },
    Query {
        query_id: u32,
    },
    Request {
        request_id: u32,
    },
    Connection,
}

impl ErrorScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table { .. } => "table",
            Self::Query { .. } => "query",
            Self::Request { .. } => "request",
            Self::Connection => "connection",
        }
    }
}

/// Cross-field inconsistencies observed on decoded values. Reported, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeWarning {
    /// A table is always part of a query, so a table-scoped error should carry both ids.
    TableWithoutQuery { table_id: u32 },
}

impl fmt::Display for ScopeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableWithoutQuery { table_id } => {
                write!(f, "table_id {table_id} reported without a query_id")
            }
        }
    }
}

impl SubscriptionError {
    pub fn scope(&self) -> ErrorScope {
        match (self.request_id(), self.query_id(), self.table_id()) {
            (_, query_id, Some(table_id)) => ErrorScope::Table { query_id, table_id },
            (_, Some(query_id), None) => ErrorScope::Query { query_id },
            (Some(request_id), None, None) => ErrorScope::Request { request_id },
            (None, None, None) => ErrorScope::Connection,
        }
    }

    pub fn scope_warning(&self) -> Option<ScopeWarning> {
        match (self.query_id(), self.table_id()) {
            (None, Some(table_id)) => Some(ScopeWarning::TableWithoutQuery { table_id }),
            _ => None,
        }
    }
}
