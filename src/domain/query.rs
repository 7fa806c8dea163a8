use std::fmt;
use std::sync::Arc;

use crate::error::AppError;

/// Logical name under which a cacheable resource is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey(&'static str);

impl QueryKey {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Observable state of an asynchronous read.
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    Pending,
    Error(Arc<AppError>),
    Data(T),
}

impl<T> QueryState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Data(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            QueryState::Error(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl<T> From<Result<T, AppError>> for QueryState<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(value) => QueryState::Data(value),
            Err(err) => QueryState::Error(Arc::new(err)),
        }
    }
}
