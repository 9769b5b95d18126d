//! Filters
//!
//! A filter narrows a `get_all` listing. Remote stores ask it for a provider [`ListQuery`];
//! in-memory stores ask it for a predicate over models. A filter implements whichever
//! destinations it supports; the other one fails with [`FilterError::UnsupportedDestination`].

use std::collections::BTreeMap;

use crate::error::FilterError;
use crate::types::{Grant, KeyValue, User};

/// Provider-side list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Provider search expression (sent as `q`).
    pub search: Option<String>,
    /// Additional query parameters.
    pub params: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, expression: impl Into<String>) -> Self {
        self.search = Some(expression.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.params.is_empty()
    }
}

/// Filter over models of type `M`.
pub trait Filter<M>: Send + Sync {
    /// Build the provider list query.
    fn to_query(&self) -> Result<ListQuery, FilterError> {
        Err(FilterError::unsupported::<Self>("ListQuery"))
    }

    /// Test a model in memory.
    fn matches(&self, _model: &M) -> Result<bool, FilterError> {
        Err(FilterError::unsupported::<Self>("predicate"))
    }
}

/// Filter that only knows how to query the provider.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    query: ListQuery,
}

impl QueryFilter {
    pub fn new(query: ListQuery) -> Self {
        Self { query }
    }
}

impl<M> Filter<M> for QueryFilter {
    fn to_query(&self) -> Result<ListQuery, FilterError> {
        Ok(self.query.clone())
    }
}

/// Filter that only knows how to test models in memory.
pub struct PredicateFilter<F> {
    predicate: F,
}

impl<F> PredicateFilter<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<M, F> Filter<M> for PredicateFilter<F>
where
    F: Fn(&M) -> bool + Send + Sync,
{
    fn matches(&self, model: &M) -> Result<bool, FilterError> {
        Ok((self.predicate)(model))
    }
}

/// Users with a given email address (case-insensitive).
#[derive(Debug, Clone)]
pub struct EmailFilter {
    email: String,
}

impl EmailFilter {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

impl<K: KeyValue> Filter<User<K>> for EmailFilter {
    fn to_query(&self) -> Result<ListQuery, FilterError> {
        if self.email.contains('"') {
            return Err(FilterError::Invalid {
                message: format!("email contains a quote: {}", self.email),
            });
        }
        Ok(ListQuery::new()
            .search(format!("email:\"{}\"", self.email))
            .param("search_engine", "v3"))
    }

    fn matches(&self, model: &User<K>) -> Result<bool, FilterError> {
        Ok(model.email.eq_ignore_ascii_case(&self.email))
    }
}

/// Grants by client and/or audience.
#[derive(Debug, Clone, Default)]
pub struct GrantFilter {
    client_id: Option<String>,
    audience: Option<String>,
}

impl GrantFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

impl<K: KeyValue> Filter<Grant<K>> for GrantFilter {
    fn to_query(&self) -> Result<ListQuery, FilterError> {
        let mut query = ListQuery::new();
        if let Some(client_id) = &self.client_id {
            query = query.param("client_id", client_id);
        }
        if let Some(audience) = &self.audience {
            query = query.param("audience", audience);
        }
        Ok(query)
    }

    fn matches(&self, model: &Grant<K>) -> Result<bool, FilterError> {
        let client_matches = self
            .client_id
            .as_ref()
            .map_or(true, |id| &model.client_id == id);
        let audience_matches = self
            .audience
            .as_ref()
            .map_or(true, |audience| &model.audience == audience);
        Ok(client_matches && audience_matches)
    }
}
