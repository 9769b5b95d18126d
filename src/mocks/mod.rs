//! Mock implementations for testing identity stores.
//!
//! [`MockResourceApi`] is a stateful stand-in for one management API collection. It records
//! every call and can be told to fail, or to answer with the rate-limit signal, on upcoming
//! calls.

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{RemoteError, RemoteResult};
use crate::filter::ListQuery;
use crate::remote::wire::{
    ClientCreateRequest, ClientGrantCreateRequest, ClientGrantUpdateRequest, ClientGrantWire,
    ClientUpdateRequest, ClientWire, ResourceServerCreateRequest, ResourceServerUpdateRequest,
    ResourceServerWire, UserCreateRequest, UserUpdateRequest, UserWire,
};
use crate::remote::{RemoteResourceApi, RemoteSecretRotation, WirePage};
use crate::types::PageRequest;

pub type MockUsersApi = MockResourceApi<UserWire>;
pub type MockApplicationsApi = MockResourceApi<ClientWire>;
pub type MockGrantsApi = MockResourceApi<ClientGrantWire>;
pub type MockApisApi = MockResourceApi<ResourceServerWire>;

/// Wire type that a [`MockResourceApi`] can hold.
pub trait MockWire: Clone + Send + Sync + 'static {
    type CreateRequest: Send + Sync + 'static;
    type UpdateRequest: Send + Sync + 'static;

    /// Prefix of ids generated on create.
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;

    fn from_create(request: &Self::CreateRequest, generated_id: String) -> Self;

    fn apply_update(&mut self, request: &Self::UpdateRequest);

    fn matches(&self, _query: &ListQuery) -> bool {
        true
    }
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Get { id: String },
    List { query: ListQuery, page: PageRequest },
    Create,
    Update { id: String },
    Delete { id: String },
    RotateSecret { id: String },
}

struct MockState<W> {
    items: Vec<W>,
    calls: Vec<MockCall>,
    next_error: Option<RemoteError>,
    rate_limited_responses: u32,
    always_rate_limited: bool,
    sequence: u64,
}

/// Mock management API collection.
pub struct MockResourceApi<W: MockWire> {
    state: Mutex<MockState<W>>,
}

impl<W: MockWire> MockResourceApi<W> {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<W>) -> Self {
        Self {
            state: Mutex::new(MockState {
                items,
                calls: Vec::new(),
                next_error: None,
                rate_limited_responses: 0,
                always_rate_limited: false,
                sequence: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an item as if it already existed on the provider.
    pub fn insert(&self, item: W) -> &Self {
        self.state().items.push(item);
        self
    }

    /// Fail the next call with `error`.
    pub fn set_next_error(&self, error: RemoteError) -> &Self {
        self.state().next_error = Some(error);
        self
    }

    /// Answer the next `count` calls with the rate-limit signal.
    pub fn set_rate_limited_responses(&self, count: u32) -> &Self {
        self.state().rate_limited_responses = count;
        self
    }

    /// Answer every call with the rate-limit signal.
    pub fn set_always_rate_limited(&self, always: bool) -> &Self {
        self.state().always_rate_limited = always;
        self
    }

    pub fn get_call_history(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Number of calls received, including rejected ones.
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    pub fn clear_call_history(&self) {
        self.state().calls.clear();
    }

    pub fn items(&self) -> Vec<W> {
        self.state().items.clone()
    }

    fn begin(&self, call: MockCall) -> RemoteResult<MutexGuard<'_, MockState<W>>> {
        let mut state = self.state();
        state.calls.push(call);

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        if state.always_rate_limited {
            return Err(RemoteError::RateLimited { retry_after: None });
        }
        if state.rate_limited_responses > 0 {
            state.rate_limited_responses -= 1;
            return Err(RemoteError::RateLimited { retry_after: None });
        }
        Ok(state)
    }
}

impl<W: MockWire> Default for MockResourceApi<W> {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: &str) -> RemoteError {
    RemoteError::Api {
        status: 404,
        message: format!("The resource '{id}' does not exist."),
    }
}

#[async_trait]
impl<W: MockWire> RemoteResourceApi for MockResourceApi<W> {
    type Wire = W;
    type CreateRequest = W::CreateRequest;
    type UpdateRequest = W::UpdateRequest;

    async fn get(&self, _token: &SecretString, id: &str) -> RemoteResult<W> {
        let state = self.begin(MockCall::Get { id: id.to_string() })?;
        state
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn list(
        &self,
        _token: &SecretString,
        query: &ListQuery,
        page: PageRequest,
    ) -> RemoteResult<WirePage<W>> {
        let state = self.begin(MockCall::List {
            query: query.clone(),
            page,
        })?;

        let matching: Vec<&W> = state.items.iter().filter(|item| item.matches(query)).collect();
        let total = matching.len() as u64;
        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(skip)
            .take(page.size as usize)
            .cloned()
            .collect();

        Ok(WirePage { items, total })
    }

    async fn create(&self, _token: &SecretString, request: &W::CreateRequest) -> RemoteResult<W> {
        let mut state = self.begin(MockCall::Create)?;
        state.sequence += 1;
        let item = W::from_create(request, format!("{}{}", W::ID_PREFIX, state.sequence));

        if state.items.iter().any(|existing| existing.id() == item.id()) {
            return Err(RemoteError::Api {
                status: 409,
                message: "The resource already exists.".to_string(),
            });
        }
        state.items.push(item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        _token: &SecretString,
        id: &str,
        request: &W::UpdateRequest,
    ) -> RemoteResult<()> {
        let mut state = self.begin(MockCall::Update { id: id.to_string() })?;
        let item = state
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| not_found(id))?;
        item.apply_update(request);
        Ok(())
    }

    async fn delete(&self, _token: &SecretString, id: &str) -> RemoteResult<()> {
        let mut state = self.begin(MockCall::Delete { id: id.to_string() })?;
        state.items.retain(|item| item.id() != id);
        Ok(())
    }
}

#[async_trait]
impl RemoteSecretRotation for MockResourceApi<ClientWire> {
    async fn rotate_secret(&self, _token: &SecretString, id: &str) -> RemoteResult<ClientWire> {
        let mut state = self.begin(MockCall::RotateSecret { id: id.to_string() })?;
        state.sequence += 1;
        let secret = format!("rotated-secret-{}", state.sequence);

        let item = state
            .items
            .iter_mut()
            .find(|item| item.client_id == id)
            .ok_or_else(|| not_found(id))?;
        item.client_secret = Some(secret);
        Ok(item.clone())
    }
}

impl MockWire for UserWire {
    type CreateRequest = UserCreateRequest;
    type UpdateRequest = UserUpdateRequest;

    const ID_PREFIX: &'static str = "auth0|";

    fn id(&self) -> &str {
        &self.user_id
    }

    fn from_create(request: &UserCreateRequest, generated_id: String) -> Self {
        Self {
            user_id: request.user_id.clone().unwrap_or(generated_id),
            email: Some(request.email.clone()),
            given_name: request.given_name.clone(),
            family_name: request.family_name.clone(),
            email_verified: request.email_verified,
            blocked: request.blocked,
        }
    }

    fn apply_update(&mut self, request: &UserUpdateRequest) {
        if let Some(email) = &request.email {
            self.email = Some(email.clone());
        }
        if let Some(given_name) = &request.given_name {
            self.given_name = Some(given_name.clone());
        }
        if let Some(family_name) = &request.family_name {
            self.family_name = Some(family_name.clone());
        }
        if let Some(email_verified) = request.email_verified {
            self.email_verified = email_verified;
        }
        if let Some(blocked) = request.blocked {
            self.blocked = blocked;
        }
    }

    /// Understands `email:"<address>"` searches.
    fn matches(&self, query: &ListQuery) -> bool {
        let email = query
            .search
            .as_deref()
            .and_then(|search| search.strip_prefix("email:\""))
            .and_then(|search| search.strip_suffix('"'));

        match (email, &self.email) {
            (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

impl MockWire for ClientWire {
    type CreateRequest = ClientCreateRequest;
    type UpdateRequest = ClientUpdateRequest;

    const ID_PREFIX: &'static str = "client_";

    fn id(&self) -> &str {
        &self.client_id
    }

    fn from_create(request: &ClientCreateRequest, generated_id: String) -> Self {
        Self {
            client_secret: Some(format!("secret-{generated_id}")),
            client_id: generated_id,
            name: request.name.clone(),
            description: request.description.clone(),
            app_type: Some(request.app_type),
            grant_types: request.grant_types.clone(),
            callbacks: request.callbacks.clone(),
        }
    }

    fn apply_update(&mut self, request: &ClientUpdateRequest) {
        self.name = request.name.clone();
        self.description = request.description.clone();
        self.app_type = Some(request.app_type);
        self.grant_types = request.grant_types.clone();
        self.callbacks = request.callbacks.clone();
    }
}

impl MockWire for ClientGrantWire {
    type CreateRequest = ClientGrantCreateRequest;
    type UpdateRequest = ClientGrantUpdateRequest;

    const ID_PREFIX: &'static str = "cgr_";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_create(request: &ClientGrantCreateRequest, generated_id: String) -> Self {
        Self {
            id: generated_id,
            client_id: request.client_id.clone(),
            audience: request.audience.clone(),
            scope: request.scope.clone(),
        }
    }

    fn apply_update(&mut self, request: &ClientGrantUpdateRequest) {
        self.scope = request.scope.clone();
    }

    fn matches(&self, query: &ListQuery) -> bool {
        let param = |name: &str| query.params.get(name).map(String::as_str);
        param("client_id").map_or(true, |id| id == self.client_id)
            && param("audience").map_or(true, |audience| audience == self.audience)
    }
}

impl MockWire for ResourceServerWire {
    type CreateRequest = ResourceServerCreateRequest;
    type UpdateRequest = ResourceServerUpdateRequest;

    const ID_PREFIX: &'static str = "rs_";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_create(request: &ResourceServerCreateRequest, generated_id: String) -> Self {
        Self {
            id: generated_id,
            identifier: request.identifier.clone(),
            name: Some(request.name.clone()),
            scopes: request.scopes.clone(),
            token_lifetime: request.token_lifetime,
        }
    }

    fn apply_update(&mut self, request: &ResourceServerUpdateRequest) {
        self.name = Some(request.name.clone());
        self.scopes = request.scopes.clone();
        self.token_lifetime = request.token_lifetime;
    }
}

/// Test fixtures.
pub mod fixtures {
    use super::*;

    pub fn user_wire(user_id: &str, email: &str) -> UserWire {
        UserWire {
            user_id: user_id.to_string(),
            email: Some(email.to_string()),
            given_name: None,
            family_name: None,
            email_verified: false,
            blocked: false,
        }
    }

    pub fn client_wire(client_id: &str, name: &str) -> ClientWire {
        ClientWire {
            client_id: client_id.to_string(),
            name: name.to_string(),
            description: None,
            client_secret: Some(format!("secret-{client_id}")),
            app_type: None,
            grant_types: vec!["client_credentials".to_string()],
            callbacks: Vec::new(),
        }
    }

    pub fn grant_wire(id: &str, client_id: &str, audience: &str) -> ClientGrantWire {
        ClientGrantWire {
            id: id.to_string(),
            client_id: client_id.to_string(),
            audience: audience.to_string(),
            scope: vec!["read:all".to_string()],
        }
    }

    pub fn resource_server_wire(id: &str, identifier: &str) -> ResourceServerWire {
        ResourceServerWire {
            id: id.to_string(),
            identifier: identifier.to_string(),
            name: Some(identifier.to_string()),
            scopes: Vec::new(),
            token_lifetime: None,
        }
    }
}
