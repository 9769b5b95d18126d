//! Integration tests for remote-backed stores over the mock management API.

#[cfg(test)]
mod store_tests {
    use std::error::Error as _;
    use std::sync::Arc;
    use std::time::Duration;

    use identity_integration::mocks::fixtures::{client_wire, grant_wire, user_wire};
    use identity_integration::mocks::{
        MockApplicationsApi, MockCall, MockGrantsApi, MockUsersApi,
    };
    use identity_integration::{
        Application, ApplicationMapper, ErrorKind, FailureCause, Grant, GrantFilter, GrantMapper,
        IdentityServices, InMemoryStore, Key, MappingError, Model, PredicateFilter,
        RateLimitPolicy, RemoteError, RemoteStore, SecretRotatingStore, StaticTokenProvider,
        Store, User, UserMapper,
    };
    use secrecy::ExposeSecret;

    type MockGrantStore = RemoteStore<Grant, MockGrantsApi, GrantMapper>;
    type MockApplicationStore = RemoteStore<Application, MockApplicationsApi, ApplicationMapper>;

    fn retry(max_retry_count: u32) -> RateLimitPolicy {
        RateLimitPolicy::retry(max_retry_count, Duration::from_millis(1))
    }

    fn grant_store(api: &Arc<MockGrantsApi>, policy: RateLimitPolicy) -> MockGrantStore {
        RemoteStore::new(
            Arc::clone(api),
            GrantMapper,
            Arc::new(StaticTokenProvider::new("token")),
            policy,
        )
    }

    fn grant(key: &str) -> Grant {
        Grant::new(Key::from(key), "client-a", "https://api.example.com", vec!["read".into()])
    }

    #[tokio::test]
    async fn test_always_rate_limited_attempts_max_plus_two() {
        for max_retry_count in [0, 1, 5] {
            // Arrange
            let api = Arc::new(MockGrantsApi::new());
            api.set_always_rate_limited(true);
            let store = grant_store(&api, retry(max_retry_count));

            // Act
            let err = store.get_all(0, 10, None).await.unwrap_err();

            // Assert
            assert_eq!(api.call_count(), max_retry_count as usize + 2);
            assert_eq!(err.kind(), ErrorKind::Read);
            assert!(err.is_rate_limited());
        }
    }

    #[tokio::test]
    async fn test_default_budget_gives_seven_attempts_for_every_operation() {
        let api = Arc::new(MockGrantsApi::new());
        api.set_always_rate_limited(true);
        let store = grant_store(&api, retry(5));
        let key = Key::from("cgr_1");

        let errors = vec![
            store.get_all(0, 10, None).await.unwrap_err(),
            store.get_by_key(&key).await.unwrap_err(),
            store.create(&grant("cgr_1")).await.unwrap_err(),
            store.update(&key, &grant("cgr_1")).await.unwrap_err(),
            store.delete_by_key(&key).await.unwrap_err(),
        ];

        assert_eq!(api.call_count(), 5 * 7);
        assert!(errors.iter().all(|e| e.is_rate_limited()));
    }

    #[tokio::test]
    async fn test_fail_behaviour_attempts_once() {
        let api = Arc::new(MockGrantsApi::new());
        api.set_always_rate_limited(true);
        let store = grant_store(&api, RateLimitPolicy::fail_fast());

        let err = store.get_by_key(&Key::from("cgr_1")).await.unwrap_err();

        assert_eq!(api.call_count(), 1);
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_recovers_after_rate_limits() {
        let api = Arc::new(MockGrantsApi::with_items(vec![grant_wire(
            "cgr_1",
            "client-a",
            "https://api.example.com",
        )]));
        api.set_rate_limited_responses(2);
        let store = grant_store(&api, retry(5));

        let found = store.get_by_key(&Key::from("cgr_1")).await.unwrap();

        assert_eq!(found.client_id, "client-a");
        assert_eq!(api.call_count(), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let api = Arc::new(MockGrantsApi::new());
        api.set_next_error(RemoteError::Api {
            status: 500,
            message: "boom".into(),
        });
        let store = grant_store(&api, retry(5));

        let err = store.get_all(0, 10, None).await.unwrap_err();

        assert_eq!(api.call_count(), 1);
        assert!(!err.is_rate_limited());
        assert!(matches!(
            err.cause(),
            Some(FailureCause::Remote(RemoteError::Api { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn test_error_messages() {
        let api = Arc::new(MockGrantsApi::new());
        api.set_always_rate_limited(true);
        let store = grant_store(&api, RateLimitPolicy::fail_fast());
        let key = Key::from("cgr_9");

        let read_all = store.get_all(0, 10, None).await.unwrap_err();
        let read_one = store.get_by_key(&key).await.unwrap_err();
        let create = store.create(&grant("cgr_9")).await.unwrap_err();
        let update = store.update(&key, &grant("cgr_9")).await.unwrap_err();
        let delete = store.delete_by_key(&key).await.unwrap_err();

        assert_eq!(read_all.to_string(), "Failed to read grants.");
        assert_eq!(read_one.to_string(), "Failed to read grant: 'cgr_9'.");
        assert_eq!(create.to_string(), "Failed to create grant.");
        assert_eq!(update.to_string(), "Failed to update grant: 'cgr_9'.");
        assert_eq!(delete.to_string(), "Failed to delete grant: 'cgr_9'.");

        assert_eq!(create.kind(), ErrorKind::Create);
        assert_eq!(update.kind(), ErrorKind::Update);
        assert_eq!(delete.kind(), ErrorKind::Update);
        assert!(read_all.source().is_some());
    }

    #[tokio::test]
    async fn test_update_unknown_key() {
        let api = Arc::new(MockGrantsApi::new());
        let store = grant_store(&api, retry(5));

        let err = store
            .update(&Key::from("missing"), &grant("missing"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Update);
        assert!(err.to_string().contains("missing"));
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let api = Arc::new(MockGrantsApi::with_items(vec![grant_wire(
            "cgr_1",
            "client-a",
            "https://api.example.com",
        )]));
        let store = grant_store(&api, retry(5));
        let key = Key::from("cgr_1");

        store.delete_by_key(&key).await.unwrap();
        store.delete_by_key(&key).await.unwrap();

        assert!(api.items().is_empty());
        assert!(store.get_by_key(&key).await.is_err());
    }

    #[tokio::test]
    async fn test_create_update_read_round_trip() {
        let api = Arc::new(MockGrantsApi::new());
        let store = grant_store(&api, retry(5));

        let key = store.create(&grant("ignored")).await.unwrap();
        assert_eq!(key, Key::from("cgr_1"));

        let mut changed = grant("ignored");
        changed.scopes = vec!["read".into(), "write".into()];
        store.update(&key, &changed).await.unwrap();

        let stored = store.get_by_key(&key).await.unwrap();
        assert_eq!(stored.key, key);
        assert_eq!(stored.scopes, vec!["read".to_string(), "write".to_string()]);
    }

    #[tokio::test]
    async fn test_paging_over_two_grants() {
        let api = Arc::new(MockGrantsApi::with_items(vec![
            grant_wire("cgr_1", "client-a", "https://api.example.com"),
            grant_wire("cgr_2", "client-b", "https://api.example.com"),
        ]));
        let store = grant_store(&api, retry(5));

        let first = store.get_all(0, 1, None).await.unwrap();
        let second = store.get_all(1, 1, None).await.unwrap();

        assert_eq!(first.len(), 1);
        assert!(first.has_next_page());
        assert_eq!(first.items()[0].key, Key::from("cgr_1"));
        assert_eq!(second.len(), 1);
        assert!(!second.has_next_page());
        assert_eq!(second.items()[0].key, Key::from("cgr_2"));
    }

    #[tokio::test]
    async fn test_zero_page_size_makes_no_call() {
        let api = Arc::new(MockGrantsApi::new());
        let store = grant_store(&api, retry(5));

        let err = store.get_all(0, 0, None).await.unwrap_err();

        assert!(matches!(err.cause(), Some(FailureCause::InvalidPageSize)));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_query_filter_reaches_remote() {
        let api = Arc::new(MockGrantsApi::with_items(vec![
            grant_wire("cgr_1", "client-a", "https://api.example.com"),
            grant_wire("cgr_2", "client-b", "https://api.example.com"),
        ]));
        let store = grant_store(&api, retry(5));
        let filter = GrantFilter::new().client_id("client-b");

        let page = store.get_all(0, 10, Some(&filter)).await.unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page.items()[0].client_id, "client-b");
        match &api.get_call_history()[0] {
            MockCall::List { query, .. } => {
                assert_eq!(query.params.get("client_id").map(String::as_str), Some("client-b"));
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_predicate_filter_is_rejected_without_remote_call() {
        let api = Arc::new(MockGrantsApi::new());
        let store = grant_store(&api, retry(5));
        let filter = PredicateFilter::new(|g: &Grant| g.scopes.is_empty());

        let err = store.get_all(0, 10, Some(&filter)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Read);
        assert!(matches!(err.cause(), Some(FailureCause::Filter(_))));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_callers_have_separate_budgets() {
        let api = Arc::new(MockGrantsApi::new());
        api.set_always_rate_limited(true);
        let store = Arc::new(grant_store(&api, retry(2)));

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.get_by_key(&Key::from("a")).await })
        };
        let second = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.get_by_key(&Key::from("b")).await })
        };

        assert!(first.await.unwrap().unwrap_err().is_rate_limited());
        assert!(second.await.unwrap().unwrap_err().is_rate_limited());
        assert_eq!(api.call_count(), 2 * 4);
    }

    #[tokio::test]
    async fn test_user_create_without_password_makes_no_call() {
        let api = Arc::new(MockUsersApi::new());
        let store: RemoteStore<User, MockUsersApi, UserMapper> = RemoteStore::new(
            Arc::clone(&api),
            UserMapper::default(),
            Arc::new(StaticTokenProvider::new("token")),
            retry(5),
        );

        let err = store
            .create(&User::new(Key::from("ada"), "ada@example.com"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to create user.");
        assert!(matches!(
            err.cause(),
            Some(FailureCause::Mapping(MappingError::MissingField { field: "password", .. }))
        ));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_user_read_maps_wire() {
        let api = Arc::new(MockUsersApi::with_items(vec![user_wire(
            "auth0|1",
            "ada@example.com",
        )]));
        let store: RemoteStore<User, MockUsersApi, UserMapper> = RemoteStore::new(
            Arc::clone(&api),
            UserMapper::default(),
            Arc::new(StaticTokenProvider::new("token")),
            retry(5),
        );

        let user = store.get_by_key(&Key::from("auth0|1")).await.unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert!(user.password.is_none());
    }

    #[tokio::test]
    async fn test_rotate_client_secret() {
        let api = Arc::new(MockApplicationsApi::with_items(vec![client_wire(
            "client_1", "billing",
        )]));
        api.set_rate_limited_responses(1);
        let store: RemoteStore<Application, MockApplicationsApi, ApplicationMapper> =
            RemoteStore::new(
                Arc::clone(&api),
                ApplicationMapper,
                Arc::new(StaticTokenProvider::new("token")),
                retry(5),
            );

        let rotated = store
            .rotate_client_secret(&Key::from("client_1"))
            .await
            .unwrap();

        let secret = rotated.client_secret.as_ref().unwrap();
        assert_ne!(secret.expose_secret(), "secret-client_1");
        assert_eq!(api.call_count(), 2);
    }

    #[tokio::test]
    async fn test_rotate_unknown_application() {
        let api = Arc::new(MockApplicationsApi::new());
        let store: RemoteStore<Application, MockApplicationsApi, ApplicationMapper> =
            RemoteStore::new(
                Arc::clone(&api),
                ApplicationMapper,
                Arc::new(StaticTokenProvider::new("token")),
                retry(5),
            );

        let err = store
            .rotate_client_secret(&Key::from("nope"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to update application: 'nope'.");
    }

    async fn create_twice<M: Model>(
        store: &dyn Store<M>,
        model: &M,
    ) -> Vec<Result<Key<M::KeyType>, String>> {
        let mut outcomes = Vec::new();
        for _ in 0..2 {
            outcomes.push(store.create(model).await.map_err(|e| e.to_string()));
        }
        outcomes
    }

    fn remote_users() -> RemoteStore<User, MockUsersApi, UserMapper> {
        RemoteStore::new(
            Arc::new(MockUsersApi::new()),
            UserMapper::default(),
            Arc::new(StaticTokenProvider::new("token")),
            retry(5),
        )
    }

    #[tokio::test]
    async fn test_backends_agree_on_created_keys() {
        let application = Application::new(Key::from("ignored"), "billing");
        let remote_applications: MockApplicationStore = RemoteStore::new(
            Arc::new(MockApplicationsApi::new()),
            ApplicationMapper,
            Arc::new(StaticTokenProvider::new("token")),
            retry(5),
        );
        let remote = create_twice(&remote_applications, &application).await;
        let memory = create_twice(&InMemoryStore::<Application>::new(), &application).await;
        assert_eq!(remote, vec![Ok(Key::from("client_1")), Ok(Key::from("client_2"))]);
        assert_eq!(memory, remote);

        let remote_grants = grant_store(&Arc::new(MockGrantsApi::new()), retry(5));
        let remote = create_twice(&remote_grants, &grant("x")).await;
        let memory = create_twice(&InMemoryStore::<Grant>::new(), &grant("x")).await;
        assert_eq!(memory, remote);

        let unkeyed = User::new(Key::from(""), "ada@example.com").with_password("pw");
        let remote = create_twice(&remote_users(), &unkeyed).await;
        let memory = create_twice(&InMemoryStore::<User>::new(), &unkeyed).await;
        assert_eq!(remote, vec![Ok(Key::from("auth0|1")), Ok(Key::from("auth0|2"))]);
        assert_eq!(memory, remote);

        let keyed = User::new(Key::from("ada"), "ada@example.com").with_password("pw");
        let remote = create_twice(&remote_users(), &keyed).await;
        let memory = create_twice(&InMemoryStore::<User>::new(), &keyed).await;
        assert_eq!(
            remote,
            vec![Ok(Key::from("ada")), Err("Failed to create user.".to_string())]
        );
        assert_eq!(memory, remote);
    }

    #[tokio::test]
    async fn test_in_memory_services_assign_application_keys() {
        let services = IdentityServices::builder().in_memory().build().unwrap();
        let application = Application::new(Key::from("ignored"), "billing");

        let first = services.applications.create(&application).await.unwrap();
        let second = services.applications.create(&application).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(services.applications.get_all(0, 10, None).await.unwrap().len(), 2);
    }
}
