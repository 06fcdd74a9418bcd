//! Tests for the Firebase user database, manager and token strategy.
//!
//! The Identity Toolkit API is simulated with wiremock in emulator mode:
//! admin calls carry the `owner` token and ID tokens are unsigned.

use async_trait::async_trait;
use chrono::Utc;
use firebase_admin::testing::{self, PROJECT_ID};
use firebase_admin::{AdminConfig, AuthClient};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use users_core::{
    AuthenticationBackend, BearerTransport, PasswordCredentials, Strategy, UserDatabase, UserDict,
    UserHooks, UserManager, UserProtocol, UserRequirements, UsersError, UsersResult,
};
use users_firebase::{
    superuser_claim, CreateFirebaseUser, FirebaseIdTokenStrategy, FirebaseUser,
    FirebaseUserDatabase, FirebaseUserFields, FirebaseUserManager, Uid, UpdateFirebaseUser,
    CLIENT_SDK_REQUIRED,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Test fixture providing a mock emulator and a client pointed at it.
struct TestFixture {
    server: MockServer,
    client: Arc<AuthClient>,
}

impl TestFixture {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let host = server.uri().trim_start_matches("http://").to_string();
        let config = AdminConfig::new(PROJECT_ID)
            .with_emulator(host)
            .with_credentials(testing::service_account_key("http://localhost/token"));
        let client = Arc::new(AuthClient::new(config).unwrap());

        Self { server, client }
    }

    fn api_path(action: &str) -> String {
        format!(
            "/identitytoolkit.googleapis.com/v1/projects/{}/{}",
            PROJECT_ID, action
        )
    }

    fn db(&self) -> FirebaseUserDatabase {
        FirebaseUserDatabase::new(self.client.clone())
    }

    fn manager(&self) -> FirebaseUserManager {
        FirebaseUserManager::new(self.db())
    }

    fn strategy(&self) -> FirebaseIdTokenStrategy {
        FirebaseIdTokenStrategy::new(self.client.clone())
    }

    async fn mount_lookup(&self, query: Value, users: Vec<Value>, expected: u64) {
        Mock::given(method("POST"))
            .and(path(Self::api_path("accounts:lookup")))
            .and(header("Authorization", "Bearer owner"))
            .and(body_json(query))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": users })))
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    async fn mount_action(&self, action: &str, body: Value, response: Value) {
        Mock::given(method("POST"))
            .and(path(Self::api_path(action)))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    async fn forbid_action(&self, action: &str) {
        Mock::given(method("POST"))
            .and(path(Self::api_path(action)))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

fn dict(value: Value) -> UserDict {
    value.as_object().cloned().unwrap()
}

fn id_token(uid: &str) -> String {
    testing::unsigned_id_token(&testing::id_token_claims(uid))
}

fn user(uid: &str) -> FirebaseUser {
    FirebaseUser::from_record(
        firebase_admin::UserRecord {
            uid: uid.to_string(),
            email: Some(format!("{}@example.com", uid)),
            ..Default::default()
        },
        None,
    )
}

// =============================================================================
// Token strategy
// =============================================================================

#[tokio::test]
async fn test_read_token_returns_user() {
    let fixture = TestFixture::new().await;
    // One lookup for the revocation check, one for the manager
    fixture
        .mount_lookup(json!({"localId": ["uid-1"]}), vec![testing::lookup_user("uid-1")], 2)
        .await;

    let user = fixture
        .strategy()
        .read_token(Some(&id_token("uid-1")), &fixture.manager())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.id, Uid::from("uid-1"));
    assert_eq!(user.email, "uid-1@example.com");
    assert!(user.is_verified);
}

#[tokio::test]
async fn test_read_token_without_token() {
    let fixture = TestFixture::new().await;
    fixture.forbid_action("accounts:lookup").await;

    let user = fixture
        .strategy()
        .read_token(None, &fixture.manager())
        .await
        .unwrap();

    assert!(user.is_none());
}

#[tokio::test]
async fn test_read_token_invalid_token() {
    let fixture = TestFixture::new().await;
    fixture.forbid_action("accounts:lookup").await;
    let strategy = fixture.strategy();
    let manager = fixture.manager();

    assert!(strategy
        .read_token(Some("garbage"), &manager)
        .await
        .unwrap()
        .is_none());

    let mut claims = testing::id_token_claims("uid-1");
    claims["aud"] = json!("someone-else");
    let token = testing::unsigned_id_token(&claims);
    assert!(strategy
        .read_token(Some(&token), &manager)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_read_token_expired_is_forbidden() {
    let fixture = TestFixture::new().await;
    fixture.forbid_action("accounts:lookup").await;

    let mut claims = testing::id_token_claims("uid-1");
    claims["exp"] = json!(Utc::now().timestamp() - 5);
    let token = testing::unsigned_id_token(&claims);

    let err = fixture
        .strategy()
        .read_token(Some(&token), &fixture.manager())
        .await
        .unwrap_err();

    assert!(matches!(err, UsersError::Forbidden(_)));
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_read_token_revoked_is_forbidden() {
    let fixture = TestFixture::new().await;
    let mut record = testing::lookup_user("uid-1");
    record["validSince"] = json!(Utc::now().timestamp().to_string());
    fixture
        .mount_lookup(json!({"localId": ["uid-1"]}), vec![record], 1)
        .await;

    let err = fixture
        .strategy()
        .read_token(Some(&id_token("uid-1")), &fixture.manager())
        .await
        .unwrap_err();

    match err {
        UsersError::Forbidden(message) => assert!(message.contains("revoked")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_read_token_disabled_user_is_forbidden() {
    let fixture = TestFixture::new().await;
    let mut record = testing::lookup_user("uid-1");
    record["disabled"] = json!(true);
    fixture
        .mount_lookup(json!({"localId": ["uid-1"]}), vec![record], 1)
        .await;

    let result = fixture
        .strategy()
        .read_token(Some(&id_token("uid-1")), &fixture.manager())
        .await;

    assert!(matches!(result, Err(UsersError::Forbidden(_))));
}

#[tokio::test]
async fn test_read_token_deleted_user() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_lookup(json!({"localId": ["uid-1"]}), vec![], 1)
        .await;

    let user = fixture
        .strategy()
        .read_token(Some(&id_token("uid-1")), &fixture.manager())
        .await
        .unwrap();

    assert!(user.is_none());
}

#[tokio::test]
async fn test_read_token_provider_failure() {
    let fixture = TestFixture::new().await;
    Mock::given(method("POST"))
        .and(path(TestFixture::api_path("accounts:lookup")))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&fixture.server)
        .await;

    let err = fixture
        .strategy()
        .read_token(Some(&id_token("uid-1")), &fixture.manager())
        .await
        .unwrap_err();

    assert!(matches!(err, UsersError::Provider(_)));
    assert!(err.is_server_error());
}

#[tokio::test]
async fn test_write_token_mints_custom_token() {
    let fixture = TestFixture::new().await;
    let claims = json!({"plan": "pro"}).as_object().cloned().unwrap();
    let strategy = fixture.strategy().with_developer_claims(claims);

    let token = Strategy::<FirebaseUserManager>::write_token(&strategy, &user("uid-1"))
        .await
        .unwrap();

    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn test_destroy_token_revokes_refresh_tokens() {
    let fixture = TestFixture::new().await;
    let before = Utc::now().timestamp();

    Mock::given(method("POST"))
        .and(path(TestFixture::api_path("accounts:update")))
        .and(move |request: &Request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
            let valid_since = body["validSince"]
                .as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or_default();
            body["localId"] == json!("uid-1") && valid_since >= before
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"localId": "uid-1"})))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Strategy::<FirebaseUserManager>::destroy_token(&fixture.strategy(), "token", &user("uid-1"))
        .await
        .unwrap();
}

// =============================================================================
// User database
// =============================================================================

#[tokio::test]
async fn test_database_get() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_lookup(json!({"localId": ["uid-1"]}), vec![testing::lookup_user("uid-1")], 1)
        .await;
    fixture
        .mount_lookup(json!({"localId": ["missing"]}), vec![], 1)
        .await;
    let db = fixture.db();

    let found = db.get(&Uid::from("uid-1")).await.unwrap().unwrap();
    assert_eq!(found.id, Uid::from("uid-1"));

    assert!(db.get(&Uid::from("missing")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_database_get_by_email() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_lookup(
            json!({"email": ["uid-1@example.com"]}),
            vec![testing::lookup_user("uid-1")],
            1,
        )
        .await;
    fixture
        .mount_lookup(json!({"email": ["nobody@example.com"]}), vec![], 1)
        .await;
    let db = fixture.db();

    let found = db.get_by_email("uid-1@example.com").await.unwrap().unwrap();
    assert_eq!(found.email, "uid-1@example.com");

    assert!(db.get_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_database_create_sends_mapped_fields() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_action(
            "accounts",
            json!({
                "email": "new@example.com",
                "password": "secret123",
                "emailVerified": true,
                "disabled": false,
                "displayName": "New User",
                "phoneNumber": "+15555550100"
            }),
            json!({"localId": "new-uid"}),
        )
        .await;
    let mut record = testing::lookup_user("new-uid");
    record["phoneNumber"] = json!("+15555550100");
    fixture
        .mount_lookup(json!({"localId": ["new-uid"]}), vec![record], 1)
        .await;

    let created = fixture
        .db()
        .create(dict(json!({
            "email": "new@example.com",
            "password": "secret123",
            "is_verified": true,
            "display_name": "New User",
            "phone_number": "+1 (555) 555-0100"
        })))
        .await
        .unwrap();

    assert_eq!(created.id, Uid::from("new-uid"));
    assert_eq!(created.phone_number.as_deref(), Some("+15555550100"));
}

#[tokio::test]
async fn test_database_create_sets_custom_claims() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_action(
            "accounts",
            json!({
                "email": "admin@example.com",
                "emailVerified": false,
                "disabled": false
            }),
            json!({"localId": "admin-uid"}),
        )
        .await;
    fixture
        .mount_lookup(json!({"localId": ["admin-uid"]}), vec![testing::lookup_user("admin-uid")], 1)
        .await;
    fixture
        .mount_action(
            "accounts:update",
            json!({"localId": "admin-uid", "customAttributes": "{\"admin\":true}"}),
            json!({"localId": "admin-uid"}),
        )
        .await;

    let db = fixture.db().with_superuser(superuser_claim("admin"));
    let created = db
        .create(dict(json!({
            "email": "admin@example.com",
            "custom_claims": {"admin": true}
        })))
        .await
        .unwrap();

    assert!(created.is_superuser());
}

#[tokio::test]
async fn test_database_create_rejects_invalid_data() {
    let fixture = TestFixture::new().await;
    fixture.forbid_action("accounts").await;

    let result = fixture.db().create(dict(json!({"password": "secret123"}))).await;

    match result {
        Err(UsersError::Validation(message)) => {
            assert!(message.contains("Either email or phone number must be set."))
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_database_create_conflict() {
    let fixture = TestFixture::new().await;
    Mock::given(method("POST"))
        .and(path(TestFixture::api_path("accounts")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "PHONE_NUMBER_EXISTS"}
        })))
        .mount(&fixture.server)
        .await;

    let result = fixture
        .db()
        .create(dict(json!({"phone_number": "+15555550100"})))
        .await;

    assert!(matches!(result, Err(UsersError::UserAlreadyExists)));
}

#[tokio::test]
async fn test_database_update_sends_mapped_fields() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_action(
            "accounts:update",
            json!({"localId": "uid-1", "disableUser": true, "displayName": "Renamed"}),
            json!({"localId": "uid-1"}),
        )
        .await;
    let mut record = testing::lookup_user("uid-1");
    record["disabled"] = json!(true);
    record["displayName"] = json!("Renamed");
    fixture
        .mount_lookup(json!({"localId": ["uid-1"]}), vec![record], 1)
        .await;

    let updated = fixture
        .db()
        .update(
            &user("uid-1"),
            dict(json!({"is_active": false, "display_name": "Renamed"})),
        )
        .await
        .unwrap();

    assert!(!updated.is_active());
    assert_eq!(updated.name.as_deref(), Some("Renamed"));
}

#[tokio::test]
async fn test_database_update_keeps_unset_active_flag() {
    let fixture = TestFixture::new().await;
    // Exact body: no disableUser when is_active is not given
    fixture
        .mount_action(
            "accounts:update",
            json!({"localId": "uid-1", "customAttributes": "{\"role\":\"editor\"}"}),
            json!({"localId": "uid-1"}),
        )
        .await;
    fixture
        .mount_lookup(json!({"localId": ["uid-1"]}), vec![testing::lookup_user("uid-1")], 1)
        .await;

    let updated = fixture
        .db()
        .update(
            &user("uid-1"),
            dict(json!({"custom_claims": "{\"role\": \"editor\"}"})),
        )
        .await
        .unwrap();

    assert!(updated.is_active());
}

#[tokio::test]
async fn test_database_delete_sends_uid() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_action("accounts:delete", json!({"localId": "uid-1"}), json!({}))
        .await;

    fixture.db().delete(&user("uid-1")).await.unwrap();
}

// =============================================================================
// User manager
// =============================================================================

#[tokio::test]
async fn test_manager_parse_id() {
    let fixture = TestFixture::new().await;
    let manager = fixture.manager();

    assert_eq!(manager.parse_id("uid-1").unwrap(), Uid::from("uid-1"));
    assert!(matches!(manager.parse_id(""), Err(UsersError::InvalidId(_))));
}

#[tokio::test]
async fn test_manager_get_missing_user() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_lookup(json!({"localId": ["missing"]}), vec![], 1)
        .await;

    let result = fixture.manager().get(&Uid::from("missing")).await;

    assert!(matches!(result, Err(UsersError::UserNotExists)));
}

#[tokio::test]
async fn test_manager_create_rejects_duplicate_email() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_lookup(
            json!({"email": ["uid-1@example.com"]}),
            vec![testing::lookup_user("uid-1")],
            1,
        )
        .await;
    fixture.forbid_action("accounts").await;

    let create = CreateFirebaseUser {
        email: Some("uid-1@example.com".to_string()),
        password: Some("secret123".to_string()),
        ..Default::default()
    };
    let result = fixture.manager().create(&create, true).await;

    assert!(matches!(result, Err(UsersError::UserAlreadyExists)));
}

#[tokio::test]
async fn test_manager_safe_create_ignores_privileged_fields() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_lookup(json!({"email": ["new@example.com"]}), vec![], 1)
        .await;
    // is_verified and is_active from the schema are dropped: defaults apply
    fixture
        .mount_action(
            "accounts",
            json!({
                "email": "new@example.com",
                "password": "secret123",
                "emailVerified": false,
                "disabled": false
            }),
            json!({"localId": "new-uid"}),
        )
        .await;
    fixture
        .mount_lookup(json!({"localId": ["new-uid"]}), vec![testing::lookup_user("new-uid")], 1)
        .await;

    let create = CreateFirebaseUser {
        email: Some("new@example.com".to_string()),
        password: Some("secret123".to_string()),
        is_active: false,
        is_superuser: true,
        is_verified: true,
        firebase: FirebaseUserFields::default(),
    };
    let created = fixture.manager().create(&create, true).await.unwrap();

    assert_eq!(created.id, Uid::from("new-uid"));
    assert!(!created.is_superuser());
}

#[tokio::test]
async fn test_manager_update_is_safe_by_request() {
    let fixture = TestFixture::new().await;
    // Exact body: neither disableUser nor customAttributes
    fixture
        .mount_action(
            "accounts:update",
            json!({"localId": "uid-1", "displayName": "Safe"}),
            json!({"localId": "uid-1"}),
        )
        .await;
    fixture
        .mount_lookup(json!({"localId": ["uid-1"]}), vec![testing::lookup_user("uid-1")], 1)
        .await;

    let db = fixture.db().with_superuser(superuser_claim("admin"));
    let update = UpdateFirebaseUser {
        is_active: Some(false),
        display_name: Some(Some("Safe".to_string())),
        custom_claims: Some(Some(json!({"admin": true}).as_object().cloned().unwrap())),
        ..Default::default()
    };
    let updated = FirebaseUserManager::new(db)
        .update(&update, &user("uid-1"), true)
        .await
        .unwrap();

    assert!(updated.is_active());
    assert!(!updated.is_superuser());
}

#[tokio::test]
async fn test_manager_safe_update_with_only_claims_sends_nothing() {
    let fixture = TestFixture::new().await;
    fixture.forbid_action("accounts:update").await;

    let update = UpdateFirebaseUser {
        custom_claims: Some(Some(json!({"admin": true}).as_object().cloned().unwrap())),
        ..Default::default()
    };
    let unchanged = fixture
        .manager()
        .update(&update, &user("uid-1"), true)
        .await
        .unwrap();

    assert_eq!(unchanged.id, Uid::from("uid-1"));
    assert!(!unchanged.is_superuser());
}

#[tokio::test]
async fn test_manager_safe_create_ignores_custom_claims() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_lookup(json!({"email": ["new@example.com"]}), vec![], 1)
        .await;
    fixture
        .mount_action(
            "accounts",
            json!({
                "email": "new@example.com",
                "emailVerified": false,
                "disabled": false
            }),
            json!({"localId": "new-uid"}),
        )
        .await;
    fixture
        .mount_lookup(json!({"localId": ["new-uid"]}), vec![testing::lookup_user("new-uid")], 1)
        .await;
    fixture.forbid_action("accounts:update").await;

    let db = fixture.db().with_superuser(superuser_claim("admin"));
    let create = CreateFirebaseUser {
        email: Some("new@example.com".to_string()),
        firebase: FirebaseUserFields {
            custom_claims: Some(json!({"admin": true}).as_object().cloned().unwrap()),
            ..Default::default()
        },
        ..Default::default()
    };
    let created = FirebaseUserManager::new(db).create(&create, true).await.unwrap();

    assert!(!created.is_superuser());
}

#[tokio::test]
async fn test_manager_superuser_update_clears_fields() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_action(
            "accounts:update",
            json!({
                "localId": "uid-1",
                "deleteAttribute": ["DISPLAY_NAME"],
                "customAttributes": "{}"
            }),
            json!({"localId": "uid-1"}),
        )
        .await;
    fixture
        .mount_lookup(json!({"localId": ["uid-1"]}), vec![testing::lookup_user("uid-1")], 1)
        .await;

    let update = UpdateFirebaseUser {
        display_name: Some(None),
        custom_claims: Some(None),
        ..Default::default()
    };
    let updated = fixture
        .manager()
        .update(&update, &user("uid-1"), false)
        .await
        .unwrap();

    assert_eq!(updated.name, None);
}

#[tokio::test]
async fn test_manager_client_sdk_operations_are_forbidden() {
    let fixture = TestFixture::new().await;
    let manager = fixture.manager();
    let alice = user("alice");

    let results = [
        manager.request_verify(&alice).await.err(),
        manager.verify("token").await.err(),
        manager.forgot_password(&alice).await.err(),
        manager.reset_password("token", "new-password").await.err(),
        manager
            .authenticate(&PasswordCredentials {
                username: "alice@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .err(),
    ];

    for err in results {
        let err = err.expect("operation must fail");
        assert_eq!(err.status_code(), 403);
        match err {
            UsersError::Forbidden(detail) => assert_eq!(detail, CLIENT_SDK_REQUIRED),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

/// Hooks recording lifecycle events and refusing short passwords.
#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

#[async_trait]
impl UserHooks<FirebaseUser> for RecordingHooks {
    async fn validate_password(&self, password: &str, _email: Option<&str>) -> UsersResult<()> {
        if password.len() < 8 {
            return Err(UsersError::InvalidPassword(
                "Password should be at least 8 characters".to_string(),
            ));
        }
        Ok(())
    }

    async fn on_after_register(&self, user: &FirebaseUser) {
        self.events.lock().unwrap().push(format!("registered {}", user.id));
    }

    async fn on_before_delete(&self, user: &FirebaseUser) {
        self.events.lock().unwrap().push(format!("deleting {}", user.id));
    }

    async fn on_after_delete(&self, user: &FirebaseUser) {
        self.events.lock().unwrap().push(format!("deleted {}", user.id));
    }
}

#[tokio::test]
async fn test_manager_runs_hooks() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_lookup(json!({"phoneNumber": ["+15555550100"]}), vec![], 0)
        .await;
    fixture
        .mount_action(
            "accounts",
            json!({
                "phoneNumber": "+15555550100",
                "password": "long-enough",
                "emailVerified": false,
                "disabled": false
            }),
            json!({"localId": "phone-uid"}),
        )
        .await;
    fixture
        .mount_lookup(json!({"localId": ["phone-uid"]}), vec![testing::lookup_user("phone-uid")], 1)
        .await;
    fixture
        .mount_action("accounts:delete", json!({"localId": "phone-uid"}), json!({}))
        .await;

    let manager = FirebaseUserManager::with_hooks(fixture.db(), RecordingHooks::default());

    let short = CreateFirebaseUser {
        password: Some("short".to_string()),
        firebase: FirebaseUserFields {
            phone_number: Some("+15555550100".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(matches!(
        manager.create(&short, false).await,
        Err(UsersError::InvalidPassword(_))
    ));

    let create = CreateFirebaseUser {
        password: Some("long-enough".to_string()),
        ..short
    };
    let created = manager.create(&create, false).await.unwrap();
    manager.delete(&created).await.unwrap();

    let events = manager.hooks().events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec!["registered phone-uid", "deleting phone-uid", "deleted phone-uid"]
    );
}

// =============================================================================
// Authentication backend
// =============================================================================

#[tokio::test]
async fn test_current_user_with_superuser_claim() {
    let fixture = TestFixture::new().await;
    let mut admin = testing::lookup_user("admin-uid");
    admin["customAttributes"] = json!("{\"admin\":true}");
    fixture
        .mount_lookup(json!({"localId": ["admin-uid"]}), vec![admin], 2)
        .await;
    fixture
        .mount_lookup(json!({"localId": ["uid-1"]}), vec![testing::lookup_user("uid-1")], 2)
        .await;

    let db = fixture.db().with_superuser(superuser_claim("admin"));
    let manager = FirebaseUserManager::new(db);
    let backend = AuthenticationBackend::new("firebase", BearerTransport::default(), fixture.strategy());
    let requirements = UserRequirements::active().superuser();

    let header = format!("Bearer {}", id_token("admin-uid"));
    let current = backend
        .current_user(Some(&header), &manager, requirements)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.id, Uid::from("admin-uid"));

    let header = format!("Bearer {}", id_token("uid-1"));
    let result = backend.current_user(Some(&header), &manager, requirements).await;
    assert!(matches!(result, Err(UsersError::Forbidden(_))));
}

#[tokio::test]
async fn test_current_user_without_header_is_unauthorized() {
    let fixture = TestFixture::new().await;
    let backend = AuthenticationBackend::new("firebase", BearerTransport::default(), fixture.strategy());

    let result = backend
        .current_user(None, &fixture.manager(), UserRequirements::active())
        .await;

    assert!(matches!(result, Err(UsersError::Unauthorized)));
}
