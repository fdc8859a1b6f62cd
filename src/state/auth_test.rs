use super::*;
use crate::net::interceptor::{AUTHORIZATION, AuthInterceptor};
use crate::router::History;
use crate::storage::{TOKEN_KEY, USER_KEY};
use crate::test_helpers::{MockTransport, empty_session, history, login_body, signed_in_session, stored};
use serde_json::json;

struct Harness {
    auth: AuthService,
    mock: Rc<MockTransport>,
    nav: Rc<History>,
    session: Session,
}

fn harness(session: Session) -> Harness {
    let mock = MockTransport::new();
    let nav = history();
    let transport = AuthInterceptor::new(mock.clone(), session.clone(), nav.clone());
    let auth = AuthService::new(ApiClient::new(Rc::new(transport)), session.clone(), nav.clone());
    Harness { auth, mock, nav, session }
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_redirects_by_role() {
    for (role, destination) in [
        ("admin", paths::PHARMACY_ADMIN_DASHBOARD),
        ("superadmin", paths::ADMIN_DASHBOARD),
        ("user", paths::HOME),
        ("pharmacist", paths::HOME),
    ] {
        let h = harness(empty_session());
        h.mock.push(200, login_body("tok", role));
        h.auth.login("u1@example.com", "secret").await.unwrap();
        assert_eq!(h.nav.entries(), vec![destination.to_owned()], "role {role}");
    }
}

#[tokio::test]
async fn login_persists_token_and_user() {
    let h = harness(empty_session());
    h.mock.push(200, login_body("tok-9", "user"));

    let logged_in = h.auth.login("  u1@example.com ", "secret").await.unwrap();

    assert!(h.auth.is_logged_in());
    assert_eq!(h.auth.token().as_deref(), Some("tok-9"));
    assert_eq!(h.auth.current_user(), Some(logged_in));
    assert!(stored(&h.session, USER_KEY).is_some());
    assert_eq!(h.mock.last_request().body, Some(json!({ "email": "u1@example.com", "password": "secret" })));
}

#[tokio::test]
async fn login_top_level_role_overrides_nested_role() {
    let h = harness(empty_session());
    let mut body = login_body("tok", "user");
    body["role"] = json!("SuperAdmin");
    h.mock.push(200, body);

    let logged_in = h.auth.login("u1@example.com", "secret").await.unwrap();
    assert_eq!(logged_in.role, "SuperAdmin");
    assert_eq!(h.nav.current().as_deref(), Some(paths::ADMIN_DASHBOARD));
}

#[tokio::test]
async fn failed_login_surfaces_message_and_stays_logged_out() {
    let h = harness(empty_session());
    h.mock.push(400, json!({ "message": "Invalid email or password" }));

    let err = h.auth.login("u1@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password");
    assert!(!h.auth.is_logged_in());
    assert!(h.nav.entries().is_empty());
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_storage_and_observable() {
    let h = harness(signed_in_session("admin"));
    let rx = h.session.subscribe();

    h.auth.logout().unwrap();

    assert_eq!(stored(&h.session, TOKEN_KEY), None);
    assert_eq!(stored(&h.session, USER_KEY), None);
    assert!(rx.borrow().is_none());
    assert!(h.auth.current_user().is_none());
    assert_eq!(h.nav.entries(), vec![paths::LOGIN.to_owned()]);
}

#[tokio::test]
async fn logout_redirects_even_when_already_logged_out() {
    let h = harness(empty_session());
    h.auth.logout().unwrap();
    assert_eq!(h.nav.current().as_deref(), Some(paths::LOGIN));
}

// =============================================================================
// refresh / profile
// =============================================================================

#[tokio::test]
async fn refresh_without_user_fails_without_request() {
    let h = harness(empty_session());
    let err = h.auth.refresh_user_data().await.unwrap_err();
    assert!(matches!(err, ClientError::NoCurrentUser));
    assert!(h.mock.requests().is_empty());
}

#[tokio::test]
async fn refresh_fetches_by_id_and_overwrites_user() {
    let h = harness(signed_in_session("user"));
    h.mock.push(200, json!({ "id": "u1", "email": "new@example.com", "role": "user", "name": "Renamed" }));

    let fresh = h.auth.refresh_user_data().await.unwrap();

    let req = h.mock.last_request();
    assert_eq!(req.path, "/users/u1");
    assert_eq!(req.header(AUTHORIZATION), Some("Bearer tok-1"));
    assert_eq!(fresh.name, "Renamed");
    assert_eq!(h.auth.current_user().map(|u| u.email), Some("new@example.com".to_owned()));
    let persisted: User = serde_json::from_str(&stored(&h.session, USER_KEY).unwrap()).unwrap();
    assert_eq!(persisted, fresh);
}

#[tokio::test]
async fn refresh_hitting_401_ends_session_once() {
    let h = harness(signed_in_session("user"));
    h.mock.push(401, json!({ "message": "jwt expired" }));

    let err = h.auth.refresh_user_data().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!h.auth.is_logged_in());
    assert_eq!(h.nav.entries(), vec![paths::LOGIN.to_owned()]);
}

#[tokio::test]
async fn update_profile_keeps_role_when_response_omits_it() {
    let h = harness(signed_in_session("admin"));
    h.mock.push(200, json!({ "user": { "id": "u1", "email": "u1@example.com", "name": "New Name" } }));

    let update = ProfileUpdate { name: Some("New Name".into()), email: None };
    let updated = h.auth.update_profile(&update).await.unwrap();
    assert_eq!(updated.role, "admin");
    assert_eq!(h.session.role().as_deref(), Some("admin"));
}

#[tokio::test]
async fn register_redirects_to_login() {
    let h = harness(empty_session());
    h.mock.push(201, json!({ "message": "created" }));
    h.auth.register("Ann", "ann@example.com", "secret1").await.unwrap();
    assert_eq!(h.nav.current().as_deref(), Some(paths::LOGIN));
    assert!(!h.auth.is_logged_in());
}

#[test]
fn login_destination_falls_back_to_home() {
    assert_eq!(login_destination(""), paths::HOME);
    assert_eq!(login_destination("ADMIN"), paths::PHARMACY_ADMIN_DASHBOARD);
}

#[tokio::test]
async fn empty_profile_update_is_rejected_without_request() {
    let h = harness(signed_in_session("user"));

    let err = h.auth.update_profile(&ProfileUpdate::default()).await.unwrap_err();
    let ClientError::Validation(errors) = err else { panic!("expected validation error") };
    assert_eq!(errors.get("profile"), Some("Provide a name or email to update."));
    assert!(h.mock.requests().is_empty());
}
