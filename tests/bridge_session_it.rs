// crates.io
use cookie::Cookie;
use serde_json::json;
// self
use session_bridge::{
	_preludet::*,
	auth::ClaimSet,
	bridge::SessionBridge,
	render::RequestContext,
	signal::LogoutBroadcast,
	store::{CookieAttributes, MemoryStore, SameSite, SessionStore},
};

fn parse_set_cookies(headers: Vec<String>) -> Vec<Cookie<'static>> {
	headers
		.into_iter()
		.map(|header| Cookie::parse_encoded(header).expect("Set-Cookie value should parse."))
		.collect()
}

fn signed_in_bridge() -> (SessionBridge, MemoryStore, String, ClaimSet) {
	let (bridge, cookies, _) = build_test_bridge();
	let token = encode_test_token(&json!({
		"sub": "auth0|42",
		"email": "user@example.com",
		"email_verified": true,
		"exp": 4_102_444_800_u64,
	}));
	let nonce = bridge.begin_login();
	let login = bridge
		.complete_login(&redirect_with(&token, nonce.as_str()))
		.expect("Login fixture should complete.");

	(bridge, cookies, token, login.claims)
}

#[test]
fn client_session_round_trips_the_decoded_claims() {
	let (bridge, _, _, claims) = signed_in_bridge();

	assert_eq!(bridge.current_session(None), Some(claims.clone()));

	let state = bridge.auth_state(None);

	assert!(state.is_authenticated());
	assert_eq!(state.claims(), Some(&claims));
}

#[test]
fn server_and_client_paths_agree_on_the_same_token() {
	let (bridge, _, token, claims) = signed_in_bridge();
	let request =
		RequestContext::from_cookie_header(&format!("theme=dark; id_token={token}; other=1"));

	assert_eq!(bridge.current_session(Some(&request)), Some(claims.clone()));
	assert_eq!(bridge.current_session(Some(&request)), bridge.current_session(None));
}

#[test]
fn server_path_treats_bad_cookies_as_signed_out() {
	let (bridge, _, _) = build_test_bridge();

	for header in ["", "theme=dark", "id_token=", "id_token=not-a-token", "id_token=a.%%%.c"] {
		let request = RequestContext::from_cookie_header(header);

		assert_eq!(bridge.current_session(Some(&request)), None, "Header `{header}`.");
		assert!(!bridge.auth_state(Some(&request)).is_authenticated());
	}
}

#[test]
fn end_session_signs_out_both_paths_and_is_idempotent() {
	let (bridge, cookies, token, _) = signed_in_bridge();
	let first = bridge.end_session();

	assert_eq!(bridge.current_session(None), None);
	assert!(cookies.is_empty());

	let second = bridge.end_session();

	assert!(second.at >= first.at);
	assert_eq!(bridge.current_session(None), None);

	// A server bridge for a request that still carries the old cookie clears it too.
	let request = RequestContext::from_cookie_header(&format!("id_token={token}"));
	let server = SessionBridge::for_request(
		test_bridge_config(),
		&request,
		Arc::new(MemoryStore::default()),
		LogoutBroadcast::default(),
	);

	assert!(server.current_session(Some(&request)).is_some());

	server.end_session();

	assert_eq!(server.current_session(Some(&request)), None);
	assert_eq!(server.current_session(None), None);
}

#[test]
fn server_login_renders_set_cookie_headers() {
	let config = test_bridge_config()
		.with_cookie(CookieAttributes { secure: true, ..Default::default() });
	let attributes = config.cookie.clone();
	let begin = RequestContext::empty();
	let bridge = SessionBridge::for_request(
		config.clone(),
		&begin,
		Arc::new(MemoryStore::default()),
		LogoutBroadcast::default(),
	);
	let nonce = bridge.begin_login();
	let headers = parse_set_cookies(begin.cookies().set_cookie_headers(&attributes));

	assert_eq!(headers.len(), 1);
	assert_eq!(headers[0].name_value(), ("login_nonce", nonce.as_str()));
	assert_eq!(headers[0].path(), Some("/"));
	assert_eq!(headers[0].secure(), Some(true));
	assert_eq!(headers[0].same_site(), Some(SameSite::Lax));

	// The callback request carries the nonce cookie set above.
	let callback = RequestContext::from_cookie_header(&format!("login_nonce={}", nonce.as_str()));
	let bridge = SessionBridge::for_request(
		config,
		&callback,
		Arc::new(MemoryStore::default()),
		LogoutBroadcast::default(),
	);
	let token = encode_test_token(&json!({ "email": "user@example.com" }));
	let login = bridge
		.complete_login(&redirect_with(&token, nonce.as_str()))
		.expect("Server-side login should complete.");

	assert!(login.persisted);

	let headers = parse_set_cookies(callback.cookies().set_cookie_headers(&attributes));
	let claims = login.claims.to_storage_value();

	assert_eq!(headers.len(), 3);
	assert_eq!(headers[0].name_value(), ("id_token", token.as_str()));
	assert_eq!(headers[1].name_value(), ("login_nonce", ""));
	assert_eq!(headers[1].max_age(), Some(Duration::ZERO));
	assert_eq!(headers[2].name_value(), ("user", claims.as_str()));
	assert!(headers.iter().all(|cookie| cookie.path() == Some("/")));
	assert_eq!(bridge.current_session(Some(&callback)), Some(login.claims));
}

#[test]
fn expired_sessions_are_dropped_when_enforced() {
	let (mut bridge, cookies, _, _) = signed_in_bridge();
	let token = encode_test_token(&json!({ "email": "old@example.com", "exp": 0 }));
	let expired = ClaimSet::decode(&token).expect("Expired fixture should decode.");

	cookies.set("user", &expired.to_storage_value()).expect("Memory store should write.");

	assert_eq!(bridge.current_session(None), Some(expired));

	bridge.config.enforce_expiry = true;

	assert_eq!(bridge.current_session(None), None);
}
