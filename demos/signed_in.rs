//! Walks through one login on the server render path: issue a nonce, hand the widget its
//! options, accept the provider's redirect, and render the signed-in page from the request
//! cookies.

// std
use std::sync::Arc;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use url::Url;
// self
use session_bridge::{
	bridge::SessionBridge,
	config::BridgeConfig,
	render::RequestContext,
	signal::LogoutBroadcast,
	store::{MemoryStore, SessionStore},
};

const CONFIG: &str = r#"{
	"widget": {
		"client_id": "abc123",
		"domain": "tenant.eu.auth0.com",
		"audience": "https://tenant.eu.auth0.com/userinfo",
		"redirect_uri": "http://localhost:3000/signed-in"
	},
	"cookie": { "same_site": "Lax" }
}"#;

fn main() -> Result<()> {
	color_eyre::install()?;

	let config = BridgeConfig::from_json(CONFIG)?;
	let shared: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());
	let broadcast = LogoutBroadcast::default();

	// GET /: issue the nonce and embed the widget.
	let index = RequestContext::empty();
	let bridge =
		SessionBridge::for_request(config.clone(), &index, shared.clone(), broadcast.clone());
	let nonce = bridge.begin_login();

	println!("new Auth0Lock({});", bridge.widget_options(&nonce).to_json()?);
	println!("Hosted login fallback: {}.", bridge.authorize_url(&nonce)?);

	for header in index.cookies().set_cookie_headers(&config.cookie) {
		println!("Set-Cookie: {header}");
	}

	// GET /signed-in: the provider redirects back with the token in the fragment.
	let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"auth0|demo","email":"user@example.com"}"#);
	let token = format!("eyJhbGciOiJSUzI1NiJ9.{payload}.c2lnbmF0dXJl");
	let redirect = Url::parse(&format!(
		"http://localhost:3000/signed-in#id_token={token}&state={}",
		nonce.as_str()
	))?;
	let callback = RequestContext::from_cookie_header(&format!("login_nonce={}", nonce.as_str()));
	let bridge = SessionBridge::for_request(config.clone(), &callback, shared, broadcast);
	let login = bridge.complete_login(&redirect)?;

	println!("Signed in as {}.", login.claims.email().unwrap_or("an unknown user"));

	for header in callback.cookies().set_cookie_headers(&config.cookie) {
		println!("Set-Cookie: {header}");
	}

	// Any later request: render from the cookie alone.
	let next = RequestContext::from_cookie_header(&format!("id_token={token}"));
	let state = bridge.auth_state(Some(&next));

	println!("View props: {}", serde_json::to_string(&state)?);

	let signal = bridge.end_session();

	println!("Logged out at {}.", signal.at);

	Ok(())
}
