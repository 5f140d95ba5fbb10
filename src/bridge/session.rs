//! Session lookup for both render paths, and logout.

// self
use crate::{
	_prelude::*,
	auth::ClaimSet,
	bridge::SessionBridge,
	obs::{self, BridgeOp, OpOutcome, OpSpan},
	render::{AuthState, RequestContext},
	signal::LogoutSignal,
};

impl SessionBridge {
	/// Returns the signed-in user's claims, or `None` when signed out.
	///
	/// With a request context (server render path) the raw token cookie of that request is
	/// decoded. Without one (client render path) the claim set stored by
	/// [`SessionBridge::complete_login`] is read back. Missing, unreadable, or corrupted records
	/// all mean signed out; this never fails.
	pub fn current_session(&self, request: Option<&RequestContext>) -> Option<ClaimSet> {
		const OP: BridgeOp = BridgeOp::CurrentSession;

		let _span = OpSpan::new(OP, if request.is_some() { "server" } else { "client" }).entered();
		let claims = match request {
			Some(request) => self.session_from_request(request),
			None => self.session_from_store(),
		}
		.filter(|claims| self.is_live(claims));

		obs::record_op_outcome(
			OP,
			if claims.is_some() { OpOutcome::Success } else { OpOutcome::Failure },
		);

		claims
	}

	/// Resolves the [`AuthState`] a view should render with.
	pub fn auth_state(&self, request: Option<&RequestContext>) -> AuthState {
		AuthState::from_claims(self.current_session(request))
	}

	/// Clears the local session and tells every other instance to do the same.
	///
	/// Removes the token, claim set, and any pending nonce; records the logout time in shared
	/// storage; and publishes it on the broadcast channel. Calling it while signed out still
	/// clears and broadcasts. Storage failures are logged and skipped, so the returned signal is
	/// always delivered on the channel.
	pub fn end_session(&self) -> LogoutSignal {
		const OP: BridgeOp = BridgeOp::EndSession;

		let _span = OpSpan::new(OP, "end_session").entered();

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let keys = &self.config.keys;
		let mut degraded = false;

		for key in [&keys.token, &keys.claims, &keys.nonce] {
			if let Err(e) = self.cookies.remove(key) {
				tracing::warn!(key = %key, error = %e, "Session record could not be cleared.");

				degraded = true;
			}
		}

		let signal = LogoutSignal::now();

		if let Err(e) = self.shared.set(&keys.logout, &signal.to_storage_value()) {
			tracing::warn!(error = %e, "Logout timestamp could not be written to shared storage.");

			degraded = true;
		}

		let listeners = self.broadcast.publish(signal);

		tracing::info!(listeners, "Session ended.");
		obs::record_op_outcome(OP, if degraded { OpOutcome::Degraded } else { OpOutcome::Success });

		signal
	}

	fn session_from_request(&self, request: &RequestContext) -> Option<ClaimSet> {
		let token = request.cookie(&self.config.keys.token).filter(|token| !token.is_empty())?;

		ClaimSet::decode(&token)
			.inspect_err(|e| tracing::debug!(error = %e, "Token cookie is not decodable."))
			.ok()
	}

	fn session_from_store(&self) -> Option<ClaimSet> {
		let stored = match self.cookies.get(&self.config.keys.claims) {
			Ok(stored) => stored.filter(|value| !value.is_empty())?,
			Err(e) => {
				tracing::debug!(error = %e, "Claim storage is unreadable; treating as signed out.");

				return None;
			},
		};

		ClaimSet::from_storage_value(&stored)
			.inspect_err(|e| tracing::debug!(error = %e, "Stored claim set is corrupted."))
			.ok()
	}

	fn is_live(&self, claims: &ClaimSet) -> bool {
		!self.config.enforce_expiry || !claims.is_expired_at(OffsetDateTime::now_utc())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{_preludet::*, bridge::LoginState, store::SessionStore};

	#[test]
	fn corrupted_claims_read_as_signed_out() {
		let (bridge, cookies, _) = build_test_bridge();

		cookies.set("user", "%%%not-base64").expect("Memory store should write.");

		assert_eq!(bridge.current_session(None), None);
		assert!(!bridge.auth_state(None).is_authenticated());
	}

	#[test]
	fn expiry_is_enforced_only_when_enabled() {
		let (bridge, _, _) = build_test_bridge();
		let token = encode_test_token(&json!({ "email": "user@example.com", "exp": 1 }));
		let request = RequestContext::from_cookie_header(&format!("id_token={token}"));

		assert!(bridge.current_session(Some(&request)).is_some());

		let mut strict = bridge.clone();

		strict.config.enforce_expiry = true;

		assert_eq!(strict.current_session(Some(&request)), None);
	}

	#[test]
	fn login_state_follows_the_lifecycle() {
		let (bridge, _, shared) = build_test_bridge();

		assert_eq!(bridge.login_state(), LoginState::Idle);

		let nonce = bridge.begin_login();

		assert_eq!(bridge.login_state(), LoginState::NonceIssued);

		let token = encode_test_token(&json!({ "email": "user@example.com" }));

		bridge.complete_login(&redirect_with(&token, nonce.as_str())).expect("Login should complete.");

		assert_eq!(bridge.login_state(), LoginState::Authenticated);

		let signal = bridge.end_session();

		assert_eq!(bridge.login_state(), LoginState::Idle);
		assert_eq!(
			shared.get("logout").expect("Memory store should read."),
			Some(signal.to_storage_value())
		);
		assert!(bridge.logout_observed_since(signal.at));
	}
}
