//! Login initiation and redirect handling.
//!
//! [`SessionBridge::begin_login`] must complete before the widget is shown: the nonce it
//! stores is what the redirect's `state` is checked against. The ordering is enforced by the
//! caller's sequencing, not by a lock. [`SessionBridge::complete_login`] consumes the nonce
//! whatever the outcome, so a redirect can be accepted at most once.

// self
use crate::{
	_prelude::*,
	auth::{ClaimSet, Nonce, TokenSecret},
	bridge::SessionBridge,
	error::ReplayReason,
	obs::{self, BridgeOp, OpOutcome, OpSpan},
	redirect::RedirectParams,
	store::StoreError,
};

/// Result of a successfully handled redirect.
#[derive(Clone, Debug)]
pub struct CompletedLogin {
	/// Decoded, unverified claims of the identity token.
	pub claims: ClaimSet,
	/// The identity token as received.
	pub id_token: TokenSecret,
	/// Access token delivered alongside the identity token, if requested.
	pub access_token: Option<TokenSecret>,
	/// The redirect's `state` was checked against a stored nonce.
	///
	/// False only in degraded mode, when the nonce could not be read back from storage.
	pub verified: bool,
	/// The session record was written and will be visible to later renders.
	pub persisted: bool,
}

enum PendingNonce {
	Issued(Nonce),
	Absent,
	Unreadable(StoreError),
}

impl SessionBridge {
	/// Issues a fresh nonce and stores it as the pending login attempt.
	///
	/// Pass the returned nonce to the widget as its opaque `state` (see
	/// [`SessionBridge::widget_options`]). Any previously pending nonce is replaced.
	///
	/// This never fails. If storage is unavailable the nonce is still returned, and the login
	/// proceeds unverifiable: the redirect cannot be bound to this attempt. That is an accepted
	/// risk, governed by [`BridgeConfig::degraded_login`](crate::config::BridgeConfig), and it is
	/// logged at `warn` level rather than hidden.
	pub fn begin_login(&self) -> Nonce {
		const OP: BridgeOp = BridgeOp::BeginLogin;

		let _span = OpSpan::new(OP, "begin_login").entered();

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let nonce = Nonce::generate();

		match self.cookies.set(&self.config.keys.nonce, nonce.as_str()) {
			Ok(()) => {
				tracing::debug!(nonce = %nonce.fingerprint(), "Issued login nonce.");
				obs::record_op_outcome(OP, OpOutcome::Success);
			},
			Err(e) => {
				tracing::warn!(
					error = %e,
					"Login nonce could not be stored; the redirect will not be verifiable."
				);
				obs::record_op_outcome(OP, OpOutcome::Degraded);
			},
		}

		nonce
	}

	/// Handles the provider's redirect to the callback URL.
	///
	/// Parameters are read from the query and the fragment, last write winning. The `state` is
	/// checked first: the attempt fails with [`Error::ReplayOrForgery`] when it is missing or
	/// differs from the pending nonce (or none is pending), whatever else the redirect carries.
	/// Only a redirect bound to this attempt can then fail with [`Error::AuthorizationDenied`]
	/// (provider-reported error), [`Error::MissingToken`] (`id_token` absent), or
	/// [`Error::MalformedToken`] (payload not decodable). On failure nothing is stored.
	///
	/// On success the raw token and its claim set are stored. The token's signature is not
	/// verified. The pending nonce is cleared in every case.
	pub fn complete_login(&self, redirect_url: &Url) -> Result<CompletedLogin> {
		const OP: BridgeOp = BridgeOp::CompleteLogin;

		let _span = OpSpan::new(OP, "complete_login").entered();

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let params = RedirectParams::from_url(redirect_url);
		let pending = self.take_pending_nonce();
		let result = self.accept_redirect(&params, pending);

		match &result {
			Ok(login) if login.verified && login.persisted => {
				tracing::info!(token = %login.id_token.fingerprint(), "Login completed.");
				obs::record_op_outcome(OP, OpOutcome::Success);
			},
			Ok(login) => {
				tracing::warn!(
					verified = login.verified,
					persisted = login.persisted,
					"Login completed without a durable session."
				);
				obs::record_op_outcome(OP, OpOutcome::Degraded);
			},
			Err(e) => {
				tracing::warn!(error = %e, "Login redirect rejected.");
				obs::record_op_outcome(OP, OpOutcome::Failure);
			},
		}

		result
	}

	fn take_pending_nonce(&self) -> PendingNonce {
		match self.cookies.take(&self.config.keys.nonce) {
			Ok(Some(value)) if !value.is_empty() => PendingNonce::Issued(Nonce::from_stored(value)),
			Ok(_) => PendingNonce::Absent,
			Err(e) => PendingNonce::Unreadable(e),
		}
	}

	fn accept_redirect(
		&self,
		params: &RedirectParams,
		pending: PendingNonce,
	) -> Result<CompletedLogin> {
		let state = params
			.state()
			.ok_or(Error::ReplayOrForgery { reason: ReplayReason::MissingState })?;
		let verified = match pending {
			PendingNonce::Issued(nonce) if nonce.matches(state) => true,
			PendingNonce::Issued(_) =>
				return Err(Error::ReplayOrForgery { reason: ReplayReason::Mismatch }),
			PendingNonce::Absent =>
				return Err(Error::ReplayOrForgery { reason: ReplayReason::NoPendingNonce }),
			PendingNonce::Unreadable(e) if self.config.degraded_login => {
				tracing::warn!(
					error = %e,
					"Pending nonce is unreadable; accepting the redirect unverified."
				);

				false
			},
			PendingNonce::Unreadable(e) => return Err(e.into()),
		};

		if let Some(error) = params.error() {
			return Err(Error::AuthorizationDenied {
				error: error.to_owned(),
				description: params.error_description().map(ToOwned::to_owned),
			});
		}

		let id_token = params.id_token().map(TokenSecret::new).ok_or(Error::MissingToken)?;
		let claims = id_token.claims()?;
		let access_token = params.access_token().map(TokenSecret::new);
		let persisted = verified && self.persist_session(&id_token, &claims);

		Ok(CompletedLogin { claims, id_token, access_token, verified, persisted })
	}

	/// Writes the token and claim set together; a partial write is rolled back.
	fn persist_session(&self, id_token: &TokenSecret, claims: &ClaimSet) -> bool {
		let keys = &self.config.keys;

		if let Err(e) = self.cookies.set(&keys.token, id_token.expose()) {
			tracing::warn!(error = %e, "Identity token could not be stored.");

			return false;
		}
		if let Err(e) = self.cookies.set(&keys.claims, &claims.to_storage_value()) {
			tracing::warn!(error = %e, "Claim set could not be stored; rolling back the token.");

			if let Err(e) = self.cookies.remove(&keys.token) {
				tracing::warn!(error = %e, "Identity token could not be rolled back.");
			}

			return false;
		}

		true
	}
}
