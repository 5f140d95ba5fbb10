//! Login widget configuration.
//!
//! The widget itself is an external collaborator; the bridge only describes it. A validated
//! [`WidgetConfig`] renders either the constructor object a page hands to the embeddable
//! widget ([`WidgetOptions`]) or the equivalent hosted-login authorize URL. Both carry the
//! login nonce as the opaque `state` value.

// crates.io
use oauth2::{AuthUrl, CsrfToken, RedirectUrl, ResponseType, Scope, basic::BasicClient};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, Nonce, ProviderDomain, ScopeSet},
	error::ConfigError,
};

/// Response type requesting both an access token and an identity token.
pub const TOKEN_AND_ID_TOKEN: &str = "token id_token";

const RESPONSE_TYPE_ID_TOKEN: &str = "id_token";
const RESPONSE_TYPE_TOKEN: &str = "token";

/// Errors raised while constructing or validating widget configuration.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum WidgetConfigError {
	/// The redirect target is required.
	#[error("Missing redirect target.")]
	MissingRedirectUri,
	/// The redirect target must be an absolute `http` or `https` URL without a fragment.
	#[error("Redirect target must be an http(s) URL without a fragment: {url}.")]
	InvalidRedirectUri {
		/// Redirect URL that failed validation.
		url: String,
	},
	/// The audience must be non-empty when set.
	#[error("Audience cannot be empty.")]
	EmptyAudience,
	/// The response type must request an identity token and only known token kinds.
	#[error("Response type `{value}` must include id_token and only token kinds.")]
	InvalidResponseType {
		/// Response type that failed validation.
		value: String,
	},
}

/// Builder for [`WidgetConfig`] values; also the serde form of the configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WidgetConfigBuilder {
	/// Client identifier issued by the provider.
	pub client_id: ClientId,
	/// Provider tenant domain.
	pub domain: ProviderDomain,
	/// Optional API audience for the access token.
	#[serde(default)]
	pub audience: Option<String>,
	/// Requested permission scopes.
	#[serde(default = "ScopeSet::openid_default")]
	pub scopes: ScopeSet,
	/// Requested token types.
	#[serde(default = "default_response_type")]
	pub response_type: String,
	/// Pre-registered redirect target.
	#[serde(default)]
	pub redirect_uri: Option<Url>,
}
impl WidgetConfigBuilder {
	/// Creates a builder for the provided client and domain.
	pub fn new(client_id: ClientId, domain: ProviderDomain) -> Self {
		Self {
			client_id,
			domain,
			audience: None,
			scopes: ScopeSet::openid_default(),
			response_type: default_response_type(),
			redirect_uri: None,
		}
	}

	/// Sets the API audience.
	pub fn audience(mut self, audience: impl Into<String>) -> Self {
		self.audience = Some(audience.into());

		self
	}

	/// Overrides the requested scopes.
	pub fn scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = scopes;

		self
	}

	/// Overrides the requested token types.
	pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
		self.response_type = response_type.into();

		self
	}

	/// Sets the redirect target.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<WidgetConfig, WidgetConfigError> {
		let redirect_uri = self.redirect_uri.ok_or(WidgetConfigError::MissingRedirectUri)?;

		validate_redirect(&redirect_uri)?;
		validate_response_type(&self.response_type)?;

		if self.audience.as_deref().is_some_and(|audience| audience.trim().is_empty()) {
			return Err(WidgetConfigError::EmptyAudience);
		}

		Ok(WidgetConfig {
			client_id: self.client_id,
			domain: self.domain,
			audience: self.audience,
			scopes: self.scopes,
			response_type: self.response_type,
			redirect_uri,
		})
	}
}

/// Validated widget configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WidgetConfigBuilder")]
pub struct WidgetConfig {
	/// Client identifier issued by the provider.
	pub client_id: ClientId,
	/// Provider tenant domain.
	pub domain: ProviderDomain,
	/// Optional API audience for the access token.
	pub audience: Option<String>,
	/// Requested permission scopes.
	pub scopes: ScopeSet,
	/// Requested token types.
	pub response_type: String,
	/// Pre-registered redirect target.
	pub redirect_uri: Url,
}
impl WidgetConfig {
	/// Creates a new builder for the provided client and domain.
	pub fn builder(client_id: ClientId, domain: ProviderDomain) -> WidgetConfigBuilder {
		WidgetConfigBuilder::new(client_id, domain)
	}

	/// Hosted-login authorize endpoint for the domain.
	pub fn authorize_endpoint(&self) -> Result<Url, ConfigError> {
		Url::parse(&format!("https://{}/authorize", self.domain))
			.map_err(|source| ConfigError::InvalidAuthorizeUrl { source })
	}

	/// Constructor object for the embeddable widget, bound to `nonce`.
	pub fn options(&self, nonce: &Nonce) -> WidgetOptions {
		WidgetOptions {
			client_id: self.client_id.to_string(),
			domain: self.domain.to_string(),
			auth: WidgetAuthOptions {
				redirect_url: self.redirect_uri.to_string(),
				response_type: self.response_type.clone(),
				audience: self.audience.clone(),
				params: WidgetAuthParams {
					scope: self.scopes.normalized(),
					state: nonce.as_str().to_owned(),
				},
			},
		}
	}

	/// Hosted-login URL equivalent to showing the widget, bound to `nonce`.
	pub fn authorize_url(&self, nonce: &Nonce) -> Result<Url, ConfigError> {
		let auth_url = AuthUrl::from_url(self.authorize_endpoint()?);
		let client = BasicClient::new(oauth2::ClientId::new(self.client_id.to_string()))
			.set_auth_uri(auth_url)
			.set_redirect_uri(RedirectUrl::from_url(self.redirect_uri.clone()));
		let state = nonce.as_str().to_owned();
		let mut request = client
			.authorize_url(move || CsrfToken::new(state))
			.set_response_type(&ResponseType::new(self.response_type.clone()))
			.add_scopes(self.scopes.iter().map(|scope| Scope::new(scope.clone())))
			.add_extra_param("nonce", nonce.as_str());

		if let Some(audience) = self.audience.as_deref() {
			request = request.add_extra_param("audience", audience);
		}

		let (url, _) = request.url();

		Ok(url)
	}
}
impl TryFrom<WidgetConfigBuilder> for WidgetConfig {
	type Error = WidgetConfigError;

	fn try_from(builder: WidgetConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

/// Constructor object handed to the embeddable widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WidgetOptions {
	/// Client identifier.
	#[serde(rename = "clientID")]
	pub client_id: String,
	/// Provider tenant domain.
	pub domain: String,
	/// Authentication parameters.
	pub auth: WidgetAuthOptions,
}
impl WidgetOptions {
	/// Serializes the options for embedding into a rendered page.
	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(self)
	}
}

/// Authentication section of [`WidgetOptions`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetAuthOptions {
	/// Redirect target.
	pub redirect_url: String,
	/// Requested token types.
	pub response_type: String,
	/// Optional API audience.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub audience: Option<String>,
	/// Extra authorize parameters.
	pub params: WidgetAuthParams,
}

/// Authorize parameters forwarded by the widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WidgetAuthParams {
	/// Space-delimited scopes.
	pub scope: String,
	/// Opaque state value, the login nonce.
	pub state: String,
}

fn default_response_type() -> String {
	TOKEN_AND_ID_TOKEN.into()
}

fn validate_redirect(url: &Url) -> Result<(), WidgetConfigError> {
	if matches!(url.scheme(), "http" | "https") && url.has_host() && url.fragment().is_none() {
		Ok(())
	} else {
		Err(WidgetConfigError::InvalidRedirectUri { url: url.to_string() })
	}
}

fn validate_response_type(value: &str) -> Result<(), WidgetConfigError> {
	let kinds = value.split_whitespace().collect::<Vec<_>>();
	let known =
		kinds.iter().all(|kind| matches!(*kind, RESPONSE_TYPE_ID_TOKEN | RESPONSE_TYPE_TOKEN));

	if known && kinds.contains(&RESPONSE_TYPE_ID_TOKEN) {
		Ok(())
	} else {
		Err(WidgetConfigError::InvalidResponseType { value: value.to_owned() })
	}
}
