//! Closed set of credential categories a request may require.

// self
use crate::_prelude::*;

/// Error returned when parsing an unknown auth type label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
#[error("Unknown auth type `{label}`; expected one of none, user, owner.")]
pub struct AuthTypeError {
	/// Label that failed to parse.
	pub label: String,
}

/// Category of credential a request requires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
	/// No credential needed; always bypasses the gate.
	None,
	#[default]
	/// End-user credential.
	User,
	/// Account-owner credential.
	Owner,
}
impl AuthType {
	/// Every auth type, in gate slot order.
	pub const ALL: [AuthType; 3] = [AuthType::None, AuthType::User, AuthType::Owner];

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthType::None => "none",
			AuthType::User => "user",
			AuthType::Owner => "owner",
		}
	}

	/// Whether calls tagged with this type must wait on the gate.
	pub const fn requires_token(self) -> bool {
		!matches!(self, AuthType::None)
	}

	pub(crate) const fn slot(self) -> usize {
		match self {
			AuthType::None => 0,
			AuthType::User => 1,
			AuthType::Owner => 2,
		}
	}
}
impl Display for AuthType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for AuthType {
	type Err = AuthTypeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| AuthTypeError { label: s.to_owned() })
	}
}
