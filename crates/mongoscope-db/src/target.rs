//! Database and collection selectors

use crate::error::{NameKind, Result, SessionError};

/// Longest database name the server accepts, in bytes
pub const MAX_DATABASE_NAME_LEN: usize = 63;

const DATABASE_FORBIDDEN: &[char] = &['/', '\\', '.', ' ', '"', '$', '\0'];

/// A fully configured database/collection pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
	pub database: String,
	pub collection: String,
}

impl Target {
	/// `database.collection`
	pub fn namespace(&self) -> String {
		format!("{}.{}", self.database, self.collection)
	}
}

fn invalid(kind: NameKind, name: &str, reason: &'static str) -> SessionError {
	SessionError::InvalidName {
		kind,
		name: name.to_string(),
		reason,
	}
}

/// Check a database name against the server's naming restrictions
pub fn validate_database_name(name: &str) -> Result<()> {
	if name.is_empty() {
		return Err(invalid(NameKind::Database, name, "must not be empty"));
	}
	if name.len() > MAX_DATABASE_NAME_LEN {
		return Err(invalid(
			NameKind::Database,
			name,
			"must be shorter than 64 bytes",
		));
	}
	if name.contains(DATABASE_FORBIDDEN) {
		return Err(invalid(
			NameKind::Database,
			name,
			"must not contain any of / \\ . space \" $ or NUL",
		));
	}
	Ok(())
}

/// Check a collection name against the server's naming restrictions
pub fn validate_collection_name(name: &str) -> Result<()> {
	if name.is_empty() {
		return Err(invalid(NameKind::Collection, name, "must not be empty"));
	}
	if name.contains('$') {
		return Err(invalid(NameKind::Collection, name, "must not contain '$'"));
	}
	if name.contains('\0') {
		return Err(invalid(NameKind::Collection, name, "must not contain NUL"));
	}
	Ok(())
}
