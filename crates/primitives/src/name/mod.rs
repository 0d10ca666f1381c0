//! Validated identifiers for sections, plug-ins and rulesets.
//!
//! Every name is an immutable, reference-counted string that passed the same
//! character check: non-empty, ASCII letters, digits and underscore. Clones are
//! cheap, and all types implement [`Borrow<str>`] so maps keyed by a name can
//! be probed with a plain `&str`.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Prefix that marks a check plug-in as addressing a management board.
pub const MANAGEMENT_PREFIX: &str = "mgmt_";

/// Errors produced when constructing or transforming a name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
	#[error("{kind} must not be empty")]
	Empty { kind: &'static str },

	#[error("invalid character {found:?} in {kind} {name:?}")]
	InvalidCharacter {
		kind: &'static str,
		name: String,
		found: char,
	},

	#[error("{0:?} is not a management plug-in name")]
	NotManagement(String),

	#[error("{0:?} already is a management plug-in name")]
	AlreadyManagement(String),
}

fn validate(kind: &'static str, name: &str) -> Result<(), NameError> {
	if name.is_empty() {
		return Err(NameError::Empty { kind });
	}
	match name
		.chars()
		.find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
	{
		Some(found) => Err(NameError::InvalidCharacter {
			kind,
			name: name.to_owned(),
			found,
		}),
		None => Ok(()),
	}
}

macro_rules! define_name {
	($(#[$attr:meta])* $ty:ident, $kind:literal) => {
		$(#[$attr])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $ty(Arc<str>);

		impl $ty {
			/// Human readable kind used in error messages.
			pub const KIND: &'static str = $kind;

			/// Validates `name` and wraps it.
			pub fn new(name: impl AsRef<str>) -> Result<Self, NameError> {
				let name = name.as_ref();
				validate(Self::KIND, name)?;
				Ok(Self(Arc::from(name)))
			}

			#[inline]
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Display for $ty {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl fmt::Debug for $ty {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}({:?})", stringify!($ty), &*self.0)
			}
		}

		impl AsRef<str> for $ty {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}

		impl Borrow<str> for $ty {
			fn borrow(&self) -> &str {
				&self.0
			}
		}

		impl FromStr for $ty {
			type Err = NameError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}

		impl TryFrom<String> for $ty {
			type Error = NameError;

			fn try_from(s: String) -> Result<Self, Self::Error> {
				Self::new(s)
			}
		}

		impl TryFrom<&str> for $ty {
			type Error = NameError;

			fn try_from(s: &str) -> Result<Self, Self::Error> {
				Self::new(s)
			}
		}

		impl From<$ty> for String {
			fn from(name: $ty) -> String {
				name.0.as_ref().to_owned()
			}
		}
	};
}

define_name!(
	/// Name of a raw section as emitted by an agent or an SNMP walk.
	SectionName,
	"section name"
);

define_name!(
	/// Name of the logical, source independent shape one or more sections parse into.
	ParsedSectionName,
	"parsed section name"
);

define_name!(
	/// Name of a check plug-in.
	CheckPluginName,
	"check plug-in name"
);

define_name!(
	/// Name of an inventory plug-in.
	InventoryPluginName,
	"inventory plug-in name"
);

define_name!(
	/// Name of a discovery or host label ruleset.
	RuleSetName,
	"ruleset name"
);

impl From<&SectionName> for ParsedSectionName {
	/// Section names share the parsed name alphabet, so the conversion is total.
	fn from(name: &SectionName) -> Self {
		Self(name.0.clone())
	}
}

impl From<SectionName> for ParsedSectionName {
	fn from(name: SectionName) -> Self {
		Self(name.0)
	}
}

impl From<&CheckPluginName> for ParsedSectionName {
	/// Default dependency of a plug-in that declares no sections.
	fn from(name: &CheckPluginName) -> Self {
		Self(name.0.clone())
	}
}

impl From<&InventoryPluginName> for ParsedSectionName {
	fn from(name: &InventoryPluginName) -> Self {
		Self(name.0.clone())
	}
}

impl CheckPluginName {
	/// Returns true if this name addresses a management board.
	pub fn is_management_name(&self) -> bool {
		self.0.starts_with(MANAGEMENT_PREFIX)
	}

	/// Strips the management prefix.
	///
	/// Fails for names that are not management names, and for the bare
	/// prefix which has no basic counterpart.
	pub fn create_basic_name(&self) -> Result<Self, NameError> {
		match self.0.strip_prefix(MANAGEMENT_PREFIX) {
			Some(basic) => Self::new(basic),
			None => Err(NameError::NotManagement(self.0.to_string())),
		}
	}

	/// Prepends the management prefix.
	pub fn create_management_name(&self) -> Result<Self, NameError> {
		if self.is_management_name() {
			return Err(NameError::AlreadyManagement(self.0.to_string()));
		}
		Ok(Self(Arc::from(format!("{MANAGEMENT_PREFIX}{}", self.0))))
	}
}
