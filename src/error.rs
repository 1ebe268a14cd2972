use crate::dom::HostError;
use thiserror::Error;

/// Everything that can go wrong while materializing or reconciling a [`VNode`](`crate::VNode`) tree.
///
/// All variants except [`Error::Host`] describe malformed input and are raised before the first host mutation.
#[derive(Debug, Error)]
pub enum Error {
	#[error("invalid tag name {0:?}")]
	InvalidTag(String),

	#[error("invalid attribute name {0:?}")]
	InvalidAttributeName(String),

	#[error("attribute {name:?} can't hold {found}")]
	InvalidAttributeValue { name: String, found: &'static str },

	/// Two attributes on the same element target the same DOM slot, like `class` and `className`.
	#[error("attributes {0:?} and {1:?} both target the same DOM slot")]
	ConflictingAttributes(String, String),

	#[error("tree is deeper than the configured limit of {limit}")]
	DepthLimit { limit: usize },

	#[error(transparent)]
	Host(#[from] HostError),
}
