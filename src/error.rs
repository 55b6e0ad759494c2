use crate::scope::ScopeId;
use core::fmt::{self, Display, Formatter};

/// Everything that can go wrong while wiring or updating a binding.
///
/// None of these abort initialisation: the directive processor reports them and skips the offending directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
	/// No scope up to and including the root declares `name`.
	Unresolved { name: String },
	/// The scope was released (or never existed in this tree).
	StaleScope { scope: ScopeId },
	/// The directive isn't allowed on this kind of element.
	DisallowedElement { directive: &'static str, tag: String },
	/// A list directive was bound to something that isn't a sequence.
	NotASequence { name: String },
	UnknownDirective { kind: String },
	MalformedFor { value: String },
	MissingEventKind { attribute: String },
	MissingHandler { name: String },
	/// Listener notifications nested deeper than `limit`, likely through a listener cycle.
	NotifyDepthExceeded { name: String, limit: usize },
	RootNotFound { id: String },
	Config { message: String },
	/// A host DOM call failed.
	Dom { message: String },
}

impl Display for BindingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			BindingError::Unresolved { name } => write!(f, "Couldn't find state variable {:?}", name),
			BindingError::StaleScope { scope } => write!(f, "Scope {:?} was already released", scope),
			BindingError::DisallowedElement { directive, tag } => write!(f, "<{}> can't have a {:?} directive", tag, directive),
			BindingError::NotASequence { name } => write!(f, "List directive bound to {:?}, which is not a sequence", name),
			BindingError::UnknownDirective { kind } => write!(f, "Unrecognized directive {:?}", kind),
			BindingError::MalformedFor { value } => write!(f, "List directive {:?} can only have 1 or 2 parameters", value),
			BindingError::MissingEventKind { attribute } => write!(f, "No event type specified in {:?}", attribute),
			BindingError::MissingHandler { name } => write!(f, "There is no handler with name {:?}", name),
			BindingError::NotifyDepthExceeded { name, limit } => {
				write!(f, "Setting {:?} would nest listener notifications deeper than {}; is there a listener cycle?", name, limit)
			}
			BindingError::RootNotFound { id } => write!(f, "No element with id {:?} to bind", id),
			BindingError::Config { message } => write!(f, "Invalid configuration: {}", message),
			BindingError::Dom { message } => write!(f, "DOM operation failed: {}", message),
		}
	}
}

impl std::error::Error for BindingError {}
