//! Parsing binding attributes into [`Directive`]s.

use crate::error::BindingError;

/// Attribute prefix marking directives, unless configured otherwise.
pub const DEFAULT_PREFIX: &str = "data-bind-";

/// Loop variable name of `for` directives that only name their list.
pub const DEFAULT_LOOP_VARIABLE: &str = "iter";

/// Lowercase tag names that accept two-way `data` bindings.
pub const TWO_WAY_TAGS: &[&str] = &["input", "textarea", "select"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
	/// `data="variable"`: Two-way sync between a form control's value and `variable`.
	Data { variable: String },
	/// `content="variable"`: The element's text follows `variable`.
	Content { variable: String },
	/// `for="item:list"` or `for="list"`: The element's children are repeated for each item of `list`.
	For { item: String, list: String },
	/// `on-event="handler"`: A configured handler listens for `event`.
	On { event: String, handler: String },
}

impl Directive {
	/// Parses the attribute `name="value"`.
	///
	/// Returns [`None`] for attributes that don't start with `prefix`.
	#[must_use]
	pub fn parse(prefix: &str, name: &str, value: &str) -> Option<Result<Self, BindingError>> {
		let rest = name.strip_prefix(prefix)?;
		let (kind, argument) = match rest.split_once('-') {
			Some((kind, argument)) => (kind, Some(argument)),
			None => (rest, None),
		};

		Some(match kind {
			"data" => Ok(Directive::Data { variable: value.to_owned() }),
			"content" => Ok(Directive::Content { variable: value.to_owned() }),
			"for" => parse_for(value),
			"on" => match argument {
				Some(event) if !event.is_empty() => Ok(Directive::On {
					event: event.to_owned(),
					handler: value.to_owned(),
				}),
				_ => Err(BindingError::MissingEventKind { attribute: name.to_owned() }),
			},
			kind => Err(BindingError::UnknownDirective { kind: kind.to_owned() }),
		})
	}

	#[must_use]
	pub fn kind(&self) -> &'static str {
		match self {
			Directive::Data { .. } => "data",
			Directive::Content { .. } => "content",
			Directive::For { .. } => "for",
			Directive::On { .. } => "on",
		}
	}
}

fn parse_for(value: &str) -> Result<Directive, BindingError> {
	match value.split(':').collect::<Vec<_>>()[..] {
		[list] => Ok(Directive::For {
			item: DEFAULT_LOOP_VARIABLE.to_owned(),
			list: list.to_owned(),
		}),
		[item, list] => Ok(Directive::For {
			item: item.to_owned(),
			list: list.to_owned(),
		}),
		_ => Err(BindingError::MalformedFor { value: value.to_owned() }),
	}
}
