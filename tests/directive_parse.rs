use dom_wire::{
	directive::{Directive, DEFAULT_PREFIX},
	BindingError,
};

fn parse(name: &str, value: &str) -> Option<Result<Directive, BindingError>> {
	Directive::parse(DEFAULT_PREFIX, name, value)
}

#[test]
fn ignores_other_attributes() {
	assert_eq!(parse("id", "app-root"), None);
	assert_eq!(parse("data-other", "x"), None);
	assert_eq!(Directive::parse("w-", "data-bind-content", "x"), None);
}

#[test]
fn data_and_content() {
	assert_eq!(parse("data-bind-data", "name"), Some(Ok(Directive::Data { variable: "name".to_owned() })));
	assert_eq!(parse("data-bind-content", "title"), Some(Ok(Directive::Content { variable: "title".to_owned() })));
	assert_eq!(Directive::parse("w-", "w-content", "title"), Some(Ok(Directive::Content { variable: "title".to_owned() })));
}

#[test]
fn for_arguments() {
	assert_eq!(
		parse("data-bind-for", "todo:todos"),
		Some(Ok(Directive::For {
			item: "todo".to_owned(),
			list: "todos".to_owned(),
		}))
	);
	assert_eq!(
		parse("data-bind-for", "todos"),
		Some(Ok(Directive::For {
			item: "iter".to_owned(),
			list: "todos".to_owned(),
		}))
	);
	assert_eq!(
		parse("data-bind-for", "a:b:c"),
		Some(Err(BindingError::MalformedFor { value: "a:b:c".to_owned() }))
	);
}

#[test]
fn event_bindings() {
	assert_eq!(
		parse("data-bind-on-click", "addTodo"),
		Some(Ok(Directive::On {
			event: "click".to_owned(),
			handler: "addTodo".to_owned(),
		}))
	);
	assert_eq!(
		parse("data-bind-on-my-event", "custom"),
		Some(Ok(Directive::On {
			event: "my-event".to_owned(),
			handler: "custom".to_owned(),
		}))
	);
	assert_eq!(
		parse("data-bind-on", "addTodo"),
		Some(Err(BindingError::MissingEventKind {
			attribute: "data-bind-on".to_owned()
		}))
	);
	assert_eq!(
		parse("data-bind-on-", "addTodo"),
		Some(Err(BindingError::MissingEventKind {
			attribute: "data-bind-on-".to_owned()
		}))
	);
}

#[test]
fn unknown_kind() {
	assert_eq!(
		Directive::parse("w-", "w-frobnicate", "x"),
		Some(Err(BindingError::UnknownDirective { kind: "frobnicate".to_owned() }))
	);
	assert_eq!(Directive::Content { variable: String::new() }.kind(), "content");
}
