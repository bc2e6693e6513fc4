use crate::errors::FieldErrors;
use crate::models::{CategoryKind, EditTaskPayload, NewTaskPayload, ReflectionItem, ReflectionKind, SaveOriginPayload};
use crate::registry::TypeRegistry;

pub const MAX_ORIGIN_NAME_CHARS: usize = 30;
pub const MAX_ORIGIN_DESCRIPTOR_CHARS: usize = 2048;
pub const MAX_THEME_CHARS: usize = 100;
pub const MAX_CATEGORY_CHARS: usize = 50;
pub const MAX_TEXT_CHARS: usize = 1000;

/// Category must be present and registered for `kind`.
pub fn validate_category(
    registry: &TypeRegistry,
    kind: CategoryKind,
    value: &str,
    field: &str,
    errors: &mut FieldErrors,
) {
    if value.trim().is_empty() {
        errors.add(field, "this field may not be blank");
        return;
    }
    if value.chars().count() > MAX_CATEGORY_CHARS {
        errors.add(field, format!("ensure this field has no more than {} characters", MAX_CATEGORY_CHARS));
        return;
    }
    if !registry.contains(kind, value) {
        errors.add(field, format!("'{}' is not a valid {} type", value, kind.as_str()));
    }
}

/// Blank is accepted; anything else must be registered for `kind`.
pub fn validate_optional_category(
    registry: &TypeRegistry,
    kind: CategoryKind,
    value: Option<&str>,
    field: &str,
    errors: &mut FieldErrors,
) {
    match value {
        Some(value) if !value.is_empty() => validate_category(registry, kind, value, field, errors),
        _ => {}
    }
}

pub fn validate_max_chars(value: &str, max: usize, field: &str, errors: &mut FieldErrors) {
    if value.chars().count() > max {
        errors.add(field, format!("ensure this field has no more than {} characters", max));
    }
}

fn validate_required_text(value: &str, max: usize, field: &str, errors: &mut FieldErrors) {
    if value.trim().is_empty() {
        errors.add(field, "this field may not be blank");
    } else {
        validate_max_chars(value, max, field, errors);
    }
}

pub fn validate_new_tasks(registry: &TypeRegistry, tasks: &[NewTaskPayload]) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (index, task) in tasks.iter().enumerate() {
        validate_required_text(&task.text, MAX_TEXT_CHARS, &format!("tasks[{}].text", index), &mut errors);
        validate_category(
            registry,
            CategoryKind::Tasks,
            &task.category,
            &format!("tasks[{}].type", index),
            &mut errors,
        );
    }
    errors
}

pub fn validate_task_edits(registry: &TypeRegistry, tasks: &[EditTaskPayload]) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (index, task) in tasks.iter().enumerate() {
        if let Some(text) = task.text.as_deref() {
            validate_required_text(text, MAX_TEXT_CHARS, &format!("tasks[{}].text", index), &mut errors);
        }
        if let Some(category) = task.category.as_deref() {
            validate_category(
                registry,
                CategoryKind::Tasks,
                category,
                &format!("tasks[{}].type", index),
                &mut errors,
            );
        }
    }
    errors
}

pub fn validate_reflections(
    registry: &TypeRegistry,
    kind: ReflectionKind,
    items: &[ReflectionItem],
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let prefix = kind.table();
    for (index, item) in items.iter().enumerate() {
        validate_optional_category(
            registry,
            kind.category_kind(),
            item.category.as_deref(),
            &format!("{}[{}].type", prefix, index),
            &mut errors,
        );
        if let Some(text) = item.text.as_deref() {
            validate_max_chars(text, MAX_TEXT_CHARS, &format!("{}[{}].text", prefix, index), &mut errors);
        }
    }
    errors
}

pub fn validate_theme(theme: Option<&str>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(theme) = theme {
        validate_max_chars(theme, MAX_THEME_CHARS, "theme", &mut errors);
    }
    errors
}

pub fn validate_origin(payload: &SaveOriginPayload) -> FieldErrors {
    let mut errors = FieldErrors::new();
    validate_required_text(&payload.name, MAX_ORIGIN_NAME_CHARS, "name", &mut errors);
    if let Some(origin) = payload.origin.as_deref() {
        validate_max_chars(origin, MAX_ORIGIN_DESCRIPTOR_CHARS, "origin", &mut errors);
    }
    errors
}
