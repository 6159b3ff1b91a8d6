//! HTML form descriptions and validation.
//!
//! A [`Form`] is what templates render: an ordered list of fields with
//! their kind, current value and errors. Each concrete form knows how to
//! build an unbound instance and how to validate submitted data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Group, Post};

pub const REQUIRED_MESSAGE: &str = "Обязательное поле.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Выберите корректный вариант. Вашего варианта нет среди допустимых значений.";
const EMPTY_CHOICE_LABEL: &str = "---------";

/// What kind of value a field accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    Char,
    /// One of a set of model rows, identified by primary key.
    ModelChoice { choices: Vec<Choice> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// How a field is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    PasswordInput,
    Textarea,
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
    pub required: bool,
    pub kind: FieldKind,
    pub widget: Widget,
    pub value: String,
    pub errors: Vec<String>,
}

impl FormField {
    fn char(name: &'static str, label: &'static str, widget: Widget) -> Self {
        Self {
            name,
            label,
            help_text: "",
            required: true,
            kind: FieldKind::Char,
            widget,
            value: String::new(),
            errors: Vec::new(),
        }
    }

    fn help(mut self, help_text: &'static str) -> Self {
        self.help_text = help_text;
        self
    }
}

/// A renderable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Form {
    pub fields: Vec<FormField>,
    pub non_field_errors: Vec<String>,
}

impl Form {
    fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            non_field_errors: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn has_errors(&self) -> bool {
        !self.non_field_errors.is_empty() || self.fields.iter().any(|f| !f.errors.is_empty())
    }

    pub fn add_error(&mut self, field: Option<&str>, message: impl Into<String>) {
        match field.and_then(|name| self.field_mut(name)) {
            Some(f) => f.errors.push(message.into()),
            None => self.non_field_errors.push(message.into()),
        }
    }

    fn set_value(&mut self, name: &str, value: &str) {
        if let Some(f) = self.field_mut(name) {
            f.value = value.to_string();
            if let FieldKind::ModelChoice { choices } = &mut f.kind {
                for choice in choices.iter_mut() {
                    choice.selected = choice.value == value;
                }
            }
        }
    }
}

/// Submitted post form data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFormData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: String,
}

/// Validated post form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPost {
    pub text: String,
    pub group_id: Option<Uuid>,
}

/// Form for creating and editing a post: `text` and an optional `group`.
pub struct PostForm;

impl PostForm {
    pub fn unbound(groups: &[Group]) -> Form {
        let mut choices = vec![Choice {
            value: String::new(),
            label: EMPTY_CHOICE_LABEL.to_string(),
            selected: true,
        }];
        choices.extend(groups.iter().map(|g| Choice {
            value: g.id.to_string(),
            label: g.title.clone(),
            selected: false,
        }));

        Form::new(vec![
            FormField::char("text", "Текст", Widget::Textarea).help("Введите текст поста"),
            FormField {
                name: "group",
                label: "Группа",
                help_text: "Группа, к которой относится пост",
                required: false,
                kind: FieldKind::ModelChoice { choices },
                widget: Widget::Select,
                value: String::new(),
                errors: Vec::new(),
            },
        ])
    }

    /// Form pre-populated with an existing post.
    pub fn for_post(post: &Post, groups: &[Group]) -> Form {
        let mut form = Self::unbound(groups);
        form.set_value("text", &post.text);
        let group = post.group_id.map(|id| id.to_string()).unwrap_or_default();
        form.set_value("group", &group);
        form
    }

    /// Validate submitted data. On failure the returned form carries the
    /// submitted values and the error messages.
    pub fn bind(data: &PostFormData, groups: &[Group]) -> Result<CleanedPost, Form> {
        let mut form = Self::unbound(groups);
        form.set_value("text", &data.text);
        form.set_value("group", data.group.trim());

        let text = data.text.trim().to_string();
        if text.is_empty() {
            form.add_error(Some("text"), REQUIRED_MESSAGE);
        }

        let group_raw = data.group.trim();
        let group_id = if group_raw.is_empty() {
            None
        } else {
            match Uuid::parse_str(group_raw) {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    form.add_error(Some("group"), INVALID_CHOICE_MESSAGE);
                    None
                }
            }
        };

        if form.has_errors() {
            return Err(form);
        }
        Ok(CleanedPost { text, group_id })
    }
}

/// Submitted comment form data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentFormData {
    #[serde(default)]
    pub text: String,
}

/// Form for adding a comment to a post.
pub struct CommentForm;

impl CommentForm {
    pub fn unbound() -> Form {
        Form::new(vec![
            FormField::char("text", "Текст комментария", Widget::Textarea)
                .help("Текст нового комментария"),
        ])
    }

    pub fn bind(data: &CommentFormData) -> Result<String, Form> {
        let text = data.text.trim();
        if text.is_empty() {
            let mut form = Self::unbound();
            form.add_error(Some("text"), REQUIRED_MESSAGE);
            return Err(form);
        }
        Ok(text.to_string())
    }
}

/// Submitted login form data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginFormData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Username and password form of the login page.
pub struct LoginForm;

impl LoginForm {
    pub fn unbound() -> Form {
        Form::new(vec![
            FormField::char("username", "Имя пользователя", Widget::TextInput),
            FormField::char("password", "Пароль", Widget::PasswordInput),
        ])
    }

    /// Check that both fields are present. Credentials are verified by the caller.
    pub fn bind(data: &LoginFormData) -> Result<(String, String), Form> {
        let mut form = Self::unbound();
        form.set_value("username", &data.username);

        let username = data.username.trim();
        if username.is_empty() {
            form.add_error(Some("username"), REQUIRED_MESSAGE);
        }
        if data.password.is_empty() {
            form.add_error(Some("password"), REQUIRED_MESSAGE);
        }
        if form.has_errors() {
            return Err(form);
        }
        Ok((username.to_string(), data.password.clone()))
    }

    /// A login form that failed credential verification.
    pub fn rejected(username: &str) -> Form {
        let mut form = Self::unbound();
        form.set_value("username", username);
        form.add_error(
            None,
            "Пожалуйста, введите правильные имя пользователя и пароль.",
        );
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<Group> {
        vec![Group::new(
            "Тестовая группа".into(),
            "Test_slug".into(),
            "Тестовое описание".into(),
        )]
    }

    #[test]
    fn test_post_form_field_kinds() {
        let form = PostForm::unbound(&groups());

        let text = form.field("text").unwrap();
        assert_eq!(text.kind, FieldKind::Char);
        assert!(text.required);

        let group = form.field("group").unwrap();
        assert!(matches!(group.kind, FieldKind::ModelChoice { .. }));
        assert!(!group.required);
    }

    #[test]
    fn test_post_form_requires_text() {
        let data = PostFormData {
            text: "   ".into(),
            group: String::new(),
        };
        let form = PostForm::bind(&data, &groups()).unwrap_err();
        assert_eq!(form.field("text").unwrap().errors, vec![REQUIRED_MESSAGE]);
    }

    #[test]
    fn test_post_form_rejects_unknown_group() {
        let data = PostFormData {
            text: "text".into(),
            group: Uuid::new_v4().to_string(),
        };
        let form = PostForm::bind(&data, &groups()).unwrap_err();
        assert_eq!(
            form.field("group").unwrap().errors,
            vec![INVALID_CHOICE_MESSAGE]
        );
    }

    #[test]
    fn test_post_form_accepts_existing_group() {
        let groups = groups();
        let data = PostFormData {
            text: " Тестовый пост ".into(),
            group: groups[0].id.to_string(),
        };
        let cleaned = PostForm::bind(&data, &groups).unwrap();
        assert_eq!(cleaned.text, "Тестовый пост");
        assert_eq!(cleaned.group_id, Some(groups[0].id));
    }

    #[test]
    fn test_for_post_preselects_group() {
        let groups = groups();
        let post = Post::new(Uuid::new_v4(), "Тестовый пост".into(), Some(groups[0].id));
        let form = PostForm::for_post(&post, &groups);

        assert_eq!(form.field("text").unwrap().value, "Тестовый пост");
        let FieldKind::ModelChoice { choices } = &form.field("group").unwrap().kind else {
            panic!("group must be a model choice");
        };
        let selected: Vec<_> = choices.iter().filter(|c| c.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "Тестовая группа");
    }

    #[test]
    fn test_comment_form_requires_text() {
        assert!(CommentForm::bind(&CommentFormData { text: "".into() }).is_err());
        assert_eq!(
            CommentForm::bind(&CommentFormData { text: " ok ".into() }).unwrap(),
            "ok"
        );
    }
}
