// Post editor state and validation.

use crate::api::{NewPost, Post};

pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 100;
pub const BODY_MIN: usize = 20;
pub const BODY_MAX: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Body,
    Author,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Body => "Content",
            FormField::Author => "Author ID",
        }
    }

    fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::Body,
            FormField::Body => FormField::Author,
            FormField::Author => FormField::Title,
        }
    }

    fn prev(&self) -> Self {
        match self {
            FormField::Title => FormField::Author,
            FormField::Body => FormField::Title,
            FormField::Author => FormField::Body,
        }
    }
}

/// Editable post fields with per-field validation messages.
#[derive(Debug, Clone)]
pub struct PostForm {
    pub mode: FormMode,
    pub title: String,
    pub body: String,
    pub author: String,
    pub focus: FormField,
    pub errors: Vec<(FormField, String)>,
    pub submitting: bool,
    /// Failure reported by the remote for the last submit.
    pub submit_error: Option<String>,
}

impl PostForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            body: String::new(),
            author: String::new(),
            focus: FormField::Title,
            errors: Vec::new(),
            submitting: false,
            submit_error: None,
        }
    }

    /// Form pre-filled from an existing post.
    pub fn edit(post: &Post) -> Self {
        Self {
            mode: FormMode::Edit { id: post.id },
            title: post.title.clone(),
            body: post.body.clone(),
            author: post.user_id.to_string(),
            ..Self::create()
        }
    }

    pub fn heading(&self) -> String {
        match self.mode {
            FormMode::Create => "New Post".to_string(),
            FormMode::Edit { id } => format!("Edit Post #{}", id),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Body => &mut self.body,
            FormField::Author => &mut self.author,
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Body => &self.body,
            FormField::Author => &self.author,
        }
    }

    pub fn push(&mut self, c: char) {
        if self.focus == FormField::Author && !c.is_ascii_digit() {
            return;
        }
        self.focused_mut().push(c);
    }

    pub fn pop(&mut self) {
        self.focused_mut().pop();
    }

    pub fn error_for(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| message.as_str())
    }

    /// Check every field; on success returns the payload to send.
    pub fn validate(&mut self) -> Option<NewPost> {
        self.errors.clear();

        let title = self.title.trim();
        let title_len = title.chars().count();
        if title.is_empty() {
            self.errors.push((FormField::Title, "Title is required".into()));
        } else if title_len < TITLE_MIN {
            self.errors.push((
                FormField::Title,
                format!("Title must be at least {} characters", TITLE_MIN),
            ));
        } else if title_len > TITLE_MAX {
            self.errors.push((
                FormField::Title,
                format!("Title must not exceed {} characters", TITLE_MAX),
            ));
        }

        let body = self.body.trim();
        let body_len = body.chars().count();
        if body.is_empty() {
            self.errors.push((FormField::Body, "Content is required".into()));
        } else if body_len < BODY_MIN {
            self.errors.push((
                FormField::Body,
                format!("Content must be at least {} characters", BODY_MIN),
            ));
        } else if body_len > BODY_MAX {
            self.errors.push((
                FormField::Body,
                format!("Content must not exceed {} characters", BODY_MAX),
            ));
        }

        let user_id = match self.author.trim().parse::<u64>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                self.errors
                    .push((FormField::Author, "Please select an author".into()));
                None
            }
        };

        if let Some(&(field, _)) = self.errors.first() {
            self.focus = field;
        }

        let user_id = user_id?;
        if !self.errors.is_empty() {
            return None;
        }
        Some(NewPost {
            user_id,
            title: title.to_string(),
            body: body.to_string(),
        })
    }
}
