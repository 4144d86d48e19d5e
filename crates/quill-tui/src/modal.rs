//! Modal forms: login, registration, profile edit, and post compose.
//!
//! A modal captures all key input while open. Forms mutate themselves and
//! return a [`ModalAction`] for the reducer to act on; they never touch
//! the rest of the app state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use quill_core::{Post, PostDraft, Profile, ProfileUpdate, RegisterRequest};

#[derive(Debug)]
pub enum Modal {
    Login(LoginForm),
    Register(RegisterForm),
    EditProfile(ProfileForm),
    Compose(ComposeForm),
}

impl Modal {
    pub fn title(&self) -> &'static str {
        match self {
            Modal::Login(_) => "Sign in",
            Modal::Register(_) => "Create account",
            Modal::EditProfile(_) => "Edit profile",
            Modal::Compose(form) => {
                if form.editing.is_some() {
                    "Edit post"
                } else {
                    "New post"
                }
            }
        }
    }

    pub fn set_error(&mut self, error: String) {
        match self {
            Modal::Login(form) => form.error = Some(error),
            Modal::Register(form) => form.error = Some(error),
            Modal::EditProfile(form) => form.error = Some(error),
            Modal::Compose(form) => form.error = Some(error),
        }
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        match self {
            Modal::Login(form) => form.submitting = submitting,
            Modal::Register(form) => form.submitting = submitting,
            Modal::EditProfile(form) => form.submitting = submitting,
            Modal::Compose(form) => form.submitting = submitting,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        match self {
            Modal::Login(form) => form.handle_key(key),
            Modal::Register(form) => form.handle_key(key),
            Modal::EditProfile(form) => form.handle_key(key),
            Modal::Compose(form) => form.handle_key(key),
        }
    }
}

/// What the reducer should do after a modal consumed a key.
#[derive(Debug)]
pub enum ModalAction {
    Stay,
    Close,
    SwitchToRegister,
    SwitchToLogin,
    Submit(ModalSubmit),
}

#[derive(Debug)]
pub enum ModalSubmit {
    Login {
        username: String,
        password: String,
    },
    Register {
        request: RegisterRequest,
    },
    Profile {
        update: ProfileUpdate,
    },
    Compose {
        editing: Option<u64>,
        draft: PostDraft,
    },
}

fn edit_field(field: &mut String, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => field.push(c),
        KeyCode::Backspace => {
            field.pop();
        }
        _ => {}
    }
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: usize,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginForm {
    fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        if self.submitting {
            return ModalAction::Stay;
        }
        match key.code {
            KeyCode::Esc => return ModalAction::Close,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % 2,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + 1) % 2,
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ModalAction::SwitchToRegister;
            }
            KeyCode::Enter => {
                if self.username.trim().is_empty() || self.password.is_empty() {
                    self.error = Some("Username and password are required.".to_string());
                } else {
                    return ModalAction::Submit(ModalSubmit::Login {
                        username: self.username.trim().to_string(),
                        password: self.password.clone(),
                    });
                }
            }
            _ => {
                let field = if self.focus == 0 {
                    &mut self.username
                } else {
                    &mut self.password
                };
                edit_field(field, key);
            }
        }
        ModalAction::Stay
    }
}

#[derive(Debug, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub focus: usize,
    pub error: Option<String>,
    pub submitting: bool,
}

impl RegisterForm {
    fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        if self.submitting {
            return ModalAction::Stay;
        }
        match key.code {
            KeyCode::Esc => return ModalAction::Close,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % 3,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + 2) % 3,
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ModalAction::SwitchToLogin;
            }
            KeyCode::Enter => {
                if self.username.trim().is_empty() || self.password.is_empty() {
                    self.error = Some("Username and password are required.".to_string());
                } else {
                    let email = self.email.trim();
                    return ModalAction::Submit(ModalSubmit::Register {
                        request: RegisterRequest {
                            username: self.username.trim().to_string(),
                            password: self.password.clone(),
                            email: (!email.is_empty()).then(|| email.to_string()),
                            first_name: None,
                            last_name: None,
                        },
                    });
                }
            }
            _ => {
                let field = match self.focus {
                    0 => &mut self.username,
                    1 => &mut self.email,
                    _ => &mut self.password,
                };
                edit_field(field, key);
            }
        }
        ModalAction::Stay
    }
}

#[derive(Debug, Default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub focus: usize,
    pub error: Option<String>,
    pub submitting: bool,
}

impl ProfileForm {
    pub fn prefill(profile: &Profile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            bio: profile.bio.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        if self.submitting {
            return ModalAction::Stay;
        }
        match key.code {
            KeyCode::Esc => return ModalAction::Close,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % 3,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + 2) % 3,
            KeyCode::Enter => {
                return ModalAction::Submit(ModalSubmit::Profile {
                    update: ProfileUpdate {
                        first_name: Some(self.first_name.trim().to_string()),
                        last_name: Some(self.last_name.trim().to_string()),
                        bio: Some(self.bio.clone()),
                        ..ProfileUpdate::default()
                    },
                });
            }
            _ => {
                let field = match self.focus {
                    0 => &mut self.first_name,
                    1 => &mut self.last_name,
                    _ => &mut self.bio,
                };
                edit_field(field, key);
            }
        }
        ModalAction::Stay
    }
}

#[derive(Debug, Default)]
pub struct ComposeForm {
    pub editing: Option<u64>,
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_show: bool,
    pub focus: usize,
    pub error: Option<String>,
    pub submitting: bool,
}

impl ComposeForm {
    pub fn new_post() -> Self {
        Self {
            is_show: true,
            ..Self::default()
        }
    }

    pub fn edit(post: &Post) -> Self {
        Self {
            editing: Some(post.id),
            title: post.title.clone(),
            content: post.content.clone(),
            category: post.category.clone().unwrap_or_default(),
            is_show: post.is_show,
            ..Self::default()
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> ModalAction {
        if self.submitting {
            return ModalAction::Stay;
        }
        match key.code {
            KeyCode::Esc => return ModalAction::Close,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % 3,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + 2) % 3,
            // Visibility toggle, mirrored in the form footer.
            KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.is_show = !self.is_show;
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.title.trim().is_empty() || self.content.trim().is_empty() {
                    self.error = Some("Title and content are required.".to_string());
                } else {
                    let category = self.category.trim();
                    return ModalAction::Submit(ModalSubmit::Compose {
                        editing: self.editing,
                        draft: PostDraft {
                            title: self.title.trim().to_string(),
                            content: self.content.clone(),
                            image: None,
                            category: (!category.is_empty()).then(|| category.to_string()),
                            is_show: Some(self.is_show),
                        },
                    });
                }
            }
            // The body is multi-line; Enter inserts a newline there and
            // advances focus elsewhere.
            KeyCode::Enter => {
                if self.focus == 1 {
                    self.content.push('\n');
                } else {
                    self.focus = (self.focus + 1) % 3;
                }
            }
            _ => {
                let field = match self.focus {
                    0 => &mut self.title,
                    1 => &mut self.content,
                    _ => &mut self.category,
                };
                edit_field(field, key);
            }
        }
        ModalAction::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut Modal, text: &str) {
        for c in text.chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn login_rejects_empty_credentials_locally() {
        let mut modal = Modal::Login(LoginForm::default());
        assert!(matches!(
            modal.handle_key(key(KeyCode::Enter)),
            ModalAction::Stay
        ));
        let Modal::Login(form) = &modal else {
            unreachable!()
        };
        assert!(form.error.is_some());
    }

    #[test]
    fn login_submits_trimmed_username() {
        let mut modal = Modal::Login(LoginForm::default());
        type_text(&mut modal, "alice ");
        modal.handle_key(key(KeyCode::Tab));
        type_text(&mut modal, "pw");
        match modal.handle_key(key(KeyCode::Enter)) {
            ModalAction::Submit(ModalSubmit::Login { username, password }) => {
                assert_eq!(username, "alice");
                assert_eq!(password, "pw");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn compose_newline_in_body_does_not_submit() {
        let mut modal = Modal::Compose(ComposeForm::new_post());
        type_text(&mut modal, "Title");
        modal.handle_key(key(KeyCode::Tab));
        type_text(&mut modal, "line one");
        assert!(matches!(
            modal.handle_key(key(KeyCode::Enter)),
            ModalAction::Stay
        ));
        let Modal::Compose(form) = &modal else {
            unreachable!()
        };
        assert_eq!(form.content, "line one\n");
    }

    #[test]
    fn compose_submits_with_ctrl_s() {
        let mut modal = Modal::Compose(ComposeForm::new_post());
        type_text(&mut modal, "Title");
        modal.handle_key(key(KeyCode::Tab));
        type_text(&mut modal, "Body");
        let action = modal.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        match action {
            ModalAction::Submit(ModalSubmit::Compose { editing, draft }) => {
                assert!(editing.is_none());
                assert_eq!(draft.title, "Title");
                assert_eq!(draft.is_show, Some(true));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn submitting_form_ignores_input() {
        let mut modal = Modal::Login(LoginForm {
            submitting: true,
            ..LoginForm::default()
        });
        assert!(matches!(
            modal.handle_key(key(KeyCode::Esc)),
            ModalAction::Stay
        ));
    }
}
