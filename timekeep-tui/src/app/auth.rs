use timekeep::Route;

use super::state::{FormError, TextInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn title(self) -> &'static str {
        match self {
            AuthMode::Login => "Вход",
            AuthMode::Register => "Регистрация",
        }
    }

    pub fn route(self) -> Route {
        match self {
            AuthMode::Login => Route::Login,
            AuthMode::Register => Route::Register,
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            AuthMode::Login => "Ошибка при входе",
            AuthMode::Register => "Ошибка при регистрации",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            AuthMode::Login => "Вы вошли в систему",
            AuthMode::Register => "Регистрация выполнена успешно",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: TextInput,
    pub password: TextInput,
    pub focused: AuthField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            email: TextInput::new(),
            password: TextInput::new(),
            focused: AuthField::Email,
            error: None,
            submitting: false,
        }
    }

    /// Switch between login and register, keeping what was typed.
    pub fn switch_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.error = None;
    }

    pub fn next_field(&mut self) {
        self.focused = match self.focused {
            AuthField::Email => AuthField::Password,
            AuthField::Password => AuthField::Email,
        };
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focused {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    /// Credentials ready to send, or the first missing required field.
    pub fn credentials(&self) -> Result<(String, String), FormError> {
        if self.email.is_blank() {
            return Err(FormError::Required("Email"));
        }
        if self.password.value.is_empty() {
            return Err(FormError::Required("Пароль"));
        }
        Ok((
            self.email.trimmed().to_string(),
            self.password.value.clone(),
        ))
    }

    pub fn reset_password(&mut self) {
        self.password.clear();
        self.submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_are_checked_in_order() {
        let mut form = AuthForm::new(AuthMode::Login);
        assert_eq!(form.credentials(), Err(FormError::Required("Email")));

        form.email = TextInput::with_value("  me@example.com ");
        assert_eq!(form.credentials(), Err(FormError::Required("Пароль")));

        form.password = TextInput::with_value("secret");
        assert_eq!(
            form.credentials(),
            Ok(("me@example.com".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn switching_mode_keeps_input_and_clears_error() {
        let mut form = AuthForm::new(AuthMode::Login);
        form.email = TextInput::with_value("a@b.c");
        form.error = Some("boom".to_string());

        form.switch_mode();
        assert_eq!(form.mode, AuthMode::Register);
        assert_eq!(form.mode.route(), Route::Register);
        assert_eq!(form.email.value, "a@b.c");
        assert!(form.error.is_none());
    }
}
