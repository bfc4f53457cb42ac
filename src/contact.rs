use crate::{notify::Notification, timers::Timers};
use std::{cell::Cell, fmt, rc::Rc};

pub const CONTACT_FORM_ID: &str = "contactForm";
pub const SUBMIT_DELAY_MS: u32 = 2_000;

pub const MISSING_FIELD_MESSAGE: &str = "Please fill in all fields.";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const SENT_MESSAGE: &str = "Message sent! I'll get back to you soon.";
pub const SENDING_LABEL: &str = "Sending...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl ContactField {
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Subject, Self::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("required field '{0}' is empty")]
    MissingField(ContactField),

    #[error("email address is not shaped like local@domain.tld")]
    InvalidEmailShape,
}

impl ContactError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingField(_) => MISSING_FIELD_MESSAGE,
            Self::InvalidEmailShape => INVALID_EMAIL_MESSAGE,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Subject => &self.subject,
            ContactField::Message => &self.message,
        }
    }

    pub fn validate(&self) -> Result<(), ContactError> {
        if let Some(field) = ContactField::ALL
            .into_iter()
            .find(|field| self.field(*field).is_empty())
        {
            return Err(ContactError::MissingField(field));
        }

        if !is_valid_email(&self.email) {
            return Err(ContactError::InvalidEmailShape);
        }

        Ok(())
    }
}

/// Matches `^[^\s@]+@[^\s@]+\.[^\s@]+$` with the ECMAScript `\s` class.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || email.chars().any(is_ecmascript_whitespace) {
        return false;
    }

    domain
        .char_indices()
        .filter(|(_, character)| *character == '.')
        .any(|(index, _)| index > 0 && index + 1 < domain.len())
}

fn is_ecmascript_whitespace(character: char) -> bool {
    matches!(
        character,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

pub trait ContactSurface {
    fn set_submit_busy(&self, busy: bool);
    fn reset_form(&self);
    fn notify(&self, notification: Notification);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sending,
    AlreadySending,
}

pub struct ContactController<T: Timers + ?Sized> {
    timers: Rc<T>,
    sending: Rc<Cell<bool>>,
}

impl<T: Timers + ?Sized + 'static> ContactController<T> {
    pub fn new(timers: Rc<T>) -> Self {
        Self {
            timers,
            sending: Rc::new(Cell::new(false)),
        }
    }

    pub fn is_sending(&self) -> bool {
        self.sending.get()
    }

    pub fn submit<S>(
        &self,
        form: &ContactForm,
        surface: Rc<S>,
    ) -> Result<SubmitOutcome, ContactError>
    where
        S: ContactSurface + ?Sized + 'static,
    {
        if self.sending.get() {
            return Ok(SubmitOutcome::AlreadySending);
        }

        if let Err(error) = form.validate() {
            surface.notify(Notification::error(error.user_message()));
            return Err(error);
        }

        self.sending.set(true);
        surface.set_submit_busy(true);

        let sending = self.sending.clone();
        let finish = {
            let surface = surface.clone();
            move || {
                surface.notify(Notification::success(SENT_MESSAGE));
                surface.reset_form();
                surface.set_submit_busy(false);
                sending.set(false);
            }
        };

        if self
            .timers
            .set_timeout(SUBMIT_DELAY_MS, Box::new(finish))
            .is_none()
        {
            surface.set_submit_busy(false);
            self.sending.set(false);
        }

        Ok(SubmitOutcome::Sending)
    }
}
