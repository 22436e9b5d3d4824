//! Contact form: validation and the submit / sent cycle.
//!
//! ```text
//! Editing --submit(valid)--> Submitting --delay--> Sent --sent duration--> Editing
//!    ^
//!    +--submit(invalid): field errors returned, nothing else happens
//! ```
//!
//! There is no backend. A [`SubmissionSink`] receives accepted messages;
//! [`LogSink`] just logs them.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};
use thiserror::Error;

use crate::config::ContactConfig;
use crate::engine::{clear_timeout, set_timeout, TimerId};

// =============================================================================
// Validation
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: ContactField,
    pub message: &'static str,
}

/// Every failing field, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) invalid", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn get(&self, field: ContactField) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

const NAME_MIN: usize = 2;
const SUBJECT_MIN: usize = 3;
const MESSAGE_MIN: usize = 20;

pub fn validate(submission: &ContactSubmission) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if submission.name.chars().count() < NAME_MIN {
        errors.push(FieldError {
            field: ContactField::Name,
            message: "Name must be at least 2 characters",
        });
    }
    if !is_valid_email(&submission.email) {
        errors.push(FieldError {
            field: ContactField::Email,
            message: "Please enter a valid email address",
        });
    }
    if submission.subject.chars().count() < SUBJECT_MIN {
        errors.push(FieldError {
            field: ContactField::Subject,
            message: "Subject must be at least 3 characters",
        });
    }
    if submission.message.chars().count() < MESSAGE_MIN {
        errors.push(FieldError {
            field: ContactField::Message,
            message: "Message must be at least 20 characters",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}

/// `local@domain.tld` with a dotted domain and an alphabetic TLD.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c));
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));
    labels_ok && tld_ok
}

// =============================================================================
// Sink
// =============================================================================

/// Where accepted messages go.
pub trait SubmissionSink {
    fn send(&self, submission: &ContactSubmission);
}

/// Logs the payload and drops it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn send(&self, submission: &ContactSubmission) {
        match serde_json::to_string(submission) {
            Ok(json) => log::info!(target: "folio::contact", "form data: {json}"),
            Err(err) => log::warn!(target: "folio::contact", "cannot serialize submission: {err}"),
        }
    }
}

// =============================================================================
// Form
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Submitting,
    Sent,
}

/// What happened to a valid submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Accepted,
    /// A previous submission is still in flight or being confirmed.
    Busy,
}

struct FormInner {
    phase: Signal<FormPhase>,
    sink: Rc<dyn SubmissionSink>,
    submit_delay_ms: u64,
    sent_duration_ms: u64,
    timer: Cell<Option<TimerId>>,
}

pub struct ContactForm {
    inner: Rc<FormInner>,
}

impl ContactForm {
    pub fn new(sink: Rc<dyn SubmissionSink>, config: &ContactConfig) -> Self {
        Self {
            inner: Rc::new(FormInner {
                phase: signal(FormPhase::Editing),
                sink,
                submit_delay_ms: config.submit_delay_ms,
                sent_duration_ms: config.sent_duration_ms,
                timer: Cell::new(None),
            }),
        }
    }

    /// Current phase. Tracked when read inside an effect.
    pub fn phase(&self) -> FormPhase {
        self.inner.phase.get()
    }

    pub fn phase_signal(&self) -> Signal<FormPhase> {
        self.inner.phase.clone()
    }

    /// Validate and, if valid, send.
    ///
    /// Invalid input returns every field error and changes nothing.
    pub fn submit(&self, submission: ContactSubmission) -> Result<SubmitStatus, ValidationErrors> {
        validate(&submission)?;
        if self.inner.phase.get() != FormPhase::Editing {
            return Ok(SubmitStatus::Busy);
        }

        if self.inner.submit_delay_ms == 0 {
            deliver(&self.inner, &submission);
        } else {
            self.inner.phase.set(FormPhase::Submitting);
            let weak = Rc::downgrade(&self.inner);
            let id = set_timeout(self.inner.submit_delay_ms, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.timer.set(None);
                    deliver(&inner, &submission);
                }
            });
            self.inner.timer.set(Some(id));
        }
        Ok(SubmitStatus::Accepted)
    }

    /// Cancel any pending transition. The phase stays where it is.
    pub fn teardown(&self) {
        if let Some(id) = self.inner.timer.take() {
            clear_timeout(id);
        }
    }
}

impl Drop for ContactForm {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn deliver(inner: &Rc<FormInner>, submission: &ContactSubmission) {
    inner.sink.send(submission);
    inner.phase.set(FormPhase::Sent);

    let weak: Weak<FormInner> = Rc::downgrade(inner);
    let id = set_timeout(inner.sent_duration_ms, move || {
        if let Some(inner) = weak.upgrade() {
            inner.timer.set(None);
            inner.phase.set(FormPhase::Editing);
        }
    });
    inner.timer.set(Some(id));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{advance_time, pending_timer_count, reset_engine};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        sent: RefCell<Vec<ContactSubmission>>,
    }

    impl SubmissionSink for RecordingSink {
        fn send(&self, submission: &ContactSubmission) {
            self.sent.borrow_mut().push(submission.clone());
        }
    }

    fn valid() -> ContactSubmission {
        ContactSubmission {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Hello".into(),
            message: "I'd like to talk about a project.".into(),
        }
    }

    fn setup(submit_delay_ms: u64) -> (ContactForm, Rc<RecordingSink>) {
        reset_engine();
        let _ = env_logger::builder().is_test(true).try_init();
        let sink = Rc::new(RecordingSink::default());
        let config = ContactConfig {
            submit_delay_ms,
            ..ContactConfig::default()
        };
        (ContactForm::new(sink.clone(), &config), sink)
    }

    #[test]
    fn test_valid_submission_cycle() {
        let (form, sink) = setup(0);
        assert_eq!(form.submit(valid()), Ok(SubmitStatus::Accepted));
        assert_eq!(form.phase(), FormPhase::Sent);
        assert_eq!(sink.sent.borrow().len(), 1);

        advance_time(4999);
        assert_eq!(form.phase(), FormPhase::Sent);
        advance_time(1);
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn test_submit_delay() {
        let (form, sink) = setup(900);
        form.submit(valid()).unwrap();
        assert_eq!(form.phase(), FormPhase::Submitting);
        assert!(sink.sent.borrow().is_empty());
        assert_eq!(form.submit(valid()), Ok(SubmitStatus::Busy));

        advance_time(900);
        assert_eq!(form.phase(), FormPhase::Sent);
        assert_eq!(sink.sent.borrow().len(), 1);
        advance_time(5000);
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn test_invalid_submission_reports_every_field() {
        let (form, sink) = setup(0);
        let errors = form
            .submit(ContactSubmission {
                name: "A".into(),
                email: "not-an-email".into(),
                subject: "Hi".into(),
                message: "short".into(),
            })
            .unwrap_err();

        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.get(ContactField::Email).map(|e| e.message),
            Some("Please enter a valid email address")
        );
        assert_eq!(form.phase(), FormPhase::Editing);
        assert!(sink.sent.borrow().is_empty());
        assert_eq!(pending_timer_count(), 0);
    }

    #[test]
    fn test_boundaries() {
        let mut s = valid();
        s.name = "Al".into();
        s.subject = "Hey".into();
        s.message = "x".repeat(20);
        assert!(validate(&s).is_ok());

        s.message = "x".repeat(19);
        assert_eq!(validate(&s).unwrap_err().errors[0].field, ContactField::Message);
    }

    #[test]
    fn test_email_shapes() {
        for ok in ["a@b.co", "first.last+tag@mail.example.org", "x_y@sub-domain.io"] {
            assert!(is_valid_email(ok), "{ok}");
        }
        for bad in ["", "plain", "@example.com", "a@", "a@b", "a@b.c", "a b@c.com", "a..b@c.com", "a@-b.com", "a@b.c0m1"] {
            assert!(!is_valid_email(bad), "{bad}");
        }
    }

    #[test]
    fn test_teardown_cancels_reset_timer() {
        let (form, _) = setup(0);
        form.submit(valid()).unwrap();
        form.teardown();
        assert_eq!(pending_timer_count(), 0);
        advance_time(10_000);
        assert_eq!(form.phase(), FormPhase::Sent);
    }

    #[test]
    fn test_log_sink_does_not_panic() {
        let _ = env_logger::builder().is_test(true).try_init();
        LogSink.send(&valid());
    }
}
