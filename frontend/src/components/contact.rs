//! Contact form: validation, message composition and submission through the
//! mail relay.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use stylist::GlobalStyle;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlButtonElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement};

use crate::config::{self, selectors};
use crate::relay::{EmailMessage, HttpRelay, MailRelay, Mailbox, MessageHeaders, RelayError};
use crate::view::{self, safe_query, DomNode, EventListener, ViewNode};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("valid email regex"));

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+\d{1,3}\s?)?((\(\d{3}\)\s?)|(\d{3})(\s|-?))(\d{3}(\s|-?))(\d{4})(\s?(([Ee]xt[:.]?)|x|X)(\s?\d+))?")
        .expect("valid phone regex")
});

const ERROR_VISIBLE_MS: u32 = 8000;
const SUCCESS_VISIBLE_MS: u32 = 5000;
const FADE_MS: u32 = 300;
const SENDING_HTML: &str = "<span class=\"spinner\"></span> Sending...";
const SENT_MESSAGE: &str = "Message sent successfully! We'll get back to you soon.";

const SPINNER_CSS: &str = r#"
.spinner {
    display: inline-block;
    width: 16px;
    height: 16px;
    border: 2px solid rgba(255,255,255,.3);
    border-radius: 50%;
    border-top-color: #fff;
    animation: spin 1s ease-in-out infinite;
}
@keyframes spin {
    to { transform: rotate(360deg); }
}
button[disabled] {
    opacity: 0.7;
    cursor: not-allowed;
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FullName,
    Email,
    CompanyName,
    PhoneNumber,
    Message,
}

impl Field {
    fn selector(self) -> &'static str {
        match self {
            Field::FullName => "input[name=\"fullName\"]",
            Field::Email => "input[name=\"email\"]",
            Field::CompanyName => "input[name=\"companyName\"]",
            Field::PhoneNumber => "input[name=\"phoneNumber\"]",
            Field::Message => selectors::CONTACT_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Error,
    Success,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your full name")]
    MissingName,
    #[error("Please enter your email")]
    MissingEmail,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Please enter your message")]
    MissingMessage,
    #[error("Invalid phone number")]
    InvalidPhone,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Phone is optional; very short values are let through.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().count() < 4 || PHONE_RE.is_match(phone)
}

/// A validated submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRequest {
    pub full_name: String,
    pub email: String,
    pub message: String,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ContactRequest {
    pub fn from_fields(value: impl Fn(Field) -> String) -> Result<Self, ValidationError> {
        let full_name = non_empty(&value(Field::FullName)).ok_or(ValidationError::MissingName)?;
        let email = non_empty(&value(Field::Email)).ok_or(ValidationError::MissingEmail)?;
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail);
        }
        let message = non_empty(&value(Field::Message)).ok_or(ValidationError::MissingMessage)?;
        let phone_number = non_empty(&value(Field::PhoneNumber));
        if let Some(phone) = &phone_number {
            if !is_valid_phone(phone) {
                return Err(ValidationError::InvalidPhone);
            }
        }
        Ok(Self {
            full_name,
            email,
            message,
            company_name: non_empty(&value(Field::CompanyName)),
            phone_number,
        })
    }

    pub fn to_email(&self, submitted_at: &str) -> EmailMessage {
        EmailMessage {
            sender: Mailbox {
                email: config::contact::SENDER_EMAIL.to_string(),
                name: config::contact::SENDER_NAME.to_string(),
            },
            to: vec![Mailbox {
                email: config::contact::RECIPIENT_EMAIL.to_string(),
                name: config::contact::RECIPIENT_NAME.to_string(),
            }],
            subject: config::contact::SUBJECT.to_string(),
            html_content: self.html_body(submitted_at),
            text_content: self.text_body(submitted_at),
            reply_to: Mailbox { email: self.email.clone(), name: self.full_name.clone() },
            headers: MessageHeaders { mailer: config::contact::MAILER.to_string() },
        }
    }

    fn html_body(&self, submitted_at: &str) -> String {
        let mut html = format!(
            "<h2>New Contact Form Submission</h2>\n<p><strong>Name:</strong> {}</p>\n<p><strong>Email:</strong> {}</p>\n",
            escape_html(&self.full_name),
            escape_html(&self.email),
        );
        if let Some(company) = &self.company_name {
            html.push_str(&format!("<p><strong>Company:</strong> {}</p>\n", escape_html(company)));
        }
        if let Some(phone) = &self.phone_number {
            html.push_str(&format!("<p><strong>Phone:</strong> {}</p>\n", escape_html(phone)));
        }
        html.push_str(&format!(
            "<h3>Message:</h3>\n<p>{}</p>\n<hr>\n<p><small>Submitted on: {}</small></p>\n",
            escape_html(&self.message).replace('\n', "<br>"),
            escape_html(submitted_at),
        ));
        html
    }

    fn text_body(&self, submitted_at: &str) -> String {
        let mut text = format!("New contact form submission from {} ({}).\n", self.full_name, self.email);
        if let Some(company) = &self.company_name {
            text.push_str(&format!("Company: {}\n", company));
        }
        if let Some(phone) = &self.phone_number {
            text.push_str(&format!("Phone: {}\n", phone));
        }
        text.push_str(&format!("\nMessage: {}\n\nSubmitted on: {}", self.message, submitted_at));
        text
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// What the submission flow needs from the form on the page.
pub trait FormView {
    fn value(&self, field: Field) -> String;
    fn clear_notices(&self);
    fn notify(&self, notice: Notice, text: &str);
    fn set_busy(&self, busy: bool);
    fn reset(&self);

    /// False once the form has been torn down; late results are dropped.
    fn is_attached(&self) -> bool {
        true
    }
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Invalid(ValidationError),
    Sent,
    Failed(RelayError),
}

pub async fn submit<F, R>(form: &F, relay: &R, submitted_at: &str) -> Outcome
where
    F: FormView,
    R: MailRelay,
{
    form.clear_notices();
    let request = match ContactRequest::from_fields(|field| form.value(field)) {
        Ok(request) => request,
        Err(e) => {
            form.notify(Notice::Error, &e.to_string());
            return Outcome::Invalid(e);
        }
    };

    form.set_busy(true);
    let result = relay.send(&request.to_email(submitted_at)).await;
    if !form.is_attached() {
        debug!("contact: form torn down before the relay answered");
        return match result {
            Ok(()) => Outcome::Sent,
            Err(e) => Outcome::Failed(e),
        };
    }
    form.set_busy(false);

    match result {
        Ok(()) => {
            info!("Contact form sent");
            form.notify(Notice::Success, SENT_MESSAGE);
            form.reset();
            Outcome::Sent
        }
        Err(e) => {
            warn!("Contact form failed: {}", e);
            form.notify(Notice::Error, e.user_message());
            Outcome::Failed(e)
        }
    }
}

/// The `#contact` form on the page.
struct DomForm {
    form: DomNode,
    button: Option<DomNode>,
    button_html: RefCell<Option<String>>,
    busy: Cell<bool>,
    attached: Cell<bool>,
    timers: Rc<RefCell<Vec<Timeout>>>,
}

impl DomForm {
    fn detach(&self) {
        if self.busy.get() {
            self.set_busy(false);
        }
        self.attached.set(false);
        self.timers.borrow_mut().clear();
    }
}

impl FormView for DomForm {
    fn value(&self, field: Field) -> String {
        let Some(node) = self.form.find(field.selector()) else {
            return String::new();
        };
        if let Some(input) = node.element().dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = node.element().dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    fn clear_notices(&self) {
        if !self.is_attached() {
            return;
        }
        self.timers.borrow_mut().clear();
        for notice in self.form.find_all(".error-message, .success-message") {
            notice.element().remove();
        }
    }

    fn notify(&self, notice: Notice, text: &str) {
        if !self.is_attached() {
            return;
        }
        let Some(document) = view::document() else { return };
        let Ok(element) = document.create_element("div") else { return };
        let (class, icon, palette, visible_ms) = match notice {
            Notice::Error => (
                "error-message",
                "⚠️",
                "background-color: #fee; color: #c33; border: 1px solid #fcc;",
                ERROR_VISIBLE_MS,
            ),
            Notice::Success => (
                "success-message",
                "✅",
                "background-color: #efe; color: #393; border: 1px solid #cfc;",
                SUCCESS_VISIBLE_MS,
            ),
        };
        element.set_class_name(class);
        let _ = element.set_attribute(
            "style",
            &format!("margin: 15px 0; padding: 12px 20px; border-radius: 4px; font-weight: 500; {palette}"),
        );
        element.set_text_content(Some(&format!("{icon} {text}")));
        let form = self.form.element();
        if form.insert_before(&element, form.first_child().as_ref()).is_err() {
            warn!("contact: could not show notice");
            return;
        }

        let node = DomNode::new(element);
        let timers = Rc::downgrade(&self.timers);
        let timeout = Timeout::new(visible_ms, move || {
            node.set_style("opacity", "0");
            node.set_style("transition", "opacity 0.3s");
            if let Some(timers) = timers.upgrade() {
                let fade = Timeout::new(FADE_MS, move || node.element().remove());
                timers.borrow_mut().push(fade);
            }
        });
        self.timers.borrow_mut().push(timeout);
    }

    fn set_busy(&self, busy: bool) {
        if !self.is_attached() {
            return;
        }
        self.busy.set(busy);
        let Some(button) = self.button.as_ref() else { return };
        let Some(el) = button.element().dyn_ref::<HtmlButtonElement>() else { return };
        el.set_disabled(busy);
        if busy {
            self.button_html.replace(Some(el.inner_html()));
            el.set_inner_html(SENDING_HTML);
        } else if let Some(html) = self.button_html.take() {
            el.set_inner_html(&html);
        }
    }

    fn reset(&self) {
        if !self.is_attached() {
            return;
        }
        if let Some(form) = self.form.element().dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }
}

/// Submission handling for the contact form.
pub struct ContactForm {
    form: Rc<DomForm>,
    _listener: EventListener,
    style: Option<GlobalStyle>,
}

impl ContactForm {
    pub fn install() -> Option<Self> {
        let node = safe_query(selectors::CONTACT_FORM)?;
        let form = Rc::new(DomForm {
            button: node.find(selectors::CONTACT_SUBMIT),
            form: node,
            button_html: RefCell::new(None),
            busy: Cell::new(false),
            attached: Cell::new(true),
            timers: Rc::default(),
        });
        let style = GlobalStyle::new(SPINNER_CSS)
            .map_err(|e| warn!("contact: spinner style rejected: {}", e))
            .ok();

        let f = form.clone();
        let listener = EventListener::new(form.form.target(), "submit", move |event: Event| {
            event.prevent_default();
            if f.busy.get() {
                debug!("contact: submission already in flight");
                return;
            }
            let form = f.clone();
            spawn_local(async move {
                let submitted_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
                submit(&*form, &HttpRelay::default(), &submitted_at).await;
            });
        });
        debug!("contact form: installed");
        Some(Self { form, _listener: listener, style })
    }
}

impl Drop for ContactForm {
    fn drop(&mut self) {
        self.form.detach();
        if let Some(style) = &self.style {
            style.unregister();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeForm {
        fields: RefCell<HashMap<&'static str, String>>,
        notices: RefCell<Vec<(Notice, String)>>,
        busy_log: RefCell<Vec<bool>>,
        detached: Rc<Cell<bool>>,
    }

    fn key(field: Field) -> &'static str {
        match field {
            Field::FullName => "fullName",
            Field::Email => "email",
            Field::CompanyName => "companyName",
            Field::PhoneNumber => "phoneNumber",
            Field::Message => "message",
        }
    }

    impl FakeForm {
        fn filled(entries: &[(Field, &str)]) -> Self {
            let form = Self::default();
            for (field, value) in entries {
                form.fields.borrow_mut().insert(key(*field), value.to_string());
            }
            form
        }
    }

    impl FormView for FakeForm {
        fn value(&self, field: Field) -> String {
            self.fields.borrow().get(key(field)).cloned().unwrap_or_default()
        }
        fn clear_notices(&self) {
            self.notices.borrow_mut().clear();
        }
        fn notify(&self, notice: Notice, text: &str) {
            self.notices.borrow_mut().push((notice, text.to_string()));
        }
        fn set_busy(&self, busy: bool) {
            self.busy_log.borrow_mut().push(busy);
        }
        fn reset(&self) {
            self.fields.borrow_mut().clear();
        }
        fn is_attached(&self) -> bool {
            !self.detached.get()
        }
    }

    struct StubRelay {
        result: Result<(), RelayError>,
        sent: RefCell<Vec<EmailMessage>>,
        /// Set while the request is in flight, as a page teardown would.
        detach: Option<Rc<Cell<bool>>>,
    }

    impl StubRelay {
        fn answering(result: Result<(), RelayError>) -> Self {
            Self { result, sent: RefCell::new(Vec::new()), detach: None }
        }
    }

    impl MailRelay for StubRelay {
        async fn send(&self, message: &EmailMessage) -> Result<(), RelayError> {
            self.sent.borrow_mut().push(message.clone());
            if let Some(detached) = &self.detach {
                detached.set(true);
            }
            self.result.clone()
        }
    }

    fn well_formed() -> FakeForm {
        FakeForm::filled(&[
            (Field::FullName, "  Ada Lovelace "),
            (Field::Email, "ada@example.com"),
            (Field::Message, "Hello <team>\nSecond line"),
        ])
    }

    #[test]
    fn successful_submission_confirms_and_resets() {
        let form = well_formed();
        let relay = StubRelay::answering(Ok(()));

        let outcome = block_on(submit(&form, &relay, "2026-10-17 12:00:00"));

        assert_eq!(outcome, Outcome::Sent);
        assert_eq!(*form.notices.borrow(), vec![(Notice::Success, SENT_MESSAGE.to_string())]);
        assert!(form.fields.borrow().is_empty());
        assert_eq!(*form.busy_log.borrow(), vec![true, false]);

        let sent = relay.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].reply_to.name, "Ada Lovelace");
        assert!(sent[0].html_content.contains("Hello &lt;team&gt;<br>Second line"));
        assert!(sent[0].text_content.contains("Submitted on: 2026-10-17 12:00:00"));
    }

    #[test]
    fn relay_failure_reports_and_keeps_values() {
        let form = well_formed();
        let relay = StubRelay::answering(Err(RelayError::Rejected { status: 500, message: "down".into() }));

        let outcome = block_on(submit(&form, &relay, "now"));

        assert!(matches!(outcome, Outcome::Failed(RelayError::Rejected { status: 500, .. })));
        assert_eq!(
            *form.notices.borrow(),
            vec![(Notice::Error, "Failed to send message. Please try again.".to_string())]
        );
        assert_eq!(form.value(Field::Email), "ada@example.com");
        assert_eq!(*form.busy_log.borrow(), vec![true, false]);
    }

    #[test]
    fn answer_arriving_after_teardown_leaves_the_form_alone() {
        for result in [Ok(()), Err(RelayError::QuotaExceeded)] {
            let form = well_formed();
            let relay = StubRelay { detach: Some(form.detached.clone()), ..StubRelay::answering(result.clone()) };

            let outcome = block_on(submit(&form, &relay, "now"));

            assert_eq!(outcome == Outcome::Sent, result.is_ok());
            assert!(form.notices.borrow().is_empty());
            assert_eq!(*form.busy_log.borrow(), vec![true]);
            assert_eq!(form.value(Field::Email), "ada@example.com");
        }
    }

    #[test]
    fn quota_failure_uses_its_own_message() {
        let form = well_formed();
        let relay = StubRelay::answering(Err(RelayError::QuotaExceeded));
        block_on(submit(&form, &relay, "now"));
        assert_eq!(
            form.notices.borrow()[0],
            (Notice::Error, "Message quota exceeded. Please try again later.".to_string())
        );
    }

    #[test]
    fn invalid_form_never_reaches_the_relay() {
        let form = FakeForm::filled(&[(Field::FullName, "Ada"), (Field::Email, "not-an-email")]);
        let relay = StubRelay::answering(Ok(()));

        let outcome = block_on(submit(&form, &relay, "now"));

        assert_eq!(outcome, Outcome::Invalid(ValidationError::InvalidEmail));
        assert!(relay.sent.borrow().is_empty());
        assert!(form.busy_log.borrow().is_empty());
        assert_eq!(form.notices.borrow()[0].1, "Invalid email address");
    }

    #[test]
    fn validation_runs_in_field_order() {
        let check = |entries: &[(Field, &str)]| ContactRequest::from_fields(|f| FakeForm::filled(entries).value(f));

        assert_eq!(check(&[]), Err(ValidationError::MissingName));
        assert_eq!(check(&[(Field::FullName, "A")]), Err(ValidationError::MissingEmail));
        assert_eq!(
            check(&[(Field::FullName, "A"), (Field::Email, "a@b.co")]),
            Err(ValidationError::MissingMessage)
        );
        assert_eq!(
            check(&[
                (Field::FullName, "A"),
                (Field::Email, "a@b.co"),
                (Field::Message, "hi"),
                (Field::PhoneNumber, "12345"),
            ]),
            Err(ValidationError::InvalidPhone)
        );
    }

    #[test]
    fn optional_fields_are_carried_when_present() {
        let request = ContactRequest::from_fields(|f| {
            FakeForm::filled(&[
                (Field::FullName, "A"),
                (Field::Email, "a@b.co"),
                (Field::Message, "hi"),
                (Field::CompanyName, " Codefort "),
                (Field::PhoneNumber, "(555) 123-4567"),
            ])
            .value(f)
        })
        .unwrap();
        assert_eq!(request.company_name.as_deref(), Some("Codefort"));
        assert_eq!(request.phone_number.as_deref(), Some("(555) 123-4567"));

        let html = request.to_email("t").html_content;
        assert!(html.contains("<p><strong>Company:</strong> Codefort</p>"));
        assert!(html.contains("<p><strong>Phone:</strong> (555) 123-4567</p>"));
    }

    #[test]
    fn email_and_phone_formats() {
        assert!(is_valid_email("Someone.Else+tag@Mail.Example.ORG"));
        assert!(!is_valid_email("someone@localhost"));
        assert!(!is_valid_email("two@@example.com"));

        assert!(is_valid_phone("123"));
        assert!(is_valid_phone("+1 555-123-4567"));
        assert!(is_valid_phone("555 123 4567 ext. 89"));
        assert!(!is_valid_phone("phone"));
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(escape_html("<a href=\"x\">Tom & 'Jerry'</a>"), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
    }
}
