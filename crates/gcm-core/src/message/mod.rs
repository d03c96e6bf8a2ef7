//! Outbound push messages.
//!
//! A [`Message`] targets either many recipients through the JSON form
//! ([`MessageKind::Multicast`]) or exactly one through the URL-encoded
//! plain-text form ([`MessageKind::Unicast`]). Messages are immutable once
//! built; [`Message::narrow`] produces the follow-up copy used for retries.

mod encode;
pub mod options;
mod state;

use serde_json::{Map, Value};

use crate::error::GcmError;

pub use encode::{WireBody, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON};
pub use options::Options;

/// Upper bound on recipients in one multicast request.
pub const MAX_MULTICAST_RECIPIENTS: usize = 1000;

/// Which wire form a message uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// JSON body, `registration_ids` array, up to 1000 recipients.
    Multicast,
    /// Form-encoded body, single `registration_id`.
    Unicast,
}

/// Visible notification block (JSON form only).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl Notification {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    kind: MessageKind,
    recipients: Vec<String>,
    data: Option<Map<String, Value>>,
    notification: Option<Notification>,
    options: Options,
}

impl Message {
    /// Build a message of the given kind, validating recipient arity.
    pub fn new(
        kind: MessageKind,
        recipients: Vec<String>,
        data: Option<Map<String, Value>>,
        options: Options,
    ) -> Result<Self, GcmError> {
        check_recipients(kind, &recipients)?;
        let data = data.filter(|d| !d.is_empty());
        if kind == MessageKind::Unicast {
            if let Some(d) = &data {
                check_scalar_data(d)?;
            }
        }
        Ok(Message {
            kind,
            recipients,
            data,
            notification: None,
            options: options.normalized(),
        })
    }

    /// JSON multicast message.
    pub fn multicast<I, S>(
        recipients: I,
        data: Option<Map<String, Value>>,
        options: Options,
    ) -> Result<Self, GcmError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let recipients = recipients.into_iter().map(Into::into).collect();
        Self::new(MessageKind::Multicast, recipients, data, options)
    }

    /// Plain-text unicast message.
    pub fn unicast(
        recipient: impl Into<String>,
        data: Option<Map<String, Value>>,
        options: Options,
    ) -> Result<Self, GcmError> {
        Self::new(MessageKind::Unicast, vec![recipient.into()], data, options)
    }

    /// Attach a notification block. Only the JSON form can carry one.
    pub fn with_notification(mut self, notification: Notification) -> Result<Self, GcmError> {
        if self.kind == MessageKind::Unicast {
            return Err(GcmError::validation(
                "plain-text messages cannot carry a notification",
            ));
        }
        self.notification = Some(notification).filter(|n| !n.is_empty());
        Ok(self)
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Target recipients, in send order.
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Same payload and options, new recipient list.
    ///
    /// Fails when the subset is empty, or for the unicast form when it does
    /// not hold exactly one recipient.
    pub fn narrow(&self, recipients: Vec<String>) -> Result<Self, GcmError> {
        check_recipients(self.kind, &recipients)?;
        Ok(Message {
            recipients,
            ..self.clone()
        })
    }
}

fn check_recipients(kind: MessageKind, recipients: &[String]) -> Result<(), GcmError> {
    if recipients.is_empty() {
        return Err(GcmError::validation("empty recipient list"));
    }
    match kind {
        MessageKind::Multicast if recipients.len() > MAX_MULTICAST_RECIPIENTS => {
            Err(GcmError::validation(format!(
                "multicast supports at most {} recipients, got {}",
                MAX_MULTICAST_RECIPIENTS,
                recipients.len()
            )))
        }
        MessageKind::Unicast if recipients.len() != 1 => Err(GcmError::validation(format!(
            "plain-text messages are unicast, got {} recipients",
            recipients.len()
        ))),
        MessageKind::Unicast if recipients[0].is_empty() => {
            Err(GcmError::validation("registration_id is required"))
        }
        _ => Ok(()),
    }
}

/// The form encoding has no representation for nested values.
fn check_scalar_data(data: &Map<String, Value>) -> Result<(), GcmError> {
    for (key, value) in data {
        if value.is_array() || value.is_object() {
            return Err(GcmError::validation(format!(
                "plain-text payload value for {key:?} must be a scalar"
            )));
        }
    }
    Ok(())
}
