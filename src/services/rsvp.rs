//! RSVP notification decisions and the emails they produce.

use chrono::{DateTime, Utc};

use crate::db::{Event, Guest, RsvpStatus};
use crate::services::hooks::RsvpNotice;
use crate::services::mailer::EmailMessage;

/// Whether an RSVP change warrants a confirmation email.
///
/// Only an actual status change to a guest with a usable email address counts.
pub fn should_notify_rsvp_change(old: RsvpStatus, new: RsvpStatus, has_email: bool) -> bool {
    old != new && has_email
}

/// Build the notice for a committed guest update, if one should be sent.
pub fn notice_for_update(previous: RsvpStatus, updated: &Guest, event: &Event) -> Option<RsvpNotice> {
    let email = updated.deliverable_email();
    if !should_notify_rsvp_change(previous, updated.rsvp_status, email.is_some()) {
        return None;
    }

    Some(RsvpNotice {
        guest_id: updated.id.clone(),
        guest_name: updated.name.clone(),
        email: email?.to_string(),
        previous,
        current: updated.rsvp_status,
        event_title: event.title.clone(),
        event_start: event.window.start(),
    })
}

fn display_date(at: DateTime<Utc>) -> String {
    at.format("%A, %B %-d, %Y %H:%M UTC").to_string()
}

pub fn rsvp_email(notice: &RsvpNotice) -> EmailMessage {
    let (subject, message) = match notice.current {
        RsvpStatus::Confirmed => (
            format!("RSVP Confirmed: {}", notice.event_title),
            "Thank you for confirming your attendance! We're excited to have you join us.",
        ),
        RsvpStatus::Declined => (
            format!("RSVP Update: {}", notice.event_title),
            "We're sorry you won't be able to join us, but thank you for letting us know.",
        ),
        RsvpStatus::Pending => (
            format!("RSVP Pending: {}", notice.event_title),
            "Your RSVP status is currently pending. Please confirm your attendance.",
        ),
    };

    let text = format!(
        "Dear {},\n\n{}\n\nEvent: {}\nDate: {}\n\nYour RSVP Status: {}\n\nBest regards,\nEvent Management Team",
        notice.guest_name,
        message,
        notice.event_title,
        display_date(notice.event_start),
        notice.current.as_str().to_uppercase(),
    );

    EmailMessage {
        to: notice.email.clone(),
        subject,
        text,
    }
}

/// Invitation email for one guest. A custom subject or message replaces the default.
pub fn invitation_email(
    guest: &Guest,
    email: &str,
    event: &Event,
    custom_subject: Option<&str>,
    custom_message: Option<&str>,
) -> EmailMessage {
    let subject = custom_subject
        .map(str::to_string)
        .unwrap_or_else(|| format!("Invitation: {}", event.title));

    let text = match custom_message {
        Some(message) => message.to_string(),
        None => {
            let mut text = format!(
                "Dear {},\n\nYou are cordially invited to attend:\n\nEvent: {}\nType: {}\nDate: {}\n",
                guest.name,
                event.title,
                event.event_type,
                display_date(event.window.start()),
            );
            if let Some(ref description) = event.description {
                text.push_str(&format!("Description: {}\n", description));
            }
            text.push_str(
                "\nWe look forward to celebrating with you!\n\n\
                 Please RSVP at your earliest convenience.\n\n\
                 Best regards,\nEvent Management Team",
            );
            text
        }
    };

    EmailMessage {
        to: email.to_string(),
        subject,
        text,
    }
}
