//! HTML bodies for the two outbound messages.
//!
//! Inputs are sanitized submission fields, so they carry no markup of
//! their own; only newlines in the message are turned into `<br>`.

use chrono::{DateTime, Utc};

use crate::config::SignatureConfig;
use crate::contact::SanitizedSubmission;

pub fn notification_html(submission: &SanitizedSubmission, received_at: DateTime<Utc>) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333; border-bottom: 2px solid #007bff; padding-bottom: 10px;">New Contact Form Submission</h2>
  <div style="background-color: #f8f9fa; padding: 20px; border-radius: 5px; margin: 20px 0;">
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> {email}</p>
    <p><strong>Subject:</strong> {subject}</p>
  </div>
  <div style="background-color: #fff; padding: 20px; border: 1px solid #dee2e6; border-radius: 5px;">
    <h3 style="color: #495057;">Message:</h3>
    <p style="line-height: 1.6; color: #212529;">{message}</p>
  </div>
  <div style="margin-top: 20px; padding: 10px; background-color: #e9ecef; border-radius: 5px; font-size: 12px; color: #6c757d;">
    <p>This email was sent from your portfolio contact form.</p>
    <p>Time: {time}</p>
  </div>
</div>"#,
        name = submission.name(),
        email = submission.email(),
        subject = submission.subject(),
        message = line_breaks(submission.message()),
        time = received_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

pub fn acknowledgement_html(
    submission: &SanitizedSubmission,
    received_at: DateTime<Utc>,
    signature: &SignatureConfig,
) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #007bff;">Thank You for Your Message!</h2>
  <p>Hi {name},</p>
  <p>Thank you for reaching out through my portfolio contact form. I have received your message and will get back to you as soon as possible.</p>
  <div style="background-color: #f8f9fa; padding: 15px; border-radius: 5px; margin: 20px 0;">
    <h4>Your Message Summary:</h4>
    <p><strong>Subject:</strong> {subject}</p>
    <p><strong>Date:</strong> {date}</p>
  </div>
  <p>I typically respond within 24-48 hours. If your inquiry is urgent, please feel free to call me directly.</p>
  <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #dee2e6;">
    {signature}
  </div>
</div>"#,
        name = submission.name(),
        subject = submission.subject(),
        date = received_at.format("%Y-%m-%d"),
        signature = signature_html(signature),
    )
}

fn signature_html(signature: &SignatureConfig) -> String {
    let mut lines = vec![
        "Best regards,".to_string(),
        format!("<strong>{}</strong>", signature.name),
    ];
    for extra in [&signature.title, &signature.email, &signature.phone] {
        if !extra.is_empty() {
            lines.push(extra.clone());
        }
    }
    format!("<p>{}</p>", lines.join("<br>\n    "))
}

fn line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br>")
}
