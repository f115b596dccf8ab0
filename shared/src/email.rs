use aws_sdk_sesv2::types::{Body as EmailBody, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;

use crate::contact::ContactRequest;

/// Send a contact inquiry to the store mailbox.
///
/// Reply-To is the submitter's address so the store can answer directly
/// from its inbox.
pub async fn send_contact_email(
    ses_client: &SesClient,
    from_address: &str,
    to_address: &str,
    inquiry: &ContactRequest,
) -> Result<(), String> {
    let subject_line = if inquiry.subject.trim().is_empty() {
        format!("New inquiry from {}", inquiry.name)
    } else {
        inquiry.subject.trim().to_string()
    };

    let mut lines = vec![
        format!("Name: {}", inquiry.name),
        format!("Email: {}", inquiry.email),
    ];
    if !inquiry.phone.trim().is_empty() {
        lines.push(format!("Phone: {}", inquiry.phone));
    }
    lines.push(String::new());
    lines.push(inquiry.message.clone());

    let subject = Content::builder()
        .data(subject_line)
        .charset("UTF-8")
        .build()
        .map_err(|e| format!("Email subject error: {}", e))?;
    let body_text = Content::builder()
        .data(lines.join("\n"))
        .charset("UTF-8")
        .build()
        .map_err(|e| format!("Email body error: {}", e))?;
    let message = Message::builder()
        .subject(subject)
        .body(EmailBody::builder().text(body_text).build())
        .build();

    ses_client
        .send_email()
        .from_email_address(from_address)
        .destination(Destination::builder().to_addresses(to_address).build())
        .reply_to_addresses(&inquiry.email)
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await
        .map_err(|e| format!("SES send failed: {}", e))?;

    Ok(())
}
