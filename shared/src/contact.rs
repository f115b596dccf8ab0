use aws_sdk_sesv2::Client as SesClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::{Deserialize, Serialize};

use crate::email::send_contact_email;

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

#[derive(Serialize)]
struct ContactResponse {
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Handle contact form submission
pub async fn handle_contact(
    ses_client: &SesClient,
    from_address: &str,
    to_address: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let body_str = match body {
        Body::Text(text) => text,
        Body::Binary(bytes) => std::str::from_utf8(bytes).unwrap_or(""),
        Body::Empty => "",
    };

    tracing::info!("Contact form submission received");

    let contact_request: ContactRequest = match serde_json::from_str(body_str) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!("Failed to parse contact request: {}", e);
            let error = ErrorResponse {
                error: "InvalidRequest".to_string(),
                message: format!("Invalid request body: {}", e),
            };
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::to_string(&error)?.into())
                .map_err(Box::new)?);
        }
    };

    // Basic validation
    if contact_request.name.trim().is_empty() {
        let error = ErrorResponse {
            error: "InvalidName".to_string(),
            message: "Please provide your name".to_string(),
        };
        return Ok(Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&error)?.into())
            .map_err(Box::new)?);
    }

    if contact_request.email.is_empty() || !contact_request.email.contains('@') {
        let error = ErrorResponse {
            error: "InvalidEmail".to_string(),
            message: "Please provide a valid email address".to_string(),
        };
        return Ok(Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&error)?.into())
            .map_err(Box::new)?);
    }

    if contact_request.message.trim().is_empty() {
        let error = ErrorResponse {
            error: "InvalidMessage".to_string(),
            message: "Please provide a message".to_string(),
        };
        return Ok(Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&error)?.into())
            .map_err(Box::new)?);
    }

    // Send email
    match send_contact_email(ses_client, from_address, to_address, &contact_request).await {
        Ok(_) => {
            tracing::info!(
                "Contact email sent successfully from: {}",
                contact_request.email
            );
            let response = ContactResponse {
                message: "Message sent successfully".to_string(),
            };
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::to_string(&response)?.into())
                .map_err(Box::new)?)
        }
        Err(e) => {
            tracing::error!("Failed to send contact email: {}", e);
            let error = ErrorResponse {
                error: "EmailFailed".to_string(),
                message: "Failed to send message. Please try again later.".to_string(),
            };
            Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::to_string(&error)?.into())
                .map_err(Box::new)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sesv2::config::BehaviorVersion;

    // Validation failures return before any SES call, so an unconfigured
    // client is enough here.
    fn ses_test_client() -> SesClient {
        let config = aws_sdk_sesv2::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        SesClient::from_conf(config)
    }

    async fn submit(body: &str) -> StatusCode {
        let body = Body::from(body.to_string());
        let resp = handle_contact(&ses_test_client(), "from@shop.store", "to@shop.store", &body)
            .await
            .unwrap();
        resp.status()
    }

    #[tokio::test]
    async fn rejects_unparseable_body() {
        assert_eq!(submit("not json").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_bad_email_shape() {
        let status =
            submit(r#"{"name":"A","email":"not-an-email","message":"hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_blank_name_and_message() {
        let status = submit(r#"{"name":"  ","email":"a@b.c","message":"hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let status = submit(r#"{"name":"A","email":"a@b.c","message":" "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
