use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sesv2::Client as SesClient;
use std::env;

use shopfront_atoms::drafts::DraftStore;

/// Shared state built once at cold start and reused across invocations.
///
/// AWS clients are cheap to clone but expensive to build, so they live here.
/// The draft store also lives here: sessions survive between requests on a
/// warm runtime, which is what makes the compress-once editing flow work.
pub struct AppState {
    pub dynamo_client: DynamoClient,
    pub s3_client: S3Client,
    pub ses_client: SesClient,
    pub cognito_client: CognitoClient,
    pub table_name: String,
    pub media_bucket: String,
    pub cognito_client_id: String,
    pub cognito_client_secret: String,
    pub admin_emails: Vec<String>,
    pub contact_email: String,
    pub contact_from_email: String,
    pub drafts: DraftStore,
}

impl AppState {
    pub async fn from_env() -> Self {
        let aws_config = aws_config::load_from_env().await;

        Self {
            dynamo_client: DynamoClient::new(&aws_config),
            s3_client: S3Client::new(&aws_config),
            ses_client: SesClient::new(&aws_config),
            cognito_client: CognitoClient::new(&aws_config),
            table_name: env::var("TABLE_NAME").unwrap_or_else(|_| "shopfront".to_string()),
            media_bucket: env::var("MEDIA_BUCKET_NAME")
                .unwrap_or_else(|_| "shopfront-media-uploads".to_string()),
            cognito_client_id: env::var("COGNITO_CLIENT_ID")
                .expect("COGNITO_CLIENT_ID must be set"),
            cognito_client_secret: env::var("COGNITO_CLIENT_SECRET")
                .expect("COGNITO_CLIENT_SECRET must be set"),
            admin_emails: parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default()),
            contact_email: env::var("CONTACT_EMAIL")
                .unwrap_or_else(|_| "hello@shopfront.store".to_string()),
            contact_from_email: env::var("CONTACT_FROM_EMAIL")
                .unwrap_or_else(|_| "no-reply@shopfront.store".to_string()),
            drafts: DraftStore::new(),
        }
    }
}

/// Comma-separated allow-list, normalized to lowercase.
pub fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_admin_emails_with_whitespace_and_case() {
        let parsed = parse_admin_emails(" Owner@Shop.store , ops@shop.store ,, ");
        assert_eq!(parsed, vec!["owner@shop.store", "ops@shop.store"]);
    }

    #[test]
    fn empty_allow_list_parses_to_nothing() {
        assert!(parse_admin_emails("").is_empty());
    }
}
