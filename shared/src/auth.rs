use aws_sdk_cognitoidentityprovider::types::AuthFlowType;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use lambda_http::http::header::HeaderValue;
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated principal resolved from a Cognito access token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub email: String,
    pub display_name: String,
}

/// Cognito SECRET_HASH: HMAC-SHA256 over username + client id, keyed by the
/// app client secret, base64-encoded.
pub fn secret_hash(username: &str, client_id: &str, client_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Extract the token from an `Authorization: Bearer …` header.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Allow-list check. Entries are normalized to lowercase at parse time.
pub fn is_admin_email(admin_emails: &[String], email: &str) -> bool {
    let needle = email.to_lowercase();
    admin_emails.iter().any(|entry| entry == &needle)
}

fn status_response(status: StatusCode, message: &str) -> Response<Body> {
    let mut resp = Response::new(Body::from(
        serde_json::json!({"error": message}).to_string(),
    ));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert("Content-Type", HeaderValue::from_static("application/json"));
    resp.headers_mut().insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    resp
}

/// Resolve the principal behind an access token via Cognito `get_user`.
pub async fn resolve_principal(
    cognito_client: &CognitoClient,
    access_token: &str,
) -> Result<AuthContext, String> {
    let output = cognito_client
        .get_user()
        .access_token(access_token)
        .send()
        .await
        .map_err(|e| format!("Token rejected: {}", e))?;

    let mut email = String::new();
    let mut name = String::new();
    for attribute in output.user_attributes() {
        match attribute.name() {
            "email" => email = attribute.value().unwrap_or_default().to_string(),
            "name" => name = attribute.value().unwrap_or_default().to_string(),
            _ => {}
        }
    }

    if email.is_empty() {
        return Err("Account has no email attribute".to_string());
    }
    let display_name = if name.is_empty() {
        email.split('@').next().unwrap_or(&email).to_string()
    } else {
        name
    };

    Ok(AuthContext {
        email,
        display_name,
    })
}

/// Authenticate an admin request from its Authorization header.
///
/// Returns the resolved principal, or a ready-to-send 401/403 response.
pub async fn authenticate_admin_request(
    cognito_client: &CognitoClient,
    admin_emails: &[String],
    auth_header: Option<&str>,
) -> Result<AuthContext, Response<Body>> {
    let Some(token) = bearer_token(auth_header) else {
        return Err(status_response(
            StatusCode::UNAUTHORIZED,
            "Missing bearer token",
        ));
    };

    let auth_ctx = match resolve_principal(cognito_client, token).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::warn!("⚠️ Rejected access token: {}", e);
            return Err(status_response(
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token",
            ));
        }
    };

    if !is_admin_email(admin_emails, &auth_ctx.email) {
        tracing::warn!("⚠️ {} is not on the admin allow-list", auth_ctx.email);
        return Err(status_response(
            StatusCode::FORBIDDEN,
            "Not an admin account",
        ));
    }

    Ok(auth_ctx)
}

/// HTTP Handler: POST /auth/login
pub async fn login(
    cognito_client: &CognitoClient,
    client_id: &str,
    client_secret: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let body_str = match body {
        Body::Text(text) => text.as_str(),
        Body::Binary(bytes) => std::str::from_utf8(bytes).unwrap_or(""),
        Body::Empty => "",
    };

    let login_request: LoginRequest = match serde_json::from_str(body_str) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!("Failed to parse login request: {}", e);
            return Ok(status_response(
                StatusCode::BAD_REQUEST,
                "Invalid request body",
            ));
        }
    };

    if login_request.email.is_empty() || login_request.password.is_empty() {
        return Ok(status_response(
            StatusCode::BAD_REQUEST,
            "Email and password are required",
        ));
    }

    let hash = secret_hash(&login_request.email, client_id, client_secret);
    let result = cognito_client
        .initiate_auth()
        .auth_flow(AuthFlowType::UserPasswordAuth)
        .client_id(client_id)
        .auth_parameters("USERNAME", &login_request.email)
        .auth_parameters("PASSWORD", &login_request.password)
        .auth_parameters("SECRET_HASH", hash)
        .send()
        .await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("⚠️ Login failed for {}: {}", login_request.email, e);
            return Ok(status_response(
                StatusCode::UNAUTHORIZED,
                "Invalid email or password",
            ));
        }
    };

    let Some(tokens) = output.authentication_result() else {
        // MFA and password-change challenges are not part of this console.
        return Ok(status_response(
            StatusCode::UNAUTHORIZED,
            "Login challenge not supported",
        ));
    };

    let access_token = tokens.access_token().unwrap_or_default().to_string();
    let principal = match resolve_principal(cognito_client, &access_token).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Login token did not resolve to a user: {}", e);
            return Ok(status_response(
                StatusCode::UNAUTHORIZED,
                "Invalid email or password",
            ));
        }
    };

    tracing::info!("✅ Login succeeded for {}", principal.email);
    let payload = serde_json::json!({
        "accessToken": access_token,
        "idToken": tokens.id_token().unwrap_or_default(),
        "refreshToken": tokens.refresh_token().unwrap_or_default(),
        "expiresIn": tokens.expires_in(),
        "principal": principal,
    });

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(payload.to_string().into())
        .map_err(Box::new)?)
}
