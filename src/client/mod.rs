//! Typed HTTP client for the simscan API.
//!
//! One shared client replaces the per-view ad-hoc requests of earlier
//! front ends: every protected call attaches the bearer header from the
//! injected [`SessionManager`], speaks the `{data}`/`{detail}` envelope, and
//! normalizes failures into [`ClientError`]. A 401 from any protected
//! endpoint drops the session, in memory and on disk.

pub mod envelope;
pub mod models;

use std::path::Path;
use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::identity::{AuthState, SessionManager, UserProfile};

use envelope::{decode, decode_or_default, status_error, unwrap_data};
use models::{
    AdminStats, AiCheckResult, BatchSummary, CreditBalance, DashboardMetrics, PlagiarismOutcome,
    PlagiarismReport, ReportFormat, SimilarityRow, UploadReceipt,
};

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(base: &str, session: Arc<SessionManager>) -> ClientResult<Self> {
        let base = Url::parse(base).map_err(|e| ClientError::input(format!("invalid base URL: {}", e)))?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self { base, http, session })
    }

    pub fn base(&self) -> &Url { &self.base }

    pub fn session(&self) -> &SessionManager { &self.session }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ClientError::input(format!("invalid endpoint path {}: {}", path, e)))
    }

    fn bearer(&self) -> ClientResult<String> {
        self.session
            .auth_header()
            .ok_or_else(|| ClientError::input("not signed in"))
    }

    /// Read a response as the `{data}`/`{detail}` envelope: non-2xx maps to
    /// the uniform status error, success yields the unwrapped payload.
    async fn read_envelope(resp: reqwest::Response) -> ClientResult<Value> {
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        unwrap_data(body)
    }

    /// Session policy applied to every protected outcome: a 401 means the
    /// server no longer honors the token, so the session is dropped.
    fn check<T>(&self, out: ClientResult<T>) -> ClientResult<T> {
        if let Err(err) = &out {
            if err.is_unauthorized() {
                warn!("server rejected the bearer token; dropping session");
                self.session.note_unauthorized();
            }
        }
        out
    }

    async fn authed_get(&self, path: &str) -> ClientResult<Value> {
        let url = self.url(path)?;
        let resp = self.http.get(url).header(AUTHORIZATION, self.bearer()?).send().await?;
        self.check(Self::read_envelope(resp).await)
    }

    async fn authed_post_json(&self, path: &str, body: &Value) -> ClientResult<Value> {
        let url = self.url(path)?;
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer()?)
            .json(body)
            .send()
            .await?;
        self.check(Self::read_envelope(resp).await)
    }

    // ---- unauthenticated endpoints ----

    /// POST `/auth/jwt/login` with the form-encoded credential pair. This is
    /// the one endpoint outside the data envelope: success is a bare
    /// `{ "access_token": ... }` object.
    pub async fn login_token(&self, email: &str, password: &str) -> ClientResult<String> {
        let url = self.url("/api/v1/auth/jwt/login")?;
        let form = [("username", email), ("password", password)];
        let resp = self.http.post(url).form(&form).send().await?;
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        match body.get("access_token").and_then(|t| t.as_str()) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(ClientError::payload("login response carried no access_token")),
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> ClientResult<()> {
        self.post_plain("/api/v1/auth/register", &json!({"email": email, "password": password}))
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> ClientResult<()> {
        self.post_plain("/api/v1/auth/forgot-password", &json!({"email": email}))
            .await
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> ClientResult<()> {
        self.post_plain(
            "/api/v1/auth/reset-password",
            &json!({"token": token, "password": password}),
        )
        .await
    }

    /// Success/failure-only endpoints: no payload to unwrap, `detail` on error.
    async fn post_plain(&self, path: &str, body: &Value) -> ClientResult<()> {
        let url = self.url(path)?;
        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            return Err(status_error(status.as_u16(), &body));
        }
        Ok(())
    }

    pub async fn health(&self) -> ClientResult<()> {
        let url = self.url("/health")?;
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &Value::Null));
        }
        Ok(())
    }

    // ---- session flows ----

    /// Persist a token and enter the pending state. Any non-empty string is
    /// accepted; validity is the server's call during verification.
    pub fn attach_token(&self, token: &str) -> ClientResult<u64> {
        if token.trim().is_empty() {
            return Err(ClientError::input("token must be a non-empty string"));
        }
        Ok(self.session.begin_session(token))
    }

    /// Verify the session of `epoch` by fetching the current user.
    ///
    /// A 401 rejects the token and surfaces the error; any other failure is
    /// logged and swallowed (the profile is enrichment, not a gate) leaving
    /// the session pending. An outcome whose epoch went stale while the
    /// fetch was in flight is discarded and reported as `None`.
    pub async fn verify(&self, epoch: u64) -> ClientResult<Option<UserProfile>> {
        let user = match self.current_user().await {
            Ok(user) => user,
            Err(err) if err.is_unauthorized() => {
                self.session.reject(epoch);
                return Err(err);
            }
            Err(err) => {
                debug!("profile fetch failed, session stays pending: {}", err);
                return Ok(None);
            }
        };
        if self.session.apply_profile(epoch, user.clone()) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Detached verification for callers that must not block on the profile
    /// fetch. The epoch guard makes a late or orphaned outcome harmless.
    pub fn spawn_verify(&self, epoch: u64) -> tokio::task::JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            let _ = client.verify(epoch).await;
        })
    }

    /// Exchange credentials for a token, persist it, and verify.
    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Option<UserProfile>> {
        let token = self.login_token(email, password).await?;
        let epoch = self.attach_token(&token)?;
        self.verify(epoch).await
    }

    /// Rebuild the session from the persisted token and verify it. Returns
    /// the state the session settled in; verification failures are swallowed
    /// here exactly as in [`ApiClient::verify`].
    pub async fn rehydrate(&self) -> ClientResult<AuthState> {
        if let Some(epoch) = self.session.rehydrate() {
            let _ = self.verify(epoch).await;
        }
        Ok(self.session.snapshot().state)
    }

    pub fn sign_out(&self) {
        self.session.logout();
    }

    // ---- protected endpoints ----

    pub async fn current_user(&self) -> ClientResult<UserProfile> {
        decode(self.authed_get("/api/v1/users/me").await?)
    }

    pub async fn dashboard(&self) -> ClientResult<DashboardMetrics> {
        Ok(decode_or_default(self.authed_get("/api/v1/users/me/dashboard").await?))
    }

    pub async fn credits(&self) -> ClientResult<i64> {
        let data = self.authed_get("/api/v1/users/me/credits").await?;
        Ok(decode_or_default::<CreditBalance>(data).credits)
    }

    pub async fn ai_check(&self, text: &str) -> ClientResult<AiCheckResult> {
        if text.trim().is_empty() {
            return Err(ClientError::input("nothing to analyze"));
        }
        decode(self.authed_post_json("/api/v1/ai-check", &json!({"text": text})).await?)
    }

    pub async fn batch(&self, batch_id: &str) -> ClientResult<BatchSummary> {
        let id = valid_batch_id(batch_id)?;
        decode(self.authed_get(&format!("/api/v1/batch/{}", id)).await?)
    }

    pub async fn batch_results(&self, batch_id: &str) -> ClientResult<Vec<SimilarityRow>> {
        let id = valid_batch_id(batch_id)?;
        decode(self.authed_get(&format!("/api/v1/batch/{}/results", id)).await?)
    }

    pub async fn admin_stats(&self) -> ClientResult<AdminStats> {
        decode(self.authed_get("/api/v1/admin/stats").await?)
    }

    /// Upload documents for analysis; the batch is processed asynchronously
    /// server-side and polled via [`ApiClient::batch`].
    pub async fn upload_documents(&self, paths: &[std::path::PathBuf], analysis_type: &str) -> ClientResult<String> {
        if paths.is_empty() {
            return Err(ClientError::input("no files to upload"));
        }
        let mut form = reqwest::multipart::Form::new();
        for path in paths {
            form = form.part("files", file_part(path).await?);
        }
        let url = self.url("/api/v1/documents/upload")?;
        let resp = self
            .http
            .post(url)
            .query(&[("analysis_type", analysis_type)])
            .header(AUTHORIZATION, self.bearer()?)
            .multipart(form)
            .send()
            .await?;
        let data = self.check(Self::read_envelope(resp).await)?;
        let receipt: UploadReceipt = decode(data)?;
        if receipt.batch_id.is_empty() {
            return Err(ClientError::payload("upload response carried no batch_id"));
        }
        Ok(receipt.batch_id)
    }

    /// One-shot plagiarism scan of a single file. The server reports the
    /// remaining credit balance next to (not inside) the data envelope.
    pub async fn check_plagiarism(&self, path: &Path) -> ClientResult<PlagiarismOutcome> {
        let form = reqwest::multipart::Form::new().part("file", file_part(path).await?);
        let url = self.url("/api/v1/check-plagiarism")?;
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer()?)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let mut body: Value = resp.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return self.check(Err(status_error(status.as_u16(), &body)));
        }
        let remaining_credits = body.get("remaining_credits").and_then(|v| v.as_i64());
        let data = match body.get_mut("data") {
            Some(d) => d.take(),
            None => return Err(ClientError::payload("response envelope has no data field")),
        };
        let report: PlagiarismReport = decode(data)?;
        Ok(PlagiarismOutcome { report, remaining_credits })
    }

    /// Download a batch report and write it to `out`. Returns bytes written.
    pub async fn export_report(&self, batch_id: &str, format: ReportFormat, out: &Path) -> ClientResult<u64> {
        let id = valid_batch_id(batch_id)?;
        let url = self.url(&format!("/api/v1/batches/{}/export/{}", id, format.as_str()))?;
        let resp = self.http.get(url).header(AUTHORIZATION, self.bearer()?).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            return self.check(Err(status_error(status.as_u16(), &body)));
        }
        let bytes = resp.bytes().await?;
        if let Some(dir) = out.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(out, &bytes)?;
        Ok(bytes.len() as u64)
    }
}

fn valid_batch_id(id: &str) -> ClientResult<&str> {
    Uuid::parse_str(id).map_err(|_| ClientError::input(format!("malformed batch id: {}", id)))?;
    Ok(id)
}

async fn file_part(path: &Path) -> ClientResult<reqwest::multipart::Part> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| ClientError::input(format!("not a file path: {}", path.display())))?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ClientError::input(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(reqwest::multipart::Part::bytes(bytes).file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_id_must_be_a_uuid() {
        assert!(valid_batch_id("1f0b6c9e-8f44-4e7b-9d31-2a4a8d5d9f10").is_ok());
        assert!(valid_batch_id("../../etc/passwd").is_err());
        assert!(valid_batch_id("42").is_err());
    }
}
