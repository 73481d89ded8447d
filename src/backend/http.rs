use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

use super::{GroupBackend, LeaderCandidate, MemberSummary};
use crate::board::AssignmentBatch;
use crate::error::BackendError;

/// REST client for the attendance backend
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let resp = self
            .authorize(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| BackendError::Transport { url: url.clone(), source })?;

        let resp = check_status(&url, resp).await?;
        resp.json::<T>()
            .await
            .map_err(|source| BackendError::Decode { url, source })
    }
}

/// Turns a non-2xx response into `BackendError::Status`, keeping the body for the message
async fn check_status(url: &str, resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl GroupBackend for HttpBackend {
    async fn fetch_village_members(&self, village_id: i64) -> Result<Vec<MemberSummary>, BackendError> {
        self.get_json(&format!("villages/{}/members", village_id)).await
    }

    async fn fetch_leader_candidates(&self, village_id: i64) -> Result<Vec<LeaderCandidate>, BackendError> {
        self.get_json(&format!("villages/{}/leader-candidates", village_id))
            .await
    }

    async fn submit_assignments(&self, batch: &AssignmentBatch) -> Result<(), BackendError> {
        let url = self.url(&format!("villages/{}/gbs-groups/assignments", batch.village_id));
        debug!("POST {} ({} assignments)", url, batch.assignments.len());

        let resp = self
            .authorize(self.client.post(&url))
            .json(batch)
            .send()
            .await
            .map_err(|source| BackendError::Transport { url: url.clone(), source })?;

        check_status(&url, resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let backend = HttpBackend::new("http://localhost:8000/api/", None);
        assert_eq!(
            backend.url("/villages/4/members"),
            "http://localhost:8000/api/villages/4/members"
        );
        assert_eq!(
            backend.url("villages/4/leader-candidates"),
            "http://localhost:8000/api/villages/4/leader-candidates"
        );
    }

    #[test]
    fn member_payload_tolerates_missing_birth_date() {
        let members: Vec<MemberSummary> =
            serde_json::from_str(r#"[{"memberId": 1, "name": "Kim"}, {"memberId": 2, "name": "Lee", "birthDate": "1999-04-02"}]"#)
                .unwrap();
        assert_eq!(members[0].birth_date, None);
        assert_eq!(members[1].birth_date.map(|d| d.to_string()), Some("1999-04-02".to_string()));
    }

    #[tokio::test]
    async fn unreachable_backend_reports_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP connections
        let backend = HttpBackend::new("http://127.0.0.1:9", None);
        let err = backend.fetch_village_members(1).await.unwrap_err();
        assert!(matches!(err, BackendError::Transport { .. }));
    }
}
