use crate::core::contact::{SheetsError, SpreadsheetClient};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::json;

pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com";

/// Minimal Google Sheets v4 client. Only `values.append` is needed.
pub struct GoogleSheetsClient {
    client: Client,
    base_url: Url,
}

impl GoogleSheetsClient {
    pub fn new(timeout: std::time::Duration) -> Result<Self, SheetsError> {
        Self::with_base_url(SHEETS_API_URL, timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, SheetsError> {
        let base_url = Url::parse(base_url).map_err(|e| SheetsError::Api(e.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SheetsError::Api(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}:append`, with each part percent-encoded.
    fn append_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        let range_action = format!("{}:append", range);
        url.path_segments_mut()
            .map_err(|_| SheetsError::Api("Sheets base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range_action.as_str()]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

#[async_trait]
impl SpreadsheetClient for GoogleSheetsClient {
    async fn append_row(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        range: &str,
        values: &[String],
    ) -> Result<(), SheetsError> {
        let url = self.append_url(spreadsheet_id, range)?;

        tracing::debug!("Appending row to spreadsheet {}", spreadsheet_id);

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(&json!({
                "majorDimension": "ROWS",
                "values": [values],
            }))
            .send()
            .await
            .map_err(|e| SheetsError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api(format!(
                "Sheets append failed ({}): {}",
                status, text
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct ReceivedAppend {
        spreadsheet_id: String,
        range_action: String,
        query: HashMap<String, String>,
        authorization: Option<String>,
        body: serde_json::Value,
    }

    type Received = Arc<Mutex<Vec<ReceivedAppend>>>;

    async fn append_endpoint(
        State(received): State<Received>,
        Path((spreadsheet_id, range_action)): Path<(String, String)>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let denied = authorization.as_deref() != Some("Bearer good-token");

        received.lock().unwrap().push(ReceivedAppend {
            spreadsheet_id,
            range_action,
            query,
            authorization,
            body,
        });

        if denied {
            StatusCode::FORBIDDEN
        } else {
            StatusCode::OK
        }
    }

    async fn spawn_sheets_server() -> (String, Received) {
        let received: Received = Arc::default();
        let app = Router::new()
            .route(
                "/v4/spreadsheets/:spreadsheet_id/values/:range_action",
                post(append_endpoint),
            )
            .with_state(Arc::clone(&received));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), received)
    }

    fn row() -> Vec<String> {
        ["Ana", "a@b.com", "11999999999", "Acme", "100k-500k", "Olá", "2024-05-01T12:30:00+00:00"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn append_url_encodes_the_range() {
        let client = GoogleSheetsClient::new(std::time::Duration::from_secs(5)).unwrap();
        let url = client.append_url("sheet-1", "Página1!A:G").unwrap();

        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-1/values/P%C3%A1gina1!A:G:append\
             ?valueInputOption=RAW&insertDataOption=INSERT_ROWS"
        );
    }

    fn test_client(base_url: &str) -> GoogleSheetsClient {
        GoogleSheetsClient::with_base_url(base_url, std::time::Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn append_row_posts_values_with_bearer_token() {
        let (base_url, received) = spawn_sheets_server().await;
        let client = test_client(&base_url);

        client
            .append_row("good-token", "sheet-1", "Página1!A:G", &row())
            .await
            .unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let call = &received[0];
        assert_eq!(call.spreadsheet_id, "sheet-1");
        assert_eq!(call.range_action, "Página1!A:G:append");
        assert_eq!(call.query["valueInputOption"], "RAW");
        assert_eq!(call.authorization.as_deref(), Some("Bearer good-token"));
        assert_eq!(call.body["values"][0][0], "Ana");
        assert_eq!(call.body["values"][0][5], "Olá");
    }

    #[tokio::test]
    async fn rejected_append_is_an_api_error() {
        let (base_url, _) = spawn_sheets_server().await;
        let client = test_client(&base_url);

        let err = client
            .append_row("expired-token", "sheet-1", "Página1!A:G", &row())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn unreachable_api_is_an_api_error() {
        // Nothing listens on the discard port.
        let client = GoogleSheetsClient::with_base_url(
            "http://127.0.0.1:9",
            std::time::Duration::from_secs(2),
        )
        .unwrap();

        let result = client
            .append_row("good-token", "sheet-1", "Página1!A:G", &row())
            .await;
        assert!(matches!(result, Err(SheetsError::Api(_))));
    }
}
