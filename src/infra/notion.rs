use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::record::{RecordHandle, RecordPage, StoredRecord, SyncRecord};
use crate::error::{AppError, AppResult};
use crate::infra::http::{ensure_success, ignore_not_found, read_json, transport_error};
use crate::services::RecordStoreService;

const SERVICE: &str = "Notion";
const NOTION_VERSION: &str = "2022-06-28";
const COMMIT_ID_PROPERTY: &str = "Commit ID";
const MAX_TEXT_CHARS: usize = 2000;

pub struct NotionClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    database_id: String,
}

impl NotionClient {
    pub fn new(http: Client, base_url: String, token: Option<String>, database_id: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            database_id,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> AppResult<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| AppError::Auth("Notion token not configured".to_string()))?;
        Ok(request
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header("Notion-Version", NOTION_VERSION))
    }

    fn query_endpoint(&self) -> String {
        format!("{}/v1/databases/{}/query", self.base_url, self.database_id)
    }

    async fn query(&self, body: &QueryRequest<'_>) -> AppResult<QueryResponse> {
        let request = self.authorized(
            self.http
                .post(self.query_endpoint())
                .header(CONTENT_TYPE, "application/json")
                .json(body),
        )?;
        let response = request
            .send()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;
        let response = ensure_success(SERVICE, response).await?;
        read_json(SERVICE, response).await
    }
}

#[async_trait]
impl RecordStoreService for NotionClient {
    async fn find_by_commit_id(&self, commit_id: &str) -> AppResult<Vec<RecordHandle>> {
        let body = QueryRequest {
            filter: Some(QueryFilter {
                property: COMMIT_ID_PROPERTY,
                rich_text: TextCondition { equals: commit_id },
            }),
            start_cursor: None,
        };
        let response = self.query(&body).await?;
        Ok(response
            .results
            .into_iter()
            .map(|page| RecordHandle(page.id))
            .collect())
    }

    async fn create(&self, record: &SyncRecord) -> AppResult<()> {
        let body = CreatePageRequest::new(&self.database_id, record);
        let request = self.authorized(
            self.http
                .post(format!("{}/v1/pages", self.base_url))
                .header(CONTENT_TYPE, "application/json")
                .json(&body),
        )?;
        let response = request
            .send()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;
        ensure_success(SERVICE, response).await?;
        Ok(())
    }

    async fn delete(&self, handle: &RecordHandle) -> AppResult<()> {
        let url = format!("{}/v1/blocks/{}", self.base_url, handle.as_str());
        let request = self.authorized(self.http.delete(url))?;
        let response = request
            .send()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;
        let result = ensure_success(SERVICE, response).await;
        if let Err(AppError::NotFound(message)) = &result {
            debug!(record = handle.as_str(), %message, "record already gone");
        }
        ignore_not_found(result)
    }

    async fn list_page(&self, cursor: Option<&str>) -> AppResult<RecordPage> {
        let body = QueryRequest {
            filter: None,
            start_cursor: cursor,
        };
        Ok(self.query(&body).await?.into_page())
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<QueryFilter<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
}

#[derive(Serialize)]
struct QueryFilter<'a> {
    property: &'a str,
    rich_text: TextCondition<'a>,
}

#[derive(Serialize)]
struct TextCondition<'a> {
    equals: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<NotionPage>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

impl QueryResponse {
    fn into_page(self) -> RecordPage {
        let next_cursor = if self.has_more { self.next_cursor } else { None };
        RecordPage {
            records: self.results.into_iter().map(NotionPage::into_record).collect(),
            next_cursor,
        }
    }
}

#[derive(Deserialize)]
struct NotionPage {
    id: String,
    #[serde(default)]
    properties: PageProperties,
}

#[derive(Deserialize, Default)]
struct PageProperties {
    #[serde(rename = "Commit ID")]
    commit_id: Option<RichTextProperty>,
}

#[derive(Deserialize)]
struct RichTextProperty {
    #[serde(default)]
    rich_text: Vec<RichTextItem>,
}

#[derive(Deserialize)]
struct RichTextItem {
    #[serde(default)]
    plain_text: String,
}

impl NotionPage {
    fn into_record(self) -> StoredRecord {
        let commit_id = self
            .properties
            .commit_id
            .map(|property| {
                property
                    .rich_text
                    .into_iter()
                    .map(|item| item.plain_text)
                    .collect::<String>()
            })
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        StoredRecord {
            handle: RecordHandle(self.id),
            commit_id,
        }
    }
}

#[derive(Serialize)]
struct CreatePageRequest {
    parent: DatabaseParent,
    properties: CreatePageProperties,
}

#[derive(Serialize)]
struct DatabaseParent {
    database_id: String,
}

#[derive(Serialize)]
struct CreatePageProperties {
    #[serde(rename = "Commit ID")]
    commit_id: RichTextValue,
    #[serde(rename = "Name")]
    name: TitleValue,
    #[serde(rename = "Date")]
    date: DateValue,
    #[serde(rename = "Repository")]
    repository: RichTextValue,
    #[serde(rename = "Branch")]
    branch: RichTextValue,
}

impl CreatePageRequest {
    fn new(database_id: &str, record: &SyncRecord) -> Self {
        Self {
            parent: DatabaseParent {
                database_id: database_id.to_string(),
            },
            properties: CreatePageProperties {
                commit_id: RichTextValue::new(&record.commit_id),
                name: TitleValue {
                    title: vec![TextObject::new(&record.title)],
                },
                date: DateValue {
                    date: DateStart {
                        start: record.date.to_rfc3339(),
                    },
                },
                repository: RichTextValue::new(&record.repository),
                branch: RichTextValue::new(&record.branch),
            },
        }
    }
}

#[derive(Serialize)]
struct RichTextValue {
    rich_text: Vec<TextObject>,
}

impl RichTextValue {
    fn new(content: &str) -> Self {
        Self {
            rich_text: vec![TextObject::new(content)],
        }
    }
}

#[derive(Serialize)]
struct TitleValue {
    title: Vec<TextObject>,
}

#[derive(Serialize)]
struct TextObject {
    text: TextContent,
}

impl TextObject {
    fn new(content: &str) -> Self {
        Self {
            text: TextContent {
                content: truncate_chars(content, MAX_TEXT_CHARS),
            },
        }
    }
}

#[derive(Serialize)]
struct TextContent {
    content: String,
}

#[derive(Serialize)]
struct DateValue {
    date: DateStart,
}

#[derive(Serialize)]
struct DateStart {
    start: String,
}

fn truncate_chars(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((index, _)) => value[..index].to_string(),
        None => value.to_string(),
    }
}
