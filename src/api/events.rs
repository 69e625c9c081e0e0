use reqwest::multipart::{Form, Part};
use serde_json::json;
use tracing::debug;

use super::{ensure_success, ApiClient};
use crate::error::AppResult;
use crate::events::{Event, EventDraft};

impl ApiClient {
    pub async fn list_events(&self) -> AppResult<Vec<Event>> {
        self.get_json("api/events").await
    }

    pub async fn get_event(&self, id: i64) -> AppResult<Event> {
        self.get_json(&format!("api/events/{}", id)).await
    }

    /// Multipart POST, admin only. The draft is validated first; nothing is sent if it fails.
    pub async fn create_event(&self, draft: &EventDraft) -> AppResult<Event> {
        draft.validate()?;
        let mut form = Form::new()
            .text("title", draft.title.trim().to_string())
            .text("description", draft.description.clone())
            .text("descriptionMarkdown", draft.description_markdown.clone())
            .text("eventTime", draft.event_time_instant().unwrap_or_default())
            .text("capacity", draft.capacity.to_string());
        if let Some(img) = &draft.image {
            form = form.part("image", Part::bytes(img.bytes.clone()).file_name(img.file_name.clone()));
        }
        let url = self.url("api/events")?;
        debug!(target: "eventdesk::api", "POST {} title={}", url, draft.title);
        let resp = self.http().post(url).multipart(form).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<Event>().await?)
    }

    /// PUT with a JSON event body, admin only.
    pub async fn update_event(&self, id: i64, draft: &EventDraft) -> AppResult<Event> {
        draft.validate()?;
        let body = json!({
            "title": draft.title.trim(),
            "description": draft.description,
            "descriptionMarkdown": draft.description_markdown,
            "eventTime": draft.event_time.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            "capacity": draft.capacity,
        });
        let url = self.url(&format!("api/events/{}", id))?;
        debug!(target: "eventdesk::api", "PUT {}", url);
        let resp = self.http().put(url).json(&body).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<Event>().await?)
    }

    pub async fn delete_event(&self, id: i64) -> AppResult<()> {
        self.delete(&format!("api/events/{}", id)).await
    }
}
