use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ensure_success, ApiClient};
use crate::error::AppResult;
use crate::events::Event;
use crate::roster::{EnrollmentRecord, EnrollmentRef};

/// One of the signed-in user's own enrollments, with the event it points at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MyEnrollment {
    pub id: i64,
    #[serde(default)]
    pub enrollment_time: Option<String>,
    #[serde(default)]
    pub event: Option<Event>,
}

impl ApiClient {
    /// Admin roster for one event.
    pub async fn enrollments_for_event(&self, event_id: i64) -> AppResult<Vec<EnrollmentRecord>> {
        self.get_json(&format!("api/enrollments/event/{}", event_id)).await
    }

    /// Admin removal of someone else's enrollment, addressed by (event, user).
    pub async fn remove_enrollment(&self, target: &EnrollmentRef) -> AppResult<()> {
        self.delete(&format!("api/enrollments/admin/{}/{}", target.event_id, target.user_id)).await
    }

    pub async fn enroll(&self, event_id: i64) -> AppResult<MyEnrollment> {
        let url = self.url(&format!("api/enrollments/{}", event_id))?;
        debug!(target: "eventdesk::api", "POST {}", url);
        let resp = self.http().post(url).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<MyEnrollment>().await?)
    }

    pub async fn unenroll(&self, event_id: i64) -> AppResult<()> {
        self.delete(&format!("api/enrollments/{}", event_id)).await
    }

    pub async fn my_enrollments(&self) -> AppResult<Vec<MyEnrollment>> {
        self.get_json("api/enrollments/my-enrollments").await
    }
}
