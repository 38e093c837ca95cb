use super::apply;
use crate::collection::Record;
use crate::identity::{ContentKey, Identity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One step of a generated topic explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStep {
    /// Step id.
    pub id: String,
    /// Step title.
    pub title: String,
    /// Step body.
    pub content: String,
    /// Worked examples.
    #[serde(default)]
    pub examples: Vec<String>,
    /// Study tips.
    #[serde(default)]
    pub tips: Vec<String>,
    /// `easy`, `medium` or `hard`.
    #[serde(default)]
    pub difficulty: String,
    /// Estimated time in minutes.
    #[serde(default)]
    pub estimated_time: u32,
    /// Description of an accompanying visual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_description: Option<String>,
    /// Generator confidence in 0..=1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A saved topic explanation, stored in a per-subject partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicContent {
    /// Local identifier.
    pub id: String,
    /// Topic name.
    pub topic: String,
    /// Subject name; selects the storage partition.
    pub subject: String,
    /// Opaque generated content.
    pub content: String,
    /// Structured steps, when the generator produced them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_data: Option<Vec<TopicStep>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time; bumped by every update.
    pub updated_at: DateTime<Utc>,
}

impl Record for TopicContent {
    const KIND: &'static str = "topic";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Identity for TopicContent {
    fn content_key(&self) -> ContentKey {
        ContentKey::topic(&self.topic, &self.subject)
    }
}

/// Fields of topic content to be added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTopicContent {
    /// Topic name.
    pub topic: String,
    /// Subject name.
    pub subject: String,
    /// Generated content.
    pub content: String,
    /// Structured steps.
    pub step_data: Option<Vec<TopicStep>>,
}

impl NewTopicContent {
    pub(crate) fn into_topic_content(self, id: String, now: DateTime<Utc>) -> TopicContent {
        TopicContent {
            id,
            topic: self.topic,
            subject: self.subject,
            content: self.content,
            step_data: self.step_data,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Identity for NewTopicContent {
    fn content_key(&self) -> ContentKey {
        ContentKey::topic(&self.topic, &self.subject)
    }
}

/// Partial update of topic content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicContentPatch {
    /// New topic.
    pub topic: Option<String>,
    /// New subject; moves the record to that subject's partition.
    pub subject: Option<String>,
    /// New content.
    pub content: Option<String>,
    /// New steps. `Some(None)` clears them.
    pub step_data: Option<Option<Vec<TopicStep>>>,
}

impl TopicContentPatch {
    pub(crate) fn apply_to(self, record: &mut TopicContent, now: DateTime<Utc>) {
        apply(&mut record.topic, self.topic);
        apply(&mut record.subject, self.subject);
        apply(&mut record.content, self.content);
        apply(&mut record.step_data, self.step_data);
        record.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parses_step_data() {
        let json = r#"{
            "id": "topic_1",
            "topic": "Türev",
            "subject": "Matematik",
            "content": "...",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z",
            "stepData": [{
                "id": "s1", "title": "Tanım", "content": "Limit",
                "examples": ["x^2"], "tips": [], "difficulty": "easy",
                "estimatedTime": 5, "confidence": 0.9
            }]
        }"#;
        let record: TopicContent = serde_json::from_str(json).unwrap();
        let steps = record.step_data.unwrap();
        assert_eq!(steps[0].estimated_time, 5);
        assert_eq!(steps[0].confidence, Some(0.9));
        assert!(steps[0].visual_description.is_none());
    }

    #[test]
    fn patch_bumps_updated_at() {
        let created = Utc::now();
        let mut record = NewTopicContent {
            topic: "Türev".into(),
            subject: "Matematik".into(),
            content: "v1".into(),
            step_data: None,
        }
        .into_topic_content("topic_1".into(), created);

        let later = created + Duration::minutes(5);
        TopicContentPatch {
            content: Some("v2".into()),
            ..TopicContentPatch::default()
        }
        .apply_to(&mut record, later);

        assert_eq!(record.content, "v2");
        assert_eq!(record.created_at, created);
        assert_eq!(record.updated_at, later);
    }
}
