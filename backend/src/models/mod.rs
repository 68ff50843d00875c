//! Persisted entities.
//!
//! Each struct is both the diesel row type and the wire contract for that
//! entity, so anything the service returns validates again as an entity.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::contracts::fields::{default_calibration_factor, default_true, nullable};

pub mod enums;
pub mod json;

pub use enums::{
    AlertSeverity, DeviceStatus, DeviceType, DocumentType, ExportFormat, Language, MessageRole,
    SensorType, Theme, TileType, UserRole,
};
pub use json::JsonRecord;

#[derive(Queryable, Selectable, Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    #[validate(email)]
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub language: Language,
    pub theme: Theme,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::devices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Device {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceType,
    pub status: DeviceStatus,
    #[serde(deserialize_with = "nullable")]
    pub location: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "nullable")]
    pub metadata: Option<JsonRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::sensors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Sensor {
    pub id: i32,
    pub device_id: i32,
    #[serde(rename = "type")]
    pub kind: SensorType,
    pub name: String,
    pub unit: String,
    #[serde(deserialize_with = "nullable")]
    pub min_value: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub max_value: Option<f64>,
    #[serde(default = "default_calibration_factor")]
    pub calibration_factor: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::sensor_readings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SensorReading {
    pub id: i32,
    pub sensor_id: i32,
    pub value: f64,
    #[serde(deserialize_with = "nullable")]
    pub raw_value: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub quality_score: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Document {
    pub id: i32,
    pub user_id: i32,
    pub filename: String,
    pub original_filename: String,
    pub file_type: DocumentType,
    #[validate(range(min = 0))]
    pub file_size: i64,
    pub file_path: String,
    #[serde(default)]
    pub processed: bool,
    #[serde(deserialize_with = "nullable")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub extracted_text: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub metadata: Option<JsonRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::chat_conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChatConversation {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::chat_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChatMessage {
    pub id: i32,
    pub conversation_id: i32,
    pub role: MessageRole,
    pub content: String,
    #[serde(deserialize_with = "nullable")]
    pub document_references: Option<Vec<i32>>,
    #[serde(deserialize_with = "nullable")]
    pub metadata: Option<JsonRecord>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::dashboard_tiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DashboardTile {
    pub id: i32,
    pub user_id: i32,
    #[serde(rename = "type")]
    pub kind: TileType,
    pub title: String,
    pub position_x: i32,
    pub position_y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(deserialize_with = "nullable")]
    pub config: Option<JsonRecord>,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::alerts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Alert {
    pub id: i32,
    #[serde(deserialize_with = "nullable")]
    pub device_id: Option<i32>,
    #[serde(deserialize_with = "nullable")]
    pub sensor_id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(deserialize_with = "nullable")]
    pub acknowledged_by: Option<i32>,
    #[serde(deserialize_with = "nullable")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(deserialize_with = "nullable")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
