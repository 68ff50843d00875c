//! Input and output contracts for every RPC procedure.
//!
//! Inputs are deserialized (presence, types, enum membership, defaults) and
//! then checked with `validator` (formats, ranges) by [`crate::validation`].
//! Create contracts double as diesel `Insertable`s and update contracts as
//! `AsChangeset`s, so nothing reaches the store without passing through them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    AlertSeverity, DeviceStatus, DeviceType, DocumentType, ExportFormat, JsonRecord, Language,
    MessageRole, SensorType, Theme, TileType, UserRole,
};
use crate::schema::{
    alerts, chat_conversations, chat_messages, dashboard_tiles, devices, documents,
    sensor_readings, sensors, users,
};

pub mod fields;

use fields::{
    default_calibration_factor, default_limit, default_true, non_null, nullable, patch, stored_path,
};

// ============================================================================
// Users
// ============================================================================

#[derive(Deserialize, Validate, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
pub struct CreateUserInput {
    #[validate(email)]
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Deserialize, Validate, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
pub struct UpdateUserInput {
    pub id: i32,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "non_null")]
    pub language: Option<Language>,
    #[serde(default, deserialize_with = "non_null")]
    pub theme: Option<Theme>,
}

// ============================================================================
// Devices
// ============================================================================

#[derive(Deserialize, Validate, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = devices)]
pub struct CreateDeviceInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceType,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(deserialize_with = "nullable")]
    pub location: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "non_null")]
    pub metadata: Option<JsonRecord>,
}

/// `location`, `latitude` and `longitude` are three-state: omitted leaves the
/// column alone, `null` clears it.
#[derive(Deserialize, Validate, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = devices)]
pub struct UpdateDeviceInput {
    pub id: i32,
    #[serde(default, deserialize_with = "non_null")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub status: Option<DeviceStatus>,
    #[serde(default, deserialize_with = "patch")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "patch")]
    pub longitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "non_null")]
    pub metadata: Option<JsonRecord>,
}

#[derive(Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct GetDevicesInput {
    #[serde(rename = "type", default, deserialize_with = "non_null")]
    pub kind: Option<DeviceType>,
    #[serde(default, deserialize_with = "non_null")]
    pub status: Option<DeviceStatus>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: i64,
}

impl Default for GetDevicesInput {
    fn default() -> Self {
        Self {
            kind: None,
            status: None,
            limit: default_limit(),
        }
    }
}

// ============================================================================
// Sensors and readings
// ============================================================================

#[derive(Deserialize, Validate, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = sensors)]
pub struct CreateSensorInput {
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
}

#[derive(Deserialize, Validate, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = sensor_readings)]
pub struct CreateSensorReadingInput {
    pub sensor_id: i32,
    pub value: f64,
    #[serde(default, deserialize_with = "non_null")]
    pub raw_value: Option<f64>,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub quality_score: Option<f64>,
    #[serde(default = "chrono::Utc::now")]
    pub timestamp: DateTime<Utc>,
}

/// Date bounds are inclusive.
#[derive(Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct GetSensorReadingsInput {
    pub sensor_id: i32,
    #[serde(default, deserialize_with = "non_null")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: i64,
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Deserialize, Validate, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = documents)]
pub struct UploadDocumentInput {
    pub user_id: i32,
    pub filename: String,
    pub original_filename: String,
    pub file_type: DocumentType,
    #[validate(range(min = 0))]
    pub file_size: i64,
    #[validate(custom(function = "stored_path"))]
    pub file_path: String,
    #[serde(default, deserialize_with = "non_null")]
    pub metadata: Option<JsonRecord>,
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Deserialize, Validate, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = chat_conversations)]
pub struct CreateChatConversationInput {
    pub user_id: i32,
    pub title: String,
}

#[derive(Deserialize, Validate, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = chat_messages)]
pub struct CreateChatMessageInput {
    pub conversation_id: i32,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, deserialize_with = "non_null")]
    pub document_references: Option<Vec<i32>>,
    #[serde(default, deserialize_with = "non_null")]
    pub metadata: Option<JsonRecord>,
}

#[derive(Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct ChatQueryInput {
    pub conversation_id: i32,
    pub message: String,
    #[serde(default, deserialize_with = "non_null")]
    pub document_ids: Option<Vec<i32>>,
}

// ============================================================================
// Dashboard tiles
// ============================================================================

#[derive(Deserialize, Validate, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = dashboard_tiles)]
pub struct CreateDashboardTileInput {
    pub user_id: i32,
    #[serde(rename = "type")]
    pub kind: TileType,
    pub title: String,
    pub position_x: i32,
    pub position_y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default, deserialize_with = "non_null")]
    pub config: Option<JsonRecord>,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

#[derive(Deserialize, Validate, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = dashboard_tiles)]
pub struct UpdateDashboardTileInput {
    pub id: i32,
    #[serde(default, deserialize_with = "non_null")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub position_x: Option<i32>,
    #[serde(default, deserialize_with = "non_null")]
    pub position_y: Option<i32>,
    #[serde(default, deserialize_with = "non_null")]
    pub width: Option<i32>,
    #[serde(default, deserialize_with = "non_null")]
    pub height: Option<i32>,
    #[serde(default, deserialize_with = "non_null")]
    pub config: Option<JsonRecord>,
    #[serde(default, deserialize_with = "non_null")]
    pub is_visible: Option<bool>,
}

// ============================================================================
// Alerts
// ============================================================================

/// Neither `device_id` nor `sensor_id` is required; alerts may be global.
#[derive(Deserialize, Validate, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = alerts)]
pub struct CreateAlertInput {
    #[serde(default, deserialize_with = "non_null")]
    pub device_id: Option<i32>,
    #[serde(default, deserialize_with = "non_null")]
    pub sensor_id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
}

#[derive(Deserialize, Validate, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeAlertInput {
    pub alert_id: i32,
    pub user_id: i32,
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct ExportDashboardInput {
    pub user_id: i32,
    pub format: ExportFormat,
    #[serde(default, deserialize_with = "non_null")]
    pub tile_ids: Option<Vec<i32>>,
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_devices: i64,
    pub online_devices: i64,
    pub offline_devices: i64,
    pub total_sensors: i64,
    pub active_alerts: i64,
    pub energy_consumption_today: f64,
    pub air_quality_average: f64,
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct ExportResult {
    pub file_path: String,
    #[validate(range(min = 0))]
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}
