//! Data models for moveout
//!
//! Defines the persisted entities: Inspection, Room, InspectionItem, Photo,
//! Report and ShareLink, plus the enums whose string values form the
//! on-disk compatibility surface.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when parsing one of the model enums from a string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Lifecycle status of an inspection
///
/// Transitions are not validated: any status may be written at any time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InspectionStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
    Shared,
}

impl InspectionStatus {
    pub const ALL: [InspectionStatus; 4] = [
        InspectionStatus::Draft,
        InspectionStatus::InProgress,
        InspectionStatus::Completed,
        InspectionStatus::Shared,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionStatus::Draft => "draft",
            InspectionStatus::InProgress => "in-progress",
            InspectionStatus::Completed => "completed",
            InspectionStatus::Shared => "shared",
        }
    }

    /// Upper-case label used in reports, e.g. `IN PROGRESS`
    pub fn label(&self) -> String {
        self.as_str().replace('-', " ").to_uppercase()
    }
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InspectionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "inspection status",
                value: s.to_string(),
            })
    }
}

/// Condition severity of an inspected item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[default]
    Good,
    Fair,
    Poor,
    Damaged,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
        Condition::Damaged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Poor => "poor",
            Condition::Damaged => "damaged",
        }
    }

    /// Upper-case label, e.g. `DAMAGED`
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Severity color shared by photo watermarks and report tables
    pub fn color(&self) -> [u8; 3] {
        match self {
            Condition::Good => [22, 163, 74],
            Condition::Fair => [217, 119, 6],
            Condition::Poor => [220, 38, 38],
            Condition::Damaged => [124, 45, 18],
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|condition| condition.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "condition",
                value: s.to_string(),
            })
    }
}

/// The fixed catalog of room types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RoomType {
    Bedroom,
    Bathroom,
    Kitchen,
    LivingRoom,
    DiningRoom,
    LaundryRoom,
    Basement,
    Garage,
    Hallway,
    Closet,
    Balcony,
    Other,
}

impl RoomType {
    pub const ALL: [RoomType; 12] = [
        RoomType::Bedroom,
        RoomType::Bathroom,
        RoomType::Kitchen,
        RoomType::LivingRoom,
        RoomType::DiningRoom,
        RoomType::LaundryRoom,
        RoomType::Basement,
        RoomType::Garage,
        RoomType::Hallway,
        RoomType::Closet,
        RoomType::Balcony,
        RoomType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Bedroom => "bedroom",
            RoomType::Bathroom => "bathroom",
            RoomType::Kitchen => "kitchen",
            RoomType::LivingRoom => "living-room",
            RoomType::DiningRoom => "dining-room",
            RoomType::LaundryRoom => "laundry-room",
            RoomType::Basement => "basement",
            RoomType::Garage => "garage",
            RoomType::Hallway => "hallway",
            RoomType::Closet => "closet",
            RoomType::Balcony => "balcony",
            RoomType::Other => "other",
        }
    }

    /// Upper-case label used in reports, e.g. `LIVING ROOM`
    pub fn label(&self) -> String {
        self.as_str().replace('-', " ").to_uppercase()
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|room_type| room_type.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "room type",
                value: s.to_string(),
            })
    }
}

/// One move-out walkthrough of a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: Uuid,
    pub property_address: String,
    pub inspection_date: NaiveDate,
    pub notes: Option<String>,
    pub status: InspectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an inspection
#[derive(Debug, Clone)]
pub struct NewInspection {
    pub property_address: String,
    pub inspection_date: NaiveDate,
    pub notes: Option<String>,
}

impl NewInspection {
    pub fn new(property_address: impl Into<String>, inspection_date: NaiveDate) -> Self {
        Self {
            property_address: property_address.into(),
            inspection_date,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update for an inspection; `None` fields are left untouched
///
/// Nested options distinguish "leave as is" (`None`) from "clear"
/// (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct InspectionUpdate {
    pub property_address: Option<String>,
    pub inspection_date: Option<NaiveDate>,
    pub notes: Option<Option<String>>,
    pub status: Option<InspectionStatus>,
}

impl InspectionUpdate {
    pub fn status(status: InspectionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.property_address.is_none()
            && self.inspection_date.is_none()
            && self.notes.is_none()
            && self.status.is_none()
    }

    /// Merge the update into an inspection (does not touch `updated_at`)
    pub fn apply(self, inspection: &mut Inspection) {
        if let Some(address) = self.property_address {
            inspection.property_address = address;
        }
        if let Some(date) = self.inspection_date {
            inspection.inspection_date = date;
        }
        if let Some(notes) = self.notes {
            inspection.notes = notes;
        }
        if let Some(status) = self.status {
            inspection.status = status;
        }
    }
}

/// A named, typed area within an inspection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub inspection_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a room
///
/// When `name` is `None` the template display name is used.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub inspection_id: Uuid,
    pub room_type: RoomType,
    pub name: Option<String>,
    pub notes: Option<String>,
}

impl NewRoom {
    pub fn new(inspection_id: Uuid, room_type: RoomType) -> Self {
        Self {
            inspection_id,
            room_type,
            name: None,
            notes: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update for a room
#[derive(Debug, Clone, Default)]
pub struct RoomUpdate {
    pub name: Option<String>,
    pub room_type: Option<RoomType>,
    pub notes: Option<Option<String>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl RoomUpdate {
    pub fn apply(self, room: &mut Room) {
        if let Some(name) = self.name {
            room.name = name;
        }
        if let Some(room_type) = self.room_type {
            room.room_type = room_type;
        }
        if let Some(notes) = self.notes {
            room.notes = notes;
        }
        if let Some(completed_at) = self.completed_at {
            room.completed_at = completed_at;
        }
    }
}

/// One checklist entry within a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InspectionItem {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub condition: Condition,
    pub notes: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl InspectionItem {
    /// An item counts as done once it has a checked-at timestamp
    pub fn is_checked(&self) -> bool {
        self.checked_at.is_some()
    }
}

/// Partial update for an inspection item
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub condition: Option<Condition>,
    pub notes: Option<Option<String>>,
    pub checked_at: Option<Option<DateTime<Utc>>>,
}

impl ItemUpdate {
    pub fn apply(self, item: &mut InspectionItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(condition) = self.condition {
            item.condition = condition;
        }
        if let Some(notes) = self.notes {
            item.notes = notes;
        }
        if let Some(checked_at) = self.checked_at {
            item.checked_at = checked_at;
        }
    }
}

/// What a photo is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoScope {
    Item(Uuid),
    Room(Uuid),
    InspectionOnly,
}

/// An evidentiary image; always belongs to an inspection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub item_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub inspection_id: Uuid,
    pub filename: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub taken_at: DateTime<Utc>,
    #[serde(skip)]
    pub data: Vec<u8>,
    #[serde(skip)]
    pub thumbnail: Option<Vec<u8>>,
}

impl Photo {
    /// The narrowest entity this photo is attached to
    pub fn scope(&self) -> PhotoScope {
        match (self.item_id, self.room_id) {
            (Some(item_id), _) => PhotoScope::Item(item_id),
            (None, Some(room_id)) => PhotoScope::Room(room_id),
            (None, None) => PhotoScope::InspectionOnly,
        }
    }
}

/// Input for storing a photo
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub inspection_id: Uuid,
    pub room_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub filename: String,
    pub original_size: u64,
    pub taken_at: DateTime<Utc>,
    pub data: Vec<u8>,
    pub thumbnail: Option<Vec<u8>>,
}

/// A generated PDF report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub inspection_id: Uuid,
    pub filename: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub share_token: Option<String>,
    pub share_expires_at: Option<DateTime<Utc>>,
}

/// Input for storing a report
#[derive(Debug, Clone)]
pub struct NewReport {
    pub inspection_id: Uuid,
    pub filename: String,
    pub generated_at: DateTime<Utc>,
    pub data: Vec<u8>,
}

/// A time-limited public access token for a report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub token: String,
    pub inspection_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accessed: bool,
    pub access_count: u32,
}

impl ShareLink {
    /// A link stays valid up to and including its expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Read-only status of a share token
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkInfo {
    pub exists: bool,
    pub expired: bool,
    pub access_count: u32,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Completion percentage of a room: checked items over all items
///
/// A room without items is 0% complete.
pub fn room_progress(items: &[InspectionItem]) -> u8 {
    if items.is_empty() {
        return 0;
    }
    let checked = items.iter().filter(|item| item.is_checked()).count();
    (checked as f64 / items.len() as f64 * 100.0).round() as u8
}

/// Overall completion: the rounded mean of per-room progress values
pub fn overall_progress(room_progress: &[u8]) -> u8 {
    if room_progress.is_empty() {
        return 0;
    }
    let total: u32 = room_progress.iter().map(|&p| u32::from(p)).sum();
    (f64::from(total) / room_progress.len() as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(checked: bool) -> InspectionItem {
        InspectionItem {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            name: "Walls".to_string(),
            condition: Condition::Good,
            notes: None,
            checked_at: checked.then(Utc::now),
        }
    }

    #[test]
    fn test_enum_strings_round_trip() {
        for status in InspectionStatus::ALL {
            assert_eq!(status.as_str().parse::<InspectionStatus>().unwrap(), status);
        }
        for condition in Condition::ALL {
            assert_eq!(condition.as_str().parse::<Condition>().unwrap(), condition);
        }
        for room_type in RoomType::ALL {
            assert_eq!(room_type.as_str().parse::<RoomType>().unwrap(), room_type);
        }
    }

    #[test]
    fn test_enum_serde_values() {
        assert_eq!(
            serde_json::to_string(&InspectionStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::to_string(&RoomType::LaundryRoom).unwrap(),
            "\"laundry-room\""
        );
        assert_eq!(serde_json::to_string(&Condition::Damaged).unwrap(), "\"damaged\"");
    }

    #[test]
    fn test_unknown_room_type_is_rejected() {
        let err = "attic".parse::<RoomType>().unwrap_err();
        assert_eq!(err.kind, "room type");
        assert!(err.to_string().contains("attic"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(RoomType::LivingRoom.label(), "LIVING ROOM");
        assert_eq!(InspectionStatus::InProgress.label(), "IN PROGRESS");
        assert_eq!(Condition::Fair.label(), "FAIR");
    }

    #[test]
    fn test_entity_field_names_are_camel_case() {
        let room = Room {
            id: Uuid::new_v4(),
            inspection_id: Uuid::new_v4(),
            name: "Master Bedroom".to_string(),
            room_type: RoomType::Bedroom,
            notes: None,
            completed_at: None,
        };
        let json = serde_json::to_value(&room).unwrap();
        assert!(json.get("inspectionId").is_some());
        assert_eq!(json["type"], "bedroom");
        assert!(json.get("completedAt").is_some());
    }

    #[test]
    fn test_room_progress() {
        assert_eq!(room_progress(&[]), 0);
        assert_eq!(room_progress(&[item(false), item(false)]), 0);
        assert_eq!(room_progress(&[item(true), item(false)]), 50);
        assert_eq!(room_progress(&[item(true), item(false), item(false)]), 33);
        assert_eq!(room_progress(&[item(true), item(true), item(false)]), 67);
        assert_eq!(room_progress(&[item(true)]), 100);
    }

    #[test]
    fn test_overall_progress() {
        assert_eq!(overall_progress(&[]), 0);
        assert_eq!(overall_progress(&[100, 0]), 50);
        assert_eq!(overall_progress(&[33, 67, 0]), 33);
        assert_eq!(overall_progress(&[50, 51]), 51);
    }

    #[test]
    fn test_photo_scope() {
        let inspection_id = Uuid::new_v4();
        let room_id = Uuid::new_v4();
        let item_id = Uuid::new_v4();
        let mut photo = Photo {
            id: Uuid::new_v4(),
            item_id: Some(item_id),
            room_id: Some(room_id),
            inspection_id,
            filename: "sink.jpg".to_string(),
            original_size: 10,
            compressed_size: 5,
            taken_at: Utc::now(),
            data: Vec::new(),
            thumbnail: None,
        };
        assert_eq!(photo.scope(), PhotoScope::Item(item_id));

        photo.item_id = None;
        assert_eq!(photo.scope(), PhotoScope::Room(room_id));

        photo.room_id = None;
        assert_eq!(photo.scope(), PhotoScope::InspectionOnly);
    }

    #[test]
    fn test_share_link_expiry_is_inclusive() {
        let now = Utc::now();
        let link = ShareLink {
            token: "t".to_string(),
            inspection_id: Uuid::new_v4(),
            created_at: now,
            expires_at: now,
            accessed: false,
            access_count: 0,
        };
        assert!(!link.is_expired_at(now));
        assert!(link.is_expired_at(now + chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn test_inspection_update_merges() {
        let mut inspection = Inspection {
            id: Uuid::new_v4(),
            property_address: "1 Main St".to_string(),
            inspection_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            notes: Some("keys returned".to_string()),
            status: InspectionStatus::Draft,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        InspectionUpdate::status(InspectionStatus::Completed).apply(&mut inspection);
        assert_eq!(inspection.status, InspectionStatus::Completed);
        assert_eq!(inspection.property_address, "1 Main St");
        assert_eq!(inspection.notes.as_deref(), Some("keys returned"));

        InspectionUpdate {
            notes: Some(None),
            ..Default::default()
        }
        .apply(&mut inspection);
        assert!(inspection.notes.is_none());
    }
}
