#![allow(dead_code)]

use chrono::{DateTime, NaiveTime, Utc};
use polywire::{AdditionalData, Instance, Model, TypeRegistry, WireEnum};
use serde_json::Value;

// ========================================
// Directory object hierarchy
// ========================================

#[derive(Model, Debug, Clone, Default, PartialEq)]
#[wire(
    type_name = "microsoft.graph.entity",
    discriminator = "#microsoft.graph.entity"
)]
pub struct Entity {
    pub id: Option<String>,
    #[wire(additional_data)]
    pub additional_data: AdditionalData,
}

#[derive(Model, Debug, Clone, Default, PartialEq)]
#[wire(
    type_name = "microsoft.graph.directoryObject",
    discriminator = "#microsoft.graph.directoryObject"
)]
pub struct DirectoryObject {
    #[wire(parent)]
    pub entity: Entity,
    pub deleted_date_time: Option<DateTime<Utc>>,
}

#[derive(Model, Debug, Clone, Default, PartialEq)]
#[wire(
    type_name = "microsoft.graph.user",
    discriminator = "#microsoft.graph.user"
)]
pub struct User {
    #[wire(parent)]
    pub directory_object: DirectoryObject,
    pub account_enabled: Option<bool>,
    pub display_name: Option<String>,
    pub business_phones: Option<Vec<String>>,
    pub risk_level: Option<RiskLevel>,
    pub manager: Option<Instance<DirectoryObject>>,
    #[wire(rename = "onPremisesSamAccountName")]
    pub sam_account_name: Option<String>,
    #[wire(skip)]
    pub fetched_at: Option<u64>,
}

#[derive(Model, Debug, Clone, Default, PartialEq)]
#[wire(
    type_name = "microsoft.graph.group",
    discriminator = "#microsoft.graph.group"
)]
pub struct Group {
    #[wire(parent)]
    pub directory_object: DirectoryObject,
    pub display_name: Option<String>,
    pub security_enabled: Option<bool>,
    pub visibility: Option<GroupVisibility>,
    pub members: Option<Vec<Instance<DirectoryObject>>>,
}

/// Known to the schema, never registered by the fixtures.
#[derive(Model, Debug, Clone, Default, PartialEq)]
#[wire(
    type_name = "microsoft.graph.servicePrincipal",
    discriminator = "#microsoft.graph.servicePrincipal"
)]
pub struct ServicePrincipal {
    #[wire(parent)]
    pub directory_object: DirectoryObject,
    pub app_id: Option<String>,
}

// ========================================
// Types without a discriminator
// ========================================

#[derive(Model, Debug, Clone, Default, PartialEq)]
pub struct Base {
    pub known_field: Option<String>,
    #[wire(additional_data)]
    pub additional_data: AdditionalData,
}

#[derive(Model, Debug, Clone, Default, PartialEq)]
#[wire(type_name = "microsoft.graph.workingHours")]
pub struct WorkingHours {
    pub days_of_week: Option<Vec<DayOfWeek>>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[wire(additional_data)]
    pub additional_data: AdditionalData,
}

// ========================================
// Enums
// ========================================

#[derive(WireEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Hidden,
    #[wire(unknown)]
    UnknownFutureValue,
}

#[derive(WireEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupVisibility {
    #[wire(rename = "Public")]
    Public,
    #[wire(rename = "Private")]
    Private,
    #[wire(rename = "HiddenMembership")]
    HiddenMembership,
    #[wire(unknown)]
    UnknownFutureValue,
}

/// Closed set: no unknown member.
#[derive(WireEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

// ========================================
// Helpers
// ========================================

/// Registry with `User` and `Group` registered.
pub fn registry() -> TypeRegistry {
    TypeRegistry::builder()
        .register::<User>()
        .unwrap()
        .register::<Group>()
        .unwrap()
        .build()
}

pub fn to_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

pub fn text(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn reparse(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

pub fn user(id: &str, display_name: &str) -> User {
    let mut user = User::default();
    user.directory_object.entity.id = Some(id.to_owned());
    user.display_name = Some(display_name.to_owned());
    user
}

pub fn all_members<E: WireEnum>() -> Vec<E> {
    E::MEMBERS.to_vec()
}
