//! Write-side shapes and their validation.
//!
//! Insert shapes omit server-assigned fields (identifiers, creation and
//! update timestamps). Declared defaults are filled in while decoding, so a
//! successfully parsed shape is exactly what gets persisted.
//!
//! Validation is all-or-nothing: [`parse_insert`] reports every missing
//! field, every badly typed field, and every constraint violation at once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::{FieldError, Result, ValidationError};
use crate::types::{
    BigIdea, ChapterMarker, SubscriptionPlan, SubscriptionStatus, SubscriptionTier, SummaryType,
    TextTiming,
};

/// Checks that a JSON value decodes into one field's declared type.
pub type Probe = fn(&Value) -> std::result::Result<(), String>;

/// Decoding rule for one field of an insert shape.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub probe: Probe,
}

impl FieldSpec {
    pub const fn required(name: &'static str, probe: Probe) -> Self {
        Self {
            name,
            required: true,
            probe,
        }
    }

    pub const fn optional(name: &'static str, probe: Probe) -> Self {
        Self {
            name,
            required: false,
            probe,
        }
    }
}

/// Probe for a field whose (non-null) value must decode as `T`.
pub fn probe<T: DeserializeOwned>(value: &Value) -> std::result::Result<(), String> {
    T::deserialize(value).map(|_| ()).map_err(|e| e.to_string())
}

/// A write shape accepted by the storage layer.
pub trait InsertShape: DeserializeOwned + Validate {
    /// Every field the shape accepts.
    const FIELDS: &'static [FieldSpec];

    /// Keys stripped from caller input before decoding.
    const SERVER_ASSIGNED: &'static [&'static str] = &["id", "created_at", "updated_at"];

    /// Checks the `validator` attributes cannot express.
    fn check_extra(&self) -> Vec<FieldError> {
        Vec::new()
    }

    /// Bring values into their stored representation.
    fn normalize(&mut self) {}
}

/// Decode and validate a caller-supplied JSON payload.
pub fn parse_insert<T: InsertShape>(value: Value) -> Result<T> {
    let mut object = match value {
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::single(FieldError::invalid_type(
                "$",
                format!("expected an object, found {}", json_kind(&other)),
            )))
        }
    };

    for key in T::SERVER_ASSIGNED {
        object.remove(*key);
    }

    let mut errors = Vec::new();
    for spec in T::FIELDS {
        match object.get(spec.name) {
            None | Some(Value::Null) => {
                // Null and absent both mean "use the default".
                object.remove(spec.name);
                if spec.required {
                    errors.push(FieldError::missing(spec.name));
                }
            }
            Some(v) => {
                if let Err(message) = (spec.probe)(v) {
                    errors.push(FieldError::invalid_type(spec.name, message));
                }
            }
        }
    }
    if let Some(err) = ValidationError::from_errors(errors) {
        return Err(err);
    }

    let insert: T = serde_json::from_value(Value::Object(object))
        .map_err(|e| ValidationError::single(FieldError::invalid_type("$", e.to_string())))?;
    prepare_insert(insert)
}

/// Normalize and validate a shape built in Rust. Run before every persist.
pub fn prepare_insert<T: InsertShape>(mut insert: T) -> Result<T> {
    insert.normalize();
    validate_insert(&insert)?;
    Ok(insert)
}

/// Check declared constraints without modifying the shape.
pub fn validate_insert<T: InsertShape>(insert: &T) -> Result<()> {
    let mut errors = match insert.validate() {
        Ok(()) => Vec::new(),
        Err(e) => ValidationError::from(e).errors().to_vec(),
    };
    errors.extend(insert.check_extra());
    match ValidationError::from_errors(errors) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Check that `value` fits a NUMERIC(precision, scale) column.
pub(crate) fn check_fixed_point(
    field: &str,
    value: &Decimal,
    precision: u32,
    scale: u32,
) -> Option<FieldError> {
    let limit = Decimal::from(10i64.pow(precision - scale));
    if value.abs() >= limit {
        return Some(FieldError::constraint(
            field,
            format!("must be less than {} in magnitude", limit),
        ));
    }
    None
}

pub(crate) fn to_scale(value: &mut Decimal, scale: u32) {
    value.rescale(scale);
}

fn default_true() -> bool {
    true
}

fn default_sequence_number() -> i32 {
    1
}

fn default_currency() -> String {
    "IDR".to_string()
}

/// Create-or-refresh payload for a user coming from the identity provider.
///
/// Unlike other shapes the identifier may be supplied. `subscription_type`
/// only applies when the row is first created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpsertUser {
    pub id: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub subscription_type: SubscriptionTier,
}

impl InsertShape for UpsertUser {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("id", probe::<String>),
        FieldSpec::optional("email", probe::<String>),
        FieldSpec::optional("first_name", probe::<String>),
        FieldSpec::optional("last_name", probe::<String>),
        FieldSpec::optional("profile_image_url", probe::<String>),
        FieldSpec::optional("subscription_type", probe::<SubscriptionTier>),
    ];
    const SERVER_ASSIGNED: &'static [&'static str] = &["created_at", "updated_at"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InsertCategory {
    #[validate(length(max = 100))]
    pub name: String,
    #[validate(length(max = 100))]
    pub slug: String,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub icon_name: Option<String>,
    #[validate(length(max = 7))]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl InsertShape for InsertCategory {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name", probe::<String>),
        FieldSpec::required("slug", probe::<String>),
        FieldSpec::optional("description", probe::<String>),
        FieldSpec::optional("icon_name", probe::<String>),
        FieldSpec::optional("color", probe::<String>),
        FieldSpec::optional("is_active", probe::<bool>),
        FieldSpec::optional("sort_order", probe::<i32>),
    ];
    const SERVER_ASSIGNED: &'static [&'static str] = &["id", "created_at"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InsertAuthor {
    #[validate(length(max = 200))]
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

impl InsertShape for InsertAuthor {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name", probe::<String>),
        FieldSpec::optional("bio", probe::<String>),
        FieldSpec::optional("image_url", probe::<String>),
    ];
    const SERVER_ASSIGNED: &'static [&'static str] = &["id", "created_at"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InsertBook {
    #[validate(length(max = 300))]
    pub title: String,
    pub subtitle: Option<String>,
    pub author_id: Option<String>,
    pub category_id: Option<String>,
    pub cover_image_url: Option<String>,
    pub description: Option<String>,
    pub published_year: Option<i32>,
    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    #[serde(default)]
    pub rating: Decimal,
    #[serde(default)]
    pub ratings_count: i32,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub is_featured: bool,
}

/// NUMERIC(3, 2)
pub(crate) const RATING_PRECISION: (u32, u32) = (3, 2);
/// NUMERIC(10, 2)
pub(crate) const AMOUNT_PRECISION: (u32, u32) = (10, 2);

pub(crate) fn check_rating(rating: &Decimal) -> Option<FieldError> {
    if rating.is_sign_negative() && !rating.is_zero() {
        return Some(FieldError::constraint("rating", "must not be negative"));
    }
    check_fixed_point("rating", rating, RATING_PRECISION.0, RATING_PRECISION.1)
}

impl InsertShape for InsertBook {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("title", probe::<String>),
        FieldSpec::optional("subtitle", probe::<String>),
        FieldSpec::optional("author_id", probe::<String>),
        FieldSpec::optional("category_id", probe::<String>),
        FieldSpec::optional("cover_image_url", probe::<String>),
        FieldSpec::optional("description", probe::<String>),
        FieldSpec::optional("published_year", probe::<i32>),
        FieldSpec::optional("isbn", probe::<String>),
        FieldSpec::optional("rating", probe::<Decimal>),
        FieldSpec::optional("ratings_count", probe::<i32>),
        FieldSpec::optional("is_popular", probe::<bool>),
        FieldSpec::optional("is_featured", probe::<bool>),
    ];

    fn check_extra(&self) -> Vec<FieldError> {
        check_rating(&self.rating).into_iter().collect()
    }

    fn normalize(&mut self) {
        to_scale(&mut self.rating, RATING_PRECISION.1);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InsertSummary {
    pub book_id: String,
    #[validate(length(max = 300))]
    pub title: String,
    pub content: String,
    pub in_this_summary: Option<String>,
    pub key_takeaways: Option<Vec<String>>,
    pub big_ideas: Option<Vec<BigIdea>>,
    pub about_author: Option<String>,
    #[validate(range(min = 0))]
    pub reading_time_minutes: i32,
    pub audio_url: Option<String>,
    #[validate(range(min = 0))]
    pub audio_duration_minutes: Option<i32>,
    pub text_timings: Option<Vec<TextTiming>>,
    pub chapter_markers: Option<Vec<ChapterMarker>>,
    #[serde(default = "default_true")]
    pub use_auto_scroll: bool,
    #[serde(default)]
    pub summary_type: SummaryType,
    #[serde(default = "default_sequence_number")]
    #[validate(range(min = 1))]
    pub sequence_number: i32,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_premium: bool,
}

impl InsertShape for InsertSummary {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("book_id", probe::<String>),
        FieldSpec::required("title", probe::<String>),
        FieldSpec::required("content", probe::<String>),
        FieldSpec::optional("in_this_summary", probe::<String>),
        FieldSpec::optional("key_takeaways", probe::<Vec<String>>),
        FieldSpec::optional("big_ideas", probe::<Vec<BigIdea>>),
        FieldSpec::optional("about_author", probe::<String>),
        FieldSpec::required("reading_time_minutes", probe::<i32>),
        FieldSpec::optional("audio_url", probe::<String>),
        FieldSpec::optional("audio_duration_minutes", probe::<i32>),
        FieldSpec::optional("text_timings", probe::<Vec<TextTiming>>),
        FieldSpec::optional("chapter_markers", probe::<Vec<ChapterMarker>>),
        FieldSpec::optional("use_auto_scroll", probe::<bool>),
        FieldSpec::optional("summary_type", probe::<SummaryType>),
        FieldSpec::optional("sequence_number", probe::<i32>),
        FieldSpec::optional("is_published", probe::<bool>),
        FieldSpec::optional("is_premium", probe::<bool>),
    ];
}

/// Start of a reading session. Activity timestamps are server-assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InsertReadingSession {
    pub user_id: String,
    pub summary_id: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub progress_percent: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub current_position: i32,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub time_spent_minutes: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl InsertShape for InsertReadingSession {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("user_id", probe::<String>),
        FieldSpec::required("summary_id", probe::<String>),
        FieldSpec::optional("progress_percent", probe::<i32>),
        FieldSpec::optional("current_position", probe::<i32>),
        FieldSpec::optional("is_completed", probe::<bool>),
        FieldSpec::optional("time_spent_minutes", probe::<i32>),
        FieldSpec::optional("completed_at", probe::<DateTime<Utc>>),
    ];
    const SERVER_ASSIGNED: &'static [&'static str] = &["id", "started_at", "last_accessed_at"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InsertBookmark {
    pub user_id: String,
    pub summary_id: String,
    #[validate(range(min = 0))]
    pub position: i32,
    pub note: Option<String>,
}

impl InsertShape for InsertBookmark {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("user_id", probe::<String>),
        FieldSpec::required("summary_id", probe::<String>),
        FieldSpec::required("position", probe::<i32>),
        FieldSpec::optional("note", probe::<String>),
    ];
    const SERVER_ASSIGNED: &'static [&'static str] = &["id", "created_at"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InsertNote {
    pub user_id: String,
    pub summary_id: String,
    pub content: String,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    #[serde(default = "default_true")]
    pub is_private: bool,
}

impl InsertShape for InsertNote {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("user_id", probe::<String>),
        FieldSpec::required("summary_id", probe::<String>),
        FieldSpec::required("content", probe::<String>),
        FieldSpec::optional("position", probe::<i32>),
        FieldSpec::optional("is_private", probe::<bool>),
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InsertSubscription {
    pub user_id: String,
    #[serde(rename = "type")]
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: Option<Decimal>,
    #[serde(default = "default_currency")]
    #[validate(length(max = 3))]
    pub currency: String,
    pub payment_id: Option<String>,
}

impl InsertShape for InsertSubscription {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("user_id", probe::<String>),
        FieldSpec::required("type", probe::<SubscriptionPlan>),
        FieldSpec::required("status", probe::<SubscriptionStatus>),
        FieldSpec::required("start_date", probe::<DateTime<Utc>>),
        FieldSpec::required("end_date", probe::<DateTime<Utc>>),
        FieldSpec::optional("amount", probe::<Decimal>),
        FieldSpec::optional("currency", probe::<String>),
        FieldSpec::optional("payment_id", probe::<String>),
    ];
    const SERVER_ASSIGNED: &'static [&'static str] = &["id", "created_at"];

    fn check_extra(&self) -> Vec<FieldError> {
        self.amount
            .as_ref()
            .and_then(|a| check_fixed_point("amount", a, AMOUNT_PRECISION.0, AMOUNT_PRECISION.1))
            .into_iter()
            .collect()
    }

    fn normalize(&mut self) {
        if let Some(amount) = self.amount.as_mut() {
            to_scale(amount, AMOUNT_PRECISION.1);
        }
    }
}
