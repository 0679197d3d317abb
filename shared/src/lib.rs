use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Entity timestamps are persisted as epoch milliseconds; truncate at
/// creation so in-memory values and stored documents stay identical.
fn document_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// A date on the Hebrew calendar.
///
/// Months are numbered with Nisan = 1 through Adar II = 13; Tishrei (the
/// civil new year) is month 7. Leap years carry a 13th month. The type is a
/// plain value; conversion, arithmetic and rendering live in the backend
/// calendar service. Ordering is lexicographic on (year, month, day), which
/// is how the rest of the system compares Hebrew dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HebrewDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl HebrewDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Lexicographic (year, month, day) comparison, month-number based.
    pub fn is_after(&self, other: &HebrewDate) -> bool {
        self > other
    }
}

/// A congregant ("prayer"). Either the head of a prayer card or one of its
/// children; children have no identity outside their card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prayer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub hebrew_birth_date: Option<HebrewDate>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    /// Life events (bar mitzvah, yahrzeit, ...) recorded for this person.
    #[serde(default)]
    pub events: Vec<PrayerEvent>,
    /// Donations pledged by this person.
    #[serde(default)]
    pub donations: Vec<Donation>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Prayer {
    /// Create a new prayer with a fresh id and empty event/donation lists.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let now = document_timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            hebrew_birth_date: None,
            phone_number: None,
            email: None,
            notes: None,
            events: Vec::new(),
            donations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_birth_date(mut self, birth_date: HebrewDate) -> Self {
        self.hebrew_birth_date = Some(birth_date);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn unpaid_donations(&self) -> Vec<&Donation> {
        self.donations.iter().filter(|d| !d.paid).collect()
    }

    pub fn paid_donations(&self) -> Vec<&Donation> {
        self.donations.iter().filter(|d| d.paid).collect()
    }

    /// Sum of this person's unpaid donation amounts.
    pub fn total_unpaid_amount(&self) -> f64 {
        self.donations
            .iter()
            .filter(|d| !d.paid)
            .map(|d| d.amount)
            .sum()
    }
}

/// A prayer card: one head-of-household prayer plus dependent children,
/// tracked together under a contact email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerCard {
    pub id: String,
    pub prayer: Prayer,
    #[serde(default)]
    pub children: Vec<Prayer>,
    pub email: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl PrayerCard {
    pub fn new(prayer: Prayer, email: impl Into<String>) -> Self {
        let now = document_timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            prayer,
            children: Vec::new(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Return a copy of this card with the child appended.
    pub fn add_child(&self, child: Prayer) -> PrayerCard {
        let mut updated = self.clone();
        updated.children.push(child);
        updated.updated_at = document_timestamp();
        updated
    }

    /// Return a copy of this card without the given child. Unknown ids are a
    /// no-op.
    pub fn remove_child(&self, child_id: &str) -> PrayerCard {
        let mut updated = self.clone();
        updated.children.retain(|c| c.id != child_id);
        updated.updated_at = document_timestamp();
        updated
    }
}

/// A recorded life event, dated on the Hebrew calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerEvent {
    pub id: String,
    /// Id of the [`PrayerEventType`] catalog entry this event belongs to.
    pub event_type_id: String,
    pub hebrew_date: HebrewDate,
    pub notes: Option<String>,
}

impl PrayerEvent {
    pub fn new(event_type_id: impl Into<String>, hebrew_date: HebrewDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type_id: event_type_id.into(),
            hebrew_date,
            notes: None,
        }
    }
}

/// How an event type repeats, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    /// One-time event.
    None,
    /// Recurs yearly on the same Hebrew month/day.
    Yearly,
}

/// Catalog entry naming a kind of life event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerEventType {
    pub id: String,
    pub display_name: String,
    pub recurrence_type: RecurrenceType,
    pub enabled: bool,
    pub description: Option<String>,
    pub display_order: Option<u32>,
}

impl PrayerEventType {
    pub fn new(display_name: impl Into<String>, recurrence_type: RecurrenceType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name: display_name.into(),
            recurrence_type,
            enabled: true,
            description: None,
            display_order: None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence_type == RecurrenceType::Yearly
    }
}

/// A donation pledged by a prayer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub amount: f64,
    pub hebrew_date: HebrewDate,
    pub paid: bool,
    pub notes: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Identity of the staff member who recorded the donation.
    pub created_by: String,
}

impl Donation {
    pub fn new(amount: f64, hebrew_date: HebrewDate, created_by: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            amount,
            hebrew_date,
            paid: false,
            notes: None,
            created_at: document_timestamp(),
            created_by: created_by.into(),
        }
    }

    pub fn mark_paid(&self) -> Donation {
        let mut updated = self.clone();
        updated.paid = true;
        updated
    }

    pub fn mark_unpaid(&self) -> Donation {
        let mut updated = self.clone();
        updated.paid = false;
        updated
    }
}

/// One prayer-service occasion (a labelled Hebrew date) holding the aliya
/// assignments made for it.
///
/// `assignments` maps aliya-type id to the assigned prayer id, and is the
/// only place an aliya is bound to a person; per-person aliya lists are
/// synthesized on read by joining against the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliyaGroup {
    pub id: String,
    pub label: String,
    pub hebrew_date: HebrewDate,
    #[serde(default)]
    pub assignments: HashMap<String, String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl AliyaGroup {
    pub fn new(label: impl Into<String>, hebrew_date: HebrewDate) -> Self {
        let now = document_timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            hebrew_date,
            assignments: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn assigned_prayer_id(&self, aliya_type_id: &str) -> Option<&str> {
        self.assignments.get(aliya_type_id).map(String::as_str)
    }

    /// Return a copy of this group with the assignment upserted.
    pub fn set_assignment(&self, aliya_type_id: impl Into<String>, prayer_id: impl Into<String>) -> AliyaGroup {
        let mut updated = self.clone();
        updated
            .assignments
            .insert(aliya_type_id.into(), prayer_id.into());
        updated.updated_at = document_timestamp();
        updated
    }

    /// Return a copy of this group without the assignment. Removing a key
    /// that is not present is a no-op, not an error.
    pub fn remove_assignment(&self, aliya_type_id: &str) -> AliyaGroup {
        let mut updated = self.clone();
        updated.assignments.remove(aliya_type_id);
        updated.updated_at = document_timestamp();
        updated
    }

    /// Apply a batch of removals and upserts in one step, removals first.
    /// A key present in both sets therefore ends up upserted.
    pub fn update_assignments(
        &self,
        removals: &[String],
        upserts: &HashMap<String, String>,
    ) -> AliyaGroup {
        let mut updated = self.clone();
        for key in removals {
            updated.assignments.remove(key);
        }
        for (key, value) in upserts {
            updated.assignments.insert(key.clone(), value.clone());
        }
        updated.updated_at = document_timestamp();
        updated
    }

    pub fn clear_assignments(&self) -> AliyaGroup {
        let mut updated = self.clone();
        updated.assignments.clear();
        updated.updated_at = document_timestamp();
        updated
    }
}

/// Catalog entry naming a Torah-reading role ("first", "maftir", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliyaType {
    pub id: String,
    pub display_name: String,
    /// Relative honor weight used when balancing assignments.
    pub weight: u32,
    pub enabled: bool,
    pub display_order: Option<u32>,
}

impl AliyaType {
    pub fn new(display_name: impl Into<String>, weight: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name: display_name.into(),
            weight,
            enabled: true,
            display_order: None,
        }
    }
}

/// Groups aliya types into a reporting column ("shabbat readings", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliyaTypeCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub display_order: Option<u32>,
    #[serde(default)]
    pub aliya_type_ids: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl AliyaTypeCategory {
    pub fn new(name: impl Into<String>) -> Self {
        let now = document_timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            display_order: None,
            aliya_type_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single aliya, synthesized from a group's assignment map. Not persisted
/// on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aliya {
    pub aliya_group_id: String,
    pub aliya_type_id: String,
}

/// An aliya joined with the person and card it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliyaWithContext {
    pub aliya: Aliya,
    pub prayer: Prayer,
    pub card: PrayerCard,
    pub is_child: bool,
}

/// A donation joined with the person and card it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationWithContext {
    pub donation: Donation,
    pub prayer: Prayer,
    pub card: PrayerCard,
}

/// Roster-wide donation totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationSummary {
    pub total_paid: f64,
    pub total_unpaid: f64,
    /// Distinct persons with at least one unpaid donation.
    pub prayers_with_unpaid: usize,
    /// Count of unpaid donation records (not a sum).
    pub unpaid_donation_count: usize,
}

/// What an upcoming item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpcomingKind {
    Birthday,
    Event,
}

/// A birthday occurrence or life event falling inside the lookahead window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingItem {
    pub kind: UpcomingKind,
    pub gregorian_date: NaiveDate,
    pub hebrew_date: HebrewDate,
    pub prayer: Prayer,
    pub card: PrayerCard,
    pub is_child: bool,
    /// Set for life events.
    pub event: Option<PrayerEvent>,
    /// For birthdays: the age the person is turning.
    pub age: Option<i32>,
}

/// Per-column aliya bookkeeping for one person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryColumn {
    pub last_aliya_date: Option<HebrewDate>,
    pub last_parasha: Option<String>,
    pub count: u32,
}

/// One person's aliya history across all report columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerAliyaHistory {
    pub prayer: Prayer,
    pub card: PrayerCard,
    pub is_child: bool,
    /// Keyed by category id, or by aliya-type id for uncategorized types.
    pub category_columns: HashMap<String, CategoryColumn>,
    pub overall_last_aliya_date: Option<HebrewDate>,
    pub total_aliyot: usize,
}

/// An ordered export column: a category, or a single uncategorized type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub id: String,
    pub name: String,
    pub is_category: bool,
    pub display_order: Option<u32>,
}

/// The two numbers rendered in an export cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryColumnData {
    pub count: u32,
    /// Weeks since the person's last aliya in this column, expressed as an
    /// offset from the dataset's earliest aliya date; -1 when unknown.
    pub weeks_since_last_aliya: i64,
}

/// One export row. `prayer_name` is formatted exactly once, here; renderers
/// treat it as opaque text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPrayerRow {
    pub prayer_name: String,
    pub is_child: bool,
    pub category_data: HashMap<String, CategoryColumnData>,
}

/// One upcoming-event export row, fully pre-formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportUpcomingEventRow {
    pub prayer_name: String,
    pub parasha: String,
    pub event_type: String,
    pub age: String,
    pub notes: String,
}

/// Everything the PDF/XLSX renderers need, shaped and stringified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliyaHistoryExport {
    pub columns: Vec<ColumnDefinition>,
    pub prayer_rows: Vec<ExportPrayerRow>,
    pub upcoming_events: Vec<ExportUpcomingEventRow>,
    pub generated_date: String,
}
