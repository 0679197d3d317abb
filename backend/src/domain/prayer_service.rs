//! Roster-level rules about prayers.
//!
//! Eligibility here means eligibility to be called up for an aliya: anyone
//! without a recorded birth date, or whose Hebrew age is at least bar
//! mitzvah. The same filter also gates the upcoming-events and history
//! views, which is how the congregation's reports have always behaved.

use shared::{HebrewDate, Prayer, PrayerCard};

use super::calendar::HebrewCalendarService;

/// Age from which a congregant can receive an aliya.
pub const BAR_MITZVAH_AGE: i32 = 13;

#[derive(Clone, Default)]
pub struct PrayerService {
    calendar: HebrewCalendarService,
}

impl PrayerService {
    pub fn new() -> Self {
        Self {
            calendar: HebrewCalendarService::new(),
        }
    }

    /// Eligibility at an explicit reference date.
    pub fn is_eligible_for_aliya_on(&self, prayer: &Prayer, today: &HebrewDate) -> bool {
        match &prayer.hebrew_birth_date {
            None => true,
            Some(birth) => self.calendar.age_on(birth, today) >= BAR_MITZVAH_AGE,
        }
    }

    pub fn is_eligible_for_aliya(&self, prayer: &Prayer) -> bool {
        self.is_eligible_for_aliya_on(prayer, &self.calendar.today())
    }

    /// Flatten every card into its head prayer followed by the children.
    pub fn all_prayers_from_cards(&self, cards: &[PrayerCard]) -> Vec<Prayer> {
        let mut prayers = Vec::new();
        for card in cards {
            prayers.push(card.prayer.clone());
            prayers.extend(card.children.iter().cloned());
        }
        prayers
    }
}
