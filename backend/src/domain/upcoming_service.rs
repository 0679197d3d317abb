//! Upcoming birthdays and life events.
//!
//! Collects, for every aliya-eligible person on the roster, the next
//! occurrence of their Hebrew birthday and any life events whose date falls
//! inside a Gregorian lookahead window. Birthdays recur and are projected
//! onto the current (or next) Hebrew year; life events are taken exactly as
//! stored, with no recurrence expansion.

use chrono::{Duration, Local, NaiveDate};
use shared::{HebrewDate, Prayer, PrayerCard, UpcomingItem, UpcomingKind};

use super::calendar::HebrewCalendarService;
use super::prayer_service::PrayerService;

#[derive(Clone, Default)]
pub struct UpcomingEventsService {
    calendar: HebrewCalendarService,
    prayers: PrayerService,
}

impl UpcomingEventsService {
    pub fn new() -> Self {
        Self {
            calendar: HebrewCalendarService::new(),
            prayers: PrayerService::new(),
        }
    }

    /// Items in `[today, today + days_ahead]`, today per the system clock.
    pub fn upcoming_items(&self, cards: &[PrayerCard], days_ahead: i64) -> Vec<UpcomingItem> {
        self.upcoming_items_on(cards, days_ahead, Local::now().date_naive())
    }

    /// Items in the inclusive window `[today, today + days_ahead]`, sorted
    /// ascending by Gregorian date.
    pub fn upcoming_items_on(
        &self,
        cards: &[PrayerCard],
        days_ahead: i64,
        today: NaiveDate,
    ) -> Vec<UpcomingItem> {
        let window_end = today + Duration::days(days_ahead);
        let today_hebrew = self.calendar.from_gregorian(today);

        let mut items = Vec::new();
        for card in cards {
            self.collect(&card.prayer, card, false, today, window_end, &today_hebrew, &mut items);
            for child in &card.children {
                self.collect(child, card, true, today, window_end, &today_hebrew, &mut items);
            }
        }

        items.sort_by_key(|item| item.gregorian_date);
        items
    }

    #[allow(clippy::too_many_arguments)]
    fn collect(
        &self,
        prayer: &Prayer,
        card: &PrayerCard,
        is_child: bool,
        today: NaiveDate,
        window_end: NaiveDate,
        today_hebrew: &HebrewDate,
        items: &mut Vec<UpcomingItem>,
    ) {
        if !self.prayers.is_eligible_for_aliya_on(prayer, today_hebrew) {
            return;
        }

        if let Some(birth) = &prayer.hebrew_birth_date {
            let next_birthday = self.calendar.next_birthday_occurrence_from(birth, today);
            if next_birthday >= today && next_birthday <= window_end {
                // The age the person is turning, not their current age.
                let age = self.calendar.age_on(birth, today_hebrew) + 1;
                items.push(UpcomingItem {
                    kind: UpcomingKind::Birthday,
                    gregorian_date: next_birthday,
                    hebrew_date: self.calendar.from_gregorian(next_birthday),
                    prayer: prayer.clone(),
                    card: card.clone(),
                    is_child,
                    event: None,
                    age: Some(age),
                });
            }
        }

        for event in &prayer.events {
            let event_date = self.calendar.to_gregorian(&event.hebrew_date);
            if event_date >= today && event_date <= window_end {
                items.push(UpcomingItem {
                    kind: UpcomingKind::Event,
                    gregorian_date: event_date,
                    hebrew_date: event.hebrew_date,
                    prayer: prayer.clone(),
                    card: card.clone(),
                    is_child,
                    event: Some(event.clone()),
                    age: None,
                });
            }
        }
    }
}
