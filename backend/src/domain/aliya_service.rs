//! Joining aliya assignments against the prayer roster.
//!
//! Groups persist only an aliya-type to prayer-id map; the per-person view
//! is synthesized here. The store enforces no referential integrity, so an
//! assignment may point at a prayer that no longer exists. Such rows are
//! dropped from joined results, never surfaced as errors.

use std::collections::HashMap;

use shared::{Aliya, AliyaGroup, AliyaWithContext, Prayer, PrayerCard};

#[derive(Clone, Default)]
pub struct AliyaService;

impl AliyaService {
    pub fn new() -> Self {
        Self
    }

    /// Every assignment across all groups, resolved to its prayer and card.
    /// No ordering guarantee; callers sort by catalog order or group date.
    pub fn flatten(&self, groups: &[AliyaGroup], cards: &[PrayerCard]) -> Vec<AliyaWithContext> {
        let index = Self::prayer_index(cards);

        let mut result = Vec::new();
        for group in groups {
            for (aliya_type_id, prayer_id) in &group.assignments {
                match index.get(prayer_id.as_str()) {
                    Some((prayer, card, is_child)) => result.push(AliyaWithContext {
                        aliya: Aliya {
                            aliya_group_id: group.id.clone(),
                            aliya_type_id: aliya_type_id.clone(),
                        },
                        prayer: (*prayer).clone(),
                        card: (*card).clone(),
                        is_child: *is_child,
                    }),
                    None => log::debug!(
                        "group {} assignment {} references missing prayer {}",
                        group.id,
                        aliya_type_id,
                        prayer_id
                    ),
                }
            }
        }
        result
    }

    /// All aliyot of one prayer, scanned out of the groups' assignment maps.
    pub fn aliyot_for_prayer(&self, prayer_id: &str, groups: &[AliyaGroup]) -> Vec<Aliya> {
        let mut result = Vec::new();
        for group in groups {
            for (aliya_type_id, assigned_prayer_id) in &group.assignments {
                if assigned_prayer_id == prayer_id {
                    result.push(Aliya {
                        aliya_group_id: group.id.clone(),
                        aliya_type_id: aliya_type_id.clone(),
                    });
                }
            }
        }
        result
    }

    /// Index of prayer id to (prayer, owning card, is_child) over heads and
    /// children of all cards.
    fn prayer_index(cards: &[PrayerCard]) -> HashMap<&str, (&Prayer, &PrayerCard, bool)> {
        let mut index = HashMap::new();
        for card in cards {
            index.insert(card.prayer.id.as_str(), (&card.prayer, card, false));
            for child in &card.children {
                index.insert(child.id.as_str(), (child, card, true));
            }
        }
        index
    }
}
