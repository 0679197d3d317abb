//! Aliya history and its export shaping.
//!
//! Two stages. The builder walks every eligible person's aliyot (synthesized
//! from the groups' assignment maps) and buckets them into report columns:
//! one column per category, plus one per aliya type no category claims. The
//! shaper then turns that, together with the upcoming-events window, into
//! the fixed tabular shape the PDF/XLSX renderers consume verbatim: ordered
//! columns, pre-formatted names, and the weeks-since-last-aliya metric.
//!
//! Missing or partial data always degrades to sentinels (-1, "-", empty
//! string); nothing in this module returns an error.

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use shared::{
    AliyaGroup, AliyaHistoryExport, AliyaType, AliyaTypeCategory, CategoryColumn,
    CategoryColumnData, ColumnDefinition, ExportPrayerRow, ExportUpcomingEventRow, HebrewDate,
    Prayer, PrayerAliyaHistory, PrayerCard, PrayerEventType, UpcomingItem, UpcomingKind,
};

use super::aliya_service::AliyaService;
use super::calendar::HebrewCalendarService;
use super::prayer_service::PrayerService;

#[derive(Clone, Default)]
pub struct AliyaHistoryService {
    calendar: HebrewCalendarService,
    prayers: PrayerService,
    aliyot: AliyaService,
}

impl AliyaHistoryService {
    pub fn new() -> Self {
        Self {
            calendar: HebrewCalendarService::new(),
            prayers: PrayerService::new(),
            aliyot: AliyaService::new(),
        }
    }

    /// Earliest group date in the dataset, the baseline of the weeks metric.
    pub fn earliest_aliya_date(&self, groups: &[AliyaGroup]) -> Option<HebrewDate> {
        let mut earliest: Option<HebrewDate> = None;
        for group in groups {
            match earliest {
                Some(current) if !current.is_after(&group.hebrew_date) => {}
                _ => earliest = Some(group.hebrew_date),
            }
        }
        earliest
    }

    /// Event-type id to display name, for resolving upcoming-event rows.
    pub fn event_type_name_map(
        &self,
        event_types: &[PrayerEventType],
    ) -> HashMap<String, String> {
        event_types
            .iter()
            .map(|event_type| (event_type.id.clone(), event_type.display_name.clone()))
            .collect()
    }

    /// The report columns in catalog order before sorting: every category,
    /// then every aliya type no category claims.
    pub fn export_columns(
        &self,
        types: &[AliyaType],
        categories: &[AliyaTypeCategory],
    ) -> Vec<ColumnDefinition> {
        let mut columns: Vec<ColumnDefinition> = categories
            .iter()
            .map(|category| ColumnDefinition {
                id: category.id.clone(),
                name: category.name.clone(),
                is_category: true,
                display_order: category.display_order,
            })
            .collect();

        for aliya_type in types {
            let categorized = categories
                .iter()
                .any(|category| category.aliya_type_ids.contains(&aliya_type.id));
            if !categorized {
                columns.push(ColumnDefinition {
                    id: aliya_type.id.clone(),
                    name: aliya_type.display_name.clone(),
                    is_category: false,
                    display_order: None,
                });
            }
        }
        columns
    }

    pub fn build_history(
        &self,
        cards: &[PrayerCard],
        groups: &[AliyaGroup],
        types: &[AliyaType],
        categories: &[AliyaTypeCategory],
    ) -> Vec<PrayerAliyaHistory> {
        self.build_history_on(cards, groups, types, categories, &self.calendar.today())
    }

    /// Per-person aliya history over all report columns, oldest last aliya
    /// first; people with no aliyot sort last. Only aliya-eligible persons
    /// appear.
    pub fn build_history_on(
        &self,
        cards: &[PrayerCard],
        groups: &[AliyaGroup],
        types: &[AliyaType],
        categories: &[AliyaTypeCategory],
        today: &HebrewDate,
    ) -> Vec<PrayerAliyaHistory> {
        let group_map: HashMap<&str, &AliyaGroup> =
            groups.iter().map(|g| (g.id.as_str(), g)).collect();
        let column_ids: Vec<String> = self
            .export_columns(types, categories)
            .into_iter()
            .map(|column| column.id)
            .collect();

        let mut rows = Vec::new();
        for card in cards {
            if self.prayers.is_eligible_for_aliya_on(&card.prayer, today) {
                rows.push(self.history_for_prayer(
                    &card.prayer,
                    card,
                    false,
                    groups,
                    &group_map,
                    &column_ids,
                    categories,
                ));
            }
            for child in &card.children {
                if self.prayers.is_eligible_for_aliya_on(child, today) {
                    rows.push(self.history_for_prayer(
                        child,
                        card,
                        true,
                        groups,
                        &group_map,
                        &column_ids,
                        categories,
                    ));
                }
            }
        }

        rows.sort_by(|a, b| {
            match (a.overall_last_aliya_date, b.overall_last_aliya_date) {
                (None, None) => std::cmp::Ordering::Equal,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (Some(_), None) => std::cmp::Ordering::Less,
                (Some(first), Some(second)) => first.cmp(&second),
            }
        });
        rows
    }

    #[allow(clippy::too_many_arguments)]
    fn history_for_prayer(
        &self,
        prayer: &Prayer,
        card: &PrayerCard,
        is_child: bool,
        groups: &[AliyaGroup],
        group_map: &HashMap<&str, &AliyaGroup>,
        column_ids: &[String],
        categories: &[AliyaTypeCategory],
    ) -> PrayerAliyaHistory {
        let mut columns: HashMap<String, CategoryColumn> = column_ids
            .iter()
            .map(|id| (id.clone(), CategoryColumn::default()))
            .collect();
        let mut overall_last: Option<HebrewDate> = None;

        let aliyot = self.aliyot.aliyot_for_prayer(&prayer.id, groups);
        for aliya in &aliyot {
            let Some(group) = group_map.get(aliya.aliya_group_id.as_str()) else {
                continue;
            };
            let group_date = group.hebrew_date;

            // An aliya counts into every category containing its type, or
            // into its own type column when none does.
            let mut containing: Vec<&str> = categories
                .iter()
                .filter(|category| category.aliya_type_ids.contains(&aliya.aliya_type_id))
                .map(|category| category.id.as_str())
                .collect();
            if containing.is_empty() {
                containing.push(aliya.aliya_type_id.as_str());
            }

            for column_id in containing {
                let column = columns.entry(column_id.to_string()).or_default();
                column.count += 1;
                if column
                    .last_aliya_date
                    .map_or(true, |last| group_date.is_after(&last))
                {
                    column.last_aliya_date = Some(group_date);
                    column.last_parasha = Some(self.calendar.parasha(&group_date));
                }
            }

            if overall_last.map_or(true, |last| group_date.is_after(&last)) {
                overall_last = Some(group_date);
            }
        }

        PrayerAliyaHistory {
            prayer: prayer.clone(),
            card: card.clone(),
            is_child,
            category_columns: columns,
            overall_last_aliya_date: overall_last,
            total_aliyot: aliyot.len(),
        }
    }

    pub fn prepare_export(
        &self,
        histories: &[PrayerAliyaHistory],
        columns: &[ColumnDefinition],
        upcoming: &[UpcomingItem],
        event_type_names: &HashMap<String, String>,
        categories: &[AliyaTypeCategory],
        earliest_aliya_date: Option<&HebrewDate>,
    ) -> AliyaHistoryExport {
        self.prepare_export_on(
            histories,
            columns,
            upcoming,
            event_type_names,
            categories,
            earliest_aliya_date,
            Local::now().date_naive(),
        )
    }

    /// Shape everything for the renderers. This is the single place names
    /// and cell values are formatted; downstream consumes them verbatim.
    #[allow(clippy::too_many_arguments)]
    pub fn prepare_export_on(
        &self,
        histories: &[PrayerAliyaHistory],
        columns: &[ColumnDefinition],
        upcoming: &[UpcomingItem],
        event_type_names: &HashMap<String, String>,
        categories: &[AliyaTypeCategory],
        earliest_aliya_date: Option<&HebrewDate>,
        today: NaiveDate,
    ) -> AliyaHistoryExport {
        let category_order: HashMap<&str, u32> = categories
            .iter()
            .map(|category| {
                (
                    category.id.as_str(),
                    category.display_order.unwrap_or(u32::MAX),
                )
            })
            .collect();

        // Categories first by display order, missing orders last; then the
        // uncategorized types in their incoming (stable) order.
        let mut ordered: Vec<ColumnDefinition> = columns
            .iter()
            .map(|column| {
                let mut column = column.clone();
                if column.is_category {
                    column.display_order =
                        Some(*category_order.get(column.id.as_str()).unwrap_or(&u32::MAX));
                }
                column
            })
            .collect();
        ordered.sort_by_key(|column| {
            (
                !column.is_category,
                column.display_order.unwrap_or(u32::MAX),
            )
        });

        let weeks_since = |date: &HebrewDate| -> i64 {
            (today - self.calendar.to_gregorian(date))
                .num_days()
                .div_euclid(7)
        };

        let mut prayer_rows: Vec<ExportPrayerRow> = histories
            .iter()
            .map(|history| {
                let mut category_data = HashMap::new();
                for (column_id, column) in &history.category_columns {
                    let weeks = match earliest_aliya_date {
                        None => -1,
                        Some(earliest) => {
                            let since_earliest = weeks_since(earliest);
                            match &column.last_aliya_date {
                                // Expressed as an offset from the dataset's
                                // earliest date, not a direct day count.
                                Some(last) => since_earliest - weeks_since(last),
                                None => since_earliest,
                            }
                        }
                    };
                    category_data.insert(
                        column_id.clone(),
                        CategoryColumnData {
                            count: column.count,
                            weeks_since_last_aliya: weeks,
                        },
                    );
                }

                ExportPrayerRow {
                    prayer_name: display_name(&history.prayer, &history.card, history.is_child),
                    is_child: history.is_child,
                    category_data,
                }
            })
            .collect();

        // Longest-waiting first, judged by the first column.
        if let Some(first_column) = ordered.first() {
            prayer_rows.sort_by_key(|row| {
                std::cmp::Reverse(
                    row.category_data
                        .get(&first_column.id)
                        .map_or(-1, |data| data.weeks_since_last_aliya),
                )
            });
        }

        let upcoming_events = upcoming
            .iter()
            .map(|item| self.export_upcoming_row(item, event_type_names))
            .collect();

        AliyaHistoryExport {
            columns: ordered,
            prayer_rows,
            upcoming_events,
            generated_date: self
                .calendar
                .format_hebrew_date(&self.calendar.from_gregorian(today)),
        }
    }

    fn export_upcoming_row(
        &self,
        item: &UpcomingItem,
        event_type_names: &HashMap<String, String>,
    ) -> ExportUpcomingEventRow {
        let event_type = match item.kind {
            UpcomingKind::Birthday => "יום הולדת".to_string(),
            UpcomingKind::Event => item
                .event
                .as_ref()
                .map(|event| {
                    event_type_names
                        .get(&event.event_type_id)
                        .cloned()
                        .unwrap_or_else(|| event.event_type_id.clone())
                })
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "אירוע".to_string()),
        };

        ExportUpcomingEventRow {
            prayer_name: display_name(&item.prayer, &item.card, item.is_child),
            parasha: self.calendar.parasha(&item.hebrew_date),
            event_type,
            age: item
                .age
                .map(|age| age.to_string())
                .unwrap_or_else(|| "-".to_string()),
            notes: item
                .event
                .as_ref()
                .and_then(|event| event.notes.clone())
                .filter(|notes| !notes.is_empty())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// "משה כהן בן של דוד כהן" for children, the plain full name otherwise.
fn display_name(prayer: &Prayer, card: &PrayerCard, is_child: bool) -> String {
    if is_child {
        format!("{} בן של {}", prayer.full_name(), card.prayer.full_name())
    } else {
        prayer.full_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::CHESHVAN;

    fn service() -> AliyaHistoryService {
        AliyaHistoryService::new()
    }

    fn category(name: &str, display_order: Option<u32>, type_ids: &[&str]) -> AliyaTypeCategory {
        let mut category = AliyaTypeCategory::new(name);
        category.display_order = display_order;
        category.aliya_type_ids = type_ids.iter().map(|id| id.to_string()).collect();
        category
    }

    fn aliya_type(id: &str, name: &str) -> AliyaType {
        let mut aliya_type = AliyaType::new(name, 1);
        aliya_type.id = id.to_string();
        aliya_type
    }

    #[test]
    fn test_earliest_aliya_date_is_lexicographic_minimum() {
        let service = service();
        let groups = vec![
            AliyaGroup::new("ב", HebrewDate::new(5785, 8, 2)),
            AliyaGroup::new("א", HebrewDate::new(5784, 12, 20)),
            AliyaGroup::new("ג", HebrewDate::new(5785, 7, 24)),
        ];
        assert_eq!(
            service.earliest_aliya_date(&groups),
            Some(HebrewDate::new(5784, 12, 20))
        );
        assert_eq!(service.earliest_aliya_date(&[]), None);
    }

    #[test]
    fn test_export_columns_merges_categories_and_unclaimed_types() {
        let service = service();
        let types = vec![
            aliya_type("rishon", "ראשון"),
            aliya_type("maftir", "מפטיר"),
        ];
        let categories = vec![category("שבת", Some(1), &["rishon"])];

        let columns = service.export_columns(&types, &categories);
        assert_eq!(columns.len(), 2);
        assert!(columns[0].is_category);
        assert_eq!(columns[1].id, "maftir");
        assert!(!columns[1].is_category);
    }

    #[test]
    fn test_build_history_buckets_aliyot_into_categories() {
        let service = service();
        let head = Prayer::new("אברהם", "כהן");
        let head_id = head.id.clone();
        let cards = vec![PrayerCard::new(head, "cohen@example.com")];

        let older = AliyaGroup::new("שבת בראשית", HebrewDate::new(5785, 7, 24))
            .set_assignment("rishon", head_id.clone());
        let newer = AliyaGroup::new("שבת נח", HebrewDate::new(5785, 8, 2))
            .set_assignment("rishon", head_id.clone())
            .set_assignment("maftir", head_id.clone());
        let groups = vec![older, newer];

        let types = vec![
            aliya_type("rishon", "ראשון"),
            aliya_type("maftir", "מפטיר"),
        ];
        let categories = vec![category("שבת", Some(1), &["rishon"])];

        let rows = service.build_history_on(
            &cards,
            &groups,
            &types,
            &categories,
            &HebrewDate::new(5785, 8, 10),
        );
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.total_aliyot, 3);
        assert_eq!(
            row.overall_last_aliya_date,
            Some(HebrewDate::new(5785, 8, 2))
        );

        // Both rishon aliyot land in the category column, latest date wins.
        let shabbat_column = row.category_columns.values().find(|c| c.count == 2).unwrap();
        assert_eq!(
            shabbat_column.last_aliya_date,
            Some(HebrewDate::new(5785, 8, 2))
        );
        // The unclaimed maftir type got its own column.
        let maftir_column = &row.category_columns["maftir"];
        assert_eq!(maftir_column.count, 1);
    }

    #[test]
    fn test_build_history_skips_ineligible_and_sorts_oldest_first() {
        let service = service();
        let head = Prayer::new("אברהם", "כהן");
        let head_id = head.id.clone();
        let minor = Prayer::new("יצחק", "כהן")
            .with_birth_date(HebrewDate::new(5780, CHESHVAN, 1));
        let quiet = Prayer::new("משה", "לוי");
        let cards = vec![
            PrayerCard::new(head, "cohen@example.com").add_child(minor),
            PrayerCard::new(quiet, "levi@example.com"),
        ];

        let groups = vec![AliyaGroup::new("שבת נח", HebrewDate::new(5785, 8, 2))
            .set_assignment("rishon", head_id.clone())];

        let rows = service.build_history_on(
            &cards,
            &groups,
            &[aliya_type("rishon", "ראשון")],
            &[],
            &HebrewDate::new(5785, 8, 10),
        );

        // The minor is filtered out; the head has an aliya and sorts before
        // the prayer with none.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].prayer.id, head_id);
        assert!(rows[1].overall_last_aliya_date.is_none());
    }

    #[test]
    fn test_prepare_export_orders_rows_by_first_column_weeks() {
        let service = service();
        let calendar = HebrewCalendarService::new();
        let today = calendar.to_gregorian(&HebrewDate::new(5785, 8, 10));

        let column = ColumnDefinition {
            id: "shabbat".to_string(),
            name: "שבת".to_string(),
            is_category: true,
            display_order: Some(1),
        };

        // Earliest date exactly 21 weeks back, so a last aliya N weeks ago
        // produces the cell value 21 - N.
        let earliest = calendar.from_gregorian(today - chrono::Duration::days(21 * 7));
        let make_history = |name: &str, weeks_back: i64| {
            let prayer = Prayer::new(name, "כהן");
            let card = PrayerCard::new(prayer.clone(), "x@example.com");
            let last = calendar.from_gregorian(today - chrono::Duration::days(weeks_back * 7));
            let mut columns = HashMap::new();
            columns.insert(
                "shabbat".to_string(),
                CategoryColumn {
                    last_aliya_date: Some(last),
                    last_parasha: None,
                    count: 1,
                },
            );
            PrayerAliyaHistory {
                prayer,
                card,
                is_child: false,
                category_columns: columns,
                overall_last_aliya_date: Some(last),
                total_aliyot: 1,
            }
        };

        // Cell values 5, 20 and 1 in insertion order.
        let histories = vec![
            make_history("חמש", 16),
            make_history("עשרים", 1),
            make_history("אחת", 20),
        ];

        let export = service.prepare_export_on(
            &histories,
            &[column],
            &[],
            &HashMap::new(),
            &[],
            Some(&earliest),
            today,
        );

        let weeks: Vec<i64> = export
            .prayer_rows
            .iter()
            .map(|row| row.category_data["shabbat"].weeks_since_last_aliya)
            .collect();
        assert_eq!(weeks, vec![20, 5, 1]);
        assert_eq!(export.prayer_rows[0].prayer_name, "עשרים כהן");
        assert_eq!(export.prayer_rows[2].prayer_name, "אחת כהן");
    }

    #[test]
    fn test_weeks_metric_is_offset_from_earliest() {
        let service = service();
        let calendar = HebrewCalendarService::new();
        let earliest = HebrewDate::new(5784, 7, 1);
        let today = calendar.to_gregorian(&earliest) + chrono::Duration::days(70);

        let prayer = Prayer::new("דוד", "לוי");
        let card = PrayerCard::new(prayer.clone(), "levi@example.com");

        let mut with_last = HashMap::new();
        with_last.insert(
            "col".to_string(),
            CategoryColumn {
                // Last aliya three weeks before today.
                last_aliya_date: Some(calendar.from_gregorian(today - chrono::Duration::days(21))),
                last_parasha: None,
                count: 2,
            },
        );
        let mut without_last = HashMap::new();
        without_last.insert("col".to_string(), CategoryColumn::default());

        let histories = vec![
            PrayerAliyaHistory {
                prayer: prayer.clone(),
                card: card.clone(),
                is_child: false,
                category_columns: with_last,
                overall_last_aliya_date: None,
                total_aliyot: 2,
            },
            PrayerAliyaHistory {
                prayer,
                card,
                is_child: false,
                category_columns: without_last,
                overall_last_aliya_date: None,
                total_aliyot: 0,
            },
        ];
        let column = ColumnDefinition {
            id: "col".to_string(),
            name: "עמודה".to_string(),
            is_category: false,
            display_order: None,
        };

        let export = service.prepare_export_on(
            &histories,
            &[column.clone()],
            &[],
            &HashMap::new(),
            &[],
            Some(&earliest),
            today,
        );
        // 10 weeks since earliest: no aliya scores the full 10, an aliya 3
        // weeks ago scores 10 - 3 = 7. The empty column sorts first.
        let values: Vec<i64> = export
            .prayer_rows
            .iter()
            .map(|row| row.category_data["col"].weeks_since_last_aliya)
            .collect();
        assert_eq!(values, vec![10, 7]);

        // Without a dataset-wide earliest date everything is -1.
        let export = service.prepare_export_on(
            &histories,
            &[column],
            &[],
            &HashMap::new(),
            &[],
            None,
            today,
        );
        assert!(export
            .prayer_rows
            .iter()
            .all(|row| row.category_data["col"].weeks_since_last_aliya == -1));
    }

    #[test]
    fn test_prepare_export_sorts_categories_before_loose_types() {
        let service = service();
        let categories = vec![
            category("שני", Some(2), &[]),
            category("ראשון", Some(1), &[]),
            category("בלי סדר", None, &[]),
        ];
        let columns = vec![
            ColumnDefinition {
                id: "loose".to_string(),
                name: "מפטיר".to_string(),
                is_category: false,
                display_order: None,
            },
            ColumnDefinition {
                id: categories[0].id.clone(),
                name: "שני".to_string(),
                is_category: true,
                display_order: None,
            },
            ColumnDefinition {
                id: categories[1].id.clone(),
                name: "ראשון".to_string(),
                is_category: true,
                display_order: None,
            },
            ColumnDefinition {
                id: categories[2].id.clone(),
                name: "בלי סדר".to_string(),
                is_category: true,
                display_order: None,
            },
        ];

        let export = service.prepare_export_on(
            &[],
            &columns,
            &[],
            &HashMap::new(),
            &categories,
            None,
            NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
        );

        let names: Vec<&str> = export.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ראשון", "שני", "בלי סדר", "מפטיר"]);
    }

    #[test]
    fn test_export_upcoming_rows_fall_back_to_sentinels() {
        let service = service();
        let calendar = HebrewCalendarService::new();
        let prayer = Prayer::new("משה", "כהן");
        let head = Prayer::new("דוד", "כהן");
        let card = PrayerCard::new(head, "cohen@example.com");
        let date = HebrewDate::new(5785, 8, 5);

        let mut azkara = PrayerEventType::new("אזכרה", shared::RecurrenceType::Yearly);
        azkara.id = "azkara".to_string();
        let names = service.event_type_name_map(&[azkara]);

        let known_event = UpcomingItem {
            kind: UpcomingKind::Event,
            gregorian_date: calendar.to_gregorian(&date),
            hebrew_date: date,
            prayer: prayer.clone(),
            card: card.clone(),
            is_child: true,
            event: Some(shared::PrayerEvent::new("azkara", date)),
            age: None,
        };
        let unknown_event = UpcomingItem {
            event: Some(shared::PrayerEvent::new("mystery", date)),
            is_child: false,
            ..known_event.clone()
        };
        let birthday = UpcomingItem {
            kind: UpcomingKind::Birthday,
            event: None,
            age: Some(45),
            ..known_event.clone()
        };

        let export = service.prepare_export_on(
            &[],
            &[],
            &[known_event, unknown_event, birthday],
            &names,
            &[],
            None,
            calendar.to_gregorian(&date),
        );

        let rows = &export.upcoming_events;
        assert_eq!(rows[0].prayer_name, "משה כהן בן של דוד כהן");
        assert_eq!(rows[0].event_type, "אזכרה");
        assert_eq!(rows[0].age, "-");
        assert_eq!(rows[0].notes, "-");
        // Unknown type ids fall back to the raw id.
        assert_eq!(rows[1].event_type, "mystery");
        assert_eq!(rows[1].prayer_name, "משה כהן");
        assert_eq!(rows[2].event_type, "יום הולדת");
        assert_eq!(rows[2].age, "45");
        assert!(!export.generated_date.is_empty());
    }
}
