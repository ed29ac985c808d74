//! Office-hours table.
//!
//! Groups each reviewer's office-hour slot by day, days in first-seen
//! order. Missing details read as `TBD`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::ReviewerRecord;

const TBD: &str = "TBD";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeHours {
    pub office_hours: Vec<OfficeHoursDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeHoursDay {
    pub day: String,
    pub slots: Vec<OfficeHoursSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeHoursSlot {
    pub name: String,
    pub time: String,
    pub location: String,
}

/// Builds the table from reviewer records.
pub fn group_by_day<'a>(records: impl IntoIterator<Item = &'a ReviewerRecord>) -> OfficeHours {
    let mut days: IndexMap<String, Vec<OfficeHoursSlot>> = IndexMap::new();
    for r in records {
        let day = r.oh_days.as_deref().unwrap_or(TBD).to_string();
        days.entry(day).or_default().push(OfficeHoursSlot {
            name: r.display_name().to_string(),
            time: r.oh_times.as_deref().unwrap_or(TBD).to_string(),
            location: r.oh_location.as_deref().unwrap_or(TBD).to_string(),
        });
    }
    OfficeHours {
        office_hours: days
            .into_iter()
            .map(|(day, slots)| OfficeHoursDay { day, slots })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_day() {
        let records = vec![
            ReviewerRecord::new("a").with_name("Ann").with_office_hours("Tuesday", "1-2pm", "Lab 1"),
            ReviewerRecord::new("b").with_name("Ben"),
            ReviewerRecord::new("c").with_office_hours("Tuesday", "3-4pm", "Lab 2"),
        ];
        let table = group_by_day(&records);

        let days: Vec<&str> = table.office_hours.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(days, vec!["Tuesday", "TBD"]);

        let tuesday = &table.office_hours[0].slots;
        assert_eq!(tuesday.len(), 2);
        assert_eq!(tuesday[1].name, "c");
        assert_eq!(tuesday[1].location, "Lab 2");

        let tbd = &table.office_hours[1].slots[0];
        assert_eq!((tbd.name.as_str(), tbd.time.as_str()), ("Ben", "TBD"));
    }

    #[test]
    fn test_yaml_shape() {
        let records = vec![ReviewerRecord::new("a").with_name("Ann").with_office_hours("Mon", "9am", "Zoom")];
        let yaml = serde_yaml::to_string(&group_by_day(&records)).unwrap();
        assert_eq!(
            yaml,
            "office_hours:\n- day: Mon\n  slots:\n  - name: Ann\n    time: 9am\n    location: Zoom\n"
        );
    }
}
