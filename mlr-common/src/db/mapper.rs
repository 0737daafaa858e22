//! Row Mapper
//!
//! Pure conversions from result rows to API records. No I/O happens here, so
//! every mapping can be exercised against literal row fixtures.
//!
//! - Dates stored as ISO-8601 text become `NaiveDate` (unparseable or NULL → `None`)
//! - Comma-delimited text columns become ordered lists of trimmed, non-empty tokens
//! - Currency columns stay `f64`

use chrono::NaiveDate;

use crate::api::types::{
    Collaboration, Contributor, ContributorDependencies, DashboardCounts, Employee, Person,
    PersonSnapshot, RecordLabel, RecordLabelDependencies, Song, SongDependencies,
};
use crate::db::models::{
    CollaborationRow, ContributorDependencyRow, ContributorRow, DashboardCountsRow, EmployeeRow,
    PersonRow, RecordLabelDependencyRow, RecordLabelRow, SongDependencyRow, SongRow,
};

/// Split a comma-delimited column into trimmed, non-empty tokens (order kept)
pub fn split_delimited(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Nullable delimited column; NULL maps to an empty list
pub fn split_optional(raw: Option<&str>) -> Vec<String> {
    raw.map(split_delimited).unwrap_or_default()
}

/// Parse an ISO-8601 date column
pub fn iso_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|text| {
        let text = text.trim();
        // Accept datetime text by keeping the date part
        let date_part = text.get(..10).unwrap_or(text);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    })
}

impl From<PersonRow> for PersonSnapshot {
    fn from(row: PersonRow) -> Self {
        PersonSnapshot {
            person: Person {
                nif: row.nif,
                name: row.name,
                date_of_birth: iso_date(row.date_of_birth.as_deref()),
                email: row.email,
                phone_number: row.phone_number,
            },
            contributor_id: row.contributor_id,
            employee_id: row.employee_id,
        }
    }
}

impl From<ContributorRow> for Contributor {
    fn from(row: ContributorRow) -> Self {
        Contributor {
            contributor_id: row.contributor_id,
            nif: row.nif,
            name: row.name,
            date_of_birth: iso_date(row.date_of_birth.as_deref()),
            email: row.email,
            phone_number: row.phone_number,
            record_label_name: split_optional(row.record_label_name.as_deref()).join(", "),
            roles: split_optional(row.roles.as_deref()),
        }
    }
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            employee_id: row.employee_id,
            nif: row.nif,
            name: row.name,
            date_of_birth: iso_date(row.date_of_birth.as_deref()),
            job_title: row.job_title,
            department: row.department,
            salary: row.salary,
            hire_date: iso_date(row.hire_date.as_deref()),
            email: row.email,
            phone_number: row.phone_number,
            record_label_id: row.record_label_id,
            record_label_name: row.record_label_name,
        }
    }
}

impl From<RecordLabelRow> for RecordLabel {
    fn from(row: RecordLabelRow) -> Self {
        RecordLabel {
            record_label_id: row.record_label_id,
            name: row.name,
            location: row.location,
            website: row.website,
            email: row.email,
            phone_number: row.phone_number,
        }
    }
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Song {
            song_id: row.song_id,
            title: row.title,
            duration: row.duration,
            release_date: iso_date(row.release_date.as_deref()),
            genres: split_optional(row.genres.as_deref()),
            contributors: split_optional(row.contributors.as_deref()),
            collaboration_name: row.collaboration_name.unwrap_or_default(),
        }
    }
}

impl From<CollaborationRow> for Collaboration {
    fn from(row: CollaborationRow) -> Self {
        Collaboration {
            collaboration_id: row.collaboration_id,
            collaboration_name: row.collaboration_name,
            start_date: iso_date(row.start_date.as_deref()),
            end_date: iso_date(row.end_date.as_deref()),
            description: row.description,
            song_id: row.song_id,
            song_title: row.song_title,
            record_labels: split_optional(row.record_labels.as_deref()),
            contributors: split_optional(row.contributors.as_deref()),
        }
    }
}

impl From<DashboardCountsRow> for DashboardCounts {
    fn from(row: DashboardCountsRow) -> Self {
        DashboardCounts {
            record_label_count: row.record_label_count,
            employee_count: row.employee_count,
            song_count: row.song_count,
            contributor_count: row.contributor_count,
            collaboration_count: row.collaboration_count,
        }
    }
}

impl From<ContributorDependencyRow> for ContributorDependencies {
    fn from(row: ContributorDependencyRow) -> Self {
        ContributorDependencies {
            collaboration_count: row.collaboration_count,
            song_count: row.song_count,
        }
    }
}

impl From<SongDependencyRow> for SongDependencies {
    fn from(row: SongDependencyRow) -> Self {
        SongDependencies {
            collaboration_count: row.collaboration_count,
            contributor_count: row.contributor_count,
        }
    }
}

impl From<RecordLabelDependencyRow> for RecordLabelDependencies {
    fn from(row: RecordLabelDependencyRow) -> Self {
        RecordLabelDependencies {
            employee_count: row.employee_count,
            collaboration_count: row.collaboration_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_delimited_trims_and_drops_empty() {
        assert_eq!(split_delimited(" Pop ,, Rock,  "), vec!["Pop", "Rock"]);
        assert!(split_delimited("").is_empty());
        assert!(split_optional(None).is_empty());
    }

    #[test]
    fn test_iso_date_variants() {
        assert_eq!(iso_date(Some("2024-01-01")), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(
            iso_date(Some("2024-01-01 10:30:00")),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(iso_date(Some("not a date")), None);
        assert_eq!(iso_date(None), None);
    }

    #[test]
    fn test_contributor_row_fixture() {
        let row = ContributorRow {
            contributor_id: 7,
            nif: "123456789".to_string(),
            name: "Ana".to_string(),
            date_of_birth: Some("1990-05-01".to_string()),
            email: None,
            phone_number: Some("555-0100".to_string()),
            record_label_name: None,
            roles: Some("Producer, Mixer".to_string()),
        };

        let value = serde_json::to_value(Contributor::from(row)).unwrap();
        assert_eq!(
            value,
            json!({
                "ContributorID": 7,
                "NIF": "123456789",
                "Name": "Ana",
                "DateOfBirth": "1990-05-01",
                "Email": null,
                "PhoneNumber": "555-0100",
                "RecordLabelName": "",
                "Roles": ["Producer", "Mixer"]
            })
        );
    }

    #[test]
    fn test_employee_row_fixture_keeps_salary_float() {
        let row = EmployeeRow {
            employee_id: 3,
            nif: "987654321".to_string(),
            name: "Rui".to_string(),
            date_of_birth: None,
            job_title: "Engineer".to_string(),
            department: Some("Studio".to_string()),
            salary: 3000.0,
            hire_date: Some("2024-01-01".to_string()),
            email: None,
            phone_number: None,
            record_label_id: 1,
            record_label_name: Some("Blue Note".to_string()),
        };

        let value = serde_json::to_value(Employee::from(row)).unwrap();
        assert_eq!(value["Salary"], json!(3000.0));
        assert_eq!(value["HireDate"], json!("2024-01-01"));
        assert_eq!(value["DateOfBirth"], json!(null));
        assert_eq!(value["RecordLabelName"], json!("Blue Note"));
    }

    #[test]
    fn test_song_row_fixture_splits_lists() {
        let row = SongRow {
            song_id: 1,
            title: "Fado".to_string(),
            duration: 215,
            release_date: None,
            genres: Some("Fado,World".to_string()),
            contributors: None,
            collaboration_name: None,
        };

        let song = Song::from(row);
        assert_eq!(song.genres, vec!["Fado", "World"]);
        assert!(song.contributors.is_empty());
        assert_eq!(song.collaboration_name, "");
        assert_eq!(song.release_date, None);
    }

    #[test]
    fn test_collaboration_row_fixture() {
        let row = CollaborationRow {
            collaboration_id: 2,
            collaboration_name: "Summer Duet".to_string(),
            start_date: Some("2024-06-01".to_string()),
            end_date: None,
            description: None,
            song_id: Some(1),
            song_title: Some("Fado".to_string()),
            record_labels: Some("Blue Note, Atlantic".to_string()),
            contributors: Some("123456789".to_string()),
        };

        let collab = Collaboration::from(row);
        assert_eq!(collab.record_labels, vec!["Blue Note", "Atlantic"]);
        assert_eq!(collab.contributors, vec!["123456789"]);
        assert_eq!(collab.start_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    }
}
