//! JSON record and payload types
//!
//! Records are what handlers return; payloads are what clients submit.
//! Field names follow the PascalCase keys of the public HTTP surface.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::db::mapper::split_delimited;

// ============================================================================
// Delimited lists
// ============================================================================

/// Ordered list of trimmed, non-empty, de-duplicated tokens
///
/// Deserializes from either a comma-delimited string (`"Producer, Mixer"`)
/// or a JSON array of strings; always serializes as an array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimitedList(Vec<String>);

impl DelimitedList {
    pub fn parse(raw: &str) -> Self {
        Self::from_tokens(split_delimited(raw))
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut items: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() || items.iter().any(|existing| existing == token) {
                continue;
            }
            items.push(token.to_string());
        }
        Self(items)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }

    /// Storage form: tokens joined with ", "
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl Serialize for DelimitedList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DelimitedList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Items(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => DelimitedList::parse(&text),
            Raw::Items(items) => DelimitedList::from_tokens(items),
        })
    }
}

/// Trim an optional string; blank collapses to `None`
///
/// Blank optional fields are stored as NULL, so `""` and a missing value
/// compare equal during conflict detection.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Optional date that accepts a blank string as absent
///
/// Form-built bodies send `""` for an empty date input.
pub fn blank_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{raw}': {e}"))),
    }
}

// ============================================================================
// Person
// ============================================================================

/// Natural person identified by NIF
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    #[serde(rename = "NIF")]
    pub nif: String,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl Person {
    /// Field-by-field identity comparison (NIF excluded)
    ///
    /// NULL equals NULL; any single differing field is a conflict.
    pub fn same_fields(&self, other: &Person) -> bool {
        self.name == other.name
            && self.date_of_birth == other.date_of_birth
            && self.email == other.email
            && self.phone_number == other.phone_number
    }
}

/// Stored person plus the role records attached to it
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PersonSnapshot {
    #[serde(flatten)]
    pub person: Person,
    #[serde(rename = "ContributorID")]
    pub contributor_id: Option<i64>,
    #[serde(rename = "EmployeeID")]
    pub employee_id: Option<i64>,
}

/// Body of PUT /api/persons/{nif}
///
/// Absent fields keep their stored value; `NewNIF` renames the person and
/// cascades to its role records.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonUpdatePayload {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_date")]
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(rename = "NewNIF")]
    pub new_nif: Option<String>,
}

impl PersonUpdatePayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date_of_birth.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.new_nif.is_none()
    }
}

/// Person part shared by the Contributor and Employee payloads
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonFieldsPayload {
    #[serde(rename = "NIF")]
    pub nif: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_date")]
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl PersonFieldsPayload {
    /// Names of missing person fields (NIF only when `nif_required`)
    fn missing(&self, nif_required: bool, missing: &mut Vec<&'static str>) {
        if nif_required && normalize_optional(self.nif.clone()).is_none() {
            missing.push("NIF");
        }
        if normalize_optional(self.name.clone()).is_none() {
            missing.push("Name");
        }
    }

    /// Normalized person; call only after `missing` reported nothing
    fn into_person(self) -> Person {
        Person {
            nif: normalize_optional(self.nif).unwrap_or_default(),
            name: normalize_optional(self.name).unwrap_or_default(),
            date_of_birth: self.date_of_birth,
            email: normalize_optional(self.email),
            phone_number: normalize_optional(self.phone_number),
        }
    }
}

/// Validation failure naming every missing or invalid field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFields(pub Vec<&'static str>);

impl std::fmt::Display for InvalidFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Missing or invalid fields: {}", self.0.join(", "))
    }
}

// ============================================================================
// Contributor
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Contributor {
    #[serde(rename = "ContributorID")]
    pub contributor_id: i64,
    #[serde(rename = "NIF")]
    pub nif: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DateOfBirth")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: Option<String>,
    #[serde(rename = "RecordLabelName")]
    pub record_label_name: String,
    #[serde(rename = "Roles")]
    pub roles: Vec<String>,
}

/// Role-specific Contributor fields
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ContributorFields {
    pub roles: DelimitedList,
}

/// Body of POST/PUT /api/contributors
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContributorPayload {
    #[serde(flatten)]
    pub person: PersonFieldsPayload,
    #[serde(rename = "Roles")]
    pub roles: Option<DelimitedList>,
}

impl ContributorPayload {
    /// Validate for creation (NIF required) or update (NIF optional)
    pub fn validate(
        self,
        nif_required: bool,
    ) -> Result<(Person, ContributorFields), InvalidFields> {
        let mut missing = Vec::new();
        self.person.missing(nif_required, &mut missing);
        let roles = self.roles.unwrap_or_default();
        if roles.is_empty() {
            missing.push("Roles");
        }
        if !missing.is_empty() {
            return Err(InvalidFields(missing));
        }
        Ok((self.person.into_person(), ContributorFields { roles }))
    }
}

// ============================================================================
// Employee
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Employee {
    #[serde(rename = "EmployeeID")]
    pub employee_id: i64,
    #[serde(rename = "NIF")]
    pub nif: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DateOfBirth")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "JobTitle")]
    pub job_title: String,
    #[serde(rename = "Department")]
    pub department: Option<String>,
    #[serde(rename = "Salary")]
    pub salary: f64,
    #[serde(rename = "HireDate")]
    pub hire_date: Option<NaiveDate>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: Option<String>,
    #[serde(rename = "RecordLabelID")]
    pub record_label_id: i64,
    #[serde(rename = "RecordLabelName")]
    pub record_label_name: Option<String>,
}

/// Role-specific Employee fields
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmployeeFields {
    #[serde(rename = "JobTitle")]
    pub job_title: String,
    #[serde(rename = "Department")]
    pub department: Option<String>,
    #[serde(rename = "Salary")]
    pub salary: f64,
    #[serde(rename = "HireDate")]
    pub hire_date: NaiveDate,
    #[serde(rename = "RecordLabelID")]
    pub record_label_id: i64,
}

/// Body of POST/PUT /api/employees
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeePayload {
    #[serde(flatten)]
    pub person: PersonFieldsPayload,
    #[serde(rename = "JobTitle")]
    pub job_title: Option<String>,
    #[serde(rename = "Department")]
    pub department: Option<String>,
    #[serde(rename = "Salary")]
    pub salary: Option<f64>,
    #[serde(rename = "HireDate", default, deserialize_with = "blank_date")]
    pub hire_date: Option<NaiveDate>,
    #[serde(rename = "RecordLabelID")]
    pub record_label_id: Option<i64>,
}

impl EmployeePayload {
    /// Validate for creation (NIF required) or update (NIF optional)
    pub fn validate(self, nif_required: bool) -> Result<(Person, EmployeeFields), InvalidFields> {
        let mut missing = Vec::new();
        self.person.missing(nif_required, &mut missing);
        let job_title = normalize_optional(self.job_title);
        if job_title.is_none() {
            missing.push("JobTitle");
        }
        match self.salary {
            None => missing.push("Salary"),
            Some(salary) if !salary.is_finite() || salary < 0.0 => missing.push("Salary"),
            Some(_) => {}
        }
        if self.hire_date.is_none() {
            missing.push("HireDate");
        }
        if self.record_label_id.is_none() {
            missing.push("RecordLabelID");
        }

        match (job_title, self.salary, self.hire_date, self.record_label_id) {
            (Some(job_title), Some(salary), Some(hire_date), Some(record_label_id))
                if missing.is_empty() =>
            {
                Ok((
                    self.person.into_person(),
                    EmployeeFields {
                        job_title,
                        department: normalize_optional(self.department),
                        salary,
                        hire_date,
                        record_label_id,
                    },
                ))
            }
            _ => Err(InvalidFields(missing)),
        }
    }
}

// ============================================================================
// Record label
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordLabel {
    #[serde(rename = "RecordLabelID")]
    pub record_label_id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Website")]
    pub website: Option<String>,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: Option<String>,
}

/// Body of POST/PUT /api/record_labels
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordLabelPayload {
    pub name: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

/// Validated record label input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLabelInput {
    pub name: String,
    pub location: Option<String>,
    pub website: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
}

impl RecordLabelPayload {
    pub fn validate(self) -> Result<RecordLabelInput, InvalidFields> {
        match (normalize_optional(self.name), normalize_optional(self.email)) {
            (Some(name), Some(email)) => Ok(RecordLabelInput {
                name,
                location: normalize_optional(self.location),
                website: normalize_optional(self.website),
                email,
                phone_number: normalize_optional(self.phone_number),
            }),
            (name, email) => {
                let mut missing = Vec::new();
                if name.is_none() {
                    missing.push("Name");
                }
                if email.is_none() {
                    missing.push("Email");
                }
                Err(InvalidFields(missing))
            }
        }
    }
}

// ============================================================================
// Song
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Song {
    #[serde(rename = "SongID")]
    pub song_id: i64,
    #[serde(rename = "Title")]
    pub title: String,
    /// Seconds
    #[serde(rename = "Duration")]
    pub duration: i64,
    #[serde(rename = "ReleaseDate")]
    pub release_date: Option<NaiveDate>,
    #[serde(rename = "Genres")]
    pub genres: Vec<String>,
    /// Contributor NIFs in submission order
    #[serde(rename = "Contributors")]
    pub contributors: Vec<String>,
    #[serde(rename = "CollaborationName")]
    pub collaboration_name: String,
}

/// Body of POST/PUT /api/songs
///
/// ReleaseDate is optional on both create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SongPayload {
    pub title: Option<String>,
    pub duration: Option<i64>,
    #[serde(default, deserialize_with = "blank_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub genres: Option<DelimitedList>,
    #[serde(default)]
    pub contributors: Option<DelimitedList>,
}

/// Validated song input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongInput {
    pub title: String,
    pub duration: i64,
    pub release_date: Option<NaiveDate>,
    pub genres: DelimitedList,
    pub contributors: DelimitedList,
}

impl SongPayload {
    pub fn validate(self) -> Result<SongInput, InvalidFields> {
        let title = normalize_optional(self.title);
        let duration = self.duration.filter(|d| *d > 0);
        match (title, duration) {
            (Some(title), Some(duration)) => Ok(SongInput {
                title,
                duration,
                release_date: self.release_date,
                genres: self.genres.unwrap_or_default(),
                contributors: self.contributors.unwrap_or_default(),
            }),
            (title, duration) => {
                let mut missing = Vec::new();
                if title.is_none() {
                    missing.push("Title");
                }
                if duration.is_none() {
                    missing.push("Duration");
                }
                Err(InvalidFields(missing))
            }
        }
    }
}

// ============================================================================
// Collaboration
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Collaboration {
    #[serde(rename = "CollaborationID")]
    pub collaboration_id: i64,
    #[serde(rename = "CollaborationName")]
    pub collaboration_name: String,
    #[serde(rename = "StartDate")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "EndDate")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "SongID")]
    pub song_id: Option<i64>,
    #[serde(rename = "SongTitle")]
    pub song_title: Option<String>,
    /// Record label names
    #[serde(rename = "RecordLabels")]
    pub record_labels: Vec<String>,
    /// Contributor NIFs
    #[serde(rename = "Contributors")]
    pub contributors: Vec<String>,
}

/// How a collaboration names its song
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongRef {
    Id(i64),
    Title(String),
}

/// Body of POST/PUT /api/collaborations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollaborationPayload {
    #[serde(rename = "CollaborationName")]
    pub collaboration_name: Option<String>,
    #[serde(rename = "StartDate", default, deserialize_with = "blank_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "EndDate", default, deserialize_with = "blank_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "SongID")]
    pub song_id: Option<i64>,
    #[serde(rename = "SongTitle")]
    pub song_title: Option<String>,
    #[serde(rename = "RecordLabels", default)]
    pub record_labels: Option<DelimitedList>,
    #[serde(rename = "Contributors", default)]
    pub contributors: Option<DelimitedList>,
}

/// Validated collaboration input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaborationInput {
    pub collaboration_name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub song: Option<SongRef>,
    pub record_labels: DelimitedList,
    pub contributors: DelimitedList,
}

impl CollaborationPayload {
    pub fn validate(self) -> Result<CollaborationInput, InvalidFields> {
        let name = normalize_optional(self.collaboration_name);
        let song = match (self.song_id, normalize_optional(self.song_title)) {
            (Some(id), _) => Some(SongRef::Id(id)),
            (None, Some(title)) => Some(SongRef::Title(title)),
            (None, None) => None,
        };
        match (name, self.start_date) {
            (Some(collaboration_name), Some(start_date)) => {
                if matches!(self.end_date, Some(end) if end < start_date) {
                    return Err(InvalidFields(vec!["EndDate"]));
                }
                Ok(CollaborationInput {
                    collaboration_name,
                    start_date,
                    end_date: self.end_date,
                    description: normalize_optional(self.description),
                    song,
                    record_labels: self.record_labels.unwrap_or_default(),
                    contributors: self.contributors.unwrap_or_default(),
                })
            }
            (name, start) => {
                let mut missing = Vec::new();
                if name.is_none() {
                    missing.push("CollaborationName");
                }
                if start.is_none() {
                    missing.push("StartDate");
                }
                Err(InvalidFields(missing))
            }
        }
    }
}

// ============================================================================
// Counts
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DashboardCounts {
    pub record_label_count: i64,
    pub employee_count: i64,
    pub song_count: i64,
    pub contributor_count: i64,
    pub collaboration_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ContributorDependencies {
    pub collaboration_count: i64,
    pub song_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SongDependencies {
    pub collaboration_count: i64,
    pub contributor_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RecordLabelDependencies {
    pub employee_count: i64,
    pub collaboration_count: i64,
}

impl RecordLabelDependencies {
    pub fn is_clear(&self) -> bool {
        self.employee_count == 0 && self.collaboration_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_delimited_list_from_string_and_array() {
        let from_text: DelimitedList = serde_json::from_value(json!(" Producer, ,Mixer ,Producer")).unwrap();
        assert_eq!(from_text.items(), &["Producer", "Mixer"]);

        let from_array: DelimitedList = serde_json::from_value(json!(["Singer ", "", "Writer"])).unwrap();
        assert_eq!(from_array.items(), &["Singer", "Writer"]);
        assert_eq!(from_array.joined(), "Singer, Writer");
        assert_eq!(serde_json::to_value(&from_array).unwrap(), json!(["Singer", "Writer"]));
    }

    #[test]
    fn test_contributor_payload_reports_all_missing() {
        let payload: ContributorPayload = serde_json::from_value(json!({"Name": "  "})).unwrap();
        let err = payload.validate(true).unwrap_err();
        assert_eq!(err.0, vec!["NIF", "Name", "Roles"]);
        assert_eq!(err.to_string(), "Missing or invalid fields: NIF, Name, Roles");
    }

    #[test]
    fn test_contributor_payload_normalizes_person() {
        let payload: ContributorPayload = serde_json::from_value(json!({
            "NIF": " 123456789 ",
            "Name": "Ana ",
            "Email": "",
            "DateOfBirth": "1990-05-01",
            "Roles": "Producer"
        }))
        .unwrap();
        let (person, fields) = payload.validate(true).unwrap();
        assert_eq!(person.nif, "123456789");
        assert_eq!(person.name, "Ana");
        assert_eq!(person.email, None);
        assert_eq!(person.date_of_birth, NaiveDate::from_ymd_opt(1990, 5, 1));
        assert_eq!(fields.roles.items(), &["Producer"]);
    }

    #[test]
    fn test_employee_salary_zero_is_valid_negative_is_not() {
        let base = json!({
            "NIF": "1", "Name": "Ana", "JobTitle": "Producer",
            "HireDate": "2024-01-01", "RecordLabelID": 1
        });

        let mut zero = base.clone();
        zero["Salary"] = json!(0);
        let payload: EmployeePayload = serde_json::from_value(zero).unwrap();
        assert!(payload.validate(true).is_ok());

        let mut negative = base;
        negative["Salary"] = json!(-1);
        let payload: EmployeePayload = serde_json::from_value(negative).unwrap();
        assert_eq!(payload.validate(true).unwrap_err().0, vec!["Salary"]);
    }

    #[test]
    fn test_person_same_fields_treats_null_as_equal() {
        let a = Person {
            nif: "1".into(),
            name: "Ana".into(),
            date_of_birth: None,
            email: None,
            phone_number: Some("555".into()),
        };
        let mut b = a.clone();
        assert!(a.same_fields(&b));
        b.email = Some("ana@example.com".into());
        assert!(!a.same_fields(&b));
    }

    #[test]
    fn test_blank_dates_read_as_absent() {
        let payload: ContributorPayload = serde_json::from_value(json!({
            "NIF": "1", "Name": "Ana", "DateOfBirth": "", "Roles": "Producer"
        }))
        .unwrap();
        assert_eq!(payload.validate(true).unwrap().0.date_of_birth, None);

        let payload: EmployeePayload = serde_json::from_value(json!({
            "NIF": "1", "Name": "Ana", "JobTitle": "Producer", "Salary": 10,
            "HireDate": " ", "RecordLabelID": 1
        }))
        .unwrap();
        assert_eq!(payload.validate(true).unwrap_err().0, vec!["HireDate"]);

        let payload: CollaborationPayload = serde_json::from_value(json!({
            "CollaborationName": "Duet", "StartDate": "2024-01-01", "EndDate": ""
        }))
        .unwrap();
        assert_eq!(payload.validate().unwrap().end_date, None);

        let song: SongPayload = serde_json::from_value(json!({"Title": "A", "Duration": 1})).unwrap();
        assert_eq!(song.release_date, None);

        let bad = serde_json::from_value::<SongPayload>(json!({"ReleaseDate": "01/02/2024"}));
        assert!(bad.unwrap_err().to_string().contains("invalid date"));
    }

    #[test]
    fn test_collaboration_song_id_wins_over_title() {
        let payload: CollaborationPayload = serde_json::from_value(json!({
            "CollaborationName": "Duet",
            "StartDate": "2024-01-01",
            "SongID": 4,
            "SongTitle": "Other"
        }))
        .unwrap();
        assert_eq!(payload.validate().unwrap().song, Some(SongRef::Id(4)));
    }

    #[test]
    fn test_collaboration_end_before_start_rejected() {
        let payload: CollaborationPayload = serde_json::from_value(json!({
            "CollaborationName": "Duet",
            "StartDate": "2024-02-01",
            "EndDate": "2024-01-01"
        }))
        .unwrap();
        assert_eq!(payload.validate().unwrap_err().0, vec!["EndDate"]);
    }
}
