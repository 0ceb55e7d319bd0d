//! Rows and payloads exchanged with the hosted backend.

use crate::schedule::{Direction, Gender, ScheduleRecord, ScheduleType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Web app page each role lands on after signing in.
    pub fn dashboard_route(&self) -> &'static str {
        match self {
            Role::Student => "/student-dashboard",
            Role::Teacher => "/teacher-dashboard",
            Role::Admin => "/admin-dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub university_id: String,
    pub mobile: String,
    pub gender: Gender,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Case-insensitive match on name, email or university ID.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || contains_ignore_case(&self.name, &term)
            || contains_ignore_case(&self.email, &term)
            || contains_ignore_case(&self.university_id, &term)
    }
}

/// Profile fields chosen at sign-up, stored as auth metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub name: String,
    pub university_id: String,
    pub mobile: String,
    pub gender: Gender,
    pub role: Role,
}

/// Insert payload for the `users` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

impl NewProfile {
    /// Builds a profile from the metadata stored on an auth account.
    ///
    /// Missing fields fall back to a placeholder name, a `TEMP_` university
    /// ID derived from the account ID, an empty mobile, male and student.
    pub fn from_auth(user: &AuthUser) -> Self {
        let metadata = &user.user_metadata;
        let text = |key: &str| {
            metadata
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let temp_id: String = user.id.chars().take(8).collect();

        Self {
            id: user.id.clone(),
            email: user.email.clone().unwrap_or_default(),
            details: ProfileDetails {
                name: text("name").unwrap_or_else(|| "User".to_string()),
                university_id: text("university_id").unwrap_or_else(|| format!("TEMP_{temp_id}")),
                mobile: text("mobile").unwrap_or_default(),
                gender: text("gender")
                    .and_then(|g| g.parse().ok())
                    .unwrap_or(Gender::Male),
                role: text("role")
                    .and_then(|r| r.parse().ok())
                    .unwrap_or(Role::Student),
            },
        }
    }
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.university_id.is_none()
            && self.mobile.is_none()
            && self.gender.is_none()
    }
}

/// Account record returned by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl AuthUser {
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}

/// Tokens issued by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignUpOutcome {
    SignedIn { session: AuthSession },
    /// The account exists but the email link must be followed first.
    NeedsConfirmation { user: AuthUser },
}

/// A row of the `bus_schedules` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusScheduleRow {
    pub id: String,
    pub time: String,
    pub starting_point: String,
    pub route: String,
    pub end_point: String,
    pub direction: Direction,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub bus_type: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub schedule_type: ScheduleType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl BusScheduleRow {
    /// Case-insensitive match on time, starting point or route.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || contains_ignore_case(&self.time, &term)
            || contains_ignore_case(&self.starting_point, &term)
            || contains_ignore_case(&self.route, &term)
    }
}

impl From<BusScheduleRow> for ScheduleRecord {
    fn from(row: BusScheduleRow) -> Self {
        ScheduleRecord {
            id: row.id,
            time: row.time,
            starting_point: row.starting_point,
            route: row.route,
            end_point: row.end_point,
            direction: row.direction,
            gender: row.gender,
            bus_type: row.bus_type,
            remarks: row.remarks,
            description: row.description,
            schedule_type: row.schedule_type,
        }
    }
}

/// Author columns joined onto feedback for the admin view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackAuthor {
    pub name: String,
    pub university_id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<FeedbackAuthor>,
}

impl Feedback {
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty() || contains_ignore_case(&self.message, &term)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFeedback {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintCategory {
    Delay,
    Safety,
    DriverBehavior,
    BusCondition,
    RouteIssue,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
    pub status: ComplaintStatus,
    #[serde(default)]
    pub bus_route: Option<String>,
    #[serde(default)]
    pub incident_time: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub admin_response: Option<String>,
}

/// Insert payload for the `complaints` table. Status is assigned by the backend.
#[derive(Debug, Clone, Serialize)]
pub struct NewComplaint {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
    pub bus_route: Option<String>,
    pub incident_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
}

impl Notice {
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || contains_ignore_case(&self.title, &term)
            || contains_ignore_case(&self.content, &term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn auth_user(metadata: serde_json::Value) -> AuthUser {
        AuthUser {
            id: "0f8fad5b-d9cb-469f-a165-70867728950e".to_string(),
            email: Some("rahim@ugrad.iiuc.ac.bd".to_string()),
            email_confirmed_at: None,
            user_metadata: metadata,
        }
    }

    #[test]
    fn test_profile_from_auth_defaults() {
        let profile = NewProfile::from_auth(&auth_user(json!({})));
        assert_eq!(profile.details.name, "User");
        assert_eq!(profile.details.university_id, "TEMP_0f8fad5b");
        assert_eq!(profile.details.mobile, "");
        assert_eq!(profile.details.gender, Gender::Male);
        assert_eq!(profile.details.role, Role::Student);
    }

    #[test]
    fn test_profile_from_auth_metadata() {
        let profile = NewProfile::from_auth(&auth_user(json!({
            "name": "Rahima",
            "university_id": "C231045",
            "mobile": "01700000000",
            "gender": "Female",
            "role": "teacher"
        })));
        assert_eq!(profile.details.name, "Rahima");
        assert_eq!(profile.details.gender, Gender::Female);
        assert_eq!(profile.details.role, Role::Teacher);

        let body = serde_json::to_value(&profile).unwrap();
        assert_eq!(body["university_id"], "C231045");
        assert_eq!(body["email"], "rahim@ugrad.iiuc.ac.bd");
    }

    #[test]
    fn test_role_routes() {
        assert_eq!(Role::Student.dashboard_route(), "/student-dashboard");
        assert_eq!(Role::Teacher.dashboard_route(), "/teacher-dashboard");
        assert_eq!(Role::Admin.dashboard_route(), "/admin-dashboard");
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn test_schedule_row_converts() {
        let row: BusScheduleRow = serde_json::from_value(json!({
            "id": "1",
            "time": "7:00 AM",
            "starting_point": "BOT",
            "route": "Muradpur–2 no gate–IIUC",
            "end_point": "IIUC",
            "direction": "CityToIIUC",
            "gender": "Female",
            "schedule_type": "Regular",
            "created_at": "2024-05-01T10:00:00.123456+00:00"
        }))
        .unwrap();
        assert!(row.matches_search("muradpur"));
        assert!(!row.matches_search("agrabad"));

        let record = ScheduleRecord::from(row);
        assert_eq!(record.starting_point, "BOT");
        assert_eq!(record.gender, Some(Gender::Female));
    }

    #[test]
    fn test_complaint_defaults_and_wire_names() {
        assert_eq!(ComplaintCategory::default(), ComplaintCategory::Other);
        assert_eq!(ComplaintPriority::default(), ComplaintPriority::Medium);
        assert_eq!(
            serde_json::to_value(ComplaintCategory::DriverBehavior).unwrap(),
            "driver_behavior"
        );
        assert_eq!(
            serde_json::from_value::<ComplaintStatus>(json!("in_progress")).unwrap(),
            ComplaintStatus::InProgress
        );
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let patch = ProfileUpdate {
            name: Some("New".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "name": "New" }));
        assert!(ProfileUpdate::default().is_empty());
    }
}
