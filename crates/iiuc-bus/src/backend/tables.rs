//! Reads and writes on the hosted tables.

use super::client::HostedClient;
use super::error::BackendError;
use super::types::{
    AuthUser, BusScheduleRow, Complaint, Feedback, NewComplaint, NewFeedback, NewProfile, Notice,
    ProfileUpdate, UserProfile,
};
use crate::schedule::Gender;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

const USERS: &str = "users";
const BUS_SCHEDULES: &str = "bus_schedules";
const FEEDBACK: &str = "feedback";
const COMPLAINTS: &str = "complaints";
const NOTICES: &str = "notices";

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

fn select_all() -> (&'static str, String) {
    ("select", "*".to_string())
}

impl HostedClient {
    async fn select_rows<T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        table: &str,
        params: &[(&str, String)],
        operation: &'static str,
        limit: Duration,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(table, params)?;
        let request = self.request(Method::GET, url, token);
        self.send_json(operation, limit, request).await
    }

    /// Inserts `row` and returns the stored row.
    async fn insert_row<B: Serialize, T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        row: &B,
        operation: &'static str,
        limit: Duration,
    ) -> Result<T, BackendError> {
        let url = self.table_url(table, &[select_all()])?;
        let request = self
            .request(Method::POST, url, Some(token))
            .header("Prefer", "return=representation")
            .json(&[row]);
        let rows: Vec<T> = self.send_json(operation, limit, request).await?;
        first_row(rows, operation)
    }

    async fn delete_row(
        &self,
        token: &str,
        table: &str,
        id: &str,
        operation: &'static str,
    ) -> Result<(), BackendError> {
        let url = self.table_url(table, &[("id", eq(id))])?;
        let request = self.request(Method::DELETE, url, Some(token));
        self.send_empty(operation, self.timeouts().table(), request)
            .await?;
        info!(table = table, id = %id, "Deleted row");
        Ok(())
    }

    /// Returns the profile for `user_id`, if one exists.
    pub async fn fetch_profile(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Option<UserProfile>, BackendError> {
        let rows: Vec<UserProfile> = self
            .select_rows(
                Some(token),
                USERS,
                &[select_all(), ("id", eq(user_id))],
                "Profile fetch",
                self.timeouts().profile(),
            )
            .await?;
        single_row(rows, "Profile fetch")
    }

    /// Creates the profile row for an account that has none yet.
    pub async fn create_profile_from_auth(
        &self,
        token: &str,
        user: &AuthUser,
    ) -> Result<UserProfile, BackendError> {
        info!(user_id = %user.id, "Creating user profile from auth metadata");
        let profile = NewProfile::from_auth(user);
        self.insert_row(token, USERS, &profile, "Profile create", self.timeouts().profile())
            .await
    }

    pub async fn update_profile(
        &self,
        token: &str,
        user_id: &str,
        patch: &ProfileUpdate,
    ) -> Result<UserProfile, BackendError> {
        let url = self.table_url(USERS, &[select_all(), ("id", eq(user_id))])?;
        let request = self
            .request(Method::PATCH, url, Some(token))
            .header("Prefer", "return=representation")
            .json(patch);
        let rows: Vec<UserProfile> = self
            .send_json("Profile update", self.timeouts().table(), request)
            .await?;
        first_row(rows, "Profile update")
    }

    /// Finds the email registered for a university ID.
    pub async fn lookup_email_by_university_id(
        &self,
        university_id: &str,
    ) -> Result<Option<String>, BackendError> {
        #[derive(Deserialize)]
        struct EmailRow {
            email: String,
        }

        let rows: Vec<EmailRow> = self
            .select_rows(
                None,
                USERS,
                &[
                    ("select", "email".to_string()),
                    ("university_id", eq(university_id)),
                ],
                "Lookup",
                self.timeouts().lookup(),
            )
            .await?;
        Ok(single_row(rows, "Lookup")?.map(|row| row.email))
    }

    /// All profiles, newest first.
    pub async fn list_users(&self, token: &str) -> Result<Vec<UserProfile>, BackendError> {
        self.select_rows(
            Some(token),
            USERS,
            &[select_all(), ("order", "created_at.desc".to_string())],
            "Users fetch",
            self.timeouts().table(),
        )
        .await
    }

    /// Student profiles ordered by name.
    pub async fn list_students(&self, token: &str) -> Result<Vec<UserProfile>, BackendError> {
        self.select_rows(
            Some(token),
            USERS,
            &[
                select_all(),
                ("role", eq("student")),
                ("order", "name.asc".to_string()),
            ],
            "Students fetch",
            self.timeouts().table(),
        )
        .await
    }

    pub async fn delete_user(&self, token: &str, user_id: &str) -> Result<(), BackendError> {
        self.delete_row(token, USERS, user_id, "User delete").await
    }

    /// Hosted timetable ordered by departure text.
    pub async fn list_schedules(&self, token: &str) -> Result<Vec<BusScheduleRow>, BackendError> {
        self.select_rows(
            Some(token),
            BUS_SCHEDULES,
            &[select_all(), ("order", "time.asc".to_string())],
            "Schedules fetch",
            self.timeouts().table(),
        )
        .await
    }

    /// Trips open to everyone plus those reserved for `gender`.
    pub async fn list_schedules_for(
        &self,
        token: &str,
        gender: Gender,
    ) -> Result<Vec<BusScheduleRow>, BackendError> {
        self.select_rows(
            Some(token),
            BUS_SCHEDULES,
            &[
                select_all(),
                ("or", format!("(gender.is.null,gender.eq.{gender})")),
                ("order", "time.asc".to_string()),
            ],
            "Schedules fetch",
            self.timeouts().table(),
        )
        .await
    }

    pub async fn delete_schedule(&self, token: &str, schedule_id: &str) -> Result<(), BackendError> {
        self.delete_row(token, BUS_SCHEDULES, schedule_id, "Schedule delete")
            .await
    }

    pub async fn list_feedback_for(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Vec<Feedback>, BackendError> {
        self.select_rows(
            Some(token),
            FEEDBACK,
            &[
                select_all(),
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ],
            "Feedback fetch",
            self.timeouts().table(),
        )
        .await
    }

    /// Every feedback entry with its author's name, university ID and email.
    pub async fn list_all_feedback(&self, token: &str) -> Result<Vec<Feedback>, BackendError> {
        self.select_rows(
            Some(token),
            FEEDBACK,
            &[
                ("select", "*,user:users(name,university_id,email)".to_string()),
                ("order", "created_at.desc".to_string()),
            ],
            "Feedback fetch",
            self.timeouts().table(),
        )
        .await
    }

    pub async fn insert_feedback(
        &self,
        token: &str,
        feedback: &NewFeedback,
    ) -> Result<Feedback, BackendError> {
        self.insert_row(token, FEEDBACK, feedback, "Feedback submit", self.timeouts().table())
            .await
    }

    pub async fn list_complaints_for(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Vec<Complaint>, BackendError> {
        self.select_rows(
            Some(token),
            COMPLAINTS,
            &[
                select_all(),
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ],
            "Complaints fetch",
            self.timeouts().table(),
        )
        .await
    }

    pub async fn insert_complaint(
        &self,
        token: &str,
        complaint: &NewComplaint,
    ) -> Result<Complaint, BackendError> {
        self.insert_row(
            token,
            COMPLAINTS,
            complaint,
            "Complaint submit",
            self.timeouts().table(),
        )
        .await
    }

    /// Notices, most recently published first.
    pub async fn list_notices(&self, token: &str) -> Result<Vec<Notice>, BackendError> {
        self.select_rows(
            Some(token),
            NOTICES,
            &[select_all(), ("order", "published_at.desc".to_string())],
            "Notices fetch",
            self.timeouts().table(),
        )
        .await
    }

    pub async fn delete_notice(&self, token: &str, notice_id: &str) -> Result<(), BackendError> {
        self.delete_row(token, NOTICES, notice_id, "Notice delete")
            .await
    }
}

/// At most one row. More than one is an error, since the filter names a unique key.
fn single_row<T>(rows: Vec<T>, operation: &'static str) -> Result<Option<T>, BackendError> {
    if rows.len() > 1 {
        return Err(BackendError::Decode {
            message: format!("{operation} matched {} rows, expected one", rows.len()),
        });
    }
    Ok(rows.into_iter().next())
}

fn first_row<T>(rows: Vec<T>, operation: &'static str) -> Result<T, BackendError> {
    rows.into_iter().next().ok_or_else(|| BackendError::Decode {
        message: format!("{operation} returned no rows"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BackendSettings;

    #[test]
    fn test_first_row() {
        assert_eq!(first_row(vec![1, 2], "x").unwrap(), 1);
        assert_eq!(
            first_row::<u8>(vec![], "Profile update").unwrap_err().to_string(),
            "Decode error: Profile update returned no rows"
        );
    }

    #[test]
    fn test_single_row() {
        assert_eq!(single_row::<u8>(vec![], "Lookup").unwrap(), None);
        assert_eq!(single_row(vec![7], "Lookup").unwrap(), Some(7));
        assert_eq!(
            single_row(vec![1, 2], "Lookup").unwrap_err().to_string(),
            "Decode error: Lookup matched 2 rows, expected one"
        );
    }

    #[tokio::test]
    async fn test_tables_refuse_offline() {
        let client = HostedClient::new(&BackendSettings::default()).unwrap();
        assert_eq!(
            client.list_notices("token").await.unwrap_err(),
            BackendError::NotConfigured
        );
        assert_eq!(
            client.lookup_email_by_university_id("C231001").await.unwrap_err(),
            BackendError::NotConfigured
        );
    }
}
