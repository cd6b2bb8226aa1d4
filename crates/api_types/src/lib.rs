//! Request and response bodies of the HTTP API.
//!
//! Request fields are optional so the server can tell a missing field from
//! an invalid one and report it per field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserCreate {
        pub email: Option<String>,
        pub password: Option<String>,
        pub name: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TokenRequest {
        pub email: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenResponse {
        pub token: String,
    }

    /// An account as clients see it. The password never leaves the server.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub email: String,
        pub name: String,
    }

    /// `PATCH /user/profile`. The email is not editable.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub name: Option<String>,
        pub password: Option<String>,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WalletNew {
        pub name: Option<String>,
        pub balance: Option<i32>,
        pub currency: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: i32,
        pub user: Option<i32>,
        pub name: String,
        pub balance: i32,
        pub currency: String,
    }
}

pub mod tag {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TagNew {
        pub name: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TagView {
        pub id: i32,
        pub user: Option<i32>,
        pub name: String,
    }
}

/// Request timestamps.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    /// RFC 3339 with any offset, normalized to UTC, or a naive
    /// `YYYY-MM-DDTHH:MM:SS[.fff]` taken as UTC.
    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|date| date.with_timezone(&Utc))
            .ok()
            .or_else(|| value.parse::<NaiveDateTime>().ok().map(|date| date.and_utc()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(value) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{value}`")))
    }
}

pub mod transaction {
    use super::*;
    use crate::tag::TagView;

    /// Body of create, full and partial update.
    ///
    /// `image` is not accepted here; it only changes through the upload
    /// endpoint.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionWrite {
        pub flow: Option<String>,
        pub category: Option<String>,
        pub wallet: Option<i32>,
        pub tags: Option<Vec<i32>>,
        /// RFC 3339 timestamp; one without an offset is read as UTC.
        #[serde(default, deserialize_with = "timestamp::deserialize")]
        pub date: Option<DateTime<Utc>>,
        pub note: Option<String>,
        pub amount: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        /// Case-insensitive substring of category, note or a tag name.
        pub keyword: Option<String>,
    }

    /// A transaction in list, create and update responses: tags by id.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i32,
        pub user: Option<i32>,
        pub flow: String,
        pub category: String,
        pub wallet: Option<i32>,
        pub tags: Vec<i32>,
        pub date: DateTime<Utc>,
        pub note: Option<String>,
        pub amount: i32,
        /// URL path of the attached image.
        pub image: Option<String>,
    }

    /// A transaction in the detail response: tags expanded.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionDetailView {
        pub id: i32,
        pub user: Option<i32>,
        pub flow: String,
        pub category: String,
        pub wallet: Option<i32>,
        pub tags: Vec<TagView>,
        pub date: DateTime<Utc>,
        pub note: Option<String>,
        pub amount: i32,
        pub image: Option<String>,
    }
}
