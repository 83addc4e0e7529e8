//! Users: listing, lookups and lifecycle

use folio_domain::constants::DEFAULT_PAGE_SIZE;
use folio_domain::{FolioError, GetOptions, Record, ResponseBody, Result};
use serde_json::{json, Value};
use tracing::info;

use crate::client::FolioClient;
use crate::pagination::Pages;

/// User records listing.
pub const USERS_ENDPOINT: &str = "/users";
const USERS_KEY: &str = "users";
const PERMISSION_USERS_ENDPOINT: &str = "/perms/users";

/// Fields the FOLIO UI insists on when a user is created.
const REQUIRED_USER_FIELDS: [&[&str]; 5] = [
    &["username"],
    &["patronGroup"],
    &["personal", "lastName"],
    &["personal", "email"],
    &["personal", "preferredContactTypeId"],
];

/// User records (`/users`, `/bl-users`).
pub trait UsersApi {
    /// Walk all users matching an optional CQL filter.
    ///
    /// # Errors
    /// Request failures are yielded by the iterator.
    fn iter_users(&mut self, filter: Option<&str>) -> Result<Pages<'_>>;

    /// # Errors
    /// Returns the first request failure.
    fn get_users(&mut self, filter: Option<&str>) -> Result<Vec<Record>>;

    /// Fetch one user, `None` if the id is unknown.
    ///
    /// # Errors
    /// Returns request failures other than 404.
    fn get_user_by_id(&mut self, id: &str) -> Result<Option<Record>>;

    /// Fetch the composite business-logic view of a user.
    ///
    /// # Errors
    /// Returns request failures, including `FolioError::NotFound`.
    fn get_user_bl_by_id(&mut self, id: &str) -> Result<Record>;

    /// Look a user up by barcode.
    ///
    /// # Errors
    /// Returns `FolioError::Protocol` if the barcode matches more than one user.
    fn get_user_by_barcode(&mut self, barcode: &str) -> Result<Option<Record>>;

    /// Create a user along with an empty permission set.
    ///
    /// # Errors
    /// Returns `FolioError::InvalidArgument` when a required field is missing
    /// and `FolioError::Protocol` when the server does not echo the new record.
    fn create_user(&mut self, user: &Value) -> Result<Record>;

    /// # Errors
    /// Returns `FolioError::Protocol` for a bodiless answer other than 204.
    fn update_user_by_id(&mut self, id: &str, user: &Value) -> Result<ResponseBody>;

    /// # Errors
    /// Returns `FolioError::Http` for any success status other than 204.
    fn delete_user_by_id(&mut self, id: &str) -> Result<()>;
}

impl UsersApi for FolioClient {
    fn iter_users(&mut self, filter: Option<&str>) -> Result<Pages<'_>> {
        self.paginate(USERS_ENDPOINT, USERS_KEY, filter, DEFAULT_PAGE_SIZE)
    }

    fn get_users(&mut self, filter: Option<&str>) -> Result<Vec<Record>> {
        self.iter_users(filter)?.collect_all()
    }

    fn get_user_by_id(&mut self, id: &str) -> Result<Option<Record>> {
        match self.get(&format!("{}/{}", USERS_ENDPOINT, id), &GetOptions::new().unlimited()) {
            Ok(user) => Ok(Some(user)),
            Err(FolioError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn get_user_bl_by_id(&mut self, id: &str) -> Result<Record> {
        self.get(&format!("/bl-users/by-id/{}", id), &GetOptions::new().unlimited())
    }

    fn get_user_by_barcode(&mut self, barcode: &str) -> Result<Option<Record>> {
        // ask for two so a duplicate barcode is noticed
        let options =
            GetOptions::new().key(USERS_KEY).query(format!("barcode=={}", barcode)).limit(2);
        let users = match self.get(USERS_ENDPOINT, &options)? {
            Value::Array(users) => users,
            _ => return Err(FolioError::Protocol("'users' is not an array".to_string())),
        };

        if users.len() > 1 {
            return Err(FolioError::Protocol(format!(
                "multiple users found with barcode {}",
                barcode
            )));
        }
        Ok(users.into_iter().next())
    }

    fn create_user(&mut self, user: &Value) -> Result<Record> {
        let missing = missing_user_fields(user);
        if !missing.is_empty() {
            return Err(FolioError::InvalidArgument(format!(
                "user payload is missing required fields: {}",
                missing.join(", ")
            )));
        }

        let created = match self.post(USERS_ENDPOINT, user)? {
            ResponseBody::Json(created) => created,
            ResponseBody::Status(status) => {
                return Err(FolioError::Protocol(format!(
                    "user creation answered {} without a record",
                    status
                )))
            }
        };
        let user_id = created
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| FolioError::Protocol("created user has no id".to_string()))?
            .to_string();

        let permissions = json!({ "userId": user_id, "permissions": [] });
        if let ResponseBody::Status(status) = self.post(PERMISSION_USERS_ENDPOINT, &permissions)? {
            return Err(FolioError::Protocol(format!(
                "permission set for user {} answered {} without a record",
                user_id, status
            )));
        }

        info!(user_id = %user_id, "user created");
        Ok(created)
    }

    fn update_user_by_id(&mut self, id: &str, user: &Value) -> Result<ResponseBody> {
        let response = self.put(&format!("{}/{}", USERS_ENDPOINT, id), user)?;
        match response {
            ResponseBody::Status(status) if status != 204 => Err(FolioError::Protocol(format!(
                "updating user {} answered {} without a record",
                id, status
            ))),
            other => Ok(other),
        }
    }

    fn delete_user_by_id(&mut self, id: &str) -> Result<()> {
        let status = self.delete(&format!("{}/{}", USERS_ENDPOINT, id))?;
        if status != 204 {
            return Err(FolioError::Http {
                status,
                message: format!("deleting user {} answered {} instead of 204", id, status),
            });
        }
        Ok(())
    }
}

fn missing_user_fields(user: &Value) -> Vec<String> {
    REQUIRED_USER_FIELDS
        .iter()
        .filter(|path| path.iter().try_fold(user, |node, field| node.get(*field)).is_none())
        .map(|path| path.join("."))
        .collect()
}
