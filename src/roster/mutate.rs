//! Pure mutation operations over the in-memory record set.
//!
//! All operations enforce the admin-record protection and username
//! uniqueness; the caller re-renders and commits the result as a whole.

use serde::Deserialize;

use super::{ADMIN_USERNAME, RosterError, UserRecord, normalize_day};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayload {
    pub username: String,
    pub password: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPayload {
    pub username: String,
    #[serde(default)]
    pub new_username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletePayload {
    pub username: String,
}

/// Returns all records except the privileged one. No mutation.
#[must_use]
pub fn list(records: &[UserRecord]) -> Vec<UserRecord> {
    records
        .iter()
        .filter(|user| !user.is_admin())
        .cloned()
        .collect()
}

/// Appends a new record with the expiry normalized to day precision.
pub fn create(records: &mut Vec<UserRecord>, payload: &CreatePayload) -> Result<(), RosterError> {
    if payload.username.is_empty() || payload.password.is_empty() || payload.expires_at.is_empty() {
        return Err(RosterError::Validation(
            "username, password and expiresAt are required".to_string(),
        ));
    }
    if payload.username == ADMIN_USERNAME {
        return Err(RosterError::Forbidden);
    }
    if records.iter().any(|user| user.username == payload.username) {
        return Err(RosterError::Conflict(payload.username.clone()));
    }

    records.push(UserRecord {
        username: payload.username.clone(),
        password: payload.password.clone(),
        expires_at: normalize_day(&payload.expires_at),
    });
    Ok(())
}

/// Updates an existing record in place. Fields absent from the payload are
/// left unchanged; a rename is checked against every other username.
pub fn edit(records: &mut [UserRecord], payload: &EditPayload) -> Result<(), RosterError> {
    if payload.username.is_empty() {
        return Err(RosterError::Validation(
            "username is required".to_string(),
        ));
    }
    if payload.username == ADMIN_USERNAME {
        return Err(RosterError::Forbidden);
    }
    let index = records
        .iter()
        .position(|user| user.username == payload.username)
        .ok_or_else(|| RosterError::NotFound(payload.username.clone()))?;

    if let Some(new_username) = payload.new_username.as_deref().filter(|s| !s.is_empty()) {
        if new_username != payload.username
            && records.iter().any(|user| user.username == new_username)
        {
            return Err(RosterError::Conflict(new_username.to_string()));
        }
        records[index].username = new_username.to_string();
    }
    if let Some(password) = payload.password.as_deref().filter(|s| !s.is_empty()) {
        records[index].password = password.to_string();
    }
    if let Some(expires_at) = payload.expires_at.as_deref().filter(|s| !s.is_empty()) {
        records[index].expires_at = normalize_day(expires_at);
    }
    Ok(())
}

/// Removes exactly one record.
pub fn delete(records: &mut Vec<UserRecord>, payload: &DeletePayload) -> Result<(), RosterError> {
    if payload.username.is_empty() {
        return Err(RosterError::Validation(
            "username is required".to_string(),
        ));
    }
    if payload.username == ADMIN_USERNAME {
        return Err(RosterError::Forbidden);
    }
    let index = records
        .iter()
        .position(|user| user.username == payload.username)
        .ok_or_else(|| RosterError::NotFound(payload.username.clone()))?;
    records.remove(index);
    Ok(())
}

/// Post-condition guard for every mutating operation: the privileged record
/// from the pre-mutation set is present exactly once in the result. It should
/// never be removable through the API, but the reinsert is defensive.
#[must_use]
pub fn ensure_admin(working: Vec<UserRecord>, original: &[UserRecord]) -> Vec<UserRecord> {
    let admin = original.iter().find(|user| user.is_admin());
    let mut combined: Vec<UserRecord> = working
        .into_iter()
        .filter(|user| !user.is_admin())
        .collect();
    if let Some(admin) = admin {
        combined.push(admin.clone());
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(username: &str, password: &str) -> UserRecord {
        UserRecord {
            username: username.to_string(),
            password: password.to_string(),
            expires_at: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
        }
    }

    fn roster() -> Vec<UserRecord> {
        vec![record("admin", "secret"), record("alice", "pw")]
    }

    fn create_payload(username: &str) -> CreatePayload {
        CreatePayload {
            username: username.to_string(),
            password: "pw".to_string(),
            expires_at: "2030-01-01".to_string(),
        }
    }

    #[test]
    fn test_list_excludes_admin() {
        let users = list(&roster());
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "alice");
    }

    #[test]
    fn test_create_appends_with_normalized_date() {
        let mut records = roster();
        create(&mut records, &create_payload("bob")).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[2].expires_at,
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_create_rejects_admin() {
        let mut records = roster();
        assert!(matches!(
            create(&mut records, &create_payload("admin")),
            Err(RosterError::Forbidden)
        ));
    }

    #[test]
    fn test_create_rejects_duplicate() {
        let mut records = roster();
        assert!(matches!(
            create(&mut records, &create_payload("alice")),
            Err(RosterError::Conflict(_))
        ));
    }

    #[test]
    fn test_create_rejects_missing_fields() {
        let mut records = roster();
        let payload = CreatePayload {
            username: "bob".to_string(),
            password: String::new(),
            expires_at: "2030-01-01".to_string(),
        };
        assert!(matches!(
            create(&mut records, &payload),
            Err(RosterError::Validation(_))
        ));
    }

    #[test]
    fn test_edit_partial_update() {
        let mut records = roster();
        let payload = EditPayload {
            username: "alice".to_string(),
            new_username: None,
            password: Some("newpw".to_string()),
            expires_at: None,
        };
        edit(&mut records, &payload).unwrap();
        assert_eq!(records[1].password, "newpw");
        assert_eq!(
            records[1].expires_at,
            NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_edit_rename_conflict() {
        let mut records = roster();
        records.push(record("bob", "x"));
        let payload = EditPayload {
            username: "alice".to_string(),
            new_username: Some("bob".to_string()),
            password: None,
            expires_at: None,
        };
        assert!(matches!(
            edit(&mut records, &payload),
            Err(RosterError::Conflict(_))
        ));
    }

    #[test]
    fn test_edit_rename_to_same_name_is_allowed() {
        let mut records = roster();
        let payload = EditPayload {
            username: "alice".to_string(),
            new_username: Some("alice".to_string()),
            password: None,
            expires_at: None,
        };
        edit(&mut records, &payload).unwrap();
        assert_eq!(records[1].username, "alice");
    }

    #[test]
    fn test_edit_admin_forbidden() {
        let mut records = roster();
        let payload = EditPayload {
            username: "admin".to_string(),
            new_username: None,
            password: Some("x".to_string()),
            expires_at: None,
        };
        assert!(matches!(
            edit(&mut records, &payload),
            Err(RosterError::Forbidden)
        ));
    }

    #[test]
    fn test_edit_missing_user() {
        let mut records = roster();
        let payload = EditPayload {
            username: "nobody".to_string(),
            new_username: None,
            password: None,
            expires_at: None,
        };
        assert!(matches!(
            edit(&mut records, &payload),
            Err(RosterError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut records = roster();
        delete(
            &mut records,
            &DeletePayload {
                username: "alice".to_string(),
            },
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username, "admin");
    }

    #[test]
    fn test_delete_admin_forbidden() {
        let mut records = roster();
        assert!(matches!(
            delete(
                &mut records,
                &DeletePayload {
                    username: "admin".to_string(),
                },
            ),
            Err(RosterError::Forbidden)
        ));
    }

    #[test]
    fn test_delete_missing_user() {
        let mut records = roster();
        assert!(matches!(
            delete(
                &mut records,
                &DeletePayload {
                    username: "nobody".to_string(),
                },
            ),
            Err(RosterError::NotFound(_))
        ));
    }

    #[test]
    fn test_ensure_admin_reinserts_original_credentials() {
        let original = roster();
        // Working set lost the admin record entirely.
        let working = vec![record("alice", "pw")];
        let combined = ensure_admin(working, &original);
        let admins: Vec<_> = combined.iter().filter(|u| u.is_admin()).collect();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].password, "secret");
    }

    #[test]
    fn test_ensure_admin_never_duplicates() {
        let original = roster();
        let working = roster();
        let combined = ensure_admin(working, &original);
        assert_eq!(combined.iter().filter(|u| u.is_admin()).count(), 1);
    }

    #[test]
    fn test_admin_survives_mutation_sequence() {
        let original = roster();
        let mut working = original.clone();
        create(&mut working, &create_payload("bob")).unwrap();
        delete(
            &mut working,
            &DeletePayload {
                username: "alice".to_string(),
            },
        )
        .unwrap();
        let payload = EditPayload {
            username: "bob".to_string(),
            new_username: Some("bobby".to_string()),
            password: None,
            expires_at: None,
        };
        edit(&mut working, &payload).unwrap();

        let combined = ensure_admin(working, &original);
        let admin = combined.iter().find(|u| u.is_admin()).unwrap();
        assert_eq!(admin.password, "secret");
        assert!(combined.iter().any(|u| u.username == "bobby"));
        assert!(!combined.iter().any(|u| u.username == "alice"));
    }
}
