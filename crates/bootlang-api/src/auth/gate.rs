//! 관리자 권한 검사.

use bootlang_core::Principal;

use super::AuthError;

/// 관리자만 통과시킵니다. 토큰 해석은 하지 않습니다.
pub fn require_admin(principal: Principal) -> Result<Principal, AuthError> {
    if principal.is_admin {
        Ok(principal)
    } else {
        tracing::warn!(user_id = principal.id, "Non-admin user denied admin access");
        Err(AuthError::forbidden("admin privileges required"))
    }
}

/// 자기 자신을 대상으로 하는 관리 작업을 막습니다.
pub fn ensure_not_self(actor: &Principal, target_id: i64) -> Result<(), AuthError> {
    if actor.id == target_id {
        return Err(AuthError::conflict("cannot delete your own account"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn principal(id: i64, is_admin: bool) -> Principal {
        let now = Utc::now();
        Principal {
            id,
            username: format!("user{}", id),
            email: None,
            password_hash: "$argon2id$placeholder".to_string(),
            is_admin,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_require_admin_passes_admin_unchanged() {
        let admin = principal(1, true);
        assert_eq!(require_admin(admin.clone()).unwrap(), admin);
    }

    #[test]
    fn test_require_admin_rejects_regular_user() {
        let err = require_admin(principal(2, false)).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(ref m) if m == "admin privileges required"));
    }

    #[test]
    fn test_ensure_not_self() {
        let admin = principal(5, true);
        let err = ensure_not_self(&admin, 5).unwrap_err();
        assert!(matches!(err, AuthError::Conflict(ref m) if m == "cannot delete your own account"));

        assert!(ensure_not_self(&admin, 6).is_ok());
    }
}
