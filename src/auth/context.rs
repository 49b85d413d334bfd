use super::Claims;

/// Authenticated user context extracted from JWT
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Owner id for everything the user saves (JWT `sub` claim)
    pub user_id: String,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        let user_id = claims.sub.trim();
        if user_id.is_empty() {
            return Err("Missing user ID in token");
        }

        Ok(Self {
            user_id: user_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            aud: "printcalc".to_string(),
            iss: "https://securetoken.google.com/printcalc".to_string(),
            iat: 0,
            exp: 0,
            email: Some("maker@example.com".to_string()),
            name: None,
        }
    }

    #[test]
    fn test_context_uses_subject_as_owner() {
        let ctx = AuthContext::from_claims(&claims("u1XyZ")).unwrap();
        assert_eq!(ctx.user_id, "u1XyZ");
    }

    #[test]
    fn test_context_rejects_blank_subject() {
        assert!(AuthContext::from_claims(&claims("  ")).is_err());
    }
}
