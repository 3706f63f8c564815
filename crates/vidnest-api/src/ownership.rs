//! The mutation gate shared by the comment, tweet, video, and playlist
//! handlers.

use vidnest_types::api::Claims;

/// Marker for a denied mutation; the caller maps it to the
/// resource-specific Forbidden/Unauthorized error.
#[derive(Debug, PartialEq, Eq)]
pub struct MutationDenied;

/// Checks whether the acting user may mutate a resource owned by `owner_id`.
///
/// Edit paths pass `allow_admin_override = false`: only the exact owner may
/// edit, admins included. Delete paths pass `true` for comments and videos
/// and `false` for tweets and playlists, which stay owner-only.
pub fn authorize_mutation(
    claims: &Claims,
    owner_id: &str,
    allow_admin_override: bool,
) -> Result<(), MutationDenied> {
    if claims.sub.to_string() == owner_id {
        return Ok(());
    }
    if allow_admin_override && claims.is_admin() {
        return Ok(());
    }
    Err(MutationDenied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use vidnest_types::models::Role;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            username: "chai".to_string(),
            role,
            exp: 0,
        }
    }

    #[test]
    fn owner_may_always_mutate() {
        let actor = claims(Role::User);
        let owner_id = actor.sub.to_string();
        assert_eq!(authorize_mutation(&actor, &owner_id, false), Ok(()));
        assert_eq!(authorize_mutation(&actor, &owner_id, true), Ok(()));
    }

    #[test]
    fn admin_override_applies_only_where_allowed() {
        let admin = claims(Role::Admin);
        let someone_else = Uuid::new_v4().to_string();
        // comment/video delete
        assert_eq!(authorize_mutation(&admin, &someone_else, true), Ok(()));
        // edits, tweet/playlist delete
        assert_eq!(
            authorize_mutation(&admin, &someone_else, false),
            Err(MutationDenied)
        );
    }

    #[test]
    fn stranger_is_denied_everywhere() {
        let actor = claims(Role::User);
        let someone_else = Uuid::new_v4().to_string();
        assert_eq!(
            authorize_mutation(&actor, &someone_else, false),
            Err(MutationDenied)
        );
        assert_eq!(
            authorize_mutation(&actor, &someone_else, true),
            Err(MutationDenied)
        );
    }
}
