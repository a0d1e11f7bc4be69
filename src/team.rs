use chrono::{DateTime, Utc};

use crate::error::{ChoreError, Result};
use crate::models::{MemberId, TeamMember};

/// Adds a member named `name`. Names are trimmed and must be unique
/// ignoring case; the collection is untouched on failure.
pub fn add_member<'a>(members: &'a mut Vec<TeamMember>, name: &str, now: DateTime<Utc>) -> Result<&'a TeamMember> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ChoreError::Invalid("please enter a team member name".into()));
    }
    let lower = name.to_lowercase();
    if members.iter().any(|m| m.name.to_lowercase() == lower) {
        return Err(ChoreError::DuplicateMember(name.to_string()));
    }
    members.push(TeamMember {
        id: MemberId::generate(),
        name: name.to_string(),
        created_at: now,
    });
    Ok(&members[members.len() - 1])
}

/// Removes a member by id. Chores keep referring to the old name.
pub fn remove_member(members: &mut Vec<TeamMember>, id: &MemberId) -> Result<TeamMember> {
    let idx = members
        .iter()
        .position(|m| &m.id == id)
        .ok_or_else(|| ChoreError::MemberNotFound(id.clone()))?;
    Ok(members.remove(idx))
}

/// Case-insensitive lookup by name.
pub fn find_member<'a>(members: &'a [TeamMember], name: &str) -> Option<&'a TeamMember> {
    let lower = name.trim().to_lowercase();
    members.iter().find(|m| m.name.to_lowercase() == lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rejects_case_insensitive_duplicates() {
        let now = Utc::now();
        let mut members = Vec::new();
        add_member(&mut members, " Ana ", now).unwrap();
        assert_eq!(members[0].name, "Ana");

        let err = add_member(&mut members, "ANA", now).unwrap_err();
        assert!(matches!(err, ChoreError::DuplicateMember(_)));
        assert_eq!(members.len(), 1);

        assert!(add_member(&mut members, "   ", now).is_err());
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_remove_by_id() {
        let now = Utc::now();
        let mut members = Vec::new();
        let id = add_member(&mut members, "Bo", now).unwrap().id.clone();
        add_member(&mut members, "Cy", now).unwrap();

        assert_eq!(remove_member(&mut members, &id).unwrap().name, "Bo");
        assert_eq!(members.len(), 1);
        assert!(matches!(remove_member(&mut members, &id), Err(ChoreError::MemberNotFound(_))));
    }

    #[test]
    fn test_find_member_ignores_case() {
        let mut members = Vec::new();
        add_member(&mut members, "Dee", Utc::now()).unwrap();
        assert!(find_member(&members, "dee").is_some());
        assert!(find_member(&members, "Eve").is_none());
    }
}
