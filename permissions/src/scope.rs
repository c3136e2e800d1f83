use std::collections::{btree_map, BTreeMap, BTreeSet};

use dms_db::object_id::{OpPermissionId, ProjectId};
use serde::Serialize;

use crate::{RawGrant, Scope};

/// The merged scope of one permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectiveScope {
    /// Applies to every resource in the context.
    Unrestricted,
    /// Applies only to these resources. Never empty.
    Ranged { range_uids: BTreeSet<String> },
}

impl EffectiveScope {
    pub fn covers(&self, resource: &str) -> bool {
        match self {
            EffectiveScope::Unrestricted => true,
            EffectiveScope::Ranged { range_uids } => range_uids.contains(resource),
        }
    }

    /// Combine two scopes of the same permission. Unrestricted absorbs any range.
    fn union(&mut self, other: EffectiveScope) {
        match (self, other) {
            (EffectiveScope::Unrestricted, _) => {}
            (this, EffectiveScope::Unrestricted) => *this = EffectiveScope::Unrestricted,
            (
                EffectiveScope::Ranged { range_uids },
                EffectiveScope::Ranged {
                    range_uids: mut other,
                },
            ) => range_uids.append(&mut other),
        }
    }
}

/// The fully merged permissions of a user in one context, keyed by permission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EffectivePermissionSet(BTreeMap<OpPermissionId, EffectiveScope>);

impl EffectivePermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, permission_id: &OpPermissionId) -> Option<&EffectiveScope> {
        self.0.get(permission_id)
    }

    pub fn contains(&self, permission_id: &OpPermissionId) -> bool {
        self.0.contains_key(permission_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if the permission is present and, when a resource is given, its scope covers it.
    pub fn allows(&self, permission_id: &OpPermissionId, resource: Option<&str>) -> bool {
        match (self.0.get(permission_id), resource) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(scope), Some(resource)) => scope.covers(resource),
        }
    }

    /// Add one grant. A resource range with no UIDs grants nothing and is skipped.
    pub fn insert_grant(&mut self, permission_id: OpPermissionId, scope: &Scope) {
        let scope = match scope {
            Scope::Global | Scope::Project => EffectiveScope::Unrestricted,
            Scope::Resources { range_uids } if range_uids.is_empty() => return,
            Scope::Resources { range_uids } => EffectiveScope::Ranged {
                range_uids: range_uids.iter().cloned().collect(),
            },
        };

        self.insert_scope(permission_id, scope);
    }

    fn insert_scope(&mut self, permission_id: OpPermissionId, scope: EffectiveScope) {
        match self.0.entry(permission_id) {
            btree_map::Entry::Vacant(e) => {
                e.insert(scope);
            }
            btree_map::Entry::Occupied(mut e) => e.get_mut().union(scope),
        }
    }

    /// Union another set into this one.
    pub fn merge(&mut self, other: EffectivePermissionSet) {
        for (permission_id, scope) in other.0 {
            self.insert_scope(permission_id, scope);
        }
    }
}

impl IntoIterator for EffectivePermissionSet {
    type Item = (OpPermissionId, EffectiveScope);
    type IntoIter = btree_map::IntoIter<OpPermissionId, EffectiveScope>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Merge raw grants into one effective set, ignoring which project each came through.
pub fn consolidate<'a>(grants: impl IntoIterator<Item = &'a RawGrant>) -> EffectivePermissionSet {
    let mut set = EffectivePermissionSet::new();
    for grant in grants {
        set.insert_grant(grant.permission_id, &grant.scope);
    }
    set
}

/// Merge raw grants separately for each project they came through. Grants without a project
/// are skipped; those come from the global path and are never merged with project grants.
pub fn consolidate_by_project<'a>(
    grants: impl IntoIterator<Item = &'a RawGrant>,
) -> BTreeMap<ProjectId, EffectivePermissionSet> {
    let mut by_project: BTreeMap<ProjectId, EffectivePermissionSet> = BTreeMap::new();
    for grant in grants {
        if let Some(project_id) = grant.project_id {
            by_project
                .entry(project_id)
                .or_default()
                .insert_grant(grant.permission_id, &grant.scope);
        }
    }
    by_project
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GrantPath;

    fn ranged(uids: &[&str]) -> Scope {
        Scope::Resources {
            range_uids: uids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn grant(permission_id: OpPermissionId, scope: Scope) -> RawGrant {
        RawGrant {
            permission_id,
            scope,
            source_role_id: None,
            path: GrantPath::MemberRole,
            project_id: None,
        }
    }

    fn uids(set: &EffectivePermissionSet, permission_id: &OpPermissionId) -> Vec<String> {
        match set.get(permission_id) {
            Some(EffectiveScope::Ranged { range_uids }) => range_uids.iter().cloned().collect(),
            other => panic!("expected ranged scope, got {other:?}"),
        }
    }

    #[test]
    fn ranges_union() {
        let perm = OpPermissionId::new();
        let set = consolidate(&[grant(perm, ranged(&["a", "b"])), grant(perm, ranged(&["b", "c"]))]);
        assert_eq!(uids(&set, &perm), vec!["a", "b", "c"]);
    }

    #[test]
    fn unrestricted_wins() {
        let perm = OpPermissionId::new();
        let set = consolidate(&[grant(perm, ranged(&["a"])), grant(perm, Scope::Project)]);
        assert_eq!(set.get(&perm), Some(&EffectiveScope::Unrestricted));

        let set = consolidate(&[grant(perm, Scope::Global), grant(perm, ranged(&["a"]))]);
        assert_eq!(set.get(&perm), Some(&EffectiveScope::Unrestricted));
    }

    #[test]
    fn empty_range_grants_nothing() {
        let perm = OpPermissionId::new();
        let set = consolidate(&[grant(perm, ranged(&[]))]);
        assert!(set.is_empty());
        assert!(!set.allows(&perm, None));
    }

    #[test]
    fn merge_commutative_and_idempotent() {
        let view = OpPermissionId::new();
        let edit = OpPermissionId::new();

        let a = consolidate(&[grant(view, ranged(&["db1"])), grant(edit, Scope::Project)]);
        let b = consolidate(&[grant(view, ranged(&["db2"]))]);

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b.clone();
        ba.merge(a.clone());
        assert_eq!(ab, ba);

        let mut again = ab.clone();
        again.merge(ab.clone());
        assert_eq!(again, ab);

        assert_eq!(uids(&ab, &view), vec!["db1", "db2"]);
    }

    #[test]
    fn grant_order_does_not_matter() {
        let view = OpPermissionId::new();
        let edit = OpPermissionId::new();
        let grants = vec![
            grant(view, ranged(&["db1", "db2"])),
            grant(edit, ranged(&["db3"])),
            grant(view, ranged(&["db2", "db4"])),
            grant(edit, Scope::Project),
            grant(view, ranged(&[])),
            grant(view, ranged(&["db1"])),
        ];
        let expected = consolidate(&grants);

        // Every rotation of the list, forwards and reversed.
        for shift in 0..grants.len() {
            let mut rotated = grants.clone();
            rotated.rotate_left(shift);
            assert_eq!(consolidate(&rotated), expected, "rotated by {shift}");

            rotated.reverse();
            assert_eq!(consolidate(&rotated), expected, "reversed, rotated by {shift}");
        }

        assert_eq!(uids(&expected, &view), vec!["db1", "db2", "db4"]);
        assert_eq!(expected.get(&edit), Some(&EffectiveScope::Unrestricted));
    }

    #[test]
    fn allows_checks_resource() {
        let perm = OpPermissionId::new();
        let set = consolidate(&[grant(perm, ranged(&["db1"]))]);
        assert!(set.allows(&perm, None));
        assert!(set.allows(&perm, Some("db1")));
        assert!(!set.allows(&perm, Some("db2")));
        assert!(!set.allows(&OpPermissionId::new(), Some("db1")));
    }

    #[test]
    fn by_project_keeps_projects_apart() {
        let perm = OpPermissionId::new();
        let p1 = ProjectId::new();
        let p2 = ProjectId::new();

        let mut g1 = grant(perm, ranged(&["db1"]));
        g1.project_id = Some(p1);
        let mut g2 = grant(perm, Scope::Project);
        g2.project_id = Some(p2);
        let global = grant(OpPermissionId::new(), Scope::Global);

        let by_project = consolidate_by_project(&[g1, g2, global]);
        assert_eq!(by_project.len(), 2);
        assert_eq!(uids(&by_project[&p1], &perm), vec!["db1"]);
        assert_eq!(by_project[&p2].get(&perm), Some(&EffectiveScope::Unrestricted));
    }

    #[test]
    fn serialize_set() {
        let perm = OpPermissionId::new();
        let set = consolidate(&[grant(perm, ranged(&["db2", "db1"]))]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                (perm.to_string()): { "kind": "ranged", "range_uids": ["db1", "db2"] }
            })
        );
    }
}
