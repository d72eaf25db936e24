/// Group hierarchy module
///
/// Group paths scope both subjects and role assignments. A role assigned
/// in a group applies to that group and all of its descendants.
///
/// # Examples
///
/// ```
/// use idm_authz::group::GroupPath;
///
/// let group = GroupPath::new("/org/finance").unwrap();
/// let chain: Vec<_> = group.ancestors().map(|g| g.to_string()).collect();
/// assert_eq!(chain, vec!["/org/finance", "/org", "/"]);
/// ```

mod types;

pub use types::{Ancestors, GroupError, GroupPath, GroupResult};

impl From<GroupError> for crate::error::AuthzError {
    fn from(err: GroupError) -> Self {
        crate::error::AuthzError::InvalidGroupPath(err.to_string())
    }
}
