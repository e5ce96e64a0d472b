use crate::{Error, Result};

/// Family-level edit capability, resolved outside this workspace.
///
/// Mutating meal plan operations are not gated internally; callers check
/// with [`ensure_can_edit`] before invoking them.
pub trait Permission {
    fn can_edit(&self, user_id: &str, family_id: &str) -> bool;
}

impl<F> Permission for F
where
    F: Fn(&str, &str) -> bool,
{
    fn can_edit(&self, user_id: &str, family_id: &str) -> bool {
        self(user_id, family_id)
    }
}

pub fn ensure_can_edit(
    permission: &impl Permission,
    user_id: impl AsRef<str>,
    family_id: impl AsRef<str>,
) -> Result<()> {
    if permission.can_edit(user_id.as_ref(), family_id.as_ref()) {
        return Ok(());
    }

    Err(Error::Forbidden)
}
