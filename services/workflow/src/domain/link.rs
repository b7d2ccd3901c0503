use dmrt_domain::role::Role;
use url::Url;
use uuid::Uuid;

/// Builds the magic links mailed to each role.
///
/// | Role | Link |
/// |------|------|
/// | team_member | `{base}/?code=…` |
/// | pro | `{base}/pro?code=…` |
/// | leader | `{base}/approve/{submission_id}?code=…` |
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: Url,
}

impl LinkBuilder {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }

    pub fn magic_link(&self, role: Role, code: &str, submission_id: Option<Uuid>) -> String {
        let mut url = self.base.clone();
        match (role, submission_id) {
            (Role::TeamMember, _) => url.set_path("/"),
            (Role::Pro, _) => url.set_path("/pro"),
            (Role::Leader, Some(id)) => url.set_path(&format!("/approve/{id}")),
            (Role::Leader, None) => url.set_path("/approve"),
        }
        url.set_fragment(None);
        url.query_pairs_mut().clear().append_pair("code", code);
        url.into()
    }
}
