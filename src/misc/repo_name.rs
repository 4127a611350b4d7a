use crate::Result;
use core::fmt::{Display, Formatter};
use core::str::FromStr;
use ohno::bail;

/// A repository's full name, `owner/name`.
///
/// This is also the series identity under which all of a repository's measurements
/// are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoName {
    owner: Box<str>,
    repo: Box<str>,
}

impl RepoName {
    pub fn parse(full_name: &str) -> Result<Self> {
        let Some((owner, repo)) = full_name.split_once('/') else {
            bail!("invalid repository name '{full_name}': expected 'owner/name'");
        };

        if owner.is_empty() || repo.is_empty() {
            bail!("invalid repository name '{full_name}': empty owner or repository");
        }

        if repo.contains('/') {
            bail!("invalid repository name '{full_name}': too many path segments");
        }

        Ok(Self {
            owner: Box::from(owner),
            repo: Box::from(repo),
        })
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// The `owner/name` form used as the series identity.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoName {
    type Err = ohno::AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for RepoName {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
