use core::fmt::{Display, Formatter};
use strum::{EnumIter, IntoEnumIterator};

/// Code of the one data source the collector writes under
pub const SOURCE_CODE: &str = "GITHUB";

pub const SOURCE_DESCRIPTION: &str = "Github";

/// The kinds of measurement collected for every repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Measurand {
    Clones,
    UniqueClones,
    Views,
    UniqueViews,
    Stargazers,
    Watchers,
}

impl Measurand {
    /// Short code the measurand is registered under in the store
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Clones => "C",
            Self::UniqueClones => "UC",
            Self::Views => "V",
            Self::UniqueViews => "UV",
            Self::Stargazers => "S",
            Self::Watchers => "W",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clones => "CLONES",
            Self::UniqueClones => "UNIQUE_CLONES",
            Self::Views => "VIEWS",
            Self::UniqueViews => "UNIQUE_VIEWS",
            Self::Stargazers => "STARGAZERS",
            Self::Watchers => "WATCHERS",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Clones => "Total number of git clones",
            Self::UniqueClones => "Number of unique git clones",
            Self::Views => "Total number of views",
            Self::UniqueViews => "Number of unique views",
            Self::Stargazers => "Number of repository stars",
            Self::Watchers => "Number of repository watchers",
        }
    }

    /// Look a measurand up by its short code, case-insensitively
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::iter().find(|m| m.code().eq_ignore_ascii_case(code))
    }
}

impl Display for Measurand {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = Measurand::iter().map(Measurand::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 6);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Measurand::from_code("UC"), Some(Measurand::UniqueClones));
        assert_eq!(Measurand::from_code("uv"), Some(Measurand::UniqueViews));
        assert_eq!(Measurand::from_code("X"), None);

        for m in Measurand::iter() {
            assert_eq!(Measurand::from_code(m.code()), Some(m));
        }
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(Measurand::Watchers.to_string(), "WATCHERS");
    }
}
