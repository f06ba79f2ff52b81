use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Document identifier, unique within a project.
///
/// Number 0 is the project's root folder. Negative numbers belong to the
/// administrative namespace and are never handed out by allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ident {
    pub project: String,
    pub number: i64,
}

impl Ident {
    pub const ROOT_NUMBER: i64 = 0;

    pub fn new(project: impl Into<String>, number: i64) -> Self {
        Self {
            project: project.into(),
            number,
        }
    }

    /// Root folder of a project
    pub fn root(project: impl Into<String>) -> Self {
        Self::new(project, Self::ROOT_NUMBER)
    }

    pub fn is_root(&self) -> bool {
        self.number == Self::ROOT_NUMBER
    }

    pub fn is_admin(&self) -> bool {
        self.number < 0
    }

    /// Same number space as `project`
    pub fn belongs_to(&self, project: &str) -> bool {
        self.project == project
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.project, self.number)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid ident: {0:?}")]
pub struct IdentParseError(pub String);

impl FromStr for Ident {
    type Err = IdentParseError;

    /// Accepts `project,number` and `project_number`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (project, number) = s
            .rsplit_once(',')
            .or_else(|| s.rsplit_once('_'))
            .ok_or_else(|| IdentParseError(s.to_string()))?;

        if project.is_empty() {
            return Err(IdentParseError(s.to_string()));
        }

        let number = number
            .trim()
            .parse::<i64>()
            .map_err(|_| IdentParseError(s.to_string()))?;

        Ok(Ident::new(project.trim(), number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let ident = Ident::new("site", 12);
        assert_eq!(ident.to_string(), "site,12");
        assert_eq!("site,12".parse::<Ident>().unwrap(), ident);
        assert_eq!("site_12".parse::<Ident>().unwrap(), ident);
    }

    #[test]
    fn test_project_names_may_contain_underscores() {
        let ident: Ident = "my_site_7".parse().unwrap();
        assert_eq!(ident.project, "my_site");
        assert_eq!(ident.number, 7);
    }

    #[test]
    fn test_admin_namespace() {
        assert!(Ident::new("site", -3).is_admin());
        assert!(!Ident::root("site").is_admin());
        assert!(Ident::root("site").is_root());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("site".parse::<Ident>().is_err());
        assert!(",4".parse::<Ident>().is_err());
        assert!("site,four".parse::<Ident>().is_err());
    }
}
