use serde::{Deserialize, Serialize};

/// Account lifecycle state. Stored as a varchar column; parsed at the edges
/// so handlers never branch on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
    Deleted,
    Pending,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blocked => "blocked",
            UserStatus::Deleted => "deleted",
            UserStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "blocked" => Ok(UserStatus::Blocked),
            "deleted" => Ok(UserStatus::Deleted),
            "pending" => Ok(UserStatus::Pending),
            _ => Err(format!("unknown user status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }

    /// Default search preference derived at registration: men see women,
    /// women see men, everyone else sees both.
    pub fn default_interest(&self) -> InterestedIn {
        match self {
            Gender::Male => InterestedIn::Female,
            Gender::Female => InterestedIn::Male,
            Gender::Other => InterestedIn::Both,
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            "O" => Ok(Gender::Other),
            _ => Err(format!("unknown gender: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestedIn {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "B")]
    Both,
}

impl InterestedIn {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestedIn::Male => "M",
            InterestedIn::Female => "F",
            InterestedIn::Both => "B",
        }
    }

    pub fn accepts(&self, gender: Gender) -> bool {
        match self {
            InterestedIn::Male => gender == Gender::Male,
            InterestedIn::Female => gender == Gender::Female,
            InterestedIn::Both => true,
        }
    }
}

impl std::str::FromStr for InterestedIn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(InterestedIn::Male),
            "F" => Ok(InterestedIn::Female),
            "B" => Ok(InterestedIn::Both),
            _ => Err(format!("unknown preference: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in [UserStatus::Active, UserStatus::Blocked, UserStatus::Deleted, UserStatus::Pending] {
            assert_eq!(status.as_str().parse::<UserStatus>().unwrap(), status);
        }
        assert!("banned".parse::<UserStatus>().is_err());
    }

    #[test]
    fn default_interest_mirrors_gender() {
        assert_eq!(Gender::Male.default_interest(), InterestedIn::Female);
        assert_eq!(Gender::Female.default_interest(), InterestedIn::Male);
        assert_eq!(Gender::Other.default_interest(), InterestedIn::Both);
    }

    #[test]
    fn interest_filter() {
        assert!(InterestedIn::Both.accepts(Gender::Other));
        assert!(InterestedIn::Female.accepts(Gender::Female));
        assert!(!InterestedIn::Female.accepts(Gender::Male));
    }
}
