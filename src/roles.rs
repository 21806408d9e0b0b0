//! Plan categories and the panel role each one unlocks

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subscription plan category as sold by billing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanCategory {
    Student,
    Patient,
    Clinic,
    TherapyPractice,
    Family,
    Institution,
    Enterprise,
}

/// Panel a user sees after signing in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Educational,
    Patient,
    Doctor,
    Therapist,
    Parent,
    Lecturer,
    Admin,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown {kind}: {value}")]
pub struct ParseRoleError {
    kind: &'static str,
    value: String,
}

/// Map a plan category to its role
pub fn role_for(category: PlanCategory) -> Role {
    match category {
        PlanCategory::Student => Role::Educational,
        PlanCategory::Patient => Role::Patient,
        PlanCategory::Clinic => Role::Doctor,
        PlanCategory::TherapyPractice => Role::Therapist,
        PlanCategory::Family => Role::Parent,
        PlanCategory::Institution => Role::Lecturer,
        PlanCategory::Enterprise => Role::Admin,
    }
}

impl PlanCategory {
    pub const ALL: [PlanCategory; 7] = [
        PlanCategory::Student,
        PlanCategory::Patient,
        PlanCategory::Clinic,
        PlanCategory::TherapyPractice,
        PlanCategory::Family,
        PlanCategory::Institution,
        PlanCategory::Enterprise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PlanCategory::Student => "student",
            PlanCategory::Patient => "patient",
            PlanCategory::Clinic => "clinic",
            PlanCategory::TherapyPractice => "therapy_practice",
            PlanCategory::Family => "family",
            PlanCategory::Institution => "institution",
            PlanCategory::Enterprise => "enterprise",
        }
    }

    pub fn role(self) -> Role {
        role_for(self)
    }
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Educational,
        Role::Patient,
        Role::Doctor,
        Role::Therapist,
        Role::Parent,
        Role::Lecturer,
        Role::Admin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Educational => "educational",
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Therapist => "therapist",
            Role::Parent => "parent",
            Role::Lecturer => "lecturer",
            Role::Admin => "admin",
        }
    }

    /// Clinicians author clinical notes
    pub fn can_write_clinical_notes(self) -> bool {
        matches!(self, Role::Doctor | Role::Therapist)
    }

    /// Clinicians read all notes; patients read only their own
    pub fn can_read_clinical_notes(self) -> bool {
        matches!(self, Role::Doctor | Role::Therapist | Role::Patient)
    }
}

impl fmt::Display for PlanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanCategory {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ParseRoleError {
                kind: "plan category",
                value: s.to_string(),
            })
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| ParseRoleError {
                kind: "role",
                value: s.to_string(),
            })
    }
}
