use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Lifecycle status shared by every News entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
    Pending,
    Draft,
    Published,
    Deleted,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Active,
        Status::Inactive,
        Status::Pending,
        Status::Draft,
        Status::Published,
        Status::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::Pending => "pending",
            Status::Draft => "draft",
            Status::Published => "published",
            Status::Deleted => "deleted",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::Pending => "Pending review",
            Status::Draft => "Draft",
            Status::Published => "Published",
            Status::Deleted => "Deleted",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }

    /// Statuses under which an article is publicly visible.
    pub fn is_live(&self) -> bool {
        matches!(self, Status::Active | Status::Published)
    }

    /// Active flips to inactive; every other status becomes active.
    pub fn toggled(&self) -> Status {
        if self.is_active() { Status::Inactive } else { Status::Active }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
