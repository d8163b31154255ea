use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// File classification bucket reported by the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    BackgroundVideo,
    BackgroundImage,
    Storyboard,
    Hitsound,
    SkinElement,
    Other,
}

impl CategoryId {
    /// All six filter outcomes, in registry order.
    pub const ALL: [CategoryId; 6] = [
        CategoryId::BackgroundVideo,
        CategoryId::BackgroundImage,
        CategoryId::Storyboard,
        CategoryId::Hitsound,
        CategoryId::SkinElement,
        CategoryId::Other,
    ];

    /// The five categories exposed for selection and deletion. `Other` is counted but never deletable.
    pub const DELETABLE: [CategoryId; 5] = [
        CategoryId::BackgroundVideo,
        CategoryId::BackgroundImage,
        CategoryId::Storyboard,
        CategoryId::Hitsound,
        CategoryId::SkinElement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryId::BackgroundVideo => "background_video",
            CategoryId::BackgroundImage => "background_image",
            CategoryId::Storyboard => "storyboard",
            CategoryId::Hitsound => "hitsound",
            CategoryId::SkinElement => "skin_element",
            CategoryId::Other => "other",
        }
    }

    pub fn is_deletable(self) -> bool {
        self != CategoryId::Other
    }

    pub fn info(self) -> &'static CategoryInfo {
        lookup(self)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = WorkflowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        CategoryId::ALL
            .into_iter()
            .find(|id| id.as_str() == value)
            .ok_or_else(|| WorkflowError::NotFound {
                category: value.to_string(),
            })
    }
}

/// Immutable display metadata for one category.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryInfo {
    pub id: CategoryId,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

static REGISTRY: [CategoryInfo; 6] = [
    CategoryInfo {
        id: CategoryId::BackgroundVideo,
        title: "Background Videos",
        description: "Remove background videos",
        icon: "video",
    },
    CategoryInfo {
        id: CategoryId::BackgroundImage,
        title: "Background Images",
        description: "Remove background images",
        icon: "image",
    },
    CategoryInfo {
        id: CategoryId::Storyboard,
        title: "Storyboards",
        description: "Remove storyboards",
        icon: "scroll-text",
    },
    CategoryInfo {
        id: CategoryId::Hitsound,
        title: "Hitsounds",
        description: "Remove hitsounds",
        icon: "file-music",
    },
    CategoryInfo {
        id: CategoryId::SkinElement,
        title: "Skin Elements",
        description: "Remove skin elements",
        icon: "images",
    },
    CategoryInfo {
        id: CategoryId::Other,
        title: "Other",
        description: "Files that are kept",
        icon: "file-question",
    },
];

pub fn registry() -> &'static [CategoryInfo] {
    &REGISTRY
}

fn lookup(id: CategoryId) -> &'static CategoryInfo {
    // Registry entries are laid out in `CategoryId::ALL` order.
    &REGISTRY[id as usize]
}

/// Parses an id that must name one of the five deletable categories.
pub fn parse_deletable(value: &str) -> Result<CategoryId, WorkflowError> {
    match value.parse::<CategoryId>()? {
        id if id.is_deletable() => Ok(id),
        _ => Err(WorkflowError::NotFound {
            category: value.to_string(),
        }),
    }
}
