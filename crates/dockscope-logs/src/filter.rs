//! Selecting containers by name, image, image ID and status.

use crate::Container;

/// Substring criteria over container fields. Unset criteria match anything,
/// so the default filter keeps every container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerFilter {
    pub name: Option<String>,
    pub image: Option<String>,
    /// Matches any part of the digest, with or without the `sha256:` prefix
    pub image_id: Option<String>,
    pub status: Option<String>,
}

impl ContainerFilter {
    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image.is_none() && self.image_id.is_none() && self.status.is_none()
    }

    /// Every set criterion is a case-sensitive substring of its field
    pub fn matches(&self, container: &Container) -> bool {
        contains(&container.name, self.name.as_deref())
            && contains(&container.image, self.image.as_deref())
            && contains(&container.image_id, self.image_id.as_deref())
            && contains(&container.status, self.status.as_deref())
    }

    /// Keep the matching containers, in their original order
    pub fn apply(&self, containers: Vec<Container>) -> Vec<Container> {
        if self.is_empty() {
            return containers;
        }
        containers.into_iter().filter(|c| self.matches(c)).collect()
    }
}

fn contains(field: &str, pattern: Option<&str>) -> bool {
    pattern.is_none_or(|p| field.contains(p))
}
