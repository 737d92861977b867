//! Locator queries and the browser-automation capability boundary.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::DriverError;

/// The parameters needed to ask the automation collaborator for a live
/// element handle. How resolution happens is the collaborator's business;
/// the engine only derives the parameters.
///
/// Queries chain through `parent`: a nested role line is looked up within
/// the scope of the nearest ancestor role line's query, the outermost one
/// within the page root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocatorQuery {
    /// Enclosing scope, `None` for the page root.
    pub parent: Option<Arc<LocatorQuery>>,
    /// Accessibility role, casing as it appeared in the snapshot.
    pub role: String,
    /// Accessible name, when the role line carried one.
    pub name: Option<String>,
    /// Sibling index among same-role unnamed elements in the scope.
    pub nth: Option<usize>,
    /// Visible-text filter for generic containers without a name.
    pub has_text: Option<String>,
}

impl LocatorQuery {
    pub fn root_scoped(role: String, name: Option<String>) -> Self {
        LocatorQuery {
            parent: None,
            role,
            name,
            nth: None,
            has_text: None,
        }
    }
}

impl std::fmt::Display for LocatorQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent} >> ")?;
        }
        write!(f, "role={}", self.role)?;
        if let Some(name) = &self.name {
            write!(f, "[name=\"{name}\"]")?;
        }
        if let Some(nth) = self.nth {
            write!(f, "[nth={nth}]")?;
        }
        if let Some(text) = &self.has_text {
            write!(f, "[has-text=\"{text}\"]")?;
        }
        Ok(())
    }
}

/// Narrow capability interface onto the browser-automation collaborator.
///
/// Injected into the engine, never constructed by it; this is the only
/// surface the engine needs from a real browser, which keeps everything
/// else testable with a mock.
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Whether the element addressed by `query` is currently visible.
    async fn is_visible(&self, query: &LocatorQuery) -> Result<bool, DriverError>;
}
