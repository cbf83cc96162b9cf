//! Handler categories and webhook endpoints.
//!
//! The category set is closed. Chain categories run an ordered list of
//! handlers, while [`Category::CommandResponse`] is looked up by exact key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

// =============================================================================
// Category
// =============================================================================

/// Every category a handler can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Event,
    Command,
    CommandResponse,
    Action,
    Menu,
    #[serde(rename = "nonslack")]
    NonSlack,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 6] = [
        Category::Event,
        Category::Command,
        Category::CommandResponse,
        Category::Action,
        Category::Menu,
        Category::NonSlack,
    ];

    /// Returns the registration name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Event => "event",
            Category::Command => "command",
            Category::CommandResponse => "command_response",
            Category::Action => "action",
            Category::Menu => "menu",
            Category::NonSlack => "nonslack",
        }
    }

    /// Returns the chain form of this category, or `None` for the keyed one.
    pub fn as_chain(&self) -> Option<ChainCategory> {
        match self {
            Category::Event => Some(ChainCategory::Event),
            Category::Command => Some(ChainCategory::Command),
            Category::CommandResponse => None,
            Category::Action => Some(ChainCategory::Action),
            Category::Menu => Some(ChainCategory::Menu),
            Category::NonSlack => Some(ChainCategory::NonSlack),
        }
    }

    /// Returns `true` for the keyed category.
    pub fn is_keyed(&self) -> bool {
        self.as_chain().is_none()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown handler category '{s}'"))
    }
}

/// The categories dispatched as ordered chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainCategory {
    Event,
    Command,
    Action,
    Menu,
    NonSlack,
}

impl ChainCategory {
    pub const ALL: [ChainCategory; 5] = [
        ChainCategory::Event,
        ChainCategory::Command,
        ChainCategory::Action,
        ChainCategory::Menu,
        ChainCategory::NonSlack,
    ];

    /// Position of this category in per-category tables.
    pub fn index(&self) -> usize {
        match self {
            ChainCategory::Event => 0,
            ChainCategory::Command => 1,
            ChainCategory::Action => 2,
            ChainCategory::Menu => 3,
            ChainCategory::NonSlack => 4,
        }
    }
}

impl From<ChainCategory> for Category {
    fn from(chain: ChainCategory) -> Self {
        match chain {
            ChainCategory::Event => Category::Event,
            ChainCategory::Command => Category::Command,
            ChainCategory::Action => Category::Action,
            ChainCategory::Menu => Category::Menu,
            ChainCategory::NonSlack => Category::NonSlack,
        }
    }
}

impl fmt::Display for ChainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Category::from(*self).fmt(f)
    }
}

// =============================================================================
// Endpoint
// =============================================================================

/// The fixed set of webhook routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    #[serde(rename = "/actions")]
    Actions,
    #[serde(rename = "/commands")]
    Commands,
    #[serde(rename = "/events")]
    Events,
    #[serde(rename = "/menus")]
    Menus,
}

impl Endpoint {
    pub fn as_path(&self) -> &'static str {
        match self {
            Endpoint::Actions => "/actions",
            Endpoint::Commands => "/commands",
            Endpoint::Events => "/events",
            Endpoint::Menus => "/menus",
        }
    }

    /// Resolves transport routing metadata to an endpoint.
    ///
    /// Gateway route keys look like `POST /events`; only the last
    /// whitespace-separated token is the path. Matching is exact.
    pub fn from_route(route: &str) -> Result<Self, RouteError> {
        let path = route.split_whitespace().last().unwrap_or_default();
        match path {
            "/actions" => Ok(Endpoint::Actions),
            "/commands" => Ok(Endpoint::Commands),
            "/events" => Ok(Endpoint::Events),
            "/menus" => Ok(Endpoint::Menus),
            _ => Err(RouteError::UnknownRoute(route.to_string())),
        }
    }

    /// Maps the endpoint to the chain run on the asynchronous side.
    pub fn chain_category(&self) -> Result<ChainCategory, RouteError> {
        match self {
            Endpoint::Actions => Ok(ChainCategory::Action),
            Endpoint::Commands => Ok(ChainCategory::Command),
            Endpoint::Events => Ok(ChainCategory::Event),
            Endpoint::Menus => Err(RouteError::UnsupportedAsyncRoute(*self)),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("menus".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::CommandResponse).unwrap(),
            r#""command_response""#
        );
        assert_eq!(
            serde_json::to_string(&Category::NonSlack).unwrap(),
            r#""nonslack""#
        );
    }

    #[test]
    fn test_only_command_response_is_keyed() {
        let keyed: Vec<_> = Category::ALL.into_iter().filter(Category::is_keyed).collect();
        assert_eq!(keyed, vec![Category::CommandResponse]);
    }

    #[test]
    fn test_endpoint_from_route() {
        assert_eq!(Endpoint::from_route("POST /events"), Ok(Endpoint::Events));
        assert_eq!(Endpoint::from_route("/commands"), Ok(Endpoint::Commands));
        assert_eq!(
            Endpoint::from_route("POST /event"),
            Err(RouteError::UnknownRoute("POST /event".into()))
        );
        assert!(Endpoint::from_route("").is_err());
    }

    #[test]
    fn test_endpoint_chain_mapping() {
        assert_eq!(
            Endpoint::Actions.chain_category(),
            Ok(ChainCategory::Action)
        );
        assert_eq!(
            Endpoint::Commands.chain_category(),
            Ok(ChainCategory::Command)
        );
        assert_eq!(Endpoint::Events.chain_category(), Ok(ChainCategory::Event));
        assert_eq!(
            Endpoint::Menus.chain_category(),
            Err(RouteError::UnsupportedAsyncRoute(Endpoint::Menus))
        );
    }

    #[test]
    fn test_chain_index_is_dense() {
        for (i, chain) in ChainCategory::ALL.into_iter().enumerate() {
            assert_eq!(chain.index(), i);
        }
    }
}
