//! Rule tables and the matching algorithm.
//!
//! A rule table maps a controller identifier (or the wildcard `*`) to an
//! [`ActionRule`]. Tables are normalized once when configuration is loaded
//! and never re-interpreted while matching.

use std::collections::{BTreeSet, HashMap};

use crate::route::RouteParams;

/// Wildcard identifier matching any controller or action.
pub const WILDCARD: &str = "*";

/// Which actions of a controller a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRule {
    /// Every action matches
    All,
    /// Only the listed actions match (exact, case-sensitive)
    Specific(BTreeSet<String>),
}

impl ActionRule {
    /// Builds a rule from a list of action identifiers.
    ///
    /// An empty list, or any list containing `*`, becomes [`ActionRule::All`].
    pub fn from_actions<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let actions: BTreeSet<String> = actions.into_iter().map(Into::into).collect();
        if actions.is_empty() || actions.contains(WILDCARD) {
            ActionRule::All
        } else {
            ActionRule::Specific(actions)
        }
    }

    /// Returns true if `action` is covered by this rule.
    pub fn matches(&self, action: &str) -> bool {
        match self {
            ActionRule::All => true,
            ActionRule::Specific(actions) => actions.contains(action),
        }
    }
}

/// A normalized mapping from controller identifier to [`ActionRule`].
///
/// # Examples
///
/// ```
/// use secure_routes::{ActionRule, RouteParams, RuleTable};
///
/// let mut table = RuleTable::new();
/// table.insert("payments", ActionRule::from_actions(["checkout", "refund"]));
/// table.insert("*", ActionRule::from_actions(["login"]));
///
/// let checkout = RouteParams::new("payments", "checkout").unwrap();
/// let login = RouteParams::new("users", "login").unwrap();
/// let browse = RouteParams::new("catalog", "browse").unwrap();
///
/// assert!(table.matches(&checkout));
/// assert!(table.matches(&login));
/// assert!(!table.matches(&browse));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: HashMap<String, ActionRule>,
}

impl RuleTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the rule for a controller.
    pub fn insert(&mut self, controller: impl Into<String>, rule: ActionRule) {
        self.rules.insert(controller.into(), rule);
    }

    /// Returns the rule for a controller key, if present.
    pub fn get(&self, controller: &str) -> Option<&ActionRule> {
        self.rules.get(controller)
    }

    /// Merges `other` into this table; keys in `other` replace existing ones.
    pub fn merge(&mut self, other: RuleTable) {
        self.rules.extend(other.rules);
    }

    /// Returns the number of controller entries.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over `(controller, rule)` entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionRule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns true if any entry matches the route.
    ///
    /// An entry applies when its key equals the route's controller or is
    /// the wildcard; it matches when its rule covers the route's action.
    /// The result is an existence check, so entry order is irrelevant.
    pub fn matches(&self, params: &RouteParams) -> bool {
        self.iter().any(|(controller, rule)| {
            (controller == params.controller() || controller == WILDCARD)
                && rule.matches(params.action())
        })
    }
}

impl<K: Into<String>> FromIterator<(K, ActionRule)> for RuleTable {
    fn from_iter<T: IntoIterator<Item = (K, ActionRule)>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
