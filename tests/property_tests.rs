//! Property tests for rule matching and URL resolution.
//!
//! These tests validate the matching semantics and the decision invariants
//! across generated rule tables and routes.

use proptest::prelude::*;
use secure_routes::{
    is_transport_secure, ActionRule, DecisionEngine, PathRouter, PolicyConfig, PolicyStore,
    RouteParams, RouteSpec, RuleTable, StaticEnv,
};

const CONTROLLERS: &[&str] = &["users", "payments", "orders", "pages", "*"];
const ACTIONS: &[&str] = &["index", "view", "edit", "login", "checkout"];

// Strategy: identifiers drawn from a small vocabulary so collisions happen
fn arb_controller() -> impl Strategy<Value = String> {
    prop::sample::select(CONTROLLERS).prop_map(str::to_string)
}

fn arb_route_controller() -> impl Strategy<Value = String> {
    prop::sample::select(&CONTROLLERS[..4]).prop_map(str::to_string)
}

fn arb_action() -> impl Strategy<Value = String> {
    prop::sample::select(ACTIONS).prop_map(str::to_string)
}

fn arb_rule() -> impl Strategy<Value = ActionRule> {
    prop_oneof![
        Just(ActionRule::All),
        prop::collection::btree_set(arb_action(), 1..4).prop_map(ActionRule::Specific),
    ]
}

fn arb_table() -> impl Strategy<Value = Vec<(String, ActionRule)>> {
    prop::collection::vec((arb_controller(), arb_rule()), 0..6)
}

fn arb_route() -> impl Strategy<Value = RouteParams> {
    (arb_route_controller(), arb_action())
        .prop_map(|(c, a)| RouteParams::new(c, a).expect("non-empty identifiers"))
}

fn covers(rule: &ActionRule, action: &str) -> bool {
    match rule {
        ActionRule::All => true,
        ActionRule::Specific(actions) => actions.contains(action),
    }
}

fn engine_env(https: bool) -> StaticEnv {
    let env = StaticEnv::new().with("SERVER_NAME", "example.com");
    if https {
        env.with("HTTPS", "on")
    } else {
        env
    }
}

proptest! {
    /// Property: matching is exactly "some entry for this controller or `*`
    /// covers this action"
    #[test]
    fn proptest_matching_is_existence_check(entries in arb_table(), params in arb_route()) {
        let table: RuleTable = entries.into_iter().collect();

        // Later duplicates win when collecting, so check against the table itself
        let expected = table.iter().any(|(controller, rule)| {
            (controller == params.controller() || controller == "*")
                && covers(rule, params.action())
        });
        prop_assert_eq!(table.matches(&params), expected);

        // And adding an exact or wildcard entry always makes it match
        let mut with_exact = table.clone();
        with_exact.insert(params.controller(), ActionRule::from_actions([params.action()]));
        prop_assert!(with_exact.matches(&params));

        let mut with_wildcard = table;
        with_wildcard.insert("*", ActionRule::All);
        prop_assert!(with_wildcard.matches(&params));
    }

    /// Property: an allowed route is never rewritten, whatever `secured` holds
    #[test]
    fn proptest_allowed_never_rewrites(
        secured in arb_table(),
        params in arb_route(),
        https in any::<bool>(),
        full in any::<bool>()
    ) {
        let mut config = PolicyConfig::new()
            .allow(params.controller(), ActionRule::from_actions([params.action()]));
        for (controller, rule) in secured {
            config = config.secure(controller, rule);
        }

        let env = engine_env(https);
        let store = PolicyStore::from_config(config, &env);
        let router = PathRouter::new("http://localhost");
        let engine = DecisionEngine::new(&store, &router, &env);

        let spec = RouteSpec::from(params.clone());
        let plain = secure_routes::Router::render_url(&router, &spec, full).unwrap();
        prop_assert!(engine.is_allowed(&params));
        prop_assert_eq!(engine.resolve_url(&spec, full).unwrap(), plain);
    }

    /// Property: prefix lockdown holds even with an empty `secured` table
    #[test]
    fn proptest_prefix_lockdown(params in arb_route(), prefix in "[a-z]{1,8}") {
        let env = engine_env(false);
        let store = PolicyStore::from_config(PolicyConfig::new().lock_prefix(prefix.clone()), &env);
        let router = PathRouter::new("http://localhost");
        let engine = DecisionEngine::new(&store, &router, &env);

        prop_assert!(engine.requires_secure(&params.clone().with_prefix(prefix)));
        prop_assert!(!engine.requires_secure(&params));
    }

    /// Property: when policy already matches the transport, output is the
    /// router's plain rendering
    #[test]
    fn proptest_no_rewrite_when_policy_matches(
        secured in arb_table(),
        params in arb_route(),
        full in any::<bool>()
    ) {
        let mut config = PolicyConfig::new();
        for (controller, rule) in secured {
            config = config.secure(controller, rule);
        }

        let probe = PolicyStore::from_config(config.clone(), &engine_env(false));
        let router = PathRouter::new("http://localhost");
        let required = DecisionEngine::new(&probe, &router, &engine_env(false))
            .requires_secure(&params);

        // Run on the transport the policy wants
        let env = engine_env(required);
        let store = PolicyStore::from_config(config, &env);
        let engine = DecisionEngine::new(&store, &router, &env);

        let spec = RouteSpec::from(params);
        let plain = secure_routes::Router::render_url(&router, &spec, full).unwrap();
        prop_assert_eq!(engine.resolve_url(&spec, full).unwrap(), plain);
    }

    /// Property: absolute and scheme-relative URLs pass through untouched
    #[test]
    fn proptest_absolute_urls_pass_through(
        scheme in prop_oneof![Just("http:"), Just("https:"), Just("")],
        rest in "[a-z0-9./?=&#-]{0,30}",
        https in any::<bool>()
    ) {
        let url = format!("{}//{}", scheme, rest);
        let env = engine_env(https);
        let store = PolicyStore::from_config(PolicyConfig::new().secure("*", ActionRule::All), &env);
        let router = PathRouter::new("http://localhost");
        let engine = DecisionEngine::new(&store, &router, &env);

        prop_assert_eq!(engine.resolve_url(&RouteSpec::from(url.clone()), false).unwrap(), url);
    }

    /// Property: only the exact signals "on" and `true` mean secure
    #[test]
    fn proptest_transport_check_is_strict(value in "[a-zA-Z0-9 ]{0,6}") {
        let env = StaticEnv::new().with("HTTPS", value.as_str());
        prop_assert_eq!(is_transport_secure(&env), value == "on");
    }
}
