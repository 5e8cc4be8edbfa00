use lamina::{
    CrossMinOptions, CrossMinStrategy, Error, GreedySwitchType, HierarchicalSweepMode,
    PortDistributionStrategy,
};

#[test]
fn defaults_match_the_documented_values() {
    let options = CrossMinOptions::default();
    assert_eq!(options.strategy, CrossMinStrategy::Barycenter);
    assert_eq!(options.greedy_switch, GreedySwitchType::TwoSided);
    assert_eq!(options.greedy_switch_activation_threshold, 40);
    assert_eq!(options.thoroughness, 7);
    assert!(options.hierarchical.enabled);
    assert_eq!(options.hierarchical.mode, HierarchicalSweepMode::CostBased);
    assert_eq!(options.hierarchical.recursive_boundary, 0.5);
    assert_eq!(options.port_distribution, PortDistributionStrategy::Barycenter);
    assert_eq!(options.random_seed, 1);
    assert_eq!(options.validate().ok(), Some(()));
}

#[test]
fn json_fills_in_missing_fields() {
    let options = CrossMinOptions::from_json_str(
        r#"{
            "strategy": "median",
            "greedy_switch": "one_sided",
            "hierarchical": { "mode": "forced_bottom_up" },
            "random_seed": 42
        }"#,
    )
    .expect("valid options");
    assert_eq!(options.strategy, CrossMinStrategy::Median);
    assert_eq!(options.greedy_switch, GreedySwitchType::OneSided);
    assert_eq!(options.hierarchical.mode, HierarchicalSweepMode::ForcedBottomUp);
    assert!(options.hierarchical.enabled);
    assert_eq!(options.thoroughness, 7);
    assert_eq!(options.random_seed, 42);
    assert!(options.bottom_up());
}

#[test]
fn malformed_json_is_reported() {
    let err = CrossMinOptions::from_json_str(r#"{ "strategy": "sideways" }"#).expect_err("unknown strategy");
    assert!(matches!(err, Error::OptionsJson(_)));
}

#[test]
fn parsed_options_are_validated() {
    let err = CrossMinOptions::from_json_str(r#"{ "thoroughness": 0 }"#).expect_err("zero thoroughness");
    assert!(matches!(err, Error::InvalidOptions(_)));
}

#[test]
fn greedy_switch_strategy_needs_a_mode() {
    let options = CrossMinOptions {
        strategy: CrossMinStrategy::GreedySwitch,
        greedy_switch: GreedySwitchType::Off,
        ..CrossMinOptions::default()
    };
    assert!(matches!(options.validate(), Err(Error::InvalidOptions(_))));
}

#[test]
fn disabling_hierarchy_means_bottom_up() {
    let mut options = CrossMinOptions::default();
    assert!(!options.bottom_up());
    options.hierarchical.enabled = false;
    assert!(options.bottom_up());
}

#[test]
fn greedy_post_pass_respects_threshold_and_strategy() {
    let mut options = CrossMinOptions::default();
    assert!(options.greedy_post_pass_applies(40));
    assert!(!options.greedy_post_pass_applies(41));

    options.greedy_switch_activation_threshold = 0;
    assert!(options.greedy_post_pass_applies(10_000));

    options.greedy_switch = GreedySwitchType::Off;
    assert!(!options.greedy_post_pass_applies(1));

    options.greedy_switch = GreedySwitchType::OneSided;
    for strategy in [
        CrossMinStrategy::GreedySwitch,
        CrossMinStrategy::Interactive,
        CrossMinStrategy::None,
    ] {
        options.strategy = strategy;
        assert!(!options.greedy_post_pass_applies(1), "{strategy:?}");
    }
}
