use rxn_core::{HalfInteger, RxnError};
use rxn_solve::{
    Formalism, InteractionType, ReactionSpec, SolverConfig, SolvingMode, TopologyBuilding,
};

#[test]
fn missing_fields_take_defaults() -> Result<(), RxnError> {
    let config = SolverConfig::from_yaml_str("formalism: canonical-helicity\n")?;
    assert_eq!(config.formalism, Formalism::CanonicalHelicity);
    assert_eq!(config.topology_building, TopologyBuilding::Isobar);
    assert_eq!(config.solving_mode, SolvingMode::Fast);
    assert_eq!(config.number_of_threads, 1);
    assert_eq!(config.mass_width_factor, 3.0);
    assert_eq!(config.max_spin_magnitude, HalfInteger::integer(2));
    Ok(())
}

#[test]
fn yaml_round_trip_keeps_every_field() -> Result<(), RxnError> {
    let config = SolverConfig {
        topology_building: TopologyBuilding::NBody,
        solving_mode: SolvingMode::Full,
        number_of_threads: 3,
        timeout_ms: Some(250),
        use_mass_conservation: false,
        ..SolverConfig::default()
    };
    let yaml = config.to_yaml_string()?;
    assert!(yaml.contains("n-body"));
    assert_eq!(SolverConfig::from_yaml_str(&yaml)?, config);
    Ok(())
}

#[test]
fn zero_threads_are_rejected() {
    let err = SolverConfig::from_yaml_str("number_of_threads: 0\n").unwrap_err();
    assert!(matches!(err, RxnError::Config(_)));
    assert_eq!(err.code(), "invalid-thread-count");
}

#[test]
fn malformed_yaml_is_a_config_error() {
    let err = SolverConfig::from_yaml_str("formalism: [helicity\n").unwrap_err();
    assert_eq!(err.code(), "yaml-deserialize");
}

#[test]
fn reaction_spec_from_yaml() -> Result<(), RxnError> {
    let reaction = ReactionSpec::from_yaml_str(
        r#"
initial_state:
  - name: J/psi(1S)
    spin_projections: [-1, 1]
final_state:
  - name: gamma
  - name: pi0
  - name: pi0
final_state_groupings:
  - [[pi0, pi0]]
allowed_intermediate_particles: [f0, f2]
allowed_interaction_types: [strong, electromagnetic]
"#,
    )?;
    assert_eq!(reaction.initial_state[0].name, "J/psi(1S)");
    assert_eq!(
        reaction.initial_state[0].spin_projections,
        Some(vec![HalfInteger::integer(-1), HalfInteger::integer(1)])
    );
    assert_eq!(reaction.final_state.len(), 3);
    assert_eq!(
        reaction.final_state_groupings[0].sorted_groups(),
        vec![vec!["pi0".to_string(), "pi0".to_string()]]
    );
    assert_eq!(
        reaction.allowed_interaction_types,
        vec![InteractionType::Strong, InteractionType::Electromagnetic]
    );
    Ok(())
}
