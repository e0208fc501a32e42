//! End-to-end checks through the manager

use eqcheck::{
    ApplicationSchemeType, CheckError, Configuration, EquivalenceCheckingManager,
    EquivalenceCriterion,
};
use eqcheck_core::algorithms::{bernstein_vazirani, bernstein_vazirani_dynamic};
use eqcheck_core::{Circuit, Permutation};
use std::io::Write;

fn check(circ1: Circuit, circ2: Circuit, config: Configuration) -> EquivalenceCriterion {
    EquivalenceCheckingManager::new(circ1, circ2, config)
        .unwrap()
        .run()
        .unwrap()
        .equivalence()
}

#[test]
fn identical_circuits_are_equivalent() {
    let mut c1 = Circuit::new(1);
    c1.x(0);
    let c2 = c1.clone();
    assert_eq!(
        check(c1, c2, Configuration::default()),
        EquivalenceCriterion::Equivalent
    );
}

#[test]
fn trailing_diagonal_gate_breaks_functional_equivalence() {
    let mut c1 = Circuit::with_bits(1, 1);
    c1.x(0);
    c1.measure(0, 0);
    let mut c2 = Circuit::with_bits(1, 1);
    c2.x(0);
    c2.z(0);
    c2.measure(0, 0);
    // The trailing Z changes the unitary but not any measurement
    // outcome, so the functional check refutes while simulation-only
    // evidence accepts.
    assert_eq!(
        check(c1.clone(), c2.clone(), Configuration::default()),
        EquivalenceCriterion::NotEquivalent
    );

    let mut sim_only = Configuration::default();
    sim_only.execution.run_alternating_checker = false;
    sim_only.execution.run_simulation_checker = true;
    sim_only.simulation.seed = Some(42);
    assert!(check(c1.clone(), c2.clone(), sim_only).considered_equivalent());

    let mut measure_aware = Configuration::default();
    measure_aware.optimizations.remove_diagonal_gates_before_measure = true;
    assert_eq!(
        check(c1, c2, measure_aware),
        EquivalenceCriterion::Equivalent
    );
}

#[test]
fn dynamic_bernstein_vazirani_matches_static() {
    let c1 = bernstein_vazirani(0b1111, 4);
    let c2 = bernstein_vazirani_dynamic(0b1111, 4);
    let mut config = Configuration::default();
    config.optimizations.transform_dynamic_circuit = true;
    assert_eq!(check(c1, c2, config), EquivalenceCriterion::Equivalent);
}

#[test]
fn dynamic_circuits_need_the_transformation() {
    let c1 = bernstein_vazirani(0b101, 3);
    let c2 = bernstein_vazirani_dynamic(0b101, 3);
    let err = EquivalenceCheckingManager::new(c1, c2, Configuration::default()).unwrap_err();
    assert!(matches!(err, CheckError::DynamicCircuitUnsupported));
}

#[test]
fn no_enabled_checkers_yield_no_information() {
    let mut c1 = Circuit::new(1);
    c1.h(0);
    let c2 = c1.clone();
    let mut config = Configuration::default();
    config.execution.run_alternating_checker = false;
    config.execution.run_simulation_checker = false;
    config.execution.run_construction_checker = false;
    assert_eq!(check(c1, c2, config), EquivalenceCriterion::NoInformation);
}

#[test]
fn pauli_anticommutation_is_a_global_phase() {
    let mut c1 = Circuit::new(1);
    c1.z(0);
    c1.x(0);
    let mut c2 = Circuit::new(1);
    c2.x(0);
    c2.z(0);
    assert_eq!(
        check(c1, c2, Configuration::default()),
        EquivalenceCriterion::EquivalentUpToGlobalPhase
    );
}

#[test]
fn cnot_decomposition_under_all_schemes() {
    for scheme in [
        ApplicationSchemeType::OneToOne,
        ApplicationSchemeType::Proportional,
        ApplicationSchemeType::GateCost,
        ApplicationSchemeType::Lookahead,
    ] {
        let mut c1 = Circuit::new(2);
        c1.cx(0, 1);
        let mut c2 = Circuit::new(2);
        c2.h(1);
        c2.cz(0, 1);
        c2.h(1);
        let mut config = Configuration::default();
        config.application.alternating_scheme = scheme;
        assert_eq!(
            check(c1, c2, config),
            EquivalenceCriterion::Equivalent,
            "scheme {scheme}"
        );
    }
}

#[test]
fn construction_checker_agrees() {
    let mut c1 = Circuit::new(2);
    c1.swap(0, 1);
    let mut c2 = Circuit::new(2);
    c2.cx(0, 1);
    c2.cx(1, 0);
    c2.cx(0, 1);
    let mut config = Configuration::default();
    config.execution.run_alternating_checker = false;
    config.execution.run_simulation_checker = false;
    config.execution.run_construction_checker = true;
    assert_eq!(check(c1, c2, config), EquivalenceCriterion::Equivalent);
}

#[test]
fn differing_register_widths_are_padded() {
    let mut c1 = Circuit::new(1);
    c1.x(0);
    let mut c2 = Circuit::new(2);
    c2.x(0);
    assert_eq!(
        check(c1, c2, Configuration::default()),
        EquivalenceCriterion::Equivalent
    );
}

#[test]
fn strict_trace_threshold_rejects_numerical_drift() {
    // H·H is the identity up to floating point noise, X·X exactly.
    let mut drifted = Circuit::new(1);
    drifted.h(0);
    drifted.h(0);
    let mut exact = Circuit::new(1);
    exact.x(0);
    exact.x(0);
    let empty = Circuit::new(1);

    let mut config = Configuration::default();
    config.execution.run_simulation_checker = false;
    config.functionality.trace_threshold = 0.0;
    assert_eq!(
        check(drifted, empty.clone(), config.clone()),
        EquivalenceCriterion::NotEquivalent
    );
    assert_eq!(
        check(exact, empty, config),
        EquivalenceCriterion::Equivalent
    );
}

#[test]
fn circuit_times_its_inverse_is_the_identity() {
    let mut c = Circuit::new(2);
    c.h(0);
    c.cx(0, 1);
    c.t(1);
    c.s(0);

    let mut folded = c.clone();
    for op in c.invert().operations() {
        folded.add(op.clone()).unwrap();
    }
    assert_eq!(
        check(folded, Circuit::new(2), Configuration::default()),
        EquivalenceCriterion::Equivalent
    );

    let double_inverse = c.invert().invert();
    assert_eq!(
        check(c, double_inverse, Configuration::default()),
        EquivalenceCriterion::Equivalent
    );
}

#[test]
fn gate_cost_profile_drives_the_interleaving() {
    let mut path = std::env::temp_dir();
    path.push("eqcheck_integration_profile.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "# each x on the left is worth three on the right").unwrap();
    writeln!(file, "x 0 3").unwrap();
    drop(file);

    let mut c1 = Circuit::new(1);
    c1.x(0);
    let mut c2 = Circuit::new(1);
    c2.x(0);
    c2.x(0);
    c2.x(0);
    let mut config = Configuration::default();
    config.application.alternating_scheme = ApplicationSchemeType::GateCost;
    config.application.profile_location = Some(path.clone());
    assert_eq!(check(c1, c2, config), EquivalenceCriterion::Equivalent);
    std::fs::remove_file(&path).ok();
}

#[test]
fn malformed_profile_is_reported() {
    let mut path = std::env::temp_dir();
    path.push("eqcheck_integration_bad_profile.txt");
    std::fs::write(&path, "x zero 3\n").unwrap();

    let mut c1 = Circuit::new(1);
    c1.x(0);
    let c2_ops = {
        let mut c = Circuit::new(1);
        c.x(0);
        c.i(0);
        c
    };
    let mut config = Configuration::default();
    config.application.alternating_scheme = ApplicationSchemeType::GateCost;
    config.application.profile_location = Some(path.clone());
    let err = EquivalenceCheckingManager::new(c1, c2_ops, config)
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(err, CheckError::ProfileUnreadable(_)));
    std::fs::remove_file(&path).ok();
}

#[test]
fn lookahead_is_alternating_only() {
    let mut c1 = Circuit::new(1);
    c1.x(0);
    let mut c2 = Circuit::new(1);
    c2.x(0);
    c2.i(0);
    let mut config = Configuration::default();
    config.execution.run_alternating_checker = false;
    config.execution.run_simulation_checker = true;
    config.application.simulation_scheme = ApplicationSchemeType::Lookahead;
    let err = EquivalenceCheckingManager::new(c1, c2, config)
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(
        err,
        CheckError::UnsupportedScheme(ApplicationSchemeType::Lookahead, "simulation")
    ));
}

#[test]
fn node_limit_aborts_the_check() {
    let mut c1 = Circuit::new(3);
    c1.h(0);
    c1.cx(0, 1);
    c1.cx(1, 2);
    let mut c2 = Circuit::new(3);
    c2.h(0);
    c2.cx(0, 1);
    c2.cx(0, 2);
    let mut config = Configuration::default();
    config.execution.node_limit = Some(1);
    let err = EquivalenceCheckingManager::new(c1, c2, config)
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(err, CheckError::OutOfNodes(1)));
}

#[test]
fn output_permutation_mismatch_can_be_declared_garbage() {
    let mut c1 = Circuit::new(2);
    c1.x(0);
    let mut c2 = Circuit::new(2);
    c2.x(0);
    c2.set_output_permutation(Permutation::from_map(vec![1, 0]));

    assert_eq!(
        check(c1.clone(), c2.clone(), Configuration::default()),
        EquivalenceCriterion::NotEquivalent
    );

    let mut config = Configuration::default();
    config.optimizations.fix_output_permutation_mismatch = true;
    assert!(check(c1, c2, config).considered_equivalent());
}

#[test]
fn garbage_semantics_discard_outputs_not_inputs() {
    // A gate that only scrambles an unread output is fine; a gate that
    // routes an unread wire into an observed output is not.
    let mut harmless = Circuit::new(2);
    harmless.x(0);
    harmless.set_garbage(0);
    let mut reference = Circuit::new(2);
    reference.set_garbage(0);
    assert_eq!(
        check(harmless, reference.clone(), Configuration::default()),
        EquivalenceCriterion::Equivalent
    );

    let mut leaking = Circuit::new(2);
    leaking.cx(0, 1);
    leaking.set_garbage(0);
    assert_eq!(
        check(leaking, reference, Configuration::default()),
        EquivalenceCriterion::NotEquivalent
    );
}

#[test]
fn lookahead_runs_are_deterministic() {
    let build = || {
        let mut c1 = Circuit::new(3);
        c1.h(0);
        c1.cx(0, 1);
        c1.cx(1, 2);
        c1.t(2);
        let mut c2 = Circuit::new(3);
        c2.h(0);
        c2.cx(0, 1);
        c2.h(2);
        c2.cz(1, 2);
        c2.h(2);
        c2.t(2);
        let mut config = Configuration::default();
        config.application.alternating_scheme = ApplicationSchemeType::Lookahead;
        EquivalenceCheckingManager::new(c1, c2, config)
            .unwrap()
            .run()
            .unwrap()
    };
    let first = build();
    let second = build();
    assert_eq!(first.equivalence(), second.equivalence());
    assert_eq!(
        first.checks()[0].max_active_nodes,
        second.checks()[0].max_active_nodes
    );
}

#[test]
fn empty_circuits_are_equivalent() {
    let results = EquivalenceCheckingManager::new(
        Circuit::new(2),
        Circuit::new(2),
        Configuration::default(),
    )
    .unwrap()
    .run()
    .unwrap();
    assert_eq!(results.equivalence(), EquivalenceCriterion::Equivalent);
    let json = results.json().unwrap();
    assert!(json.contains("\"equivalent\""));
}
