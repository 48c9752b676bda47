//! Newton coupling at a synthetic bifurcation and conjunction.

use artery_fd::prelude::*;
use artery_fd::NewtonSolver;

fn vessels() -> [Vessel; 3] {
    let s = WallStiffness::default();
    [
        Vessel::uniform(VesselIndex::new(0), 0.1, 11, 0.010, s).unwrap(),
        Vessel::uniform(VesselIndex::new(1), 0.1, 11, 0.007, s).unwrap(),
        Vessel::uniform(VesselIndex::new(2), 0.1, 11, 0.006, s).unwrap(),
    ]
}

/// Rest state at the coupled nodes, as (A, q) pairs: parent end, then daughter starts.
fn rest(v: &[Vessel; 3]) -> Vec<f64> {
    vec![v[0].a0(10), 0.0, v[1].a0(0), 0.0, v[2].a0(0), 0.0]
}

fn norm(r: &[f64]) -> f64 {
    r.iter().map(|x| x * x).sum::<f64>().sqrt()
}

#[test]
fn test_bifurcation_converges_from_perturbed_guess() {
    let model = ElasticTube::blood();
    let bcs = ArterialBoundaries::new(Inlet::flow(|_| 0.0));
    let v = vessels();
    let refs = [&v[0], &v[1], &v[2]];

    // Interior neighbours at rest: the rest state solves the system exactly.
    let u = rest(&v);
    let exact = bcs.bifurcation_residual(&model, &u, &u, 1e-5, refs);
    assert!(norm(&exact) < 1e-12);

    let mut x0 = rest(&v);
    for (k, x) in x0.iter_mut().enumerate() {
        *x = if k % 2 == 0 { *x * 1.01 } else { 1e-6 };
    }

    let newton = NewtonSolver::default();
    let outcome = newton
        .solve(
            |x| bcs.bifurcation_residual(&model, x, &u, 1e-5, refs),
            |x| bcs.bifurcation_jacobian(&model, x, &u, 1e-5, refs),
            &x0,
        )
        .unwrap();

    assert!(outcome.converged);
    assert!(outcome.iterations < 10, "took {} iterations", outcome.iterations);
    assert!(outcome.residual_norm < 1e-9);
    for (k, (x, r)) in outcome.x.iter().zip(rest(&v)).enumerate() {
        if k % 2 == 0 {
            assert!((x - r).abs() < 1e-9 * r, "A[{k}] = {x}, expected {r}");
        } else {
            assert!(x.abs() < 1e-10, "q[{k}] = {x}");
        }
    }
}

#[test]
fn test_bifurcation_splits_incoming_characteristic() {
    let model = ElasticTube::blood();
    let bcs = ArterialBoundaries::new(Inlet::flow(|_| 0.0));
    let v = vessels();
    let refs = [&v[0], &v[1], &v[2]];

    // Parent interior carries a forward wave: raised area and positive flow.
    let mut u = rest(&v);
    u[0] *= 1.02;
    u[1] = 2e-6;

    let outcome = NewtonSolver::default()
        .solve(
            |x| bcs.bifurcation_residual(&model, x, &u, 1e-5, refs),
            |x| bcs.bifurcation_jacobian(&model, x, &u, 1e-5, refs),
            &rest(&v),
        )
        .unwrap();
    assert!(outcome.converged);
    assert!(outcome.iterations < 10);

    let x = &outcome.x;
    // Mass conservation and flow into both daughters.
    assert!((x[1] - x[3] - x[5]).abs() < 1e-9);
    assert!(x[3] > 0.0 && x[5] > 0.0);
    // Daughter areas rise above rest.
    assert!(x[2] > v[1].a0(0));
    assert!(x[4] > v[2].a0(0));
}

#[test]
fn test_conjunction_of_identical_vessels_is_continuous() {
    let model = ElasticTube::blood();
    let bcs = ArterialBoundaries::new(Inlet::flow(|_| 0.0));
    let s = WallStiffness::default();
    let a = Vessel::uniform(VesselIndex::new(0), 0.1, 11, 0.008, s).unwrap();
    let b = Vessel::uniform(VesselIndex::new(1), 0.1, 11, 0.008, s).unwrap();
    let a0 = a.a0(0);

    let u = vec![1.01 * a0, 1e-6, 1.005 * a0, 8e-7];
    let x0 = vec![a0, 0.0, a0, 0.0];
    let outcome = NewtonSolver::default()
        .solve(
            |x| bcs.conjunction_residual(&model, x, &u, 1e-5, [&a, &b]),
            |x| bcs.conjunction_jacobian(&model, x, &u, 1e-5, [&a, &b]),
            &x0,
        )
        .unwrap();

    assert!(outcome.converged);
    let x = &outcome.x;
    assert!((x[1] - x[3]).abs() < 1e-9);
    assert!((x[0] - x[2]).abs() < 1e-9 * a0);
}
