//! Regression against established field values for the default configuration:
//! 100 × 180 grid, unit steps, vacuum, Gaussian pulse (t0 = 30, σ² = 100)
//! soft-injected at node (50, 90).

use approx::assert_relative_eq;
use polaris_core::{Grid, Medium, SimulationParams, Source, TimeStepper};

fn default_stepper() -> TimeStepper {
    let params = SimulationParams::default();
    let grid = Grid::new(params.grid.clone()).unwrap();
    TimeStepper::new(&params, Medium::vacuum(&grid), Source::default()).unwrap()
}

#[test]
fn test_first_step_excites_source_node_only() {
    let mut stepper = default_stepper();
    stepper.step();

    let expected = (-(29.0_f64 * 29.0) / 100.0).exp();
    assert_relative_eq!(stepper.e_z()[[50, 90]], 0.00022262985691888897, max_relative = 1e-12);
    assert_relative_eq!(stepper.e_z()[[50, 90]], expected, max_relative = 1e-12);

    let nonzero = stepper.e_z().iter().filter(|&&v| v != 0.0).count();
    assert_eq!(nonzero, 1);
    assert!(stepper.h_r().iter().all(|&v| v == 0.0));
    assert!(stepper.h_phi().iter().all(|&v| v == 0.0));
}

#[test]
fn test_second_step_values() {
    let mut stepper = default_stepper();
    stepper.step();
    stepper.step();

    assert_relative_eq!(stepper.e_z()[[50, 90]], 0.00017099465776480554, max_relative = 1e-9);
    assert_relative_eq!(stepper.h_r()[[50, 89]], -2.2262985691888896e-06, max_relative = 1e-9);
    assert_relative_eq!(stepper.h_phi()[[50, 90]], -0.00022262985691888897, max_relative = 1e-9);

    // Opposite sides of the source see opposite differences
    assert_relative_eq!(stepper.h_r()[[50, 90]], 2.2262985691888896e-06, max_relative = 1e-9);
    assert_relative_eq!(stepper.h_phi()[[49, 90]], 0.00022262985691888897, max_relative = 1e-9);
}

#[test]
fn test_step_sixty_values() {
    let mut stepper = default_stepper();
    for _ in 0..60 {
        stepper.step();
    }
    assert_eq!(stepper.current_step(), 60);

    let e_z = stepper.e_z();
    let h_r = stepper.h_r();
    let h_phi = stepper.h_phi();
    assert_relative_eq!(e_z[[50, 90]], -0.01460327367823435, max_relative = 1e-9);
    assert_relative_eq!(e_z[[40, 90]], -0.01246320318785417, max_relative = 1e-9);
    assert_relative_eq!(e_z[[45, 92]], 0.0002787592896828626, max_relative = 1e-9);
    assert_relative_eq!(e_z[[50, 60]], 4.739452418340789e-101, max_relative = 1e-9);
    assert_relative_eq!(h_r[[45, 90]], 0.09818688265865014, max_relative = 1e-9);
    assert_relative_eq!(h_phi[[44, 90]], -0.09869202185661818, max_relative = 1e-9);
    assert_relative_eq!(h_r[[50, 89]], -0.08423026365463876, max_relative = 1e-9);
    assert_relative_eq!(h_phi[[50, 90]], -0.08070002872455764, max_relative = 1e-9);
}
