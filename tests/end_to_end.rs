use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rusty_contour::data::model::{ObservationTable, PointCloud};
use rusty_contour::model::{self, Estimator, Gamma, ModelConfig, NamedModel};
use rusty_contour::pipeline::{self, ExampleConfig, PipelineConfig};
use rusty_contour::GridSpec;

fn three_models(fraction: f64) -> Vec<NamedModel> {
    vec![
        NamedModel::new(
            "Empirical Covariance",
            ModelConfig::EmpiricalCovariance {
                contamination: fraction,
            },
        ),
        NamedModel::new(
            "Robust Covariance",
            ModelConfig::RobustCovariance {
                contamination: fraction,
                support_fraction: None,
                seed: 3,
            },
        ),
        NamedModel::new(
            "OCSVM",
            ModelConfig::OneClassSvm {
                nu: fraction,
                gamma: Gamma::Value(0.5),
                tol: 1e-3,
                max_iter: 1_000_000,
            },
        ),
    ]
}

fn gaussian_cluster(n: usize, seed: u64) -> Vec<[f64; 2]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut normal = || {
        let u1: f64 = rng.gen::<f64>().max(1e-15);
        let u2: f64 = rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    };
    (0..n).map(|_| [normal(), 0.8 * normal()]).collect()
}

#[test]
fn covariance_models_flag_the_far_point() {
    let cloud = PointCloud::new(vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0], [10.0, 10.0]]);

    for named in three_models(0.2).into_iter().take(2) {
        let fitted = named.config.fit(&cloud).unwrap();
        let scores = model::score(fitted.as_ref(), &cloud.points).unwrap();
        assert!(scores[4] < 0.0, "{}: outlier scored {}", named.name, scores[4]);
        for (i, s) in scores[..4].iter().enumerate() {
            assert!(*s > 0.0, "{}: clustered point {i} scored {s}", named.name);
        }
    }
}

#[test]
fn boundaries_enclose_a_tight_cluster() {
    let points = gaussian_cluster(200, 11);
    let rows: Vec<Vec<f64>> = points.iter().map(|p| vec![p[0], p[1]]).collect();
    let table = ObservationTable::new(vec!["u".into(), "v".into()], rows).unwrap();

    let config = PipelineConfig {
        examples: vec![ExampleConfig {
            name: "cluster".into(),
            columns: [0, 1],
            grid: GridSpec {
                x_min: -6.0,
                x_max: 6.0,
                y_min: -6.0,
                y_max: 6.0,
                nx: 241,
                ny: 241,
            },
            standardize: false,
        }],
        models: three_models(0.2),
    };

    let results = pipeline::run(&table, &config).unwrap();
    assert_eq!(results.len(), 1);
    let result = &results[0];

    let names: Vec<&str> = result.boundaries.iter().map(|b| b.model.as_str()).collect();
    assert_eq!(names, ["Empirical Covariance", "Robust Covariance", "OCSVM"]);

    for boundary in &result.boundaries {
        let set = boundary.outcome.as_ref().unwrap();
        assert!(!set.is_empty(), "{} produced no boundary", boundary.model);
        assert!(set.polylines.iter().all(|p| p.closed), "{} has open polylines", boundary.model);
        let fraction = set.enclosed_fraction(&result.cloud.points);
        assert!(
            fraction >= 0.7,
            "{} encloses only {:.2} of the points",
            boundary.model,
            fraction
        );
    }
}

#[test]
fn repeated_runs_are_identical() {
    let points = gaussian_cluster(80, 5);
    let rows: Vec<Vec<f64>> = points.iter().map(|p| vec![p[0], p[1]]).collect();
    let table = ObservationTable::new(vec!["u".into(), "v".into()], rows).unwrap();
    let example = ExampleConfig {
        name: "cluster".into(),
        columns: [0, 1],
        grid: GridSpec {
            x_min: -4.0,
            x_max: 4.0,
            y_min: -4.0,
            y_max: 4.0,
            nx: 80,
            ny: 80,
        },
        standardize: true,
    };
    let models = three_models(0.25);

    let first = pipeline::run_example(&table, &example, &models).unwrap();
    let second = pipeline::run_example(&table, &example, &models).unwrap();
    for (a, b) in first.boundaries.iter().zip(&second.boundaries) {
        assert_eq!(a.outcome, b.outcome);
    }
}
