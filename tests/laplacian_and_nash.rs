use poprank_core::interaction::Interaction;
use poprank_core::laplacian::{laplacian, rank, LaplacianConfig};
use poprank_core::nash::{nash_avg, NashConfig};
use poprank_core::rate::Rate;

#[test]
fn laplacian_ranks_an_undefeated_player_first() {
    let players = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let mut interactions = Vec::new();
    for _ in 0..8 {
        interactions.push(Interaction::new(vec!["a".into(), "b".into()], vec![1.0, 0.0]));
        interactions.push(Interaction::new(vec!["a".into(), "c".into()], vec![1.0, 0.0]));
        interactions.push(Interaction::new(vec!["b".into(), "c".into()], vec![1.0, 0.0]));
    }

    let result = laplacian(&players, &interactions, LaplacianConfig::default()).unwrap();
    assert_eq!(rank(&result), vec![0, 1, 2]);

    let sum: f64 = result.iter().map(Rate::mu).sum();
    assert!((sum - 1.0).abs() < 1e-6);
}

#[test]
fn nash_average_matches_rock_paper_scissors_uniform() {
    let players = vec!["rock".to_string(), "paper".to_string(), "scissors".to_string()];
    let interactions = vec![
        Interaction::new(vec!["paper".into(), "rock".into()], vec![1.0, 0.0]),
        Interaction::new(vec!["scissors".into(), "paper".into()], vec![1.0, 0.0]),
        Interaction::new(vec!["rock".into(), "scissors".into()], vec![1.0, 0.0]),
    ];

    let config = NashConfig {
        iterations: 3_000,
        ..NashConfig::default()
    };
    let result = nash_avg(&players, &interactions, config).unwrap();
    for rate in &result {
        assert!((rate.mu() - 1.0 / 3.0).abs() < 0.1);
    }
}
