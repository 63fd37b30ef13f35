//! End-to-end arena runs.

use std::path::Path;

use arena::{Arena, ArenaConfig};

fn profiles_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../combat-content/data/profiles")
}

#[test]
fn builtin_matchup_runs_to_budget_or_decision() {
    let config = ArenaConfig::default();
    let spawned: usize = config.teams.iter().map(|t| t.size).sum();

    let mut arena = Arena::from_config(config).unwrap();
    let summary = arena.run();

    assert!(summary.stats.ticks > 0);
    assert!(summary.stats.ticks <= 600);
    assert!(summary.stats.skills_used > 0);

    let standing: usize = summary.survivors.iter().map(|(_, n)| n).sum();
    assert_eq!(summary.stats.deaths as usize, spawned - standing);

    if let Some(winner) = summary.winner {
        for (team, alive) in &summary.survivors {
            assert_eq!(*alive > 0, *team == winner);
        }
    } else {
        assert_eq!(summary.stats.ticks, 600);
    }
}

#[test]
fn config_file_with_profile_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arena.toml");
    std::fs::write(
        &path,
        format!(
            r#"
            seed = 3
            ticks = 40
            profile_dir = "{}"

            [[teams]]
            profile = "guardian"
            size = 2
            spawn = [-2.0, 0.0, 0.0]

            [[teams.skills]]
            name = "Strike"
            cooldown = 1.2
            damage = 0.07

            [[teams]]
            profile = "guardian"
            size = 2
            spawn = [2.0, 0.0, 0.0]

            [[teams.skills]]
            name = "Strike"
            cooldown = 1.2
            damage = 0.07
            "#,
            profiles_dir().display()
        ),
    )
    .unwrap();

    let config = ArenaConfig::from_file(&path).unwrap();
    assert_eq!(config.seed, 3);

    let mut arena = Arena::from_config(config).unwrap();
    let summary = arena.run();
    assert_eq!(summary.stats.ticks, 40);
    assert!(summary.stats.hits > 0);
    assert!(
        arena
            .agents()
            .iter()
            .all(|agent| agent.state_name() != "Guard")
    );
}

#[test]
fn missing_profile_in_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ArenaConfig::default();
    config.profile_dir = Some(dir.path().to_path_buf());

    let err = Arena::from_config(config).unwrap_err();
    assert!(err.to_string().contains("skirmisher"));
}

#[test]
fn missing_config_file_reports_path() {
    let err = ArenaConfig::from_file(Path::new("/nonexistent/arena.toml")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/arena.toml"));
}
