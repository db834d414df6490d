use std::process::Command;

fn horde() -> Command {
    Command::new(env!("CARGO_BIN_EXE_horde"))
}

#[test]
fn runs_the_builtin_arena() {
    let output = horde()
        .args(["--ticks", "300", "--seed", "7"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch horde");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("wave "), "{stdout}");
    assert!(stdout.contains("simulated "), "{stdout}");
}

#[test]
fn same_seed_produces_the_same_report() {
    let run = || {
        horde()
            .args(["--ticks", "600", "--seed", "1234"])
            .env("RUST_LOG", "off")
            .output()
            .expect("failed to launch horde")
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn sample_config_runs() {
    let config = concat!(env!("CARGO_MANIFEST_DIR"), "/horde.toml");
    let output = horde()
        .args(["--config", config, "--ticks", "200"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch horde");
    assert!(output.status.success(), "{output:?}");
}

#[test]
fn malformed_map_is_reported() {
    let map = std::env::temp_dir().join(format!("horde-ragged-{}.txt", std::process::id()));
    std::fs::write(&map, "S.P\n..\n").expect("write map");

    let output = horde()
        .arg("--map")
        .arg(&map)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch horde");
    let _ = std::fs::remove_file(&map);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("row 1 has 2 tiles"), "{stderr}");
}
