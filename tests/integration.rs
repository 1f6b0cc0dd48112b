use std::{env, fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) -> (bool, String) {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_thermanom"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        String::from_utf8(output.stdout).expect("failed to convert stdout to string");

    (output.status.success(), stdout_str)
}

fn setup(name: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let data_contents = String::new()
        + "city,timestamp,season,temperature\n"
        + "Moscow,2020-01-05,winter,-10.0\n"
        + "Moscow,2020-01-20,winter,-12.0\n"
        + "Moscow,2020-02-05,winter,-8.0\n"
        + "Moscow,2020-12-10,winter,-11.0\n"
        + "Moscow,2021-07-01,summer,19.0\n"
        + "Moscow,2021-07-02,summer,21.0\n"
        + "Cairo,2021-07-01,summer,35.0\n";

    fs::write(test_dir.join("data.csv"), data_contents).expect("failed to write data file");

    test_dir
}

#[test]
fn basic_workflow() {
    let test_dir = setup("basic_workflow");
    let data = test_dir.join("data.csv");
    let data = data.to_str().expect("failed to convert data path to string");
    let out_dir = test_dir.join("out");
    let out_dir_str = out_dir.to_str().expect("failed to convert output path to string");

    let (ok, _) = run_bin(&["--data", data, "analyze", "--out-dir", out_dir_str]);
    assert!(ok, "analyze failed");

    let annotated = fs::read_to_string(out_dir.join("annotated.csv"))
        .expect("failed to read annotated file");
    assert_eq!(annotated.lines().count(), 8);

    let baselines = fs::read_to_string(out_dir.join("baselines.json"))
        .expect("failed to read baselines file");
    let baselines: serde_json::Value =
        serde_json::from_str(&baselines).expect("failed to parse baselines");
    assert_eq!(baselines.as_array().map(Vec::len), Some(3));

    let (ok, stdout) = run_bin(&[
        "--data", data, "evaluate", "--city", "Moscow", "--temperature=-14", "--season", "winter",
    ]);
    assert!(ok, "evaluate failed");
    let verdict: serde_json::Value = serde_json::from_str(&stdout).expect("failed to parse verdict");
    assert_eq!(verdict["is_anomalous"], true);

    let (ok, stdout) = run_bin(&[
        "--data", data, "evaluate", "--city", "Moscow", "--temperature=-10", "--date", "2024-01-15",
    ]);
    assert!(ok, "evaluate with date failed");
    let verdict: serde_json::Value = serde_json::from_str(&stdout).expect("failed to parse verdict");
    assert_eq!(verdict["season"], "winter");
    assert_eq!(verdict["is_anomalous"], false);

    let (ok, stdout) = run_bin(&["--data", data, "describe", "--city", "Moscow", "--season", "summer"]);
    assert!(ok, "describe failed");
    let summary: serde_json::Value = serde_json::from_str(&stdout).expect("failed to parse summary");
    assert_eq!(summary["count"], 2);
    assert_eq!(summary["mean"], 20.0);

    let (ok, stdout) = run_bin(&["--data", data, "profile", "--city", "Moscow"]);
    assert!(ok, "profile failed");
    let profile: serde_json::Value = serde_json::from_str(&stdout).expect("failed to parse profile");
    assert_eq!(profile["first_year"], 2020);
    assert_eq!(profile["last_year"], 2021);

    let (ok, stdout) = run_bin(&["--data", data, "cities"]);
    assert!(ok, "cities failed");
    let cities: Vec<String> = serde_json::from_str(&stdout).expect("failed to parse cities");
    assert_eq!(cities, vec!["Cairo", "Moscow"]);

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn evaluation_failures_exit_with_error() {
    let test_dir = setup("evaluation_failures");
    let data = test_dir.join("data.csv");
    let data = data.to_str().expect("failed to convert data path to string");

    // No spring history for Moscow.
    let (ok, _) = run_bin(&[
        "--data", data, "evaluate", "--city", "Moscow", "--temperature", "5", "--season", "spring",
    ]);
    assert!(!ok);

    let (ok, _) = run_bin(&[
        "--data", data, "evaluate", "--city", "Moscow", "--temperature", "NaN", "--season", "winter",
    ]);
    assert!(!ok);

    // Single summer reading for Cairo under the default reject policy.
    let (ok, _) = run_bin(&[
        "--data", data, "evaluate", "--city", "Cairo", "--temperature", "35", "--season", "summer",
    ]);
    assert!(!ok);

    let config = test_dir.join("config.toml");
    fs::write(&config, "[evaluation]\nsingleton_policy = \"accept\"\n")
        .expect("failed to write config file");
    let config = config.to_str().expect("failed to convert config path to string");
    let (ok, stdout) = run_bin(&[
        "--data", data, "--config", config, "evaluate", "--city", "Cairo", "--temperature", "35",
        "--season", "summer",
    ]);
    assert!(ok, "accept policy evaluation failed");
    let verdict: serde_json::Value = serde_json::from_str(&stdout).expect("failed to parse verdict");
    assert_eq!(verdict["is_anomalous"], false);
    assert_eq!(verdict["band"], serde_json::Value::Null);

    let bad_data = test_dir.join("bad.csv");
    fs::write(&bad_data, "city,timestamp,temperature\nOslo,not-a-date,1.0\n")
        .expect("failed to write data file");
    let bad_data = bad_data.to_str().expect("failed to convert data path to string");
    let (ok, _) = run_bin(&["--data", bad_data, "cities"]);
    assert!(!ok);

    fs::remove_dir_all(&test_dir).ok();
}
