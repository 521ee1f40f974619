use std::path::PathBuf;
use std::process::Command;

#[test]
fn cli_renders_fixture_to_json() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let in_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("cube.json");
    let out_path = dir.join("render.json");
    let _ = std::fs::remove_file(&out_path);

    let exe = env!("CARGO_BIN_EXE_flatshade");
    let status = Command::new(exe)
        .arg("--in")
        .arg(&in_path)
        .arg("--width")
        .arg("200")
        .arg("--height")
        .arg("200")
        .arg("--out")
        .arg(&out_path)
        .status()
        .expect("spawn flatshade");
    assert!(status.success());

    let out = std::fs::read_to_string(&out_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["name"], "spinning cube");
    assert_eq!(value["frames"].as_array().unwrap().len(), 2);
}

#[test]
fn cli_fails_cleanly_on_missing_file() {
    let exe = env!("CARGO_BIN_EXE_flatshade");
    let output = Command::new(exe)
        .arg("--in")
        .arg("does/not/exist.json")
        .arg("--width")
        .arg("100")
        .arg("--height")
        .arg("100")
        .output()
        .expect("spawn flatshade");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("reading project file"));
}
