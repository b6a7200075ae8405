use std::path::PathBuf;
use std::process::{Command, Stdio};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const RECORD: &str = r#"{
  "title": { "english": "Haikyu!!", "romaji": "Haikyuu!!" },
  "coverImage": { "extraLarge": "https://example.invalid/poster.jpg" },
  "averageScore": 84,
  "genres": ["Comedy", "Drama", "Sports"],
  "description": "A <i>short</i> boy dreams of playing volleyball.<br>He joins Karasuno.",
  "status": "FINISHED",
  "season": "SPRING",
  "seasonYear": 2014
}"#;

fn hexthumb() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hexthumb"))
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hexthumb_cli_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir
}

#[test]
fn render_offline_record_to_file() {
    let dir = scratch_dir("file");
    let record = dir.join("media.json");
    let output = dir.join("out").join("thumb.png");
    std::fs::write(&record, RECORD).unwrap();

    let status = hexthumb()
        .arg("render")
        .arg("--record")
        .arg(&record)
        .arg("--fonts")
        .arg(dir.join("no-fonts"))
        .arg("--output")
        .arg(&output)
        .arg("--offline")
        .status()
        .expect("failed to spawn hexthumb");

    assert!(status.success(), "render failed: {:?}", status);
    let bytes = std::fs::read(&output).expect("output PNG missing");
    assert_eq!(&bytes[..8], &PNG_SIGNATURE);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn render_to_stdout_keeps_logs_on_stderr() {
    let dir = scratch_dir("stdout");
    let record = dir.join("media.json");
    std::fs::write(&record, RECORD).unwrap();

    let output = hexthumb()
        .args(["render", "--preset", "cards", "--offline", "--output", "-"])
        .arg("--record")
        .arg(&record)
        .arg("--fonts")
        .arg(dir.join("no-fonts"))
        .env("RUST_LOG", "debug")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to spawn hexthumb");

    assert!(output.status.success(), "render failed: {:?}", output.status);
    assert_eq!(&output.stdout[..8], &PNG_SIGNATURE);
    assert!(!output.stderr.is_empty(), "expected log output on stderr");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn record_file_may_name_a_local_poster() {
    let dir = scratch_dir("local_poster");
    let poster = dir.join("poster.png");
    let frame = hexthumb_core::FrameBuffer::solid(60, 90, &hexthumb_core::Color::rgb8(220, 40, 40));
    hexthumb_render::PngEncoder::encode_to_file(&frame, &poster).unwrap();

    let record = dir.join("media.json");
    let json = serde_json::json!({
        "title": { "english": "Haikyu!!" },
        "coverImage": { "extraLarge": poster.to_str().unwrap() },
    });
    std::fs::write(&record, json.to_string()).unwrap();

    let render = |name: &str, offline: bool| {
        let output = dir.join(name);
        let mut cmd = hexthumb();
        cmd.arg("render")
            .arg("--record")
            .arg(&record)
            .arg("--fonts")
            .arg(dir.join("no-fonts"))
            .arg("--output")
            .arg(&output);
        if offline {
            cmd.arg("--offline");
        }
        assert!(cmd.status().expect("failed to spawn hexthumb").success());
        std::fs::read(&output).expect("output PNG missing")
    };

    let with_poster = render("poster.out.png", false);
    let placeholder = render("offline.out.png", true);
    assert_ne!(with_poster, placeholder);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn presets_lists_every_preset() {
    let output = hexthumb().arg("presets").output().expect("failed to spawn hexthumb");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names, ["classic", "cards", "pills"]);
}

#[test]
fn dump_config_emits_loadable_toml() {
    let output = hexthumb()
        .args(["dump-config", "--preset", "pills"])
        .output()
        .expect("failed to spawn hexthumb");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let config = hexthumb_core::LayoutConfig::from_toml_str(&stdout).unwrap();
    assert_eq!(config.preset, hexthumb_core::LayoutPreset::Pills);
}

#[test]
fn unknown_preset_fails() {
    let output = hexthumb()
        .args(["dump-config", "--preset", "neon"])
        .output()
        .expect("failed to spawn hexthumb");
    assert!(!output.status.success());
}
