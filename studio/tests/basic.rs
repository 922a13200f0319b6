use std::path::Path;
use std::process::{Command, Output};

const INDEX: &str = r#"{
    "packages": [
        { "package_id": "rmx_text", "name": "Text Processing", "version": "5.1.0" },
        { "package_id": "rmx_web", "name": "Web Mining", "version": "5.1.2" }
    ],
    "tabs": {
        "updates": ["rmx_text", "rmx_gone", "rmx_web"],
        "top_rated": []
    }
}"#;

fn studio(config_dir: &Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_studio");
    let settings = config_dir.join("missing-settings.toml");
    Command::new(exe)
        .arg("--settings")
        .arg(&settings)
        .arg("--config-dir")
        .arg(config_dir)
        .args(args)
        .output()
        .expect("run studio")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn config_types_lists_builtins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = studio(dir.path(), &["config", "types"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("database - Database Connection"));
    assert!(out.contains("web_service - Web Service"));
}

#[test]
fn created_objects_persist_between_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = studio(
        dir.path(),
        &["config", "create", "database", "warehouse", "--param", "url=jdbc:pg://db/w"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(dir.path().join("database.xml").exists());

    let output = studio(dir.path(), &["config", "show", "database", "warehouse"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("url: jdbc:pg://db/w"));
    assert!(out.contains("timeout: 30"));

    let output = studio(dir.path(), &["config", "list", "database", "--json-query"]);
    let listed: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(listed[0]["name"], "warehouse");

    let output = studio(dir.path(), &["config", "remove", "database", "warehouse"]);
    assert!(output.status.success());
    let output = studio(dir.path(), &["config", "show", "database", "warehouse"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No such configured object of name warehouse"));
}

#[test]
fn invalid_parameters_are_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = studio(
        dir.path(),
        &["config", "create", "web_service", "api", "--param", "method=PATCH"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("[Studio][ERROR]"));

    let output = studio(dir.path(), &["config", "list", "ftp"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No such configuration type: ftp"));
}

#[test]
fn export_and_import_round_trip() {
    let source = tempfile::tempdir().expect("tempdir");
    studio(
        source.path(),
        &["config", "create", "database", "crm", "--param", "url=a&b"],
    );
    let output = studio(source.path(), &["config", "export", "database"]);
    assert!(output.status.success());
    let xml = stdout(&output);
    assert!(xml.contains("<database name=\"crm\">"));

    let target = tempfile::tempdir().expect("tempdir");
    let file = target.path().join("export.xml");
    std::fs::write(&file, xml).unwrap();
    let output = studio(
        target.path(),
        &["config", "import", "database", file.to_str().unwrap()],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Imported 1 objects"));

    let output = studio(target.path(), &["config", "show", "database", "crm"]);
    assert!(stdout(&output).contains("url: a&b"));
}

#[test]
fn packages_prints_resolved_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let index = dir.path().join("index.json");
    std::fs::write(&index, INDEX).unwrap();

    let output = studio(dir.path(), &["packages", "--index", index.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Text Processing 5.1.0 (rmx_text)"));
    assert!(out.contains("Web Mining 5.1.2 (rmx_web)"));
    assert!(!out.contains("rmx_gone"));

    let output = studio(
        dir.path(),
        &["packages", "--index", index.to_str().unwrap(), "--tab", "top_rated"],
    );
    assert!(stdout(&output).contains("No packages available"));
}

#[test]
fn packages_requires_an_index() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = studio(dir.path(), &["packages"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no package index given"));

    let output = studio(dir.path(), &["packages", "--index", "x.json", "--tab", "search"]);
    assert!(stderr(&output).contains("unknown package tab 'search'"));
}

#[test]
fn replace_regex_command() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = studio(dir.path(), &["expr", "replace-regex", "a1b22", "[0-9]+", "#"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "a#b#");

    let output = studio(dir.path(), &["expr", "replace-regex", "abc", "", "x"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("The target String must contain text"));
}

#[test]
fn style_selection_is_stored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = studio(dir.path(), &["style", "show"]);
    assert!(stdout(&output).contains("* [0] Colorful"));

    let output = studio(dir.path(), &["style", "select", "1"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(dir.path().join("plotter_style.xml").exists());

    let output = studio(dir.path(), &["style", "show"]);
    assert!(stdout(&output).contains("* [1] Forest"));

    let output = studio(dir.path(), &["style", "select", "7"]);
    assert!(!output.status.success());
}

#[test]
fn settings_file_supplies_package_index() {
    let dir = tempfile::tempdir().expect("tempdir");
    let index = dir.path().join("index.json");
    std::fs::write(&index, INDEX).unwrap();
    let settings = dir.path().join("studio.toml");
    std::fs::write(
        &settings,
        format!("package_index = {:?}\n", index.to_str().unwrap()),
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_studio"))
        .arg("--settings")
        .arg(&settings)
        .args(["packages", "--config-dir"])
        .arg(dir.path())
        .output()
        .expect("run studio");
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("rmx_web"));
}
