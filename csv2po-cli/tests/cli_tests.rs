use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn csv2po_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("csv2po"))
}

/// Creates `<root>/themes/custom/<name>` with its info file and returns it.
fn theme(root: &Path, name: &str) -> PathBuf {
    let dir = root.join("themes/custom").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.info.yml", name)), "type: theme\n").unwrap();
    dir
}

fn table(dir: &Path) -> PathBuf {
    let path = dir.join("sheet.csv");
    fs::write(
        &path,
        "EN,FR,DE,PAGE\nHello,Bonjour,Hallo,Home\nBye,Au revoir,Tschüss,About\n",
    )
    .unwrap();
    path
}

#[test]
fn test_convert_local_table_writes_catalogs() {
    let site = TempDir::new().unwrap();
    let olivero = theme(site.path(), "olivero");
    let sheet = table(site.path());

    let output = csv2po_cmd()
        .args(["convert", sheet.to_str().unwrap(), "--root"])
        .arg(site.path())
        .args(["--extension-name", "olivero", "--known-languages"])
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let fr = olivero.join("translations/olivero.fr.po");
    let de = olivero.join("translations/olivero.de.po");
    assert!(fr.is_file());
    assert!(de.is_file());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("olivero.fr.po"));
    assert!(stdout.contains("olivero.de.po"));

    let content = fs::read_to_string(fr).unwrap();
    assert!(content.contains("msgid \"Hello\"\nmsgstr \"Bonjour\""));
    assert!(content.contains("# ------ HOME"));
    assert!(content.contains("# ------ ABOUT"));
}

#[test]
fn test_active_theme_is_used_without_extension_name() {
    let site = TempDir::new().unwrap();
    let olivero = theme(site.path(), "olivero");
    let sheet = table(site.path());

    let output = csv2po_cmd()
        .args(["convert", sheet.to_str().unwrap(), "--root"])
        .arg(site.path())
        .args(["--active-theme", "olivero", "--enabled-languages", "de"])
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(olivero.join("translations/olivero.de.po").is_file());
    assert!(!olivero.join("translations/olivero.fr.po").exists());
}

#[test]
fn test_module_without_name_fails() {
    let site = TempDir::new().unwrap();
    let sheet = table(site.path());

    let output = csv2po_cmd()
        .args(["convert", sheet.to_str().unwrap(), "--root"])
        .arg(site.path())
        .args(["--extension-type", "module"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("extension_name"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_extension_type_is_rejected() {
    let output = csv2po_cmd()
        .args(["convert", "--extension-type", "profile"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown extension type"), "stderr: {}", stderr);
}

#[test]
fn test_merge_update_keeps_existing_entries() {
    let site = TempDir::new().unwrap();
    let olivero = theme(site.path(), "olivero");
    let sheet = table(site.path());
    let run = |extra: &[&str]| {
        csv2po_cmd()
            .args(["convert", sheet.to_str().unwrap(), "--root"])
            .arg(site.path())
            .args(["--extension-name", "olivero", "--known-languages"])
            .args(extra)
            .output()
            .expect("Failed to execute command")
    };

    assert!(run(&[]).status.success());
    fs::write(&sheet, "EN,FR\nHello,Salut\nWelcome,Bienvenue\n").unwrap();
    let output = run(&["--merge", "--allow-update"]);
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let content = fs::read_to_string(olivero.join("translations/olivero.fr.po")).unwrap();
    assert!(content.contains("msgstr \"Salut\""));
    assert!(!content.contains("msgstr \"Bonjour\""));
    assert!(content.contains("msgstr \"Au revoir\""));
    assert!(content.contains("msgstr \"Bienvenue\""));
}

#[test]
fn test_allow_update_without_merge_warns() {
    let site = TempDir::new().unwrap();
    theme(site.path(), "olivero");
    let sheet = table(site.path());

    let output = csv2po_cmd()
        .env_remove("RUST_LOG")
        .args(["convert", sheet.to_str().unwrap(), "--root"])
        .arg(site.path())
        .args(["--extension-name", "olivero", "--known-languages", "--allow-update"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("`allow_update` has no effect"), "stderr: {}", stderr);
}

#[test]
fn test_merge_and_replace_all_conflict() {
    let output = csv2po_cmd()
        .args(["convert", "--merge", "--replace-all"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--replace-all"), "stderr: {}", stderr);
}

#[test]
fn test_report_json_is_written() {
    let site = TempDir::new().unwrap();
    theme(site.path(), "olivero");
    let sheet = table(site.path());
    let report = site.path().join("report.json");

    let output = csv2po_cmd()
        .args(["convert", sheet.to_str().unwrap(), "--root"])
        .arg(site.path())
        .args(["--extension-name", "olivero", "--known-languages", "--quiet"])
        .arg("--report-json")
        .arg(&report)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["rows"], 2);
    assert_eq!(json["languages"], serde_json::json!(["fr", "de"]));
    assert_eq!(json["written"].as_array().unwrap().len(), 2);
    assert_eq!(json["written"][0]["stats"]["created"], 2);
    assert_eq!(json["source"]["kind"], "local");
}

#[test]
fn test_table_without_language_columns_writes_nothing() {
    let site = TempDir::new().unwrap();
    theme(site.path(), "olivero");
    let sheet = site.path().join("sheet.csv");
    fs::write(&sheet, "EN,NOTES\nHello,greeting\n").unwrap();

    let output = csv2po_cmd()
        .args(["convert", sheet.to_str().unwrap(), "--root"])
        .arg(site.path())
        .args(["--extension-name", "olivero", "--known-languages"])
        .output()
        .expect("Failed to execute command");

    // No language means nothing failed either.
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no target language"), "stderr: {}", stderr);
}
