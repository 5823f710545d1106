use csv2po::{
    AssetPathResolver, CatalogCodec, Error, ExtensionType, Orchestrator, PoCodec, RunStatus,
    SyncConfig, TranslationKey,
};
use indoc::indoc;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Every asset lives directly below the site root.
struct FlatSite(PathBuf);

impl AssetPathResolver for FlatSite {
    fn resolve(&self, _kind: ExtensionType, name: &str) -> Option<PathBuf> {
        let dir = self.0.join(name);
        dir.is_dir().then_some(dir)
    }
}

fn site_with_table(table: &str) -> (TempDir, PathBuf) {
    let site = TempDir::new().unwrap();
    fs::create_dir_all(site.path().join("olivero")).unwrap();
    let sheet = site.path().join("sheet.csv");
    fs::write(&sheet, table).unwrap();
    (site, sheet)
}

fn config(sheet: &Path) -> SyncConfig {
    SyncConfig {
        extension_name: Some("olivero".to_string()),
        source_path: Some(sheet.to_path_buf()),
        check_enabled_languages: false,
        plural_value_separator: "\n".to_string(),
        ..SyncConfig::default()
    }
}

fn catalog_path(site: &TempDir, language: &str) -> PathBuf {
    site.path()
        .join(format!("olivero/translations/olivero.{}.po", language))
}

#[test]
fn test_single_row_produces_single_entry_catalog() {
    let (site, sheet) = site_with_table(indoc! {"
        EN,FR,PAGE
        Hello,Bonjour,home
    "});

    let report = Orchestrator::builder(FlatSite(site.path().to_path_buf()))
        .build()
        .run(&config(&sheet))
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.written.len(), 1);
    assert_eq!(report.written[0].language, "fr");

    let catalog = PoCodec.decode(&catalog_path(&site, "fr")).unwrap();
    assert_eq!(catalog.len(), 1);
    let entry = &catalog.entries[0];
    assert_eq!(entry.singular, "Hello");
    assert_eq!(entry.translation, "Bonjour");
    assert_eq!(entry.comments.iter().filter(|c| c.contains("HOME")).count(), 1);
    assert_eq!(catalog.headers.get("Language"), Some("fr"));
}

#[test]
fn test_sections_plurals_and_contexts_survive_the_file() {
    let (site, sheet) = site_with_table(indoc! {r#"
        EN,FR,CONTEXT,PAGE,PLURAL
        Home,Accueil,,Home,
        Open,Ouvrir,verb,Home,
        Open,Ouvert,adjective,About,
        "1 item
        @count items","1 élément
        @count éléments",,About,x
        Contact,,,Contact,
    "#});

    let report = Orchestrator::builder(FlatSite(site.path().to_path_buf()))
        .build()
        .run(&config(&sheet))
        .unwrap();
    let stats = report.written[0].stats;
    assert_eq!(stats.qualifying, 4);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.plurals, 1);

    let catalog = PoCodec.decode(&catalog_path(&site, "fr")).unwrap();
    assert_eq!(catalog.len(), 4);

    let verb = catalog.find(&TranslationKey::new(Some("verb"), "Open")).unwrap();
    assert_eq!(verb.translation, "Ouvrir");
    assert!(verb.comments.is_empty());
    let adjective = catalog
        .find(&TranslationKey::new(Some("adjective"), "Open"))
        .unwrap();
    assert_eq!(adjective.translation, "Ouvert");
    assert!(adjective.comments.iter().any(|c| c == "------ ABOUT"));

    let plural = catalog.find(&TranslationKey::new(None, "1 item")).unwrap();
    assert_eq!(plural.plural.as_deref(), Some("@count items"));
    assert_eq!(plural.translation, "1 élément");
    assert_eq!(plural.plural_translation.as_deref(), Some("@count éléments"));
}

#[test]
fn test_merge_update_then_append_through_files() {
    let (site, sheet) = site_with_table("EN,FR\nHello,Bonjour\n");
    let orchestrator = Orchestrator::builder(FlatSite(site.path().to_path_buf())).build();
    orchestrator.run(&config(&sheet)).unwrap();

    fs::write(&sheet, "EN,FR\nHello,Salut\n").unwrap();
    let update = SyncConfig {
        replace_all: false,
        allow_update: true,
        ..config(&sheet)
    };
    orchestrator.run(&update).unwrap();
    let catalog = PoCodec.decode(&catalog_path(&site, "fr")).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.entries[0].translation, "Salut");

    let append = SyncConfig {
        replace_all: false,
        allow_update: false,
        ..config(&sheet)
    };
    orchestrator.run(&append).unwrap();
    let catalog = PoCodec.decode(&catalog_path(&site, "fr")).unwrap();
    let hello = TranslationKey::new(None, "Hello");
    assert_eq!(catalog.keys().filter(|k| *k == hello).count(), 2);
}

#[test]
fn test_merge_keeps_foreign_headers_and_entries() {
    let (site, sheet) = site_with_table("EN,FR\nHello,Salut\n");
    let translations = site.path().join("olivero/translations");
    fs::create_dir_all(&translations).unwrap();
    fs::write(
        translations.join("olivero.fr.po"),
        indoc! {r#"
            msgid ""
            msgstr ""
            "Language: fr\n"
            "Project-Id-Version: olivero 2.0\n"

            #: templates/page.html.twig
            msgid "Search"
            msgstr "Rechercher"

            msgid "Hello"
            msgstr "Bonjour"
        "#},
    )
    .unwrap();

    let report = Orchestrator::builder(FlatSite(site.path().to_path_buf()))
        .build()
        .run(&SyncConfig {
            replace_all: false,
            allow_update: true,
            ..config(&sheet)
        })
        .unwrap();
    assert_eq!(report.written[0].entries, 2);

    let catalog = PoCodec.decode(&catalog_path(&site, "fr")).unwrap();
    assert_eq!(catalog.headers.get("Project-Id-Version"), Some("olivero 2.0"));
    assert!(catalog.headers.get("PO-Revision-Date").is_some());
    assert_eq!(catalog.entries[0].references, vec!["templates/page.html.twig"]);
    assert_eq!(catalog.entries[1].translation, "Salut");
}

#[test]
fn test_malformed_catalog_only_fails_its_language() {
    let (site, sheet) = site_with_table("EN,FR,DE\nHello,Bonjour,Hallo\n");
    let translations = site.path().join("olivero/translations");
    fs::create_dir_all(&translations).unwrap();
    fs::write(translations.join("olivero.fr.po"), "msgid \"Hello\nmsgstr\n").unwrap();

    let report = Orchestrator::builder(FlatSite(site.path().to_path_buf()))
        .build()
        .run(&SyncConfig {
            replace_all: false,
            ..config(&sheet)
        })
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].language, "fr");
    assert!(report.failures[0].error.contains("olivero.fr.po"));
    assert_eq!(report.written[0].language, "de");
    assert!(catalog_path(&site, "de").is_file());
}

#[test]
fn test_utf16_tsv_table() {
    let site = TempDir::new().unwrap();
    fs::create_dir_all(site.path().join("olivero")).unwrap();
    let sheet = site.path().join("sheet.tsv");
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "EN\tDE\nBye\tTschüss\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(&sheet, bytes).unwrap();

    Orchestrator::builder(FlatSite(site.path().to_path_buf()))
        .build()
        .run(&config(&sheet))
        .unwrap();

    let catalog = PoCodec.decode(&catalog_path(&site, "de")).unwrap();
    assert_eq!(catalog.entries[0].translation, "Tschüss");
}

#[test]
fn test_missing_asset_is_a_configuration_error() {
    let (site, sheet) = site_with_table("EN,FR\nHello,Bonjour\n");
    let err = Orchestrator::builder(FlatSite(site.path().to_path_buf()))
        .build()
        .run(&SyncConfig {
            extension_name: Some("claro".to_string()),
            ..config(&sheet)
        })
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    assert!(err.to_string().contains("claro"));
}

#[test]
fn test_columns_differing_by_case_yield_one_catalog() {
    let (site, sheet) = site_with_table("EN,FR,fr\nHello,Bonjour,Salut\n");

    let report = Orchestrator::builder(FlatSite(site.path().to_path_buf()))
        .build()
        .run(&config(&sheet))
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.languages.iter().collect::<Vec<_>>(), vec!["fr"]);
    assert_eq!(report.written.len(), 1);

    let catalog = PoCodec.decode(&catalog_path(&site, "fr")).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.entries[0].translation, "Bonjour");
}

#[test]
fn test_row_longer_than_header_still_syncs() {
    let (site, sheet) = site_with_table("EN,FR\nHello,Bonjour,extra\nBye,Au revoir\n");

    let report = Orchestrator::builder(FlatSite(site.path().to_path_buf()))
        .build()
        .run(&config(&sheet))
        .unwrap();

    assert!(report.is_success());
    let catalog = PoCodec.decode(&catalog_path(&site, "fr")).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.entries[0].translation, "Bonjour");
    assert_eq!(catalog.entries[1].translation, "Au revoir");
}
