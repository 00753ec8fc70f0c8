//! End-to-end compile tests against files on disk.
//!
//! Covers error reporting with file positions, schema artifact sync across
//! two passes, directory compiles, and settings-driven compiles.

use std::fs;
use std::path::PathBuf;

use tabula_core::asset::MapAssetResolver;
use tabula_core::compiler::{
    CompileOptions, CompileOutcome, DEFAULT_NAMESPACE, SchemaStatus, SchemaSync, TableCompiler,
};
use tabula_core::error::TableError;
use tabula_core::settings::ImportSettings;
use tabula_core::table_set::TableSet;
use tabula_core::test_utils::{cleanup, make_test_dir, sample_catalog, write_sheet};
use tabula_core::value::Value;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn heroes_assets() -> MapAssetResolver {
    let mut assets = MapAssetResolver::new();
    assets.insert("Sprite", "ui/warrior.png");
    assets.insert("Sprite", "ui/rogue.png");
    assets
}

// ===========================================================================
// Error reporting
// ===========================================================================

#[test]
fn unknown_type_names_file_and_cell() {
    let dir = make_test_dir("pipeline_unknown_type");
    let sheet = write_sheet(&dir, "Units.csv", "Name,Hp\nstring,intt\nGrunt,5\n");
    let catalog = sample_catalog();

    let err = TableCompiler::new(&catalog).compile(&sheet).unwrap_err();
    match &err {
        TableError::UnknownType {
            location,
            type_name,
        } => {
            assert_eq!(type_name, "intt");
            assert_eq!(location.row(), Some(2));
            assert_eq!(location.column(), Some(2));
        }
        other => panic!("expected UnknownType, got {other:?}"),
    }
    assert_eq!(err.file(), sheet.as_path());
    assert!(err.to_string().contains("Units.csv(2:2)"));

    cleanup(&dir);
}

#[test]
fn duplicate_key_points_at_second_definition() {
    let dir = make_test_dir("pipeline_duplicate_key");
    let sheet = write_sheet(
        &dir,
        "Units.csv",
        "Name,Hp\nstring,int\nGrunt,5\nArcher,3\nGrunt,7\n",
    );
    let catalog = sample_catalog();

    let err = TableCompiler::new(&catalog).compile(&sheet).unwrap_err();
    let TableError::Schema { location, detail } = &err else {
        panic!("expected Schema, got {err:?}");
    };
    assert_eq!(location.row(), Some(5));
    assert_eq!(location.column(), Some(1));
    assert!(detail.contains("'Grunt'"));
    assert!(detail.contains("first defined at row 3"));

    cleanup(&dir);
}

#[test]
fn sheet_without_name_column_is_rejected() {
    let dir = make_test_dir("pipeline_no_name");
    let sheet = write_sheet(&dir, "Units.csv", "Id,Hp\nint,int\n1,5\n");
    let catalog = sample_catalog();

    let err = TableCompiler::new(&catalog).compile(&sheet).unwrap_err();
    assert!(matches!(err, TableError::Validation { .. }));
    assert!(err.location().is_none());

    cleanup(&dir);
}

#[test]
fn bad_cell_reports_row_column_and_field() {
    let dir = make_test_dir("pipeline_bad_cell");
    let sheet = write_sheet(
        &dir,
        "Units.csv",
        "Name,Spawn\nstring,Vector3\nGrunt,\"(1, 2, 3)\"\nArcher,\"(1, 2)\"\n",
    );
    let catalog = sample_catalog();

    let err = TableCompiler::new(&catalog).compile(&sheet).unwrap_err();
    let TableError::Conversion {
        location, field, ..
    } = &err
    else {
        panic!("expected Conversion, got {err:?}");
    };
    assert_eq!(field, "Spawn");
    assert_eq!(location.row(), Some(4));
    assert_eq!(location.column(), Some(2));
    assert!(err.to_string().contains("(1, 2)"));

    cleanup(&dir);
}

// ===========================================================================
// Schema sync
// ===========================================================================

#[test]
fn two_pass_regenerates_then_binds() {
    let dir = make_test_dir("pipeline_two_pass");
    let sheet = dir.join("Heroes.csv");
    fs::copy(fixture("Heroes.csv"), &sheet).unwrap();
    let artifact = dir.join("generated").join("heroes.rs");

    let catalog = sample_catalog();
    let assets = heroes_assets();
    let compiler = TableCompiler::new(&catalog)
        .with_assets(&assets)
        .with_options(CompileOptions {
            namespace: DEFAULT_NAMESPACE.to_string(),
            sync: SchemaSync::TwoPass {
                artifact: artifact.clone(),
            },
        });

    let first = compiler.compile(&sheet).unwrap();
    assert!(matches!(
        &first,
        CompileOutcome::SchemaRegenerated { artifact: written } if *written == artifact
    ));
    assert!(first.table().is_none());
    assert_eq!(
        fs::read_to_string(&artifact).unwrap(),
        include_str!("generated/heroes.rs")
    );

    let second = compiler.compile(&sheet).unwrap();
    let CompileOutcome::Compiled {
        table,
        schema_status,
    } = second
    else {
        panic!("second pass should bind");
    };
    assert_eq!(schema_status, SchemaStatus::UpToDate);
    assert_eq!(table.keys().collect::<Vec<_>>(), ["Warrior", "Mage", "Rogue"]);

    cleanup(&dir);
}

#[test]
fn collapse_binds_on_the_first_pass() {
    let dir = make_test_dir("pipeline_collapse");
    let sheet = dir.join("Heroes.csv");
    fs::copy(fixture("Heroes.csv"), &sheet).unwrap();
    let artifact = dir.join("heroes.rs");

    let catalog = sample_catalog();
    let assets = heroes_assets();
    let compiler = TableCompiler::new(&catalog)
        .with_assets(&assets)
        .with_options(CompileOptions {
            namespace: DEFAULT_NAMESPACE.to_string(),
            sync: SchemaSync::Collapse {
                artifact: artifact.clone(),
            },
        });

    let CompileOutcome::Compiled { schema_status, .. } = compiler.compile(&sheet).unwrap() else {
        panic!("collapse should bind");
    };
    assert_eq!(schema_status, SchemaStatus::Regenerated);
    assert!(artifact.is_file());

    cleanup(&dir);
}

// ===========================================================================
// Directories and settings
// ===========================================================================

#[test]
fn table_set_skips_lock_files() {
    let dir = make_test_dir("pipeline_table_set");
    write_sheet(&dir, "Units.csv", "Name,Hp\nstring,int\nGrunt,5\n");
    write_sheet(&dir, "Items.csv", "Name,Price\nstring,decimal\nSword,9.99\n");
    write_sheet(&dir, "~$Units.csv", "not a sheet");
    write_sheet(&dir, "notes.txt", "ignored");

    let catalog = sample_catalog();
    let compiler = TableCompiler::new(&catalog);
    let set = TableSet::compile_dir(&dir, &compiler).unwrap();

    assert_eq!(set.names().collect::<Vec<_>>(), ["Items", "Units"]);
    assert!(set.pending().is_empty());
    let units = set.load("Units").unwrap();
    assert_eq!(units.value("Grunt", "Hp"), Some(&Value::I32(5)));
    assert!(set.load("Heroes").is_none());

    cleanup(&dir);
}

#[test]
fn settings_file_drives_the_compile() {
    let dir = make_test_dir("pipeline_settings");
    let sheet = write_sheet(
        &dir,
        "Monsters.csv",
        "Name,Element,Portrait\nstring,Element,Portrait\nSlime,Water,art/slime.png\nImp,,\n",
    );
    fs::create_dir_all(dir.join("assets").join("art")).unwrap();
    fs::write(dir.join("assets").join("art").join("slime.png"), b"png").unwrap();
    let config = dir.join("tabula.ron");
    fs::write(
        &config,
        r#"(
    namespace: "Game.Bestiary",
    schema_dir: Some("generated"),
    sync: collapse,
    asset_root: Some("assets"),
    enums: [(name: "Element", members: ["Fire", "Water"])],
    asset_kinds: ["Portrait"],
)"#,
    )
    .unwrap();

    let settings = ImportSettings::load(&config).unwrap();
    let catalog = settings.catalog();
    let assets = settings.asset_resolver().unwrap();
    let compiler = TableCompiler::new(&catalog)
        .with_assets(&assets)
        .with_options(settings.compile_options(&sheet));

    let table = compiler.compile(&sheet).unwrap().into_table().unwrap();
    assert_eq!(
        table.value("Slime", "Element"),
        Some(&Value::Enum {
            ordinal: 1,
            member: "Water".to_string()
        })
    );
    assert_eq!(table.value("Imp", "Portrait"), Some(&Value::Asset(None)));

    let generated = fs::read_to_string(dir.join("generated").join("monsters.rs")).unwrap();
    assert!(generated.contains("pub mod bestiary {"));
    assert!(generated.contains("element: Element,"));
    assert!(generated.contains("portrait: Option<::tabula_core::value::AssetHandle>,"));

    cleanup(&dir);
}

// ===========================================================================
// Serialization
// ===========================================================================

#[test]
fn compiled_table_serializes_entries_in_row_order() {
    let catalog = sample_catalog();
    let assets = heroes_assets();
    let table = TableCompiler::new(&catalog)
        .with_assets(&assets)
        .compile(&fixture("Heroes.csv"))
        .unwrap()
        .into_table()
        .unwrap();

    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json["name"], "Heroes");
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let warrior = &entries[0];
    assert_eq!(warrior["id"], 0);
    assert_eq!(warrior["key"], "Warrior");
    assert_eq!(warrior["values"][1], 10);
    assert_eq!(warrior["values"][4]["z"], 3.0);
    assert_eq!(warrior["values"][6]["member"], "Rare");
    assert_eq!(warrior["values"][7]["path"], "ui/warrior.png");
    assert_eq!(warrior["values"][8], serde_json::json!([[1, 2], [3]]));

    assert!(entries[1]["values"][7].is_null());
    assert!(json.get("schema").is_none());
}
