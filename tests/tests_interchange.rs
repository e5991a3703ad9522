//! Corpus loading and XMI export.

#![cfg(feature = "interchange")]

use std::fs::File;
use std::io::Write;
use std::path::Path;

use odl::hir::ExtractOptions;
use odl::interchange::{CONTENTS_FILE, Corpus, InterchangeError, XmiWriter, export};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const LIFT: &str = include_str!("fixtures/lift.odl");

/// Lift corpus whose guard text lives in an external RTF file.
fn lift_with_external_guard() -> String {
    LIFT.replace(
        r#"Attribute "_Art1_RTF" "x>0";"#,
        r#"Attribute "_Art1_RTF" "g1.rtf" { File Operation Copy; };"#,
    )
}

const GUARD_RTF: &[u8] = b"{\\rtf1\\ansi{\\fonttbl{\\f0 Arial;}}\\f0 x>0\\par}";

fn write_directory(root: &Path) {
    std::fs::write(root.join(CONTENTS_FILE), lift_with_external_guard()).unwrap();
    std::fs::write(root.join("g1.rtf"), GUARD_RTF).unwrap();
}

fn write_archive(path: &Path) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    zip.start_file(CONTENTS_FILE, SimpleFileOptions::default()).unwrap();
    zip.write_all(lift_with_external_guard().as_bytes()).unwrap();
    zip.start_file("g1.rtf", SimpleFileOptions::default()).unwrap();
    zip.write_all(GUARD_RTF).unwrap();
    zip.finish().unwrap();
}

#[test]
fn test_directory_and_archive_agree() {
    let dir = tempfile::tempdir().unwrap();
    let export_dir = dir.path().join("export");
    std::fs::create_dir(&export_dir).unwrap();
    write_directory(&export_dir);
    let archive = dir.path().join("export.zip");
    write_archive(&archive);

    let options = ExtractOptions::new();
    let from_dir = Corpus::open(&export_dir).unwrap().reconstruct(&options).unwrap();
    let from_zip = Corpus::open(&archive).unwrap().reconstruct(&options).unwrap();
    assert_eq!(from_dir, from_zip);

    let guard = from_zip
        .transitions
        .iter()
        .find_map(|transition| transition.guard.as_ref())
        .unwrap();
    assert_eq!(guard.text, "x>0");
}

#[test]
fn test_package_listing_from_archive() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("export.zip");
    write_archive(&archive);

    let paths: Vec<String> = Corpus::open(&archive)
        .unwrap()
        .packages()
        .unwrap()
        .iter()
        .flat_map(|package| package.paths())
        .collect();
    assert_eq!(paths, vec!["Lifts", "Lifts/Cabins & Doors", "Spare"]);
}

#[test]
fn test_missing_rich_text_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONTENTS_FILE), lift_with_external_guard()).unwrap();

    let err = Corpus::open(dir.path())
        .unwrap()
        .reconstruct(&ExtractOptions::new())
        .unwrap_err();
    assert!(matches!(err, InterchangeError::Extract(_)));
}

#[test]
fn test_xmi_document() {
    let dir = tempfile::tempdir().unwrap();
    write_directory(dir.path());
    let model = Corpus::open(dir.path()).unwrap().reconstruct(&ExtractOptions::new()).unwrap();

    let xmi = String::from_utf8(XmiWriter::with_sequential_ids().write(&model).unwrap()).unwrap();
    assert!(xmi.contains(r#"xmi:id="_1001" name="Lift_System""#));
    assert!(xmi.contains(r#"xmi:type="uml:Class" xmi:id="_c1" name="Controller" isActive="true""#));
    assert!(xmi.contains(r#"<ownedAttribute xmi:id="_at1" name="floor_count""#));
    // Both roles are named, so each class navigates to the other end.
    assert!(xmi.contains(r#"<ownedAttribute xmi:id="_r2" name="cabins" type="_c2" isUnique="false" association="_a1">"#));
    assert!(xmi.contains(r#"<ownedAttribute xmi:id="_r1" name="controller" type="_c1" isUnique="false" association="_a1">"#));
    assert!(xmi.contains(r#"name="A_Controller_Cabin" memberEnd="_r2 _r1"/>"#));
    assert!(xmi.contains(r#"<entry xmi:type="uml:OpaqueBehavior" xmi:id="_b0" name="Entry">"#));
    assert!(xmi.contains(r#"name="From_Idle_to_Active_Transition_0" target="_s2" source="_s1" guard="_g1">"#));
    assert!(xmi.contains(r#"value="x&gt;0""#));
    assert!(xmi.contains(r#"xmi:type="uml:SignalEvent" xmi:id="_ev1" name="SignalEvent_0""#));
    assert!(xmi.contains(r#"name="Trigger_0" event="_ev1"/>"#));
}

#[test]
fn test_export_scoped_to_package() {
    let dir = tempfile::tempdir().unwrap();
    write_directory(dir.path());

    let xmi = export(dir.path(), &ExtractOptions::new().with_package("Lifts/Cabins & Doors")).unwrap();
    let xmi = String::from_utf8(xmi).unwrap();
    assert!(xmi.contains(r#"name="Cabin""#));
    assert!(!xmi.contains(r#"name="Controller""#));
    assert!(!xmi.contains("uml:Association"));
}
