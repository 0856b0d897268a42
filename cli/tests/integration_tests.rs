use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn yamlfrag(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_yamlfrag"))
        .args(args)
        .output()
        .expect("failed to run yamlfrag")
}

fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture dir");
    }
    fs::write(&path, contents).expect("failed to write fixture");
    path
}

/// Small OpenAPI-style fragment tree.
fn fragment_tree() -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let root = dir.path();
    write(
        root,
        "index.yml",
        "openapi: 3.0.0\npaths:\n  $ref: ./paths/.map.yml\ncomponents:\n  schemas:\n    $ref: ./schemas/.map.yml\n",
    );
    write(root, "paths/.map.yml", "");
    write(
        root,
        "paths/pets.yml",
        "get:\n  responses:\n    200:\n      $ref: ../responses/PetList.yml\n",
    );
    write(root, "paths/pets_{petId}.yml", "get:\n  summary: Show pet\n");
    write(root, "responses/PetList.yml", "description: A list of pets\n");
    write(root, "schemas/.map.yml", "");
    write(root, "schemas/Pet.yml", "type: object\n");
    write(root, "schemas/Error.yml", "type: object\n");
    dir
}

const EXPECTED: &str = "\
openapi: 3.0.0
paths:
  /pets:
    get:
      responses:
        200:
          description: A list of pets
  /pets/{petId}:
    get:
      summary: Show pet
components:
  schemas:
    Error:
      type: object
    Pet:
      type: object
";

#[test]
fn assembles_document_and_reports_output_path() {
    let tree = fragment_tree();
    let root = tree.path();
    let out = root.join("dist/openapi.yml");

    let output = yamlfrag(&[
        "-d",
        root.to_str().unwrap(),
        "-i",
        root.join("index.yml").to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--openapi",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("Generated '{}'", out.display())));
    assert_eq!(fs::read_to_string(&out).unwrap(), EXPECTED);
}

#[test]
fn index_defaults_to_root_dir_index() {
    let tree = fragment_tree();
    let root = tree.path();
    let out = root.join("out.yml");

    let output = yamlfrag(&[
        "--root-dir",
        root.to_str().unwrap(),
        "--out-file",
        out.to_str().unwrap(),
        "--openapi",
    ]);

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&out).unwrap(), EXPECTED);
}

#[test]
fn missing_root_dir_is_a_short_config_error() {
    let output = yamlfrag(&["-o", "out.yml"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("root fragment directory not specified"));
    assert!(!stderr.contains("Unexpected error"));
}

#[test]
fn missing_fragment_fails_and_writes_nothing() {
    let tree = fragment_tree();
    let root = tree.path();
    fs::remove_file(root.join("responses/PetList.yml")).unwrap();
    let out = root.join("dist/openapi.yml");

    let output = yamlfrag(&[
        "-d",
        root.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unexpected error generating yaml document"));
    assert!(stderr.contains("PetList.yml"));
    assert!(!out.exists());
}

#[test]
fn write_collections_materializes_collection_files() {
    let tree = fragment_tree();
    let root = tree.path();
    let out = root.join("out.yml");

    let output = yamlfrag(&[
        "-d",
        root.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--openapi",
        "--write-collections",
    ]);

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(root.join("schemas/.map.yml")).unwrap(),
        "# Auto Generated\nError:\n  $ref: ./Error.yml\nPet:\n  $ref: ./Pet.yml\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("paths/.map.yml")).unwrap(),
        "# Auto Generated\n/pets:\n  $ref: ./pets.yml\n/pets/{petId}:\n  $ref: ./pets_{petId}.yml\n"
    );
    assert_eq!(fs::read_to_string(&out).unwrap(), EXPECTED);
}

#[test]
fn config_file_supplies_options() {
    let tree = fragment_tree();
    let root = tree.path();
    let out = root.join("from-config.yml");
    let config = write(
        root,
        "yamlfrag.yml",
        &format!(
            "root_dir: {}\nout_file: {}\nopenapi: true\nindent: \"    \"\n",
            root.display(),
            out.display()
        ),
    );

    let output = yamlfrag(&["--config", config.to_str().unwrap()]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let doc = fs::read_to_string(&out).unwrap();
    assert!(doc.starts_with("openapi: 3.0.0\npaths:\n  /pets:\n      get:\n"));
}
