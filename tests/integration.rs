use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn dxi_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dxi");
    path
}

const COLLECTION: &str = r#"{
  "metadata": {"fuente": "https://example.org/enfermedades", "total_registros": 3},
  "enfermedades": [
    {
      "id": "a1",
      "nombre": "Enfermedad A",
      "url": "https://example.org/a",
      "sintomas_causas": [
        {"titulo": "Descripción general", "contenido": [
          {"tipo": "parrafo", "contenido": "Una enfermedad de prueba."}
        ]},
        {"titulo": "síntomas", "contenido": [
          {"tipo": "parrafo", "contenido": "Los pacientes presentan fiebre y dolor de cabeza intensos"}
        ]}
      ],
      "diagnostico_tratamiento": [],
      "departamentos": ["Neurología"]
    },
    {
      "id": "b2",
      "nombre": "Enfermedad B",
      "url": "https://example.org/b",
      "sintomas_causas": [
        {"titulo": "síntomas", "contenido": [
          {"tipo": "lista", "items": ["tos seca", "dolor de garganta"]}
        ]}
      ],
      "diagnostico_tratamiento": []
    },
    {
      "id": "c3",
      "nombre": "Enfermedad C",
      "url": "https://example.org/c",
      "sintomas_causas": [
        {"titulo": "Causas", "contenido": [
          {"tipo": "parrafo", "contenido": "Origen desconocido."}
        ]}
      ],
      "diagnostico_tratamiento": []
    }
  ]
}"#;

fn setup_test_env_with(collection: &str, extra_config: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(data_dir.join("enfermedades.json"), collection).unwrap();

    let config_content = format!(
        r#"[paths]
input = "{root}/data/enfermedades.json"
enriched = "{root}/out/enriched.json"
index = "{root}/out/index.json"
unified = "{root}/out/unified.json"
embedding_input = "{root}/out/embedding.jsonl"
{extra}"#,
        root = root.display(),
        extra = extra_config
    );

    let config_path = config_dir.join("dxi.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn setup_test_env() -> (TempDir, PathBuf) {
    setup_test_env_with(COLLECTION, "")
}

fn run_dxi(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = dxi_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run dxi binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn out_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("out")
}

fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
    serde_json::from_str(&text).unwrap()
}

fn bucket_ids(index: &serde_json::Value, category: &str) -> Vec<String> {
    index[category]
        .as_array()
        .unwrap_or_else(|| panic!("no bucket {}", category))
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

fn category_names(disease: &serde_json::Value) -> Vec<String> {
    disease["matched_symptom_categories"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect()
}

#[test]
fn test_run_end_to_end() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_dxi(&config_path, &["run", "--progress", "off"]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Run complete"));

    let out = out_dir(&tmp);
    let enriched = read_json(&out.join("enriched.json"));
    let diseases = enriched["diseases"].as_array().unwrap();
    assert_eq!(diseases.len(), 3);
    assert_eq!(category_names(&diseases[0]), vec!["Dolor", "Fiebre"]);
    assert_eq!(category_names(&diseases[1]), vec!["Dolor", "Tos"]);
    assert!(category_names(&diseases[2]).is_empty());
    assert_eq!(diseases[0]["demographics"]["min_age"], 18);
    assert_eq!(diseases[0]["demographics"]["predominant_gender"], "Both");
    // Keys the pipeline does not interpret are carried through.
    assert_eq!(diseases[0]["departamentos"][0], "Neurología");

    let index = read_json(&out.join("index.json"));
    assert_eq!(bucket_ids(&index, "Dolor"), vec!["a1", "b2"]);
    assert_eq!(bucket_ids(&index, "Fiebre"), vec!["a1"]);
    assert_eq!(bucket_ids(&index, "Tos"), vec!["b2"]);
    assert_eq!(index.as_object().unwrap().len(), 3);

    let unified = read_json(&out.join("unified.json"));
    assert_eq!(unified["diseases"], enriched["diseases"]);
    assert_eq!(unified["symptom_index"], index);
}

#[test]
fn test_run_is_deterministic() {
    let (tmp, config_path) = setup_test_env();
    let out = out_dir(&tmp);
    let files = ["enriched.json", "index.json", "unified.json"];

    let (_, stderr, success) = run_dxi(&config_path, &["run"]);
    assert!(success, "first run failed: {}", stderr);
    let first: Vec<Vec<u8>> = files.iter().map(|f| fs::read(out.join(f)).unwrap()).collect();

    let (_, stderr, success) = run_dxi(&config_path, &["run"]);
    assert!(success, "second run failed: {}", stderr);
    let second: Vec<Vec<u8>> = files.iter().map(|f| fs::read(out.join(f)).unwrap()).collect();

    assert_eq!(first, second);
}

#[test]
fn test_worker_and_shard_settings_do_not_change_output() {
    let (tmp_a, config_a) = setup_test_env();
    let (tmp_b, config_b) =
        setup_test_env_with(COLLECTION, "[enrichment]\nworkers = 3\nindex_shards = 2\n");

    assert!(run_dxi(&config_a, &["run"]).2);
    assert!(run_dxi(&config_b, &["run"]).2);

    for f in ["enriched.json", "index.json", "unified.json"] {
        assert_eq!(
            fs::read(out_dir(&tmp_a).join(f)).unwrap(),
            fs::read(out_dir(&tmp_b).join(f)).unwrap(),
            "{} differs",
            f
        );
    }
}

#[test]
fn test_run_invalid_input_writes_nothing() {
    let (tmp, config_path) = setup_test_env_with("{\"enfermedades\": 7}", "");
    let (_, stderr, success) = run_dxi(&config_path, &["run"]);
    assert!(!success);
    assert!(stderr.contains("Unusable input collection"), "stderr={}", stderr);
    assert!(!out_dir(&tmp).exists());
}

#[test]
fn test_run_missing_input_fails() {
    let (tmp, config_path) = setup_test_env();
    fs::remove_file(tmp.path().join("data/enfermedades.json")).unwrap();
    let (_, stderr, success) = run_dxi(&config_path, &["run"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read input collection"));
    assert!(!out_dir(&tmp).exists());
}

#[test]
fn test_run_empty_collection_writes_nothing() {
    let (tmp, config_path) = setup_test_env_with("{\"enfermedades\": []}", "");
    let (stdout, stderr, success) = run_dxi(&config_path, &["run"]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("nothing written"));
    assert!(!out_dir(&tmp).exists());
}

#[test]
fn test_run_reports_duplicate_ids_and_still_publishes() {
    let collection = COLLECTION.replace("\"id\": \"b2\"", "\"id\": \"a1\"");
    let (tmp, config_path) = setup_test_env_with(&collection, "");
    let (stdout, stderr, success) = run_dxi(&config_path, &["run"]);
    assert!(success, "stderr={}", stderr);
    assert!(stderr.contains("duplicate identifiers"), "stderr={}", stderr);
    assert!(stdout.contains("Duplicate ids: 1"));

    // Both records share an id, so the Dolor bucket keeps only the first.
    let index = read_json(&out_dir(&tmp).join("index.json"));
    assert_eq!(bucket_ids(&index, "Dolor"), vec!["a1"]);
    assert_eq!(bucket_ids(&index, "Tos"), vec!["a1"]);
}

#[test]
fn test_unify_missing_and_malformed_inputs() {
    let (tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_dxi(&config_path, &["unify"]);
    assert!(!success);
    assert!(stderr.contains("not found"), "stderr={}", stderr);

    assert!(run_dxi(&config_path, &["run"]).2);
    fs::write(out_dir(&tmp).join("index.json"), "{\"Dolor\": 1}").unwrap();
    let (_, stderr, success) = run_dxi(&config_path, &["unify"]);
    assert!(!success);
    assert!(stderr.contains("malformed"), "stderr={}", stderr);
}

#[test]
fn test_unify_rebuilds_unified_artifact() {
    let (tmp, config_path) = setup_test_env();
    assert!(run_dxi(&config_path, &["run"]).2);
    let unified = out_dir(&tmp).join("unified.json");
    let before = fs::read(&unified).unwrap();
    fs::remove_file(&unified).unwrap();

    let (stdout, stderr, success) = run_dxi(&config_path, &["unify"]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("Unified 3 diseases and 3 categories"));
    assert_eq!(fs::read(&unified).unwrap(), before);
}

#[test]
fn test_stats() {
    let (_tmp, config_path) = setup_test_env();
    assert!(run_dxi(&config_path, &["run"]).2);

    let (stdout, stderr, success) = run_dxi(&config_path, &["stats"]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("Diseases:       3"));
    assert!(stdout.contains("Uncategorized:  1"));
    assert!(stdout.contains("Dolor"));
}

#[test]
fn test_lookup() {
    let (_tmp, config_path) = setup_test_env();
    assert!(run_dxi(&config_path, &["run"]).2);

    let (stdout, stderr, success) = run_dxi(&config_path, &["lookup", "dolor"]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.starts_with("Dolor (2 diseases)"));
    let a = stdout.find("Enfermedad A").unwrap();
    let b = stdout.find("Enfermedad B").unwrap();
    assert!(a < b);

    let (stdout, _, success) = run_dxi(&config_path, &["lookup", "Dolor", "--age", "5"]);
    assert!(success);
    assert!(stdout.contains("No diseases"));

    let (_, stderr, success) = run_dxi(&config_path, &["lookup", "Inexistente"]);
    assert!(!success);
    assert!(stderr.contains("unknown category"));
}

#[test]
fn test_get() {
    let (_tmp, config_path) = setup_test_env();
    assert!(run_dxi(&config_path, &["run"]).2);

    let (stdout, stderr, success) = run_dxi(&config_path, &["get", "a1"]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("Enfermedad A"));
    assert!(stdout.contains("Una enfermedad de prueba."));
    assert!(stdout.contains("Fiebre: fiebre"));

    let (_, stderr, success) = run_dxi(&config_path, &["get", "zzz"]);
    assert!(!success);
    assert!(stderr.contains("disease not found"));
}

#[test]
fn test_export_jsonl() {
    let (tmp, config_path) = setup_test_env();
    assert!(run_dxi(&config_path, &["run"]).2);

    let (_, stderr, success) = run_dxi(&config_path, &["export"]);
    assert!(success, "stderr={}", stderr);

    let text = fs::read_to_string(out_dir(&tmp).join("embedding.jsonl")).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], "a1");
    assert_eq!(
        lines[0]["text"],
        "Los pacientes presentan fiebre y dolor de cabeza intensos"
    );
    assert_eq!(lines[1]["text"], "- tos seca\n- dolor de garganta");
}

#[test]
fn test_ids_assigns_sha1_prefixes() {
    let (tmp, config_path) = setup_test_env();
    let list = tmp.path().join("data/lista.json");
    fs::write(&list, r#"[{"nombre": "X", "url": "abc"}, {"nombre": "Y"}]"#).unwrap();

    let (stdout, stderr, success) = run_dxi(&config_path, &["ids", list.to_str().unwrap()]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("Assigned 1 identifiers"));

    let doc = read_json(&list);
    assert_eq!(doc[0]["id"], "a9993e3647");
    assert!(doc[1].get("id").is_none());
}

#[test]
fn test_analyze_without_config() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("none.toml");
    let (stdout, stderr, success) = run_dxi(
        &missing,
        &["analyze", "Niños con Fiebre alta y tos seca", "--json"],
    );
    assert!(success, "stderr={}", stderr);
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["normalized"], "ninos con fiebre alta y tos seca");
    assert_eq!(v["categories"]["Tos"], serde_json::json!(["tos", "tos seca"]));
    assert_eq!(v["demographics"]["min_age"], 0);
}

#[test]
fn test_invalid_config_rejected() {
    let (_tmp, config_path) = setup_test_env_with(COLLECTION, "[identifier]\nlength = 2\n");
    let (_, stderr, success) = run_dxi(&config_path, &["run"]);
    assert!(!success);
    assert!(stderr.contains("identifier.length"));
}
