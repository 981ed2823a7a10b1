use parking_occupancy::config::PipelineConfig;
use parking_occupancy::gazetteer::Gazetteer;
use parking_occupancy::occupancy::capacity::Capacity;
use parking_occupancy::occupancy::pipeline::{Run, run};
use parking_occupancy::occupancy::report::FacilityRecord;
use parking_occupancy::occupancy::types::{FacilityKind, Status};
use parking_occupancy::output::{OutputFormat, render, write_artifact};
use parking_occupancy::registry::Registry;

const HISTORY: &[u8] = include_bytes!("fixtures/historique_parkings.csv");
const REGISTRY: &[u8] = include_bytes!("fixtures/parkings.csv");
const GAZETTEER: &[u8] = include_bytes!("fixtures/gazetteer.json");

fn run_fixture(gazetteer: &Gazetteer) -> Run {
    let registry = Registry::from_csv(REGISTRY).expect("Failed to parse registry");
    run(HISTORY, &registry, gazetteer, &PipelineConfig::default()).expect("Pipeline failed")
}

fn find<'a>(records: &'a [FacilityRecord], name: &str) -> &'a FacilityRecord {
    records
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("no record for {name}"))
}

#[test]
fn test_full_pipeline() {
    let run = run_fixture(&Gazetteer::builtin());

    let names: Vec<&str> = run.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Antigone", "Parking Inconnu", "Pitot", "Rondelet", "Sud de France - Gare"]
    );
    // "8h15" timestamp and the unknown "Trottinette" kind.
    assert_eq!(run.dropped, 2);
    assert_eq!(run.rejected, 0);
}

#[test]
fn test_antigone_scenario() {
    let run = run_fixture(&Gazetteer::builtin());
    let antigone = find(&run.records, "Antigone");

    assert_eq!(antigone.kind, FacilityKind::Car);
    assert_eq!(antigone.capacity, Capacity::Declared(50));
    assert_eq!(antigone.history.labels, vec!["01/03 08:00", "01/03 08:05"]);
    assert_eq!(antigone.history.data, vec![82, 84]);
    assert_eq!(antigone.status, Status::Ok);
    assert_eq!(antigone.libres, Some(8));
    assert_eq!(antigone.total, Some(60));
    assert!(!antigone.provisional);
    assert_eq!(antigone.address.as_deref(), Some("Place du Nombre d'Or"));
    assert_eq!(antigone.accessible_spaces, Some(4));
}

#[test]
fn test_stuck_sensor_with_observed_capacity() {
    let run = run_fixture(&Gazetteer::builtin());
    let rondelet = find(&run.records, "Rondelet");

    assert_eq!(rondelet.status, Status::OutOfService);
    assert_eq!(rondelet.capacity, Capacity::Observed(15));
    assert!(rondelet.provisional);
    assert_eq!(rondelet.history.data, vec![73, 73]);
    assert_eq!(rondelet.libres, Some(4));
    assert_eq!(rondelet.total, Some(10));
}

#[test]
fn test_clamping_and_default_centre() {
    let run = run_fixture(&Gazetteer::builtin());
    let unknown = find(&run.records, "Parking Inconnu");
    let centre = PipelineConfig::default().default_center;

    assert_eq!(unknown.capacity, Capacity::Observed(120));
    assert_eq!(unknown.history.data, vec![83, 0, 100]);
    assert_eq!((unknown.lat, unknown.lon), (centre.lat, centre.lon));
}

#[test]
fn test_registry_only_facility() {
    let run = run_fixture(&Gazetteer::builtin());
    let pitot = find(&run.records, "Pitot");

    assert_eq!(pitot.status, Status::Unknown);
    assert!(pitot.history.labels.is_empty());
    assert_eq!(pitot.capacity, Capacity::Declared(420));
    assert_eq!((pitot.lat, pitot.lon), (43.6125, 3.8698));
}

#[test]
fn test_unresolved_capacity_keeps_record() {
    let run = run_fixture(&Gazetteer::builtin());
    let station = find(&run.records, "Sud de France - Gare");

    assert_eq!(station.capacity, Capacity::Unresolved);
    assert!(station.history.data.is_empty());
    assert_eq!(station.status, Status::Ok);
}

#[test]
fn test_gazetteer_order_decides_position() {
    let builtin = run_fixture(&Gazetteer::builtin());
    let station = find(&builtin.records, "Sud de France - Gare");
    assert_eq!((station.lat, station.lon), (43.5968, 3.9234));

    let generic_first = Gazetteer::from_json(GAZETTEER).expect("Invalid gazetteer fixture");
    let custom = run_fixture(&generic_first);
    let station = find(&custom.records, "Sud de France - Gare");
    assert_eq!((station.lat, station.lon), (43.6032, 3.8785));
}

#[test]
fn test_history_invariants() {
    let run = run_fixture(&Gazetteer::builtin());
    for record in &run.records {
        assert_eq!(record.history.labels.len(), record.history.data.len());
        assert!(record.history.data.iter().all(|p| *p <= 100));
    }
}

#[test]
fn test_output_is_deterministic() {
    let first = render(&run_fixture(&Gazetteer::builtin()).records, OutputFormat::Js).unwrap();
    let second = render(&run_fixture(&Gazetteer::builtin()).records, OutputFormat::Js).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_artifact_written() {
    let path = std::env::temp_dir().join("parking_occupancy_integration_data.js");
    let _ = std::fs::remove_file(&path);

    let run = run_fixture(&Gazetteer::builtin());
    write_artifact(&path, &run.records, OutputFormat::Js).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("const realData = ["));
    assert!(content.contains("\"Type\":\"Velo\""));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_columns_abort_the_run() {
    let result = run(
        b"Nom;Places\nAntigone;3\n",
        &Registry::default(),
        &Gazetteer::builtin(),
        &PipelineConfig::default(),
    );
    assert!(result.is_err());
}
