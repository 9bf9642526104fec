//! Pipeline driver tests: ordering, termination and exhaustion

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use trueno_pipeline::adapter::{AdapterSet, ReplayModel, ReplayModule, ReplayTrainer};
use trueno_pipeline::config::{ModelConfig, ModuleConfig, TrainerConfig};
use trueno_pipeline::packet::{PacketKind, StartRun};
use trueno_pipeline::station::{InitializingStation, ProcessStation};
use trueno_pipeline::{
    Error, Pipeline, PipelineOutcome, Result, RunPacket, Station, StationOutcome, Step,
};

fn start(run_id: &str) -> StartRun {
    StartRun::new(
        run_id,
        AdapterSet::new(
            Arc::new(ReplayModel::new(
                "m1",
                ModelConfig::builder(["total_energy"]).build().unwrap(),
            )),
            Arc::new(ReplayModule::new(
                "d1",
                ModuleConfig::builder(["total_energy"]).build().unwrap(),
            )),
            Arc::new(ReplayTrainer::new(
                "t1",
                TrainerConfig::builder(1).build().unwrap(),
            )),
        ),
    )
}

/// Passes packets through and records its invocation.
struct Probe {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Station for Probe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, packet: RunPacket) -> Result<StationOutcome> {
        self.log.lock().unwrap().push(self.name);
        Ok(StationOutcome::Continue(packet))
    }
}

/// Ends the pipeline.
struct Stop {
    calls: Arc<AtomicUsize>,
}

impl Station for Stop {
    fn name(&self) -> &'static str {
        "stop"
    }

    fn process(&self, _packet: RunPacket) -> Result<StationOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(StationOutcome::Terminate)
    }
}

/// Always fails.
struct Explode;

impl Station for Explode {
    fn name(&self) -> &'static str {
        "explode"
    }

    fn process(&self, _packet: RunPacket) -> Result<StationOutcome> {
        Err(Error::Other("station exploded".to_string()))
    }
}

#[test]
fn test_empty_pipeline_is_exhausted_immediately() {
    let outcome = Pipeline::default().run(start("m1_train_0")).unwrap();

    match outcome {
        PipelineOutcome::Exhausted {
            packet,
            stations_run,
        } => {
            assert_eq!(stations_run, 0);
            assert_eq!(packet.kind(), PacketKind::Start);
            assert_eq!(packet.run_id(), "m1_train_0");
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[test]
fn test_stations_run_in_order_and_exhaust_with_last_packet() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let pipeline = Pipeline::default()
        .station(Probe {
            name: "first",
            log: Arc::clone(&log),
        })
        .station(InitializingStation::new())
        .station(Probe {
            name: "second",
            log: Arc::clone(&log),
        });
    assert_eq!(pipeline.remaining(), 3);

    let outcome = pipeline.run(start("m1_train_0")).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    assert_eq!(outcome.stations_run(), 3);
    assert!(!outcome.is_terminated());
    let PipelineOutcome::Exhausted { packet, .. } = outcome else {
        panic!("expected exhaustion");
    };
    assert_eq!(packet.kind(), PacketKind::Initialized);
}

#[test]
fn test_termination_skips_remaining_stations() {
    let calls = Arc::new(AtomicUsize::new(0));
    let log = Arc::new(Mutex::new(Vec::new()));
    let pipeline = Pipeline::default()
        .station(Stop {
            calls: Arc::clone(&calls),
        })
        .station(Probe {
            name: "never",
            log: Arc::clone(&log),
        });

    let outcome = pipeline.run(start("m1_train_0")).unwrap();

    assert!(matches!(
        outcome,
        PipelineOutcome::Terminated {
            station: "stop",
            stations_run: 1
        }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_error_aborts_before_later_stations() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = Pipeline::default().station(Explode).station(Stop {
        calls: Arc::clone(&calls),
    });

    let err = pipeline.run(start("m1_train_0")).unwrap_err();
    assert!(err.to_string().contains("station exploded"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_out_of_order_station_fails() {
    let pipeline = Pipeline::default().station(ProcessStation::training());
    let err = pipeline.run(start("m1_train_0")).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidPacketType {
            station: "process",
            expected: PacketKind::Initialized,
            found: PacketKind::Start
        }
    ));
}

#[test]
fn test_step_by_step() {
    let mut pipeline = Pipeline::default().station(InitializingStation::new());
    assert_eq!(pipeline.station_names(), vec!["initializing"]);

    let Step::Advanced(packet) = pipeline.step(start("m1_test_0").into()).unwrap() else {
        panic!("initializing must advance");
    };
    assert_eq!(packet.kind(), PacketKind::Initialized);
    assert_eq!(pipeline.remaining(), 0);

    let Step::Exhausted(packet) = pipeline.step(packet).unwrap() else {
        panic!("an empty queue must hand the packet back");
    };
    assert_eq!(packet.kind(), PacketKind::Initialized);
}

#[test]
fn test_shared_station_and_constructor() {
    let calls = Arc::new(AtomicUsize::new(0));
    let stop: Arc<dyn Station> = Arc::new(Stop {
        calls: Arc::clone(&calls),
    });

    let first = Pipeline::new([Arc::clone(&stop)]);
    let second = Pipeline::default().shared_station(Arc::clone(&stop));

    assert!(first.run(start("a")).unwrap().is_terminated());
    assert!(second.run(start("b")).unwrap().is_terminated());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
