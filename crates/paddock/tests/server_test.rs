//! Integration test for the server host.

use std::time::Duration;

use paddock::{PaddockServer, ServerConfig};
use paddock_data::model::Horse;
use paddock_data::{Backend, DirectorConfig};

fn file_config(path: &std::path::Path) -> ServerConfig {
    ServerConfig {
        tick_rate: 100,
        log_json: false,
        data: DirectorConfig {
            backend: Backend::File,
            data_path: path.to_path_buf(),
            ..DirectorConfig::default()
        },
    }
}

#[tokio::test]
async fn test_runs_tick_budget_then_flushes() {
    let directory = tempfile::tempdir().unwrap();
    let mut server = PaddockServer::new(&file_config(directory.path())).unwrap();

    let horse = server.director().create::<Horse>();
    horse.mutable(|horse| horse.name = "Ace".to_owned()).unwrap();

    let stats = server
        .run(Some(3), std::future::pending::<()>())
        .await
        .unwrap();
    assert_eq!(server.tick_loop().tick_count(), 3);
    // Flushed during the first tick, nothing left for shutdown.
    assert_eq!(stats.flushed, 0);
    assert!(directory.path().join("horse").join("1.json").exists());
}

#[tokio::test]
async fn test_shutdown_signal_stops_loop() {
    let directory = tempfile::tempdir().unwrap();
    let mut server = PaddockServer::new(&file_config(directory.path())).unwrap();

    let horse = server.director().create::<Horse>();
    assert!(horse.is_available());

    let shutdown = tokio::time::sleep(Duration::from_millis(50));
    server.run(None, shutdown).await.unwrap();

    assert!(server.tick_loop().tick_count() >= 1);
    assert!(directory.path().join("meta.json").exists());
    assert!(directory.path().join("horse").join("1.json").exists());
}

#[test]
fn test_invalid_data_config_rejected() {
    let config = ServerConfig {
        data: DirectorConfig {
            load_timeout_secs: 0,
            ..DirectorConfig::default()
        },
        ..ServerConfig::default()
    };
    assert!(PaddockServer::new(&config).is_err());
}
