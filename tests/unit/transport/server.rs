use super::*;
use crate::compose::stitch::CompositorOpts;

fn compositor() -> Compositor {
    Compositor::new(CompositorOpts::default()).unwrap()
}

fn ephemeral() -> ServeOpts {
    ServeOpts {
        addr: "127.0.0.1:0".to_string(),
        workers: 2,
        ..ServeOpts::default()
    }
}

#[test]
fn default_listener_settings() {
    let opts = ServeOpts::default();
    assert_eq!(opts.addr, "127.0.0.1:4000");
    assert_eq!(opts.max_body_bytes, 50 * 1024 * 1024);
}

#[test]
fn bind_rejects_degenerate_options() {
    let zero_workers = ServeOpts {
        workers: 0,
        ..ephemeral()
    };
    assert!(matches!(
        StitchServer::bind(zero_workers, compositor()),
        Err(StitchError::Request(_))
    ));

    let zero_body = ServeOpts {
        max_body_bytes: 0,
        ..ephemeral()
    };
    assert!(matches!(
        StitchServer::bind(zero_body, compositor()),
        Err(StitchError::Request(_))
    ));
}

#[test]
fn bind_to_port_zero_reports_real_port() {
    let server = StitchServer::bind(ephemeral(), compositor()).unwrap();
    let addr = server.local_addr().unwrap();
    assert!(addr.ip().is_loopback());
    assert_ne!(addr.port(), 0);
}

#[test]
fn shutdown_stops_run() {
    let server = StitchServer::bind(ephemeral(), compositor()).unwrap();
    let handle = server.shutdown_handle();
    std::thread::scope(|s| {
        let running = s.spawn(|| server.run());
        std::thread::sleep(Duration::from_millis(50));
        handle.shutdown();
        running.join().unwrap().unwrap();
    });
}
