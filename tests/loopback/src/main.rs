fn main() {
    println!("Run `cargo test -p loopback` to execute the end-to-end protocol tests.");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use fileport_client::{ClientError, TransferClient, TransferOutcome};
    use fileport_protocol::{Mode, Request};
    use fileport_server::{ControlServer, ServerConfig};
    use tokio::net::TcpListener;

    /// Starts a real server on an OS-assigned control port and waits
    /// for the bind to land.
    async fn start_server(root: PathBuf) -> (Arc<ControlServer>, tokio::task::JoinHandle<()>) {
        let server = ControlServer::new(ServerConfig { port: 0, root });
        let server2 = Arc::clone(&server);
        let handle = tokio::spawn(async move {
            server2.run().await.unwrap();
        });
        while server.port().await == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        (server, handle)
    }

    /// Finds a currently-free data port by binding and dropping.
    async fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    fn request(control_port: u16, data_port: u16, mode: Mode) -> Request {
        Request {
            host: "127.0.0.1".into(),
            control_port,
            data_port,
            mode,
        }
    }

    #[tokio::test]
    async fn fetch_a_file_end_to_end() {
        let server_dir = tempfile::tempdir().unwrap();
        let client_dir = tempfile::tempdir().unwrap();
        std::fs::write(server_dir.path().join("report.txt"), b"hello\nworld").unwrap();

        let (server, handle) = start_server(server_dir.path().to_path_buf()).await;
        let control_port = server.port().await;
        let data_port = free_port().await;

        let client = TransferClient::new(request(
            control_port,
            data_port,
            Mode::Get {
                filename: "report.txt".into(),
            },
        ))
        .with_output_dir(client_dir.path());

        let outcome = client.run().await.unwrap();
        assert_eq!(outcome, TransferOutcome::Complete { bytes: 11 });

        let received = std::fs::read(client_dir.path().join("report.txt")).unwrap();
        assert_eq!(received, b"hello\nworld");

        server.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_a_multi_chunk_binary_file() {
        let server_dir = tempfile::tempdir().unwrap();
        let client_dir = tempfile::tempdir().unwrap();

        // Several chunks, every byte value except the sentinel pattern.
        let payload: Vec<u8> = (0..10_000).map(|i| (i * 13 % 256) as u8).collect();
        std::fs::write(server_dir.path().join("blob.bin"), &payload).unwrap();

        let (server, handle) = start_server(server_dir.path().to_path_buf()).await;
        let control_port = server.port().await;
        let data_port = free_port().await;

        let client = TransferClient::new(request(
            control_port,
            data_port,
            Mode::Get {
                filename: "blob.bin".into(),
            },
        ))
        .with_output_dir(client_dir.path());

        let outcome = client.run().await.unwrap();
        assert_eq!(
            outcome,
            TransferOutcome::Complete {
                bytes: payload.len() as u64
            }
        );

        let received = std::fs::read(client_dir.path().join("blob.bin")).unwrap();
        assert_eq!(received, payload);

        server.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_surfaces_the_server_message() {
        let server_dir = tempfile::tempdir().unwrap();
        let client_dir = tempfile::tempdir().unwrap();

        let (server, handle) = start_server(server_dir.path().to_path_buf()).await;
        let control_port = server.port().await;
        let data_port = free_port().await;

        let client = TransferClient::new(request(
            control_port,
            data_port,
            Mode::Get {
                filename: "report.txt".into(),
            },
        ))
        .with_output_dir(client_dir.path());

        let err = client.run().await.unwrap_err();
        match err {
            ClientError::Remote(msg) => assert_eq!(msg, "File \"report.txt\" not found"),
            other => panic!("expected Remote, got {other:?}"),
        }
        assert!(!client_dir.path().join("report.txt").exists());

        server.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn existing_local_file_survives_a_fetch() {
        let server_dir = tempfile::tempdir().unwrap();
        let client_dir = tempfile::tempdir().unwrap();
        std::fs::write(server_dir.path().join("report.txt"), b"server copy").unwrap();
        std::fs::write(client_dir.path().join("report.txt"), b"client copy").unwrap();

        let (server, handle) = start_server(server_dir.path().to_path_buf()).await;
        let control_port = server.port().await;
        let data_port = free_port().await;

        let client = TransferClient::new(request(
            control_port,
            data_port,
            Mode::Get {
                filename: "report.txt".into(),
            },
        ))
        .with_output_dir(client_dir.path());

        let outcome = client.run().await.unwrap();
        assert_eq!(outcome, TransferOutcome::SkippedExisting);

        let contents = std::fs::read(client_dir.path().join("report.txt")).unwrap();
        assert_eq!(contents, b"client copy");

        server.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn listing_matches_the_serve_root() {
        let server_dir = tempfile::tempdir().unwrap();
        let client_dir = tempfile::tempdir().unwrap();
        std::fs::write(server_dir.path().join("beta.txt"), b"b").unwrap();
        std::fs::write(server_dir.path().join("alpha.txt"), b"a").unwrap();
        std::fs::create_dir(server_dir.path().join("nested")).unwrap();

        let (server, handle) = start_server(server_dir.path().to_path_buf()).await;
        let control_port = server.port().await;
        let data_port = free_port().await;

        let client = TransferClient::new(request(control_port, data_port, Mode::List))
            .with_output_dir(client_dir.path());

        let outcome = client.run().await.unwrap();
        // "alpha.txt\nbeta.txt"
        assert_eq!(outcome, TransferOutcome::Complete { bytes: 18 });

        // List mode never touches the client filesystem.
        assert_eq!(std::fs::read_dir(client_dir.path()).unwrap().count(), 0);

        server.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn sequential_requests_reuse_nothing() {
        // Two exchanges against the same server: each gets its own
        // control and data connection.
        let server_dir = tempfile::tempdir().unwrap();
        let client_dir = tempfile::tempdir().unwrap();
        std::fs::write(server_dir.path().join("one.txt"), b"first").unwrap();
        std::fs::write(server_dir.path().join("two.txt"), b"second").unwrap();

        let (server, handle) = start_server(server_dir.path().to_path_buf()).await;
        let control_port = server.port().await;

        for (name, contents) in [("one.txt", &b"first"[..]), ("two.txt", &b"second"[..])] {
            let data_port = free_port().await;
            let client = TransferClient::new(request(
                control_port,
                data_port,
                Mode::Get {
                    filename: name.into(),
                },
            ))
            .with_output_dir(client_dir.path());

            client.run().await.unwrap();
            assert_eq!(std::fs::read(client_dir.path().join(name)).unwrap(), contents);
        }

        server.shutdown();
        handle.await.unwrap();
    }
}
