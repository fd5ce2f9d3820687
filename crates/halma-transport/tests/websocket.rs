//! Integration tests for the WebSocket transport.
//!
//! A real server and a tokio-tungstenite client on a loopback port picked
//! by the OS.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use std::time::Duration;

    use halma_transport::{Connection, Handshake, Transport, TransportError, WebSocketTransport};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: std::net::SocketAddr) -> ClientWs {
        let url = format!("ws://{addr}");
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        ws
    }

    async fn pair() -> (halma_transport::WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");
        let server = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending
                .upgrade(Duration::from_secs(2))
                .await
                .expect("should upgrade")
        });
        let client = connect_client(addr).await;
        let conn = server.await.expect("task should complete");
        (conn, client)
    }

    #[tokio::test]
    async fn test_local_addr_reports_assigned_port() {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_accept_returns_before_any_bytes_arrive() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");
        let _idle = TcpStream::connect(addr).await.expect("tcp connect");

        let pending = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("accept must not wait for the upgrade request")
            .expect("should accept");
        assert!(pending.id().to_string().starts_with("conn-"));
    }

    #[tokio::test]
    async fn test_idle_peer_does_not_hold_up_the_next_client() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let _idle = TcpStream::connect(addr).await.expect("tcp connect");
        let stalled = transport.accept().await.expect("should accept");

        let server = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.upgrade(Duration::from_secs(2)).await
        });
        let mut client = connect_client(addr).await;
        let conn = server.await.unwrap().expect("second client upgrades");
        assert_ne!(conn.id(), stalled.id());

        conn.send(b"hi").await.unwrap();
        let msg = client.next().await.expect("frame").expect("ok frame");
        assert_eq!(msg, Message::Text("hi".into()));
    }

    #[tokio::test]
    async fn test_stalled_upgrade_times_out_and_drops_the_socket() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");
        let mut idle = TcpStream::connect(addr).await.expect("tcp connect");

        let pending = transport.accept().await.expect("should accept");
        let limit = Duration::from_millis(50);
        let err = match pending.upgrade(limit).await {
            Ok(_) => panic!("an idle peer must not upgrade"),
            Err(e) => e,
        };
        assert!(matches!(err, TransportError::HandshakeTimeout(d) if d == limit));

        let mut buf = [0u8; 8];
        let read = tokio::time::timeout(Duration::from_secs(2), idle.read(&mut buf))
            .await
            .expect("socket should be closed, not left hanging");
        assert_eq!(read.unwrap_or(0), 0);
    }

    #[tokio::test]
    async fn test_garbage_instead_of_upgrade_is_a_handshake_error() {
        use tokio::io::AsyncWriteExt;

        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");
        let mut peer = TcpStream::connect(addr).await.expect("tcp connect");
        peer.write_all(b"HELLO\r\n\r\n").await.unwrap();

        let pending = transport.accept().await.expect("should accept");
        let err = match pending.upgrade(Duration::from_secs(2)).await {
            Ok(_) => panic!("garbage must not upgrade"),
            Err(e) => e,
        };
        assert!(matches!(err, TransportError::Handshake(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_utf8_payload_goes_out_as_text_frame() {
        let (conn, mut client) = pair().await;
        assert!(conn.id().to_string().starts_with("conn-"));

        conn.send(br#"{"type":"started"}"#).await.expect("should send");
        let msg = client.next().await.expect("frame").expect("ok frame");
        assert_eq!(msg, Message::Text(r#"{"type":"started"}"#.into()));
    }

    #[tokio::test]
    async fn test_non_utf8_payload_goes_out_as_binary_frame() {
        let (conn, mut client) = pair().await;
        conn.send(&[0xff, 0x00, 0xfe]).await.expect("should send");
        let msg = client.next().await.expect("frame").expect("ok frame");
        assert_eq!(msg, Message::Binary(vec![0xff, 0x00, 0xfe].into()));
    }

    #[tokio::test]
    async fn test_recv_accepts_text_and_binary() {
        let (conn, mut client) = pair().await;

        client.send(Message::Text("hello".into())).await.unwrap();
        assert_eq!(conn.recv().await.unwrap(), Some(b"hello".to_vec()));

        client.send(Message::Binary(vec![1, 2, 3].into())).await.unwrap();
        assert_eq!(conn.recv().await.unwrap(), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_client_close_yields_none() {
        let (conn, mut client) = pair().await;
        client.send(Message::Close(None)).await.unwrap();
        assert_eq!(conn.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_send_while_recv_is_pending() {
        let (conn, mut client) = pair().await;
        let conn = std::sync::Arc::new(conn);

        let reader = {
            let conn = conn.clone();
            tokio::spawn(async move { conn.recv().await })
        };
        // Give the reader time to park inside recv().
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        tokio::time::timeout(std::time::Duration::from_secs(2), conn.send(b"ping"))
            .await
            .expect("send must not wait for recv")
            .expect("should send");
        let msg = client.next().await.expect("frame").expect("ok frame");
        assert_eq!(msg, Message::Text("ping".into()));

        client.send(Message::Text("pong".into())).await.unwrap();
        let got = reader.await.unwrap().unwrap();
        assert_eq!(got, Some(b"pong".to_vec()));
    }
}
